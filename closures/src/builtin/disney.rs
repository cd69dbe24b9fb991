//! Disney Closure

use crate::closure_id::ClosureId;
use crate::composite::*;
use crate::error::*;
use crate::input_values::*;
use crate::params::*;
use crate::registry::*;
use pbrt_core::geometry::*;
use pbrt_core::pbrt::*;
use pbrt_core::spectrum::*;

pub(super) const AS_DISNEY: ClosureDescriptor = ClosureDescriptor {
    id: ClosureId::Disney,
    name: "as_disney",
    params: &[
        ParamDesc::new("N", ParamType::Vector),
        ParamDesc::new("T", ParamType::Vector),
        ParamDesc::new("base_color", ParamType::Color),
        ParamDesc::new("subsurface", ParamType::Float),
        ParamDesc::new("metallic", ParamType::Float),
        ParamDesc::new("specular", ParamType::Float),
        ParamDesc::new("specular_tint", ParamType::Float),
        ParamDesc::new("anisotropic", ParamType::Float),
        ParamDesc::new("roughness", ParamType::Float),
        ParamDesc::new("sheen", ParamType::Float),
        ParamDesc::new("sheen_tint", ParamType::Float),
        ParamDesc::new("clearcoat", ParamType::Float),
        ParamDesc::new("clearcoat_gloss", ParamType::Float),
    ],
    affinity: CompositeKind::SURFACE,
    converter: ClosureConverter::Surface(convert_disney),
};

fn convert_disney(
    composite: &mut CompositeSurfaceClosure,
    shading_basis: &Basis3f,
    params: &mut ParamReader<'_>,
    weight: &Spectrum,
) -> ClosureResult<()> {
    let n = params.vector()?;
    let t = params.vector()?;
    let values = DisneyValues {
        base_color: params.color()?,
        subsurface: saturate(params.float()?),
        metallic: saturate(params.float()?),
        specular: max(params.float()?, 0.0),
        specular_tint: saturate(params.float()?),
        anisotropic: clamp(params.float()?, -1.0, 1.0),
        roughness: clamp(params.float()?, 1e-4, 1.0),
        sheen: saturate(params.float()?),
        sheen_tint: saturate(params.float()?),
        clearcoat: max(params.float()?, 0.0),
        clearcoat_gloss: clamp(params.float()?, 1e-4, 1.0),
    };
    composite.add_closure(ClosureId::Disney, shading_basis, weight, &n, Some(&t), values)?;
    Ok(())
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ClosureTree;

    #[test]
    fn parameters_are_clamped() {
        let mut params = vec![
            ParamValue::Vector(Vector3f::new(0.0, 0.0, 1.0)),
            ParamValue::Vector(Vector3f::new(1.0, 0.0, 0.0)),
            ParamValue::Color(Spectrum::new(0.8)),
        ];
        // subsurface .. clearcoat_gloss
        params.extend(
            [2.0, -1.0, -3.0, 0.5, -5.0, 0.0, 1.5, 0.25, -1.0, 0.0]
                .into_iter()
                .map(ParamValue::Float),
        );

        let registry = ClosureRegistry::with_builtin_closures();
        let tree = ClosureTree::component(ClosureId::Disney, Spectrum::new(1.0), params);
        let c = CompositeSurfaceClosure::from_tree(&registry, &Basis3f::default(), &tree).expect("composite");
        let v = c.input_values::<DisneyValues>(0);
        assert_eq!(v.subsurface, 1.0);
        assert_eq!(v.metallic, 0.0);
        assert_eq!(v.specular, 0.0);
        assert_eq!(v.anisotropic, -1.0);
        assert_eq!(v.roughness, 1e-4);
        assert_eq!(v.sheen, 1.0);
        assert_eq!(v.sheen_tint, 0.25);
        assert_eq!(v.clearcoat, 0.0);
        assert_eq!(v.clearcoat_gloss, 1e-4);
    }
}
