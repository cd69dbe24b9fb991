//! Ashikhmin-Shirley Closures

use crate::closure_id::ClosureId;
use crate::composite::*;
use crate::error::*;
use crate::input_values::*;
use crate::params::*;
use crate::registry::*;
use pbrt_core::geometry::*;
use pbrt_core::pbrt::*;
use pbrt_core::spectrum::*;

/// Smallest Phong exponent.
const MIN_EXPONENT: Float = 0.01;

pub(super) const AS_ASHIKHMIN_SHIRLEY: ClosureDescriptor = ClosureDescriptor {
    id: ClosureId::AshikhminShirley,
    name: "as_ashikhmin_shirley",
    params: &[
        ParamDesc::new("N", ParamType::Vector),
        ParamDesc::new("T", ParamType::Vector),
        ParamDesc::new("diffuse_reflectance", ParamType::Color),
        ParamDesc::new("glossy_reflectance", ParamType::Color),
        ParamDesc::new("exponent_u", ParamType::Float),
        ParamDesc::new("exponent_v", ParamType::Float),
        ParamDesc::new("fresnel_multiplier", ParamType::Float),
    ],
    affinity: CompositeKind::SURFACE,
    converter: ClosureConverter::Surface(convert_ashikhmin_shirley),
};

pub(super) const PHONG: ClosureDescriptor = ClosureDescriptor {
    id: ClosureId::Phong,
    name: "phong",
    params: &[
        ParamDesc::new("N", ParamType::Vector),
        ParamDesc::new("exponent", ParamType::Float),
    ],
    affinity: CompositeKind::SURFACE,
    converter: ClosureConverter::Surface(convert_phong),
};

fn convert_ashikhmin_shirley(
    composite: &mut CompositeSurfaceClosure,
    shading_basis: &Basis3f,
    params: &mut ParamReader<'_>,
    weight: &Spectrum,
) -> ClosureResult<()> {
    let n = params.vector()?;
    let t = params.vector()?;
    let values = AshikhminShirleyValues {
        diffuse_reflectance: params.color()?,
        diffuse_reflectance_multiplier: 1.0,
        glossy_reflectance: params.color()?,
        glossy_reflectance_multiplier: 1.0,
        shininess_u: max(params.float()?, MIN_EXPONENT),
        shininess_v: max(params.float()?, MIN_EXPONENT),
        fresnel_multiplier: params.float()?,
    };
    composite.add_closure(ClosureId::AshikhminShirley, shading_basis, weight, &n, Some(&t), values)?;
    Ok(())
}

/// Isotropic Ashikhmin-Shirley with white reflectances.
fn convert_phong(
    composite: &mut CompositeSurfaceClosure,
    shading_basis: &Basis3f,
    params: &mut ParamReader<'_>,
    weight: &Spectrum,
) -> ClosureResult<()> {
    let n = params.vector()?;
    let exponent = max(params.float()?, MIN_EXPONENT);
    let values = AshikhminShirleyValues {
        diffuse_reflectance: Spectrum::new(1.0),
        diffuse_reflectance_multiplier: 1.0,
        glossy_reflectance: Spectrum::new(1.0),
        glossy_reflectance_multiplier: 1.0,
        shininess_u: exponent,
        shininess_v: exponent,
        fresnel_multiplier: 1.0,
    };
    composite.add_closure(ClosureId::AshikhminShirley, shading_basis, weight, &n, None, values)?;
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
    fn phong_exponents_are_clamped() {
        let registry = ClosureRegistry::with_builtin_closures();
        let tree = ClosureTree::component(
            ClosureId::Phong,
            Spectrum::new(1.0),
            vec![ParamValue::Vector(Vector3f::new(0.0, 0.0, 1.0)), ParamValue::Float(0.0)],
        );
        let c = CompositeSurfaceClosure::from_tree(&registry, &Basis3f::default(), &tree).expect("composite");
        assert_eq!(c.closure_type(0), ClosureId::AshikhminShirley);
        let v = c.input_values::<AshikhminShirleyValues>(0);
        assert_eq!(v.shininess_u, MIN_EXPONENT);
        assert_eq!(v.shininess_v, MIN_EXPONENT);
        assert_eq!(v.fresnel_multiplier, 1.0);
    }

    #[test]
    fn ashikhmin_shirley_uses_tangent() {
        let registry = ClosureRegistry::with_builtin_closures();
        let tree = ClosureTree::component(
            ClosureId::AshikhminShirley,
            Spectrum::new(1.0),
            vec![
                ParamValue::Vector(Vector3f::new(0.0, 0.0, 1.0)),
                ParamValue::Vector(Vector3f::new(0.0, 1.0, 0.0)),
                ParamValue::Color(Spectrum::rgb(0.5, 0.4, 0.3)),
                ParamValue::Color(Spectrum::new(0.9)),
                ParamValue::Float(100.0),
                ParamValue::Float(10.0),
                ParamValue::Float(0.5),
            ],
        );
        let c = CompositeSurfaceClosure::from_tree(&registry, &Basis3f::default(), &tree).expect("composite");
        let v = c.input_values::<AshikhminShirleyValues>(0);
        assert_eq!(v.diffuse_reflectance, Spectrum::rgb(0.5, 0.4, 0.3));
        assert_eq!(v.shininess_u, 100.0);
        assert_eq!(v.shininess_v, 10.0);
        assert_eq!(c.shading_basis(0).tangent_u(), Vector3f::new(0.0, 1.0, 0.0));
    }
}
