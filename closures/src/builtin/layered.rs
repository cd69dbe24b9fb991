//! Layered Closures

use super::microfacet::MIN_IOR;
use crate::closure_id::ClosureId;
use crate::composite::*;
use crate::error::*;
use crate::input_values::*;
use crate::params::*;
use crate::registry::*;
use pbrt_core::geometry::*;
use pbrt_core::pbrt::*;
use pbrt_core::spectrum::*;

pub(super) const AS_ALSURFACE_LAYER: ClosureDescriptor = ClosureDescriptor {
    id: ClosureId::AlSurfaceLayer,
    name: "as_alsurface_layer",
    params: &[
        ParamDesc::new("substrate", ParamType::Closure),
        ParamDesc::new("distribution", ParamType::Int),
        ParamDesc::new("N", ParamType::Vector),
        ParamDesc::new("T", ParamType::Vector),
        ParamDesc::new("reflectance", ParamType::Color),
        ParamDesc::new("roughness", ParamType::Float),
        ParamDesc::new("anisotropy", ParamType::Float),
        ParamDesc::new("fresnel_mode", ParamType::Int),
        ParamDesc::new("ior", ParamType::Float),
        ParamDesc::new("normal_reflectance", ParamType::Color),
        ParamDesc::new("edge_tint", ParamType::Color),
    ],
    affinity: CompositeKind::SURFACE.union(CompositeKind::LAYERED),
    converter: ClosureConverter::Surface(convert_alsurface_layer),
};

/// Commits the layer entry. The substrate range is filled in by the
/// composite once the substrate has been flattened.
fn convert_alsurface_layer(
    composite: &mut CompositeSurfaceClosure,
    shading_basis: &Basis3f,
    params: &mut ParamReader<'_>,
    weight: &Spectrum,
) -> ClosureResult<()> {
    params.closure()?;
    let distribution = match params.int()? {
        0 => MicrofacetDistribution::Beckmann,
        1 => MicrofacetDistribution::Ggx,
        d => return Err(ClosureError::InvalidDistribution(d.to_string())),
    };
    let n = params.vector()?;
    let t = params.vector()?;
    let reflectance = params.color()?;
    let roughness = clamp(params.float()?, 1e-4, 1.0);
    let anisotropy = saturate(params.float()?);
    let fresnel_mode = match params.int()? {
        0 => FresnelMode::Dielectric,
        _ => FresnelMode::Conductor,
    };
    let values = AlSurfaceLayerValues {
        substrate_first: 0,
        substrate_count: 0,
        distribution,
        reflectance,
        roughness,
        anisotropy,
        fresnel_mode,
        ior: max(params.float()?, MIN_IOR),
        normal_reflectance: params.color()?,
        edge_tint: params.color()?,
    };
    composite.add_closure(ClosureId::AlSurfaceLayer, shading_basis, weight, &n, Some(&t), values)?;
    Ok(())
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ClosureTree;

    fn layer(weight: Spectrum, substrate: Option<ClosureTree>, distribution: Int) -> ClosureTree {
        ClosureTree::component(
            ClosureId::AlSurfaceLayer,
            weight,
            vec![
                ParamValue::Closure(substrate.map(Box::new)),
                ParamValue::Int(distribution),
                ParamValue::Vector(Vector3f::new(0.0, 0.0, 1.0)),
                ParamValue::Vector(Vector3f::zero()),
                ParamValue::Color(Spectrum::new(1.0)),
                ParamValue::Float(2.0),
                ParamValue::Float(-0.5),
                ParamValue::Int(1),
                ParamValue::Float(1.5),
                ParamValue::Color(Spectrum::new(0.9)),
                ParamValue::Color(Spectrum::new(0.1)),
            ],
        )
    }

    fn diffuse(w: Float) -> ClosureTree {
        ClosureTree::component(
            ClosureId::Diffuse,
            Spectrum::new(w),
            vec![ParamValue::Vector(Vector3f::new(0.0, 0.0, 1.0))],
        )
    }

    #[test]
    fn layer_is_clamped() {
        let registry = ClosureRegistry::with_builtin_closures();
        let c = CompositeSurfaceClosure::from_tree(&registry, &Basis3f::default(), &layer(Spectrum::new(1.0), None, 1))
            .expect("composite");
        assert_eq!(c.num_closures(), 1);
        let v = c.input_values::<AlSurfaceLayerValues>(0);
        assert_eq!(v.distribution, MicrofacetDistribution::Ggx);
        assert_eq!(v.fresnel_mode, FresnelMode::Conductor);
        assert_eq!(v.roughness, 1.0);
        assert_eq!(v.anisotropy, 0.0);
        assert!(v.substrate_entries().is_empty());
    }

    #[test]
    fn layer_records_substrate_entries() {
        let registry = ClosureRegistry::with_builtin_closures();
        let substrate = ClosureTree::add(diffuse(0.5), diffuse(0.25));
        let tree = ClosureTree::add(layer(Spectrum::new(0.5), Some(substrate), 0), diffuse(1.0));
        let c = CompositeSurfaceClosure::from_tree(&registry, &Basis3f::default(), &tree).expect("composite");

        assert_eq!(c.num_closures(), 4);
        assert_eq!(c.closure_type(0), ClosureId::AlSurfaceLayer);
        assert_eq!(c.input_values::<AlSurfaceLayerValues>(0).substrate_entries(), 1..3);

        // The layer's own weight does not scale its substrate.
        assert_eq!(*c.weight(0), Spectrum::new(0.5));
        assert_eq!(*c.weight(1), Spectrum::new(0.5));
        assert_eq!(*c.weight(2), Spectrum::new(0.25));
        assert_eq!(*c.weight(3), Spectrum::new(1.0));
    }

    #[test]
    fn substrate_inherits_accumulated_tint() {
        let registry = ClosureRegistry::with_builtin_closures();
        let tree = ClosureTree::mul(
            Spectrum::new(2.0),
            layer(Spectrum::new(0.25), Some(diffuse(1.0)), 0),
        );
        let c = CompositeSurfaceClosure::from_tree(&registry, &Basis3f::default(), &tree).expect("composite");

        assert_eq!(c.num_closures(), 2);
        assert_eq!(*c.weight(0), Spectrum::new(0.5));
        assert_eq!(c.closure_type(1), ClosureId::OrenNayar);
        assert_eq!(*c.weight(1), Spectrum::new(2.0));
    }

    #[test]
    fn bad_distribution_is_rejected() {
        let registry = ClosureRegistry::with_builtin_closures();
        let mut c = CompositeSurfaceClosure::new();
        assert_eq!(
            c.build(&registry, &Basis3f::default(), &layer(Spectrum::new(1.0), None, 7)),
            Err(ClosureError::InvalidDistribution("7".to_string()))
        );
        assert!(c.is_empty());
    }

    #[test]
    fn layer_is_transparent_to_subsurface_and_emission() {
        let registry = ClosureRegistry::with_builtin_closures();
        let emission = ClosureTree::component(ClosureId::Emission, Spectrum::new(2.0), vec![]);
        let tree = layer(Spectrum::new(0.5), Some(emission), 0);

        let e = CompositeEmissionClosure::from_tree(&registry, &tree).expect("emission");
        assert_eq!(e.num_closures(), 1);
        assert_eq!(e.closure_type(0), ClosureId::Emission);
        assert_eq!(*e.weight(0), Spectrum::new(1.0));

        let s = CompositeSubsurfaceClosure::from_tree(&registry, &Basis3f::default(), &tree).expect("subsurface");
        assert!(s.is_empty());
    }

    #[test]
    fn subsurface_reaches_through_layer() {
        let registry = ClosureRegistry::with_builtin_closures();
        let profile = ClosureTree::component(
            ClosureId::Subsurface,
            Spectrum::new(1.0),
            vec![
                ParamValue::String("better_dipole".to_string()),
                ParamValue::Vector(Vector3f::new(0.0, 0.0, 1.0)),
                ParamValue::Color(Spectrum::rgb(0.8, 0.4, 0.2)),
                ParamValue::Color(Spectrum::new(2.0)),
                ParamValue::Float(1.3),
            ],
        );
        let tree = layer(Spectrum::new(0.5), Some(profile), 0);

        let s = CompositeSubsurfaceClosure::from_tree(&registry, &Basis3f::default(), &tree).expect("subsurface");
        assert_eq!(s.num_closures(), 1);
        assert_eq!(s.closure_type(0), ClosureId::SubsurfaceBetterDipole);
        assert_eq!(*s.weight(0), Spectrum::new(0.5));
        assert!(s
            .entries()
            .iter()
            .all(|e| e.closure_type != ClosureId::AlSurfaceLayer));
    }
}
