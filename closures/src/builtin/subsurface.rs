//! Subsurface Closure

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

/// Profile tags and the BSSRDF models they select.
pub const SUBSURFACE_PROFILES: [(&str, ClosureId); 4] = [
    ("better_dipole", ClosureId::SubsurfaceBetterDipole),
    ("directional_dipole", ClosureId::SubsurfaceDirectionalDipole),
    ("normalized_diffusion", ClosureId::SubsurfaceNormalizedDiffusion),
    ("standard_dipole", ClosureId::SubsurfaceStandardDipole),
];

pub(super) const AS_SUBSURFACE: ClosureDescriptor = ClosureDescriptor {
    id: ClosureId::Subsurface,
    name: "as_subsurface",
    params: &[
        ParamDesc::new("profile", ParamType::String),
        ParamDesc::new("N", ParamType::Vector),
        ParamDesc::new("reflectance", ParamType::Color),
        ParamDesc::new("mean_free_path", ParamType::Color),
        ParamDesc::new("ior", ParamType::Float),
    ],
    affinity: CompositeKind::SUBSURFACE,
    converter: ClosureConverter::Subsurface(convert_subsurface),
};

/// Returns the BSSRDF model selected by a profile tag.
///
/// * `tag` - The profile tag.
pub fn parse_subsurface_profile(tag: &str) -> ClosureResult<ClosureId> {
    SUBSURFACE_PROFILES
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, id)| *id)
        .ok_or_else(|| ClosureError::InvalidProfile(tag.to_string()))
}

fn convert_subsurface(
    composite: &mut CompositeSubsurfaceClosure,
    shading_basis: &Basis3f,
    params: &mut ParamReader<'_>,
    weight: &Spectrum,
) -> ClosureResult<()> {
    let closure_type = parse_subsurface_profile(params.string()?)?;
    let n = params.vector()?;
    let values = SubsurfaceValues {
        weight: 1.0,
        reflectance: params.color()?,
        reflectance_multiplier: 1.0,
        mfp: params.color()?,
        mfp_multiplier: 1.0,
        g: 0.0,
        ior: max(params.float()?, MIN_IOR),
    };
    composite.add_closure(closure_type, shading_basis, weight, &n, values)?;
    Ok(())
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ClosureTree;

    fn subsurface(profile: &str) -> ClosureTree {
        ClosureTree::component(
            ClosureId::Subsurface,
            Spectrum::new(1.0),
            vec![
                ParamValue::String(profile.to_string()),
                ParamValue::Vector(Vector3f::new(0.0, 0.0, 1.0)),
                ParamValue::Color(Spectrum::rgb(0.8, 0.4, 0.2)),
                ParamValue::Color(Spectrum::new(2.0)),
                ParamValue::Float(1.3),
            ],
        )
    }

    #[test]
    fn every_profile_selects_a_model() {
        let registry = ClosureRegistry::with_builtin_closures();
        for (tag, id) in SUBSURFACE_PROFILES {
            let c = CompositeSubsurfaceClosure::from_tree(&registry, &Basis3f::default(), &subsurface(tag))
                .expect("composite");
            assert_eq!(c.num_closures(), 1);
            assert_eq!(c.closure_type(0), id);
            let v = c.input_values::<SubsurfaceValues>(0);
            assert_eq!(v.reflectance, Spectrum::rgb(0.8, 0.4, 0.2));
            assert_eq!(v.mfp, Spectrum::new(2.0));
            assert_eq!(v.ior, 1.3);
            assert_eq!(v.g, 0.0);
        }
    }

    #[test]
    fn unknown_profile_commits_nothing() {
        let registry = ClosureRegistry::with_builtin_closures();
        let mut c = CompositeSubsurfaceClosure::new();
        assert_eq!(
            c.build(&registry, &Basis3f::default(), &subsurface("unknown")),
            Err(ClosureError::InvalidProfile("unknown".to_string()))
        );
        assert_eq!(c.num_closures(), 0);
    }

    #[test]
    fn surface_composites_ignore_subsurface() {
        let registry = ClosureRegistry::with_builtin_closures();
        let c = CompositeSurfaceClosure::from_tree(&registry, &Basis3f::default(), &subsurface("standard_dipole"))
            .expect("composite");
        assert!(c.is_empty());
    }
}
