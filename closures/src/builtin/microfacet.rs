//! Microfacet Closures
//!
//! `as_glossy`, `as_metal` and `as_glass` select their model id from a
//! distribution tag; `reflection` is a smooth Beckmann glossy lobe.

use crate::closure_id::ClosureId;
use crate::composite::*;
use crate::error::*;
use crate::input_values::*;
use crate::params::*;
use crate::registry::*;
use pbrt_core::geometry::*;
use pbrt_core::pbrt::*;
use pbrt_core::spectrum::*;

/// Tag of the Beckmann distribution.
pub const BECKMANN_TAG: &str = "beckmann";

/// Tag of the GGX distribution.
pub const GGX_TAG: &str = "ggx";

/// Smallest index of refraction.
pub(super) const MIN_IOR: Float = 1e-3;

/// Smallest glass roughness.
const MIN_GLASS_ROUGHNESS: Float = 1e-4;

const DIST: ParamDesc = ParamDesc::new("dist", ParamType::String);
const N: ParamDesc = ParamDesc::new("N", ParamType::Vector);
const T: ParamDesc = ParamDesc::new("T", ParamType::Vector);
const ROUGHNESS: ParamDesc = ParamDesc::new("roughness", ParamType::Float);
const ANISOTROPY: ParamDesc = ParamDesc::new("anisotropy", ParamType::Float);
const IOR: ParamDesc = ParamDesc::new("ior", ParamType::Float);

pub(super) const AS_GLASS: ClosureDescriptor = ClosureDescriptor {
    id: ClosureId::Glass,
    name: "as_glass",
    params: &[
        DIST,
        N,
        T,
        ParamDesc::new("surface_transmittance", ParamType::Color),
        ParamDesc::new("reflection_tint", ParamType::Color),
        ParamDesc::new("refraction_tint", ParamType::Color),
        ROUGHNESS,
        ANISOTROPY,
        IOR,
        ParamDesc::new("volume_transmittance", ParamType::Color),
        ParamDesc::new("volume_transmittance_distance", ParamType::Float),
    ],
    affinity: CompositeKind::SURFACE,
    converter: ClosureConverter::Surface(convert_glass),
};

pub(super) const AS_GLOSSY: ClosureDescriptor = ClosureDescriptor {
    id: ClosureId::Glossy,
    name: "as_glossy",
    params: &[DIST, N, T, ROUGHNESS, ANISOTROPY, IOR],
    affinity: CompositeKind::SURFACE,
    converter: ClosureConverter::Surface(convert_glossy),
};

pub(super) const AS_METAL: ClosureDescriptor = ClosureDescriptor {
    id: ClosureId::Metal,
    name: "as_metal",
    params: &[
        DIST,
        N,
        T,
        ParamDesc::new("normal_reflectance", ParamType::Color),
        ParamDesc::new("edge_tint", ParamType::Color),
        ROUGHNESS,
        ANISOTROPY,
    ],
    affinity: CompositeKind::SURFACE,
    converter: ClosureConverter::Surface(convert_metal),
};

pub(super) const REFLECTION: ClosureDescriptor = ClosureDescriptor {
    id: ClosureId::Reflection,
    name: "reflection",
    params: &[N, IOR],
    affinity: CompositeKind::SURFACE,
    converter: ClosureConverter::Surface(convert_reflection),
};

/// Parses a distribution tag.
///
/// * `tag` - The tag.
pub fn parse_distribution(tag: &str) -> ClosureResult<MicrofacetDistribution> {
    match tag {
        BECKMANN_TAG => Ok(MicrofacetDistribution::Beckmann),
        GGX_TAG => Ok(MicrofacetDistribution::Ggx),
        _ => Err(ClosureError::InvalidDistribution(tag.to_string())),
    }
}

fn convert_glass(
    composite: &mut CompositeSurfaceClosure,
    shading_basis: &Basis3f,
    params: &mut ParamReader<'_>,
    weight: &Spectrum,
) -> ClosureResult<()> {
    let closure_type = match parse_distribution(params.string()?)? {
        MicrofacetDistribution::Beckmann => ClosureId::GlassBeckmann,
        MicrofacetDistribution::Ggx => ClosureId::GlassGgx,
    };
    let n = params.vector()?;
    let t = params.vector()?;
    let values = GlassValues {
        surface_transmittance: params.color()?,
        surface_transmittance_multiplier: 1.0,
        reflection_tint: params.color()?,
        refraction_tint: params.color()?,
        roughness: max(params.float()?, MIN_GLASS_ROUGHNESS),
        anisotropy: clamp(params.float()?, -1.0, 1.0),
        ior: max(params.float()?, MIN_IOR),
        volume_transmittance: params.color()?,
        volume_transmittance_distance: params.float()?,
    };

    composite.add_closure(closure_type, shading_basis, weight, &n, Some(&t), values)?;
    composite.add_ior(weight, values.ior);
    Ok(())
}

fn convert_glossy(
    composite: &mut CompositeSurfaceClosure,
    shading_basis: &Basis3f,
    params: &mut ParamReader<'_>,
    weight: &Spectrum,
) -> ClosureResult<()> {
    let closure_type = match parse_distribution(params.string()?)? {
        MicrofacetDistribution::Beckmann => ClosureId::GlossyBeckmann,
        MicrofacetDistribution::Ggx => ClosureId::GlossyGgx,
    };
    let n = params.vector()?;
    let t = params.vector()?;
    let values = GlossyValues {
        reflectance: Spectrum::new(1.0),
        reflectance_multiplier: 1.0,
        roughness: max(params.float()?, 0.0),
        anisotropy: clamp(params.float()?, -1.0, 1.0),
        ior: max(params.float()?, MIN_IOR),
    };
    composite.add_closure(closure_type, shading_basis, weight, &n, Some(&t), values)?;
    Ok(())
}

fn convert_metal(
    composite: &mut CompositeSurfaceClosure,
    shading_basis: &Basis3f,
    params: &mut ParamReader<'_>,
    weight: &Spectrum,
) -> ClosureResult<()> {
    let closure_type = match parse_distribution(params.string()?)? {
        MicrofacetDistribution::Beckmann => ClosureId::MetalBeckmann,
        MicrofacetDistribution::Ggx => ClosureId::MetalGgx,
    };
    let n = params.vector()?;
    let t = params.vector()?;
    let values = MetalValues {
        normal_reflectance: params.color()?,
        edge_tint: params.color()?,
        reflectance_multiplier: 1.0,
        roughness: max(params.float()?, 0.0),
        anisotropy: clamp(params.float()?, -1.0, 1.0),
    };
    composite.add_closure(closure_type, shading_basis, weight, &n, Some(&t), values)?;
    Ok(())
}

fn convert_reflection(
    composite: &mut CompositeSurfaceClosure,
    shading_basis: &Basis3f,
    params: &mut ParamReader<'_>,
    weight: &Spectrum,
) -> ClosureResult<()> {
    let n = params.vector()?;
    let values = GlossyValues {
        reflectance: Spectrum::new(1.0),
        reflectance_multiplier: 1.0,
        roughness: 0.0,
        anisotropy: 0.0,
        ior: max(params.float()?, MIN_IOR),
    };
    composite.add_closure(ClosureId::GlossyBeckmann, shading_basis, weight, &n, None, values)?;
    Ok(())
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
