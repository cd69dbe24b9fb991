//! Diffuse Closures

use crate::closure_id::ClosureId;
use crate::composite::*;
use crate::error::*;
use crate::input_values::*;
use crate::params::*;
use crate::registry::*;
use pbrt_core::geometry::*;
use pbrt_core::pbrt::*;
use pbrt_core::spectrum::*;

const N: ParamDesc = ParamDesc::new("N", ParamType::Vector);

pub(super) const DIFFUSE: ClosureDescriptor = ClosureDescriptor {
    id: ClosureId::Diffuse,
    name: "diffuse",
    params: &[N],
    affinity: CompositeKind::SURFACE,
    converter: ClosureConverter::Surface(convert_diffuse),
};

pub(super) const OREN_NAYAR: ClosureDescriptor = ClosureDescriptor {
    id: ClosureId::OrenNayar,
    name: "oren_nayar",
    params: &[N, ParamDesc::new("roughness", ParamType::Float)],
    affinity: CompositeKind::SURFACE,
    converter: ClosureConverter::Surface(convert_oren_nayar),
};

pub(super) const AS_SHEEN: ClosureDescriptor = ClosureDescriptor {
    id: ClosureId::Sheen,
    name: "as_sheen",
    params: &[N],
    affinity: CompositeKind::SURFACE,
    converter: ClosureConverter::Surface(convert_sheen),
};

pub(super) const TRANSLUCENT: ClosureDescriptor = ClosureDescriptor {
    id: ClosureId::Translucent,
    name: "translucent",
    params: &[N],
    affinity: CompositeKind::SURFACE,
    converter: ClosureConverter::Surface(convert_translucent),
};

/// Lambertian reflection as a smooth Oren-Nayar entry.
fn convert_diffuse(
    composite: &mut CompositeSurfaceClosure,
    shading_basis: &Basis3f,
    params: &mut ParamReader<'_>,
    weight: &Spectrum,
) -> ClosureResult<()> {
    let n = params.vector()?;
    composite.add_closure(
        ClosureId::OrenNayar,
        shading_basis,
        weight,
        &n,
        None,
        OrenNayarValues {
            reflectance: Spectrum::new(1.0),
            reflectance_multiplier: 1.0,
            roughness: 0.0,
        },
    )?;
    Ok(())
}

fn convert_oren_nayar(
    composite: &mut CompositeSurfaceClosure,
    shading_basis: &Basis3f,
    params: &mut ParamReader<'_>,
    weight: &Spectrum,
) -> ClosureResult<()> {
    let n = params.vector()?;
    let roughness = params.float()?;
    composite.add_closure(
        ClosureId::OrenNayar,
        shading_basis,
        weight,
        &n,
        None,
        OrenNayarValues {
            reflectance: Spectrum::new(1.0),
            reflectance_multiplier: 1.0,
            roughness: max(roughness, 0.0),
        },
    )?;
    Ok(())
}

fn convert_sheen(
    composite: &mut CompositeSurfaceClosure,
    shading_basis: &Basis3f,
    params: &mut ParamReader<'_>,
    weight: &Spectrum,
) -> ClosureResult<()> {
    let n = params.vector()?;
    composite.add_closure(
        ClosureId::Sheen,
        shading_basis,
        weight,
        &n,
        None,
        SheenValues {
            reflectance: Spectrum::new(1.0),
            reflectance_multiplier: 1.0,
        },
    )?;
    Ok(())
}

fn convert_translucent(
    composite: &mut CompositeSurfaceClosure,
    shading_basis: &Basis3f,
    params: &mut ParamReader<'_>,
    weight: &Spectrum,
) -> ClosureResult<()> {
    let n = params.vector()?;
    composite.add_closure(
        ClosureId::Translucent,
        shading_basis,
        weight,
        &n,
        None,
        TranslucentValues {
            transmittance: Spectrum::new(1.0),
            transmittance_multiplier: 1.0,
        },
    )?;
    Ok(())
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
