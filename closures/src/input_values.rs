//! Closure Input Values
//!
//! Typed payloads stored in a composite's pool, one per entry. The engine
//! only constructs them; the BSDF/BSSRDF/EDF models that consume them live
//! elsewhere.

use crate::composite::INPUT_VALUES_ALIGNMENT;
use pbrt_core::pbrt::*;
use pbrt_core::spectrum::*;
use static_assertions::const_assert;
use std::mem::align_of;
use std::ops::Range;

/// Identifies the payload type stored for an entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InputValuesKind {
    AshikhminShirley,
    Disney,
    OrenNayar,
    Sheen,
    Translucent,
    Glossy,
    Metal,
    Glass,
    Subsurface,
    Emission,
    AlSurfaceLayer,
}

mod private {
    pub trait Sealed {}
}

/// Payload types that can be stored in a composite's pool. The set is
/// closed; `KIND` ties each type to the closure ids that store it.
pub trait InputValues: Copy + 'static + private::Sealed {
    /// The payload kind.
    const KIND: InputValuesKind;
}

/// Microfacet distribution of glossy, metal, glass and layer models.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MicrofacetDistribution {
    Beckmann,
    Ggx,
}

/// Fresnel model of the `as_alsurface_layer` closure.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FresnelMode {
    Dielectric,
    Conductor,
}

/// Ashikhmin-Shirley BRDF.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AshikhminShirleyValues {
    pub diffuse_reflectance: Spectrum,
    pub diffuse_reflectance_multiplier: Float,
    pub glossy_reflectance: Spectrum,
    pub glossy_reflectance_multiplier: Float,
    pub shininess_u: Float,
    pub shininess_v: Float,
    pub fresnel_multiplier: Float,
}

/// Disney principled BRDF.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DisneyValues {
    pub base_color: Spectrum,
    pub subsurface: Float,
    pub metallic: Float,
    pub specular: Float,
    pub specular_tint: Float,
    pub anisotropic: Float,
    pub roughness: Float,
    pub sheen: Float,
    pub sheen_tint: Float,
    pub clearcoat: Float,
    pub clearcoat_gloss: Float,
}

/// Oren-Nayar BRDF. Roughness 0 is Lambertian.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OrenNayarValues {
    pub reflectance: Spectrum,
    pub reflectance_multiplier: Float,
    pub roughness: Float,
}

/// Sheen BRDF.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SheenValues {
    pub reflectance: Spectrum,
    pub reflectance_multiplier: Float,
}

/// Diffuse BTDF.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TranslucentValues {
    pub transmittance: Spectrum,
    pub transmittance_multiplier: Float,
}

/// Glossy microfacet BRDF.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GlossyValues {
    pub reflectance: Spectrum,
    pub reflectance_multiplier: Float,
    pub roughness: Float,
    pub anisotropy: Float,
    pub ior: Float,
}

/// Metal microfacet BRDF.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MetalValues {
    pub normal_reflectance: Spectrum,
    pub edge_tint: Spectrum,
    pub reflectance_multiplier: Float,
    pub roughness: Float,
    pub anisotropy: Float,
}

/// Glass microfacet BSDF.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GlassValues {
    pub surface_transmittance: Spectrum,
    pub surface_transmittance_multiplier: Float,
    pub reflection_tint: Spectrum,
    pub refraction_tint: Spectrum,
    pub roughness: Float,
    pub anisotropy: Float,
    pub ior: Float,
    pub volume_transmittance: Spectrum,
    pub volume_transmittance_distance: Float,
}

/// Dipole and normalized diffusion BSSRDFs. The profile is given by the
/// entry's closure id.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SubsurfaceValues {
    pub weight: Float,
    pub reflectance: Spectrum,
    pub reflectance_multiplier: Float,
    pub mfp: Spectrum,
    pub mfp_multiplier: Float,
    pub g: Float,
    pub ior: Float,
}

/// Diffuse EDF. The emitted radiance is `radiance * radiance_multiplier`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EmissionValues {
    pub radiance: Spectrum,
    pub radiance_multiplier: Float,
}

/// Layered alSurface BRDF over a substrate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AlSurfaceLayerValues {
    /// First substrate entry.
    pub(crate) substrate_first: usize,

    /// Number of substrate entries.
    pub(crate) substrate_count: usize,

    pub distribution: MicrofacetDistribution,
    pub reflectance: Spectrum,
    pub roughness: Float,
    pub anisotropy: Float,
    pub fresnel_mode: FresnelMode,
    pub ior: Float,
    pub normal_reflectance: Spectrum,
    pub edge_tint: Spectrum,
}

impl AlSurfaceLayerValues {
    /// Returns the range of composite entries produced by the substrate.
    pub fn substrate_entries(&self) -> Range<usize> {
        self.substrate_first..self.substrate_first + self.substrate_count
    }
}

macro_rules! input_values {
    ($($t: ty => $kind: ident),+ $(,)?) => {
        $(
            impl private::Sealed for $t {}

            impl InputValues for $t {
                const KIND: InputValuesKind = InputValuesKind::$kind;
            }

            const_assert!(align_of::<$t>() <= INPUT_VALUES_ALIGNMENT);
        )+
    };
}

input_values!(
    AshikhminShirleyValues => AshikhminShirley,
    DisneyValues => Disney,
    OrenNayarValues => OrenNayar,
    SheenValues => Sheen,
    TranslucentValues => Translucent,
    GlossyValues => Glossy,
    MetalValues => Metal,
    GlassValues => Glass,
    SubsurfaceValues => Subsurface,
    EmissionValues => Emission,
    AlSurfaceLayerValues => AlSurfaceLayer,
);
