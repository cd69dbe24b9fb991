//! Built-in Closures

mod ashikhmin;
mod diffuse;
mod disney;
mod emission;
mod layered;
mod markers;
mod microfacet;
mod subsurface;

use crate::registry::*;

// Re-export
pub use microfacet::{parse_distribution, BECKMANN_TAG, GGX_TAG};
pub use subsurface::{parse_subsurface_profile, SUBSURFACE_PROFILES};

/// Registers the built-in closures in their documented order.
///
/// * `registry` - The registry to fill.
pub fn register_closures(registry: &mut ClosureRegistry) {
    for desc in [
        layered::AS_ALSURFACE_LAYER,
        ashikhmin::AS_ASHIKHMIN_SHIRLEY,
        markers::BACKGROUND,
        markers::DEBUG,
        diffuse::DIFFUSE,
        disney::AS_DISNEY,
        emission::EMISSION,
        microfacet::AS_GLASS,
        microfacet::AS_GLOSSY,
        markers::HOLDOUT,
        microfacet::AS_METAL,
        diffuse::OREN_NAYAR,
        ashikhmin::PHONG,
        microfacet::REFLECTION,
        diffuse::AS_SHEEN,
        subsurface::AS_SUBSURFACE,
        diffuse::TRANSLUCENT,
        markers::TRANSPARENT,
    ] {
        registry.register(desc);
    }
}
