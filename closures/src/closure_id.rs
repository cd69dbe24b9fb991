//! Closure Identifiers

use crate::input_values::InputValuesKind;
use std::fmt;

/// Dense identifiers of every closure kind known to the engine. The order is
/// fixed: model ids stored in composites come first, followed by the shading
/// language closures that forward to them, the markers, and finally the
/// layered closures.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClosureId {
    // BSDF models.
    AshikhminShirley,
    Disney,
    OrenNayar,
    Sheen,
    Translucent,
    GlossyBeckmann,
    GlossyGgx,
    MetalBeckmann,
    MetalGgx,
    GlassBeckmann,
    GlassGgx,

    // BSSRDF models.
    SubsurfaceBetterDipole,
    SubsurfaceStandardDipole,
    SubsurfaceDirectionalDipole,
    SubsurfaceNormalizedDiffusion,

    // EDF model.
    Emission,

    // Closures that forward to a model.
    Diffuse,
    Glossy,
    Metal,
    Glass,
    Phong,
    Reflection,
    Subsurface,

    // Markers.
    Background,
    Debug,
    Holdout,
    Transparent,

    // Layered closures. Must stay last.
    AlSurfaceLayer,
}

/// Start of the layered closure range.
pub const FIRST_LAYERED_CLOSURE: ClosureId = ClosureId::AlSurfaceLayer;

/// Number of closure ids.
pub const NUM_CLOSURE_IDS: usize = ClosureId::AlSurfaceLayer as usize + 1;

/// All ids in index order.
const ALL_CLOSURE_IDS: [ClosureId; NUM_CLOSURE_IDS] = [
    ClosureId::AshikhminShirley,
    ClosureId::Disney,
    ClosureId::OrenNayar,
    ClosureId::Sheen,
    ClosureId::Translucent,
    ClosureId::GlossyBeckmann,
    ClosureId::GlossyGgx,
    ClosureId::MetalBeckmann,
    ClosureId::MetalGgx,
    ClosureId::GlassBeckmann,
    ClosureId::GlassGgx,
    ClosureId::SubsurfaceBetterDipole,
    ClosureId::SubsurfaceStandardDipole,
    ClosureId::SubsurfaceDirectionalDipole,
    ClosureId::SubsurfaceNormalizedDiffusion,
    ClosureId::Emission,
    ClosureId::Diffuse,
    ClosureId::Glossy,
    ClosureId::Metal,
    ClosureId::Glass,
    ClosureId::Phong,
    ClosureId::Reflection,
    ClosureId::Subsurface,
    ClosureId::Background,
    ClosureId::Debug,
    ClosureId::Holdout,
    ClosureId::Transparent,
    ClosureId::AlSurfaceLayer,
];

impl ClosureId {
    /// Returns the dense index of the id.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the id with the given index.
    ///
    /// * `index` - Dense index.
    pub fn from_index(index: usize) -> Option<Self> {
        ALL_CLOSURE_IDS.get(index).copied()
    }

    /// Returns an iterator over all ids in index order.
    pub fn all() -> impl Iterator<Item = Self> {
        ALL_CLOSURE_IDS.into_iter()
    }

    /// Returns true if the id is in the layered closure range.
    #[inline(always)]
    pub fn is_layered(self) -> bool {
        self >= FIRST_LAYERED_CLOSURE
    }

    /// Returns true if the id is a subsurface scattering model.
    pub fn is_subsurface_model(self) -> bool {
        matches!(
            self,
            Self::SubsurfaceBetterDipole
                | Self::SubsurfaceStandardDipole
                | Self::SubsurfaceDirectionalDipole
                | Self::SubsurfaceNormalizedDiffusion
        )
    }

    /// Returns the payload type stored for entries of this type, or `None`
    /// if the id never appears as an entry type.
    pub fn input_values_kind(self) -> Option<InputValuesKind> {
        match self {
            Self::AshikhminShirley => Some(InputValuesKind::AshikhminShirley),
            Self::Disney => Some(InputValuesKind::Disney),
            Self::OrenNayar => Some(InputValuesKind::OrenNayar),
            Self::Sheen => Some(InputValuesKind::Sheen),
            Self::Translucent => Some(InputValuesKind::Translucent),
            Self::GlossyBeckmann | Self::GlossyGgx => Some(InputValuesKind::Glossy),
            Self::MetalBeckmann | Self::MetalGgx => Some(InputValuesKind::Metal),
            Self::GlassBeckmann | Self::GlassGgx => Some(InputValuesKind::Glass),
            Self::SubsurfaceBetterDipole
            | Self::SubsurfaceStandardDipole
            | Self::SubsurfaceDirectionalDipole
            | Self::SubsurfaceNormalizedDiffusion => Some(InputValuesKind::Subsurface),
            Self::Emission => Some(InputValuesKind::Emission),
            Self::AlSurfaceLayer => Some(InputValuesKind::AlSurfaceLayer),
            Self::Diffuse
            | Self::Glossy
            | Self::Metal
            | Self::Glass
            | Self::Phong
            | Self::Reflection
            | Self::Subsurface
            | Self::Background
            | Self::Debug
            | Self::Holdout
            | Self::Transparent => None,
        }
    }
}

impl fmt::Display for ClosureId {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_dense() {
        for (i, id) in ClosureId::all().enumerate() {
            assert_eq!(id.index(), i);
            assert_eq!(ClosureId::from_index(i), Some(id));
        }
        assert_eq!(ClosureId::from_index(NUM_CLOSURE_IDS), None);
    }

    #[test]
    fn layered_range_is_last() {
        assert!(ClosureId::AlSurfaceLayer.is_layered());
        assert!(ClosureId::all().filter(|id| id.is_layered()).all(|id| id >= FIRST_LAYERED_CLOSURE));
        assert!(!ClosureId::Transparent.is_layered());
        assert!(!ClosureId::GlassGgx.is_layered());
    }

    #[test]
    fn forwarding_closures_have_no_payload() {
        assert_eq!(ClosureId::Glass.input_values_kind(), None);
        assert_eq!(ClosureId::Holdout.input_values_kind(), None);
        assert_eq!(ClosureId::GlassGgx.input_values_kind(), Some(InputValuesKind::Glass));
        assert_eq!(
            ClosureId::SubsurfaceNormalizedDiffusion.input_values_kind(),
            Some(InputValuesKind::Subsurface)
        );
    }
}
