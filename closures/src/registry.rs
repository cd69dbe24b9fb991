//! Closure Registry

use crate::builtin::register_closures;
use crate::closure_id::*;
use crate::composite::*;
use crate::error::*;
use crate::params::*;
use bitflags::bitflags;
use pbrt_core::geometry::*;
use pbrt_core::pbrt::*;
use pbrt_core::spectrum::*;
use std::collections::HashMap;
use std::fmt;

bitflags! {
    /// Composites a closure contributes to.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct CompositeKind: u8 {
        const SURFACE = 1;
        const SUBSURFACE = 2;
        const EMISSION = 4;
        const LAYERED = 8;
    }
}

impl CompositeKind {
    /// Markers handled by the scalar tree helpers only.
    pub const MARKER: Self = Self::empty();

    /// Tests a single affinity flag and returns whether it is set or not.
    ///
    /// * `other` - Flag to match.
    pub fn matches(&self, other: Self) -> bool {
        self.intersects(other)
    }
}

impl fmt::Display for CompositeKind {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("marker");
        }
        let names: Vec<&str> = self
            .iter_names()
            .map(|(name, _)| match name {
                "SURFACE" => "surface",
                "SUBSURFACE" => "subsurface",
                "EMISSION" => "emission",
                _ => "layered",
            })
            .collect();
        f.write_str(&names.join("|"))
    }
}

/// Converts a surface leaf and commits its entry.
pub type SurfaceConverter =
    fn(&mut CompositeSurfaceClosure, &Basis3f, &mut ParamReader<'_>, &Spectrum) -> ClosureResult<()>;

/// Converts a subsurface leaf and commits its entry.
pub type SubsurfaceConverter =
    fn(&mut CompositeSubsurfaceClosure, &Basis3f, &mut ParamReader<'_>, &Spectrum) -> ClosureResult<()>;

/// Converts an emission leaf and commits its entry. The last argument is the
/// largest component of the weight.
pub type EmissionConverter =
    fn(&mut CompositeEmissionClosure, &mut ParamReader<'_>, &Spectrum, Float) -> ClosureResult<()>;

/// Dispatch entry of a closure.
#[derive(Copy, Clone)]
pub enum ClosureConverter {
    /// Contributes no entries.
    Nop,
    Surface(SurfaceConverter),
    Subsurface(SubsurfaceConverter),
    Emission(EmissionConverter),
}

impl fmt::Debug for ClosureConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Nop => "Nop",
            Self::Surface(_) => "Surface",
            Self::Subsurface(_) => "Subsurface",
            Self::Emission(_) => "Emission",
        };
        f.write_str(s)
    }
}

/// Static description of a closure kind.
#[derive(Copy, Clone, Debug)]
pub struct ClosureDescriptor {
    /// Closure id.
    pub id: ClosureId,

    /// Name used by shaders.
    pub name: &'static str,

    /// Parameter schema.
    pub params: &'static [ParamDesc],

    /// Composites the closure contributes to.
    pub affinity: CompositeKind,

    /// Converter invoked for surviving leaves.
    pub converter: ClosureConverter,
}

impl ClosureDescriptor {
    /// Checks arity and types of a declaration against the schema.
    ///
    /// * `values` - Parameter values.
    pub fn check_params(&self, values: &[ParamValue]) -> ClosureResult<()> {
        check_params(self.name, self.params, values)
    }
}

impl PartialEq for ClosureDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name && self.params == other.params && self.affinity == other.affinity
    }
}

/// Process-wide table of closure kinds. It is filled once before any
/// composite is built and only read afterwards.
#[derive(Clone, Debug)]
pub struct ClosureRegistry {
    /// Descriptors indexed by closure id.
    descriptors: Vec<Option<ClosureDescriptor>>,

    /// Closure ids by name.
    names: HashMap<&'static str, ClosureId>,
}

impl ClosureRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            descriptors: vec![None; NUM_CLOSURE_IDS],
            names: HashMap::new(),
        }
    }

    /// Create a registry holding the built-in closures.
    pub fn with_builtin_closures() -> Self {
        let mut registry = Self::new();
        register_closures(&mut registry);
        registry
    }

    /// Registers a closure.
    ///
    /// Panics if the id or name is already registered or if the layered
    /// affinity does not match the id range.
    ///
    /// * `desc` - The descriptor.
    pub fn register(&mut self, desc: ClosureDescriptor) {
        let slot = &mut self.descriptors[desc.id.index()];
        assert!(slot.is_none(), "closure {} registered twice", desc.id);
        assert!(
            !self.names.contains_key(desc.name),
            "closure name '{}' registered twice",
            desc.name
        );
        assert_eq!(
            desc.affinity.contains(CompositeKind::LAYERED),
            desc.id.is_layered(),
            "closure {} layered affinity does not match its id",
            desc.id
        );

        *slot = Some(desc);
        self.names.insert(desc.name, desc.id);
        debug!("registered closure {} as {} ({})", desc.name, desc.id, desc.affinity);
    }

    /// Returns the descriptor of a closure id.
    ///
    /// * `id` - Closure id.
    pub fn get(&self, id: ClosureId) -> Option<&ClosureDescriptor> {
        self.descriptors[id.index()].as_ref()
    }

    /// Returns the descriptor of a closure name.
    ///
    /// * `name` - Closure name.
    pub fn get_by_name(&self, name: &str) -> Option<&ClosureDescriptor> {
        self.names.get(name).and_then(|id| self.get(*id))
    }

    /// Returns the number of registered closures.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no closures are registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the registered descriptors in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ClosureDescriptor> {
        self.descriptors.iter().flatten()
    }
}

impl Default for ClosureRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const NO_PARAMS: &[ParamDesc] = &[];

    fn marker(id: ClosureId, name: &'static str) -> ClosureDescriptor {
        ClosureDescriptor {
            id,
            name,
            params: NO_PARAMS,
            affinity: CompositeKind::MARKER,
            converter: ClosureConverter::Nop,
        }
    }

    #[test]
    fn lookup_round_trip() {
        let registry = ClosureRegistry::with_builtin_closures();
        let by_name = registry.get_by_name("as_glass").expect("as_glass");
        assert_eq!(by_name.id, ClosureId::Glass);
        assert_eq!(registry.get(by_name.id), Some(by_name));
    }

    #[test]
    fn builtin_set_is_complete() {
        let registry = ClosureRegistry::with_builtin_closures();
        assert_eq!(registry.len(), 18);
        assert!(registry.get(ClosureId::GlassGgx).is_none());
        assert!(registry.get_by_name("unknown").is_none());
        assert!(registry
            .iter()
            .all(|d| registry.get_by_name(d.name).map(|n| n.id) == Some(d.id)));
    }

    #[test]
    fn layered_affinity() {
        let registry = ClosureRegistry::with_builtin_closures();
        let layer = registry.get(ClosureId::AlSurfaceLayer).expect("layer");
        assert!(layer.affinity.matches(CompositeKind::LAYERED));
        assert!(registry
            .iter()
            .filter(|d| d.id != ClosureId::AlSurfaceLayer)
            .all(|d| !d.affinity.matches(CompositeKind::LAYERED)));
    }

    #[test]
    #[should_panic]
    fn double_registration_panics() {
        let mut registry = ClosureRegistry::new();
        registry.register(marker(ClosureId::Holdout, "holdout"));
        registry.register(marker(ClosureId::Holdout, "holdout2"));
    }

    #[test]
    #[should_panic]
    fn layered_id_requires_layered_affinity() {
        let mut registry = ClosureRegistry::new();
        registry.register(marker(ClosureId::AlSurfaceLayer, "as_alsurface_layer"));
    }

    #[test]
    fn affinity_display() {
        assert_eq!(CompositeKind::MARKER.to_string(), "marker");
        assert_eq!(
            (CompositeKind::SURFACE | CompositeKind::LAYERED).to_string(),
            "surface|layered"
        );
    }
}
