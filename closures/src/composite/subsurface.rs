//! Subsurface Composite

use super::*;
use crate::flatten::*;
use crate::params::ParamReader;
use crate::registry::*;
use crate::tree::*;
use std::ops::Deref;

/// Composite of the BSSRDF entries of a shading point. Layered closures are
/// transparent here: only their substrate contributes entries.
#[derive(Clone, Default)]
pub struct CompositeSubsurfaceClosure {
    /// Entries, payloads and CDF.
    base: CompositeClosure,
}

impl CompositeSubsurfaceClosure {
    /// Create an empty composite with the full compiled capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty composite with the given budget.
    ///
    /// * `limits` - Entry and payload budget.
    pub fn with_limits(limits: CompositeLimits) -> Self {
        Self {
            base: CompositeClosure::with_limits(limits),
        }
    }

    /// Flattens a closure tree into a new composite.
    ///
    /// * `registry`               - Closure registry.
    /// * `original_shading_basis` - Shading basis of the shading point.
    /// * `tree`                   - The closure tree.
    pub fn from_tree(
        registry: &ClosureRegistry,
        original_shading_basis: &Basis3f,
        tree: &ClosureTree,
    ) -> ClosureResult<Self> {
        let mut composite = Self::new();
        composite.build(registry, original_shading_basis, tree)?;
        Ok(composite)
    }

    /// Clears the composite and flattens a closure tree into it. The CDF is
    /// built even if flattening fails.
    ///
    /// * `registry`               - Closure registry.
    /// * `original_shading_basis` - Shading basis of the shading point.
    /// * `tree`                   - The closure tree.
    pub fn build(
        &mut self,
        registry: &ClosureRegistry,
        original_shading_basis: &Basis3f,
        tree: &ClosureTree,
    ) -> ClosureResult<()> {
        self.base.reset();
        let result = process_closure_tree(self, registry, tree, original_shading_basis, &Spectrum::new(1.0));
        self.base.compute_cdf();
        self.base.record_build();
        result
    }

    /// Commits an entry weighted by the luminance of its colour weight.
    ///
    /// * `closure_type`           - BSSRDF model id.
    /// * `original_shading_basis` - Shading basis of the shading point.
    /// * `weight`                 - Colour weight.
    /// * `normal`                 - Closure normal.
    /// * `values`                 - The payload.
    pub fn add_closure(
        &mut self,
        closure_type: ClosureId,
        original_shading_basis: &Basis3f,
        weight: &Spectrum,
        normal: &Vector3f,
        values: SubsurfaceValues,
    ) -> ClosureResult<usize> {
        debug_assert!(closure_type.is_subsurface_model());
        let basis = compute_closure_shading_basis(normal, None, original_shading_basis);
        self.base.add_closure(closure_type, basis, *weight, weight.y(), values)
    }
}

impl Deref for CompositeSubsurfaceClosure {
    type Target = CompositeClosure;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl ProcessComponent for CompositeSubsurfaceClosure {
    fn process_component(
        &mut self,
        registry: &ClosureRegistry,
        original_shading_basis: &Basis3f,
        component: &ClosureComponent,
        _tint: &Spectrum,
        weight: &Spectrum,
    ) -> ClosureResult<()> {
        if component.id.is_layered() {
            return match component.substrate() {
                Some(substrate) => {
                    trace!("processing substrate of {}", component.id);
                    process_closure_tree(self, registry, substrate, original_shading_basis, weight)
                }
                None => Ok(()),
            };
        }

        let Some(desc) = registry.get(component.id) else {
            return Ok(());
        };
        let ClosureConverter::Subsurface(convert) = desc.converter else {
            return Ok(());
        };

        let pruned = weight.y() <= 0.0;
        record_leaf(pruned);
        if pruned {
            trace!("pruned {} with weight {}", component.id, weight);
            return Ok(());
        }

        let mut params = ParamReader::new(desc.name, desc.params, &component.params);
        convert(self, original_shading_basis, &mut params, weight)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;
    use float_cmp::*;

    fn subsurface(w: Spectrum, profile: &str) -> ClosureTree {
        ClosureTree::component(
            ClosureId::Subsurface,
            w,
            vec![
                ParamValue::String(profile.to_string()),
                ParamValue::Vector(Vector3f::zero()),
                ParamValue::Color(Spectrum::new(0.5)),
                ParamValue::Color(Spectrum::new(1.0)),
                ParamValue::Float(1.4),
            ],
        )
    }

    #[test]
    fn profiles_are_weighted_by_luminance() {
        let registry = ClosureRegistry::with_builtin_closures();
        let basis = Basis3f::new(Vector3f::new(0.0, 1.0, 0.0), Vector3f::new(1.0, 0.0, 0.0));
        let tree = ClosureTree::add(
            subsurface(Spectrum::new(1.0), "better_dipole"),
            ClosureTree::mul(Spectrum::new(3.0), subsurface(Spectrum::new(1.0), "normalized_diffusion")),
        );
        let c = CompositeSubsurfaceClosure::from_tree(&registry, &basis, &tree).expect("composite");

        assert_eq!(c.num_closures(), 2);
        assert_eq!(c.closure_type(0), ClosureId::SubsurfaceBetterDipole);
        assert_eq!(c.closure_type(1), ClosureId::SubsurfaceNormalizedDiffusion);
        assert!(approx_eq!(f32, c.pdf_weight(0), 0.25, epsilon = 1e-6));
        assert_eq!(*c.shading_basis(0), basis);
    }

    #[test]
    fn error_keeps_earlier_entries() {
        let registry = ClosureRegistry::with_builtin_closures();
        let tree = ClosureTree::add(
            subsurface(Spectrum::new(1.0), "standard_dipole"),
            subsurface(Spectrum::new(1.0), "gaussian"),
        );
        let mut c = CompositeSubsurfaceClosure::new();
        assert_eq!(
            c.build(&registry, &Basis3f::default(), &tree),
            Err(ClosureError::InvalidProfile("gaussian".to_string()))
        );
        assert_eq!(c.num_closures(), 1);
        assert_eq!(c.pdf_weight(0), 1.0);
    }

    #[test]
    fn zero_weight_profile_is_pruned() {
        let registry = ClosureRegistry::with_builtin_closures();
        let tree = subsurface(Spectrum::new(0.0), "unknown");
        let c = CompositeSubsurfaceClosure::from_tree(&registry, &Basis3f::default(), &tree).expect("composite");
        assert!(c.is_empty());
    }
}
