//! Emission Composite

use super::*;
use crate::flatten::*;
use crate::params::ParamReader;
use crate::registry::*;
use crate::tree::*;
use std::ops::Deref;

/// Composite of the EDF entries of a shading point. Entries are selected by
/// the maximum component of their weight rather than its luminance.
#[derive(Clone, Default)]
pub struct CompositeEmissionClosure {
    /// Entries, payloads and CDF.
    base: CompositeClosure,
}

impl CompositeEmissionClosure {
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
    /// * `registry` - Closure registry.
    /// * `tree`     - The closure tree.
    pub fn from_tree(registry: &ClosureRegistry, tree: &ClosureTree) -> ClosureResult<Self> {
        let mut composite = Self::new();
        composite.build(registry, tree)?;
        Ok(composite)
    }

    /// Clears the composite and flattens a closure tree into it. The CDF is
    /// built even if flattening fails.
    ///
    /// * `registry` - Closure registry.
    /// * `tree`     - The closure tree.
    pub fn build(&mut self, registry: &ClosureRegistry, tree: &ClosureTree) -> ClosureResult<()> {
        self.base.reset();
        let result = process_closure_tree(self, registry, tree, &Basis3f::IDENTITY, &Spectrum::new(1.0));
        self.base.compute_cdf();
        self.base.record_build();
        result
    }

    /// Commits an entry weighted by `max_weight_component`.
    ///
    /// * `closure_type`         - EDF model id.
    /// * `weight`               - Colour weight.
    /// * `max_weight_component` - Largest component of `weight`.
    /// * `values`               - The payload.
    pub fn add_closure(
        &mut self,
        closure_type: ClosureId,
        weight: &Spectrum,
        max_weight_component: Float,
        values: EmissionValues,
    ) -> ClosureResult<usize> {
        self.base
            .add_closure(closure_type, Basis3f::IDENTITY, *weight, max_weight_component, values)
    }
}

impl Deref for CompositeEmissionClosure {
    type Target = CompositeClosure;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl ProcessComponent for CompositeEmissionClosure {
    fn process_component(
        &mut self,
        registry: &ClosureRegistry,
        original_shading_basis: &Basis3f,
        component: &ClosureComponent,
        _tint: &Spectrum,
        weight: &Spectrum,
    ) -> ClosureResult<()> {
        let max_weight_component = weight.max_component_value();
        let pruned = max_weight_component <= 0.0;
        record_leaf(pruned);
        if pruned {
            trace!("pruned {} with weight {}", component.id, weight);
            return Ok(());
        }

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
        match desc.converter {
            ClosureConverter::Emission(convert) => {
                let mut params = ParamReader::new(desc.name, desc.params, &component.params);
                convert(self, &mut params, weight, max_weight_component)
            }
            _ => Ok(()),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
