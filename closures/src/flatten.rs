//! Closure Tree Flattening

use crate::error::*;
use crate::registry::ClosureRegistry;
use crate::tree::*;
use pbrt_core::geometry::*;
use pbrt_core::spectrum::*;

/// A composite that accepts the leaves of a closure tree.
pub(crate) trait ProcessComponent {
    /// Handles one leaf.
    ///
    /// * `registry`               - Closure registry.
    /// * `original_shading_basis` - Shading basis of the shading point.
    /// * `component`              - The leaf.
    /// * `tint`                   - Tint accumulated above the leaf.
    /// * `weight`                 - Accumulated tint times the leaf weight.
    fn process_component(
        &mut self,
        registry: &ClosureRegistry,
        original_shading_basis: &Basis3f,
        component: &ClosureComponent,
        tint: &Spectrum,
        weight: &Spectrum,
    ) -> ClosureResult<()>;
}

/// Walks a closure tree, accumulating tint along each path, and hands every
/// leaf to the composite. Stops at the first error.
///
/// * `composite`              - The composite receiving the leaves.
/// * `registry`               - Closure registry.
/// * `tree`                   - The closure tree.
/// * `original_shading_basis` - Shading basis of the shading point.
/// * `weight`                 - Tint accumulated so far.
pub(crate) fn process_closure_tree<C: ProcessComponent + ?Sized>(
    composite: &mut C,
    registry: &ClosureRegistry,
    tree: &ClosureTree,
    original_shading_basis: &Basis3f,
    weight: &Spectrum,
) -> ClosureResult<()> {
    match tree {
        ClosureTree::Mul { weight: tint, closure } => process_closure_tree(
            composite,
            registry,
            closure,
            original_shading_basis,
            &(*weight * *tint),
        ),
        ClosureTree::Add { a, b } => {
            process_closure_tree(composite, registry, a, original_shading_basis, weight)?;
            process_closure_tree(composite, registry, b, original_shading_basis, weight)
        }
        ClosureTree::Component(c) => {
            composite.process_component(registry, original_shading_basis, c, weight, &(*weight * c.weight))
        }
    }
}
