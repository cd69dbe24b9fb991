//! Scalar Tree Helpers
//!
//! Exact sums over a closure tree for quantities that are never sampled.

use crate::closure_id::ClosureId;
use crate::tree::*;
use pbrt_core::pbrt::*;
use pbrt_core::spectrum::*;

/// Returns the accumulated weight of every leaf with the given id. Tints and
/// the weights of layered closures scale the contributions below them.
///
/// * `tree` - The closure tree.
/// * `id`   - Closure id to accumulate.
pub fn process_closure_id_tree(tree: &ClosureTree, id: ClosureId) -> Spectrum {
    match tree {
        ClosureTree::Mul { weight, closure } => *weight * process_closure_id_tree(closure, id),
        ClosureTree::Add { a, b } => process_closure_id_tree(a, id) + process_closure_id_tree(b, id),
        ClosureTree::Component(c) if c.id == id => c.weight,
        ClosureTree::Component(c) => match c.substrate() {
            Some(substrate) => c.weight * process_closure_id_tree(substrate, id),
            None => Spectrum::new(0.0),
        },
    }
}

/// Returns the opacity of a shading point: 1 minus the saturated luminance
/// of its `transparent` closures.
///
/// * `tree` - The closure tree.
pub fn process_transparency_tree(tree: &ClosureTree) -> Float {
    let transparency = saturate(process_closure_id_tree(tree, ClosureId::Transparent).y());
    1.0 - transparency
}

/// Returns the saturated luminance of the `holdout` closures.
///
/// * `tree` - The closure tree.
pub fn process_holdout_tree(tree: &ClosureTree) -> Float {
    saturate(process_closure_id_tree(tree, ClosureId::Holdout).y())
}

/// Returns the accumulated `background` colour.
///
/// * `tree` - The closure tree.
pub fn process_background_tree(tree: &ClosureTree) -> Spectrum {
    process_closure_id_tree(tree, ClosureId::Background)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
