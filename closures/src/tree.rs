//! Closure Trees

use crate::closure_id::ClosureId;
use crate::params::ParamValue;
use pbrt_core::spectrum::*;

/// A closure tree as produced by evaluating a shading network. The tree is
/// owned by the shading runtime; composites only borrow it while flattening.
#[derive(Clone, Debug, PartialEq)]
pub enum ClosureTree {
    /// Tints a sub-tree.
    Mul {
        weight: Spectrum,
        closure: Box<ClosureTree>,
    },

    /// Sums two sub-trees.
    Add { a: Box<ClosureTree>, b: Box<ClosureTree> },

    /// A weighted closure.
    Component(ClosureComponent),
}

/// A leaf of the closure tree.
#[derive(Clone, Debug, PartialEq)]
pub struct ClosureComponent {
    /// Closure id.
    pub id: ClosureId,

    /// Colour weight.
    pub weight: Spectrum,

    /// Parameter values in schema order.
    pub params: Vec<ParamValue>,
}

impl ClosureTree {
    /// Create a leaf.
    ///
    /// * `id`     - Closure id.
    /// * `weight` - Colour weight.
    /// * `params` - Parameter values.
    pub fn component(id: ClosureId, weight: Spectrum, params: Vec<ParamValue>) -> Self {
        Self::Component(ClosureComponent { id, weight, params })
    }

    /// Create a tinted sub-tree.
    ///
    /// * `weight`  - Tint.
    /// * `closure` - The sub-tree.
    pub fn mul(weight: Spectrum, closure: ClosureTree) -> Self {
        Self::Mul {
            weight,
            closure: Box::new(closure),
        }
    }

    /// Create the sum of two sub-trees.
    ///
    /// * `a` - First sub-tree.
    /// * `b` - Second sub-tree.
    pub fn add(a: ClosureTree, b: ClosureTree) -> Self {
        Self::Add {
            a: Box::new(a),
            b: Box::new(b),
        }
    }

    /// Folds a sequence of sub-trees into a left-leaning sum. Returns `None`
    /// for an empty sequence.
    ///
    /// * `trees` - The sub-trees.
    pub fn sum<I: IntoIterator<Item = ClosureTree>>(trees: I) -> Option<Self> {
        trees.into_iter().reduce(Self::add)
    }

    /// Returns the number of leaves, including leaves of nested substrates.
    pub fn num_components(&self) -> usize {
        match self {
            Self::Mul { closure, .. } => closure.num_components(),
            Self::Add { a, b } => a.num_components() + b.num_components(),
            Self::Component(c) => 1 + c.substrate().map_or(0, |s| s.num_components()),
        }
    }
}

impl ClosureComponent {
    /// Returns the nested substrate of a layered closure. Layered closures
    /// carry it as their first parameter.
    pub fn substrate(&self) -> Option<&ClosureTree> {
        if !self.id.is_layered() {
            return None;
        }
        match self.params.first() {
            Some(ParamValue::Closure(substrate)) => substrate.as_deref(),
            _ => None,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_components_through_substrates() {
        let diffuse = ClosureTree::component(ClosureId::Diffuse, Spectrum::new(1.0), vec![]);
        let layer = ClosureTree::component(
            ClosureId::AlSurfaceLayer,
            Spectrum::new(1.0),
            vec![ParamValue::Closure(Some(Box::new(diffuse.clone())))],
        );
        let tree = ClosureTree::add(ClosureTree::mul(Spectrum::new(0.5), layer), diffuse);
        assert_eq!(tree.num_components(), 3);
    }

    #[test]
    fn substrate_only_for_layered_ids() {
        let nested = Some(Box::new(ClosureTree::component(ClosureId::Diffuse, Spectrum::new(1.0), vec![])));
        let c = ClosureComponent {
            id: ClosureId::Glass,
            weight: Spectrum::new(1.0),
            params: vec![ParamValue::Closure(nested)],
        };
        assert!(c.substrate().is_none());
    }

    #[test]
    fn sum_of_nothing() {
        assert!(ClosureTree::sum(std::iter::empty()).is_none());
    }
}
