//! Surface Composite

use super::*;
use crate::flatten::*;
use crate::params::ParamReader;
use crate::registry::*;
use crate::tree::*;
use std::ops::Deref;

/// Composite of the BSDF entries of a shading point, plus the indices of
/// refraction contributed by transmissive entries.
#[derive(Clone)]
pub struct CompositeSurfaceClosure {
    /// Entries, payloads and CDF.
    base: CompositeClosure,

    /// Number of IOR entries.
    num_iors: usize,

    /// Indices of refraction.
    iors: [Float; MAX_CLOSURE_ENTRIES],

    /// CDF over the IOR weights.
    ior_cdf: [Float; MAX_CLOSURE_ENTRIES],
}

impl CompositeSurfaceClosure {
    /// Create an empty composite with the full compiled capacity.
    pub fn new() -> Self {
        Self::with_limits(CompositeLimits::default())
    }

    /// Create an empty composite with the given budget.
    ///
    /// * `limits` - Entry and payload budget.
    pub fn with_limits(limits: CompositeLimits) -> Self {
        Self {
            base: CompositeClosure::with_limits(limits),
            num_iors: 0,
            iors: [0.0; MAX_CLOSURE_ENTRIES],
            ior_cdf: [0.0; MAX_CLOSURE_ENTRIES],
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

    /// Clears the composite and flattens a closure tree into it. The CDFs
    /// are built even if flattening fails, over the entries committed
    /// before the failure.
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
        self.num_iors = 0;

        let result = process_closure_tree(self, registry, tree, original_shading_basis, &Spectrum::new(1.0));

        self.base.compute_cdf();
        self.compute_ior_cdf();
        self.base.record_build();
        result
    }

    /// Commits an entry weighted by the luminance of its colour weight.
    ///
    /// * `closure_type`           - Model id.
    /// * `original_shading_basis` - Shading basis of the shading point.
    /// * `weight`                 - Colour weight.
    /// * `normal`                 - Closure normal.
    /// * `tangent`                - Closure tangent, if the closure has one.
    /// * `values`                 - The payload.
    pub fn add_closure<T: InputValues>(
        &mut self,
        closure_type: ClosureId,
        original_shading_basis: &Basis3f,
        weight: &Spectrum,
        normal: &Vector3f,
        tangent: Option<&Vector3f>,
        values: T,
    ) -> ClosureResult<usize> {
        let basis = compute_closure_shading_basis(normal, tangent, original_shading_basis);
        self.base.add_closure(closure_type, basis, *weight, weight.y(), values)
    }

    /// Adds an index of refraction weighted by the luminance of `weight`.
    ///
    /// * `weight` - Colour weight of the transmissive entry.
    /// * `ior`    - Index of refraction.
    pub fn add_ior(&mut self, weight: &Spectrum, ior: Float) {
        let w = weight.y();
        debug_assert!(w > 0.0);
        debug_assert!(self.num_iors < self.base.num_closures());

        self.iors[self.num_iors] = ior;
        self.ior_cdf[self.num_iors] = w;
        self.num_iors += 1;
    }

    /// Returns the number of IOR entries. This is at least 1 once built.
    pub fn num_iors(&self) -> usize {
        self.num_iors
    }

    /// Returns an index of refraction.
    ///
    /// * `index` - IOR entry index.
    pub fn ior(&self, index: usize) -> Float {
        assert!(index < self.num_iors, "ior index {} out of range", index);
        self.iors[index]
    }

    /// Returns the CDF over the IOR entries.
    pub fn ior_cdf(&self) -> &[Float] {
        &self.ior_cdf[..self.num_iors]
    }

    /// Selects an IOR entry given a sample in [0, 1).
    ///
    /// * `u` - The sample.
    pub fn choose_ior(&self, u: Float) -> usize {
        assert!(self.num_iors > 0, "choose_ior() before build()");
        if self.num_iors == 1 {
            0
        } else {
            sample_cdf_linear_search(self.ior_cdf(), u)
        }
    }

    /// Selects an index of refraction given a sample in [0, 1).
    ///
    /// * `u` - The sample.
    pub fn sample_ior(&self, u: Float) -> Float {
        self.iors[self.choose_ior(u)]
    }

    /// Builds the IOR CDF. Without transmissive entries a single neutral
    /// IOR of 1 is used.
    fn compute_ior_cdf(&mut self) {
        if self.num_iors == 0 {
            self.num_iors = 1;
            self.iors[0] = 1.0;
            self.ior_cdf[0] = 1.0;
        } else {
            build_cdf_in_place(&mut self.ior_cdf[..self.num_iors]);
        }
    }
}

impl Default for CompositeSurfaceClosure {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for CompositeSurfaceClosure {
    type Target = CompositeClosure;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl ProcessComponent for CompositeSurfaceClosure {
    fn process_component(
        &mut self,
        registry: &ClosureRegistry,
        original_shading_basis: &Basis3f,
        component: &ClosureComponent,
        tint: &Spectrum,
        weight: &Spectrum,
    ) -> ClosureResult<()> {
        let pruned = weight.y() <= 0.0;
        record_leaf(pruned);
        if pruned {
            trace!("pruned {} with weight {}", component.id, weight);
            return Ok(());
        }

        let Some(desc) = registry.get(component.id) else {
            return Ok(());
        };
        let ClosureConverter::Surface(convert) = desc.converter else {
            return Ok(());
        };

        let first = self.base.num_closures();
        let mut params = ParamReader::new(desc.name, desc.params, &component.params);
        convert(self, original_shading_basis, &mut params, weight)?;

        if component.id.is_layered() {
            if let Some(substrate) = component.substrate() {
                trace!("processing substrate of {} entry {}", component.id, first);
                let result = process_closure_tree(self, registry, substrate, original_shading_basis, tint);

                let count = self.base.num_closures() - (first + 1);
                if let Some(layer) = self.base.input_values_mut::<AlSurfaceLayerValues>(first) {
                    layer.substrate_first = first + 1;
                    layer.substrate_count = count;
                }
                result?;
            }
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;
    use pbrt_core::rng::ONE_MINUS_EPSILON;
    use pbrt_core::sampler::RandomSampler;
    use float_cmp::*;
    use proptest::prelude::*;

    fn diffuse(w: Spectrum) -> ClosureTree {
        ClosureTree::component(
            ClosureId::Diffuse,
            w,
            vec![ParamValue::Vector(Vector3f::new(0.0, 0.0, 1.0))],
        )
    }

    fn metal(w: Spectrum) -> ClosureTree {
        ClosureTree::component(
            ClosureId::Metal,
            w,
            vec![
                ParamValue::String("ggx".to_string()),
                ParamValue::Vector(Vector3f::new(0.0, 0.0, 1.0)),
                ParamValue::Vector(Vector3f::zero()),
                ParamValue::Color(Spectrum::new(0.9)),
                ParamValue::Color(Spectrum::new(0.9)),
                ParamValue::Float(0.3),
                ParamValue::Float(0.0),
            ],
        )
    }

    fn build(tree: &ClosureTree) -> CompositeSurfaceClosure {
        let registry = ClosureRegistry::with_builtin_closures();
        CompositeSurfaceClosure::from_tree(&registry, &Basis3f::default(), tree).expect("composite")
    }

    #[test]
    fn diffuse_plus_metal() {
        let w0 = Spectrum::new(0.5);
        let w1 = Spectrum::rgb(0.2, 0.0, 0.0);
        let c = build(&ClosureTree::add(diffuse(w0), metal(w1)));

        assert_eq!(c.num_closures(), 2);
        assert_eq!(c.closure_type(0), ClosureId::OrenNayar);
        assert_eq!(c.closure_type(1), ClosureId::MetalGgx);

        let total = w0.y() + w1.y();
        assert!(approx_eq!(f32, c.pdf_weight(0), w0.y() / total, epsilon = 1e-6));
        assert!(approx_eq!(f32, c.pdf_weight(1), w1.y() / total, epsilon = 1e-6));
        assert!(approx_eq!(f32, c.cdf()[0], c.pdf_weight(0), epsilon = 1e-6));
        assert_eq!(c.cdf()[1], 1.0);
    }

    #[test]
    fn same_closure_is_never_merged() {
        let c = build(&ClosureTree::add(diffuse(Spectrum::new(0.3)), diffuse(Spectrum::new(0.6))));
        assert_eq!(c.num_closures(), 2);
        assert_eq!(c.closure_type(0), c.closure_type(1));
    }

    #[test]
    fn zero_luminance_is_pruned() {
        let c = build(&diffuse(Spectrum::new(0.0)));
        assert!(c.is_empty());
        assert!(c.cdf().is_empty());

        let c = build(&ClosureTree::mul(Spectrum::new(0.0), diffuse(Spectrum::new(1.0))));
        assert!(c.is_empty());
    }

    #[test]
    fn tint_is_applied_per_component() {
        let tint = Spectrum::rgb(0.5, 2.0, 1.0);
        let w = Spectrum::rgb(0.4, 0.25, 0.0);
        let c = build(&ClosureTree::mul(tint, ClosureTree::mul(Spectrum::new(2.0), diffuse(w))));
        assert_eq!(*c.weight(0), Spectrum::rgb(0.4, 1.0, 0.0));
        assert_eq!(c.pdf_weight(0), 1.0);
    }

    #[test]
    fn capacity_failure_keeps_committed_entries() {
        let tree = ClosureTree::sum((0..MAX_CLOSURE_ENTRIES + 2).map(|_| diffuse(Spectrum::new(1.0)))).expect("tree");
        let registry = ClosureRegistry::with_builtin_closures();
        let mut c = CompositeSurfaceClosure::new();
        assert_eq!(
            c.build(&registry, &Basis3f::default(), &tree),
            Err(ClosureError::CapacityExceeded {
                max_closures: MAX_CLOSURE_ENTRIES,
                max_pool_size: MAX_POOL_SIZE,
            })
        );
        assert_eq!(c.num_closures(), MAX_CLOSURE_ENTRIES);
        assert_eq!(c.cdf()[MAX_CLOSURE_ENTRIES - 1], 1.0);
    }

    #[test]
    fn runtime_limits() {
        let tree = ClosureTree::sum((0..3).map(|_| diffuse(Spectrum::new(1.0)))).expect("tree");
        let registry = ClosureRegistry::with_builtin_closures();
        let mut c = CompositeSurfaceClosure::with_limits(CompositeLimits::new(2, MAX_POOL_SIZE));
        assert!(c.build(&registry, &Basis3f::default(), &tree).is_err());
        assert_eq!(c.num_closures(), 2);

        // Rebuilding starts from scratch.
        assert!(c.build(&registry, &Basis3f::default(), &diffuse(Spectrum::new(1.0))).is_ok());
        assert_eq!(c.num_closures(), 1);
    }

    #[test]
    fn ior_falls_back_to_vacuum() {
        let c = build(&diffuse(Spectrum::new(1.0)));
        assert_eq!(c.num_iors(), 1);
        assert_eq!(c.ior(0), 1.0);
        assert_eq!(c.choose_ior(0.7), 0);
        assert_eq!(c.sample_ior(0.0), 1.0);
    }

    #[test]
    fn choose_with_sampler_consumes_one_dimension() {
        let c = build(&ClosureTree::add(diffuse(Spectrum::new(0.5)), metal(Spectrum::new(0.5))));
        let mut sampler = RandomSampler::new(Some(7), 0);
        for _ in 0..16 {
            assert!(c.choose_with_sampler(&mut sampler) < 2);
        }
        assert_eq!(sampler.dimension(), 16);
    }

    #[test]
    fn shading_basis_follows_closure_normal() {
        let tree = ClosureTree::component(
            ClosureId::Diffuse,
            Spectrum::new(1.0),
            vec![ParamValue::Vector(Vector3f::new(0.0, 2.0, 0.0))],
        );
        let c = build(&tree);
        assert_eq!(c.shading_basis(0).normal(), Vector3f::new(0.0, 1.0, 0.0));

        let c = build(&diffuse(Spectrum::new(1.0)));
        assert_eq!(c.shading_basis(0).normal(), Vector3f::new(0.0, 0.0, 1.0));
    }

    proptest! {
        #[test]
        fn cdf_invariants(
            weights in prop::collection::vec((0.0..4.0f32, 0.0..4.0f32, 0.0..4.0f32), 1..=MAX_CLOSURE_ENTRIES),
            u in 0.0..1.0f32,
        ) {
            let tree = ClosureTree::sum(
                weights.iter().map(|&(r, g, b)| diffuse(Spectrum::rgb(r, g, b)))
            ).expect("tree");
            let c = build(&tree);
            let n = c.num_closures();
            let expected = weights.iter().filter(|&&(r, g, b)| Spectrum::rgb(r, g, b).y() > 0.0).count();
            prop_assert_eq!(n, expected);
            prop_assume!(n > 0 && c.pdf_weight(n - 1) > 1e-3);

            let cdf = c.cdf();
            prop_assert!(cdf.windows(2).all(|w| w[0] <= w[1]));
            prop_assert_eq!(cdf[n - 1], 1.0);

            let sum: Float = c.entries().iter().map(|e| e.pdf_weight).sum();
            prop_assert!(approx_eq!(f32, sum, 1.0, epsilon = 1e-5));
            prop_assert!(c.entries().iter().all(|e| e.pdf_weight > 0.0));

            prop_assert_eq!(c.choose(0.0), 0);
            prop_assert_eq!(c.choose(ONE_MINUS_EPSILON), n - 1);
            prop_assert!(c.choose(u) < n);
        }
    }
}
