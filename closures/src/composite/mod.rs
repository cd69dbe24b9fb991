//! Composite Closures

mod emission;
mod limits;
mod pool;
mod subsurface;
mod surface;

use crate::closure_id::*;
use crate::error::*;
use crate::input_values::*;
use pbrt_core::geometry::*;
use pbrt_core::pbrt::*;
use pbrt_core::sampler::Sampler;
use pbrt_core::sampling::*;
use pbrt_core::spectrum::*;
use pbrt_core::{register_stats, stat_counter, stat_dist, stat_inc, stat_int_distribution, stat_percent};

// Re-export
pub use emission::*;
pub use limits::*;
pub use pool::*;
pub use subsurface::*;
pub use surface::*;

stat_counter!("Closures/Composites built", COMPOSITES_BUILT, closure_stats_composites_built);
stat_counter!("Closures/Capacity failures", CAPACITY_FAILURES, closure_stats_capacity_failures);
stat_percent!("Closures/Pruned leaves", PRUNED_LEAVES, TOTAL_LEAVES, closure_stats_pruned_leaves);
stat_int_distribution!("Closures/Entries per composite", ENTRIES_PER_COMPOSITE, closure_stats_entries);

register_stats!(
    closure_stats_composites_built,
    closure_stats_capacity_failures,
    closure_stats_pruned_leaves,
    closure_stats_entries,
);

/// One entry of a composite.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CompositeEntry {
    /// Model id; determines the payload type.
    pub closure_type: ClosureId,

    /// Shading basis of the entry.
    pub shading_basis: Basis3f,

    /// Colour weight.
    pub weight: Spectrum,

    /// Selection probability once the CDF is built.
    pub pdf_weight: Float,

    /// Offset of the payload in the pool.
    offset: usize,
}

impl CompositeEntry {
    /// Placeholder for unused slots.
    const UNUSED: Self = Self {
        closure_type: ClosureId::Debug,
        shading_basis: Basis3f::IDENTITY,
        weight: Spectrum::new(0.0),
        pdf_weight: 0.0,
        offset: 0,
    };
}

/// State shared by the surface, subsurface and emission composites: entries,
/// their payload pool and the CDF over entry weights.
#[derive(Clone)]
pub struct CompositeClosure {
    /// Entry and payload budget.
    limits: CompositeLimits,

    /// Number of committed entries.
    num_closures: usize,

    /// Entries.
    entries: [CompositeEntry; MAX_CLOSURE_ENTRIES],

    /// CDF over `pdf_weight`.
    cdf: [Float; MAX_CLOSURE_ENTRIES],

    /// Entry payloads.
    pool: InputValuesPool,
}

impl CompositeClosure {
    /// Create an empty composite with the full compiled capacity.
    pub fn new() -> Self {
        Self::with_limits(CompositeLimits::default())
    }

    /// Create an empty composite with the given budget.
    ///
    /// * `limits` - Entry and payload budget.
    pub fn with_limits(limits: CompositeLimits) -> Self {
        register_stats();

        Self {
            limits,
            num_closures: 0,
            entries: [CompositeEntry::UNUSED; MAX_CLOSURE_ENTRIES],
            cdf: [0.0; MAX_CLOSURE_ENTRIES],
            pool: InputValuesPool::new(),
        }
    }

    /// Returns the entry and payload budget.
    pub fn limits(&self) -> CompositeLimits {
        self.limits
    }

    /// Returns the number of entries.
    pub fn num_closures(&self) -> usize {
        self.num_closures
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.num_closures == 0
    }

    /// Returns the committed entries.
    pub fn entries(&self) -> &[CompositeEntry] {
        &self.entries[..self.num_closures]
    }

    /// Returns an entry.
    ///
    /// * `index` - Entry index.
    pub fn entry(&self, index: usize) -> &CompositeEntry {
        assert!(index < self.num_closures, "closure index {} out of range", index);
        &self.entries[index]
    }

    /// Returns the model id of an entry.
    ///
    /// * `index` - Entry index.
    pub fn closure_type(&self, index: usize) -> ClosureId {
        self.entry(index).closure_type
    }

    /// Returns the shading basis of an entry.
    ///
    /// * `index` - Entry index.
    pub fn shading_basis(&self, index: usize) -> &Basis3f {
        &self.entry(index).shading_basis
    }

    /// Returns the colour weight of an entry.
    ///
    /// * `index` - Entry index.
    pub fn weight(&self, index: usize) -> &Spectrum {
        &self.entry(index).weight
    }

    /// Returns the selection probability of an entry.
    ///
    /// * `index` - Entry index.
    pub fn pdf_weight(&self, index: usize) -> Float {
        self.entry(index).pdf_weight
    }

    /// Returns the CDF over the entries.
    pub fn cdf(&self) -> &[Float] {
        &self.cdf[..self.num_closures]
    }

    /// Returns the number of payload bytes in use.
    pub fn pool_bytes_used(&self) -> usize {
        self.pool.used()
    }

    /// Returns the payload of an entry.
    ///
    /// Panics if `T` is not the payload type of the entry's closure type.
    ///
    /// * `index` - Entry index.
    pub fn input_values<T: InputValues>(&self, index: usize) -> &T {
        let closure_type = self.closure_type(index);
        match self.try_input_values(index) {
            Some(values) => values,
            None => panic!(
                "closure {} stores {:?} input values, not {:?}",
                closure_type,
                closure_type.input_values_kind(),
                T::KIND
            ),
        }
    }

    /// Returns the payload of an entry, or `None` if `T` is not its payload
    /// type.
    ///
    /// * `index` - Entry index.
    pub fn try_input_values<T: InputValues>(&self, index: usize) -> Option<&T> {
        let entry = self.entry(index);
        if entry.closure_type.input_values_kind() == Some(T::KIND) {
            // SAFETY: `add_closure()` stored a payload of the kind matching
            // the entry's closure type at this offset.
            Some(unsafe { self.pool.get::<T>(entry.offset) })
        } else {
            None
        }
    }

    /// Returns the payload of an entry without checking its type in release
    /// builds.
    ///
    /// # Safety
    ///
    /// `T` must be the payload type of `closure_type(index)`.
    ///
    /// * `index` - Entry index.
    pub unsafe fn input_values_unchecked<T: InputValues>(&self, index: usize) -> &T {
        debug_assert!(index < self.num_closures);
        let entry = &self.entries[index];
        debug_assert_eq!(entry.closure_type.input_values_kind(), Some(T::KIND));
        self.pool.get::<T>(entry.offset)
    }

    /// Returns the payload of an entry for modification, or `None` if `T` is
    /// not its payload type.
    ///
    /// * `index` - Entry index.
    pub(crate) fn input_values_mut<T: InputValues>(&mut self, index: usize) -> Option<&mut T> {
        let entry = *self.entry(index);
        if entry.closure_type.input_values_kind() == Some(T::KIND) {
            // SAFETY: see `try_input_values()`.
            Some(unsafe { self.pool.get_mut::<T>(entry.offset) })
        } else {
            None
        }
    }

    /// Selects an entry given a sample in [0, 1).
    ///
    /// * `u` - The sample.
    pub fn choose(&self, u: Float) -> usize {
        assert!(self.num_closures > 0, "choose() on an empty composite");
        sample_cdf_linear_search(self.cdf(), u)
    }

    /// Selects an entry with one dimension drawn from a sampler.
    ///
    /// * `sampler` - The sampler.
    pub fn choose_with_sampler<S: Sampler + ?Sized>(&self, sampler: &mut S) -> usize {
        let u = sampler.get_1d();
        self.choose(u)
    }

    /// Removes all entries and payloads.
    pub(crate) fn reset(&mut self) {
        self.num_closures = 0;
        self.pool.clear();
    }

    /// Commits an entry. Nothing is written if the entry or its payload
    /// exceed the budget.
    ///
    /// * `closure_type`  - Model id.
    /// * `shading_basis` - Shading basis.
    /// * `weight`        - Colour weight.
    /// * `pdf_weight`    - Unnormalized selection weight; must be positive.
    /// * `values`        - The payload.
    pub(crate) fn add_closure<T: InputValues>(
        &mut self,
        closure_type: ClosureId,
        shading_basis: Basis3f,
        weight: Spectrum,
        pdf_weight: Float,
        values: T,
    ) -> ClosureResult<usize> {
        debug_assert_eq!(closure_type.input_values_kind(), Some(T::KIND));
        debug_assert!(pdf_weight > 0.0);

        if self.num_closures >= self.limits.max_closures() || !self.pool.fits::<T>(self.limits.max_pool_size()) {
            stat_inc!(CAPACITY_FAILURES, 1);
            debug!(
                "closure {} rejected with {} entries and {} payload bytes in use",
                closure_type,
                self.num_closures,
                self.pool.used()
            );
            return Err(ClosureError::CapacityExceeded {
                max_closures: self.limits.max_closures(),
                max_pool_size: self.limits.max_pool_size(),
            });
        }

        let index = self.num_closures;
        let offset = self.pool.push(values);
        self.entries[index] = CompositeEntry {
            closure_type,
            shading_basis,
            weight,
            pdf_weight,
            offset,
        };
        self.num_closures += 1;
        Ok(index)
    }

    /// Builds the CDF and normalizes the pdf weights.
    pub(crate) fn compute_cdf(&mut self) {
        let n = self.num_closures;
        for (c, e) in self.cdf.iter_mut().zip(self.entries.iter()).take(n) {
            *c = e.pdf_weight;
        }

        let total = build_cdf_in_place(&mut self.cdf[..n]);
        if n == 1 {
            self.entries[0].pdf_weight = 1.0;
        } else if total > 0.0 {
            let rcp_total = 1.0 / total;
            for e in self.entries.iter_mut().take(n) {
                e.pdf_weight *= rcp_total;
            }
        }
    }

    /// Records statistics for a finished build.
    pub(crate) fn record_build(&self) {
        stat_inc!(COMPOSITES_BUILT, 1);
        stat_dist!(ENTRIES_PER_COMPOSITE, self.num_closures as i64);
    }
}

impl Default for CompositeClosure {
    fn default() -> Self {
        Self::new()
    }
}

/// Records a leaf visited by a flattening pass.
///
/// * `pruned` - Whether the leaf was culled.
pub(crate) fn record_leaf(pruned: bool) {
    stat_inc!(TOTAL_LEAVES, 1);
    if pruned {
        stat_inc!(PRUNED_LEAVES, 1);
    }
}

/// Returns the shading basis of an entry. A normal that is zero, too small
/// to normalize or not finite keeps the original basis; otherwise the
/// normalized normal is combined with the tangent, or with the original
/// tangent if there is none or it is zero.
///
/// * `normal`                 - Closure normal.
/// * `tangent`                - Closure tangent, if the closure has one.
/// * `original_shading_basis` - Shading basis of the shading point.
pub fn compute_closure_shading_basis(
    normal: &Vector3f,
    tangent: Option<&Vector3f>,
    original_shading_basis: &Basis3f,
) -> Basis3f {
    let normal_length_squared = normal.length_squared();
    if normal_length_squared < Float::MIN_POSITIVE || !normal_length_squared.is_finite() {
        return *original_shading_basis;
    }

    let n = *normal / normal_length_squared.sqrt();
    if abs(n.length_squared() - 1.0) >= 1e-3 {
        return *original_shading_basis;
    }

    match tangent {
        Some(t) if t.length_squared() >= Float::MIN_POSITIVE => Basis3f::new(n, t.normalize()),
        _ => Basis3f::new(n, original_shading_basis.tangent_u()),
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
