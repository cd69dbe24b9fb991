//! Composite Limits

use pbrt_core::pbrt::*;

/// Maximum number of entries in a composite.
pub const MAX_CLOSURE_ENTRIES: usize = 8;

/// Size in bytes of a composite's payload pool.
pub const MAX_POOL_SIZE: usize = 1024;

/// Alignment of every payload in the pool.
pub const INPUT_VALUES_ALIGNMENT: usize = 16;

/// Runtime entry and payload budget of a composite. Both limits are capped at
/// the compiled capacity.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CompositeLimits {
    /// Maximum number of entries.
    max_closures: usize,

    /// Maximum number of payload bytes.
    max_pool_size: usize,
}

impl CompositeLimits {
    /// Create new `CompositeLimits`.
    ///
    /// * `max_closures`  - Maximum number of entries.
    /// * `max_pool_size` - Maximum number of payload bytes.
    pub fn new(max_closures: usize, max_pool_size: usize) -> Self {
        Self {
            max_closures: min(max_closures, MAX_CLOSURE_ENTRIES),
            max_pool_size: min(max_pool_size, MAX_POOL_SIZE),
        }
    }

    /// Returns the maximum number of entries.
    pub fn max_closures(&self) -> usize {
        self.max_closures
    }

    /// Returns the maximum number of payload bytes.
    pub fn max_pool_size(&self) -> usize {
        self.max_pool_size
    }
}

impl Default for CompositeLimits {
    /// Returns the compiled capacity.
    fn default() -> Self {
        Self {
            max_closures: MAX_CLOSURE_ENTRIES,
            max_pool_size: MAX_POOL_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_capped() {
        let limits = CompositeLimits::new(100, 1 << 20);
        assert_eq!(limits, CompositeLimits::default());

        let limits = CompositeLimits::new(2, 64);
        assert_eq!(limits.max_closures(), 2);
        assert_eq!(limits.max_pool_size(), 64);
    }
}
