//! Random Sampler.

use super::Sampler;
use crate::pbrt::*;
use crate::rng::*;

/// Implements a sampler that uses a PRNG to generate uniformly random samples.
#[derive(Clone, Debug, Default)]
pub struct RandomSampler {
    /// The random number generator.
    rng: RNG,

    /// Number of dimensions consumed so far.
    dimension: usize,
}

impl RandomSampler {
    /// Create a new `RandomSampler`.
    ///
    /// * `seed`   - Optional seed for the random number generator.
    /// * `stream` - The random number stream, typically a worker index.
    pub fn new(seed: Option<u64>, stream: u64) -> Self {
        Self {
            rng: match seed {
                Some(s) => RNG::with_seed(s, stream),
                None => RNG::new(stream),
            },
            dimension: 0,
        }
    }

    /// Returns the number of dimensions consumed so far.
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl Sampler for RandomSampler {
    /// Returns the sample value for the next dimension of the current sample vector.
    fn get_1d(&mut self) -> Float {
        self.dimension += 1;
        self.rng.uniform_float()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_dimensions() {
        let mut sampler = RandomSampler::new(Some(1), 0);
        let _ = sampler.get_1d();
        let _ = sampler.get_2d();
        assert_eq!(sampler.dimension(), 3);
    }

    #[test]
    fn seeded_samplers_are_reproducible() {
        let mut a = RandomSampler::new(Some(99), 3);
        let mut b = RandomSampler::new(Some(99), 3);
        for _ in 0..16 {
            assert_eq!(a.get_1d(), b.get_1d());
        }
    }
}
