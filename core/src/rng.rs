//! Random Number Generator.

use crate::pbrt::*;

/// 32-bit precision value for 1 - epsilon.
pub const FLOAT_ONE_MINUS_EPSILON: f32 = hexf32!("0x1.fffffep-1"); // 0.99999994

/// 1 - epsilon in the precision we've selected for `Float`.
pub const ONE_MINUS_EPSILON: Float = FLOAT_ONE_MINUS_EPSILON;

const PCG32_DEFAULT_STATE: u64 = 0x853c49e6748fea9b;
const PCG32_DEFAULT_STREAM: u64 = 0xda3e39cb94b95bdb;
const PCG32_MULT: u64 = 0x5851f42d4c957f2d;

/// PCG32 pseudo-random number generator.
#[derive(Clone, Debug)]
pub struct RNG {
    state: u64,
    inc: u64,
}

impl Default for RNG {
    /// Return a new instance of `RNG` with default state and stream.
    fn default() -> Self {
        Self {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }
}

impl RNG {
    /// Create a new `RNG` on the given stream.
    ///
    /// * `sequence_index` - The stream to select.
    pub fn new(sequence_index: u64) -> Self {
        Self::with_seed(PCG32_DEFAULT_STATE, sequence_index)
    }

    /// Create a new `RNG` with an explicit seed on the given stream.
    ///
    /// * `seed`           - Initial state offset.
    /// * `sequence_index` - The stream to select.
    pub fn with_seed(seed: u64, sequence_index: u64) -> Self {
        let mut ret = Self {
            state: 0,
            inc: (sequence_index << 1) | 1,
        };
        let _ = ret.uniform_u32();
        ret.state = ret.state.wrapping_add(seed);
        let _ = ret.uniform_u32();
        ret
    }

    /// Returns a uniformly distributed u32 value.
    #[inline(always)]
    pub fn uniform_u32(&mut self) -> u32 {
        let old_state = self.state;
        self.state = old_state.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);

        let xor_shifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xor_shifted.rotate_right(rot)
    }

    /// Returns a uniformly distributed value over the half open interval [0.0, 1.0).
    pub fn uniform_float(&mut self) -> Float {
        min(
            self.uniform_u32() as Float * hexf32!("0x1.0p-32") as Float,
            ONE_MINUS_EPSILON,
        )
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RNG::with_seed(42, 7);
        let mut b = RNG::with_seed(42, 7);
        for _ in 0..100 {
            assert_eq!(a.uniform_u32(), b.uniform_u32());
        }
    }

    #[test]
    fn different_streams_differ() {
        let mut a = RNG::new(1);
        let mut b = RNG::new(2);
        let same = (0..32).filter(|_| a.uniform_u32() == b.uniform_u32()).count();
        assert!(same < 32);
    }

    #[test]
    fn uniform_float_in_unit_interval() {
        let mut rng = RNG::default();
        for _ in 0..10_000 {
            let u = rng.uniform_float();
            assert!((0.0..1.0).contains(&u));
        }
    }
}
