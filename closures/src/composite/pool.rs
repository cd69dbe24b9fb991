//! Payload Pool

use super::limits::*;
use crate::input_values::InputValues;
use pbrt_core::pbrt::*;
use static_assertions::const_assert;
use std::mem::{size_of, MaybeUninit};
use std::ptr;

const_assert!(INPUT_VALUES_ALIGNMENT.is_power_of_two());
const_assert!(MAX_POOL_SIZE % INPUT_VALUES_ALIGNMENT == 0);

/// Pool storage aligned for every payload type.
#[derive(Copy, Clone)]
#[repr(C, align(16))]
struct AlignedBytes([MaybeUninit<u8>; MAX_POOL_SIZE]);

const_assert!(std::mem::align_of::<AlignedBytes>() == INPUT_VALUES_ALIGNMENT);

/// Fixed-size bump allocator for entry payloads. Payloads are placed at
/// offsets that are multiples of `INPUT_VALUES_ALIGNMENT` and are never
/// dropped; only `Copy` types are stored.
#[derive(Copy, Clone)]
pub struct InputValuesPool {
    /// Storage.
    bytes: AlignedBytes,

    /// Number of bytes handed out.
    used: usize,
}

impl InputValuesPool {
    /// Create an empty pool.
    pub const fn new() -> Self {
        Self {
            bytes: AlignedBytes([MaybeUninit::uninit(); MAX_POOL_SIZE]),
            used: 0,
        }
    }

    /// Returns the number of bytes handed out.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Releases all payloads.
    pub fn clear(&mut self) {
        self.used = 0;
    }

    /// Returns the number of pool bytes a payload of type `T` occupies.
    pub const fn required_bytes<T: InputValues>() -> usize {
        align_up(size_of::<T>(), INPUT_VALUES_ALIGNMENT)
    }

    /// Returns true if a payload of type `T` fits within `budget` bytes.
    ///
    /// * `budget` - Byte budget, at most `MAX_POOL_SIZE`.
    pub fn fits<T: InputValues>(&self, budget: usize) -> bool {
        self.used + Self::required_bytes::<T>() <= min(budget, MAX_POOL_SIZE)
    }

    /// Stores a payload and returns its offset.
    ///
    /// * `values` - The payload.
    pub fn push<T: InputValues>(&mut self, values: T) -> usize {
        assert!(self.fits::<T>(MAX_POOL_SIZE), "payload pool overflow");

        let offset = self.used;
        // SAFETY: `offset + size_of::<T>()` is within the buffer and `offset`
        // is a multiple of INPUT_VALUES_ALIGNMENT, which is at least the
        // alignment of `T`.
        unsafe {
            let p = self.bytes.0.as_mut_ptr().add(offset) as *mut T;
            ptr::write(p, values);
        }
        self.used += Self::required_bytes::<T>();
        offset
    }

    /// Returns the payload at `offset`.
    ///
    /// # Safety
    ///
    /// A `T` must have been stored at `offset` since the last `clear()`.
    ///
    /// * `offset` - Offset returned by `push()`.
    pub unsafe fn get<T: InputValues>(&self, offset: usize) -> &T {
        debug_assert!(offset + size_of::<T>() <= self.used);
        &*(self.bytes.0.as_ptr().add(offset) as *const T)
    }

    /// Returns the payload at `offset` for modification.
    ///
    /// # Safety
    ///
    /// A `T` must have been stored at `offset` since the last `clear()`.
    ///
    /// * `offset` - Offset returned by `push()`.
    pub unsafe fn get_mut<T: InputValues>(&mut self, offset: usize) -> &mut T {
        debug_assert!(offset + size_of::<T>() <= self.used);
        &mut *(self.bytes.0.as_mut_ptr().add(offset) as *mut T)
    }
}

impl Default for InputValuesPool {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_values::*;
    use pbrt_core::spectrum::*;

    fn sheen(r: Float) -> SheenValues {
        SheenValues {
            reflectance: Spectrum::new(r),
            reflectance_multiplier: 1.0,
        }
    }

    #[test]
    fn payloads_are_aligned() {
        let mut pool = InputValuesPool::new();
        let a = pool.push(sheen(0.25));
        let b = pool.push(EmissionValues {
            radiance: Spectrum::new(1.0),
            radiance_multiplier: 2.0,
        });
        assert_eq!(a, 0);
        assert!(is_aligned(b, INPUT_VALUES_ALIGNMENT));
        assert_eq!(pool.used(), b + InputValuesPool::required_bytes::<EmissionValues>());

        let base = &pool as *const InputValuesPool as usize;
        assert!(is_aligned(base, INPUT_VALUES_ALIGNMENT));

        unsafe {
            assert_eq!(*pool.get::<SheenValues>(a), sheen(0.25));
            assert_eq!(pool.get::<EmissionValues>(b).radiance_multiplier, 2.0);
        }
    }

    #[test]
    fn fits_respects_budget() {
        let mut pool = InputValuesPool::new();
        let size = InputValuesPool::required_bytes::<SheenValues>();
        assert!(pool.fits::<SheenValues>(size));
        pool.push(sheen(1.0));
        assert!(!pool.fits::<SheenValues>(size));
        assert!(pool.fits::<SheenValues>(2 * size));

        pool.clear();
        assert_eq!(pool.used(), 0);
    }

    #[test]
    fn every_payload_fits_capacity() {
        let largest = [
            InputValuesPool::required_bytes::<AshikhminShirleyValues>(),
            InputValuesPool::required_bytes::<DisneyValues>(),
            InputValuesPool::required_bytes::<GlassValues>(),
            InputValuesPool::required_bytes::<AlSurfaceLayerValues>(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0);
        assert!(largest * MAX_CLOSURE_ENTRIES <= MAX_POOL_SIZE);
    }
}
