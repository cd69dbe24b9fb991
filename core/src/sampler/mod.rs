//! Sampler

mod random;

use crate::pbrt::*;

// Re-export
pub use random::*;

/// Source of sample values in [0, 1).
pub trait Sampler {
    /// Returns the sample value for the next dimension of the current sample vector.
    fn get_1d(&mut self) -> Float;

    /// Returns the sample value for the next two dimensions of the current sample vector.
    fn get_2d(&mut self) -> (Float, Float) {
        let u0 = self.get_1d();
        let u1 = self.get_1d();
        (u0, u1)
    }
}

impl<S: Sampler + ?Sized> Sampler for &mut S {
    #[inline]
    fn get_1d(&mut self) -> Float {
        (**self).get_1d()
    }

    #[inline]
    fn get_2d(&mut self) -> (Float, Float) {
        (**self).get_2d()
    }
}

impl<S: Sampler + ?Sized> Sampler for Box<S> {
    #[inline]
    fn get_1d(&mut self) -> Float {
        (**self).get_1d()
    }

    #[inline]
    fn get_2d(&mut self) -> (Float, Float) {
        (**self).get_2d()
    }
}
