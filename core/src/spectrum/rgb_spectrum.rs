//! RGB Spectrum.

use crate::pbrt::*;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, MulAssign, Sub};

/// Number of spectral samples to use for `RGBSpectrum`.
pub const RGB_SAMPLES: usize = 3;

/// RGBSpectrum represents an spectral power distribution (SPD) with
/// a weighted sum of red, green and blue components.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RGBSpectrum {
    /// The sampled spectral values.
    c: [Float; RGB_SAMPLES],
}

impl RGBSpectrum {
    /// Create a new `RGBSpectrum` with a constant value across all
    /// wavelengths.
    ///
    /// * `v` - Constant value.
    pub const fn new(v: Float) -> Self {
        Self {
            c: [v; RGB_SAMPLES],
        }
    }

    /// Create a new `RGBSpectrum` from red, green and blue components.
    ///
    /// * `r` - Red.
    /// * `g` - Green.
    /// * `b` - Blue.
    pub const fn rgb(r: Float, g: Float, b: Float) -> Self {
        Self { c: [r, g, b] }
    }

    /// Create a new `RGBSpectrum` from an RGB triple.
    ///
    /// * `rgb` - RGB value.
    pub fn from_rgb(rgb: &[Float; 3]) -> Self {
        Self { c: *rgb }
    }

    /// Returns the RGB triple.
    pub fn to_rgb(&self) -> [Float; 3] {
        self.c
    }

    /// Returns the luminance (the y-coordinate of the XYZ colour).
    pub fn y(&self) -> Float {
        0.212671 * self.c[0] + 0.715160 * self.c[1] + 0.072169 * self.c[2]
    }

    /// Returns the largest sample value.
    pub fn max_component_value(&self) -> Float {
        max(self.c[0], max(self.c[1], self.c[2]))
    }

    /// Returns true if all sample values are 0.
    pub fn is_black(&self) -> bool {
        self.c.iter().all(|&v| v == 0.0)
    }

    /// Returns true if any sample value is NaN.
    pub fn has_nans(&self) -> bool {
        self.c.iter().any(|v| v.is_nan())
    }
}

impl Default for RGBSpectrum {
    /// Return a black `RGBSpectrum`.
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Add for RGBSpectrum {
    type Output = Self;

    /// Adds the corresponding sample values from another `RGBSpectrum`.
    ///
    /// * `other` - The other `RGBSpectrum`.
    fn add(self, other: Self) -> Self::Output {
        Self::rgb(
            self.c[0] + other.c[0],
            self.c[1] + other.c[1],
            self.c[2] + other.c[2],
        )
    }
}

impl AddAssign for RGBSpectrum {
    /// Adds the corresponding sample values from another `RGBSpectrum`.
    ///
    /// * `other` - The other `RGBSpectrum`.
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for RGBSpectrum {
    type Output = Self;

    /// Subtracts the corresponding sample values from another `RGBSpectrum`.
    ///
    /// * `other` - The other `RGBSpectrum`.
    fn sub(self, other: Self) -> Self::Output {
        Self::rgb(
            self.c[0] - other.c[0],
            self.c[1] - other.c[1],
            self.c[2] - other.c[2],
        )
    }
}

impl Mul for RGBSpectrum {
    type Output = Self;

    /// Multiplies the corresponding sample values from another `RGBSpectrum`.
    ///
    /// * `other` - The other `RGBSpectrum`.
    fn mul(self, other: Self) -> Self::Output {
        Self::rgb(
            self.c[0] * other.c[0],
            self.c[1] * other.c[1],
            self.c[2] * other.c[2],
        )
    }
}

impl Mul<Float> for RGBSpectrum {
    type Output = Self;

    /// Scales the sample values with a constant factor.
    ///
    /// * `f` - Scaling factor.
    fn mul(self, f: Float) -> Self::Output {
        Self::rgb(self.c[0] * f, self.c[1] * f, self.c[2] * f)
    }
}

impl Mul<RGBSpectrum> for Float {
    type Output = RGBSpectrum;

    /// Scales the sample values of an `RGBSpectrum`.
    ///
    /// * `s` - Sample values.
    fn mul(self, s: RGBSpectrum) -> Self::Output {
        s * self
    }
}

impl MulAssign for RGBSpectrum {
    /// Multiplies the corresponding sample values from another `RGBSpectrum`.
    ///
    /// * `other` - The other `RGBSpectrum`.
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}

impl MulAssign<Float> for RGBSpectrum {
    /// Scales the sample values with a constant factor.
    ///
    /// * `f` - Scaling factor.
    fn mul_assign(&mut self, f: Float) {
        *self = *self * f;
    }
}

impl Div<Float> for RGBSpectrum {
    type Output = Self;

    /// Divides the sample values with given factor.
    ///
    /// * `f` - Scaling value.
    fn div(self, f: Float) -> Self::Output {
        debug_assert!(f != 0.0);
        self * (1.0 / f)
    }
}

impl Index<usize> for RGBSpectrum {
    type Output = Float;

    /// Index the sample value.
    ///
    /// * `i` -  The index.
    fn index(&self, i: usize) -> &Self::Output {
        &self.c[i]
    }
}

impl IndexMut<usize> for RGBSpectrum {
    /// Index the sample to get a mutable sample value.
    ///
    /// * `i` - The index.
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        &mut self.c[i]
    }
}

impl Clamp<Float> for RGBSpectrum {
    /// Clamps the sample values.
    ///
    /// * `low`  - Low value.
    /// * `high` - High value.
    fn clamp(&self, low: Float, high: Float) -> Self {
        Self {
            c: [
                clamp(self.c[0], low, high),
                clamp(self.c[1], low, high),
                clamp(self.c[2], low, high),
            ],
        }
    }

    /// Clamps the values to [0.0, INFINITY].
    fn clamp_default(&self) -> Self {
        Clamp::clamp(self, 0.0, INFINITY)
    }
}

impl fmt::Display for RGBSpectrum {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.c[0], self.c[1], self.c[2])
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    #[test]
    fn luminance_of_white_is_one() {
        assert!(approx_eq!(f32, RGBSpectrum::new(1.0).y(), 1.0, epsilon = 1e-5));
        assert_eq!(RGBSpectrum::default().y(), 0.0);
    }

    #[test]
    fn luminance_weights() {
        assert!(approx_eq!(f32, RGBSpectrum::rgb(1.0, 0.0, 0.0).y(), 0.212671, ulps = 2));
        assert!(approx_eq!(f32, RGBSpectrum::rgb(0.0, 1.0, 0.0).y(), 0.715160, ulps = 2));
        assert!(approx_eq!(f32, RGBSpectrum::rgb(0.0, 0.0, 1.0).y(), 0.072169, ulps = 2));
    }

    #[test]
    fn black() {
        assert!(RGBSpectrum::default().is_black());
        assert!(!RGBSpectrum::rgb(0.0, 0.0, 0.1).is_black());
    }

    #[test]
    fn clamp_negative_values() {
        let s = RGBSpectrum::rgb(-1.0, 0.5, 2.0).clamp_default();
        assert_eq!(s.to_rgb(), [0.0, 0.5, 2.0]);
    }

    proptest! {
        #[test]
        fn max_component(r in -10.0..10.0f32, g in -10.0..10.0f32, b in -10.0..10.0f32) {
            let s = RGBSpectrum::rgb(r, g, b);
            prop_assert_eq!(s.max_component_value(), r.max(g).max(b));
        }

        #[test]
        fn mul_is_componentwise(
            r in -10.0..10.0f32, g in -10.0..10.0f32, b in -10.0..10.0f32, f in -10.0..10.0f32,
        ) {
            let s = RGBSpectrum::rgb(r, g, b);
            prop_assert_eq!((s * RGBSpectrum::new(f)).to_rgb(), [r * f, g * f, b * f]);
            prop_assert_eq!((f * s).to_rgb(), [r * f, g * f, b * f]);
        }
    }
}
