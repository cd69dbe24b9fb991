//! Discrete CDF helpers.

use crate::pbrt::*;

/// Turns a slice of non-negative weights into a CDF in place and returns the
/// total weight. With a single cell the CDF is `[1.0]`. With more cells the
/// weights are prefix-summed and normalized, and the last cell is forced to
/// exactly 1.0. All-zero weights produce a uniform CDF.
///
/// * `cdf` - Weights on input, cumulative distribution on output.
pub fn build_cdf_in_place(cdf: &mut [Float]) -> Float {
    let n = cdf.len();
    match n {
        0 => 0.0,
        1 => {
            let total = cdf[0];
            cdf[0] = 1.0;
            total
        }
        _ => {
            let mut total = 0.0;
            for v in cdf.iter_mut() {
                total += *v;
                *v = total;
            }

            if total > 0.0 {
                let rcp_total = 1.0 / total;
                for v in cdf.iter_mut().take(n - 1) {
                    *v *= rcp_total;
                }
            } else {
                for (i, v) in cdf.iter_mut().enumerate() {
                    *v = (i + 1) as Float / n as Float;
                }
            }
            cdf[n - 1] = 1.0;
            total
        }
    }
}

/// Returns the first index `i` such that `u < cdf[i]`, or the last index if
/// there is none. Ties resolve to the lower index. The CDF must be
/// non-empty.
///
/// * `cdf` - The cumulative distribution.
/// * `u`   - Sample value in [0, 1).
pub fn sample_cdf_linear_search(cdf: &[Float], u: Float) -> usize {
    debug_assert!(!cdf.is_empty());
    debug_assert!((0.0..1.0).contains(&u), "sample {} outside [0, 1)", u);

    let last = cdf.len() - 1;
    cdf[..last].iter().position(|&c| u < c).unwrap_or(last)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
