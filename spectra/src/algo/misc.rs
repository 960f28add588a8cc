//! Sampling and normalization helpers shared by the spectral pipeline.
//!
//! This module provides the small numerical building blocks every spectrum
//! computation starts from:
//!
//! - **Even sampling**: `linspace` over an inclusive wavelength interval
//! - **Peak normalization**: dividing a curve by its maximum, with a safe
//!   divisor when the curve is identically zero
//!
//! Both are total over their inputs: degenerate cases produce defined results
//! rather than errors or NaN.

use std::cmp::Ordering;

/// Evenly spaced samples over `[start, end]`, endpoints included.
///
/// Sample `i` is `start + i * step` with `step = (end - start) / (num - 1)`,
/// so repeated calls with the same arguments produce bit-identical grids.
///
/// # Arguments
///
/// * `start` - First sample value
/// * `end` - Last sample value
/// * `num` - Number of samples
///
/// # Returns
///
/// A vector of `num` values. `num == 0` yields an empty vector and `num == 1`
/// yields `[start]`.
///
/// # Example
///
/// ```
/// use spectra::algo::misc::linspace;
///
/// assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// ```
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            (0..num).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Divisor used to peak-normalize a sampled curve.
///
/// Returns the maximum of `values`, or `1.0` when the maximum is zero, NaN,
/// or the slice is empty. Dividing by the result therefore never produces NaN
/// from a zero-valued curve.
pub fn peak_divisor(values: &[f64]) -> f64 {
    let max_val = values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    match max_val {
        Some(max) if max != 0.0 => max,
        _ => 1.0,
    }
}

/// Normalize a curve by its peak value.
///
/// # Arguments
///
/// * `pts` - Vector of floating point values to normalize
///
/// # Returns
///
/// A new vector with every value divided by [`peak_divisor`].
///
/// # Example
///
/// ```
/// use spectra::algo::misc::normalize;
///
/// let data = vec![0.5, 2.0, 1.0, 4.0];
/// assert_eq!(normalize(data), vec![0.125, 0.5, 0.25, 1.0]);
/// assert_eq!(normalize(vec![0.0, 0.0]), vec![0.0, 0.0]);
/// ```
pub fn normalize(pts: Vec<f64>) -> Vec<f64> {
    let divisor = peak_divisor(&pts);
    pts.into_iter().map(|val| val / divisor).collect()
}
