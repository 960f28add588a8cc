//! Sampled spectra and the radiance interface behind them.
//!
//! This module defines the data every stage of the pipeline exchanges:
//!
//! ## Physical constants
//! The SI constants used by Planck's and Wien's laws. The values are the
//! rounded ones taught in introductory courses, so that worked examples in
//! class reproduce the numbers shown on screen.
//!
//! ## Samples and sampled spectra
//! A [`Sample`] is one `(wavelength, value)` point. A [`SampledSpectrum`] is an
//! ordered run of samples over a wavelength interval, rebuilt from scratch on
//! every computation and never mutated in place by the pipeline.
//!
//! ## Spectrum trait
//! Continuous sources (such as a blackbody) implement [`Spectrum`] and can be
//! evaluated on any wavelength grid.
//!
//! # Units
//! - **Wavelengths**: nanometers (nm)
//! - **Radiance**: W·sr⁻¹·m⁻³ (per unit wavelength, SI)
//! - **Normalized values**: dimensionless, nominally in `[0, 1.1]`


/// Physical constants in SI units for blackbody calculations.
///
/// These are the rounded classroom values rather than CODATA values; every
/// radiance and Wien computation in the crate reads them from here.
pub struct SI {}

impl SI {
    /// Planck's constant
    /// Units: J⋅s
    pub const PLANCK_CONSTANT: f64 = 6.626e-34;

    /// Speed of light in vacuum
    /// Units: m/s
    pub const SPEED_OF_LIGHT: f64 = 3.0e8;

    /// Boltzmann constant
    /// Units: J/K
    pub const BOLTZMANN_CONSTANT: f64 = 1.38e-23;

    /// Wien's displacement constant
    /// Units: m⋅K
    pub const WIEN_DISPLACEMENT: f64 = 2.898e-3;

    /// Meters per nanometer
    pub const METERS_PER_NM: f64 = 1e-9;
}

/// One point of a sampled curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Wavelength in nanometers
    pub wavelength_nm: f64,

    /// Sampled value (radiance, normalized flux, or unit-space intensity)
    pub value: f64,
}

impl Sample {
    pub fn new(wavelength_nm: f64, value: f64) -> Self {
        Self {
            wavelength_nm,
            value,
        }
    }
}

/// An ordered sequence of samples over a wavelength interval.
///
/// Wavelengths are expected to be strictly increasing; the synthesizer only
/// ever builds spectra from a `linspace` grid, which guarantees it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampledSpectrum {
    samples: Vec<Sample>,
}

impl SampledSpectrum {
    /// Build a spectrum from parallel wavelength and value slices.
    ///
    /// Callers pass slices of equal length; debug builds check it.
    pub(crate) fn from_parallel(wavelengths: &[f64], values: &[f64]) -> Self {
        debug_assert_eq!(
            wavelengths.len(),
            values.len(),
            "wavelength and value slices must be parallel"
        );
        let samples = wavelengths
            .iter()
            .zip(values)
            .map(|(&wl, &v)| Sample::new(wl, v))
            .collect();
        Self { samples }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample wavelengths in order
    pub fn wavelengths(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.wavelength_nm).collect()
    }

    /// Sample values in order
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    /// `(wavelength, value)` pairs, the shape plotting libraries consume.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.samples.iter().map(|s| (s.wavelength_nm, s.value))
    }

    /// The sample with the largest value, if any.
    pub fn peak(&self) -> Option<Sample> {
        self.samples
            .iter()
            .copied()
            .filter(|s| !s.value.is_nan())
            .max_by(|a, b| {
                a.value
                    .partial_cmp(&b.value)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Value of the sample nearest to `wavelength_nm`.
    pub fn value_near(&self, wavelength_nm: f64) -> Option<f64> {
        self.samples
            .iter()
            .min_by(|a, b| {
                let da = (a.wavelength_nm - wavelength_nm).abs();
                let db = (b.wavelength_nm - wavelength_nm).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|s| s.value)
    }
}

/// A continuous spectral source that can be evaluated at any wavelength.
///
/// Implementations must be total: degenerate wavelengths (zero, negative)
/// evaluate to `0.0` instead of failing, because the inputs come straight
/// from interactive controls that may transiently sit on a boundary.
pub trait Spectrum: Send + Sync {
    /// Spectral radiance at `wavelength_nm`, in W·sr⁻¹·m⁻³.
    fn radiance(&self, wavelength_nm: f64) -> f64;

    /// Evaluate the source on a wavelength grid.
    fn sample(&self, wavelengths: &[f64]) -> SampledSpectrum {
        let values: Vec<f64> = wavelengths.iter().map(|&wl| self.radiance(wl)).collect();
        SampledSpectrum::from_parallel(wavelengths, &values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ramp;

    impl Spectrum for Ramp {
        fn radiance(&self, wavelength_nm: f64) -> f64 {
            wavelength_nm.max(0.0)
        }
    }

    #[test]
    fn test_sample_preserves_grid() {
        let grid = [400.0, 500.0, 600.0];
        let spectrum = Ramp.sample(&grid);
        assert_eq!(spectrum.len(), 3);
        assert_eq!(spectrum.wavelengths(), grid.to_vec());
        assert_eq!(spectrum.values(), grid.to_vec());
    }

    #[test]
    fn test_peak_and_nearest() {
        let spectrum = SampledSpectrum::from_parallel(&[1.0, 2.0, 3.0], &[0.2, 0.9, 0.4]);
        assert_eq!(spectrum.peak(), Some(Sample::new(2.0, 0.9)));
        assert_eq!(spectrum.value_near(2.9), Some(0.4));
    }

    #[test]
    fn test_empty_spectrum() {
        let spectrum = SampledSpectrum::default();
        assert!(spectrum.is_empty());
        assert_eq!(spectrum.peak(), None);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "parallel")]
    fn test_mismatched_parallel_slices() {
        SampledSpectrum::from_parallel(&[1.0, 2.0], &[1.0]);
    }
}
