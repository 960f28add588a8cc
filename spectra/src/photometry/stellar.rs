//! Blackbody radiation model for stellar continua
//!
//! This module provides Planck's law, Wien's displacement law in both
//! directions, and a [`Blackbody`] source implementing the [`Spectrum`] trait.
//!
//! All functions are total over their numeric domain. Zero or negative
//! temperatures and wavelengths are degenerate inputs that evaluate to the
//! sentinel `0.0`; they never panic and never produce NaN.

use super::spectrum::{Spectrum, SI};

/// Exponent above which `exp()` would overflow; radiance there is reported as 0.
pub const MAX_PLANCK_EXPONENT: f64 = 700.0;

/// Spectral radiance from Planck's law.
///
/// B(λ, T) = 2hc² / (λ⁵ · (exp(hc / λkT) − 1))
///
/// # Arguments
///
/// * `wavelength_nm` - Wavelength in nanometers
/// * `temperature_k` - Blackbody temperature in Kelvin
///
/// # Returns
///
/// Spectral radiance in W·sr⁻¹·m⁻³. Returns `0.0` when either argument is
/// zero or negative, and when the exponent `hc / λkT` exceeds
/// [`MAX_PLANCK_EXPONENT`] (deep Wien tail, where the true value underflows
/// anyway).
pub fn planck_radiance(wavelength_nm: f64, temperature_k: f64) -> f64 {
    if wavelength_nm <= 0.0 || temperature_k <= 0.0 {
        return 0.0;
    }

    let wavelength_m = wavelength_nm * SI::METERS_PER_NM;
    let exponent = (SI::PLANCK_CONSTANT * SI::SPEED_OF_LIGHT)
        / (wavelength_m * SI::BOLTZMANN_CONSTANT * temperature_k);
    if exponent > MAX_PLANCK_EXPONENT {
        return 0.0;
    }

    let numerator = 2.0 * SI::PLANCK_CONSTANT * SI::SPEED_OF_LIGHT * SI::SPEED_OF_LIGHT;
    let denominator = wavelength_m.powi(5) * (exponent.exp() - 1.0);

    numerator / denominator
}

/// Peak emission wavelength of a blackbody (Wien's displacement law).
///
/// # Arguments
/// * `temperature_k` - Temperature in Kelvin
///
/// # Returns
/// Peak wavelength in nanometers, `b / T`; `0.0` for non-positive temperatures.
pub fn peak_wavelength_from_temperature(temperature_k: f64) -> f64 {
    if temperature_k <= 0.0 {
        return 0.0;
    }
    SI::WIEN_DISPLACEMENT / temperature_k / SI::METERS_PER_NM
}

/// Blackbody temperature whose emission peaks at `wavelength_nm`.
///
/// # Arguments
/// * `wavelength_nm` - Peak wavelength in nanometers
///
/// # Returns
/// Temperature in Kelvin, `b / λ`; `0.0` for non-positive wavelengths.
pub fn temperature_from_peak_wavelength(wavelength_nm: f64) -> f64 {
    if wavelength_nm <= 0.0 {
        return 0.0;
    }
    SI::WIEN_DISPLACEMENT / (wavelength_nm * SI::METERS_PER_NM)
}

/// Percent error of a temperature estimate against Wien's law.
///
/// Students read a peak wavelength off the chart and estimate a temperature;
/// this grades the estimate against the exact value for that peak.
///
/// # Returns
/// `|estimate − exact| / exact × 100`, or `0.0` when the exact temperature is
/// zero (non-positive peak wavelength).
pub fn temperature_estimate_error_percent(peak_wavelength_nm: f64, estimate_k: f64) -> f64 {
    let exact = temperature_from_peak_wavelength(peak_wavelength_nm);
    if exact > 0.0 {
        ((estimate_k - exact) / exact).abs() * 100.0
    } else {
        0.0
    }
}

/// An ideal blackbody at a fixed temperature.
///
/// Unlike a physical star model this carries no distance or radius scaling:
/// every consumer peak-normalizes the sampled curve before display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blackbody {
    /// Temperature in Kelvin
    temperature_k: f64,
}

impl Blackbody {
    /// Create a blackbody at `temperature_k`.
    ///
    /// Non-positive temperatures are accepted and radiate nothing.
    pub fn new(temperature_k: f64) -> Self {
        Self { temperature_k }
    }

    /// Create the blackbody whose emission peaks at `wavelength_nm`.
    pub fn from_peak_wavelength(wavelength_nm: f64) -> Self {
        Self::new(temperature_from_peak_wavelength(wavelength_nm))
    }

    pub fn temperature_k(&self) -> f64 {
        self.temperature_k
    }

    /// Wien peak wavelength in nanometers
    pub fn peak_wavelength_nm(&self) -> f64 {
        peak_wavelength_from_temperature(self.temperature_k)
    }
}

impl Spectrum for Blackbody {
    fn radiance(&self, wavelength_nm: f64) -> f64 {
        planck_radiance(wavelength_nm, self.temperature_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::misc::linspace;
    use approx::assert_relative_eq;

    #[test]
    fn test_planck_degenerate_inputs() {
        for t in [1.0, 3000.0, 5778.0, 40000.0] {
            assert_eq!(planck_radiance(0.0, t), 0.0);
            assert_eq!(planck_radiance(-5.0, t), 0.0);
        }
        for wl in [1.0, 380.0, 780.0, 5000.0] {
            assert_eq!(planck_radiance(wl, 0.0), 0.0);
            assert_eq!(planck_radiance(wl, -100.0), 0.0);
        }
    }

    #[test]
    fn test_planck_overflow_guard() {
        // hc/(λkT) at 10 nm and 100 K is ~1.4e5, far beyond the cutoff
        assert_eq!(planck_radiance(10.0, 100.0), 0.0);
        assert!(planck_radiance(10.0, 100.0).is_finite());
    }

    #[test]
    fn test_planck_known_value() {
        // Hand-computed with the classroom constants at 500 nm, 5778 K
        let wl_m: f64 = 500e-9;
        let x = (6.626e-34 * 3.0e8) / (wl_m * 1.38e-23 * 5778.0);
        let expected = 2.0 * 6.626e-34 * 9.0e16 / (wl_m.powi(5) * (x.exp() - 1.0));
        assert_relative_eq!(planck_radiance(500.0, 5778.0), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_planck_hotter_is_brighter() {
        for wl in [400.0, 550.0, 700.0] {
            assert!(planck_radiance(wl, 6000.0) > planck_radiance(wl, 5000.0));
        }
    }

    #[test]
    fn test_wien_solar_peak() {
        let peak = peak_wavelength_from_temperature(5778.0);
        assert_relative_eq!(peak, 2.898e-3 / 5778.0 * 1e9, max_relative = 1e-12);
        assert!((peak - 501.56).abs() < 0.01, "peak = {}", peak);
    }

    #[test]
    fn test_wien_round_trip() {
        for t in [100.0, 2400.0, 3000.0, 5778.0, 9940.0, 30000.0, 1e6] {
            let back = temperature_from_peak_wavelength(peak_wavelength_from_temperature(t));
            assert_relative_eq!(back, t, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_wien_degenerate() {
        assert_eq!(peak_wavelength_from_temperature(0.0), 0.0);
        assert_eq!(temperature_from_peak_wavelength(0.0), 0.0);
        assert_eq!(peak_wavelength_from_temperature(-1.0), 0.0);
    }

    #[test]
    fn test_sampled_peak_matches_wien() {
        let body = Blackbody::new(5778.0);
        let grid = linspace(300.0, 900.0, 6001);
        let spectrum = body.sample(&grid);
        let peak = spectrum.peak().unwrap();
        assert!(
            (peak.wavelength_nm - body.peak_wavelength_nm()).abs() < 1.0,
            "sampled peak {} vs Wien {}",
            peak.wavelength_nm,
            body.peak_wavelength_nm()
        );
    }

    #[test]
    fn test_from_peak_wavelength() {
        let body = Blackbody::from_peak_wavelength(500.0);
        assert_relative_eq!(body.temperature_k(), 5796.0, epsilon = 1e-9);
        assert_relative_eq!(body.peak_wavelength_nm(), 500.0, max_relative = 1e-12);
    }

    #[test]
    fn test_estimate_error() {
        // 500 nm peaks at 5796 K
        assert_relative_eq!(
            temperature_estimate_error_percent(500.0, 5796.0),
            0.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            temperature_estimate_error_percent(500.0, 5796.0 * 1.1),
            10.0,
            epsilon = 1e-9
        );
        assert_eq!(temperature_estimate_error_percent(0.0, 5000.0), 0.0);
    }
}
