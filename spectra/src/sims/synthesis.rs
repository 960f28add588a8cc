//! Spectral synthesis: blackbody continuum plus temperature-dependent absorption
//!
//! This module turns a [`RenderRequest`] into the two curves every chart is
//! drawn from:
//!
//! 1. **Continuum**: Planck radiance sampled evenly over the requested window
//!    and divided by its own maximum.
//! 2. **Absorbed**: the same continuum with a Gaussian dip carved out at every
//!    catalog line whose feature is active at the requested temperature.
//!
//! # Line Strength Model
//!
//! A feature is active when its [`IonizationGate`](crate::photometry::IonizationGate)
//! admits the temperature and its relative strength exceeds
//! [`MIN_APPLIED_STRENGTH`]. Line width comes from surface gravity,
//! `0.2 + (log g − 1) · 0.3` nm, unless the feature fixes its own width.
//!
//! # Depth Bases
//!
//! Dips can be measured against two baselines (see [`DepthBasis`]):
//!
//! - **Flux**: depth is a fraction of the local continuum radiance, so lines
//!   are shallow where the star is faint. Used for the combined chart.
//! - **Unit**: depth is absolute against a flat continuum of 1. Used for the
//!   absorption-only chart.
//!
//! Synthesis is pure: identical requests yield bit-identical spectra.

use log::{debug, trace};
use thiserror::Error;

use crate::algo::misc::{linspace, normalize, peak_divisor};
use crate::photometry::color::{spectral_class_from_temperature, SpectralClass};
use crate::photometry::lines::{AbsorptionFeature, CatalogError, LineCatalog, TemperatureResponse};
use crate::photometry::spectrum::{SampledSpectrum, Spectrum};
use crate::photometry::stellar::{peak_wavelength_from_temperature, Blackbody};

/// Sample count for continuum-only charts
pub const CONTINUUM_SAMPLE_COUNT: usize = 500;

/// Sample count for charts that resolve individual lines
pub const DETAIL_SAMPLE_COUNT: usize = 4000;

/// Features weaker than this are not drawn
pub const MIN_APPLIED_STRENGTH: f64 = 0.05;

/// Fraction of the local continuum removed at a full-strength line center
pub const FLUX_DEPTH_FRACTION: f64 = 0.95;

/// Lines this far outside the window still bleed into it
pub const LINE_WINDOW_MARGIN_NM: f64 = 20.0;

/// Dips are truncated beyond this many line widths from the center
pub const LINE_CUTOFF_WIDTHS: f64 = 4.0;

/// Per-line depth in an atlas profile
pub const ATLAS_LINE_DEPTH: f64 = 0.8;

/// Line width in an atlas profile, unless the feature fixes its own
pub const ATLAS_LINE_WIDTH_NM: f64 = 1.0;

/// Reasons a render request is refused
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RequestError {
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("Wavelength window [{min_nm}, {max_nm}] nm is empty or inverted")]
    InvertedRange { min_nm: f64, max_nm: f64 },

    #[error("At least 2 samples are required, got {0}")]
    TooFewSamples(usize),

    #[error(
        "{sample_count} samples over [{min_nm}, {max_nm}] nm do not form a strictly increasing grid"
    )]
    UnresolvableGrid {
        min_nm: f64,
        max_nm: f64,
        sample_count: usize,
    },
}

/// Parameters for one synthesis, validated at construction.
///
/// Temperatures at or below zero are accepted; they synthesize an all-zero
/// continuum rather than failing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    temperature_k: f64,
    log_g: f64,
    wavelength_min_nm: f64,
    wavelength_max_nm: f64,
    sample_count: usize,
}

impl RenderRequest {
    /// Validate and build a request.
    ///
    /// # Arguments
    /// * `temperature_k` - Effective temperature in Kelvin
    /// * `log_g` - Surface gravity, log10 of cm/s²
    /// * `wavelength_min_nm` - Start of the window, inclusive
    /// * `wavelength_max_nm` - End of the window, inclusive
    /// * `sample_count` - Number of evenly spaced samples
    ///
    /// # Returns
    /// The request, or a [`RequestError`] if any value is non-finite, the
    /// window is empty or inverted, fewer than two samples are asked for, or
    /// the window cannot be split into strictly increasing samples in `f64`.
    pub fn new(
        temperature_k: f64,
        log_g: f64,
        wavelength_min_nm: f64,
        wavelength_max_nm: f64,
        sample_count: usize,
    ) -> Result<Self, RequestError> {
        for (name, value) in [
            ("temperature", temperature_k),
            ("log g", log_g),
            ("minimum wavelength", wavelength_min_nm),
            ("maximum wavelength", wavelength_max_nm),
        ] {
            if !value.is_finite() {
                return Err(RequestError::NonFinite { name, value });
            }
        }
        if wavelength_min_nm >= wavelength_max_nm {
            return Err(RequestError::InvertedRange {
                min_nm: wavelength_min_nm,
                max_nm: wavelength_max_nm,
            });
        }
        if sample_count < 2 {
            return Err(RequestError::TooFewSamples(sample_count));
        }
        let grid = linspace(wavelength_min_nm, wavelength_max_nm, sample_count);
        let resolvable = (wavelength_max_nm - wavelength_min_nm).is_finite()
            && grid.iter().all(|wl| wl.is_finite())
            && grid.windows(2).all(|pair| pair[0] < pair[1]);
        if !resolvable {
            return Err(RequestError::UnresolvableGrid {
                min_nm: wavelength_min_nm,
                max_nm: wavelength_max_nm,
                sample_count,
            });
        }

        Ok(Self {
            temperature_k,
            log_g,
            wavelength_min_nm,
            wavelength_max_nm,
            sample_count,
        })
    }

    pub fn temperature_k(&self) -> f64 {
        self.temperature_k
    }

    pub fn log_g(&self) -> f64 {
        self.log_g
    }

    pub fn wavelength_min_nm(&self) -> f64 {
        self.wavelength_min_nm
    }

    pub fn wavelength_max_nm(&self) -> f64 {
        self.wavelength_max_nm
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// The same request with a different sample count.
    pub fn with_sample_count(&self, sample_count: usize) -> Result<Self, RequestError> {
        Self::new(
            self.temperature_k,
            self.log_g,
            self.wavelength_min_nm,
            self.wavelength_max_nm,
            sample_count,
        )
    }

    /// The sampling grid, `linspace(min, max, n)`
    pub fn wavelengths(&self) -> Vec<f64> {
        linspace(
            self.wavelength_min_nm,
            self.wavelength_max_nm,
            self.sample_count,
        )
    }

    pub fn spectral_class(&self) -> SpectralClass {
        spectral_class_from_temperature(self.temperature_k)
    }

    /// Wien peak of the requested temperature
    pub fn peak_wavelength_nm(&self) -> f64 {
        peak_wavelength_from_temperature(self.temperature_k)
    }

    /// Whether `wavelength_nm` is close enough to the window to draw its line.
    fn line_in_reach(&self, wavelength_nm: f64) -> bool {
        wavelength_nm >= self.wavelength_min_nm - LINE_WINDOW_MARGIN_NM
            && wavelength_nm <= self.wavelength_max_nm + LINE_WINDOW_MARGIN_NM
    }
}

/// Baseline against which absorption depth is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthBasis {
    /// Depth proportional to local continuum radiance, output peak-normalized
    Flux,
    /// Depth against a flat continuum of 1, output clamped to `[0, 1]`
    Unit,
}

/// Pressure-broadened line width for a surface gravity.
///
/// Values at or below zero (log g ≤ 1/3) mean no line is drawn at all.
pub fn baseline_line_width_nm(log_g: f64) -> f64 {
    0.2 + (log_g - 1.0) * 0.3
}

/// A feature that will be drawn at the requested temperature.
#[derive(Debug, Clone, Copy)]
pub struct ActiveFeature<'c> {
    pub feature: &'c AbsorptionFeature,
    pub response: &'c TemperatureResponse,
    /// Relative strength in `(MIN_APPLIED_STRENGTH, 1]`
    pub strength: f64,
    /// Gaussian sigma of each line, in nanometers
    pub line_width_nm: f64,
}

impl ActiveFeature<'_> {
    /// Depth scale before the basis is applied: `strength × scale_factor`
    pub fn depth_scale(&self) -> f64 {
        self.strength * self.response.scale_factor
    }
}

/// Result of one synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub request: RenderRequest,
    pub basis: DepthBasis,
    /// Peak-normalized continuum
    pub continuum: SampledSpectrum,
    /// Continuum with absorption dips, in the basis's units
    pub absorbed: SampledSpectrum,
}

/// Builds continua and absorption spectra from a line catalog.
#[derive(Debug, Clone, Copy)]
pub struct SpectralSynthesizer<'c> {
    catalog: &'c LineCatalog,
}

impl Default for SpectralSynthesizer<'static> {
    fn default() -> Self {
        Self::new(LineCatalog::builtin())
    }
}

impl<'c> SpectralSynthesizer<'c> {
    pub fn new(catalog: &'c LineCatalog) -> Self {
        Self { catalog }
    }

    /// Raw Planck radiance on the request grid.
    pub fn raw_continuum(&self, request: &RenderRequest) -> SampledSpectrum {
        Blackbody::new(request.temperature_k).sample(&request.wavelengths())
    }

    /// Continuum divided by its maximum (or by 1 when it is identically zero).
    pub fn continuum(&self, request: &RenderRequest) -> SampledSpectrum {
        let raw = self.raw_continuum(request);
        SampledSpectrum::from_parallel(&raw.wavelengths(), &normalize(raw.values()))
    }

    /// Features that pass their gate and strength threshold, in response order.
    ///
    /// Responses whose feature is missing from the catalog are skipped.
    pub fn active_features(&self, temperature_k: f64, log_g: f64) -> Vec<ActiveFeature<'c>> {
        let width = baseline_line_width_nm(log_g);
        let mut active = Vec::new();

        for response in self.catalog.responses() {
            let Some(feature) = self.catalog.feature(&response.feature) else {
                continue;
            };
            let Some(strength) = response.gated_strength(temperature_k) else {
                debug!("{} gated out at {:.0} K", feature.name, temperature_k);
                continue;
            };
            if strength <= MIN_APPLIED_STRENGTH {
                debug!(
                    "{} too weak at {:.0} K (strength {:.4})",
                    feature.name, temperature_k, strength
                );
                continue;
            }

            let line_width_nm = feature.fixed_line_width_nm.unwrap_or(width);
            debug!(
                "{} active at {:.0} K: strength {:.3}, width {:.2} nm",
                feature.name, temperature_k, strength, line_width_nm
            );
            active.push(ActiveFeature {
                feature,
                response,
                strength,
                line_width_nm,
            });
        }

        active
    }

    /// Synthesize the continuum and absorbed spectrum for `request`.
    ///
    /// # Arguments
    /// * `request` - Validated render parameters
    /// * `basis` - Which baseline dip depths are measured against
    ///
    /// # Returns
    /// Two spectra on the identical `linspace` grid. In [`DepthBasis::Flux`]
    /// the absorbed curve is non-negative and never exceeds the continuum; in
    /// [`DepthBasis::Unit`] it lies in `[0, 1]`.
    pub fn synthesize(&self, request: &RenderRequest, basis: DepthBasis) -> Synthesis {
        let wavelengths = request.wavelengths();
        let raw = Blackbody::new(request.temperature_k)
            .sample(&wavelengths)
            .values();
        let divisor = peak_divisor(&raw);

        let mut absorbed = match basis {
            DepthBasis::Flux => raw.clone(),
            DepthBasis::Unit => vec![1.0; wavelengths.len()],
        };

        for active in self.active_features(request.temperature_k, request.log_g) {
            let width = active.line_width_nm;
            let cutoff = LINE_CUTOFF_WIDTHS * width;
            let scale = active.depth_scale();

            for &line in active
                .feature
                .lines
                .iter()
                .filter(|&&line| request.line_in_reach(line))
            {
                trace!("{} line {:.2} nm, cutoff {:.2} nm", active.feature.name, line, cutoff);
                for (i, &wl) in wavelengths.iter().enumerate() {
                    let offset = wl - line;
                    if offset.abs() >= cutoff {
                        continue;
                    }
                    let depth = match basis {
                        DepthBasis::Flux => FLUX_DEPTH_FRACTION * scale * raw[i],
                        DepthBasis::Unit => scale,
                    };
                    absorbed[i] -= depth * (-(offset * offset) / (2.0 * width * width)).exp();
                }
            }
        }

        let absorbed: Vec<f64> = match basis {
            DepthBasis::Flux => absorbed.iter().map(|v| v.max(0.0) / divisor).collect(),
            DepthBasis::Unit => absorbed.iter().map(|v| v.clamp(0.0, 1.0)).collect(),
        };
        let continuum: Vec<f64> = raw.iter().map(|v| v / divisor).collect();

        Synthesis {
            request: *request,
            basis,
            continuum: SampledSpectrum::from_parallel(&wavelengths, &continuum),
            absorbed: SampledSpectrum::from_parallel(&wavelengths, &absorbed),
        }
    }

    /// Temperature-independent reference profile of one feature.
    ///
    /// Every line of the feature inside the grid contributes a Gaussian dip of
    /// depth [`ATLAS_LINE_DEPTH`] and width [`ATLAS_LINE_WIDTH_NM`] (or the
    /// feature's fixed width) to a flat continuum of 1, clamped at 0.
    pub fn atlas_profile(
        &self,
        feature_name: &str,
        wavelengths: &[f64],
    ) -> Result<SampledSpectrum, CatalogError> {
        let feature = self.catalog.require_feature(feature_name)?;
        let width = feature.fixed_line_width_nm.unwrap_or(ATLAS_LINE_WIDTH_NM);

        let (Some(&first), Some(&last)) = (wavelengths.first(), wavelengths.last()) else {
            return Ok(SampledSpectrum::default());
        };
        let lines: Vec<f64> = feature
            .lines
            .iter()
            .copied()
            .filter(|&line| line >= first && line <= last)
            .collect();

        let values: Vec<f64> = wavelengths
            .iter()
            .map(|&wl| {
                let dip: f64 = lines
                    .iter()
                    .map(|&line| {
                        let offset = wl - line;
                        ATLAS_LINE_DEPTH * (-(offset * offset) / (2.0 * width * width)).exp()
                    })
                    .sum();
                (1.0 - dip).max(0.0)
            })
            .collect();

        Ok(SampledSpectrum::from_parallel(wavelengths, &values))
    }
}
