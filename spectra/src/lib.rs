//! Stellar spectrum synthesis for teaching
//!
//! This crate models blackbody continua, temperature-dependent absorption
//! lines and the color of visible light, and renders the results as charts
//! with a pixel-aligned absorption strip.

pub mod algo;
pub mod image_proc;
pub mod photometry;
pub mod plot;
pub mod shared_args;
pub mod sims;

// Re-exports for easier access
pub use algo::misc::{linspace, normalize};
pub use image_proc::strip::{render_strip, AxisMapping, LayoutCanvas, LinearAxis};
pub use photometry::color::{
    spectral_class_from_temperature, wavelength_to_color, wavelength_to_perceptual_rgb,
    SpectralClass,
};
pub use photometry::lines::LineCatalog;
pub use photometry::spectrum::{SampledSpectrum, Spectrum};
pub use photometry::stellar::{
    peak_wavelength_from_temperature, planck_radiance, temperature_from_peak_wavelength,
};
pub use sims::synthesis::{DepthBasis, RenderRequest, SpectralSynthesizer};
