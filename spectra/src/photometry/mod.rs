//! Photometry models and utilities

pub mod color;
pub mod lines;
pub mod spectrum;
pub mod stellar;

pub use color::{
    class_markers, spectral_class_from_temperature, wavelength_to_color,
    wavelength_to_perceptual_rgb, ClassMarker, Rgba, SpectralClass,
};
pub use lines::{
    AbsorptionFeature, CatalogError, IonizationGate, LineCatalog, LineMarker, ResponseKind,
    TemperatureResponse,
};
pub use spectrum::{SampledSpectrum, Spectrum, SI};
pub use stellar::{
    peak_wavelength_from_temperature, planck_radiance, temperature_from_peak_wavelength,
    Blackbody,
};
