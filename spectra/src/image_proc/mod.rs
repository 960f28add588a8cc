//! Raster rendering for spectrum displays.
//!
//! This module contains the device-pixel aware canvas and the renderers that
//! paint spectra onto it.

pub mod strip;

pub use strip::{
    background_columns, render_spectrum_background, render_strip, strip_color, AxisMapping,
    LayoutCanvas, LayoutRect, LinearAxis, BACKGROUND_ALPHA,
};
