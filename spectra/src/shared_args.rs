use std::borrow::Cow;
use std::path::PathBuf;

use clap::Parser;

use crate::photometry::lines::{CatalogError, LineCatalog};
use crate::plot::FigureLayout;
use crate::sims::synthesis::{RenderRequest, RequestError, DETAIL_SAMPLE_COUNT};

/// Parse a comma separated list of feature names such as "Ca II,H,TiO"
pub fn parse_feature_names(s: &str) -> Result<Vec<String>, String> {
    let names: Vec<String> = s
        .split(',')
        .map(|name| name.trim().to_string())
        .collect();
    if names.iter().any(|name| name.is_empty()) {
        return Err("Feature names must be non-empty, e.g. 'Ca II,H'".to_string());
    }
    Ok(names)
}

/// Stellar and sampling parameters shared by the spectrum tools
#[derive(Parser, Debug, Clone)]
pub struct SharedSpectrumArgs {
    /// Effective temperature in Kelvin
    #[arg(long, default_value_t = 5778.0)]
    pub temperature: f64,

    /// Surface gravity as log10(g / cm s^-2); sets line width
    #[arg(long, default_value_t = 4.4, allow_negative_numbers = true)]
    pub log_g: f64,

    /// Start of the wavelength window in nanometers
    #[arg(long, default_value_t = 380.0)]
    pub wavelength_min: f64,

    /// End of the wavelength window in nanometers
    #[arg(long, default_value_t = 780.0)]
    pub wavelength_max: f64,

    /// Number of samples across the window
    #[arg(long, default_value_t = DETAIL_SAMPLE_COUNT)]
    pub samples: usize,

    /// JSON line catalog to use instead of the built-in one
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

impl SharedSpectrumArgs {
    /// Validated render request for these arguments
    pub fn render_request(&self) -> Result<RenderRequest, RequestError> {
        RenderRequest::new(
            self.temperature,
            self.log_g,
            self.wavelength_min,
            self.wavelength_max,
            self.samples,
        )
    }

    /// The catalog named by `--catalog`, or the built-in one
    pub fn load_catalog(&self) -> Result<Cow<'static, LineCatalog>, CatalogError> {
        match &self.catalog {
            Some(path) => Ok(Cow::Owned(LineCatalog::load_from_file(path)?)),
            None => Ok(Cow::Borrowed(LineCatalog::builtin())),
        }
    }
}

/// Output image geometry shared by the plotting tools
#[derive(Parser, Debug, Clone)]
pub struct SharedFigureArgs {
    /// Figure width in layout pixels
    #[arg(long, default_value_t = 1024)]
    pub width: u32,

    /// Chart height in layout pixels
    #[arg(long, default_value_t = 560)]
    pub height: u32,

    /// Absorption strip height in layout pixels
    #[arg(long, default_value_t = 48)]
    pub strip_height: u32,

    /// Device pixels per layout pixel
    #[arg(long, default_value_t = 1.0)]
    pub device_pixel_ratio: f64,
}

impl SharedFigureArgs {
    pub fn layout(&self) -> FigureLayout {
        FigureLayout {
            width: self.width,
            chart_height: self.height,
            strip_height: self.strip_height,
            device_pixel_ratio: self.device_pixel_ratio,
        }
    }
}
