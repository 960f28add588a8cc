//! Explore Wien's law from a chosen peak wavelength
//!
//! Derives the blackbody temperature and spectral class whose emission peaks
//! at the given wavelength, plots its normalized continuum with the peak and
//! the class boundary markers, and optionally grades a temperature estimate.
//!
//! Usage:
//! ```
//! cargo run --bin wien_explorer -- --peak-wavelength 500 [--estimate 6000]
//! ```

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use plotters::prelude::*;
use spectra::photometry::color::{class_markers, spectral_class_from_temperature};
use spectra::photometry::stellar::{
    temperature_estimate_error_percent, temperature_from_peak_wavelength,
};
use spectra::plot::{class_color, render_spectrum_chart, ChartSeries, MarkerLine, SpectrumChartSpec};
use spectra::shared_args::SharedFigureArgs;
use spectra::sims::synthesis::{RenderRequest, SpectralSynthesizer, CONTINUUM_SAMPLE_COUNT};

/// Command line arguments for the Wien explorer
#[derive(Parser, Debug)]
#[command(
    name = "Wien Explorer",
    about = "Plots the blackbody continuum peaking at a chosen wavelength",
    long_about = None
)]
struct Args {
    /// Peak wavelength in nanometers
    #[arg(long, default_value_t = 500.0)]
    peak_wavelength: f64,

    /// A temperature estimate in Kelvin to grade against Wien's law
    #[arg(long)]
    estimate: Option<f64>,

    /// Wavelength range minimum (nm)
    #[arg(long, default_value_t = 100.0)]
    wavelength_min: f64,

    /// Wavelength range maximum (nm)
    #[arg(long, default_value_t = 1500.0)]
    wavelength_max: f64,

    /// Number of sample points
    #[arg(long, default_value_t = CONTINUUM_SAMPLE_COUNT)]
    sample_points: usize,

    #[command(flatten)]
    figure: SharedFigureArgs,

    /// Output file path
    #[arg(short, long, default_value = "plots/wien_explorer.png")]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let temperature = temperature_from_peak_wavelength(args.peak_wavelength);
    let class = spectral_class_from_temperature(temperature);
    println!(
        "Peak at {:.1} nm -> T = {:.0} K, spectral class {}",
        args.peak_wavelength, temperature, class
    );

    if let Some(estimate) = args.estimate {
        let error = temperature_estimate_error_percent(args.peak_wavelength, estimate);
        println!("Estimate {:.0} K is off by {:.1}%", estimate, error);
    }

    // Surface gravity does not affect the continuum
    let request = RenderRequest::new(
        temperature,
        4.4,
        args.wavelength_min,
        args.wavelength_max,
        args.sample_points,
    )?;
    let continuum = SpectralSynthesizer::default().continuum(&request);

    let mut markers =
        MarkerLine::from_class_markers(&class_markers(args.wavelength_min, args.wavelength_max));
    markers.push(MarkerLine {
        wavelength_nm: args.peak_wavelength,
        color: WHITE,
        label: format!("peak {:.0} nm", args.peak_wavelength),
    });

    let spec = SpectrumChartSpec {
        title: format!("Blackbody at {:.0} K (class {})", temperature, class),
        window: (args.wavelength_min, args.wavelength_max),
        y_max: 1.1,
        y_desc: "Normalized Spectral Radiance".to_string(),
        series: vec![ChartSeries {
            spectrum: &continuum,
            color: class_color(class),
            label: format!("{:.0} K", temperature),
        }],
        markers,
        rainbow: true,
    };
    let (image, _) = render_spectrum_chart(&spec, &args.figure.layout())?;

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    image.save(&args.output)?;

    println!("Plot saved to: {}", args.output.display());
    Ok(())
}
