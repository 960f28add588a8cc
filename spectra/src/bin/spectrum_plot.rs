//! Plot a synthesized stellar spectrum with its absorption strip
//!
//! Draws the peak-normalized blackbody continuum and the same continuum with
//! temperature-dependent absorption lines over a rainbow background, marks
//! the Wien peak and any selected catalog lines, and stacks the pixel-aligned
//! absorption strip underneath. With `--absorption-only` the flux chart is
//! followed by a chart of absorption depth against a flat continuum, and the
//! strip is drawn under that one.
//!
//! Usage:
//! ```
//! cargo run --bin spectrum_plot -- [OPTIONS]
//! ```
//!
//! See --help for detailed options.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use image::Rgb;
use plotters::prelude::*;
use spectra::photometry::lines::LineCatalog;
use spectra::plot::{
    class_color, render_spectrum_chart, render_spectrum_figure, stack_vertically, ChartSeries,
    MarkerLine, SpectrumChartSpec,
};
use spectra::shared_args::{parse_feature_names, SharedFigureArgs, SharedSpectrumArgs};
use spectra::sims::synthesis::{DepthBasis, RenderRequest, SpectralSynthesizer, Synthesis};

/// Command line arguments for spectrum plotting
#[derive(Parser, Debug)]
#[command(
    name = "Spectrum Plotter",
    about = "Plots a blackbody continuum with absorption lines and a color strip",
    long_about = None
)]
struct Args {
    #[command(flatten)]
    spectrum: SharedSpectrumArgs,

    #[command(flatten)]
    figure: SharedFigureArgs,

    /// Catalog features whose lines are marked, e.g. "Ca II,H"
    #[arg(long)]
    mark: Option<String>,

    /// Add a chart of absorption depth against a flat continuum below the flux chart
    #[arg(long, default_value_t = false)]
    absorption_only: bool,

    /// Output file path
    #[arg(short, long, default_value = "plots/spectrum.png")]
    output: PathBuf,
}

/// Print the features that shape this spectrum
fn report_features(synthesizer: &SpectralSynthesizer<'_>, request: &RenderRequest) {
    let active = synthesizer.active_features(request.temperature_k(), request.log_g());
    if active.is_empty() {
        println!("No absorption features are active");
        return;
    }
    println!("Active absorption features:");
    for feature in active {
        println!(
            "  {:<7} strength {:.3}  depth scale {:.3}  width {:.2} nm",
            feature.feature.name,
            feature.strength,
            feature.depth_scale(),
            feature.line_width_nm
        );
    }
}

/// Assemble the chart contents for a synthesis
fn chart_spec<'s>(
    synthesis: &'s Synthesis,
    catalog: &LineCatalog,
    marked: &[String],
) -> Result<SpectrumChartSpec<'s>, Box<dyn Error>> {
    let request = &synthesis.request;
    let class = request.spectral_class();

    let series = match synthesis.basis {
        DepthBasis::Flux => vec![
            ChartSeries {
                spectrum: &synthesis.continuum,
                color: RGBColor(200, 200, 200),
                label: "Continuum".to_string(),
            },
            ChartSeries {
                spectrum: &synthesis.absorbed,
                color: class_color(class),
                label: "With absorption".to_string(),
            },
        ],
        DepthBasis::Unit => vec![ChartSeries {
            spectrum: &synthesis.absorbed,
            color: class_color(class),
            label: "Absorption".to_string(),
        }],
    };

    let mut markers = vec![MarkerLine {
        wavelength_nm: request.peak_wavelength_nm(),
        color: WHITE,
        label: format!("peak {:.0} nm", request.peak_wavelength_nm()),
    }];
    let names: Vec<&str> = marked.iter().map(String::as_str).collect();
    let line_markers = catalog.markers_in_range(
        &names,
        request.wavelength_min_nm(),
        request.wavelength_max_nm(),
    )?;
    markers.extend(MarkerLine::from_line_markers(&line_markers)?);

    Ok(SpectrumChartSpec {
        title: format!(
            "T = {:.0} K (class {}), log g = {:.2}",
            request.temperature_k(),
            class,
            request.log_g()
        ),
        window: (request.wavelength_min_nm(), request.wavelength_max_nm()),
        y_max: 1.1,
        y_desc: match synthesis.basis {
            DepthBasis::Flux => "Normalized Flux".to_string(),
            DepthBasis::Unit => "Relative Intensity".to_string(),
        },
        series,
        markers,
        rainbow: true,
    })
}

/// Main function to generate the plot
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let request = args.spectrum.render_request()?;
    let catalog = args.spectrum.load_catalog()?;
    let marked = match &args.mark {
        Some(list) => parse_feature_names(list)?,
        None => Vec::new(),
    };

    println!(
        "Synthesizing {} samples over {:.0}-{:.0} nm at {:.0} K (class {}, peak {:.1} nm)",
        request.sample_count(),
        request.wavelength_min_nm(),
        request.wavelength_max_nm(),
        request.temperature_k(),
        request.spectral_class(),
        request.peak_wavelength_nm()
    );

    let synthesizer = SpectralSynthesizer::new(&catalog);
    report_features(&synthesizer, &request);

    let layout = args.figure.layout();
    let flux = synthesizer.synthesize(&request, DepthBasis::Flux);
    let flux_spec = chart_spec(&flux, &catalog, &marked)?;

    let figure = if args.absorption_only {
        let unit = synthesizer.synthesize(&request, DepthBasis::Unit);
        let unit_spec = chart_spec(&unit, &catalog, &marked)?;
        let (flux_chart, _) = render_spectrum_chart(&flux_spec, &layout)?;
        let unit_figure = render_spectrum_figure(&unit_spec, &unit.absorbed, &layout)?;
        stack_vertically(&[&flux_chart, &unit_figure], Rgb([0, 0, 0]))
    } else {
        render_spectrum_figure(&flux_spec, &flux.absorbed, &layout)?
    };

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    figure.save(&args.output)?;

    println!("Plot saved to: {}", args.output.display());
    Ok(())
}
