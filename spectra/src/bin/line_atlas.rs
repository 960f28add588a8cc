//! Plot a reference atlas of every absorption feature in a line catalog
//!
//! Each panel shows one feature's temperature-independent line profile over
//! the visible rainbow, titled in the feature's display color.
//!
//! Usage:
//! ```
//! cargo run --bin line_atlas -- [OPTIONS]
//! ```

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use plotters::prelude::*;
use rayon::prelude::*;
use spectra::algo::misc::linspace;
use spectra::image_proc::strip::BACKGROUND_ALPHA;
use spectra::photometry::lines::{AbsorptionFeature, LineCatalog};
use spectra::photometry::spectrum::SampledSpectrum;
use spectra::plot::{draw_spectrum_background, hex_to_rgb_color};
use spectra::shared_args::parse_feature_names;
use spectra::sims::synthesis::SpectralSynthesizer;

/// Command line arguments for the line atlas
#[derive(Parser, Debug)]
#[command(
    name = "Line Atlas",
    about = "Plots the line profile of each catalog feature",
    long_about = None
)]
struct Args {
    /// Features to plot, e.g. "H,Ca II" (default: the whole catalog)
    #[arg(long)]
    features: Option<String>,

    /// JSON line catalog to use instead of the built-in one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Wavelength range minimum (nm)
    #[arg(long, default_value_t = 380.0)]
    wavelength_min: f64,

    /// Wavelength range maximum (nm)
    #[arg(long, default_value_t = 800.0)]
    wavelength_max: f64,

    /// Number of sample points per profile
    #[arg(long, default_value_t = 600)]
    sample_points: usize,

    /// Panels per row
    #[arg(long, default_value_t = 3)]
    columns: usize,

    /// Width of the whole atlas in pixels
    #[arg(long, default_value_t = 1200)]
    width: u32,

    /// Height of one panel in pixels
    #[arg(long, default_value_t = 220)]
    panel_height: u32,

    /// Output file path
    #[arg(short, long, default_value = "plots/line_atlas.png")]
    output: PathBuf,
}

/// Features selected on the command line, in catalog order if none were named
fn selected_features<'c>(
    catalog: &'c LineCatalog,
    names: Option<&str>,
) -> Result<Vec<&'c AbsorptionFeature>, Box<dyn Error>> {
    match names {
        Some(list) => {
            let mut features = Vec::new();
            for name in parse_feature_names(list)? {
                features.push(catalog.require_feature(&name)?);
            }
            Ok(features)
        }
        None => Ok(catalog.features().iter().collect()),
    }
}

/// Draw one feature's profile into its panel
fn draw_panel(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    feature: &AbsorptionFeature,
    profile: &SampledSpectrum,
    window: (f64, f64),
) -> Result<(), Box<dyn Error>> {
    let title_color = hex_to_rgb_color(&feature.display_color)?;

    let mut chart = ChartBuilder::on(area)
        .caption(
            &feature.name,
            ("sans-serif", 18.0).into_font().color(&title_color),
        )
        .margin(5)
        .x_label_area_size(25)
        .y_label_area_size(35)
        .build_cartesian_2d(window.0..window.1, 0.0f64..1.05f64)?;

    draw_spectrum_background(&chart, BACKGROUND_ALPHA)?;

    chart
        .configure_mesh()
        .x_labels(6)
        .y_labels(3)
        .x_label_formatter(&|x| format!("{}", *x as i32))
        .y_label_formatter(&|y| format!("{:.1}", y))
        .label_style(("sans-serif", 11.0).into_font().color(&WHITE))
        .light_line_style(WHITE.mix(0.1))
        .draw()?;

    chart.draw_series(LineSeries::new(profile.points(), WHITE.stroke_width(2)))?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => LineCatalog::load_from_file(path)?,
        None => LineCatalog::builtin().clone(),
    };
    let features = selected_features(&catalog, args.features.as_deref())?;
    if features.is_empty() {
        return Err("no features to plot".into());
    }
    if args.wavelength_min >= args.wavelength_max || args.sample_points < 2 {
        return Err("wavelength range must be increasing with at least 2 samples".into());
    }

    let synthesizer = SpectralSynthesizer::new(&catalog);
    let grid = linspace(args.wavelength_min, args.wavelength_max, args.sample_points);

    // Profiles are independent, so compute them in parallel
    let profiles: Vec<SampledSpectrum> = features
        .par_iter()
        .map(|feature| synthesizer.atlas_profile(&feature.name, &grid))
        .collect::<Result<_, _>>()?;

    let columns = args.columns.max(1);
    let rows = features.len().div_ceil(columns);
    println!(
        "Plotting {} features in a {}x{} atlas...",
        features.len(),
        rows,
        columns
    );

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let root = BitMapBackend::new(&args.output, (args.width, args.panel_height * rows as u32))
        .into_drawing_area();
    root.fill(&BLACK)?;

    let areas = root.split_evenly((rows, columns));
    for ((area, feature), profile) in areas.iter().zip(&features).zip(&profiles) {
        draw_panel(
            area,
            feature,
            profile,
            (args.wavelength_min, args.wavelength_max),
        )?;
    }

    root.present()?;
    println!("Atlas saved to: {}", args.output.display());
    Ok(())
}
