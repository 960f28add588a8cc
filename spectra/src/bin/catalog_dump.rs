//! Export or check absorption line catalogs
//!
//! Writes the built-in catalog as JSON so it can be edited and passed back to
//! the plotting tools with `--catalog`, or validates an edited file and
//! prints its contents.
//!
//! Usage:
//! ```
//! cargo run --bin catalog_dump -- --output catalog.json
//! cargo run --bin catalog_dump -- --check catalog.json
//! ```

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use spectra::photometry::lines::{LineCatalog, ResponseKind};

/// Command line arguments for catalog export
#[derive(Parser, Debug)]
#[command(
    name = "Catalog Dump",
    about = "Writes the built-in line catalog as JSON or validates a catalog file",
    long_about = None
)]
struct Args {
    /// Where to write the built-in catalog
    #[arg(short, long, default_value = "catalog.json")]
    output: PathBuf,

    /// Validate and summarize this catalog file instead of writing one
    #[arg(long)]
    check: Option<PathBuf>,
}

/// Print one row per feature with its response
fn print_summary(catalog: &LineCatalog) {
    println!(
        "{:<7} {:>5}  {:<8} {:>8} {:>7} {:>5}  {}",
        "Feature", "Lines", "Color", "Peak K", "Width K", "Scale", "Response"
    );
    for feature in catalog.features() {
        let response = catalog.response_for(&feature.name);
        let (peak, width, scale) = response
            .map(|r| {
                (
                    format!("{:.0}", r.peak_temperature_k),
                    format!("{:.0}", r.width_k),
                    format!("{:.2}", r.scale_factor),
                )
            })
            .unwrap_or_else(|| ("-".into(), "-".into(), "-".into()));
        let kind = match response.map(|r| r.kind) {
            None => "none".to_string(),
            Some(ResponseKind::Gaussian) => "gaussian".to_string(),
            Some(ResponseKind::FlooredGaussian {
                floor,
                from_temperature_k,
            }) => format!("floor {} from {:.0} K", floor, from_temperature_k),
            Some(ResponseKind::Logistic {
                midpoint_k,
                steepness,
            }) => format!("logistic at {:.0} K, k = {}", midpoint_k, steepness),
        };
        println!(
            "{:<7} {:>5}  {:<8} {:>8} {:>7} {:>5}  {}",
            feature.name,
            feature.lines.len(),
            feature.display_color,
            peak,
            width,
            scale,
            kind
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    match &args.check {
        Some(path) => {
            let catalog = LineCatalog::load_from_file(path)?;
            println!("{} is a valid catalog", path.display());
            print_summary(&catalog);
        }
        None => {
            let catalog = LineCatalog::builtin();
            if let Some(parent) = args.output.parent() {
                std::fs::create_dir_all(parent)?;
            }
            catalog.save_to_file(&args.output)?;
            print_summary(catalog);
            println!("Catalog saved to: {}", args.output.display());
        }
    }

    Ok(())
}
