//! Plot the RA/Dec columns of a FITS table as points on the unit sphere

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use fitscan::plot::render_scatter;
use fitscan::{project_to_unit_sphere, read_coordinates};

/// Render catalog positions as a 3D scatter plot on the unit sphere
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// FITS file holding the catalog table
    file: PathBuf,

    /// Output image (.svg or .png); defaults to the input name with .svg
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Index of the table HDU
    #[arg(long, default_value_t = 1)]
    hdu: usize,

    /// Right ascension column (degrees)
    #[arg(long, default_value = "RA")]
    ra_column: String,

    /// Declination column (degrees)
    #[arg(long, default_value = "DEC")]
    dec_column: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let (ra, dec) = read_coordinates(&args.file, args.hdu, &args.ra_column, &args.dec_column)
        .with_context(|| format!("Failed to read coordinates from {}", args.file.display()))?;

    let projection = project_to_unit_sphere(&ra, &dec)?;

    let output = args
        .output
        .unwrap_or_else(|| args.file.with_extension("svg"));
    render_scatter(&projection, &output)
        .with_context(|| format!("Failed to render {}", output.display()))?;

    println!("Plotted {} stars to {}", projection.len(), output.display());
    Ok(())
}
