//! Print the HDU listing, headers and table columns of a FITS file

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use fitscan::describe_schema;

/// Print the schema of a FITS file
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// FITS file to inspect
    file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let report = describe_schema(&args.file)
        .with_context(|| format!("Failed to read schema of {}", args.file.display()))?;
    print!("{}", report);

    Ok(())
}
