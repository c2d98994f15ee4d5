//! Print every row of a FITS table

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use fitscan::stream_rows;

/// Dump the rows of a FITS table HDU
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// FITS file to read
    file: PathBuf,

    /// Index of the table HDU (0 is the primary HDU)
    #[arg(long, default_value_t = 1)]
    hdu: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rows = stream_rows(&args.file, args.hdu).with_context(|| {
        format!("Failed to open HDU {} of {}", args.hdu, args.file.display())
    })?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for row in rows {
        let row = row.context("Failed to decode row")?;
        writeln!(out, "{}", row)?;
    }
    out.flush()?;

    Ok(())
}
