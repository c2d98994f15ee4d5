//! Schema and row inspection of FITS files
//!
//! [`describe_schema`] reports every HDU with its header and, for tables, its
//! columns. [`stream_rows`] walks the records of one table lazily.
//! [`read_coordinates`] pulls a pair of RA/Dec columns out of a table for
//! projection.

pub mod rows;
pub mod schema;

use std::path::Path;

pub use self::rows::{stream_rows, Row, RowStream};
pub use self::schema::{describe_schema, HduReport, HduSummary, SchemaReport};

use crate::fits::{FitsFile, TableLayout};
use crate::{FitscanError, Result};

/// Read the RA and Dec columns (degrees) of table HDU `hdu_index`
///
/// Column names are matched exactly first, then ignoring ASCII case. Both
/// columns must hold numeric scalars.
pub fn read_coordinates<P: AsRef<Path>>(
    path: P,
    hdu_index: usize,
    ra_column: &str,
    dec_column: &str,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let file = FitsFile::open(path)?;
    let layout = file.table(hdu_index)?;
    let data = file.data(file.hdu(hdu_index)?);

    let ra = numeric_column(&layout, data, ra_column)?;
    let dec = numeric_column(&layout, data, dec_column)?;
    log::info!(
        "Read {} coordinate pairs from {} [{}, {}]",
        ra.len(),
        file.path().display(),
        ra_column,
        dec_column
    );
    Ok((ra, dec))
}

fn numeric_column(layout: &TableLayout, data: &[u8], name: &str) -> Result<Vec<f64>> {
    let index = layout
        .column_index(name)
        .ok_or_else(|| FitscanError::ColumnNotFound(name.to_string()))?;
    if !layout.is_numeric_scalar(index) {
        return Err(FitscanError::NotNumeric(name.to_string()));
    }

    (0..layout.n_rows)
        .map(|row| -> Result<f64> {
            let value = layout.decode_value(data, row, index)?;
            // Blank ASCII fields decode to Null and become NaN
            Ok(value.as_f64().unwrap_or(f64::NAN))
        })
        .collect()
}
