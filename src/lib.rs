//! Fitscan: inspect FITS tables and project catalog positions onto the unit sphere
//!
//! This crate reads FITS files in pure Rust, reports their HDU layout, headers
//! and table columns, streams table rows, and turns RA/Dec columns into 3D
//! unit vectors that can be rendered as a scatter plot.
//!
//! ```rust,no_run
//! use fitscan::coordinates::project_to_unit_sphere;
//! use fitscan::inspect::{describe_schema, read_coordinates};
//!
//! let report = describe_schema("catalog.fits")?;
//! println!("{}", report);
//!
//! let (ra, dec) = read_coordinates("catalog.fits", 1, "RA", "DEC")?;
//! let projection = project_to_unit_sphere(&ra, &dec)?;
//! println!("{} points", projection.len());
//! # Ok::<(), fitscan::FitscanError>(())
//! ```

use std::path::PathBuf;
use thiserror::Error;

pub mod coordinates;
pub mod fits;
pub mod inspect;
pub mod plot;

// Re-export commonly used types
pub use coordinates::{project_to_unit_sphere, Cartesian3, Projection, RaDec};
pub use fits::{FitsFile, OpenOptions};
pub use inspect::{describe_schema, read_coordinates, stream_rows, Row, RowStream, SchemaReport};

/// Main error type for the fitscan library
#[derive(Debug, Error)]
pub enum FitscanError {
    /// The path does not exist or cannot be read
    #[error("Cannot open {path:?}: {source}")]
    NotFoundError {
        /// The path that was requested
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// The file is not valid FITS, or is corrupted
    #[error("Invalid FITS data: {0}")]
    FileFormatError(String),

    /// The requested HDU does not exist
    #[error("HDU index {index} out of range (file has {count} HDUs)")]
    IndexError {
        /// The requested HDU index
        index: usize,
        /// Number of HDUs in the file
        count: usize,
    },

    /// The requested HDU carries no table data
    #[error("HDU {index} has no table data ({kind})")]
    NotTabularError {
        /// The requested HDU index
        index: usize,
        /// Type of the HDU that was found instead
        kind: String,
    },

    /// RA and Dec inputs are not index-aligned
    #[error("RA/Dec length mismatch: {ra_len} RA values, {dec_len} Dec values")]
    ShapeMismatchError {
        /// Number of RA values
        ra_len: usize,
        /// Number of Dec values
        dec_len: usize,
    },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column {0} does not hold numeric scalars")]
    NotNumeric(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Plot error: {0}")]
    PlotError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for fitscan operations
pub type Result<T> = std::result::Result<T, FitscanError>;

/// Map an I/O error raised while opening `path`
///
/// Missing and unreadable files become [`FitscanError::NotFoundError`];
/// anything else stays a plain I/O error.
pub fn io_err(path: impl Into<PathBuf>, err: std::io::Error) -> FitscanError {
    match err.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
            FitscanError::NotFoundError {
                path: path.into(),
                source: err,
            }
        }
        _ => FitscanError::IoError(err),
    }
}
