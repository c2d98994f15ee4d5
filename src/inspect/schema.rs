//! HDU summaries, headers and column listings

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::fits::{ColumnDescriptor, FitsFile, Hdu, Header, TableLayout};
use crate::Result;

/// One line of the HDU listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HduSummary {
    /// Position in the file
    pub index: usize,
    /// EXTNAME (or `PRIMARY`)
    pub name: String,
    /// EXTVER
    pub version: i64,
    /// HDU type name
    #[serde(rename = "type")]
    pub kind: String,
    /// Number of header cards
    pub cards: usize,
    /// Array shape, or `NR x MC` for tables
    pub dimensions: String,
    /// Element type, or the column formats for tables
    pub format: String,
}

/// Everything reported for one HDU
#[derive(Debug, Clone, Serialize)]
pub struct HduReport {
    /// Listing line
    pub summary: HduSummary,
    /// Full header in file order
    pub header: Header,
    /// Column descriptors when the HDU holds a table
    pub columns: Option<Vec<ColumnDescriptor>>,
}

impl HduReport {
    /// Report one HDU
    ///
    /// Columns whose format cannot be decoded are still listed with their raw
    /// TTYPEn, TFORMn and TUNITn. Decoding errors surface when the rows are
    /// streamed.
    pub fn from_hdu(hdu: &Hdu) -> Result<Self> {
        let columns = if hdu.is_table() {
            Some(match TableLayout::from_hdu(hdu) {
                Ok(layout) => layout.columns,
                Err(e) => {
                    log::warn!("HDU {}: {}; listing columns as written", hdu.index, e);
                    ColumnDescriptor::list(hdu)?
                }
            })
        } else {
            None
        };
        Ok(HduReport {
            summary: summarize(hdu, columns.as_deref()),
            header: hdu.header.clone(),
            columns,
        })
    }
}

/// Schema of a whole FITS file
#[derive(Debug, Clone, Serialize)]
pub struct SchemaReport {
    /// File the report was produced from
    pub path: PathBuf,
    /// One entry per HDU, in file order
    pub hdus: Vec<HduReport>,
}

impl SchemaReport {
    /// Build the report from an open file
    pub fn from_file(file: &FitsFile) -> Result<Self> {
        let hdus = file
            .hdus()
            .iter()
            .map(HduReport::from_hdu)
            .collect::<Result<Vec<_>>>()?;

        Ok(SchemaReport {
            path: file.path().to_path_buf(),
            hdus,
        })
    }

    /// Summary lines of every HDU
    pub fn summaries(&self) -> impl Iterator<Item = &HduSummary> {
        self.hdus.iter().map(|h| &h.summary)
    }
}

fn summarize(hdu: &Hdu, columns: Option<&[ColumnDescriptor]>) -> HduSummary {
    let (dimensions, format) = match columns {
        Some(columns) => {
            let rows = hdu.axes.get(1).copied().unwrap_or(0);
            let formats: Vec<&str> = columns.iter().map(|c| c.format.as_str()).collect();
            (
                format!("{}R x {}C", rows, columns.len()),
                format!("[{}]", formats.join(", ")),
            )
        }
        None if hdu.axes.is_empty() => ("()".to_string(), String::new()),
        None => {
            let axes: Vec<String> = hdu.axes.iter().map(|n| n.to_string()).collect();
            (format!("({})", axes.join(", ")), hdu.pixel_format().to_string())
        }
    };

    HduSummary {
        index: hdu.index,
        name: hdu.name(),
        version: hdu.version(),
        kind: hdu.kind.to_string(),
        cards: hdu.header.len(),
        dimensions,
        format,
    }
}

/// Describe every HDU of the FITS file at `path`
///
/// The file is opened and released within this call.
pub fn describe_schema<P: AsRef<Path>>(path: P) -> Result<SchemaReport> {
    let file = FitsFile::open(path)?;
    SchemaReport::from_file(&file)
}

impl fmt::Display for HduSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>3}  {:<10} {:>3}  {:<11} {:>5}   {:<12} {}",
            self.index, self.name, self.version, self.kind, self.cards, self.dimensions, self.format
        )
    }
}

impl fmt::Display for SchemaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Filename: {}", self.path.display())?;
        writeln!(
            f,
            "No.  {:<10} {:>3}  {:<11} {:>5}   {:<12} {}",
            "Name", "Ver", "Type", "Cards", "Dimensions", "Format"
        )?;
        for hdu in &self.hdus {
            writeln!(f, "{}", hdu.summary)?;
        }

        for hdu in &self.hdus {
            writeln!(f)?;
            writeln!(f, "{}", hdu.header)?;

            if let Some(columns) = &hdu.columns {
                writeln!(f)?;
                writeln!(f, "ColDefs(")?;
                for column in columns {
                    write!(f, "    name = '{}'; format = '{}'", column.name, column.format)?;
                    if let Some(unit) = &column.unit {
                        write!(f, "; unit = '{}'", unit)?;
                    }
                    writeln!(f)?;
                }
                writeln!(f, ")")?;
                for column in columns {
                    writeln!(
                        f,
                        "{} {} {}",
                        column.name,
                        column.format,
                        column.unit.as_deref().unwrap_or("-")
                    )?;
                }
            }
        }
        Ok(())
    }
}
