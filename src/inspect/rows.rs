//! Lazy row streaming over a table HDU

use std::fmt;
use std::iter::FusedIterator;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

use crate::fits::{ColumnDescriptor, FitsFile, TableLayout, Value};
use crate::Result;

/// One table record
///
/// Holds exactly one value per column, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    names: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Number of values (equal to the number of columns)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the table has no columns
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in column order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value of the column called `name`
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.values[i])
    }

    /// Iterate `(column name, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }

    /// The row as a JSON object keyed by column name
    pub fn to_json(&self) -> Result<JsonValue> {
        let mut object = Map::new();
        for (name, value) in self.iter() {
            object.insert(name.to_string(), serde_json::to_value(value)?);
        }
        Ok(JsonValue::Object(object))
    }

    /// Deserialize the row into any type whose fields match column names
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.to_json()?)?)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, ")")
    }
}

/// Forward-only stream of the rows of one table HDU
///
/// The stream owns the open file, so the file stays open (and mapped) for
/// exactly as long as the stream lives. Rows are decoded one at a time from
/// the file's data block.
///
/// The stream is single-pass: once it has returned `None` it keeps returning
/// `None`. To read the table again, call [`stream_rows`] again. After a decode
/// error the stream also ends.
pub struct RowStream {
    file: FitsFile,
    hdu_index: usize,
    layout: TableLayout,
    names: Arc<[String]>,
    next_row: usize,
    finished: bool,
}

impl RowStream {
    /// Stream the rows of table HDU `hdu_index` of an already open file
    pub fn new(file: FitsFile, hdu_index: usize) -> Result<Self> {
        let layout = file.table(hdu_index)?;
        let names: Arc<[String]> = layout.columns.iter().map(|c| c.name.clone()).collect();
        log::debug!(
            "Streaming {} rows from HDU {} of {}",
            layout.n_rows,
            hdu_index,
            file.path().display()
        );
        Ok(RowStream {
            file,
            hdu_index,
            layout,
            names,
            next_row: 0,
            finished: false,
        })
    }

    /// Column descriptors of the streamed table
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.layout.columns
    }

    /// Total number of rows in the table
    pub fn total_rows(&self) -> usize {
        self.layout.n_rows
    }

    /// Rows not yet yielded
    pub fn remaining(&self) -> usize {
        if self.finished {
            0
        } else {
            self.layout.n_rows - self.next_row
        }
    }
}

impl Iterator for RowStream {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.next_row >= self.layout.n_rows {
            self.finished = true;
            return None;
        }

        // HDU index was validated in new()
        let hdu = &self.file.hdus()[self.hdu_index];
        let data = self.file.data(hdu);
        let row = self.next_row;
        self.next_row += 1;

        match self.layout.decode_row(data, row) {
            Ok(values) => Some(Ok(Row {
                names: Arc::clone(&self.names),
                values,
            })),
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining()))
    }
}

impl FusedIterator for RowStream {}

/// Open `path` and stream the rows of table HDU `hdu_index`
///
/// Fails with `IndexError` when the HDU does not exist and `NotTabularError`
/// when it holds no table.
pub fn stream_rows<P: AsRef<Path>>(path: P, hdu_index: usize) -> Result<RowStream> {
    let file = FitsFile::open(path)?;
    RowStream::new(file, hdu_index)
}
