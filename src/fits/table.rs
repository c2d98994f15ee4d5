//! Binary (`BINTABLE`) and ASCII (`TABLE`) table decoding
//!
//! A [`TableLayout`] is built once from an HDU header and then decodes
//! individual records from the HDU's data block on demand, so no table is ever
//! loaded as a whole.

use std::fmt;

use byteorder::{BigEndian, ByteOrder};
use serde::Serialize;

use super::hdu::{Hdu, HduKind};
use super::header::Header;
use crate::{FitscanError, Result};

/// Storage type of a binary-table column (the letter of TFORMn)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryType {
    Logical,
    Bit,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
    Complex,
    DoubleComplex,
}

impl BinaryType {
    fn from_code(code: char) -> Option<Self> {
        Some(match code {
            'L' => BinaryType::Logical,
            'X' => BinaryType::Bit,
            'B' => BinaryType::Byte,
            'I' => BinaryType::Short,
            'J' => BinaryType::Int,
            'K' => BinaryType::Long,
            'A' => BinaryType::Char,
            'E' => BinaryType::Float,
            'D' => BinaryType::Double,
            'C' => BinaryType::Complex,
            'M' => BinaryType::DoubleComplex,
            _ => return None,
        })
    }

    /// Bytes per element (a bit column packs eight elements per byte)
    fn element_size(self) -> usize {
        match self {
            BinaryType::Bit | BinaryType::Logical | BinaryType::Byte | BinaryType::Char => 1,
            BinaryType::Short => 2,
            BinaryType::Int | BinaryType::Float => 4,
            BinaryType::Long | BinaryType::Double | BinaryType::Complex => 8,
            BinaryType::DoubleComplex => 16,
        }
    }

    /// Bytes taken by `count` elements of this type, `None` on overflow
    fn storage_len(self, count: usize) -> Option<usize> {
        match self {
            BinaryType::Bit => Some(count.div_ceil(8)),
            _ => count.checked_mul(self.element_size()),
        }
    }

    fn is_numeric(self) -> bool {
        !matches!(self, BinaryType::Bit | BinaryType::Char | BinaryType::Logical)
    }
}

/// Field type of an ASCII-table column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsciiType {
    Char,
    Integer,
    Fixed,
    Exponential,
}

/// Decoded TFORMn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFormat {
    /// Fixed-width binary field of `repeat` elements
    Binary { repeat: usize, ty: BinaryType },
    /// Variable-length array descriptor (`P` = 32-bit, `Q` = 64-bit)
    VarArray { wide: bool, ty: BinaryType },
    /// ASCII-table text field
    Ascii {
        ty: AsciiType,
        width: usize,
        decimals: Option<usize>,
    },
}

impl ColumnFormat {
    /// Parse a binary-table TFORM such as `E`, `3D`, `16A`, `1PE(200)`
    pub fn parse_binary(tform: &str) -> Result<Self> {
        let tform = tform.trim();
        let digits = tform.chars().take_while(|c| c.is_ascii_digit()).count();
        let repeat = if digits == 0 {
            1
        } else {
            tform[..digits]
                .parse::<usize>()
                .map_err(|_| bad_tform(tform))?
        };
        let mut rest = tform[digits..].chars();
        let code = rest.next().ok_or_else(|| bad_tform(tform))?;
        match code {
            'P' | 'Q' => {
                if repeat > 1 {
                    return Err(bad_tform(tform));
                }
                let element = rest.next().ok_or_else(|| bad_tform(tform))?;
                let ty = BinaryType::from_code(element).ok_or_else(|| bad_tform(tform))?;
                Ok(ColumnFormat::VarArray {
                    wide: code == 'Q',
                    ty,
                })
            }
            _ => {
                let ty = BinaryType::from_code(code).ok_or_else(|| bad_tform(tform))?;
                ty.storage_len(repeat).ok_or_else(|| bad_tform(tform))?;
                Ok(ColumnFormat::Binary { repeat, ty })
            }
        }
    }

    /// Parse an ASCII-table TFORM such as `A10`, `I6`, `F8.3`, `E15.7`, `D25.17`
    pub fn parse_ascii(tform: &str) -> Result<Self> {
        let tform = tform.trim();
        let mut chars = tform.chars();
        let ty = match chars.next() {
            Some('A') => AsciiType::Char,
            Some('I') => AsciiType::Integer,
            Some('F') => AsciiType::Fixed,
            Some('E') | Some('D') => AsciiType::Exponential,
            _ => return Err(bad_tform(tform)),
        };
        let field = chars.as_str();
        let (width, decimals) = match field.split_once('.') {
            Some((w, d)) => (w, Some(d.parse::<usize>().map_err(|_| bad_tform(tform))?)),
            None => (field, None),
        };
        let width = width.parse::<usize>().map_err(|_| bad_tform(tform))?;
        if width == 0 {
            return Err(bad_tform(tform));
        }
        Ok(ColumnFormat::Ascii {
            ty,
            width,
            decimals,
        })
    }

    /// Bytes the field takes in each row (excluding heap data)
    pub fn width(&self) -> usize {
        match self {
            ColumnFormat::Binary { repeat, ty } => ty.storage_len(*repeat).unwrap_or(usize::MAX),
            ColumnFormat::VarArray { wide: false, .. } => 8,
            ColumnFormat::VarArray { wide: true, .. } => 16,
            ColumnFormat::Ascii { width, .. } => *width,
        }
    }
}

fn bad_tform(tform: &str) -> FitscanError {
    FitscanError::FileFormatError(format!("Unsupported column format {:?}", tform))
}

/// Column metadata of a table HDU, as written in its header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    /// TTYPEn (or `colN` when absent)
    pub name: String,
    /// TFORMn as written in the header
    pub format: String,
    /// TUNITn, absent when missing or blank
    pub unit: Option<String>,
}

impl ColumnDescriptor {
    /// Keywords of column `n` (1-based)
    pub fn from_header(header: &Header, n: usize) -> Result<Self> {
        let format = header.required_str(&format!("TFORM{}", n))?.to_string();
        let name = header
            .get_str(&format!("TTYPE{}", n))
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("col{}", n));
        let unit = header
            .get_str(&format!("TUNIT{}", n))
            .filter(|u| !u.is_empty())
            .map(|u| u.to_string());
        Ok(ColumnDescriptor { name, format, unit })
    }

    /// Descriptors of every column of a table HDU
    ///
    /// TFORMn is reported verbatim, so this succeeds for formats the decoder
    /// does not support.
    pub fn list(hdu: &Hdu) -> Result<Vec<Self>> {
        (1..=tfields(hdu)?)
            .map(|n| ColumnDescriptor::from_header(&hdu.header, n))
            .collect()
    }
}

fn tfields(hdu: &Hdu) -> Result<usize> {
    let tfields = hdu.header.required_int("TFIELDS")?;
    if !(0..=999).contains(&tfields) {
        return Err(FitscanError::FileFormatError(format!(
            "Invalid TFIELDS {} in HDU {}",
            tfields, hdu.index
        )));
    }
    Ok(tfields as usize)
}

/// Where and how one column is stored in a row
#[derive(Debug, Clone, Copy, PartialEq)]
struct Field {
    storage: ColumnFormat,
    offset: usize,
}

/// A decoded table cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Undefined logical or blank ASCII numeric field
    Null,
    Logical(bool),
    Byte(u8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Complex(f32, f32),
    DoubleComplex(f64, f64),
    String(String),
    Bits(Vec<bool>),
    Array(Vec<Value>),
}

impl Value {
    /// Numeric scalar as `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Byte(v) => Some(f64::from(*v)),
            Value::Short(v) => Some(f64::from(*v)),
            Value::Int(v) => Some(f64::from(*v)),
            Value::Long(v) => Some(*v as f64),
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// String content
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Logical(b) => write!(f, "{}", b),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Double(v) => write!(f, "{:?}", v),
            Value::Complex(re, im) => write!(f, "({:?}{:+?}j)", re, im),
            Value::DoubleComplex(re, im) => write!(f, "({:?}{:+?}j)", re, im),
            Value::String(s) => write!(f, "'{}'", s),
            Value::Bits(bits) => {
                write!(f, "[")?;
                for (i, bit) in bits.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", u8::from(*bit))?;
                }
                write!(f, "]")
            }
            Value::Array(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Row layout of one table HDU
#[derive(Debug, Clone)]
pub struct TableLayout {
    /// Columns in header order
    pub columns: Vec<ColumnDescriptor>,
    fields: Vec<Field>,
    /// Bytes per row (NAXIS1)
    pub row_len: usize,
    /// Number of rows (NAXIS2)
    pub n_rows: usize,
    /// Heap start relative to the data block (THEAP)
    pub heap_offset: usize,
}

impl TableLayout {
    /// Read the table layout from an HDU header
    pub fn from_hdu(hdu: &Hdu) -> Result<Self> {
        let ascii = match hdu.kind {
            HduKind::BinTable => false,
            HduKind::AsciiTable => true,
            ref other => {
                return Err(FitscanError::NotTabularError {
                    index: hdu.index,
                    kind: other.to_string(),
                })
            }
        };
        if hdu.axes.len() != 2 {
            return Err(FitscanError::FileFormatError(format!(
                "Table HDU {} has NAXIS = {}, expected 2",
                hdu.index,
                hdu.axes.len()
            )));
        }
        let row_len = hdu.axes[0];
        let n_rows = hdu.axes[1];

        let header = &hdu.header;
        let columns = ColumnDescriptor::list(hdu)?;
        let mut fields = Vec::with_capacity(columns.len());
        let mut offset = 0usize;
        for (i, column) in columns.iter().enumerate() {
            let n = i + 1;
            let (storage, column_offset) = if ascii {
                let storage = ColumnFormat::parse_ascii(&column.format)?;
                let tbcol = header.required_int(&format!("TBCOL{}", n))?;
                if tbcol < 1 {
                    return Err(FitscanError::FileFormatError(format!(
                        "Invalid TBCOL{} {} in HDU {}",
                        n, tbcol, hdu.index
                    )));
                }
                (storage, tbcol as usize - 1)
            } else {
                let storage = ColumnFormat::parse_binary(&column.format)?;
                let column_offset = offset;
                offset = offset.saturating_add(storage.width());
                (storage, column_offset)
            };

            if column_offset
                .checked_add(storage.width())
                .map_or(true, |end| end > row_len)
            {
                return Err(FitscanError::FileFormatError(format!(
                    "Column {} ({}) extends past the {}-byte row",
                    n, column.name, row_len
                )));
            }

            fields.push(Field {
                storage,
                offset: column_offset,
            });
        }

        if !ascii && offset != row_len {
            return Err(FitscanError::FileFormatError(format!(
                "Column widths sum to {} bytes but NAXIS1 is {}",
                offset, row_len
            )));
        }

        let heap_offset = match header.get_int("THEAP") {
            Some(theap) => usize::try_from(theap).map_err(|_| {
                FitscanError::FileFormatError(format!("Invalid THEAP {}", theap))
            })?,
            None => row_len.checked_mul(n_rows).ok_or_else(|| {
                FitscanError::FileFormatError(format!(
                    "Table HDU {} is larger than the address space",
                    hdu.index
                ))
            })?,
        };

        log::debug!(
            "HDU {}: {} columns, {} rows of {} bytes, heap at {}",
            hdu.index,
            columns.len(),
            n_rows,
            row_len,
            heap_offset
        );

        Ok(TableLayout {
            columns,
            fields,
            row_len,
            n_rows,
            heap_offset,
        })
    }

    /// Index of the column named `name`
    ///
    /// Exact matches win; otherwise the comparison ignores ASCII case.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.name.eq_ignore_ascii_case(name))
            })
    }

    fn record<'a>(&self, data: &'a [u8], row: usize) -> Result<&'a [u8]> {
        row.checked_mul(self.row_len)
            .and_then(|start| data.get(start..start.checked_add(self.row_len)?))
            .ok_or_else(|| {
                FitscanError::FileFormatError(format!("Row {} lies outside the data block", row))
            })
    }

    /// Whether every cell of column `index` decodes to a numeric scalar
    pub fn is_numeric_scalar(&self, index: usize) -> bool {
        match self.fields.get(index).map(|f| f.storage) {
            Some(ColumnFormat::Binary { repeat, ty }) => repeat == 1 && ty.is_numeric(),
            Some(ColumnFormat::Ascii { ty, .. }) => ty != AsciiType::Char,
            Some(ColumnFormat::VarArray { .. }) | None => false,
        }
    }

    /// Decode every cell of row `row`
    pub fn decode_row(&self, data: &[u8], row: usize) -> Result<Vec<Value>> {
        let record = self.record(data, row)?;
        (0..self.columns.len())
            .map(|index| self.decode_cell(data, record, index))
            .collect()
    }

    /// Decode one column of row `row`
    pub fn decode_value(&self, data: &[u8], row: usize, column: usize) -> Result<Value> {
        if column >= self.columns.len() {
            return Err(FitscanError::ColumnNotFound(format!("column #{}", column)));
        }
        let record = self.record(data, row)?;
        self.decode_cell(data, record, column)
    }

    fn decode_cell(&self, data: &[u8], record: &[u8], index: usize) -> Result<Value> {
        let name = &self.columns[index].name;
        let Field { storage, offset } = self.fields[index];
        let field = offset
            .checked_add(storage.width())
            .and_then(|end| record.get(offset..end))
            .ok_or_else(|| {
                FitscanError::FileFormatError(format!("Column {} extends past the row", name))
            })?;
        match storage {
            ColumnFormat::Binary { repeat, ty } => Ok(decode_binary(ty, repeat, field, true)),
            ColumnFormat::VarArray { wide, ty } => {
                let (count, offset) = if wide {
                    (BigEndian::read_i64(&field[..8]), BigEndian::read_i64(&field[8..16]))
                } else {
                    (
                        i64::from(BigEndian::read_i32(&field[..4])),
                        i64::from(BigEndian::read_i32(&field[4..8])),
                    )
                };
                let (count, offset) = match (usize::try_from(count), usize::try_from(offset)) {
                    (Ok(c), Ok(o)) => (c, o),
                    _ => {
                        return Err(FitscanError::FileFormatError(format!(
                            "Negative array descriptor in column {}",
                            name
                        )))
                    }
                };
                let heap = self
                    .heap_offset
                    .checked_add(offset)
                    .and_then(|start| Some(start..start.checked_add(ty.storage_len(count)?)?))
                    .and_then(|range| data.get(range))
                    .ok_or_else(|| {
                        FitscanError::FileFormatError(format!(
                            "Array descriptor in column {} points outside the heap",
                            name
                        ))
                    })?;
                Ok(decode_binary(ty, count, heap, false))
            }
            ColumnFormat::Ascii { ty, decimals, .. } => decode_ascii(ty, decimals, field, name),
        }
    }
}

/// Decode `count` elements of `ty`
///
/// With `collapse` a single element is returned as a scalar, as fixed-width
/// binary columns with repeat 1 are.
fn decode_binary(ty: BinaryType, count: usize, bytes: &[u8], collapse: bool) -> Value {
    match ty {
        BinaryType::Char => {
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            Value::String(String::from_utf8_lossy(&bytes[..end]).trim_end().to_string())
        }
        BinaryType::Bit => Value::Bits(
            (0..count)
                .map(|i| bytes[i / 8] & (0x80 >> (i % 8)) != 0)
                .collect(),
        ),
        _ => {
            let size = ty.element_size();
            let mut values: Vec<Value> = bytes
                .chunks_exact(size)
                .take(count)
                .map(|chunk| decode_element(ty, chunk))
                .collect();
            if collapse && count == 1 {
                values.pop().unwrap_or(Value::Null)
            } else {
                Value::Array(values)
            }
        }
    }
}

fn decode_element(ty: BinaryType, b: &[u8]) -> Value {
    match ty {
        BinaryType::Logical => match b[0] {
            b'T' => Value::Logical(true),
            b'F' => Value::Logical(false),
            _ => Value::Null,
        },
        BinaryType::Byte => Value::Byte(b[0]),
        BinaryType::Short => Value::Short(BigEndian::read_i16(b)),
        BinaryType::Int => Value::Int(BigEndian::read_i32(b)),
        BinaryType::Long => Value::Long(BigEndian::read_i64(b)),
        BinaryType::Float => Value::Float(BigEndian::read_f32(b)),
        BinaryType::Double => Value::Double(BigEndian::read_f64(b)),
        BinaryType::Complex => {
            Value::Complex(BigEndian::read_f32(&b[..4]), BigEndian::read_f32(&b[4..8]))
        }
        BinaryType::DoubleComplex => Value::DoubleComplex(
            BigEndian::read_f64(&b[..8]),
            BigEndian::read_f64(&b[8..16]),
        ),
        // Handled as whole fields by decode_binary
        BinaryType::Char | BinaryType::Bit => Value::Null,
    }
}

fn decode_ascii(ty: AsciiType, decimals: Option<usize>, field: &[u8], name: &str) -> Result<Value> {
    let text = String::from_utf8_lossy(field);
    if ty == AsciiType::Char {
        return Ok(Value::String(text.trim_end().to_string()));
    }
    let text = text.trim();
    if text.is_empty() {
        return Ok(Value::Null);
    }
    let invalid = || {
        FitscanError::FileFormatError(format!("Invalid value {:?} in column {}", text, name))
    };
    match ty {
        AsciiType::Integer => text
            .strip_prefix('+')
            .unwrap_or(text)
            .parse::<i64>()
            .map(Value::Long)
            .map_err(|_| invalid()),
        _ => {
            let normalized = text.replace(['D', 'd'], "E");
            let value = normalized.parse::<f64>().map_err(|_| invalid())?;
            // Without an explicit decimal point, the point sits `decimals` digits from the right
            let implicit_point =
                !normalized.contains('.') && !normalized.contains(['E', 'e']);
            match decimals {
                Some(d) if implicit_point && d > 0 => {
                    Ok(Value::Double(value / 10f64.powi(d as i32)))
                }
                _ => Ok(Value::Double(value)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fits::header::{Card, Header, HeaderValue};
    use rstest::rstest;

    /// One-column binary table HDU with `rows` rows
    fn bintable(tform: &str, row_len: i64, rows: i64) -> Hdu {
        let int = HeaderValue::Integer;
        let header = Header::from_cards([
            Card::new("BITPIX", int(8)),
            Card::new("NAXIS", int(2)),
            Card::new("NAXIS1", int(row_len)),
            Card::new("NAXIS2", int(rows)),
            Card::new("PCOUNT", int(0)),
            Card::new("TFIELDS", int(1)),
            Card::new("TTYPE1", HeaderValue::String("SPECTRUM".into())),
            Card::new("TFORM1", HeaderValue::String(tform.into())),
        ]);
        Hdu::new(1, header, HduKind::BinTable, 0, 0).unwrap()
    }

    #[rstest]
    #[case("E", 4)]
    #[case("1E", 4)]
    #[case("3D", 24)]
    #[case("16A", 16)]
    #[case("L", 1)]
    #[case("11X", 2)]
    #[case("2I", 4)]
    #[case("J", 4)]
    #[case("K", 8)]
    #[case("C", 8)]
    #[case("2M", 32)]
    #[case("0E", 0)]
    #[case("1PE(200)", 8)]
    #[case("QD", 16)]
    fn test_binary_tform_widths(#[case] tform: &str, #[case] width: usize) {
        let format = ColumnFormat::parse_binary(tform).unwrap();
        assert_eq!(format.width(), width, "width of {}", tform);
    }

    #[rstest]
    #[case("")]
    #[case("3")]
    #[case("Z")]
    #[case("2PE")]
    #[case("PZ")]
    #[case("4611686018427387904D")]
    fn test_binary_tform_rejects(#[case] tform: &str) {
        assert!(ColumnFormat::parse_binary(tform).is_err());
    }

    #[test]
    fn test_ascii_tform() {
        assert_eq!(
            ColumnFormat::parse_ascii("F8.3").unwrap(),
            ColumnFormat::Ascii {
                ty: AsciiType::Fixed,
                width: 8,
                decimals: Some(3)
            }
        );
        assert_eq!(ColumnFormat::parse_ascii("A10").unwrap().width(), 10);
        assert_eq!(ColumnFormat::parse_ascii("D25.17").unwrap().width(), 25);
        assert!(ColumnFormat::parse_ascii("X4").is_err());
        assert!(ColumnFormat::parse_ascii("I").is_err());
    }

    #[test]
    fn test_decode_scalars_and_arrays() {
        assert_eq!(
            decode_binary(BinaryType::Float, 1, &1.5f32.to_be_bytes(), true),
            Value::Float(1.5)
        );
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&7i16.to_be_bytes());
        bytes.extend_from_slice(&(-3i16).to_be_bytes());
        assert_eq!(
            decode_binary(BinaryType::Short, 2, &bytes, true),
            Value::Array(vec![Value::Short(7), Value::Short(-3)])
        );
        assert_eq!(
            decode_binary(BinaryType::Double, 0, &[], true),
            Value::Array(vec![])
        );
    }

    #[test]
    fn test_decode_text_bits_and_logicals() {
        assert_eq!(
            decode_binary(BinaryType::Char, 8, b"HIP 12\0\0", true),
            Value::String("HIP 12".to_string())
        );
        assert_eq!(
            decode_binary(BinaryType::Char, 6, b"abc   ", true),
            Value::String("abc".to_string())
        );
        assert_eq!(
            decode_binary(BinaryType::Bit, 3, &[0b1010_0000], true),
            Value::Bits(vec![true, false, true])
        );
        assert_eq!(
            decode_binary(BinaryType::Logical, 3, b"TF\0", true),
            Value::Array(vec![Value::Logical(true), Value::Logical(false), Value::Null])
        );
    }

    #[test]
    fn test_decode_ascii_fields() {
        assert_eq!(
            decode_ascii(AsciiType::Integer, None, b"   +42", "N").unwrap(),
            Value::Long(42)
        );
        assert_eq!(
            decode_ascii(AsciiType::Exponential, Some(3), b" 1.5D+02", "X").unwrap(),
            Value::Double(150.0)
        );
        assert_eq!(
            decode_ascii(AsciiType::Fixed, Some(2), b"  1234", "F").unwrap(),
            Value::Double(12.34)
        );
        assert_eq!(
            decode_ascii(AsciiType::Fixed, Some(2), b"      ", "F").unwrap(),
            Value::Null
        );
        assert!(decode_ascii(AsciiType::Integer, None, b"  abc", "N").is_err());
    }

    #[test]
    fn test_value_display_and_json() {
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
        assert_eq!(Value::String("M31".into()).to_string(), "'M31'");
        assert_eq!(
            Value::Array(vec![Value::Int(1), Value::Int(2)]).to_string(),
            "[1, 2]"
        );
        assert_eq!(Value::Complex(1.0, -2.0).to_string(), "(1.0-2.0j)");
        assert_eq!(
            serde_json::to_value(Value::Double(2.5)).unwrap(),
            serde_json::json!(2.5)
        );
        assert_eq!(serde_json::to_value(Value::Null).unwrap(), serde_json::Value::Null);
    }

    #[rstest]
    #[case(i64::MAX, 0)]
    #[case(1, i64::MAX)]
    #[case(i64::MAX / 8 + 1, 0)]
    fn test_heap_descriptor_overflow_is_an_error(#[case] count: i64, #[case] offset: i64) {
        let layout = TableLayout::from_hdu(&bintable("1QD", 16, 1)).unwrap();
        let mut data = count.to_be_bytes().to_vec();
        data.extend_from_slice(&offset.to_be_bytes());
        data.extend_from_slice(&2.5f64.to_be_bytes());

        assert!(matches!(
            layout.decode_row(&data, 0),
            Err(FitscanError::FileFormatError(_))
        ));
    }

    #[test]
    fn test_heap_descriptor_within_bounds() {
        let layout = TableLayout::from_hdu(&bintable("1QD", 16, 1)).unwrap();
        let mut data = 1i64.to_be_bytes().to_vec();
        data.extend_from_slice(&0i64.to_be_bytes());
        data.extend_from_slice(&2.5f64.to_be_bytes());

        assert_eq!(
            layout.decode_row(&data, 0).unwrap(),
            vec![Value::Array(vec![Value::Double(2.5)])]
        );
        assert!(layout.decode_row(&data, usize::MAX).is_err());
    }
}
