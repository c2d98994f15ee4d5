//! Header-Data-Unit layout

use std::fmt;

use serde::Serialize;

use super::header::Header;
use super::BLOCK_SIZE;
use crate::{FitscanError, Result};

/// Kind of HDU, as classified by the FITS reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HduKind {
    /// Primary array (HDU 0)
    Primary,
    /// Random groups primary array
    RandomGroups,
    /// `XTENSION = 'IMAGE'`
    Image,
    /// `XTENSION = 'BINTABLE'`
    BinTable,
    /// `XTENSION = 'TABLE'`
    AsciiTable,
}

impl HduKind {
    /// Whether HDUs of this kind hold a table
    pub fn is_table(&self) -> bool {
        matches!(self, HduKind::BinTable | HduKind::AsciiTable)
    }
}

impl fmt::Display for HduKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HduKind::Primary => "PrimaryHDU",
            HduKind::RandomGroups => "GroupsHDU",
            HduKind::Image => "ImageHDU",
            HduKind::BinTable => "BinTableHDU",
            HduKind::AsciiTable => "TableHDU",
        };
        f.write_str(name)
    }
}

/// One HDU: its header plus the location of its data block in the file
#[derive(Debug, Clone)]
pub struct Hdu {
    /// Position of this HDU in the file
    pub index: usize,
    /// Header cards with their values
    pub header: Header,
    /// Kind of HDU
    pub kind: HduKind,
    /// Bits per data value (negative for IEEE floats)
    pub bitpix: i64,
    /// NAXISn values in header order
    pub axes: Vec<usize>,
    /// PCOUNT (heap or group parameter count)
    pub pcount: usize,
    /// GCOUNT (group count)
    pub gcount: usize,
    /// Byte offset of the header in the file
    pub header_offset: usize,
    /// Byte offset of the data block in the file
    pub data_offset: usize,
    /// Unpadded size of the data block in bytes
    pub data_len: usize,
}

impl Hdu {
    /// Build an HDU from its header
    ///
    /// Validates the structural keywords and computes the data size as
    /// `|BITPIX|/8 * GCOUNT * (PCOUNT + NAXIS1 * ... * NAXISn)`, where random
    /// groups leave NAXIS1 out of the product. A primary `kind` is refined to
    /// [`HduKind::RandomGroups`] when the header says so.
    pub fn new(
        index: usize,
        header: Header,
        kind: HduKind,
        header_offset: usize,
        data_offset: usize,
    ) -> Result<Self> {
        let kind = match kind {
            HduKind::Primary => Self::primary_kind(&header),
            other => other,
        };

        let bitpix = header.required_int("BITPIX")?;
        if ![8, 16, 32, 64, -32, -64].contains(&bitpix) {
            return Err(FitscanError::FileFormatError(format!(
                "Invalid BITPIX {} in HDU {}",
                bitpix, index
            )));
        }

        let naxis = header.required_int("NAXIS")?;
        if !(0..=999).contains(&naxis) {
            return Err(FitscanError::FileFormatError(format!(
                "Invalid NAXIS {} in HDU {}",
                naxis, index
            )));
        }
        let axes = (1..=naxis)
            .map(|i| {
                let key = format!("NAXIS{}", i);
                let n = header.required_int(&key)?;
                usize::try_from(n).map_err(|_| {
                    FitscanError::FileFormatError(format!("Negative {} in HDU {}", key, index))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let pcount = Self::count_keyword(&header, "PCOUNT", 0, index)?;
        let gcount = Self::count_keyword(&header, "GCOUNT", 1, index)?;

        let data_len = Self::data_size(kind, bitpix, &axes, pcount, gcount).ok_or_else(|| {
            FitscanError::FileFormatError(format!("Data size of HDU {} overflows", index))
        })?;

        Ok(Hdu {
            index,
            header,
            kind,
            bitpix,
            axes,
            pcount,
            gcount,
            header_offset,
            data_offset,
            data_len,
        })
    }

    fn primary_kind(header: &Header) -> HduKind {
        if header.get_bool("GROUPS") == Some(true) && header.get_int("NAXIS1") == Some(0) {
            HduKind::RandomGroups
        } else {
            HduKind::Primary
        }
    }

    fn count_keyword(header: &Header, keyword: &str, default: usize, index: usize) -> Result<usize> {
        match header.get(keyword) {
            None => Ok(default),
            Some(value) => value
                .as_int()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| {
                    FitscanError::FileFormatError(format!(
                        "Invalid {} {:?} in HDU {}",
                        keyword, value, index
                    ))
                }),
        }
    }

    fn data_size(
        kind: HduKind,
        bitpix: i64,
        axes: &[usize],
        pcount: usize,
        gcount: usize,
    ) -> Option<usize> {
        if axes.is_empty() {
            return Some(0);
        }
        let counted = if kind == HduKind::RandomGroups {
            &axes[1..]
        } else {
            axes
        };
        let elements = counted
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))?;
        let bytes_per_value = (bitpix.unsigned_abs() / 8) as usize;
        elements
            .checked_add(pcount)?
            .checked_mul(gcount)?
            .checked_mul(bytes_per_value)
    }

    /// Data block size rounded up to whole 2880-byte blocks
    ///
    /// `None` when the padded size does not fit in `usize`.
    pub fn padded_data_len(&self) -> Option<usize> {
        self.data_len.div_ceil(BLOCK_SIZE).checked_mul(BLOCK_SIZE)
    }

    /// EXTNAME, or `PRIMARY` for HDU 0 without one
    pub fn name(&self) -> String {
        match self.header.get_str("EXTNAME") {
            Some(name) => name.to_string(),
            None if self.index == 0 => "PRIMARY".to_string(),
            None => String::new(),
        }
    }

    /// EXTVER, defaulting to 1
    pub fn version(&self) -> i64 {
        self.header.get_int("EXTVER").unwrap_or(1)
    }

    /// Whether the HDU has a data block
    pub fn has_data(&self) -> bool {
        self.data_len > 0
    }

    /// Whether the HDU holds a table
    pub fn is_table(&self) -> bool {
        self.kind.is_table()
    }

    /// Array element type name for image-like HDUs
    pub fn pixel_format(&self) -> &'static str {
        match self.bitpix {
            8 => "uint8",
            16 => "int16",
            32 => "int32",
            64 => "int64",
            -32 => "float32",
            -64 => "float64",
            _ => "unknown",
        }
    }
}
