//! Read-only access to FITS files
//!
//! HDU enumeration and header values come from the `fitsrs` reader. On top of
//! it this module keeps the byte offsets of every data block, so that table
//! records can be decoded one at a time straight from the mapped file.
//!
//! # Overview
//!
//! A FITS file is a sequence of Header-Data-Units. Each header is a run of
//! 80-byte cards ending with `END`; headers and data blocks are padded to
//! 2880-byte blocks. [`FitsFile::open`] memory-maps the file (or reads it into
//! memory when mapping is disabled or the file is gzip-compressed), walks the
//! HDUs once, and keeps only offsets into the data.
//!
//! # Main Components
//!
//! - `header`: the ordered [`Header`] and typed lookups
//! - `hdu`: HDU kinds and data-block layout
//! - `table`: column formats and cell decoding

pub mod hdu;
pub mod header;
pub mod table;

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use fitsrs::card::Value as CardValue;
use fitsrs::fits::Fits;
use fitsrs::hdu::HDU;
use flate2::read::GzDecoder;
use memmap2::Mmap;

use self::header::Record;

pub use self::hdu::{Hdu, HduKind};
pub use self::header::{Card, Header, HeaderValue};
pub use self::table::{ColumnDescriptor, ColumnFormat, TableLayout, Value};

use crate::{io_err, FitscanError, Result};

/// Size of a FITS logical record (bytes)
pub const BLOCK_SIZE: usize = 2880;
/// Size of a header card (bytes)
pub const CARD_SIZE: usize = 80;
/// Leading bytes of a gzip stream
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Options controlling how a FITS file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    memory_map: bool,
}

impl OpenOptions {
    /// Default options: memory-mapped access
    pub fn new() -> Self {
        Self { memory_map: true }
    }

    /// Enable or disable memory mapping
    ///
    /// Without a memory map the whole file is read into memory on open.
    pub fn memory_map(mut self, enabled: bool) -> Self {
        self.memory_map = enabled;
        self
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Backing bytes of an open file
enum Storage {
    Mapped(Mmap),
    Buffered(Vec<u8>),
}

impl Storage {
    fn bytes(&self) -> &[u8] {
        match self {
            Storage::Mapped(map) => &map[..],
            Storage::Buffered(buf) => buf.as_slice(),
        }
    }
}

/// An open FITS file
///
/// Owns the file contents for as long as it lives; the memory map and file
/// descriptor are released when it is dropped.
pub struct FitsFile {
    path: PathBuf,
    storage: Storage,
    hdus: Vec<Hdu>,
}

impl FitsFile {
    /// Open a FITS file with default options
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, OpenOptions::default())
    }

    /// Open a FITS file
    pub fn open_with<P: AsRef<Path>>(path: P, options: OpenOptions) -> Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let mut file = File::open(&path_buf).map_err(|e| io_err(&path_buf, e))?;
        let metadata = file.metadata().map_err(|e| io_err(&path_buf, e))?;
        if !metadata.is_file() {
            return Err(FitscanError::NotFoundError {
                path: path_buf,
                source: std::io::Error::new(std::io::ErrorKind::Other, "not a regular file"),
            });
        }
        if metadata.len() == 0 {
            return Err(FitscanError::FileFormatError("File is empty".to_string()));
        }

        let mut storage = if options.memory_map {
            // The map is read-only and lives no longer than this FitsFile
            match unsafe { Mmap::map(&file) } {
                Ok(map) => Storage::Mapped(map),
                Err(e) => {
                    log::warn!(
                        "Memory mapping {} failed: {}. Falling back to buffered read.",
                        path_buf.display(),
                        e
                    );
                    Storage::Buffered(read_all(&mut file, &path_buf)?)
                }
            }
        } else {
            Storage::Buffered(read_all(&mut file, &path_buf)?)
        };

        if storage.bytes().starts_with(&GZIP_MAGIC) {
            log::debug!("{} is gzip-compressed, decompressing", path_buf.display());
            let mut decoded = Vec::new();
            GzDecoder::new(storage.bytes())
                .read_to_end(&mut decoded)
                .map_err(|e| {
                    FitscanError::FileFormatError(format!("Corrupt gzip stream: {}", e))
                })?;
            storage = Storage::Buffered(decoded);
        }

        let hdus = scan_hdus(storage.bytes())?;
        log::debug!("Opened {} with {} HDUs", path_buf.display(), hdus.len());

        Ok(FitsFile {
            path: path_buf,
            storage,
            hdus,
        })
    }

    /// Path the file was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the contents are memory-mapped
    pub fn is_memory_mapped(&self) -> bool {
        matches!(self.storage, Storage::Mapped(_))
    }

    /// Number of HDUs
    pub fn len(&self) -> usize {
        self.hdus.len()
    }

    /// Whether the file has no HDUs (never true for a successfully opened file)
    pub fn is_empty(&self) -> bool {
        self.hdus.is_empty()
    }

    /// All HDUs in file order
    pub fn hdus(&self) -> &[Hdu] {
        &self.hdus
    }

    /// HDU at `index`
    pub fn hdu(&self, index: usize) -> Result<&Hdu> {
        self.hdus.get(index).ok_or(FitscanError::IndexError {
            index,
            count: self.hdus.len(),
        })
    }

    /// Unpadded data block of `hdu`
    pub fn data(&self, hdu: &Hdu) -> &[u8] {
        hdu.data_offset
            .checked_add(hdu.data_len)
            .and_then(|end| self.storage.bytes().get(hdu.data_offset..end))
            .unwrap_or_default()
    }

    /// Table layout of the HDU at `index`
    ///
    /// Fails with [`FitscanError::NotTabularError`] for HDUs without table data.
    pub fn table(&self, index: usize) -> Result<TableLayout> {
        TableLayout::from_hdu(self.hdu(index)?)
    }
}

fn read_all(file: &mut File, path: &Path) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).map_err(|e| io_err(path, e))?;
    Ok(buf)
}

/// Value of `$keyword` in a `fitsrs` header
macro_rules! card_value {
    ($header:expr, $keyword:expr) => {
        match $header.get($keyword) {
            Some(CardValue::Integer { value, .. }) => {
                i64::try_from(*value).ok().map(HeaderValue::Integer)
            }
            Some(CardValue::Float { value, .. }) => Some(HeaderValue::Real(f64::from(*value))),
            Some(_) => $header
                .get_parsed::<bool>($keyword)
                .and_then(|r| r.ok())
                .map(HeaderValue::Logical)
                .or_else(|| {
                    $header
                        .get_parsed::<String>($keyword)
                        .and_then(|r| r.ok())
                        .map(|s| HeaderValue::String(s.trim_end().to_string()))
                }),
            None => None,
        }
        .unwrap_or(HeaderValue::Undefined)
    };
}

/// Cards of one HDU: images from the file, values from `fitsrs`
macro_rules! header_from {
    ($header:expr, $records:expr) => {
        Header::from_cards($records.into_iter().map(|record: Record| {
            let value = if record.has_value {
                Some(card_value!($header, record.keyword.as_str()))
            } else {
                None
            };
            Card {
                keyword: record.keyword,
                value,
                image: record.image,
            }
        }))
    };
}

fn read_header(hdu: &HDU, records: Vec<Record>) -> Option<(HduKind, Header)> {
    #[allow(unreachable_patterns)]
    let read = match hdu {
        HDU::Primary(hdu) => (HduKind::Primary, header_from!(hdu.get_header(), records)),
        HDU::XImage(hdu) => (HduKind::Image, header_from!(hdu.get_header(), records)),
        HDU::XBinaryTable(hdu) => (HduKind::BinTable, header_from!(hdu.get_header(), records)),
        HDU::XASCIITable(hdu) => (HduKind::AsciiTable, header_from!(hdu.get_header(), records)),
        _ => return None,
    };
    Some(read)
}

fn format_error(message: String) -> FitscanError {
    FitscanError::FileFormatError(message)
}

/// Walk the file with `fitsrs` and record every HDU's header and data location
fn scan_hdus(bytes: &[u8]) -> Result<Vec<Hdu>> {
    if !bytes.starts_with(b"SIMPLE  =") {
        return Err(format_error(
            "Not a FITS file: first card is not SIMPLE".to_string(),
        ));
    }

    let mut fits = Fits::from_reader(Cursor::new(bytes));
    let mut hdus: Vec<Hdu> = Vec::new();
    let mut offset = 0;

    while offset < bytes.len() {
        let index = hdus.len();
        let rest = &bytes[offset..];
        if index > 0 && !rest.starts_with(b"XTENSION=") {
            if rest.iter().any(|&b| b != 0 && b != b' ') {
                log::warn!("Ignoring {} trailing bytes after HDU {}", rest.len(), index - 1);
            }
            break;
        }

        let parsed = match fits.next() {
            Some(Ok(parsed)) => parsed,
            Some(Err(e)) => return Err(format_error(format!("HDU {}: {}", index, e))),
            None => break,
        };
        let (records, header_len) = header::records(rest)?;
        let (kind, header) = read_header(&parsed, records)
            .ok_or_else(|| format_error(format!("Unsupported extension in HDU {}", index)))?;

        let data_offset = offset + header_len;
        let hdu = Hdu::new(index, header, kind, offset, data_offset)?;

        let data_end = data_offset.checked_add(hdu.data_len).ok_or_else(|| {
            format_error(format!(
                "HDU {} declares {} data bytes, past any file size",
                index, hdu.data_len
            ))
        })?;
        if data_end > bytes.len() {
            return Err(format_error(format!(
                "HDU {} data is truncated: needs {} bytes, file has {}",
                index,
                hdu.data_len,
                bytes.len() - data_offset
            )));
        }
        let next = hdu
            .padded_data_len()
            .and_then(|padded| data_offset.checked_add(padded))
            .ok_or_else(|| format_error(format!("Padded data of HDU {} overflows", index)))?;

        log::debug!(
            "HDU {} ({}) at {}: {} data bytes",
            index,
            hdu.kind,
            offset,
            hdu.data_len
        );
        offset = next.min(bytes.len());
        hdus.push(hdu);
    }

    if hdus.is_empty() {
        return Err(format_error("No HDU found".to_string()));
    }
    Ok(hdus)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(cards: &[&str]) -> Vec<u8> {
        let mut out = Vec::new();
        for c in cards.iter().chain(std::iter::once(&"END")) {
            let mut card = [b' '; CARD_SIZE];
            card[..c.len()].copy_from_slice(c.as_bytes());
            out.extend_from_slice(&card);
        }
        out.resize(out.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE, b' ');
        out
    }

    fn primary() -> Vec<u8> {
        block(&[
            "SIMPLE  =                    T",
            "BITPIX  =                    8",
            "NAXIS   =                    0",
            "EXTEND  =                    T",
        ])
    }

    #[test]
    fn test_scan_primary_and_image() {
        let mut bytes = primary();
        bytes.extend(block(&[
            "XTENSION= 'IMAGE   '",
            "BITPIX  =                   16",
            "NAXIS   =                    1",
            "NAXIS1  =                    3",
            "PCOUNT  =                    0",
            "GCOUNT  =                    1",
        ]));
        let mut data = vec![0u8; BLOCK_SIZE];
        data[..6].copy_from_slice(&[0, 1, 0, 2, 0, 3]);
        bytes.extend(data);

        let hdus = scan_hdus(&bytes).unwrap();
        assert_eq!(hdus.len(), 2);
        assert_eq!(hdus[0].kind, HduKind::Primary);
        assert_eq!(hdus[1].kind, HduKind::Image);
        assert_eq!(hdus[1].header_offset, BLOCK_SIZE);
        assert_eq!(hdus[1].data_offset, 2 * BLOCK_SIZE);
        assert_eq!(hdus[1].data_len, 6);
    }

    #[test]
    fn test_scan_ignores_trailing_garbage() {
        let mut bytes = primary();
        bytes.extend_from_slice(b"not another extension");
        let hdus = scan_hdus(&bytes).unwrap();
        assert_eq!(hdus.len(), 1);
    }

    #[test]
    fn test_scan_rejects_non_fits() {
        let bytes = b"PNG and other things".repeat(200);
        assert!(matches!(
            scan_hdus(&bytes),
            Err(FitscanError::FileFormatError(_))
        ));
    }

    #[test]
    fn test_scan_rejects_truncated_data() {
        let mut bytes = block(&[
            "SIMPLE  =                    T",
            "BITPIX  =                   -64",
            "NAXIS   =                    1",
            "NAXIS1  =                 1000",
        ]);
        bytes.extend(vec![0u8; 100]);
        assert!(matches!(
            scan_hdus(&bytes),
            Err(FitscanError::FileFormatError(_))
        ));
    }

    #[test]
    fn test_scan_rejects_data_past_address_space() {
        let mut bytes = primary();
        bytes.extend(block(&[
            "XTENSION= 'IMAGE   '",
            "BITPIX  =                   16",
            "NAXIS   =                    1",
            "NAXIS1  =  9223372036854775000",
            "PCOUNT  =                    0",
            "GCOUNT  =                    1",
        ]));
        match scan_hdus(&bytes) {
            Err(FitscanError::FileFormatError(message)) => assert!(message.contains("HDU 1")),
            other => panic!("Expected FileFormatError, got {:?}", other.map(|h| h.len())),
        }
    }

    #[test]
    fn test_scan_reads_values_through_reader() {
        let mut bytes = block(&[
            "SIMPLE  =                    T",
            "BITPIX  =                    8",
            "NAXIS   =                    0",
            "EXTEND  =                    T",
            "OBJECT  = 'M31     '           / target",
            "EQUINOX =               2000.0",
            "HISTORY reduced",
        ]);
        bytes.extend(block(&[
            "XTENSION= 'BINTABLE'",
            "BITPIX  =                    8",
            "NAXIS   =                    2",
            "NAXIS1  =                    4",
            "NAXIS2  =                    1",
            "PCOUNT  =                    0",
            "GCOUNT  =                    1",
            "TFIELDS =                    1",
            "TTYPE1  = 'ID      '",
            "TFORM1  = 'J       '",
        ]));
        let mut data = vec![0u8; BLOCK_SIZE];
        data[3] = 7;
        bytes.extend(data);

        let hdus = scan_hdus(&bytes).unwrap();
        let primary = &hdus[0].header;
        assert_eq!(primary.len(), 7);
        assert_eq!(primary.get_bool("EXTEND"), Some(true));
        assert_eq!(primary.get_str("OBJECT"), Some("M31"));
        assert_eq!(primary.get("EQUINOX"), Some(&HeaderValue::Real(2000.0)));
        assert!(primary.cards().last().is_some_and(Card::is_commentary));

        assert_eq!(hdus[1].kind, HduKind::BinTable);
        assert_eq!(hdus[1].header.get_str("TFORM1"), Some("J"));
        assert_eq!(hdus[1].data_len, 4);
    }

    #[test]
    fn test_options_builder() {
        assert!(OpenOptions::default() == OpenOptions::new().memory_map(true));
        assert!(OpenOptions::new().memory_map(false) != OpenOptions::new());
    }
}
