//! Synthetic FITS files for integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub const BLOCK: usize = 2880;

/// Format a value card
pub fn card(keyword: &str, value: &str) -> String {
    format!("{:<8}= {:>20}", keyword, value)
}

/// Format a string-valued card
pub fn str_card(keyword: &str, value: &str) -> String {
    card(keyword, &format!("'{:<8}'", value))
}

/// Header cards followed by END, padded with blanks to whole blocks
pub fn header_block(cards: &[String]) -> Vec<u8> {
    let mut out = Vec::new();
    for c in cards.iter().map(String::as_str).chain(std::iter::once("END")) {
        let mut image = [b' '; 80];
        image[..c.len()].copy_from_slice(c.as_bytes());
        out.extend_from_slice(&image);
    }
    out.resize(out.len().div_ceil(BLOCK) * BLOCK, b' ');
    out
}

/// Data bytes padded with zeros to whole blocks
pub fn data_block(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    out.resize(out.len().div_ceil(BLOCK) * BLOCK, 0);
    out
}

/// Primary HDU without data
pub fn primary_hdu() -> Vec<u8> {
    header_block(&[
        card("SIMPLE", "T"),
        card("BITPIX", "8"),
        card("NAXIS", "0"),
        card("EXTEND", "T"),
    ])
}

/// Column definition for `bintable_hdu`: (name, tform, unit, width in bytes)
pub struct Column<'a> {
    pub name: &'a str,
    pub tform: &'a str,
    pub unit: Option<&'a str>,
    pub width: usize,
}

/// Binary table HDU from pre-encoded rows and an optional heap
pub fn bintable_hdu(extname: &str, columns: &[Column], rows: &[Vec<u8>], heap: &[u8]) -> Vec<u8> {
    let row_len: usize = columns.iter().map(|c| c.width).sum();
    let mut cards = vec![
        str_card("XTENSION", "BINTABLE"),
        card("BITPIX", "8"),
        card("NAXIS", "2"),
        card("NAXIS1", &row_len.to_string()),
        card("NAXIS2", &rows.len().to_string()),
        card("PCOUNT", &heap.len().to_string()),
        card("GCOUNT", "1"),
        card("TFIELDS", &columns.len().to_string()),
    ];
    for (i, column) in columns.iter().enumerate() {
        let n = i + 1;
        cards.push(str_card(&format!("TTYPE{}", n), column.name));
        cards.push(str_card(&format!("TFORM{}", n), column.tform));
        if let Some(unit) = column.unit {
            cards.push(str_card(&format!("TUNIT{}", n), unit));
        }
    }
    cards.push(str_card("EXTNAME", extname));

    let mut data = Vec::new();
    for row in rows {
        assert_eq!(row.len(), row_len, "row does not match column widths");
        data.extend_from_slice(row);
    }
    data.extend_from_slice(heap);

    let mut out = header_block(&cards);
    out.extend(data_block(&data));
    out
}

/// Two-column float table `RA`/`DEC` (format `E`, unit `deg`)
pub fn ra_dec_table(ra: &[f32], dec: &[f32]) -> Vec<u8> {
    let columns = [
        Column { name: "RA", tform: "E", unit: Some("deg"), width: 4 },
        Column { name: "DEC", tform: "E", unit: Some("deg"), width: 4 },
    ];
    let rows: Vec<Vec<u8>> = ra
        .iter()
        .zip(dec)
        .map(|(r, d)| {
            let mut row = r.to_be_bytes().to_vec();
            row.extend_from_slice(&d.to_be_bytes());
            row
        })
        .collect();

    let mut out = primary_hdu();
    out.extend(bintable_hdu("CATALOG", &columns, &rows, &[]));
    out
}

/// Write `bytes` to `name` inside `dir`
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("failed to write test FITS file");
    path
}
