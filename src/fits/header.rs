//! FITS header cards
//!
//! Card values are read by `fitsrs`. This module keeps the ordered card list
//! of each HDU (including commentary cards, which the reader does not expose)
//! and typed lookups over it.

use std::fmt;

use serde::Serialize;

use super::{BLOCK_SIZE, CARD_SIZE};
use crate::{FitscanError, Result};

/// Keywords whose cards carry free text instead of a value
const COMMENTARY_KEYWORDS: &[&str] = &["COMMENT", "HISTORY", "CONTINUE", ""];

/// Value of a header card
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    /// Character string
    String(String),
    /// `T` or `F`
    Logical(bool),
    /// Integer number
    Integer(i64),
    /// Real floating-point number
    Real(f64),
    /// Value field left blank, or a value the reader could not interpret
    Undefined,
}

impl HeaderValue {
    /// String content, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content, if this is an integer value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            HeaderValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Logical content, if this is a logical value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HeaderValue::Logical(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric content as `f64` (integers are widened)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HeaderValue::Integer(n) => Some(*n as f64),
            HeaderValue::Real(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            HeaderValue::Logical(true) => write!(f, "T"),
            HeaderValue::Logical(false) => write!(f, "F"),
            HeaderValue::Integer(n) => write!(f, "{}", n),
            HeaderValue::Real(x) => write!(f, "{:?}", x),
            HeaderValue::Undefined => Ok(()),
        }
    }
}

/// One header card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    /// Keyword (blank-trimmed, may be empty for blank cards)
    pub keyword: String,
    /// Value, absent for commentary cards
    pub value: Option<HeaderValue>,
    /// Card image as stored in the file, trailing blanks removed
    #[serde(skip)]
    pub image: String,
}

impl Card {
    /// Value card with a freshly formatted image
    pub fn new(keyword: &str, value: HeaderValue) -> Card {
        let image = format!("{:<8}= {:>20}", keyword, value.to_string());
        Card {
            keyword: keyword.to_string(),
            value: Some(value),
            image: image.trim_end().to_string(),
        }
    }

    /// Whether this is a COMMENT, HISTORY, CONTINUE or blank-keyword card
    pub fn is_commentary(&self) -> bool {
        self.value.is_none()
    }
}

/// A card image located in the file, before its value is looked up
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Record {
    pub keyword: String,
    pub image: String,
    pub has_value: bool,
}

/// Locate the card images of the header at the start of `bytes`
///
/// Returns the images before `END` and the header length including block
/// padding.
pub(crate) fn records(bytes: &[u8]) -> Result<(Vec<Record>, usize)> {
    let mut records = Vec::new();
    for (i, image) in bytes.chunks_exact(CARD_SIZE).enumerate() {
        if &image[..8] == b"END     " {
            let len = ((i + 1) * CARD_SIZE).div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
            if len > bytes.len() {
                return Err(FitscanError::FileFormatError(
                    "Header block is truncated".to_string(),
                ));
            }
            return Ok((records, len));
        }
        let keyword = String::from_utf8_lossy(&image[..8]).trim_end().to_string();
        let has_value = &image[8..10] == b"= " && !COMMENTARY_KEYWORDS.contains(&keyword.as_str());
        records.push(Record {
            keyword,
            image: String::from_utf8_lossy(image).trim_end().to_string(),
            has_value,
        });
    }
    Err(FitscanError::FileFormatError(
        "Header is missing its END card".to_string(),
    ))
}

/// Ordered header of one HDU
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Header {
    cards: Vec<Card>,
}

impl Header {
    /// Build a header from cards in file order
    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        Header {
            cards: cards.into_iter().collect(),
        }
    }

    /// Number of cards
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the header has no cards
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate the cards in file order
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    /// Iterate `(keyword, value)` pairs of value-bearing cards in file order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.cards
            .iter()
            .filter_map(|card| card.value.as_ref().map(|v| (card.keyword.as_str(), v)))
    }

    /// First value recorded under `keyword`
    pub fn get(&self, keyword: &str) -> Option<&HeaderValue> {
        self.cards
            .iter()
            .find(|card| card.keyword == keyword && card.value.is_some())
            .and_then(|card| card.value.as_ref())
    }

    /// String value of `keyword`
    pub fn get_str(&self, keyword: &str) -> Option<&str> {
        self.get(keyword).and_then(HeaderValue::as_str)
    }

    /// Integer value of `keyword`
    pub fn get_int(&self, keyword: &str) -> Option<i64> {
        self.get(keyword).and_then(HeaderValue::as_int)
    }

    /// Logical value of `keyword`
    pub fn get_bool(&self, keyword: &str) -> Option<bool> {
        self.get(keyword).and_then(HeaderValue::as_bool)
    }

    /// Integer value of a mandatory keyword
    pub fn required_int(&self, keyword: &str) -> Result<i64> {
        match self.get(keyword) {
            Some(HeaderValue::Integer(n)) => Ok(*n),
            Some(other) => Err(FitscanError::FileFormatError(format!(
                "{} is not an integer: {:?}",
                keyword, other
            ))),
            None => Err(FitscanError::FileFormatError(format!(
                "Missing required keyword {}",
                keyword
            ))),
        }
    }

    /// String value of a mandatory keyword
    pub fn required_str(&self, keyword: &str) -> Result<&str> {
        match self.get(keyword) {
            Some(HeaderValue::String(s)) => Ok(s),
            Some(other) => Err(FitscanError::FileFormatError(format!(
                "{} is not a string: {:?}",
                keyword, other
            ))),
            None => Err(FitscanError::FileFormatError(format!(
                "Missing required keyword {}",
                keyword
            ))),
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for card in &self.cards {
            writeln!(f, "{}", card.image)?;
        }
        write!(f, "END")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(cards: &[&str]) -> Vec<u8> {
        let mut block = vec![b' '; BLOCK_SIZE];
        for (i, c) in cards.iter().enumerate() {
            block[i * CARD_SIZE..i * CARD_SIZE + c.len()].copy_from_slice(c.as_bytes());
        }
        block
    }

    #[test]
    fn test_records_stop_at_end() {
        let bytes = block(&[
            "SIMPLE  =                    T",
            "COMMENT   free text = with an equals sign",
            "LONGSTR = 'long &'",
            "CONTINUE  'value'",
            "END",
            "IGNORED =                    1",
        ]);
        let (records, len) = records(&bytes).unwrap();
        assert_eq!(len, BLOCK_SIZE);
        let keywords: Vec<_> = records.iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(keywords, ["SIMPLE", "COMMENT", "LONGSTR", "CONTINUE"]);
        let valued: Vec<_> = records.iter().map(|r| r.has_value).collect();
        assert_eq!(valued, [true, false, true, false]);
        assert_eq!(records[2].image, "LONGSTR = 'long &'");
    }

    #[test]
    fn test_missing_end_card() {
        // Blank cards only: runs off the end without finding END
        assert!(matches!(
            records(&block(&[])),
            Err(FitscanError::FileFormatError(_))
        ));
        let mut short = block(&["SIMPLE  =                    T", "END"]);
        short.truncate(2 * CARD_SIZE);
        assert!(matches!(
            records(&short),
            Err(FitscanError::FileFormatError(_))
        ));
    }

    #[test]
    fn test_lookup_and_display() {
        let header = Header::from_cards(vec![
            Card::new("SIMPLE", HeaderValue::Logical(true)),
            Card::new("NAXIS", HeaderValue::Integer(0)),
            Card::new("OBJECT", HeaderValue::String("first".into())),
            Card::new("OBJECT", HeaderValue::String("second".into())),
            Card {
                keyword: "HISTORY".into(),
                value: None,
                image: "HISTORY reduced".into(),
            },
        ]);
        assert_eq!(header.len(), 5);
        assert_eq!(header.get_bool("SIMPLE"), Some(true));
        assert_eq!(header.required_int("NAXIS").unwrap(), 0);
        // Duplicates are kept in order, lookups return the first
        assert_eq!(header.get_str("OBJECT"), Some("first"));
        assert_eq!(header.entries().filter(|(k, _)| *k == "OBJECT").count(), 2);
        assert!(header.required_int("NAXIS1").is_err());
        assert!(header.required_str("NAXIS").is_err());
        assert!(header.cards().last().is_some_and(Card::is_commentary));

        let text = header.to_string();
        assert!(text.starts_with("SIMPLE  =                    T\n"));
        assert!(text.contains("OBJECT  =              'first'"));
        assert!(text.ends_with("HISTORY reduced\nEND"));
    }
}
