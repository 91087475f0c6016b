use crate::errors::{FitsError, Result};
use crate::header::{Keyword, KeywordValue};
use std::collections::HashMap;
use std::str;

pub const CARD_SIZE: usize = 80;
pub const HEADER_BLOCK_SIZE: usize = 2880;

#[derive(Debug, Clone, Default)]
pub struct Header {
    keywords: Vec<Keyword>,
    keyword_index: HashMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct HeaderCard {
    pub keyword: String,
    pub value: Option<String>,
    pub comment: Option<String>,
}

pub struct HeaderParser;

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_keyword(&mut self, keyword: Keyword) {
        let index = self.keywords.len();
        self.keyword_index.insert(keyword.name.clone(), index);
        self.keywords.push(keyword);
    }

    pub fn get_keyword(&self, name: &str) -> Option<&Keyword> {
        self.keyword_index
            .get(name)
            .and_then(|&index| self.keywords.get(index))
    }

    pub fn get_keyword_value(&self, name: &str) -> Option<&KeywordValue> {
        self.get_keyword(name)?.value.as_ref()
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        self.get_keyword_value(name).and_then(|v| v.as_integer())
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.get_keyword_value(name).and_then(|v| v.as_string())
    }

    /// Integer keyword that must be present.
    pub fn required_integer(&self, name: &str) -> Result<i64> {
        self.get_integer(name)
            .ok_or_else(|| FitsError::KeywordNotFound {
                keyword: name.to_string(),
            })
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn is_primary(&self) -> bool {
        self.get_keyword("SIMPLE")
            .and_then(|k| k.value.as_ref())
            .and_then(|v| v.as_logical())
            .unwrap_or(false)
    }

    pub fn is_extension(&self) -> bool {
        self.get_keyword("XTENSION").is_some()
    }

    /// Serializes the header into whole 2880-byte blocks, `END` included.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_BLOCK_SIZE);
        for keyword in &self.keywords {
            bytes.extend_from_slice(&keyword.to_card());
        }
        let mut end = [b' '; CARD_SIZE];
        end[..3].copy_from_slice(b"END");
        bytes.extend_from_slice(&end);

        let padded = bytes.len().div_ceil(HEADER_BLOCK_SIZE) * HEADER_BLOCK_SIZE;
        bytes.resize(padded, b' ');
        bytes
    }
}

impl HeaderCard {
    pub fn parse(data: &[u8; CARD_SIZE]) -> Result<Self> {
        if !data.is_ascii() {
            return Err(FitsError::HeaderParse(
                "Header card contains non-ASCII bytes".to_string(),
            ));
        }
        let card_str = str::from_utf8(data)
            .map_err(|_| FitsError::InvalidFormat("Invalid UTF-8 in header card".to_string()))?;

        let mut card = HeaderCard {
            keyword: card_str[0..8].trim().to_string(),
            value: None,
            comment: None,
        };

        if &card_str[8..10] == "= " {
            Self::parse_keyword_value_pair(&card_str[10..], &mut card);
        } else {
            let comment_part = card_str[8..].trim();
            if !comment_part.is_empty() {
                card.comment = Some(comment_part.to_string());
            }
        }

        Ok(card)
    }

    fn parse_keyword_value_pair(value_comment_part: &str, card: &mut HeaderCard) {
        let trimmed = value_comment_part.trim_start();

        let (value_part, rest) = if trimmed.starts_with('\'') {
            Self::split_quoted(trimmed)
        } else {
            match trimmed.find('/') {
                Some(pos) => (trimmed[..pos].trim(), &trimmed[pos..]),
                None => (trimmed.trim(), ""),
            }
        };

        if !value_part.is_empty() {
            card.value = Some(value_part.to_string());
        }

        let comment_part = rest.trim_start().trim_start_matches('/').trim();
        if !comment_part.is_empty() {
            card.comment = Some(comment_part.to_string());
        }
    }

    /// Splits a quoted string value from its trailing comment. Doubled quotes
    /// inside the string do not terminate it.
    fn split_quoted(text: &str) -> (&str, &str) {
        let bytes = text.as_bytes();
        let mut i = 1;
        while i < bytes.len() {
            if bytes[i] == b'\'' {
                if i + 1 < bytes.len() && bytes[i + 1] == b'\'' {
                    i += 2;
                    continue;
                }
                return (&text[..=i], &text[i + 1..]);
            }
            i += 1;
        }
        (text.trim_end(), "")
    }

    pub fn to_keyword(&self) -> Result<Keyword> {
        let mut keyword = Keyword::new(self.keyword.clone());

        if let Some(comment) = &self.comment {
            keyword = keyword.with_comment(comment.clone());
        }

        if let Some(value_str) = &self.value {
            keyword = keyword.with_value(Self::parse_value(value_str));
        }

        Ok(keyword)
    }

    fn parse_value(value_str: &str) -> KeywordValue {
        let trimmed = value_str.trim();

        if trimmed == "T" {
            return KeywordValue::Logical(true);
        }
        if trimmed == "F" {
            return KeywordValue::Logical(false);
        }

        if trimmed.starts_with('\'') && trimmed.ends_with('\'') && trimmed.len() >= 2 {
            let string_content = trimmed[1..trimmed.len() - 1].replace("''", "'");
            return KeywordValue::String(string_content.trim_end().to_string());
        }

        if let Ok(int_val) = trimmed.parse::<i64>() {
            return KeywordValue::Integer(int_val);
        }

        // Fortran-style exponents ("1.0D+02") appear in older catalogs.
        if let Ok(float_val) = trimmed.replace(['D', 'd'], "E").parse::<f64>() {
            return KeywordValue::Real(float_val);
        }

        KeywordValue::String(trimmed.to_string())
    }
}

impl HeaderParser {
    pub fn parse_header(data: &[u8]) -> Result<Header> {
        if !data.len().is_multiple_of(HEADER_BLOCK_SIZE) {
            return Err(FitsError::InvalidFormat(
                "Header size must be multiple of 2880 bytes".to_string(),
            ));
        }

        let mut header = Header::new();
        let mut found_end = false;

        for chunk in data.chunks_exact(CARD_SIZE) {
            let mut card_data = [0u8; CARD_SIZE];
            card_data.copy_from_slice(chunk);

            let card = HeaderCard::parse(&card_data)?;

            if card.keyword == "END" {
                found_end = true;
                break;
            }
            if card.keyword.is_empty() {
                continue;
            }

            header.add_keyword(card.to_keyword()?);
        }

        if !found_end {
            return Err(FitsError::InvalidFormat("Missing END keyword".to_string()));
        }

        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(text: &str) -> [u8; CARD_SIZE] {
        let mut card = [b' '; CARD_SIZE];
        card[..text.len()].copy_from_slice(text.as_bytes());
        card
    }

    #[test]
    fn test_header_card_parse_keyword() {
        let parsed =
            HeaderCard::parse(&card("SIMPLE  =                    T / Standard FITS format"))
                .unwrap();
        assert_eq!(parsed.keyword, "SIMPLE");
        assert_eq!(parsed.value.as_deref(), Some("T"));
        assert_eq!(parsed.comment.as_deref(), Some("Standard FITS format"));
    }

    #[test]
    fn test_header_card_parse_string_with_slash() {
        let parsed = HeaderCard::parse(&card("TUNIT3  = 'erg / s'          / flux unit")).unwrap();
        let keyword = parsed.to_keyword().unwrap();
        assert_eq!(keyword.value, Some(KeywordValue::String("erg / s".to_string())));
        assert_eq!(keyword.comment.as_deref(), Some("flux unit"));
    }

    #[test]
    fn test_header_card_parse_fortran_exponent() {
        let parsed = HeaderCard::parse(&card("TSCAL1  =              1.0D-02")).unwrap();
        let keyword = parsed.to_keyword().unwrap();
        assert_eq!(keyword.value, Some(KeywordValue::Real(0.01)));
    }

    #[test]
    fn test_header_round_trips_through_bytes() {
        let mut header = Header::new();
        header.add_keyword(Keyword::string("XTENSION", "BINTABLE"));
        header.add_keyword(Keyword::integer("NAXIS2", 42));
        header.add_keyword(Keyword::string("TTYPE1", "RAJ2000"));

        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), HEADER_BLOCK_SIZE);

        let parsed = HeaderParser::parse_header(&bytes).unwrap();
        assert!(parsed.is_extension());
        assert_eq!(parsed.get_integer("NAXIS2"), Some(42));
        assert_eq!(parsed.get_string("TTYPE1"), Some("RAJ2000"));
    }

    #[test]
    fn test_parse_header_requires_end() {
        let data = vec![b' '; HEADER_BLOCK_SIZE];
        let err = HeaderParser::parse_header(&data).unwrap_err();
        assert!(err.to_string().contains("Missing END"));
    }

    #[test]
    fn test_parse_header_rejects_partial_block() {
        let data = vec![b' '; 100];
        assert!(HeaderParser::parse_header(&data).is_err());
    }

    #[test]
    fn test_required_integer_reports_keyword() {
        let header = Header::new();
        let err = header.required_integer("TFIELDS").unwrap_err();
        assert!(matches!(err, FitsError::KeywordNotFound { .. }));
    }
}
