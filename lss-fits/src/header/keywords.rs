use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub name: String,
    pub value: Option<KeywordValue>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeywordValue {
    Logical(bool),
    Integer(i64),
    Real(f64),
    String(String),
}

impl Keyword {
    pub fn new(name: String) -> Self {
        Self {
            name,
            value: None,
            comment: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<KeywordValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_comment<S: Into<String>>(mut self, comment: S) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn logical<S: Into<String>>(name: S, value: bool) -> Self {
        Self {
            name: name.into(),
            value: Some(KeywordValue::Logical(value)),
            comment: None,
        }
    }

    pub fn integer<S: Into<String>>(name: S, value: i64) -> Self {
        Self {
            name: name.into(),
            value: Some(KeywordValue::Integer(value)),
            comment: None,
        }
    }

    pub fn real<S: Into<String>>(name: S, value: f64) -> Self {
        Self {
            name: name.into(),
            value: Some(KeywordValue::Real(value)),
            comment: None,
        }
    }

    pub fn string<S: Into<String>, V: Into<String>>(name: S, value: V) -> Self {
        Self {
            name: name.into(),
            value: Some(KeywordValue::String(value.into())),
            comment: None,
        }
    }

    /// Renders the keyword as one 80-byte header card.
    pub fn to_card(&self) -> [u8; 80] {
        let mut text = format!("{:<8}", self.name);
        if let Some(value) = &self.value {
            text.push_str("= ");
            match value {
                KeywordValue::String(s) => {
                    let quoted = s.replace('\'', "''");
                    text.push_str(&format!("'{:<8}'", quoted));
                }
                other => text.push_str(&format!("{:>20}", other.to_card_value())),
            }
        }
        if let Some(comment) = &self.comment {
            text.push_str(if self.value.is_some() { " / " } else { " " });
            text.push_str(comment);
        }

        let mut card = [b' '; 80];
        let bytes = text.as_bytes();
        let len = bytes.len().min(80);
        card[..len].copy_from_slice(&bytes[..len]);
        card
    }
}

impl KeywordValue {
    pub fn as_logical(&self) -> Option<bool> {
        match self {
            Self::Logical(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    fn to_card_value(&self) -> String {
        match self {
            Self::Logical(b) => if *b { "T" } else { "F" }.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Real(r) => format!("{:E}", r),
            Self::String(s) => format!("'{}'", s),
        }
    }
}

impl fmt::Display for KeywordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logical(b) => write!(f, "{}", if *b { "T" } else { "F" }),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Real(r) => write!(f, "{}", r),
            Self::String(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<bool> for KeywordValue {
    fn from(value: bool) -> Self {
        Self::Logical(value)
    }
}

impl From<i64> for KeywordValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for KeywordValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<String> for KeywordValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for KeywordValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_text(keyword: &Keyword) -> String {
        String::from_utf8(keyword.to_card().to_vec()).unwrap()
    }

    #[test]
    fn test_integer_card_is_right_justified() {
        let text = card_text(&Keyword::integer("NAXIS2", 1200));
        assert_eq!(&text[..10], "NAXIS2  = ");
        assert_eq!(text[10..30].trim_start(), "1200");
        assert_eq!(text.len(), 80);
    }

    #[test]
    fn test_string_card_is_quoted_and_padded() {
        let text = card_text(&Keyword::string("TFORM1", "D"));
        assert!(text.starts_with("TFORM1  = 'D       '"));
    }

    #[test]
    fn test_string_card_escapes_quotes() {
        let text = card_text(&Keyword::string("OBJECT", "O'Neil"));
        assert!(text.contains("'O''Neil '"));
    }

    #[test]
    fn test_real_value_accessors() {
        assert_eq!(KeywordValue::Integer(3).as_real(), Some(3.0));
        assert_eq!(KeywordValue::Real(0.5).as_integer(), None);
        assert_eq!(KeywordValue::Logical(true).as_logical(), Some(true));
    }
}
