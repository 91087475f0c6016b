use crate::errors::{FitsError, Result};

/// Parsed `TFORMn` value: repeat count and type code (`rT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TForm {
    pub repeat: usize,
    pub code: char,
    /// Element type of a variable-length (`P`/`Q`) descriptor.
    pub heap_type: Option<char>,
}

impl TForm {
    pub fn parse(format: &str) -> Result<Self> {
        let format = format.trim();
        if format.is_empty() {
            return Err(FitsError::InvalidFormat("Empty column format".to_string()));
        }

        let digits_end = format
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| {
                FitsError::InvalidFormat(format!(
                    "Invalid FITS format '{}' - missing data type",
                    format
                ))
            })?;

        let repeat = if digits_end == 0 {
            1
        } else {
            format[..digits_end].parse().map_err(|_| {
                FitsError::InvalidFormat(format!("Invalid repeat count in format '{}'", format))
            })?
        };

        let mut rest = format[digits_end..].chars();
        let code = rest.next().unwrap_or('X').to_ascii_uppercase();
        let heap_type = match code {
            'P' | 'Q' => Some(rest.next().ok_or_else(|| {
                FitsError::InvalidFormat(format!("Missing data type in format '{}'", format))
            })?),
            _ => None,
        };

        if element_size(code).is_none() {
            return Err(FitsError::InvalidFormat(format!(
                "Unknown binary table format: {}",
                format
            )));
        }

        Ok(Self {
            repeat,
            code,
            heap_type,
        })
    }

    /// Bytes this field occupies in every row.
    pub fn byte_width(&self) -> usize {
        match self.code {
            'X' => self.repeat.div_ceil(8),
            code => self.repeat * element_size(code).unwrap_or(0),
        }
    }

    /// Bytes of a single element of this type.
    pub fn element_size(&self) -> usize {
        element_size(self.code).unwrap_or(0)
    }
}

fn element_size(code: char) -> Option<usize> {
    match code {
        'L' | 'X' | 'B' | 'A' => Some(1),
        'I' => Some(2),
        'J' | 'E' => Some(4),
        'K' | 'D' | 'C' | 'P' => Some(8),
        'M' | 'Q' => Some(16),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_scalar_formats() {
        assert_eq!(
            TForm::parse("D").unwrap(),
            TForm {
                repeat: 1,
                code: 'D',
                heap_type: None
            }
        );
        assert_eq!(TForm::parse("1E").unwrap().byte_width(), 4);
        assert_eq!(TForm::parse("K").unwrap().byte_width(), 8);
    }

    #[test]
    fn test_parses_character_width() {
        let tform = TForm::parse("20A").unwrap();
        assert_eq!(tform.repeat, 20);
        assert_eq!(tform.byte_width(), 20);
    }

    #[test]
    fn test_parses_bits_and_descriptors() {
        assert_eq!(TForm::parse("12X").unwrap().byte_width(), 2);
        let descriptor = TForm::parse("1PE(12)").unwrap();
        assert_eq!(descriptor.code, 'P');
        assert_eq!(descriptor.heap_type, Some('E'));
        assert_eq!(descriptor.byte_width(), 8);
    }

    #[test]
    fn test_zero_repeat_has_no_width() {
        assert_eq!(TForm::parse("0A").unwrap().byte_width(), 0);
    }

    #[test]
    fn test_rejects_bad_formats() {
        assert!(TForm::parse("").is_err());
        assert!(TForm::parse("12").is_err());
        assert!(TForm::parse("3Z").is_err());
        assert!(TForm::parse("1P").is_err());
    }
}
