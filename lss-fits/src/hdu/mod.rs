pub mod binary_table;

pub use binary_table::{BinaryTableHdu, TForm};

use crate::header::Header;
use crate::io::reader::HduInfo;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub index: usize,
    pub name: Option<String>,
    pub format: String,
    pub unit: Option<String>,
    pub null_value: Option<i64>,
    pub scale: Option<f64>,
    pub zero_offset: Option<f64>,
}

impl ColumnInfo {
    pub fn new(index: usize, format: String) -> Self {
        Self {
            index,
            name: None,
            format,
            unit: None,
            null_value: None,
            scale: None,
            zero_offset: None,
        }
    }

    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_unit(mut self, unit: String) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_null_value(mut self, null_value: i64) -> Self {
        self.null_value = Some(null_value);
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_zero_offset(mut self, zero: f64) -> Self {
        self.zero_offset = Some(zero);
        self
    }

    /// Column name, or `COL<n>` (1-based) for unnamed columns.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("COL{}", self.index + 1))
    }

    /// True when `TSCAL`/`TZERO` change the stored values.
    pub fn needs_scaling(&self) -> bool {
        self.scale.unwrap_or(1.0) != 1.0 || self.zero_offset.unwrap_or(0.0) != 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HduType {
    Primary,
    Image,
    AsciiTable,
    BinaryTable,
}

#[derive(Debug)]
pub enum Hdu {
    Primary { header: Header, info: HduInfo },
    BinaryTable(BinaryTableHdu),
    Other {
        hdu_type: HduType,
        header: Header,
        info: HduInfo,
    },
}

impl Hdu {
    pub(crate) fn from_extension(header: Header, info: HduInfo) -> Self {
        match header.get_string("XTENSION").unwrap_or("") {
            "BINTABLE" => Hdu::BinaryTable(BinaryTableHdu::new(header, info)),
            "TABLE" => Hdu::Other {
                hdu_type: HduType::AsciiTable,
                header,
                info,
            },
            _ => Hdu::Other {
                hdu_type: HduType::Image,
                header,
                info,
            },
        }
    }

    pub fn hdu_type(&self) -> HduType {
        match self {
            Hdu::Primary { .. } => HduType::Primary,
            Hdu::BinaryTable(_) => HduType::BinaryTable,
            Hdu::Other { hdu_type, .. } => *hdu_type,
        }
    }

    pub fn header(&self) -> &Header {
        match self {
            Hdu::Primary { header, .. } | Hdu::Other { header, .. } => header,
            Hdu::BinaryTable(table) => table.header(),
        }
    }
}
