mod column_ops;
mod format_parsing;

pub use format_parsing::TForm;


use super::ColumnInfo;
use crate::errors::{FitsError, Result};
use crate::header::Header;
use crate::io::reader::HduInfo;
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug)]
pub struct BinaryTableHdu {
    header: Header,
    info: HduInfo,
    column_name_index: OnceLock<HashMap<String, usize>>,
}

impl BinaryTableHdu {
    pub fn new(header: Header, info: HduInfo) -> Self {
        Self {
            header,
            info,
            column_name_index: OnceLock::new(),
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn info(&self) -> &HduInfo {
        &self.info
    }

    pub fn number_of_rows(&self) -> usize {
        self.header.get_integer("NAXIS2").unwrap_or(0).max(0) as usize
    }

    /// Bytes per row (`NAXIS1`).
    pub fn row_size(&self) -> Result<usize> {
        let naxis1 = self.header.required_integer("NAXIS1")?;
        usize::try_from(naxis1).map_err(|_| FitsError::InvalidKeywordValue {
            keyword: "NAXIS1".to_string(),
            value: naxis1.to_string(),
        })
    }

    pub fn column_count(&self) -> Result<usize> {
        self.header
            .required_integer("TFIELDS")
            .map(|n| n.max(0) as usize)
    }

    pub fn column_info(&self, column: usize) -> Result<ColumnInfo> {
        let column_count = self.column_count()?;
        if column >= column_count {
            return Err(FitsError::InvalidFormat(format!(
                "Column index {} out of range (0..{})",
                column, column_count
            )));
        }

        let n = column + 1;
        let format_key = format!("TFORM{}", n);
        let format = self
            .header
            .get_string(&format_key)
            .ok_or(FitsError::KeywordNotFound {
                keyword: format_key,
            })?;

        let mut info = ColumnInfo::new(column, format.to_string());
        if let Some(name) = self.header.get_string(&format!("TTYPE{}", n)) {
            info = info.with_name(name.trim().to_string());
        }
        if let Some(unit) = self.header.get_string(&format!("TUNIT{}", n)) {
            info = info.with_unit(unit.to_string());
        }
        if let Some(null) = self.header.get_integer(&format!("TNULL{}", n)) {
            info = info.with_null_value(null);
        }
        if let Some(scale) = self
            .header
            .get_keyword_value(&format!("TSCAL{}", n))
            .and_then(|v| v.as_real())
        {
            info = info.with_scale(scale);
        }
        if let Some(zero) = self
            .header
            .get_keyword_value(&format!("TZERO{}", n))
            .and_then(|v| v.as_real())
        {
            info = info.with_zero_offset(zero);
        }
        Ok(info)
    }

    pub fn all_column_info(&self) -> Result<Vec<ColumnInfo>> {
        (0..self.column_count()?)
            .map(|i| self.column_info(i))
            .collect()
    }

    pub fn column_names(&self) -> Result<Vec<String>> {
        Ok(self
            .all_column_info()?
            .iter()
            .map(ColumnInfo::display_name)
            .collect())
    }

    fn build_column_index(&self) -> Result<HashMap<String, usize>> {
        let mut index = HashMap::new();
        for info in self.all_column_info()? {
            index.entry(info.display_name()).or_insert(info.index);
        }
        Ok(index)
    }

    /// Index of the column called `name`. A malformed column header is
    /// reported on every call rather than cached.
    pub fn column_by_name(&self, name: &str) -> Result<usize> {
        let index = match self.column_name_index.get() {
            Some(index) => index,
            None => {
                let built = self.build_column_index()?;
                self.column_name_index.get_or_init(|| built)
            }
        };

        index
            .get(name)
            .copied()
            .ok_or_else(|| FitsError::InvalidFormat(format!("Column '{}' not found", name)))
    }
}
