//! Loading catalog tables from FITS files.

use crate::errors::{CatalogError, Result};
use crate::table::{Column, Table};
use lss_fits::{ColumnData, FitsFile};
use std::path::Path;
use tracing::{debug, info};

/// Identifier and class columns stored as fixed-width byte strings.
pub const TEXT_COLUMNS: [&str; 5] = ["ID", "ID_1", "CLASS", "CLASS_PHOTO", "id1"];

/// Image flag column used downstream as an integer bit mask.
pub const FLAG_COLUMN: &str = "IMAFLAGS_ISO";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadOptions {
    /// Columns to keep, in order. `None` or an empty list keeps every column.
    pub columns: Option<Vec<String>>,
    /// Keep only the first `limit` rows. `None` or zero reads every row.
    pub limit: Option<usize>,
}

impl ReadOptions {
    pub fn with_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Reads the first binary table of the FITS file at `path`.
///
/// Rows are truncated to `options.limit`, then columns projected onto
/// `options.columns`. Byte-string identifier columns ([`TEXT_COLUMNS`]) are
/// decoded and stripped, and [`FLAG_COLUMN`] is coerced to integers.
pub fn read_fits_table<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<Table> {
    let path = path.as_ref();
    let mut fits = FitsFile::open(path)?;
    let hdu = fits.first_binary_table()?;
    let names = hdu.column_names()?;

    let indices: Vec<usize> = match &options.columns {
        Some(wanted) if !wanted.is_empty() => wanted
            .iter()
            .map(|name| {
                names
                    .iter()
                    .position(|n| n == name)
                    .ok_or_else(|| CatalogError::MissingColumn(name.clone()))
            })
            .collect::<Result<_>>()?,
        _ => (0..names.len()).collect(),
    };

    let limit = options.limit.filter(|&n| n > 0);
    let data = hdu.read_columns(fits.reader(), &indices, limit)?;

    let columns = indices
        .iter()
        .zip(data)
        .map(|(&index, data)| normalize_column(&names[index], data))
        .collect::<Result<Vec<_>>>()?;
    let table = Table::new(columns)?;

    info!(
        "read {} rows and {} columns from {}",
        table.num_rows(),
        table.num_columns(),
        path.display()
    );
    Ok(table)
}

fn normalize_column(name: &str, data: ColumnData) -> Result<Column> {
    if data.is_multidimensional() {
        return Err(CatalogError::MultidimensionalColumn(name.to_string()));
    }

    let data = match data {
        ColumnData::Bytes(rows) if TEXT_COLUMNS.contains(&name) => {
            debug!("decoding byte column {}", name);
            ColumnData::Text(decode_text(name, rows)?)
        }
        data if name == FLAG_COLUMN => ColumnData::Int(coerce_to_int(name, data)?),
        data => data,
    };
    Ok(Column::new(name, data))
}

fn decode_text(name: &str, rows: Vec<Vec<u8>>) -> Result<Vec<String>> {
    rows.into_iter()
        .enumerate()
        .map(|(row, bytes)| {
            String::from_utf8(bytes)
                .map(|text| text.trim().to_string())
                .map_err(|_| CatalogError::InvalidUtf8 {
                    column: name.to_string(),
                    row,
                })
        })
        .collect()
}

/// Integer view of a flag column. Floats are truncated towards zero; NaN
/// has no integer value and is rejected.
fn coerce_to_int(name: &str, data: ColumnData) -> Result<Vec<i64>> {
    let type_error = |actual: &str| CatalogError::ColumnType {
        column: name.to_string(),
        expected: "integer",
        actual: actual.to_string(),
    };

    match data {
        ColumnData::Int(values) => Ok(values),
        ColumnData::Bool(values) => Ok(values.into_iter().map(i64::from).collect()),
        ColumnData::Float(values) => values
            .into_iter()
            .map(|v| {
                if v.is_finite() {
                    Ok(v.trunc() as i64)
                } else {
                    Err(type_error("non-finite"))
                }
            })
            .collect(),
        other => Err(type_error(other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_columns_are_decoded_and_stripped() {
        let column = normalize_column(
            "CLASS",
            ColumnData::Bytes(vec![b"QSO   ".to_vec(), b"  STAR".to_vec()]),
        )
        .unwrap();
        assert_eq!(column.data, ColumnData::Text(vec!["QSO".into(), "STAR".into()]));
    }

    #[test]
    fn test_other_byte_columns_are_untouched() {
        let data = ColumnData::Bytes(vec![b"x ".to_vec()]);
        let column = normalize_column("TILE", data.clone()).unwrap();
        assert_eq!(column.data, data);
    }

    #[test]
    fn test_invalid_utf8_reports_row() {
        let err = normalize_column("ID", ColumnData::Bytes(vec![b"ok".to_vec(), vec![0xff, 0xfe]]))
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidUtf8 { row: 1, .. }));
    }

    #[test]
    fn test_flag_column_becomes_integer() {
        let column = normalize_column(FLAG_COLUMN, ColumnData::Float(vec![0.0, 3.0, 2.9])).unwrap();
        assert_eq!(column.data, ColumnData::Int(vec![0, 3, 2]));

        let err = normalize_column(FLAG_COLUMN, ColumnData::Float(vec![f64::NAN])).unwrap_err();
        assert!(matches!(err, CatalogError::ColumnType { .. }));
    }

    #[test]
    fn test_multidimensional_columns_are_rejected() {
        let err = normalize_column(
            "FLUX_APER",
            ColumnData::FloatArray {
                width: 2,
                values: vec![1.0, 2.0],
            },
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::MultidimensionalColumn(_)));
    }
}
