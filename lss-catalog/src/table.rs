//! Immutable column-oriented catalog table.
//!
//! A [`Table`] owns named columns of equal length. Every transformation
//! (`filter`, `head`, `select`, `with_column`) returns a new table; the
//! source is never modified.

use crate::errors::{CatalogError, Result};
use lss_fits::{write_binary_table, ColumnData, TableColumn};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new<S: Into<String>>(name: S, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Builds a table, checking that every column has the same number of rows.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map_or(0, Column::len);
        if let Some(bad) = columns.iter().find(|c| c.len() != n_rows) {
            return Err(CatalogError::LengthMismatch {
                column: bad.name.clone(),
                expected: n_rows,
                actual: bad.len(),
            });
        }
        Ok(Self { columns, n_rows })
    }

    pub fn num_rows(&self) -> usize {
        self.n_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CatalogError::MissingColumn(name.to_string()))
    }

    /// Numeric view of a column; integers and booleans are widened to `f64`.
    pub fn float_column(&self, name: &str) -> Result<Vec<f64>> {
        let column = self.column(name)?;
        column.data.to_f64().ok_or_else(|| CatalogError::ColumnType {
            column: name.to_string(),
            expected: "numeric",
            actual: column.data.type_name().to_string(),
        })
    }

    pub fn int_column(&self, name: &str) -> Result<&[i64]> {
        let column = self.column(name)?;
        match &column.data {
            ColumnData::Int(values) => Ok(values),
            other => Err(CatalogError::ColumnType {
                column: name.to_string(),
                expected: "int",
                actual: other.type_name().to_string(),
            }),
        }
    }

    pub fn text_column(&self, name: &str) -> Result<&[String]> {
        let column = self.column(name)?;
        match &column.data {
            ColumnData::Text(values) => Ok(values),
            other => Err(CatalogError::ColumnType {
                column: name.to_string(),
                expected: "text",
                actual: other.type_name().to_string(),
            }),
        }
    }

    /// Rows where `keep` is true.
    pub fn filter(&self, keep: &[bool]) -> Result<Self> {
        if keep.len() != self.n_rows {
            return Err(CatalogError::LengthMismatch {
                column: "<row mask>".to_string(),
                expected: self.n_rows,
                actual: keep.len(),
            });
        }
        Ok(Self {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.data.filter(keep)))
                .collect(),
            n_rows: keep.iter().filter(|&&k| k).count(),
        })
    }

    pub fn head(&self, n: usize) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.data.head(n)))
                .collect(),
            n_rows: n.min(self.n_rows),
        }
    }

    /// Projection onto `names`, in the order given.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let columns = names
            .iter()
            .map(|name| self.column(name.as_ref()).cloned())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            columns,
            n_rows: self.n_rows,
        })
    }

    /// Copy of the table with `column` added, or replacing the column of the
    /// same name.
    pub fn with_column(&self, column: Column) -> Result<Self> {
        if !self.columns.is_empty() && column.len() != self.n_rows {
            return Err(CatalogError::LengthMismatch {
                actual: column.len(),
                expected: self.n_rows,
                column: column.name,
            });
        }
        let n_rows = column.len();
        let mut columns = self.columns.clone();
        match columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => columns.push(column),
        }
        Ok(Self { columns, n_rows })
    }

    /// Writes the table as a FITS binary table.
    pub fn write_fits<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let columns: Vec<TableColumn> = self
            .columns
            .iter()
            .map(|c| TableColumn::new(c.name.clone(), c.data.clone()))
            .collect();
        write_binary_table(path, &columns)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::new("RAJ2000", ColumnData::Float(vec![10.0, 20.0, 30.0])),
            Column::new("IMAFLAGS_ISO", ColumnData::Int(vec![0, 1, 0])),
            Column::new(
                "ID",
                ColumnData::Text(vec!["a".into(), "b".into(), "c".into()]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_rejects_ragged_columns() {
        let err = Table::new(vec![
            Column::new("A", ColumnData::Float(vec![1.0, 2.0])),
            Column::new("B", ColumnData::Float(vec![1.0])),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::LengthMismatch { ref column, .. } if column == "B"));
    }

    #[test]
    fn test_filter_returns_new_table() {
        let table = sample();
        let filtered = table.filter(&[true, false, true]).unwrap();

        assert_eq!(filtered.num_rows(), 2);
        assert_eq!(filtered.float_column("RAJ2000").unwrap(), vec![10.0, 30.0]);
        assert_eq!(filtered.text_column("ID").unwrap(), ["a", "c"]);
        assert_eq!(table.num_rows(), 3);
    }

    #[test]
    fn test_filter_checks_mask_length() {
        assert!(sample().filter(&[true]).is_err());
    }

    #[test]
    fn test_select_orders_and_validates() {
        let table = sample();
        let selected = table.select(&["ID", "RAJ2000"]).unwrap();
        assert_eq!(selected.column_names(), vec!["ID", "RAJ2000"]);

        let err = table.select(&["MAG_GAAP_r"]).unwrap_err();
        assert!(matches!(err, CatalogError::MissingColumn(ref name) if name == "MAG_GAAP_r"));
    }

    #[test]
    fn test_typed_accessors() {
        let table = sample();
        assert_eq!(table.int_column("IMAFLAGS_ISO").unwrap(), [0, 1, 0]);
        assert_eq!(table.float_column("IMAFLAGS_ISO").unwrap(), vec![0.0, 1.0, 0.0]);
        assert!(matches!(
            table.float_column("ID"),
            Err(CatalogError::ColumnType { .. })
        ));
    }

    #[test]
    fn test_head_and_with_column() {
        let table = sample();
        assert_eq!(table.head(2).num_rows(), 2);
        assert_eq!(table.head(10).num_rows(), 3);

        let replaced = table
            .with_column(Column::new("RAJ2000", ColumnData::Float(vec![1.0, 2.0, 3.0])))
            .unwrap();
        assert_eq!(replaced.num_columns(), 3);
        assert_eq!(replaced.float_column("RAJ2000").unwrap(), vec![1.0, 2.0, 3.0]);

        let err = table
            .with_column(Column::new("Z", ColumnData::Float(vec![1.0])))
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::LengthMismatch { ref column, expected: 3, actual: 1 } if column == "Z"
        ));
    }
}
