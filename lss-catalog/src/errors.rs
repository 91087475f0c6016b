use lss_core::LssError;
use lss_fits::FitsError;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Fits(#[from] FitsError),

    #[error(transparent)]
    Lss(#[from] LssError),

    #[error("Column '{0}' not found in table")]
    MissingColumn(String),

    #[error("Column '{column}' holds {actual} values, expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
        actual: String,
    },

    #[error("Column '{0}' is multidimensional and cannot be held in a flat table")]
    MultidimensionalColumn(String),

    #[error("Column '{column}' row {row} is not valid UTF-8")]
    InvalidUtf8 { column: String, row: usize },

    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
