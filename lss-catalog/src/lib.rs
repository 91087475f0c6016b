//! Catalog tables for large-scale-structure analyses.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`table`] | [`Table`] and [`Column`], immutable column-oriented storage |
//! | [`reader`] | [`read_fits_table`] with [`ReadOptions`] |
//! | [`redshift`] | [`get_redshift_distribution`] |
//! | [`errors`] | [`CatalogError`] |
//!
//! ```ignore
//! use lss_catalog::{read_fits_table, ReadOptions};
//!
//! let options = ReadOptions::default()
//!     .with_columns(["RAJ2000", "DECJ2000", "Z_PHOTO_QSO"])
//!     .with_limit(10_000);
//! let table = read_fits_table("KiDS_DR4_QSO_candidates.fits", &options)?;
//! ```

pub mod errors;
pub mod reader;
pub mod redshift;
pub mod table;

pub use errors::{CatalogError, Result};
pub use lss_fits::ColumnData;
pub use reader::{read_fits_table, ReadOptions, FLAG_COLUMN, TEXT_COLUMNS};
pub use redshift::{get_redshift_distribution, DEFAULT_REDSHIFT_BINS, DEFAULT_REDSHIFT_COLUMN};
pub use table::{Column, Table};
