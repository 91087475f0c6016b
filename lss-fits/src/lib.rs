//! Minimal FITS support for astronomical catalogs.
//!
//! Reads and writes the binary-table extensions that survey catalogs are
//! distributed in. Images, ASCII tables and variable-length arrays are not
//! decoded.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`header`] | 80-byte cards, keyword values, header blocks |
//! | [`hdu`] | HDU classification, `BINTABLE` column metadata and decoding |
//! | [`io`] | [`FitsFile`] scanning and [`FitsWriter`] output |
//! | [`column`] | [`ColumnData`], the decoded column representation |
//!
//! Column decoding follows the binary-table conventions:
//!
//! | `TFORM` | Result |
//! |---------|--------|
//! | `L` | `Bool` |
//! | `B`, `I`, `J`, `K` | `Int`, or `Float` when `TNULL`/`TSCAL` apply |
//! | `E`, `D` | `Float` |
//! | `A` | `Bytes` |
//! | repeat > 1 | `IntArray` / `FloatArray` |

pub mod column;
pub mod errors;
pub mod hdu;
pub mod header;
pub mod io;

pub use column::ColumnData;
pub use errors::{FitsError, Result};
pub use hdu::{BinaryTableHdu, ColumnInfo, Hdu, HduType, TForm};
pub use header::{Header, Keyword, KeywordValue};
pub use io::{write_binary_table, FitsFile, FitsWriter, HduInfo, TableColumn};
