//! KiDS DR4 quasar samples: catalog selection and footprint-masked maps.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`selection`] | [`QsoSelection`], [`get_kids_qsos`], [`get_qsos`] |
//! | [`maps`] | [`get_kids_qso_map`], [`get_qso_map`] |
//!
//! Functions here return [`anyhow::Result`] with the file or step that
//! failed attached; the underlying [`lss_catalog::CatalogError`] or
//! [`lss_core::LssError`] stays available through `downcast_ref`.
//!
//! ```no_run
//! use std::path::Path;
//! use lss_kids::{get_kids_qso_map, get_kids_qsos};
//! use lss_maps::{get_masked_overdensity_map, Nside};
//!
//! # fn main() -> anyhow::Result<()> {
//! lss_core::logging::init_logging("info")?;
//! let qsos = get_kids_qsos(Path::new("/data"))?;
//! let (counts, mask) = get_kids_qso_map(&qsos, Nside::new(512)?)?;
//! let delta = get_masked_overdensity_map(&counts, &mask, None)?;
//! # let _ = delta;
//! # Ok(())
//! # }
//! ```

pub mod maps;
pub mod selection;

pub use maps::{get_kids_qso_map, get_qso_map, DEC_COLUMN, RA_COLUMN};
pub use selection::{get_kids_qsos, get_qsos, QsoSelection, KIDS_QSO_CATALOG};
