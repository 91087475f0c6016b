//! Quasar candidate selection from the KiDS DR4 catalog.

use anyhow::{Context, Result};
use lss_catalog::{read_fits_table, ReadOptions, Table};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Published KiDS DR4 quasar candidate catalog, relative to the data root.
pub const KIDS_QSO_CATALOG: &str = "KiDS/DR4/catalogs/published/KiDS_DR4_QSO_candidates.fits";

/// Row cuts applied to a quasar candidate table. Every cut is a strict
/// inequality and rows with NaN in any cut column are dropped.
///
/// Defaults reproduce the KiDS DR4 selection:
///
/// ```yaml
/// KiDS_QSO:
///   catalog: KiDS/DR4/catalogs/published/KiDS_DR4_QSO_candidates.fits
///   max_mag_r: 23.5
///   min_qso_photo: 0.98
///   min_dec: -10.0
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QsoSelection {
    pub catalog: PathBuf,
    pub mag_column: String,
    pub max_mag_r: f64,
    pub score_column: String,
    pub min_qso_photo: f64,
    pub dec_column: String,
    pub min_dec: f64,
}

impl Default for QsoSelection {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from(KIDS_QSO_CATALOG),
            mag_column: "MAG_GAAP_r".to_string(),
            max_mag_r: 23.5,
            score_column: "QSO_PHOTO".to_string(),
            min_qso_photo: 0.98,
            dec_column: "DECJ2000".to_string(),
            min_dec: -10.0,
        }
    }
}

impl QsoSelection {
    /// Rows of `table` passing all three cuts, as a new table.
    pub fn apply(&self, table: &Table) -> Result<Table> {
        let mag = table.float_column(&self.mag_column)?;
        let score = table.float_column(&self.score_column)?;
        let dec = table.float_column(&self.dec_column)?;

        let keep: Vec<bool> = mag
            .iter()
            .zip(&score)
            .zip(&dec)
            .map(|((&m, &s), &d)| m < self.max_mag_r && s > self.min_qso_photo && d > self.min_dec)
            .collect();

        let selected = table.filter(&keep)?;
        info!(
            "selected {} of {} quasar candidates",
            selected.num_rows(),
            table.num_rows()
        );
        Ok(selected)
    }
}

/// Loads the catalog named by `selection` under `data_root` and applies its
/// cuts.
pub fn get_qsos(data_root: &Path, selection: &QsoSelection) -> Result<Table> {
    let path = data_root.join(&selection.catalog);
    let candidates = read_fits_table(&path, &ReadOptions::default())
        .with_context(|| format!("failed to read quasar candidates from {}", path.display()))?;
    selection.apply(&candidates)
}

/// KiDS DR4 quasars with the default selection.
pub fn get_kids_qsos(data_root: &Path) -> Result<Table> {
    get_qsos(data_root, &QsoSelection::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lss_catalog::{Column, ColumnData};
    use lss_core::config::load_section;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn candidates() -> Table {
        Table::new(vec![
            Column::new(
                "MAG_GAAP_r",
                ColumnData::Float(vec![22.0, 23.5, 21.0, 20.0, f64::NAN, 22.0]),
            ),
            Column::new(
                "QSO_PHOTO",
                ColumnData::Float(vec![0.99, 0.99, 0.98, 0.999, 0.99, 0.99]),
            ),
            Column::new(
                "DECJ2000",
                ColumnData::Float(vec![0.0, 0.0, 0.0, -10.0, 0.0, -9.9]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_default_cuts_are_strict() {
        let selected = QsoSelection::default().apply(&candidates()).unwrap();
        // boundary values, NaN magnitude and the declination edge all fail
        assert_eq!(selected.num_rows(), 2);
        assert_eq!(
            selected.float_column("DECJ2000").unwrap(),
            vec![0.0, -9.9]
        );
    }

    #[test]
    fn test_missing_column_is_reported() {
        let table = candidates().select(&["MAG_GAAP_r", "DECJ2000"]).unwrap();
        let err = QsoSelection::default().apply(&table).unwrap_err();
        assert!(err.to_string().contains("QSO_PHOTO"));
    }

    #[test]
    fn test_config_overrides_some_cuts() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "KiDS_QSO:\n  max_mag_r: 22.5\n  min_dec: -5").unwrap();
        let selection: QsoSelection = load_section(file.path(), "KiDS_QSO").unwrap();

        assert_eq!(selection.max_mag_r, 22.5);
        assert_eq!(selection.min_dec, -5.0);
        assert_eq!(selection.min_qso_photo, 0.98);
        assert_eq!(selection.catalog, PathBuf::from(KIDS_QSO_CATALOG));
        assert_eq!(selection.apply(&candidates()).unwrap().num_rows(), 1);
    }

    #[test]
    fn test_missing_catalog_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = get_kids_qsos(dir.path()).unwrap_err();
        assert!(err.to_string().contains("KiDS_DR4_QSO_candidates.fits"));
        assert!(err.downcast_ref::<lss_catalog::CatalogError>().is_some());
    }
}
