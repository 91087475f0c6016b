use crate::errors::Result;
use crate::table::Table;
use lss_core::math::{bin_centers, histogram};

pub const DEFAULT_REDSHIFT_BINS: usize = 50;
pub const DEFAULT_REDSHIFT_COLUMN: &str = "Z_PHOTO_QSO";

/// Histogram of `column` in `n_bins` equal-width bins over its observed range.
///
/// Returns `(bin_centres, counts)`, both of length `n_bins`. The usual call
/// is `get_redshift_distribution(&qsos, DEFAULT_REDSHIFT_BINS, DEFAULT_REDSHIFT_COLUMN)`.
pub fn get_redshift_distribution(
    table: &Table,
    n_bins: usize,
    column: &str,
) -> Result<(Vec<f64>, Vec<u64>)> {
    let values = table.float_column(column)?;
    let (counts, edges) = histogram(&values, n_bins)?;
    Ok((bin_centers(&edges), counts))
}
