//! Count maps and footprint masks of selected quasars.

use anyhow::{Context, Result};
use lss_catalog::Table;
use lss_maps::{get_map, get_masked_map, Mask, MaskedMap, Nside, MASK_NSIDE};
use tracing::info;

pub const RA_COLUMN: &str = "RAJ2000";
pub const DEC_COLUMN: &str = "DECJ2000";

/// Count map at `nside` masked by the survey footprint, plus the footprint.
///
/// The footprint is every pixel holding at least one object at
/// `mask_nside`, degraded to `nside` and set to one wherever any coverage
/// remains.
pub fn get_qso_map(qsos: &Table, nside: Nside, mask_nside: Nside) -> Result<(MaskedMap, Mask)> {
    let ra = qsos.float_column(RA_COLUMN)?;
    let dec = qsos.float_column(DEC_COLUMN)?;

    let counts = get_map(&ra, &dec, nside).context("failed to build quasar count map")?;
    let footprint = get_map(&ra, &dec, mask_nside)
        .and_then(|reference| Mask::from_positive(&reference))
        .and_then(|mask| mask.ud_grade(nside))
        .context("failed to build quasar footprint mask")?
        .binarized();

    let map = get_masked_map(&counts, &footprint)?;
    info!(
        "quasar map at nside {}: {} objects, sky fraction {:.4}",
        nside,
        qsos.num_rows(),
        footprint.sky_fraction()
    );
    Ok((map, footprint))
}

/// [`get_qso_map`] with the footprint built at [`MASK_NSIDE`].
pub fn get_kids_qso_map(qsos: &Table, nside: Nside) -> Result<(MaskedMap, Mask)> {
    let mask_nside = Nside::new(MASK_NSIDE)?;
    get_qso_map(qsos, nside, mask_nside)
}
