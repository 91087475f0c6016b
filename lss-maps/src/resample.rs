//! Resolution changes of RING-ordered maps.
//!
//! Maps are reordered to NEST, where the `4^k` children of a pixel are
//! consecutive, resampled there and reordered back to RING.

use crate::healpix::{nest2ring, ring2nest, Nside};
use crate::mask::Mask;
use lss_core::constants::UNSEEN;
use lss_core::LssResult;
use tracing::debug;

fn is_valid(value: f64) -> bool {
    value.is_finite() && value != UNSEEN
}

fn to_nest(map: &[f64], nside: Nside) -> LssResult<Vec<f64>> {
    let mut nest = vec![0.0; map.len()];
    for (ring, &value) in map.iter().enumerate() {
        nest[ring2nest(nside, ring as u64)? as usize] = value;
    }
    Ok(nest)
}

fn to_ring(map: &[f64], nside: Nside) -> LssResult<Vec<f64>> {
    let mut ring = vec![0.0; map.len()];
    for (nest, &value) in map.iter().enumerate() {
        ring[nest2ring(nside, nest as u64)? as usize] = value;
    }
    Ok(ring)
}

/// Resamples a RING map to `nside_out`.
///
/// Degrading averages the valid children of each output pixel; `UNSEEN`
/// and NaN children are skipped and a pixel with no valid child becomes
/// `UNSEEN`. Upgrading copies each parent value to its children. The input
/// length must be a valid HEALPix pixel count.
pub fn ud_grade(map: &[f64], nside_out: Nside) -> LssResult<Vec<f64>> {
    let nside_in = Nside::from_npix(map.len())?;
    if nside_in == nside_out {
        return Ok(map.to_vec());
    }
    debug!("resampling map from nside {} to {}", nside_in, nside_out);

    let nest = to_nest(map, nside_in)?;
    let resampled = if nside_out < nside_in {
        let ratio = (nside_in.get() / nside_out.get()) as usize;
        nest.chunks_exact(ratio * ratio)
            .map(|children| {
                let (sum, count) = children
                    .iter()
                    .filter(|&&v| is_valid(v))
                    .fold((0.0, 0usize), |(s, n), &v| (s + v, n + 1));
                if count == 0 {
                    UNSEEN
                } else {
                    sum / count as f64
                }
            })
            .collect::<Vec<_>>()
    } else {
        let ratio = (nside_out.get() / nside_in.get()) as usize;
        nest.iter()
            .flat_map(|&v| std::iter::repeat_n(v, ratio * ratio))
            .collect::<Vec<_>>()
    };
    to_ring(&resampled, nside_out)
}

/// Resamples both `map` and `mask` to `nside`, or returns them unchanged
/// when `nside` is `None`.
pub fn transform_map_and_mask_to_nside(
    map: &[f64],
    mask: &Mask,
    nside: Option<Nside>,
) -> LssResult<(Vec<f64>, Mask)> {
    match nside {
        Some(nside) => Ok((ud_grade(map, nside)?, mask.ud_grade(nside)?)),
        None => Ok((map.to_vec(), mask.clone())),
    }
}
