//! Pixelized sky maps built from object positions.

use crate::healpix::{ang2pix_ring, lonlat_to_thetaphi, Nside};
use lss_core::{LssError, LssResult};

fn ring_pixels(lon: &[f64], lat: &[f64], nside: Nside) -> LssResult<Vec<usize>> {
    LssError::ensure_same_len("longitude/latitude", lon.len(), lat.len())?;
    lon.iter()
        .zip(lat)
        .map(|(&l, &b)| {
            let (theta, phi) = lonlat_to_thetaphi(l, b)?;
            Ok(ang2pix_ring(nside, theta, phi)? as usize)
        })
        .collect()
}

/// Object counts per RING pixel.
///
/// `lon`/`lat` are in degrees. The result has `12 nside²` entries that sum
/// to the number of objects.
pub fn get_map(lon: &[f64], lat: &[f64], nside: Nside) -> LssResult<Vec<f64>> {
    let mut counts = vec![0.0; nside.npix()];
    for pix in ring_pixels(lon, lat, nside)? {
        counts[pix] += 1.0;
    }
    Ok(counts)
}

/// Per-pixel mean of `values`.
///
/// Pixels without objects are NaN (0/0), not an error.
pub fn get_mean_map(lon: &[f64], lat: &[f64], values: &[f64], nside: Nside) -> LssResult<Vec<f64>> {
    LssError::ensure_same_len("coordinates/values", lon.len(), values.len())?;
    let mut sums = vec![0.0; nside.npix()];
    let mut counts = vec![0.0; nside.npix()];
    for (pix, &v) in ring_pixels(lon, lat, nside)?.into_iter().zip(values) {
        sums[pix] += v;
        counts[pix] += 1.0;
    }
    Ok(sums.iter().zip(&counts).map(|(s, n)| s / n).collect())
}
