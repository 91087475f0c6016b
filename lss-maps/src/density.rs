//! Overdensity and shot noise of count maps.

use crate::mask::{add_mask, get_masked_map, Mask, MaskedMap};
use lss_core::constants::FOUR_PI;
use lss_core::{LssError, LssResult};

/// Fractional density contrast `δ = (n/w) / mean(n/w) − 1`, masked by `mask`.
///
/// `weights` defaults to one per pixel. The reference density is the plain
/// mean of `n/w` over all pixels, masked ones included, rather than a
/// mask-weighted mean.
pub fn get_overdensity_map(
    counts: &[f64],
    mask: &Mask,
    weights: Option<&[f64]>,
) -> LssResult<MaskedMap> {
    let density: Vec<f64> = match weights {
        Some(w) => {
            LssError::ensure_same_len("counts/weights", counts.len(), w.len())?;
            counts.iter().zip(w).map(|(n, w)| n / w).collect()
        }
        None => counts.to_vec(),
    };

    // TODO: weight the sky mean by the mask once the effect on existing
    // bandpowers has been checked.
    let sky_mean = density.iter().sum::<f64>() / density.len() as f64;
    get_masked_map(&contrast(&density, sky_mean), mask)
}

/// [`get_overdensity_map`] for a count map that is already masked, such as
/// the survey maps built from a footprint.
///
/// The reference density is the plain mean of `n/w` over the pixels left
/// unmasked in `counts`; the result is masked where `counts` or `mask` is.
/// With nothing unmasked every value is NaN.
pub fn get_masked_overdensity_map(
    counts: &MaskedMap,
    mask: &Mask,
    weights: Option<&[f64]>,
) -> LssResult<MaskedMap> {
    let density = match weights {
        Some(w) => {
            LssError::ensure_same_len("counts/weights", counts.len(), w.len())?;
            let values = counts.values().iter().zip(w).map(|(n, w)| n / w).collect();
            MaskedMap::new(values, counts.masked().to_vec())?
        }
        None => counts.clone(),
    };

    let sky_mean = density.mean().unwrap_or(f64::NAN);
    let overdensity = MaskedMap::new(
        contrast(density.values(), sky_mean),
        density.masked().to_vec(),
    )?;
    add_mask(&overdensity, mask)
}

fn contrast(density: &[f64], sky_mean: f64) -> Vec<f64> {
    density.iter().map(|d| d / sky_mean - 1.0).collect()
}

/// Poisson shot noise `4π f_sky / N` of a count map.
///
/// `f_sky` is the mean mask weight and `N` the objects in pixels with
/// non-zero weight, unweighted. An empty footprint gives an infinite or
/// NaN value.
pub fn get_shot_noise(map: &[f64], mask: &Mask) -> LssResult<f64> {
    LssError::ensure_same_len("map/mask", map.len(), mask.len())?;
    let n_obj: f64 = map
        .iter()
        .zip(mask.weights())
        .filter(|(_, &w)| w != 0.0)
        .map(|(&n, _)| n)
        .sum();
    Ok(FOUR_PI * mask.sky_fraction() / n_obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::healpix::Nside;
    use approx::assert_relative_eq;

    fn nside(n: u32) -> Nside {
        Nside::new(n).unwrap()
    }

    #[test]
    fn test_full_sky_shot_noise() {
        let n = nside(8);
        let map: Vec<f64> = (0..n.npix()).map(|i| (i % 5) as f64).collect();
        let total: f64 = map.iter().sum();
        let noise = get_shot_noise(&map, &Mask::ones(n)).unwrap();
        assert_eq!(noise, FOUR_PI / total);
    }

    #[test]
    fn test_partial_sky_shot_noise_counts_only_covered_pixels() {
        let n = nside(1);
        let mut weights = vec![0.0; 12];
        weights[..3].fill(1.0);
        let map = vec![10.0; 12];
        let noise = get_shot_noise(&map, &Mask::new(weights).unwrap()).unwrap();
        assert_relative_eq!(noise, FOUR_PI * 0.25 / 30.0);
        assert_eq!(n.npix(), 12);
    }

    #[test]
    fn test_shot_noise_without_objects_is_infinite() {
        let noise = get_shot_noise(&[0.0; 12], &Mask::ones(nside(1))).unwrap();
        assert!(noise.is_infinite());
    }

    #[test]
    fn test_overdensity_of_uniform_counts_is_zero() {
        let n = nside(4);
        let delta = get_overdensity_map(&vec![3.0; n.npix()], &Mask::ones(n), None).unwrap();
        assert!(delta.values().iter().all(|&d| d == 0.0));
        assert_eq!(delta.n_masked(), 0);
    }

    #[test]
    fn test_overdensity_uses_all_sky_mean_and_masks() {
        let mut counts = vec![1.0; 12];
        counts[0] = 13.0;
        let mut weights = vec![1.0; 12];
        weights[11] = 0.0;
        let delta = get_overdensity_map(&counts, &Mask::new(weights).unwrap(), None).unwrap();

        // Mean over all 12 pixels is 2.
        assert_relative_eq!(delta.values()[0], 5.5);
        assert_relative_eq!(delta.values()[1], -0.5);
        assert!(delta.is_masked(11));
    }

    #[test]
    fn test_overdensity_divides_by_weights() {
        let counts = vec![2.0; 12];
        let mut noise_weights = vec![1.0; 12];
        noise_weights[0] = 2.0;
        let delta =
            get_overdensity_map(&counts, &Mask::ones(nside(1)), Some(&noise_weights)).unwrap();
        let mean = (1.0 + 11.0 * 2.0) / 12.0;
        assert_relative_eq!(delta.values()[0], 1.0 / mean - 1.0);
        assert!(get_overdensity_map(&counts, &Mask::ones(nside(1)), Some(&[1.0])).is_err());
    }

    #[test]
    fn test_masked_counts_use_unmasked_mean() {
        let mut counts = vec![0.0; 12];
        counts[..4].copy_from_slice(&[1.0, 2.0, 3.0, 2.0]);
        let mut weights = vec![0.0; 12];
        weights[..4].fill(1.0);
        let mask = Mask::new(weights).unwrap();
        let masked = get_masked_map(&counts, &mask).unwrap();

        let delta = get_masked_overdensity_map(&masked, &mask, None).unwrap();
        assert_eq!(delta.n_masked(), 8);
        assert_relative_eq!(delta.values()[0], -0.5);
        assert_relative_eq!(delta.values()[2], 0.5);
        assert!(delta.mean().unwrap().abs() < 1e-15);

        let nothing = MaskedMap::new(vec![1.0; 12], vec![true; 12]).unwrap();
        let delta = get_masked_overdensity_map(&nothing, &Mask::ones(nside(1)), None).unwrap();
        assert!(delta.values().iter().all(|d| d.is_nan()));
    }
}
