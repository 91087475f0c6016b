//! Masked spin-0 fields ready for power spectrum estimation.

use crate::alm::Alm;
use crate::sht::SphericalTransform;
use lss_core::{LssError, LssResult};
use lss_maps::{Mask, MaskedMap, Nside};
use tracing::debug;

/// Harmonic coefficients of a masked map and of its mask, up to
/// `3 nside − 1`.
#[derive(Debug, Clone)]
pub struct Field {
    nside: Nside,
    alm: Alm,
    mask_alm: Alm,
}

impl Field {
    /// Transforms `mask · map`. Pixels with zero weight contribute nothing
    /// whatever they hold; any other pixel must be finite.
    pub fn new(mask: &Mask, map: &[f64], n_iter: usize) -> LssResult<Self> {
        LssError::ensure_same_len("Field map/mask", mask.len(), map.len())?;
        let nside = mask.nside();
        let weighted: Vec<f64> = mask
            .weights()
            .iter()
            .zip(map)
            .map(|(&w, &v)| if w == 0.0 { 0.0 } else { w * v })
            .collect();

        let sht = SphericalTransform::new(nside, nside.lmax())?;
        let alm = sht.map2alm(&weighted, n_iter)?;
        let mask_alm = sht.map2alm(mask.weights(), n_iter)?;
        debug!(
            "field at nside {} with sky fraction {:.4}",
            nside,
            mask.sky_fraction()
        );
        Ok(Self {
            nside,
            alm,
            mask_alm,
        })
    }

    /// Field from a masked map: pixels masked in `map` get zero weight on top
    /// of `mask`.
    pub fn from_masked(map: &MaskedMap, mask: &Mask, n_iter: usize) -> LssResult<Self> {
        LssError::ensure_same_len("Field map/mask", mask.len(), map.len())?;
        let weights = mask
            .weights()
            .iter()
            .zip(map.masked())
            .map(|(&w, &masked)| if masked { 0.0 } else { w })
            .collect();
        Self::new(&Mask::new(weights)?, &map.filled(0.0), n_iter)
    }

    pub fn nside(&self) -> Nside {
        self.nside
    }

    pub fn lmax(&self) -> usize {
        self.alm.lmax()
    }

    pub fn alm(&self) -> &Alm {
        &self.alm
    }

    pub fn mask_alm(&self) -> &Alm {
        &self.mask_alm
    }
}
