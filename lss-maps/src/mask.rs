//! Sky masks and masked maps.
//!
//! A [`Mask`] holds per-pixel coverage weights in [0, 1]; a pixel is masked
//! where its weight is exactly zero. A [`MaskedMap`] pairs map values with
//! masked flags, in the manner of a numpy masked array: masked values stay
//! stored but carry no meaning.

use crate::healpix::Nside;
use crate::resample::ud_grade;
use lss_core::constants::UNSEEN;
use lss_core::{LssError, LssResult, MathErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    weights: Vec<f64>,
    nside: Nside,
}

impl Mask {
    /// Validates `weights`: a full-sky pixel count, every weight in [0, 1].
    pub fn new(weights: Vec<f64>) -> LssResult<Self> {
        let nside = Nside::from_npix(weights.len())?;
        if let Some((pix, w)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !(0.0..=1.0).contains(*w))
        {
            return Err(LssError::math_error(
                "Mask::new",
                MathErrorKind::OutOfRange,
                &format!("mask weight {} at pixel {} outside [0, 1]", w, pix),
            ));
        }
        Ok(Self { weights, nside })
    }

    /// Full-sky coverage.
    pub fn ones(nside: Nside) -> Self {
        Self {
            weights: vec![1.0; nside.npix()],
            nside,
        }
    }

    /// Binary mask: 1 where `values` is positive, 0 elsewhere.
    pub fn from_positive(values: &[f64]) -> LssResult<Self> {
        Self::new(
            values
                .iter()
                .map(|&v| if v > 0.0 { 1.0 } else { 0.0 })
                .collect(),
        )
    }

    pub fn nside(&self) -> Nside {
        self.nside
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn is_masked(&self, pix: usize) -> bool {
        self.weights[pix] == 0.0
    }

    /// Number of pixels with non-zero weight.
    pub fn n_unmasked(&self) -> usize {
        self.weights.iter().filter(|&&w| w != 0.0).count()
    }

    /// Covered fraction of the sky, `Σ w / npix`.
    pub fn sky_fraction(&self) -> f64 {
        self.weights.iter().sum::<f64>() / self.weights.len() as f64
    }

    /// Every non-zero weight set to 1.
    pub fn binarized(&self) -> Self {
        Self {
            weights: self
                .weights
                .iter()
                .map(|&w| if w > 0.0 { 1.0 } else { 0.0 })
                .collect(),
            nside: self.nside,
        }
    }

    /// The mask resampled to `nside`; degraded weights are child averages.
    pub fn ud_grade(&self, nside: Nside) -> LssResult<Self> {
        Self::new(ud_grade(&self.weights, nside)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaskedMap {
    values: Vec<f64>,
    masked: Vec<bool>,
}

impl MaskedMap {
    pub fn new(values: Vec<f64>, masked: Vec<bool>) -> LssResult<Self> {
        LssError::ensure_same_len("MaskedMap values/flags", values.len(), masked.len())?;
        Ok(Self { values, masked })
    }

    pub fn unmasked(values: Vec<f64>) -> Self {
        let masked = vec![false; values.len()];
        Self { values, masked }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Stored values, masked entries included.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn masked(&self) -> &[bool] {
        &self.masked
    }

    pub fn is_masked(&self, pix: usize) -> bool {
        self.masked[pix]
    }

    pub fn n_masked(&self) -> usize {
        self.masked.iter().filter(|&&m| m).count()
    }

    pub fn unmasked_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values
            .iter()
            .zip(&self.masked)
            .filter(|(_, &m)| !m)
            .map(|(&v, _)| v)
    }

    /// Mean over unmasked pixels; `None` when every pixel is masked.
    pub fn mean(&self) -> Option<f64> {
        let (sum, n) = self
            .unmasked_values()
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        (n > 0).then(|| sum / n as f64)
    }

    /// Values with masked pixels replaced by `fill`.
    pub fn filled(&self, fill: f64) -> Vec<f64> {
        self.values
            .iter()
            .zip(&self.masked)
            .map(|(&v, &m)| if m { fill } else { v })
            .collect()
    }

    /// Resampled copy. Masked pixels are treated as `UNSEEN`, and output
    /// pixels with no unmasked child come back masked.
    pub fn ud_grade(&self, nside: Nside) -> LssResult<Self> {
        let values = ud_grade(&self.filled(UNSEEN), nside)?;
        let masked = values.iter().map(|&v| v == UNSEEN).collect();
        Ok(Self { values, masked })
    }
}

/// Wraps `map` with pixels masked wherever `mask` is zero.
pub fn get_masked_map(map: &[f64], mask: &Mask) -> LssResult<MaskedMap> {
    LssError::ensure_same_len("map/mask", map.len(), mask.len())?;
    let masked = (0..mask.len()).map(|pix| mask.is_masked(pix)).collect();
    MaskedMap::new(map.to_vec(), masked)
}

/// Copy of `map` additionally masked wherever `extra` is zero.
pub fn add_mask(map: &MaskedMap, extra: &Mask) -> LssResult<MaskedMap> {
    LssError::ensure_same_len("map/mask", map.len(), extra.len())?;
    let masked = map
        .masked
        .iter()
        .enumerate()
        .map(|(pix, &m)| m || extra.is_masked(pix))
        .collect();
    MaskedMap::new(map.values.clone(), masked)
}
