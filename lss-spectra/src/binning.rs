//! Bandpower binning of angular power spectra.

use lss_core::{LssError, LssResult, MathErrorKind};
use lss_maps::Nside;
use serde::Deserialize;

/// Multipoles of one bandpower and their weights (summing to one).
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub ells: Vec<usize>,
    pub weights: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binning {
    bands: Vec<Band>,
}

impl Binning {
    /// Bands from explicit multipoles and weights. Weights are normalized per
    /// band; bands must be non-empty, with non-negative weights summing to a
    /// positive value.
    pub fn new(bands: Vec<(Vec<usize>, Vec<f64>)>) -> LssResult<Self> {
        if bands.is_empty() {
            return Err(invalid("no bands"));
        }
        let bands = bands
            .into_iter()
            .enumerate()
            .map(|(i, (ells, weights))| {
                LssError::ensure_same_len("Binning ells/weights", ells.len(), weights.len())?;
                if ells.is_empty() {
                    return Err(invalid(&format!("band {} is empty", i)));
                }
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(invalid(&format!("band {} has invalid weights", i)));
                }
                let total: f64 = weights.iter().sum();
                if total <= 0.0 {
                    return Err(invalid(&format!("band {} has zero total weight", i)));
                }
                let weights = weights.iter().map(|w| w / total).collect();
                Ok(Band { ells, weights })
            })
            .collect::<LssResult<Vec<_>>>()?;
        Ok(Self { bands })
    }

    /// Contiguous uniform-weight bands `[edges[i], edges[i+1])`.
    pub fn from_edges(edges: &[usize]) -> LssResult<Self> {
        if edges.len() < 2 {
            return Err(invalid("need at least two edges"));
        }
        if edges.windows(2).any(|w| w[1] <= w[0]) {
            return Err(invalid("edges must be strictly increasing"));
        }
        Self::new(
            edges
                .windows(2)
                .map(|w| {
                    let ells: Vec<usize> = (w[0]..w[1]).collect();
                    let weights = vec![1.0; ells.len()];
                    (ells, weights)
                })
                .collect(),
        )
    }

    /// Bands of `width` multipoles starting at ℓ = 2, keeping only bands that
    /// fit entirely below `3 nside − 1`.
    pub fn linear(nside: Nside, width: usize) -> LssResult<Self> {
        if width == 0 {
            return Err(invalid("band width must be positive"));
        }
        let lmax = nside.lmax();
        let n_bands = (lmax + 1).saturating_sub(2) / width;
        if n_bands == 0 {
            return Err(invalid(&format!(
                "no band of width {} fits below lmax {}",
                width, lmax
            )));
        }
        let edges: Vec<usize> = (0..=n_bands).map(|b| 2 + b * width).collect();
        Self::from_edges(&edges)
    }

    pub fn n_bands(&self) -> usize {
        self.bands.len()
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Largest multipole used by any band.
    pub fn lmax(&self) -> usize {
        self.bands
            .iter()
            .flat_map(|b| b.ells.iter().copied())
            .max()
            .unwrap_or(0)
    }

    /// Weighted mean multipole of each band.
    pub fn effective_ells(&self) -> Vec<f64> {
        self.bands
            .iter()
            .map(|b| b.ells.iter().zip(&b.weights).map(|(&l, w)| l as f64 * w).sum())
            .collect()
    }

    /// Weighted band averages of `cl`, which must reach [`lmax`](Self::lmax).
    pub fn bin_cell(&self, cl: &[f64]) -> LssResult<Vec<f64>> {
        if cl.len() <= self.lmax() {
            return Err(LssError::shape_mismatch("bin_cell", self.lmax() + 1, cl.len()));
        }
        Ok(self
            .bands
            .iter()
            .map(|b| b.ells.iter().zip(&b.weights).map(|(&l, w)| w * cl[l]).sum())
            .collect())
    }
}

fn invalid(reason: &str) -> LssError {
    LssError::math_error("Binning", MathErrorKind::InvalidInput, reason)
}

/// Bandpower settings as read from a configuration section.
///
/// ```yaml
/// binning:
///   width: 16
/// ```
///
/// Explicit `edges` take precedence over `width`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BinningConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default)]
    pub edges: Option<Vec<usize>>,
}

fn default_width() -> usize {
    16
}

impl BinningConfig {
    pub fn to_binning(&self, nside: Nside) -> LssResult<Binning> {
        match &self.edges {
            Some(edges) => Binning::from_edges(edges),
            None => Binning::linear(nside, self.width),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lss_core::config::load_section;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_linear_keeps_complete_bands() {
        let nside = Nside::new(16).unwrap();
        let binning = Binning::linear(nside, 4).unwrap();
        // ℓ = 2..=45 in 11 bands, 46 and 47 left out
        assert_eq!(binning.n_bands(), 11);
        assert_eq!(binning.bands()[0].ells, vec![2, 3, 4, 5]);
        assert_eq!(binning.lmax(), 45);
        assert_eq!(binning.effective_ells()[0], 3.5);

        assert!(Binning::linear(nside, 0).is_err());
        assert!(Binning::linear(nside, 100).is_err());
    }

    #[test]
    fn test_weights_are_normalized() {
        let binning = Binning::new(vec![(vec![2, 3], vec![1.0, 3.0])]).unwrap();
        assert_eq!(binning.bands()[0].weights, vec![0.25, 0.75]);
        assert_eq!(binning.effective_ells(), vec![2.75]);

        assert!(Binning::new(vec![(vec![2], vec![0.0])]).is_err());
        assert!(Binning::new(vec![(vec![2], vec![-1.0])]).is_err());
        assert!(Binning::new(vec![]).is_err());
    }

    #[test]
    fn test_bin_cell_averages() {
        let binning = Binning::from_edges(&[2, 4, 7]).unwrap();
        let cl: Vec<f64> = (0..8).map(|l| l as f64).collect();
        assert_eq!(binning.bin_cell(&cl).unwrap(), vec![2.5, 5.0]);
        assert!(binning.bin_cell(&cl[..5]).is_err());
        assert!(Binning::from_edges(&[4, 4]).is_err());
    }

    #[test]
    fn test_config_section() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "binning:\n  width: 8\nedges_binning:\n  edges: [2, 10, 30]").unwrap();

        let nside = Nside::new(16).unwrap();
        let config: BinningConfig = load_section(file.path(), "binning").unwrap();
        assert_eq!(config.to_binning(nside).unwrap().n_bands(), 5);

        let config: BinningConfig = load_section(file.path(), "edges_binning").unwrap();
        assert_eq!(config.to_binning(nside).unwrap().n_bands(), 2);
    }
}
