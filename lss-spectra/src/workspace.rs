//! Mode-coupling matrices for pseudo-Cl estimation.
//!
//! For masks `v` and `w` with cross spectrum `W_ℓ`, the coupled spectrum of
//! two masked spin-0 fields is `C̃_ℓ1 = Σ_ℓ2 M_ℓ1ℓ2 C_ℓ2` with
//!
//! ```text
//! M_ℓ1ℓ2 = (2ℓ2 + 1)/(4π) Σ_ℓ3 (2ℓ3 + 1) W_ℓ3 (ℓ1 ℓ2 ℓ3; 0 0 0)²
//! ```
//!
//! Binning both sides gives `M_bb' = Σ_{ℓ∈b} w_ℓ Σ_{ℓ'∈b'} M_ℓℓ'`, which
//! is inverted once and reused for every pair of fields sharing the masks.

use crate::alm::alm2cl;
use crate::binning::Binning;
use crate::field::Field;
use crate::wigner::Wigner3jTable;
use lss_core::constants::FOUR_PI;
use lss_core::{LssError, LssResult, MathErrorKind};
use nalgebra::{DMatrix, DVector};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CouplingWorkspace {
    lmax: usize,
    binning: Binning,
    coupling: DMatrix<f64>,
    binned_coupling: DMatrix<f64>,
    inverse: DMatrix<f64>,
}

impl CouplingWorkspace {
    /// Coupling matrix of the masks of `field_a` and `field_b`.
    pub fn compute(field_a: &Field, field_b: &Field, binning: &Binning) -> LssResult<Self> {
        LssError::ensure_same_len("coupling lmax", field_a.lmax(), field_b.lmax())?;
        let lmax = field_a.lmax();
        if binning.lmax() > lmax {
            return Err(LssError::math_error(
                "CouplingWorkspace::compute",
                MathErrorKind::OutOfRange,
                &format!("binning reaches ℓ = {} beyond field lmax {}", binning.lmax(), lmax),
            ));
        }

        let mask_cl = alm2cl(field_a.mask_alm(), field_b.mask_alm())?;
        let coupling = coupling_matrix(&mask_cl, lmax);
        let binned_coupling = bin_coupling(&coupling, binning);
        let inverse = binned_coupling
            .clone()
            .try_inverse()
            .ok_or_else(|| LssError::singular("binned mode-coupling matrix"))?;

        debug!(
            "coupling matrix for lmax {} and {} bands",
            lmax,
            binning.n_bands()
        );
        Ok(Self {
            lmax,
            binning: binning.clone(),
            coupling,
            binned_coupling,
            inverse,
        })
    }

    pub fn lmax(&self) -> usize {
        self.lmax
    }

    pub fn binning(&self) -> &Binning {
        &self.binning
    }

    /// Unbinned `M_ℓℓ'`, `(lmax + 1)²`.
    pub fn coupling_matrix(&self) -> &DMatrix<f64> {
        &self.coupling
    }

    pub fn binned_coupling_matrix(&self) -> &DMatrix<f64> {
        &self.binned_coupling
    }

    /// Spectrum a masked sky would show for the full-sky spectrum `cl`.
    pub fn couple_cell(&self, cl: &[f64]) -> LssResult<Vec<f64>> {
        LssError::ensure_same_len("couple_cell", self.lmax + 1, cl.len())?;
        let coupled = &self.coupling * DVector::from_column_slice(cl);
        Ok(coupled.iter().copied().collect())
    }

    /// Bandpowers of a coupled spectrum, optionally after subtracting a
    /// coupled noise spectrum.
    pub fn decouple_cell(&self, coupled: &[f64], noise: Option<&[f64]>) -> LssResult<Vec<f64>> {
        LssError::ensure_same_len("decouple_cell", self.lmax + 1, coupled.len())?;
        let signal = match noise {
            Some(noise) => {
                LssError::ensure_same_len("decouple_cell noise", coupled.len(), noise.len())?;
                coupled.iter().zip(noise).map(|(c, n)| c - n).collect()
            }
            None => coupled.to_vec(),
        };
        let binned = DVector::from_vec(self.binning.bin_cell(&signal)?);
        Ok((&self.inverse * binned).iter().copied().collect())
    }
}

fn coupling_matrix(mask_cl: &[f64], lmax: usize) -> DMatrix<f64> {
    let wigner = Wigner3jTable::new(lmax);
    let weighted: Vec<f64> = mask_cl
        .iter()
        .enumerate()
        .map(|(l, w)| (2 * l + 1) as f64 * w)
        .collect();

    DMatrix::from_fn(lmax + 1, lmax + 1, |l1, l2| {
        let l3_max = (l1 + l2).min(lmax);
        let sum: f64 = (l1.abs_diff(l2)..=l3_max)
            .map(|l3| weighted[l3] * wigner.squared(l1, l2, l3))
            .sum();
        (2 * l2 + 1) as f64 / FOUR_PI * sum
    })
}

fn bin_coupling(coupling: &DMatrix<f64>, binning: &Binning) -> DMatrix<f64> {
    let bands = binning.bands();
    DMatrix::from_fn(bands.len(), bands.len(), |b, bp| {
        bands[b]
            .ells
            .iter()
            .zip(&bands[b].weights)
            .map(|(&l, w)| w * bands[bp].ells.iter().map(|&lp| coupling[(l, lp)]).sum::<f64>())
            .sum()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sht::DEFAULT_N_ITER;
    use lss_maps::{Mask, Nside};

    fn nside(n: u32) -> Nside {
        Nside::new(n).unwrap()
    }

    #[test]
    fn test_full_sky_coupling_is_identity() {
        let n = nside(8);
        let field = Field::new(&Mask::ones(n), &vec![0.0; n.npix()], DEFAULT_N_ITER).unwrap();
        let binning = Binning::linear(n, 2).unwrap();
        let workspace = CouplingWorkspace::compute(&field, &field, &binning).unwrap();

        let m = workspace.coupling_matrix();
        for i in 0..=workspace.lmax() {
            for j in 0..=workspace.lmax() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((m[(i, j)] - expected).abs() < 1e-3, "M[{},{}] = {}", i, j, m[(i, j)]);
            }
        }
    }

    #[test]
    fn test_decoupling_inverts_coupling_for_banded_spectra() {
        let n = nside(8);
        let npix = n.npix();
        let weights = (0..npix).map(|p| if p < 2 * npix / 3 { 1.0 } else { 0.0 }).collect();
        let mask = Mask::new(weights).unwrap();
        let field = Field::new(&mask, &vec![0.0; npix], DEFAULT_N_ITER).unwrap();
        let binning = Binning::linear(n, 6).unwrap();
        let workspace = CouplingWorkspace::compute(&field, &field, &binning).unwrap();

        let truth: Vec<f64> = (0..binning.n_bands()).map(|b| 1.0 / (1.0 + b as f64)).collect();
        let mut cl = vec![0.0; workspace.lmax() + 1];
        for (band, value) in binning.bands().iter().zip(&truth) {
            for &l in &band.ells {
                cl[l] = *value;
            }
        }

        let coupled = workspace.couple_cell(&cl).unwrap();
        let decoupled = workspace.decouple_cell(&coupled, None).unwrap();
        for (got, want) in decoupled.iter().zip(&truth) {
            assert!((got - want).abs() < 1e-6 * want, "{} vs {}", got, want);
        }

        let noise = vec![0.1; coupled.len()];
        let noisy: Vec<f64> = coupled.iter().map(|c| c + 0.1).collect();
        let cleaned = workspace.decouple_cell(&noisy, Some(&noise)).unwrap();
        for (got, want) in cleaned.iter().zip(&decoupled) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_mask_is_singular() {
        let n = nside(2);
        let field = Field::new(&Mask::new(vec![0.0; n.npix()]).unwrap(), &vec![0.0; n.npix()], 0)
            .unwrap();
        let binning = Binning::linear(n, 1).unwrap();
        assert!(matches!(
            CouplingWorkspace::compute(&field, &field, &binning),
            Err(LssError::Singular { .. })
        ));
    }

    #[test]
    fn test_binning_beyond_lmax_is_rejected() {
        let n = nside(2);
        let field = Field::new(&Mask::ones(n), &vec![0.0; n.npix()], 0).unwrap();
        let binning = Binning::from_edges(&[2, 10]).unwrap();
        assert!(CouplingWorkspace::compute(&field, &field, &binning).is_err());
    }
}
