//! Spherical harmonic coefficients of real fields.

use lss_core::{LssError, LssResult};
use rustfft::num_complex::Complex;

/// Coefficients `a_lm` for `0 ≤ m ≤ l ≤ lmax`.
///
/// Only `m ≥ 0` is stored; for real fields `a_l,−m = (−1)^m a_lm*`. Storage
/// is m-major, index `m (2 lmax + 1 − m) / 2 + l`.
#[derive(Debug, Clone, PartialEq)]
pub struct Alm {
    lmax: usize,
    coeffs: Vec<Complex<f64>>,
}

impl Alm {
    pub fn zeros(lmax: usize) -> Self {
        Self {
            lmax,
            coeffs: vec![Complex::new(0.0, 0.0); Self::size(lmax)],
        }
    }

    /// Number of stored coefficients for `lmax`.
    pub fn size(lmax: usize) -> usize {
        (lmax + 1) * (lmax + 2) / 2
    }

    pub fn from_coeffs(lmax: usize, coeffs: Vec<Complex<f64>>) -> LssResult<Self> {
        LssError::ensure_same_len("Alm coefficients", Self::size(lmax), coeffs.len())?;
        Ok(Self { lmax, coeffs })
    }

    pub fn lmax(&self) -> usize {
        self.lmax
    }

    pub fn index(&self, l: usize, m: usize) -> usize {
        m * (2 * self.lmax + 1 - m) / 2 + l
    }

    pub fn get(&self, l: usize, m: usize) -> Complex<f64> {
        self.coeffs[self.index(l, m)]
    }

    pub fn set(&mut self, l: usize, m: usize, value: Complex<f64>) {
        let index = self.index(l, m);
        self.coeffs[index] = value;
    }

    pub fn coeffs(&self) -> &[Complex<f64>] {
        &self.coeffs
    }

    pub(crate) fn coeffs_mut(&mut self) -> &mut [Complex<f64>] {
        &mut self.coeffs
    }

    /// `self += alpha · other`.
    pub(crate) fn axpy(&mut self, alpha: f64, other: &Alm) {
        for (a, b) in self.coeffs.iter_mut().zip(&other.coeffs) {
            *a += b * alpha;
        }
    }

    /// Real inner product over the full sphere, counting `±m` for `m > 0`.
    pub(crate) fn dot(&self, other: &Alm) -> f64 {
        (0..=self.lmax)
            .map(|m| {
                let factor = if m == 0 { 1.0 } else { 2.0 };
                let start = self.index(m, m);
                let end = start + self.lmax - m + 1;
                factor
                    * self.coeffs[start..end]
                        .iter()
                        .zip(&other.coeffs[start..end])
                        .map(|(a, b)| (a.conj() * b).re)
                        .sum::<f64>()
            })
            .sum()
    }
}

/// Angular cross power spectrum
/// `C_l = (Re a_l0 b_l0* + 2 Σ_{m>0} Re a_lm b_lm*) / (2l + 1)`.
pub fn alm2cl(a: &Alm, b: &Alm) -> LssResult<Vec<f64>> {
    LssError::ensure_same_len("alm2cl lmax", a.lmax, b.lmax)?;
    let lmax = a.lmax;
    let mut cl = vec![0.0; lmax + 1];
    for m in 0..=lmax {
        let factor = if m == 0 { 1.0 } else { 2.0 };
        for (l, c) in cl.iter_mut().enumerate().skip(m) {
            *c += factor * (a.get(l, m) * b.get(l, m).conj()).re;
        }
    }
    for (l, c) in cl.iter_mut().enumerate() {
        *c /= (2 * l + 1) as f64;
    }
    Ok(cl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexing_is_m_major() {
        let alm = Alm::zeros(3);
        assert_eq!(Alm::size(3), 10);
        assert_eq!(alm.index(0, 0), 0);
        assert_eq!(alm.index(3, 0), 3);
        assert_eq!(alm.index(1, 1), 4);
        assert_eq!(alm.index(3, 3), 9);
    }

    #[test]
    fn test_auto_spectrum_averages_over_m() {
        let mut alm = Alm::zeros(2);
        alm.set(2, 0, Complex::new(1.0, 0.0));
        alm.set(2, 1, Complex::new(0.0, 1.0));
        alm.set(2, 2, Complex::new(3.0, 4.0));
        alm.set(1, 1, Complex::new(2.0, 0.0));

        let cl = alm2cl(&alm, &alm).unwrap();
        assert_eq!(cl[0], 0.0);
        assert_eq!(cl[1], 8.0 / 3.0);
        assert_eq!(cl[2], (1.0 + 2.0 + 50.0) / 5.0);
    }

    #[test]
    fn test_dot_counts_negative_m() {
        let mut alm = Alm::zeros(2);
        alm.set(1, 0, Complex::new(2.0, 0.0));
        alm.set(2, 1, Complex::new(1.0, 1.0));
        assert_eq!(alm.dot(&alm), 4.0 + 2.0 * 2.0);

        let mut shifted = alm.clone();
        shifted.axpy(-1.0, &alm);
        assert_eq!(shifted.dot(&shifted), 0.0);
    }

    #[test]
    fn test_mismatched_lmax() {
        assert!(alm2cl(&Alm::zeros(2), &Alm::zeros(3)).is_err());
        assert!(Alm::from_coeffs(2, vec![Complex::new(0.0, 0.0); 5]).is_err());
    }
}
