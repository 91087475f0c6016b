//! Spherical harmonic transforms of RING-ordered HEALPix maps.
//!
//! Each iso-latitude ring is Fourier transformed with `rustfft`; the
//! latitude dependence uses orthonormal associated Legendre functions
//! `λ_lm(cos θ)` (Condon–Shortley phase included) from the standard
//! three-term recursion in `l`.
//!
//! Analysis starts from the pixel-area quadrature
//! `a_lm ≈ (4π/npix) Σ_p f_p Y*_lm(p)`, which is not exact on HEALPix
//! rings. It is refined by conjugate gradients on the normal equations
//! `Q S a = Q f` (`S` synthesis, `Q` quadrature), whose solution is the
//! least-squares fit of the map by harmonics up to `lmax`. Refinement stops
//! once the residual drops below `1e-12` of the right-hand side or after
//! `n_iter` iterations; `n_iter = 0` returns the bare quadrature.

use crate::alm::Alm;
use lss_core::constants::FOUR_PI;
use lss_core::{LssError, LssResult, MathErrorKind};
use lss_maps::{ring_info, Nside, RingInfo};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;
use tracing::debug;

/// Iteration cap used by [`map2alm`] callers that have no preference.
pub const DEFAULT_N_ITER: usize = 100;

/// Relative residual of the normal equations at which refinement stops.
const RESIDUAL_TOLERANCE: f64 = 1e-12;

/// Precomputed coefficients of the Legendre recursion
/// `λ_lm = a_lm (z λ_{l−1,m} − b_lm λ_{l−2,m})`.
struct LegendreRecursion {
    lmax: usize,
    a: Vec<f64>,
    b: Vec<f64>,
    /// `−sqrt((2m+1)/(2m))`, the step from `λ_{m−1,m−1}` to `λ_mm / sin θ`.
    diagonal: Vec<f64>,
}

impl LegendreRecursion {
    fn new(lmax: usize) -> Self {
        let size = Alm::size(lmax);
        let mut a = vec![0.0; size];
        let mut b = vec![0.0; size];

        for m in 0..=lmax {
            let base = block_start(lmax, m);
            for l in (m + 1)..=lmax {
                let (lf, mf) = (l as f64, m as f64);
                a[base + l - m] = ((4.0 * lf * lf - 1.0) / (lf * lf - mf * mf)).sqrt();
                if l >= m + 2 {
                    let lp = lf - 1.0;
                    b[base + l - m] = ((lp * lp - mf * mf) / (4.0 * lp * lp - 1.0)).sqrt();
                }
            }
        }

        let diagonal = (0..=lmax)
            .map(|m| {
                if m == 0 {
                    1.0
                } else {
                    -((2 * m + 1) as f64 / (2 * m) as f64).sqrt()
                }
            })
            .collect();

        Self { lmax, a, b, diagonal }
    }

    /// Fills `out` (in [`Alm`] order) with `λ_lm(z)`.
    fn evaluate(&self, z: f64, out: &mut [f64]) {
        let sin_theta = ((1.0 - z) * (1.0 + z)).max(0.0).sqrt();
        let mut lmm = (1.0 / FOUR_PI).sqrt();

        for m in 0..=self.lmax {
            if m > 0 {
                lmm *= self.diagonal[m] * sin_theta;
            }
            let base = block_start(self.lmax, m);
            out[base] = lmm;
            if m < self.lmax {
                out[base + 1] = self.a[base + 1] * z * lmm;
            }
            for i in (base + 2)..(base + self.lmax - m + 1) {
                out[i] = self.a[i] * (z * out[i - 1] - self.b[i] * out[i - 2]);
            }
        }
    }
}

/// Index of `(l = m, m)` in [`Alm`] storage.
fn block_start(lmax: usize, m: usize) -> usize {
    m * (2 * lmax + 1 - m) / 2 + m
}

struct RingPlan {
    info: RingInfo,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

/// Ring FFT plans and Legendre coefficients for one `(nside, lmax)`.
pub(crate) struct SphericalTransform {
    nside: Nside,
    lmax: usize,
    rings: Vec<RingPlan>,
    legendre: LegendreRecursion,
}

impl SphericalTransform {
    pub(crate) fn new(nside: Nside, lmax: usize) -> LssResult<Self> {
        let mut planner = FftPlanner::new();
        let rings = (1..=nside.n_rings())
            .map(|ring| {
                let info = ring_info(nside, ring)?;
                Ok(RingPlan {
                    info,
                    forward: planner.plan_fft_forward(info.n_pixels),
                    inverse: planner.plan_fft_inverse(info.n_pixels),
                })
            })
            .collect::<LssResult<Vec<_>>>()?;

        Ok(Self {
            nside,
            lmax,
            rings,
            legendre: LegendreRecursion::new(lmax),
        })
    }

    fn analysis(&self, map: &[f64]) -> Alm {
        let lmax = self.lmax;
        let weight = self.nside.pixel_area();
        let mut alm = Alm::zeros(lmax);
        let mut lambda = vec![0.0; Alm::size(lmax)];

        for ring in &self.rings {
            let RingInfo {
                first_pixel,
                n_pixels,
                z,
                phi0,
            } = ring.info;
            let mut buffer: Vec<Complex<f64>> = map[first_pixel..first_pixel + n_pixels]
                .iter()
                .map(|&v| Complex::new(v, 0.0))
                .collect();
            ring.forward.process(&mut buffer);
            self.legendre.evaluate(z, &mut lambda);

            let coeffs = alm.coeffs_mut();
            for m in 0..=lmax {
                let fm = buffer[m % n_pixels] * Complex::from_polar(weight, -(m as f64) * phi0);
                let base = block_start(lmax, m);
                for i in base..(base + lmax - m + 1) {
                    coeffs[i] += fm * lambda[i];
                }
            }
        }
        alm
    }

    fn synthesis(&self, alm: &Alm) -> Vec<f64> {
        let lmax = self.lmax;
        let mut map = vec![0.0; self.nside.npix()];
        let mut lambda = vec![0.0; Alm::size(lmax)];
        let coeffs = alm.coeffs();

        for ring in &self.rings {
            let RingInfo {
                first_pixel,
                n_pixels,
                z,
                phi0,
            } = ring.info;
            self.legendre.evaluate(z, &mut lambda);

            let mut buffer = vec![Complex::new(0.0, 0.0); n_pixels];
            for m in 0..=lmax {
                let base = block_start(lmax, m);
                let gm: Complex<f64> = (base..(base + lmax - m + 1))
                    .map(|i| coeffs[i] * lambda[i])
                    .sum();
                let factor = if m == 0 { 1.0 } else { 2.0 };
                buffer[m % n_pixels] += gm * Complex::from_polar(factor, m as f64 * phi0);
            }
            ring.inverse.process(&mut buffer);

            for (pixel, value) in map[first_pixel..first_pixel + n_pixels]
                .iter_mut()
                .zip(&buffer)
            {
                *pixel = value.re;
            }
        }
        map
    }

    pub(crate) fn map2alm(&self, map: &[f64], n_iter: usize) -> LssResult<Alm> {
        LssError::ensure_same_len("map2alm pixels", self.nside.npix(), map.len())?;
        if map.iter().any(|v| !v.is_finite()) {
            return Err(LssError::math_error(
                "map2alm",
                MathErrorKind::NotFinite,
                "map contains NaN or infinite pixels",
            ));
        }

        let rhs = self.analysis(map);
        let mut alm = rhs.clone();
        let model = self.synthesis(&alm);
        let residual_map: Vec<f64> = map.iter().zip(&model).map(|(m, r)| m - r).collect();
        let mut residual = self.analysis(&residual_map);
        let mut direction = residual.clone();

        let threshold = RESIDUAL_TOLERANCE * RESIDUAL_TOLERANCE * rhs.dot(&rhs);
        let mut rr = residual.dot(&residual);
        let mut iterations = 0;
        while iterations < n_iter && rr > threshold {
            let image = self.analysis(&self.synthesis(&direction));
            let curvature = direction.dot(&image);
            if curvature <= 0.0 {
                break;
            }
            let step = rr / curvature;
            alm.axpy(step, &direction);
            residual.axpy(-step, &image);

            let rr_next = residual.dot(&residual);
            let mut next = residual.clone();
            next.axpy(rr_next / rr, &direction);
            direction = next;
            rr = rr_next;
            iterations += 1;
        }
        debug!(
            "map2alm at nside {} lmax {}: {} iterations, relative residual {:.2e}",
            self.nside,
            self.lmax,
            iterations,
            (rr / rhs.dot(&rhs).max(f64::MIN_POSITIVE)).sqrt()
        );
        Ok(alm)
    }
}

/// Harmonic coefficients up to `lmax` of a RING map at resolution `nside`.
pub fn map2alm(map: &[f64], nside: Nside, lmax: usize, n_iter: usize) -> LssResult<Alm> {
    SphericalTransform::new(nside, lmax)?.map2alm(map, n_iter)
}

/// RING map at resolution `nside` synthesized from `alm`.
pub fn alm2map(alm: &Alm, nside: Nside) -> LssResult<Vec<f64>> {
    Ok(SphericalTransform::new(nside, alm.lmax())?.synthesis(alm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use lss_core::constants::PI;
    use lss_maps::pix2ang_ring;

    fn nside(n: u32) -> Nside {
        Nside::new(n).unwrap()
    }

    #[test]
    fn test_legendre_matches_closed_forms() {
        let recursion = LegendreRecursion::new(2);
        let mut out = vec![0.0; Alm::size(2)];
        let z: f64 = 0.3;
        let s = (1.0 - z * z).sqrt();
        recursion.evaluate(z, &mut out);

        let y00 = (1.0 / (4.0 * PI)).sqrt();
        assert_abs_diff_eq!(out[0], y00, epsilon = 1e-14);
        assert_abs_diff_eq!(out[1], (3.0 / (4.0 * PI)).sqrt() * z, epsilon = 1e-14);
        assert_abs_diff_eq!(
            out[2],
            (5.0 / (16.0 * PI)).sqrt() * (3.0 * z * z - 1.0),
            epsilon = 1e-14
        );
        assert_abs_diff_eq!(out[3], -(3.0 / (8.0 * PI)).sqrt() * s, epsilon = 1e-14);
        assert_abs_diff_eq!(out[4], -(15.0 / (8.0 * PI)).sqrt() * s * z, epsilon = 1e-14);
        assert_abs_diff_eq!(out[5], (15.0 / (32.0 * PI)).sqrt() * s * s, epsilon = 1e-14);
    }

    #[test]
    fn test_synthesis_of_dipoles() {
        let n = nside(8);
        let mut alm = Alm::zeros(3);
        alm.set(1, 0, Complex::new(1.0, 0.0));
        alm.set(1, 1, Complex::new(1.0, 0.0));
        let map = alm2map(&alm, n).unwrap();

        for pix in [0, 100, 383, 700] {
            let (theta, phi) = pix2ang_ring(n, pix as u64).unwrap();
            let expected = (3.0 / (4.0 * PI)).sqrt() * theta.cos()
                - 2.0 * (3.0 / (8.0 * PI)).sqrt() * theta.sin() * phi.cos();
            assert_abs_diff_eq!(map[pix], expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_constant_map_is_a_monopole() {
        let n = nside(4);
        let lmax = 2 * n.get() as usize;
        let alm = map2alm(&vec![2.0; n.npix()], n, lmax, DEFAULT_N_ITER).unwrap();
        assert_abs_diff_eq!(alm.get(0, 0).re, 2.0 * FOUR_PI.sqrt(), epsilon = 1e-6);
        for l in 1..=lmax {
            for m in 0..=l {
                assert!(alm.get(l, m).norm() < 1e-4, "a_{}{} = {}", l, m, alm.get(l, m));
            }
        }
    }

    #[test]
    fn test_constant_map_converges_at_full_lmax() {
        let n = nside(16);
        let alm = map2alm(&vec![1.0; n.npix()], n, n.lmax(), DEFAULT_N_ITER).unwrap();
        assert_abs_diff_eq!(alm.get(0, 0).re / FOUR_PI.sqrt(), 1.0, epsilon = 1e-7);
        let leak = alm.coeffs()[1..].iter().map(|c| c.norm()).fold(0.0, f64::max);
        assert!(leak < 1e-6, "largest leak {}", leak);
    }

    #[test]
    fn test_refinement_beats_quadrature() {
        let n = nside(8);
        let quadrature = map2alm(&vec![1.0; n.npix()], n, n.lmax(), 0).unwrap();
        let refined = map2alm(&vec![1.0; n.npix()], n, n.lmax(), DEFAULT_N_ITER).unwrap();
        let leak = |alm: &Alm| alm.coeffs()[1..].iter().map(|c| c.norm()).fold(0.0, f64::max);
        assert!(leak(&quadrature) > 1e-6);
        assert!(leak(&refined) < 1e-3 * leak(&quadrature));
    }

    #[test]
    fn test_band_limited_round_trip() {
        let n = nside(16);
        let lmax = 2 * n.get() as usize;
        let mut alm = Alm::zeros(lmax);
        for l in 0..=lmax {
            for m in 0..=l {
                let phase = 0.7 * (l * 31 + m * 17) as f64;
                let amplitude = 1.0 / (1.0 + l as f64);
                let value = if m == 0 {
                    Complex::new(amplitude * phase.cos(), 0.0)
                } else {
                    Complex::from_polar(amplitude, phase)
                };
                alm.set(l, m, value);
            }
        }

        let map = alm2map(&alm, n).unwrap();
        let recovered = map2alm(&map, n, lmax, DEFAULT_N_ITER).unwrap();
        for (a, b) in alm.coeffs().iter().zip(recovered.coeffs()) {
            assert!((a - b).norm() < 1e-4, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_rejects_bad_maps() {
        let n = nside(2);
        assert!(map2alm(&[1.0; 10], n, 5, 0).is_err());
        let mut map = vec![1.0; n.npix()];
        map[3] = f64::NAN;
        assert!(map2alm(&map, n, 5, 0).is_err());
    }
}
