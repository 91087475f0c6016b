//! Radial kernel of the integrated Sachs–Wolfe effect.
//!
//! With a Poisson potential and linear growth, the ISW temperature shift
//! projects the matter overdensity with the weight
//!
//! ```text
//! W(χ) = 3 T_CMB H0³ Ω_m E(z) χ² (1 − f(z))
//! ```
//!
//! (`H0` in Mpc⁻¹), applied to the second derivative of the spherical Bessel
//! function, hence a Bessel derivative order of −1. Angular spectra built on
//! this kernel must use the matter power spectrum.

use crate::background::{Cosmology, A_MIN};
use lss_core::constants::CLIGHT_HMPC;
use lss_core::math::{interp, linspace};
use lss_core::{LssError, LssResult, MathErrorKind};
use tracing::debug;

pub const DEFAULT_Z_MAX: f64 = 6.0;
pub const DEFAULT_N_CHI: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct IswTracer {
    chi: Vec<f64>,
    weight: Vec<f64>,
}

impl IswTracer {
    /// Samples the kernel at `n_chi` distances from the observer to redshift
    /// `z_max`.
    pub fn new(cosmo: &Cosmology, z_max: f64, n_chi: usize) -> LssResult<Self> {
        if !(z_max > 0.0 && 1.0 / (1.0 + z_max) >= A_MIN) {
            return Err(LssError::math_error(
                "IswTracer::new",
                MathErrorKind::OutOfRange,
                &format!("z_max = {} outside (0, {}]", z_max, 1.0 / A_MIN - 1.0),
            ));
        }
        if n_chi < 2 {
            return Err(LssError::math_error(
                "IswTracer::new",
                MathErrorKind::InvalidInput,
                "need at least two radial samples",
            ));
        }

        let params = cosmo.params();
        let chi_max = cosmo.comoving_radial_distance(1.0 / (1.0 + z_max));
        let chi = linspace(0.0, chi_max, n_chi);
        let h0 = params.h / CLIGHT_HMPC;
        let prefactor = 3.0 * params.t_cmb * h0 * h0 * h0 * params.omega_m();

        let weight = chi
            .iter()
            .map(|&c| {
                let a = cosmo.scale_factor_of_chi(c);
                prefactor * cosmo.h_over_h0(a) * c * c * (1.0 - cosmo.growth_rate(a))
            })
            .collect();

        debug!("ISW kernel with {} samples up to χ = {:.1} Mpc", n_chi, chi_max);
        Ok(Self { chi, weight })
    }

    /// Kernel with `z_max = 6` and 1024 samples.
    pub fn with_defaults(cosmo: &Cosmology) -> LssResult<Self> {
        Self::new(cosmo, DEFAULT_Z_MAX, DEFAULT_N_CHI)
    }

    /// Comoving distances in Mpc.
    pub fn chi(&self) -> &[f64] {
        &self.chi
    }

    pub fn weight(&self) -> &[f64] {
        &self.weight
    }

    pub fn kernel(&self) -> (&[f64], &[f64]) {
        (&self.chi, &self.weight)
    }

    pub fn chi_max(&self) -> f64 {
        self.chi.last().copied().unwrap_or(0.0)
    }

    /// Kernel at `chi`, zero outside the sampled range.
    pub fn weight_at(&self, chi: f64) -> f64 {
        if chi < 0.0 || chi > self.chi_max() {
            return 0.0;
        }
        interp(chi, &self.chi, &self.weight)
    }

    /// Order of the spherical Bessel derivative the kernel multiplies.
    pub fn der_bessel(&self) -> i32 {
        -1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::CosmologyParams;
    use approx::assert_relative_eq;

    fn planck_like() -> Cosmology {
        Cosmology::new(CosmologyParams::new(0.26, 0.049, 0.677, 0.967)).unwrap()
    }

    #[test]
    fn test_sampling_grid() {
        let cosmo = planck_like();
        let tracer = IswTracer::with_defaults(&cosmo).unwrap();
        assert_eq!(tracer.chi().len(), DEFAULT_N_CHI);
        assert_eq!(tracer.weight().len(), DEFAULT_N_CHI);
        assert_eq!(tracer.chi()[0], 0.0);
        assert_relative_eq!(
            tracer.chi_max(),
            cosmo.comoving_radial_distance(1.0 / 7.0),
            max_relative = 1e-12
        );
        assert_eq!(tracer.der_bessel(), -1);
    }

    #[test]
    fn test_weight_formula() {
        let cosmo = planck_like();
        let tracer = IswTracer::new(&cosmo, 2.0, 64).unwrap();
        let p = cosmo.params();
        let h0 = p.h / CLIGHT_HMPC;

        assert_eq!(tracer.weight()[0], 0.0);
        let i = 40;
        let chi = tracer.chi()[i];
        let a = cosmo.scale_factor_of_chi(chi);
        let expected = 3.0 * p.t_cmb * h0.powi(3) * p.omega_m() * cosmo.h_over_h0(a) * chi * chi
            * (1.0 - cosmo.growth_rate(a));
        assert_relative_eq!(tracer.weight()[i], expected, max_relative = 1e-12);
        assert!(tracer.weight().iter().all(|w| *w >= 0.0));

        assert_relative_eq!(tracer.weight_at(chi), expected, max_relative = 1e-9);
        assert_eq!(tracer.weight_at(-1.0), 0.0);
        assert_eq!(tracer.weight_at(2.0 * tracer.chi_max()), 0.0);
    }

    #[test]
    fn test_vanishes_in_matter_domination() {
        // cold enough that radiation plays no part
        let mut params = CosmologyParams::new(0.95, 0.05, 0.7, 0.96);
        params.n_eff = 0.0;
        params.t_cmb = 1e-3;
        let cosmo = Cosmology::new(params).unwrap();
        let tracer = IswTracer::new(&cosmo, 3.0, 32).unwrap();

        let h0 = params.h / CLIGHT_HMPC;
        for (&chi, &w) in tracer.chi().iter().zip(tracer.weight()).skip(1) {
            let a = cosmo.scale_factor_of_chi(chi);
            let scale = 3.0 * params.t_cmb * h0.powi(3) * cosmo.h_over_h0(a) * chi * chi;
            assert!(w.abs() < 1e-6 * scale, "W({}) = {}", chi, w);
        }
    }

    #[test]
    fn test_rejects_bad_sampling() {
        let cosmo = planck_like();
        assert!(IswTracer::new(&cosmo, 0.0, 10).is_err());
        assert!(IswTracer::new(&cosmo, 5000.0, 10).is_err());
        assert!(IswTracer::new(&cosmo, 1.0, 1).is_err());
    }
}
