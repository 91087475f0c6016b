//! Homogeneous background: expansion rate, distances and linear growth.
//!
//! Distances and growth are tabulated once on a uniform grid in `ln a` from
//! [`A_MIN`] to today, together with their derivatives, and read back with
//! cubic Hermite interpolation. Scale factors below [`A_MIN`] are clamped to
//! the first table entry.

use crate::params::CosmologyParams;
use lss_core::constants::CLIGHT_HMPC;
use lss_core::math::{interp, interp_hermite, linspace};
use lss_core::LssResult;
use tracing::debug;

/// Earliest tabulated scale factor.
pub const A_MIN: f64 = 1e-3;

const N_TABLE: usize = 4096;

#[derive(Debug, Clone)]
pub struct Cosmology {
    params: CosmologyParams,
    ln_a: Vec<f64>,
    /// Comoving radial distance in Mpc, decreasing with `a`.
    chi: Vec<f64>,
    /// `dχ / d ln a`.
    dchi: Vec<f64>,
    /// Distance table in increasing `χ` for the inverse lookup.
    chi_increasing: Vec<f64>,
    ln_a_of_chi: Vec<f64>,
    /// `d ln a / dχ` along `chi_increasing`.
    dln_a_dchi: Vec<f64>,
    /// Linear growth factor, `D(1) = 1`.
    growth: Vec<f64>,
    /// `dD / d ln a`.
    dgrowth: Vec<f64>,
    /// `d ln D / d ln a`.
    growth_rate: Vec<f64>,
}

impl Cosmology {
    pub fn new(params: CosmologyParams) -> LssResult<Self> {
        params.validate()?;
        let ln_a = linspace(libm::log(A_MIN), 0.0, N_TABLE);
        let mut cosmo = Self {
            params,
            ln_a,
            chi: Vec::new(),
            dchi: Vec::new(),
            chi_increasing: Vec::new(),
            ln_a_of_chi: Vec::new(),
            dln_a_dchi: Vec::new(),
            growth: Vec::new(),
            dgrowth: Vec::new(),
            growth_rate: Vec::new(),
        };
        cosmo.tabulate_distance();
        cosmo.tabulate_growth();

        debug!(
            "background for Ω_m = {:.4}, h = {:.4}: χ(a = {}) = {:.1} Mpc",
            params.omega_m(),
            params.h,
            A_MIN,
            cosmo.chi[0]
        );
        Ok(cosmo)
    }

    pub fn params(&self) -> &CosmologyParams {
        &self.params
    }

    /// `H(a) / H0`.
    pub fn h_over_h0(&self, a: f64) -> f64 {
        libm::sqrt(self.e_squared(a))
    }

    /// Hubble distance `c / H0` in Mpc.
    pub fn hubble_distance(&self) -> f64 {
        CLIGHT_HMPC / self.params.h
    }

    /// Comoving radial distance to scale factor `a`, in Mpc.
    pub fn comoving_radial_distance(&self, a: f64) -> f64 {
        if a >= 1.0 {
            return 0.0;
        }
        interp_hermite(libm::log(a), &self.ln_a, &self.chi, &self.dchi)
    }

    /// Scale factor at comoving radial distance `chi` (Mpc).
    pub fn scale_factor_of_chi(&self, chi: f64) -> f64 {
        if chi <= 0.0 {
            return 1.0;
        }
        libm::exp(interp_hermite(
            chi,
            &self.chi_increasing,
            &self.ln_a_of_chi,
            &self.dln_a_dchi,
        ))
    }

    /// Linear growth factor normalized to one today.
    pub fn growth_factor(&self, a: f64) -> f64 {
        interp_hermite(libm::log(a.min(1.0)), &self.ln_a, &self.growth, &self.dgrowth)
    }

    /// Logarithmic growth rate `f = d ln D / d ln a`.
    pub fn growth_rate(&self, a: f64) -> f64 {
        interp(libm::log(a.min(1.0)), &self.ln_a, &self.growth_rate)
    }

    fn e_squared(&self, a: f64) -> f64 {
        let p = &self.params;
        p.omega_m() / (a * a * a)
            + p.omega_r() / (a * a * a * a)
            + p.omega_k / (a * a)
            + p.omega_de() * self.dark_energy_scaling(a)
    }

    /// `ρ_DE(a) / ρ_DE(1)` for `w(a) = w0 + wa (1 − a)`.
    fn dark_energy_scaling(&self, a: f64) -> f64 {
        let p = &self.params;
        libm::exp(-3.0 * (1.0 + p.w0 + p.wa) * libm::log(a) - 3.0 * p.wa * (1.0 - a))
    }

    /// `d ln E / d ln a`.
    fn dln_e_dln_a(&self, a: f64) -> f64 {
        let p = &self.params;
        let de_slope = -3.0 * (1.0 + p.w0 + p.wa) + 3.0 * p.wa * a;
        let derivative = -3.0 * p.omega_m() / (a * a * a)
            - 4.0 * p.omega_r() / (a * a * a * a)
            - 2.0 * p.omega_k / (a * a)
            + p.omega_de() * self.dark_energy_scaling(a) * de_slope;
        0.5 * derivative / self.e_squared(a)
    }

    fn tabulate_distance(&mut self) {
        // dχ/d ln a = −(c/H0) / (a E(a)), integrated from today backwards
        let integrand = |ln_a: f64| {
            let a = libm::exp(ln_a);
            1.0 / (a * self.h_over_h0(a))
        };
        let n = self.ln_a.len();
        let mut chi = vec![0.0; n];
        for i in (0..n - 1).rev() {
            let (lo, hi) = (self.ln_a[i], self.ln_a[i + 1]);
            let simpson =
                (hi - lo) / 6.0 * (integrand(lo) + 4.0 * integrand(0.5 * (lo + hi)) + integrand(hi));
            chi[i] = chi[i + 1] + simpson;
        }
        let scale = self.hubble_distance();
        let dchi: Vec<f64> = self.ln_a.iter().map(|&x| -scale * integrand(x)).collect();
        self.chi = chi.iter().map(|c| c * scale).collect();
        self.dchi = dchi;

        self.chi_increasing = self.chi.iter().rev().copied().collect();
        self.ln_a_of_chi = self.ln_a.iter().rev().copied().collect();
        self.dln_a_dchi = self.dchi.iter().rev().map(|d| 1.0 / d).collect();
    }

    /// Integrates `D'' + (2 + d ln E/d ln a) D' = 3/2 Ω_m(a) D` in `ln a`
    /// with RK4, starting on the growing mode of a matter plus radiation
    /// universe.
    fn tabulate_growth(&mut self) {
        let p = &self.params;
        let rhs = |ln_a: f64, state: [f64; 2]| -> [f64; 2] {
            let a = libm::exp(ln_a);
            let omega_m_a = p.omega_m() / (a * a * a) / self.e_squared(a);
            [
                state[1],
                1.5 * omega_m_a * state[0] - (2.0 + self.dln_e_dln_a(a)) * state[1],
            ]
        };

        // Meszaros solution D ∝ 1 + 3y/2 with y = a / a_eq
        let mut state = if p.omega_r() > 0.0 {
            let y = A_MIN * p.omega_m() / p.omega_r();
            [1.0 + 1.5 * y, 1.5 * y]
        } else {
            [A_MIN, A_MIN]
        };

        let n = self.ln_a.len();
        let mut growth = Vec::with_capacity(n);
        let mut derivative = Vec::with_capacity(n);
        growth.push(state[0]);
        derivative.push(state[1]);

        for i in 0..n - 1 {
            let x = self.ln_a[i];
            let h = self.ln_a[i + 1] - x;
            let k1 = rhs(x, state);
            let k2 = rhs(x + 0.5 * h, add_scaled(state, k1, 0.5 * h));
            let k3 = rhs(x + 0.5 * h, add_scaled(state, k2, 0.5 * h));
            let k4 = rhs(x + h, add_scaled(state, k3, h));
            for j in 0..2 {
                state[j] += h / 6.0 * (k1[j] + 2.0 * k2[j] + 2.0 * k3[j] + k4[j]);
            }
            growth.push(state[0]);
            derivative.push(state[1]);
        }

        let today = state[0];
        self.growth_rate = growth
            .iter()
            .zip(&derivative)
            .map(|(d, dp)| dp / d)
            .collect();
        self.growth = growth.iter().map(|d| d / today).collect();
        self.dgrowth = derivative.iter().map(|dp| dp / today).collect();
    }
}

fn add_scaled(state: [f64; 2], k: [f64; 2], h: f64) -> [f64; 2] {
    [state[0] + h * k[0], state[1] + h * k[1]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Matter-only universe, where every quantity has a closed form.
    fn einstein_de_sitter() -> Cosmology {
        let mut params = CosmologyParams::new(0.95, 0.05, 0.7, 0.96);
        params.t_cmb = 0.0;
        params.n_eff = 0.0;
        Cosmology::new(params).unwrap()
    }

    fn planck_like() -> Cosmology {
        Cosmology::new(CosmologyParams::new(0.26, 0.049, 0.677, 0.967)).unwrap()
    }

    #[test]
    fn test_einstein_de_sitter_closed_forms() {
        let cosmo = einstein_de_sitter();
        let dh = cosmo.hubble_distance();
        for a in [0.9, 0.5, 1.0 / 7.0, 0.01] {
            assert_relative_eq!(cosmo.h_over_h0(a), libm::pow(a, -1.5), max_relative = 1e-12);
            let chi = 2.0 * dh * (1.0 - a.sqrt());
            assert_relative_eq!(cosmo.comoving_radial_distance(a), chi, max_relative = 1e-9);
            assert_relative_eq!(cosmo.scale_factor_of_chi(chi), a, max_relative = 1e-8);
            assert_relative_eq!(cosmo.growth_factor(a), a, max_relative = 1e-6);
            assert_relative_eq!(cosmo.growth_rate(a), 1.0, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_distance_between_table_nodes() {
        let cosmo = einstein_de_sitter();
        let dh = cosmo.hubble_distance();
        // midpoints of the ln a grid, where linear interpolation is worst
        let step = -libm::log(A_MIN) / (N_TABLE - 1) as f64;
        for k in [1, 62, 1000, 4000] {
            let a = libm::exp(-(k as f64 + 0.5) * step);
            let chi = 2.0 * dh * (1.0 - a.sqrt());
            assert_relative_eq!(cosmo.comoving_radial_distance(a), chi, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_today() {
        let cosmo = planck_like();
        assert_relative_eq!(cosmo.h_over_h0(1.0), 1.0, max_relative = 1e-12);
        assert_eq!(cosmo.comoving_radial_distance(1.0), 0.0);
        assert_eq!(cosmo.scale_factor_of_chi(0.0), 1.0);
        assert_relative_eq!(cosmo.growth_factor(1.0), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_lambda_cdm_growth() {
        let cosmo = planck_like();
        let omega_m = cosmo.params().omega_m();
        // f ≈ Ω_m(a)^0.55 to better than a percent
        assert_relative_eq!(cosmo.growth_rate(1.0), libm::pow(omega_m, 0.55), max_relative = 1e-2);
        // Λ suppresses growth relative to matter domination
        assert!(cosmo.growth_factor(0.5) > 0.5);
        assert!(cosmo.growth_rate(0.2) > cosmo.growth_rate(1.0));
    }

    #[test]
    fn test_distance_to_redshift_one() {
        let cosmo = planck_like();
        // about 3400 Mpc for Planck-like parameters
        let chi = cosmo.comoving_radial_distance(0.5);
        assert!(chi > 3300.0 && chi < 3500.0, "χ(z=1) = {}", chi);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(Cosmology::new(CosmologyParams::new(0.25, 0.05, -0.7, 0.96)).is_err());
    }
}
