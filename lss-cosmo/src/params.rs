//! Cosmological parameters.

use lss_core::constants::{N_EFF_DEFAULT, OMEGA_GAMMA_H2, T_CMB_DEFAULT};
use lss_core::{config, LssError, LssResult};
use serde::Deserialize;
use std::path::Path;

/// Flat or curved w0–wa CDM with massless neutrinos.
///
/// Densities are today's fractions of the critical density. Dark energy
/// closes the budget: `Ω_Λ = 1 − Ω_m − Ω_r − Ω_k`.
///
/// ```yaml
/// cosmology:
///   omega_c: 0.25
///   omega_b: 0.05
///   h: 0.67
///   n_s: 0.96
///   sigma8: 0.81
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CosmologyParams {
    pub omega_c: f64,
    pub omega_b: f64,
    pub h: f64,
    pub n_s: f64,
    #[serde(default)]
    pub sigma8: Option<f64>,
    #[serde(default = "default_t_cmb")]
    pub t_cmb: f64,
    #[serde(default = "default_n_eff")]
    pub n_eff: f64,
    #[serde(default)]
    pub omega_k: f64,
    #[serde(default = "default_w0")]
    pub w0: f64,
    #[serde(default)]
    pub wa: f64,
}

fn default_t_cmb() -> f64 {
    T_CMB_DEFAULT
}

fn default_n_eff() -> f64 {
    N_EFF_DEFAULT
}

fn default_w0() -> f64 {
    -1.0
}

impl CosmologyParams {
    /// ΛCDM with the remaining parameters at their defaults.
    pub fn new(omega_c: f64, omega_b: f64, h: f64, n_s: f64) -> Self {
        Self {
            omega_c,
            omega_b,
            h,
            n_s,
            sigma8: None,
            t_cmb: T_CMB_DEFAULT,
            n_eff: N_EFF_DEFAULT,
            omega_k: 0.0,
            w0: -1.0,
            wa: 0.0,
        }
    }

    /// Reads and validates section `name` of the YAML file at `path`.
    pub fn from_config<P: AsRef<Path>>(path: P, name: &str) -> LssResult<Self> {
        let params: Self = config::load_section(path, name)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> LssResult<()> {
        let checks = [
            (self.h > 0.0, "h must be positive"),
            (self.omega_c >= 0.0, "omega_c must be non-negative"),
            (self.omega_b >= 0.0, "omega_b must be non-negative"),
            (self.t_cmb >= 0.0, "t_cmb must be non-negative"),
            (self.n_eff >= 0.0, "n_eff must be non-negative"),
            (self.omega_m() > 0.0, "omega_c + omega_b must be positive"),
        ];
        if let Some((_, reason)) = checks.iter().find(|(ok, _)| !ok) {
            return Err(LssError::config(format!("cosmology: {}", reason)));
        }
        let all = [
            self.omega_c,
            self.omega_b,
            self.h,
            self.n_s,
            self.t_cmb,
            self.n_eff,
            self.omega_k,
            self.w0,
            self.wa,
        ];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(LssError::config("cosmology: parameters must be finite"));
        }
        Ok(())
    }

    pub fn omega_m(&self) -> f64 {
        self.omega_c + self.omega_b
    }

    /// Photon density, scaled from `Ω_γ h²` at the reference temperature.
    pub fn omega_gamma(&self) -> f64 {
        OMEGA_GAMMA_H2 * libm::pow(self.t_cmb / T_CMB_DEFAULT, 4.0) / (self.h * self.h)
    }

    /// Massless neutrino density, `N_eff (7/8) (4/11)^{4/3} Ω_γ`.
    pub fn omega_nu(&self) -> f64 {
        self.n_eff * 7.0 / 8.0 * libm::pow(4.0 / 11.0, 4.0 / 3.0) * self.omega_gamma()
    }

    pub fn omega_r(&self) -> f64 {
        self.omega_gamma() + self.omega_nu()
    }

    pub fn omega_de(&self) -> f64 {
        1.0 - self.omega_m() - self.omega_r() - self.omega_k
    }
}
