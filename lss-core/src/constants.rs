#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const PI: f64 = 3.141592653589793238462643;

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const HALF_PI: f64 = 1.5707963267948966192313216;

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const TWOPI: f64 = 6.283185307179586476925287;

#[allow(clippy::excessive_precision)]
pub const FOUR_PI: f64 = 12.56637061435917295385057;

#[allow(clippy::excessive_precision)]
pub const DEG_TO_RAD: f64 = 1.745329251994329576923691e-2;

#[allow(clippy::excessive_precision)]
pub const RAD_TO_DEG: f64 = 57.29577951308232087679815;

/// Speed of light divided by 100 km/s, in Mpc. `c / H0 = CLIGHT_HMPC / h`.
pub const CLIGHT_HMPC: f64 = 2997.92458;

/// HEALPix sentinel for pixels without a defined value.
pub const UNSEEN: f64 = -1.6375e30;

/// Reference CMB temperature in Kelvin.
pub const T_CMB_DEFAULT: f64 = 2.7255;

/// Physical photon density `Ω_γ h²` at [`T_CMB_DEFAULT`].
pub const OMEGA_GAMMA_H2: f64 = 2.47282e-5;

/// Effective number of relativistic neutrino species in the standard model.
pub const N_EFF_DEFAULT: f64 = 3.046;
