//! Angular power spectra of masked HEALPix maps.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`alm`] | [`Alm`] coefficients, [`alm2cl`] |
//! | [`sht`] | [`map2alm`], [`alm2map`] on RING maps |
//! | [`wigner`] | Squared `(l1 l2 l3; 0 0 0)` symbols |
//! | [`binning`] | [`Binning`] bandpowers, [`BinningConfig`] |
//! | [`field`] | [`Field`]: a masked map in harmonic space |
//! | [`workspace`] | [`CouplingWorkspace`]: mode coupling and decoupling |
//! | [`master`] | [`compute_master`], [`compute_coupled_cell`] |
//! | [`stats`] | [`get_chi_squared`], [`get_correlation_matrix`], [`get_pairs`] |
//!
//! ```no_run
//! use lss_maps::{Mask, Nside};
//! use lss_spectra::{compute_master, Binning, Field, DEFAULT_N_ITER};
//!
//! # fn main() -> lss_core::LssResult<()> {
//! let nside = Nside::new(64)?;
//! let mask = Mask::ones(nside);
//! let delta = vec![0.0; nside.npix()];
//! let field = Field::new(&mask, &delta, DEFAULT_N_ITER)?;
//! let binning = Binning::linear(nside, 16)?;
//! let (bandpowers, workspace) = compute_master(&field, &field, &binning)?;
//! # let _ = (bandpowers, workspace);
//! # Ok(())
//! # }
//! ```

pub mod alm;
pub mod binning;
pub mod field;
pub mod master;
pub mod sht;
pub mod stats;
pub mod wigner;
pub mod workspace;

pub use alm::{alm2cl, Alm};
pub use binning::{Band, Binning, BinningConfig};
pub use field::Field;
pub use master::{compute_coupled_cell, compute_master, compute_master_with};
pub use sht::{alm2map, map2alm, DEFAULT_N_ITER};
pub use stats::{get_chi_squared, get_correlation_matrix, get_pairs};
pub use wigner::Wigner3jTable;
pub use workspace::CouplingWorkspace;
