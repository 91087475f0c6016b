//! Pseudo-Cl (MASTER) bandpower estimation.

use crate::alm::alm2cl;
use crate::binning::Binning;
use crate::field::Field;
use crate::workspace::CouplingWorkspace;
use lss_core::{LssError, LssResult};

/// Raw cross spectrum of two masked fields, ℓ = 0..=lmax.
pub fn compute_coupled_cell(field_a: &Field, field_b: &Field) -> LssResult<Vec<f64>> {
    alm2cl(field_a.alm(), field_b.alm())
}

/// Decoupled bandpowers of `field_a × field_b`, together with the coupling
/// workspace so it can be reused for other fields with the same masks.
pub fn compute_master(
    field_a: &Field,
    field_b: &Field,
    binning: &Binning,
) -> LssResult<(Vec<f64>, CouplingWorkspace)> {
    let workspace = CouplingWorkspace::compute(field_a, field_b, binning)?;
    let bandpowers = compute_master_with(&workspace, field_a, field_b)?;
    Ok((bandpowers, workspace))
}

/// Bandpowers using a previously computed workspace.
pub fn compute_master_with(
    workspace: &CouplingWorkspace,
    field_a: &Field,
    field_b: &Field,
) -> LssResult<Vec<f64>> {
    LssError::ensure_same_len("compute_master lmax", workspace.lmax(), field_a.lmax())?;
    let coupled = compute_coupled_cell(field_a, field_b)?;
    workspace.decouple_cell(&coupled, None)
}
