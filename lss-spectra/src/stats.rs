//! Covariance statistics and tracer pair labels.

use lss_core::{LssError, LssResult};
use nalgebra::{DMatrix, DVector};

/// `(d − m)ᵀ C⁻¹ (d − m)`.
pub fn get_chi_squared(data: &[f64], model: &[f64], covariance: &DMatrix<f64>) -> LssResult<f64> {
    ensure_square(covariance, "get_chi_squared covariance")?;
    LssError::ensure_same_len("get_chi_squared data/model", data.len(), model.len())?;
    LssError::ensure_same_len("get_chi_squared data/covariance", covariance.nrows(), data.len())?;

    let inverse = covariance
        .clone()
        .try_inverse()
        .ok_or_else(|| LssError::singular("get_chi_squared covariance"))?;
    let residual = DVector::from_iterator(data.len(), data.iter().zip(model).map(|(d, m)| d - m));
    Ok(residual.dot(&(&inverse * &residual)))
}

/// `C_ij / sqrt(C_ii C_jj)`. Non-positive diagonal entries give NaN or
/// infinite entries rather than an error.
pub fn get_correlation_matrix(covariance: &DMatrix<f64>) -> LssResult<DMatrix<f64>> {
    ensure_square(covariance, "get_correlation_matrix")?;
    Ok(DMatrix::from_fn(covariance.nrows(), covariance.ncols(), |i, j| {
        covariance[(i, j)] / (covariance[(i, i)] * covariance[(j, j)]).sqrt()
    }))
}

/// Labels of every pair `(values[i], values[j])` with `j ≥ i`, each pair
/// sorted alphabetically and joined with `join_with`.
///
/// `get_pairs(&["b", "a"], "")` gives `["bb", "ab", "aa"]`.
pub fn get_pairs<S: AsRef<str>>(values: &[S], join_with: &str) -> Vec<String> {
    values
        .iter()
        .enumerate()
        .flat_map(|(i, a)| {
            values[i..].iter().map(move |b| {
                let mut pair = [a.as_ref(), b.as_ref()];
                pair.sort_unstable();
                pair.join(join_with)
            })
        })
        .collect()
}

fn ensure_square(matrix: &DMatrix<f64>, context: &str) -> LssResult<()> {
    LssError::ensure_same_len(context, matrix.nrows(), matrix.ncols())
}
