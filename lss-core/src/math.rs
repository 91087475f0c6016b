//! Small numerical helpers shared by the map, spectrum and cosmology crates.
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`linspace`] | `n` evenly spaced samples over a closed interval |
//! | [`histogram`] | Equal-width histogram over the observed range |
//! | [`bin_centers`] | Midpoints of consecutive bin edges |
//! | [`interp`] | Piecewise-linear interpolation, clamped at the ends |
//! | [`interp_hermite`] | Cubic Hermite interpolation with known slopes |

use crate::errors::{LssError, LssResult, MathErrorKind};

/// Returns `n` evenly spaced samples over `[start, stop]`, endpoints included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            values[n - 1] = stop;
            values
        }
    }
}

/// Histogram of `values` into `n_bins` equal-width bins over `[min, max]`.
///
/// Bins are half-open except the last one, which also holds `max`. A
/// degenerate range widens to `[min - 0.5, max + 0.5]` and an empty input
/// uses `[0, 1]`. Returns `(counts, edges)` with `edges.len() == n_bins + 1`.
pub fn histogram(values: &[f64], n_bins: usize) -> LssResult<(Vec<u64>, Vec<f64>)> {
    if n_bins == 0 {
        return Err(LssError::math_error(
            "histogram",
            MathErrorKind::InvalidInput,
            "number of bins must be positive",
        ));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(LssError::math_error(
            "histogram",
            MathErrorKind::NotFinite,
            "range of values is not finite",
        ));
    }

    let (mut lo, mut hi) = if values.is_empty() {
        (0.0, 1.0)
    } else {
        values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    };
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let edges = linspace(lo, hi, n_bins + 1);
    let mut counts = vec![0u64; n_bins];
    let scale = n_bins as f64 / (hi - lo);

    for &v in values {
        let mut idx = (((v - lo) * scale) as usize).min(n_bins - 1);
        if v < edges[idx] && idx > 0 {
            idx -= 1;
        } else if idx + 1 < n_bins && v >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }

    Ok((counts, edges))
}

/// Midpoints between consecutive edges.
pub fn bin_centers(edges: &[f64]) -> Vec<f64> {
    edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
}

/// Linear interpolation of `(xp, fp)` at `x`; `xp` must be increasing.
///
/// Values outside the sampled range take the nearest endpoint value.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return f64::NAN;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }

    let upper = xp[..n].partition_point(|&v| v <= x).min(n - 1);
    let lower = upper - 1;
    let span = xp[upper] - xp[lower];
    if span == 0.0 {
        return fp[lower];
    }
    let t = (x - xp[lower]) / span;
    fp[lower] + t * (fp[upper] - fp[lower])
}

/// Cubic Hermite interpolation of `(xp, fp)` with slopes `dfp` at `x`;
/// `xp` must be increasing. Clamped like [`interp`].
pub fn interp_hermite(x: f64, xp: &[f64], fp: &[f64], dfp: &[f64]) -> f64 {
    let n = xp.len().min(fp.len()).min(dfp.len());
    if n == 0 {
        return f64::NAN;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }

    let upper = xp[..n].partition_point(|&v| v <= x).min(n - 1);
    let lower = upper - 1;
    let span = xp[upper] - xp[lower];
    if span == 0.0 {
        return fp[lower];
    }
    let t = (x - xp[lower]) / span;
    let (t2, t3) = (t * t, t * t * t);
    (2.0 * t3 - 3.0 * t2 + 1.0) * fp[lower]
        + (t3 - 2.0 * t2 + t) * span * dfp[lower]
        + (-2.0 * t3 + 3.0 * t2) * fp[upper]
        + (t3 - t2) * span * dfp[upper]
}
