//! Squared Wigner 3j symbols with vanishing magnetic numbers.

use libm::lgamma;

/// `ln n!` for `n ≤ max`, evaluated once.
#[derive(Debug, Clone)]
pub struct Wigner3jTable {
    ln_factorial: Vec<f64>,
}

impl Wigner3jTable {
    /// Table valid for every `l1, l2, l3 ≤ lmax`.
    pub fn new(lmax: usize) -> Self {
        let ln_factorial = (0..=3 * lmax + 1)
            .map(|n| lgamma(n as f64 + 1.0))
            .collect();
        Self { ln_factorial }
    }

    /// `(l1 l2 l3; 0 0 0)²`.
    ///
    /// Zero unless the triangle condition holds and `l1 + l2 + l3` is even;
    /// otherwise
    /// `(J−2l1)!(J−2l2)!(J−2l3)!/(J+1)! · [g!/((g−l1)!(g−l2)!(g−l3)!)]²`
    /// with `J = 2g = l1 + l2 + l3`.
    pub fn squared(&self, l1: usize, l2: usize, l3: usize) -> f64 {
        let j = l1 + l2 + l3;
        if j % 2 == 1 || l3 > l1 + l2 || l3 < l1.abs_diff(l2) {
            return 0.0;
        }
        let g = j / 2;
        let f = &self.ln_factorial;

        let ln_delta = f[j - 2 * l1] + f[j - 2 * l2] + f[j - 2 * l3] - f[j + 1];
        let ln_ratio = f[g] - f[g - l1] - f[g - l2] - f[g - l3];
        (ln_delta + 2.0 * ln_ratio).exp()
    }
}
