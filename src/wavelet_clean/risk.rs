//! Fixed threshold selection by Stein's unbiased risk estimate ("rigrsure")

/// Threshold minimising the SURE risk of one detail band
///
/// With `s` the ascending squared coefficients, the risk of keeping the
/// `k` smallest below threshold is `(n - 2k + sum(s[..k])) / n`; the
/// threshold is `sqrt(s[k* - 1])` at the first minimum. An empty band
/// yields `0`.
pub fn rigrsure(coeffs: &[f64]) -> f64 {
    let n = coeffs.len();
    if n == 0 {
        return 0.0;
    }

    let mut squares: Vec<f64> = coeffs.iter().map(|c| c * c).collect();
    squares.sort_by(|a, b| a.total_cmp(b));

    let n_f = n as f64;
    let mut cumulative = 0.0;
    let mut best_risk = f64::INFINITY;
    let mut best_idx = 0;

    for (idx, &sq) in squares.iter().enumerate() {
        cumulative += sq;
        let k = (idx + 1) as f64;
        let risk = (n_f - 2.0 * k + cumulative) / n_f;
        // Strict comparison keeps the first minimum
        if risk < best_risk {
            best_risk = risk;
            best_idx = idx;
        }
    }

    squares[best_idx].sqrt()
}

/// Stateless estimator wrapper used by the pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskThresholdEstimator;

impl RiskThresholdEstimator {
    pub fn threshold(&self, coeffs: &[f64]) -> f64 {
        rigrsure(coeffs)
    }
}
