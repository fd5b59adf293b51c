//! Signal quality metrics against a clean reference
//!
//! All metrics flatten every channel into one sequence.

use ndarray::Array2;

use super::EvalError;
use crate::signal::Signal;

fn check_shapes(clean: &Signal, other: &Signal) -> Result<(), EvalError> {
    if !clean.same_shape(other) {
        return Err(EvalError::ShapeMismatch {
            expected: clean.data().dim(),
            found: other.data().dim(),
        });
    }
    if clean.is_empty() {
        return Err(EvalError::Empty);
    }
    Ok(())
}

fn mean_square(data: &Array2<f64>) -> f64 {
    data.mapv(|v| v * v).mean().unwrap_or(0.0)
}

/// `10 log10(P_clean / P_error)` in dB; infinite when `other == clean`
pub fn snr_db(clean: &Signal, other: &Signal) -> Result<f64, EvalError> {
    check_shapes(clean, other)?;
    let signal_power = mean_square(clean.data());
    let noise_power = mean_square(&(clean.data() - other.data()));
    if noise_power == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(10.0 * (signal_power / noise_power).log10())
}

/// Root-mean-square error
pub fn rmse(clean: &Signal, other: &Signal) -> Result<f64, EvalError> {
    check_shapes(clean, other)?;
    Ok(mean_square(&(clean.data() - other.data())).sqrt())
}

/// Pearson correlation coefficient, clamped to [-1, 1]
pub fn correlation(clean: &Signal, other: &Signal) -> Result<f64, EvalError> {
    check_shapes(clean, other)?;

    let n = clean.data().len() as f64;
    let mean_a = clean.data().sum() / n;
    let mean_b = other.data().sum() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&a, &b) in clean.data().iter().zip(other.data().iter()) {
        let da = a - mean_a;
        let db = b - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return Err(EvalError::ZeroVariance);
    }
    Ok((cov / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(values: Vec<f64>) -> Signal {
        Signal::from_channels(vec![values], 100.0).unwrap()
    }

    #[test]
    fn test_snr() {
        let clean = signal(vec![1.0, -1.0, 1.0, -1.0]);
        let noisy = signal(vec![1.1, -0.9, 1.1, -0.9]);
        // P_clean = 1, P_err = 0.01 -> 20 dB
        assert!((snr_db(&clean, &noisy).unwrap() - 20.0).abs() < 1e-9);
        assert_eq!(snr_db(&clean, &clean).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_rmse() {
        let clean = signal(vec![0.0, 0.0, 0.0, 0.0]);
        let other = signal(vec![2.0, -2.0, 2.0, -2.0]);
        assert_eq!(rmse(&clean, &other).unwrap(), 2.0);
    }

    #[test]
    fn test_correlation() {
        let a = signal(vec![1.0, 2.0, 3.0, 4.0]);
        let b = signal(vec![2.0, 4.0, 6.0, 8.0]);
        let c = signal(vec![4.0, 3.0, 2.0, 1.0]);
        assert!((correlation(&a, &b).unwrap() - 1.0).abs() < 1e-12);
        assert!((correlation(&a, &c).unwrap() + 1.0).abs() < 1e-12);

        let flat = signal(vec![1.0; 4]);
        assert!(matches!(correlation(&a, &flat), Err(EvalError::ZeroVariance)));
    }

    #[test]
    fn test_shape_mismatch() {
        let a = signal(vec![1.0, 2.0]);
        let b = signal(vec![1.0, 2.0, 3.0]);
        assert!(matches!(rmse(&a, &b), Err(EvalError::ShapeMismatch { .. })));
    }
}
