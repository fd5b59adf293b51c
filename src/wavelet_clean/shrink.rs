//! Hard and soft coefficient shrinkage

use serde::{Deserialize, Serialize};

/// Shrinkage rule applied to detail coefficients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShrinkMode {
    /// Keep values with `|v| >= T`, zero the rest
    #[default]
    Hard,
    /// Shrink every value toward zero by `T`
    Soft,
}

impl ShrinkMode {
    /// Shrink `coeffs` in place, returning how many became zero
    pub fn apply_in_place(&self, coeffs: &mut [f64], threshold: f64) -> usize {
        match self {
            ShrinkMode::Hard => hard_in_place(coeffs, threshold),
            ShrinkMode::Soft => soft_in_place(coeffs, threshold),
        }
    }

    pub fn apply(&self, coeffs: &[f64], threshold: f64) -> Vec<f64> {
        let mut out = coeffs.to_vec();
        self.apply_in_place(&mut out, threshold);
        out
    }
}

#[inline]
fn hard_value(v: f64, threshold: f64) -> f64 {
    if v.abs() >= threshold {
        v
    } else {
        0.0
    }
}

#[inline]
fn soft_value(v: f64, threshold: f64) -> f64 {
    let magnitude = (v.abs() - threshold).max(0.0);
    if magnitude == 0.0 {
        0.0
    } else {
        v.signum() * magnitude
    }
}

/// Hard thresholding: `v` if `|v| >= T`, else `0`
pub fn hard(coeffs: &[f64], threshold: f64) -> Vec<f64> {
    coeffs.iter().map(|&v| hard_value(v, threshold)).collect()
}

/// Soft thresholding: `sign(v) * max(|v| - T, 0)`
pub fn soft(coeffs: &[f64], threshold: f64) -> Vec<f64> {
    coeffs.iter().map(|&v| soft_value(v, threshold)).collect()
}

pub fn hard_in_place(coeffs: &mut [f64], threshold: f64) -> usize {
    let mut zeroed = 0;
    for c in coeffs.iter_mut() {
        if *c != 0.0 && c.abs() < threshold {
            zeroed += 1;
        }
        *c = hard_value(*c, threshold);
    }
    zeroed
}

pub fn soft_in_place(coeffs: &mut [f64], threshold: f64) -> usize {
    let mut zeroed = 0;
    for c in coeffs.iter_mut() {
        let shrunk = soft_value(*c, threshold);
        if *c != 0.0 && shrunk == 0.0 {
            zeroed += 1;
        }
        *c = shrunk;
    }
    zeroed
}
