//! Channel- and level-adaptive threshold estimation
//!
//! `T = gamma * alpha * beta * sigma` where
//! - `sigma = median(|c|) / 0.6745` is a robust (MAD) noise scale,
//! - `alpha = 1 + 0.05 * level` grows mildly with decomposition depth,
//! - `beta = channel_energy / reference_energy` normalises channel energy,
//! - `gamma = 0.4` damps the whole threshold to avoid over-smoothing.

use serde::{Deserialize, Serialize};

/// How the energy factor `beta` is referenced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnergyNormalization {
    /// Reference is the median of the channel's own energy, so `beta == 1`
    #[default]
    PerChannel,
    /// Reference is the median energy over all channels of the signal
    CrossChannel,
}

/// Tunable constants of the adaptive estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdaptiveConfig {
    /// MAD-to-sigma divisor for Gaussian noise
    pub mad_scale: f64,
    /// Global damping factor
    pub gamma: f64,
    /// Per-level increase of `alpha`
    pub level_slope: f64,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            mad_scale: AdaptiveThresholdEstimator::MAD_SCALE,
            gamma: AdaptiveThresholdEstimator::GAMMA,
            level_slope: AdaptiveThresholdEstimator::LEVEL_SLOPE,
        }
    }
}

/// Median of `values`, averaging the middle pair for even lengths
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Mean squared amplitude
pub fn mean_square(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveThresholdEstimator {
    config: AdaptiveConfig,
    /// Cross-channel reference energy; `None` references each channel to itself
    reference_energy: Option<f64>,
}

impl Default for AdaptiveThresholdEstimator {
    fn default() -> Self {
        Self::new(AdaptiveConfig::default())
    }
}

impl AdaptiveThresholdEstimator {
    pub const MAD_SCALE: f64 = 0.6745;
    pub const GAMMA: f64 = 0.4;
    pub const LEVEL_SLOPE: f64 = 0.05;

    /// Estimator normalising each channel against its own energy
    pub fn new(config: AdaptiveConfig) -> Self {
        Self {
            config,
            reference_energy: None,
        }
    }

    /// Estimator for a whole signal given every channel's energy
    pub fn for_channel_energies(
        config: AdaptiveConfig,
        normalization: EnergyNormalization,
        energies: &[f64],
    ) -> Self {
        let reference_energy = match normalization {
            EnergyNormalization::PerChannel => None,
            EnergyNormalization::CrossChannel => Some(median(energies).unwrap_or(0.0)),
        };
        Self {
            config,
            reference_energy,
        }
    }

    pub fn config(&self) -> &AdaptiveConfig {
        &self.config
    }

    pub fn reference_energy(&self) -> Option<f64> {
        self.reference_energy
    }

    /// Robust noise scale of a band
    pub fn noise_sigma(&self, coeffs: &[f64]) -> f64 {
        let abs: Vec<f64> = coeffs.iter().map(|c| c.abs()).collect();
        median(&abs).map_or(0.0, |m| m / self.config.mad_scale)
    }

    /// `alpha`, strictly increasing in `level` for a positive slope
    pub fn level_factor(&self, level: usize) -> f64 {
        1.0 + self.config.level_slope * level as f64
    }

    /// `beta`, or `None` when the reference energy is zero or not finite
    pub fn energy_factor(&self, channel_energy: f64) -> Option<f64> {
        let reference = match self.reference_energy {
            Some(reference) => reference,
            // Median of the single value is the value itself
            None => channel_energy,
        };
        if reference == 0.0 || !reference.is_finite() || !channel_energy.is_finite() {
            return None;
        }
        Some(channel_energy / reference)
    }

    /// Threshold for detail band `level` of a channel with mean-square `channel_energy`
    pub fn threshold(&self, coeffs: &[f64], channel_energy: f64, level: usize) -> f64 {
        if coeffs.is_empty() {
            return 0.0;
        }

        let sigma = self.noise_sigma(coeffs);
        let alpha = self.level_factor(level);
        let beta = match self.energy_factor(channel_energy) {
            Some(beta) => beta,
            None => {
                log::trace!("Degenerate channel energy {}; threshold set to 0", channel_energy);
                return 0.0;
            }
        };

        let t = self.config.gamma * alpha * beta * sigma;
        if t.is_finite() {
            t.max(0.0)
        } else {
            0.0
        }
    }
}

/// Adaptive threshold with the default constants and per-channel energy reference
pub fn adaptive_threshold(coeffs: &[f64], channel_energy: f64, level: usize) -> f64 {
    AdaptiveThresholdEstimator::default().threshold(coeffs, channel_energy, level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0]), Some(3.0));
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_degenerate_energy_matches_formula() {
        let c = [0.5, -1.5, 2.0, -0.25, 1.0];
        // median(|c|) = 1.0
        let sigma = 1.0 / 0.6745;
        for level in 1..=6 {
            let t = adaptive_threshold(&c, 12.3, level);
            let expected = 0.4 * (1.0 + 0.05 * level as f64) * sigma;
            assert_eq!(t, expected, "level {}", level);
        }
    }

    #[test]
    fn test_beta_is_one_per_channel() {
        let est = AdaptiveThresholdEstimator::default();
        for energy in [1e-9, 0.7, 42.0, 1e6] {
            assert_eq!(est.energy_factor(energy), Some(1.0));
        }
    }

    #[test]
    fn test_level_factor_strictly_increasing() {
        let est = AdaptiveThresholdEstimator::default();
        let c = [1.0, -2.0, 0.5, 3.0];
        let mut prev = est.threshold(&c, 1.0, 0);
        for level in 1..10 {
            assert!(est.level_factor(level) > est.level_factor(level - 1));
            let t = est.threshold(&c, 1.0, level);
            assert!(t > prev);
            prev = t;
        }
    }

    #[test]
    fn test_zero_inputs_give_zero() {
        assert_eq!(adaptive_threshold(&[], 1.0, 1), 0.0);
        assert_eq!(adaptive_threshold(&[0.0; 8], 1.0, 3), 0.0);
        // All-zero channel: 0 / 0 energy ratio is guarded
        assert_eq!(adaptive_threshold(&[1.0, 2.0], 0.0, 1), 0.0);
        assert_eq!(adaptive_threshold(&[1.0, 2.0], f64::NAN, 1), 0.0);
    }

    #[test]
    fn test_cross_channel_normalization() {
        let energies = [1.0, 2.0, 4.0];
        let est = AdaptiveThresholdEstimator::for_channel_energies(
            AdaptiveConfig::default(),
            EnergyNormalization::CrossChannel,
            &energies,
        );
        assert_eq!(est.reference_energy(), Some(2.0));
        assert_eq!(est.energy_factor(4.0), Some(2.0));
        assert_eq!(est.energy_factor(1.0), Some(0.5));

        let c = [1.0, -1.0, 1.0];
        let louder = est.threshold(&c, 4.0, 2);
        let quieter = est.threshold(&c, 1.0, 2);
        assert!((louder - 4.0 * quieter).abs() < 1e-12);

        let silent = AdaptiveThresholdEstimator::for_channel_energies(
            AdaptiveConfig::default(),
            EnergyNormalization::CrossChannel,
            &[0.0, 0.0, 3.0],
        );
        assert_eq!(silent.threshold(&c, 3.0, 1), 0.0);
    }

    #[test]
    fn test_custom_constants() {
        let est = AdaptiveThresholdEstimator::new(AdaptiveConfig {
            mad_scale: 1.0,
            gamma: 1.0,
            level_slope: 0.0,
        });
        assert_eq!(est.threshold(&[2.0, -2.0, 2.0], 5.0, 7), 2.0);
    }
}
