//! Controlled evaluation of the denoising methods
//!
//! A clean recording segment is corrupted with synthetic mains hum and
//! baseline drift, denoised with both estimators, and scored against the
//! clean reference.

pub mod metrics;
pub mod noise;
pub mod spectrum;
pub mod summary;

use serde::{Deserialize, Serialize};

use crate::signal::Signal;
use crate::wavelet_clean::{denoise, DenoiseError, DenoiseOptions, FilterFamily, Method};

pub use metrics::{correlation, rmse, snr_db};
pub use noise::{add_baseline_wander, add_line_noise};
pub use spectrum::{detect_mains_frequency, line_noise_power, line_noise_ratio};
pub use summary::{summarize, PairedTest, Stat, WaveletSummary};

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("Signal has zero variance; correlation is undefined")]
    ZeroVariance,
    #[error("Signal is empty")]
    Empty,
    #[error("FFT failed: {0}")]
    Fft(String),
    #[error("Denoising failed: {0}")]
    Denoise(#[from] DenoiseError),
}

/// Corruption and comparison settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvaluationConfig {
    /// Length of the centred segment used as ground truth
    pub segment_secs: f64,
    /// Target SNR of the injected mains hum
    pub snr_db: f64,
    /// Mains frequency; `None` detects 50 vs 60 Hz from the recording
    pub line_freq: Option<f64>,
    pub drift_freq: f64,
    pub drift_ratio: f64,
    /// Wavelets compared, each with both methods
    pub wavelets: Vec<FilterFamily>,
    pub levels: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            segment_secs: 10.0,
            snr_db: 10.0,
            line_freq: Some(50.0),
            drift_freq: 0.3,
            drift_ratio: 0.05,
            wavelets: vec![FilterFamily::Daubechies(4), FilterFamily::DiscreteMeyer],
            levels: 5,
        }
    }
}

/// Scores of one wavelet on one recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub wavelet: FilterFamily,
    pub noisy_snr: f64,
    pub baseline_snr: f64,
    pub adaptive_snr: f64,
    pub noisy_rmse: f64,
    pub baseline_rmse: f64,
    pub adaptive_rmse: f64,
    pub noisy_corr: f64,
    pub baseline_corr: f64,
    pub adaptive_corr: f64,
    /// Share of spectral power at the mains frequency, before and after
    pub noisy_line_ratio: f64,
    pub baseline_line_ratio: f64,
    pub adaptive_line_ratio: f64,
}

impl EvaluationReport {
    /// Adaptive minus baseline SNR in dB
    pub fn snr_improvement(&self) -> f64 {
        self.adaptive_snr - self.baseline_snr
    }

    /// Correlation lost by each method relative to the noisy input,
    /// `(baseline, adaptive)`; negative values are gains
    pub fn correlation_loss(&self) -> (f64, f64) {
        (
            self.noisy_corr - self.baseline_corr,
            self.noisy_corr - self.adaptive_corr,
        )
    }
}

/// Score the two denoised versions of `noisy` against `clean`
pub fn evaluate(
    wavelet: FilterFamily,
    line_freq: f64,
    clean: &Signal,
    noisy: &Signal,
    baseline: &Signal,
    adaptive: &Signal,
) -> Result<EvaluationReport, EvalError> {
    Ok(EvaluationReport {
        wavelet,
        noisy_snr: snr_db(clean, noisy)?,
        baseline_snr: snr_db(clean, baseline)?,
        adaptive_snr: snr_db(clean, adaptive)?,
        noisy_rmse: rmse(clean, noisy)?,
        baseline_rmse: rmse(clean, baseline)?,
        adaptive_rmse: rmse(clean, adaptive)?,
        noisy_corr: correlation(clean, noisy)?,
        baseline_corr: correlation(clean, baseline)?,
        adaptive_corr: correlation(clean, adaptive)?,
        noisy_line_ratio: line_noise_ratio(noisy, line_freq)?,
        baseline_line_ratio: line_noise_ratio(baseline, line_freq)?,
        adaptive_line_ratio: line_noise_ratio(adaptive, line_freq)?,
    })
}

/// Mains frequency for a recording: configured, or detected from channel 0
pub fn resolve_line_freq(recording: &Signal, config: &EvaluationConfig) -> f64 {
    if let Some(freq) = config.line_freq {
        return freq;
    }
    match recording.channel(0) {
        Some(channel) => detect_mains_frequency(&channel.to_vec(), recording.sample_rate()),
        None => spectrum::DEFAULT_MAINS_HZ,
    }
}

/// Corrupt the middle segment of `recording` and score every configured wavelet
///
/// `base` supplies the shrink rule, energy normalisation and adaptive
/// constants; wavelet, depth and method come from `config`.
pub fn run_evaluation(
    recording: &Signal,
    config: &EvaluationConfig,
    base: &DenoiseOptions,
) -> Result<Vec<EvaluationReport>, EvalError> {
    let clean = recording.middle_segment(config.segment_secs);
    if clean.is_empty() {
        return Err(EvalError::Empty);
    }

    let line_freq = resolve_line_freq(recording, config);
    log::info!(
        "Evaluating {} channels x {} samples: {} Hz hum at {} dB SNR, drift {} Hz x {}",
        clean.n_channels(),
        clean.n_samples(),
        line_freq,
        config.snr_db,
        config.drift_freq,
        config.drift_ratio
    );

    let noisy = add_line_noise(&clean, line_freq, config.snr_db);
    let noisy = add_baseline_wander(&noisy, config.drift_freq, config.drift_ratio);

    let mut reports = Vec::with_capacity(config.wavelets.len());
    for &wavelet in &config.wavelets {
        let options = |method| DenoiseOptions {
            wavelet,
            levels: config.levels,
            method,
            ..base.clone()
        };

        let baseline = denoise(&noisy, &options(Method::Baseline))?;
        let adaptive = denoise(&noisy, &options(Method::Adaptive))?;

        let report = evaluate(wavelet, line_freq, &clean, &noisy, &baseline, &adaptive)?;
        log::info!(
            "{}: SNR baseline {:.3} dB, adaptive {:.3} dB",
            wavelet,
            report.baseline_snr,
            report.adaptive_snr
        );
        reports.push(report);
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording(seconds: usize) -> Signal {
        let sr = 250.0;
        let n = seconds * 250;
        let channels = (0..2)
            .map(|ch| {
                (0..n)
                    .map(|i| {
                        let t = i as f64 / sr;
                        let alpha = (2.0 * std::f64::consts::PI * 10.0 * t).sin() * 30.0;
                        let theta = (2.0 * std::f64::consts::PI * 6.0 * t + ch as f64).sin() * 15.0;
                        alpha + theta
                    })
                    .collect::<Vec<f64>>()
            })
            .collect();
        Signal::from_channels(channels, sr).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = EvaluationConfig::default();
        assert_eq!(config.segment_secs, 10.0);
        assert_eq!(config.line_freq, Some(50.0));
        assert_eq!(
            config.wavelets,
            vec![FilterFamily::Daubechies(4), FilterFamily::DiscreteMeyer]
        );
    }

    #[test]
    fn test_run_evaluation() {
        let config = EvaluationConfig {
            segment_secs: 4.0,
            wavelets: vec![FilterFamily::Daubechies(4), FilterFamily::Haar],
            ..EvaluationConfig::default()
        };
        let reports = run_evaluation(&recording(20), &config, &DenoiseOptions::default()).unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].wavelet, FilterFamily::Haar);
        for report in &reports {
            assert!((report.noisy_snr - 10.0).abs() < 1.0, "noisy SNR {}", report.noisy_snr);
            assert!(report.baseline_snr.is_finite());
            assert!(report.adaptive_snr.is_finite());
            assert!((-1.0..=1.0).contains(&report.baseline_corr));
            assert!((-1.0..=1.0).contains(&report.adaptive_corr));
            assert!(report.noisy_line_ratio > 0.0);
            assert!(report.noisy_rmse > 0.0);
            assert!(report.noisy_corr > 0.0 && report.noisy_corr < 1.0);
        }
    }

    #[test]
    fn test_too_short_for_depth() {
        let config = EvaluationConfig {
            segment_secs: 0.1,
            ..EvaluationConfig::default()
        };
        let err = run_evaluation(&recording(2), &config, &DenoiseOptions::default()).unwrap_err();
        assert!(matches!(err, EvalError::Denoise(DenoiseError::InvalidLevel { .. })));
    }
}
