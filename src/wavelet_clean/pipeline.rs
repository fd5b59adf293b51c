//! Denoising pipeline orchestration
//!
//! Runs decompose -> threshold -> shrink -> reconstruct for every channel.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::adaptive::{AdaptiveConfig, AdaptiveThresholdEstimator, EnergyNormalization};
use super::error::DenoiseError;
use super::families::FilterFamily;
use super::risk::RiskThresholdEstimator;
use super::shrink::ShrinkMode;
use super::transform::WaveletTransform;
use crate::signal::Signal;

/// Threshold estimation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Method {
    /// Rigrsure threshold per band
    Baseline,
    /// MAD noise scale with level and channel-energy scaling
    #[default]
    Adaptive,
}

/// Options that control a denoise run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DenoiseOptions {
    /// Wavelet family ("db4", "haar", ...)
    pub wavelet: FilterFamily,
    /// Decomposition depth
    pub levels: usize,
    /// Threshold estimator
    pub method: Method,
    /// Shrinkage rule for detail coefficients
    pub shrink: ShrinkMode,
    /// Energy reference for the adaptive estimator
    pub energy_normalization: EnergyNormalization,
    /// Adaptive estimator constants
    pub adaptive: AdaptiveConfig,
    /// Process channels concurrently (needs the `parallel` feature)
    pub parallel: bool,
}

impl Default for DenoiseOptions {
    fn default() -> Self {
        Self {
            wavelet: FilterFamily::Daubechies(4),
            levels: 5,
            method: Method::Adaptive,
            shrink: ShrinkMode::Hard,
            energy_normalization: EnergyNormalization::PerChannel,
            adaptive: AdaptiveConfig::default(),
            parallel: false,
        }
    }
}

impl DenoiseOptions {
    pub fn baseline(wavelet: FilterFamily, levels: usize) -> Self {
        Self {
            wavelet,
            levels,
            method: Method::Baseline,
            ..Self::default()
        }
    }

    pub fn adaptive(wavelet: FilterFamily, levels: usize) -> Self {
        Self {
            wavelet,
            levels,
            method: Method::Adaptive,
            ..Self::default()
        }
    }
}

/// Threshold applied to one detail band
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelReport {
    pub level: usize,
    pub threshold: f64,
    pub coefficients: usize,
    pub zeroed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelReport {
    pub channel: usize,
    /// Mean-square amplitude of the input channel
    pub energy: f64,
    pub levels: Vec<LevelReport>,
}

/// Per-channel, per-level summary of a denoise run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DenoiseReport {
    pub method: Method,
    pub wavelet: FilterFamily,
    pub levels: usize,
    pub channels: Vec<ChannelReport>,
}

enum Estimator {
    Risk(RiskThresholdEstimator),
    Adaptive(AdaptiveThresholdEstimator),
}

impl Estimator {
    fn threshold(&self, coeffs: &[f64], channel_energy: f64, level: usize) -> f64 {
        match self {
            Estimator::Risk(est) => est.threshold(coeffs),
            Estimator::Adaptive(est) => est.threshold(coeffs, channel_energy, level),
        }
    }
}

/// Everything a channel needs, shared read-only across channels
struct ChannelJob<'a> {
    transform: &'a WaveletTransform,
    estimator: &'a Estimator,
    shrink: ShrinkMode,
    levels: usize,
}

impl ChannelJob<'_> {
    fn run(&self, channel: usize, samples: Vec<f64>, energy: f64) -> Result<(Vec<f64>, ChannelReport), DenoiseError> {
        let mut coeffs = self.transform.decompose(&samples, self.levels)?;

        let mut levels = Vec::with_capacity(self.levels);
        for (level, band) in coeffs.details_mut() {
            let threshold = self.estimator.threshold(band, energy, level);
            let zeroed = self.shrink.apply_in_place(band, threshold);
            levels.push(LevelReport {
                level,
                threshold,
                coefficients: band.len(),
                zeroed,
            });
        }

        let mut denoised = self.transform.reconstruct(&coeffs)?;
        denoised.truncate(coeffs.signal_len());

        log::debug!(
            "Channel {}: thresholds {:?}",
            channel,
            levels.iter().map(|l| l.threshold).collect::<Vec<_>>()
        );

        Ok((denoised, ChannelReport { channel, energy, levels }))
    }
}

/// Reject input the engine cannot process, before any work is done
fn validate(signal: &Signal) -> Result<(), DenoiseError> {
    if signal.n_channels() == 0 || signal.n_samples() == 0 {
        return Err(DenoiseError::EmptySignal);
    }
    if let Some(((channel, index), _)) = signal.data().indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(DenoiseError::NonFiniteSample { channel, index });
    }
    Ok(())
}

/// Denoise every channel of `signal`, returning a new signal of the same shape
pub fn denoise(signal: &Signal, options: &DenoiseOptions) -> Result<Signal, DenoiseError> {
    denoise_with_report(signal, options).map(|(denoised, _)| denoised)
}

/// Like [`denoise`], also returning the thresholds used per channel and level
pub fn denoise_with_report(
    signal: &Signal,
    options: &DenoiseOptions,
) -> Result<(Signal, DenoiseReport), DenoiseError> {
    validate(signal)?;

    let transform = WaveletTransform::new(options.wavelet)?;
    transform.validate_levels(signal.n_samples(), options.levels)?;

    // Energies come from the original samples, before decomposition
    let energies: Vec<f64> = signal
        .channels()
        .map(|ch| ch.mapv(|v| v * v).mean().unwrap_or(0.0))
        .collect();

    let estimator = match options.method {
        Method::Baseline => Estimator::Risk(RiskThresholdEstimator),
        Method::Adaptive => Estimator::Adaptive(AdaptiveThresholdEstimator::for_channel_energies(
            options.adaptive,
            options.energy_normalization,
            &energies,
        )),
    };

    log::info!(
        "Denoising {} channels x {} samples ({:?}, {}, {} levels)",
        signal.n_channels(),
        signal.n_samples(),
        options.method,
        options.wavelet,
        options.levels
    );

    let job = ChannelJob {
        transform: &transform,
        estimator: &estimator,
        shrink: options.shrink,
        levels: options.levels,
    };

    let results = run_channels(signal, &energies, &job, options.parallel)?;

    let n_samples = signal.n_samples();
    let mut out = Array2::<f64>::zeros((signal.n_channels(), n_samples));
    let mut channels = Vec::with_capacity(results.len());
    for (idx, (samples, report)) in results.into_iter().enumerate() {
        debug_assert_eq!(samples.len(), n_samples);
        out.row_mut(idx).assign(&Array1::from(samples));
        channels.push(report);
    }

    let denoised = signal.with_data(out);
    let report = DenoiseReport {
        method: options.method,
        wavelet: options.wavelet,
        levels: options.levels,
        channels,
    };
    Ok((denoised, report))
}

fn run_channels(
    signal: &Signal,
    energies: &[f64],
    job: &ChannelJob<'_>,
    parallel: bool,
) -> Result<Vec<(Vec<f64>, ChannelReport)>, DenoiseError> {
    let process = |idx: usize| {
        let samples = signal.data().row(idx).to_vec();
        job.run(idx, samples, energies[idx])
    };

    #[cfg(feature = "parallel")]
    if parallel {
        use rayon::prelude::*;
        return (0..signal.n_channels()).into_par_iter().map(process).collect();
    }

    #[cfg(not(feature = "parallel"))]
    if parallel {
        log::warn!("Parallel denoising requested but the `parallel` feature is disabled; running sequentially");
    }

    (0..signal.n_channels()).map(process).collect()
}
