//! Denoise one recording into a float WAV

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::CommandError;
use crate::loader::{load_signal, write_wav};
use crate::settings::AppConfig;
use crate::wavelet_clean::{denoise_with_report, DenoiseReport};

/// Result of a denoise run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DenoiseResult {
    pub output_path: String,
    pub duration: f64,
    pub sample_rate: f64,
    pub channels: usize,
    pub report: DenoiseReport,
}

/// Load `input`, denoise it with `config.denoise` and write `output`
///
/// Samples are multiplied by `config.scale` before denoising and divided
/// again before writing, so the output keeps the input's units. When
/// `report_path` is given the per-level report is also written there as JSON.
pub fn denoise_file(
    input: &Path,
    output: &Path,
    config: &AppConfig,
    report_path: Option<&Path>,
) -> Result<DenoiseResult, CommandError> {
    if config.scale == 0.0 || !config.scale.is_finite() {
        return Err(CommandError::InvalidScale(config.scale));
    }

    let signal = load_signal(input, config.loader)?.scaled(config.scale);
    log::info!(
        "Denoising {}: {} channels, {:.1}s at {} Hz",
        input.display(),
        signal.n_channels(),
        signal.duration_secs(),
        signal.sample_rate()
    );

    let (denoised, report) = denoise_with_report(&signal, &config.denoise)?;
    write_wav(output, &denoised.scaled(1.0 / config.scale))?;

    if let Some(report_path) = report_path {
        fs::write(report_path, serde_json::to_string_pretty(&report)?)?;
        log::info!("Report written to {}", report_path.display());
    }

    Ok(DenoiseResult {
        output_path: output.display().to_string(),
        duration: signal.duration_secs(),
        sample_rate: signal.sample_rate(),
        channels: signal.n_channels(),
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{LoaderKind, WavLoader, SignalLoader};
    use crate::signal::Signal;

    fn noisy_recording() -> Signal {
        let mut seed = 7u64;
        let channels = (0..2)
            .map(|ch| {
                (0..2048)
                    .map(|i| {
                        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                        let jitter = ((seed >> 33) as f64 / (1u64 << 31) as f64 - 0.5) * 0.02;
                        0.3 * ((i as f64) * 0.02 * (ch + 1) as f64).sin() + jitter
                    })
                    .collect::<Vec<f64>>()
            })
            .collect();
        Signal::from_channels(channels, 500.0).unwrap()
    }

    #[test]
    fn test_denoise_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.wav");
        let report_path = dir.path().join("report.json");
        write_wav(&input, &noisy_recording()).unwrap();

        let config = AppConfig {
            scale: 1e6,
            ..AppConfig::default()
        };
        let result = denoise_file(&input, &output, &config, Some(&report_path)).unwrap();

        assert_eq!(result.channels, 2);
        assert_eq!(result.sample_rate, 500.0);
        assert_eq!(result.report.channels.len(), 2);
        assert_eq!(result.report.channels[0].levels.len(), 5);

        let written = WavLoader.load(&output).unwrap();
        assert_eq!(written.n_channels(), 2);
        assert_eq!(written.n_samples(), 2048);
        // Units preserved: the clean sinusoid still peaks near 0.3
        let peak = written.data().iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(peak > 0.2 && peak < 0.4, "peak {}", peak);

        let report: DenoiseReport =
            serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(report.levels, 5);
    }

    #[test]
    fn test_rejects_zero_scale() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            scale: 0.0,
            loader: LoaderKind::Wav,
            ..AppConfig::default()
        };
        let err = denoise_file(&dir.path().join("a.wav"), &dir.path().join("b.wav"), &config, None).unwrap_err();
        assert!(matches!(err, CommandError::InvalidScale(_)));
    }
}
