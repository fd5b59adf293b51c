//! Batch evaluation over a set of recordings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::CommandError;
use crate::evaluation::{run_evaluation, summarize, EvaluationReport, WaveletSummary};
use crate::loader::load_signal;
use crate::settings::AppConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingReports {
    pub path: String,
    pub reports: Vec<EvaluationReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedRecording {
    pub path: String,
    pub error: String,
}

/// Per-recording scores, failures, and per-wavelet aggregates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResult {
    pub recordings: Vec<RecordingReports>,
    pub failed: Vec<FailedRecording>,
    pub summary: Vec<WaveletSummary>,
}

fn evaluate_one(path: &Path, config: &AppConfig) -> Result<Vec<EvaluationReport>, CommandError> {
    if config.scale == 0.0 || !config.scale.is_finite() {
        return Err(CommandError::InvalidScale(config.scale));
    }
    let recording = load_signal(path, config.loader)?.scaled(config.scale);
    Ok(run_evaluation(&recording, &config.evaluation, &config.denoise)?)
}

/// Evaluate every input; a failing recording is logged and recorded, not fatal
pub fn evaluate_files(inputs: &[PathBuf], config: &AppConfig) -> EvaluateResult {
    let mut recordings = Vec::new();
    let mut failed = Vec::new();

    for (idx, path) in inputs.iter().enumerate() {
        log::info!("[{}/{}] {}", idx + 1, inputs.len(), path.display());
        match evaluate_one(path, config) {
            Ok(reports) => recordings.push(RecordingReports {
                path: path.display().to_string(),
                reports,
            }),
            Err(e) => {
                log::error!("Evaluation failed for {}: {}", path.display(), e);
                failed.push(FailedRecording {
                    path: path.display().to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    log::info!("Evaluated {}/{} recordings", recordings.len(), inputs.len());

    let all: Vec<EvaluationReport> = recordings
        .iter()
        .flat_map(|r| r.reports.iter().cloned())
        .collect();
    let summary = summarize(&all);

    EvaluateResult {
        recordings,
        failed,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::write_wav;
    use crate::signal::Signal;
    use crate::wavelet_clean::FilterFamily;

    fn recording(sample_rate: f64, seconds: usize) -> Signal {
        let n = (sample_rate as usize) * seconds;
        let channels = (0..3)
            .map(|ch| {
                (0..n)
                    .map(|i| {
                        let t = i as f64 / sample_rate;
                        0.5 * (2.0 * std::f64::consts::PI * (8.0 + ch as f64) * t).sin()
                            + 0.2 * (2.0 * std::f64::consts::PI * 3.0 * t).cos()
                    })
                    .collect::<Vec<f64>>()
            })
            .collect();
        Signal::from_channels(channels, sample_rate).unwrap()
    }

    #[test]
    fn test_batch_with_failure() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.wav");
        write_wav(&good, &recording(256.0, 12)).unwrap();
        let missing = dir.path().join("missing.wav");

        let result = evaluate_files(&[good.clone(), missing], &AppConfig::default());

        assert_eq!(result.recordings.len(), 1);
        assert_eq!(result.recordings[0].path, good.display().to_string());
        assert_eq!(result.failed.len(), 1);
        // Default wavelets are db4 and dmey
        assert_eq!(result.summary.len(), 2);
        assert_eq!(result.summary[0].wavelet, FilterFamily::Daubechies(4));
        assert_eq!(result.summary[1].wavelet, FilterFamily::DiscreteMeyer);
        assert_eq!(result.summary[0].recordings, 1);
        // A single recording has no spread to test
        assert!(result.summary[0].paired_test.is_none());

        let report = &result.recordings[0].reports[0];
        assert!(report.baseline_snr.is_finite());
        assert!(report.adaptive_snr.is_finite());
    }
}
