//! Aggregation of per-recording reports into per-wavelet statistics

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use super::EvaluationReport;
use crate::wavelet_clean::FilterFamily;

/// Mean and sample standard deviation of one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub mean: f64,
    pub std: f64,
}

impl Stat {
    pub fn of(values: &[f64]) -> Stat {
        let n = values.len();
        if n == 0 {
            return Stat { mean: 0.0, std: 0.0 };
        }
        let mean = values.iter().sum::<f64>() / n as f64;
        let std = if n > 1 {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };
        Stat { mean, std }
    }
}

/// Paired t-test of adaptive against baseline SNR
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairedTest {
    /// `mean(d) / (sd(d) / sqrt(n))` over `d = adaptive - baseline`
    pub t: f64,
    pub degrees_of_freedom: usize,
    /// Two-sided
    pub p_value: f64,
}

impl PairedTest {
    /// `None` with fewer than two pairs or when every difference is equal
    pub fn of(differences: &[f64]) -> Option<PairedTest> {
        let n = differences.len();
        if n < 2 {
            return None;
        }
        let Stat { mean, std } = Stat::of(differences);
        if std == 0.0 || !std.is_finite() {
            return None;
        }

        let t = mean / (std / (n as f64).sqrt());
        let degrees_of_freedom = n - 1;
        let dist = StudentsT::new(0.0, 1.0, degrees_of_freedom as f64).ok()?;
        let p_value = (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0);

        Some(PairedTest {
            t,
            degrees_of_freedom,
            p_value,
        })
    }
}

/// Aggregate of one wavelet's reports over many recordings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveletSummary {
    pub wavelet: FilterFamily,
    pub recordings: usize,
    pub baseline_snr: Stat,
    pub adaptive_snr: Stat,
    pub snr_improvement: f64,
    /// Fraction of recordings where adaptive SNR beats baseline SNR
    pub improved_share: f64,
    pub paired_test: Option<PairedTest>,
    pub baseline_rmse: Stat,
    pub adaptive_rmse: Stat,
    pub baseline_corr: Stat,
    pub adaptive_corr: Stat,
}

fn summarize_wavelet(wavelet: FilterFamily, subset: &[&EvaluationReport]) -> WaveletSummary {
    let stat = |f: fn(&EvaluationReport) -> f64| {
        Stat::of(&subset.iter().map(|r| f(r)).collect::<Vec<f64>>())
    };

    let differences: Vec<f64> = subset.iter().map(|r| r.snr_improvement()).collect();
    let improved = differences.iter().filter(|&&d| d > 0.0).count();
    let improved_share = if subset.is_empty() {
        0.0
    } else {
        improved as f64 / subset.len() as f64
    };

    let baseline_snr = stat(|r| r.baseline_snr);
    let adaptive_snr = stat(|r| r.adaptive_snr);
    WaveletSummary {
        wavelet,
        recordings: subset.len(),
        snr_improvement: adaptive_snr.mean - baseline_snr.mean,
        baseline_snr,
        adaptive_snr,
        improved_share,
        paired_test: PairedTest::of(&differences),
        baseline_rmse: stat(|r| r.baseline_rmse),
        adaptive_rmse: stat(|r| r.adaptive_rmse),
        baseline_corr: stat(|r| r.baseline_corr),
        adaptive_corr: stat(|r| r.adaptive_corr),
    }
}

/// Group reports by wavelet, in first-seen order
pub fn summarize(reports: &[EvaluationReport]) -> Vec<WaveletSummary> {
    let mut wavelets: Vec<FilterFamily> = Vec::new();
    for report in reports {
        if !wavelets.contains(&report.wavelet) {
            wavelets.push(report.wavelet);
        }
    }

    wavelets
        .into_iter()
        .map(|wavelet| {
            let subset: Vec<&EvaluationReport> =
                reports.iter().filter(|r| r.wavelet == wavelet).collect();
            let summary = summarize_wavelet(wavelet, &subset);
            log::info!(
                "{}: SNR improvement {:+.3} dB, improved {:.1}% of {} recordings",
                wavelet,
                summary.snr_improvement,
                summary.improved_share * 100.0,
                summary.recordings
            );
            summary
        })
        .collect()
}
