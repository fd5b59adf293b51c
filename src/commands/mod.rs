//! File-level operations behind the command-line front end

pub mod denoise;
pub mod evaluate;

use thiserror::Error;

use crate::evaluation::EvalError;
use crate::loader::LoadError;
use crate::settings::ConfigError;
use crate::wavelet_clean::DenoiseError;

pub use denoise::{denoise_file, DenoiseResult};
pub use evaluate::{evaluate_files, EvaluateResult, FailedRecording, RecordingReports};

#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Denoise(#[from] DenoiseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Scale must be finite and non-zero, got {0}")]
    InvalidScale(f64),
}
