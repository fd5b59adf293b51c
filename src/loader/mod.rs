//! Recording loaders
//!
//! All file formats go through [`SignalLoader`]; the concrete loader is picked
//! from configuration with [`loader_for`].

pub mod decoded;
pub mod edf;
pub mod wav;

use std::path::Path;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::signal::{Signal, SignalError};

pub use decoded::DecodedLoader;
pub use edf::EdfLoader;
pub use wav::{write_wav, WavLoader};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("Decode error: {0}")]
    Decode(#[from] symphonia::core::errors::Error),
    #[error("No audio tracks found in {0}")]
    NoTracks(String),
    #[error("Recording has no samples: {0}")]
    Empty(String),
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Signal(#[from] SignalError),
}

/// Reads a recording from disk into a [`Signal`]
pub trait SignalLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Signal, LoadError>;
}

/// Loader selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoaderKind {
    /// `.wav` through hound, `.edf` natively, everything else through symphonia
    #[default]
    Auto,
    Wav,
    Edf,
    Decoded,
}

/// Pick the loader for `path`
pub fn loader_for(kind: LoaderKind, path: &Path) -> Box<dyn SignalLoader> {
    match kind {
        LoaderKind::Wav => Box::new(WavLoader),
        LoaderKind::Edf => Box::new(EdfLoader),
        LoaderKind::Decoded => Box::new(DecodedLoader),
        LoaderKind::Auto => {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase);
            match ext.as_deref() {
                Some("wav") => Box::new(WavLoader),
                Some("edf") => Box::new(EdfLoader),
                _ => Box::new(DecodedLoader),
            }
        }
    }
}

/// Load `path` with the loader chosen by `kind`
pub fn load_signal(path: &Path, kind: LoaderKind) -> Result<Signal, LoadError> {
    log::info!("Loading recording: {}", path.display());
    let signal = loader_for(kind, path).load(path)?;
    if signal.is_empty() {
        return Err(LoadError::Empty(path.display().to_string()));
    }
    log::info!(
        "Loaded {} channels x {} samples at {} Hz",
        signal.n_channels(),
        signal.n_samples(),
        signal.sample_rate()
    );
    Ok(signal)
}

/// Split frame-interleaved samples into channels
pub(crate) fn deinterleave(interleaved: &[f64], channels: usize, sample_rate: f64) -> Result<Signal, LoadError> {
    if channels == 0 {
        return Err(LoadError::UnsupportedFormat("zero channels".to_string()));
    }
    // A trailing partial frame is dropped
    let frames = interleaved.len() / channels;
    let data = Array2::from_shape_fn((channels, frames), |(c, i)| interleaved[i * channels + c]);
    Ok(Signal::new(data, sample_rate))
}
