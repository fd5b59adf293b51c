//! Wavelet denoising for multichannel biosignal recordings
//!
//! [`wavelet_clean`] is the engine: multilevel DWT, risk-based and adaptive
//! threshold estimation, shrinkage and reconstruction. [`loader`] reads
//! recordings, [`evaluation`] scores the methods against synthetic
//! interference, and [`commands`] ties both to files for the CLI.

pub mod commands;
pub mod evaluation;
pub mod loader;
pub mod settings;
pub mod signal;
pub mod wavelet_clean;

pub use signal::{Signal, SignalError};
