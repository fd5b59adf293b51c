//! Wavelet denoising engine
//!
//! Multichannel recordings are cleaned in four stages per channel:
//! 1. Multilevel discrete wavelet decomposition
//! 2. Threshold estimation per detail band (rigrsure or adaptive MAD-based)
//! 3. Hard/soft shrinkage of detail coefficients (approximation untouched)
//! 4. Reconstruction, trimmed to the original length

pub mod adaptive;
pub mod error;
pub mod families;
pub mod pipeline;
pub mod risk;
pub mod shrink;
pub mod transform;

pub use adaptive::{AdaptiveConfig, AdaptiveThresholdEstimator, EnergyNormalization};
pub use error::DenoiseError;
pub use families::FilterFamily;
pub use pipeline::{denoise, denoise_with_report, DenoiseOptions, DenoiseReport, Method};
pub use risk::RiskThresholdEstimator;
pub use shrink::ShrinkMode;
pub use transform::{decompose, max_level, reconstruct, CoefficientSet, WaveletTransform};
