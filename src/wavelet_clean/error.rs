/// Errors raised by the denoising engine.
///
/// Every variant is detected before output buffers are written, so a failed
/// call never yields a partially denoised signal.
#[derive(Debug, thiserror::Error)]
pub enum DenoiseError {
    #[error("Invalid decomposition level {requested} for a channel of {channel_len} samples (max {max})")]
    InvalidLevel {
        channel_len: usize,
        requested: usize,
        max: usize,
    },
    #[error("Unknown wavelet family: {0}")]
    UnknownWavelet(String),
    #[error("Signal has no channels or no samples")]
    EmptySignal,
    #[error("Non-finite sample in channel {channel} at index {index}")]
    NonFiniteSample { channel: usize, index: usize },
    #[error("Coefficient length mismatch at level {level}: approximation {approx}, detail {detail}")]
    CoefficientMismatch {
        level: usize,
        approx: usize,
        detail: usize,
    },
}
