//! Multilevel discrete wavelet transform over a single channel
//!
//! Uses half-sample symmetric boundary extension, so a stage on `n` samples
//! with an `F`-tap filter yields `(n + F - 1) / 2` coefficients per band and
//! the inverse reproduces the input exactly (up to rounding).

use super::error::DenoiseError;
use super::families::{FilterBank, FilterFamily};

/// Wavelet coefficients of one channel
///
/// Index 0 holds the coarsest approximation; indices `1..=levels` hold the
/// detail bands from coarsest to finest.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientSet {
    coeffs: Vec<Vec<f64>>,
    signal_len: usize,
}

impl CoefficientSet {
    /// Assemble a set from raw vectors, e.g. coefficients edited outside the engine.
    /// Lengths are checked when the set is reconstructed.
    pub fn from_parts(coeffs: Vec<Vec<f64>>, signal_len: usize) -> Self {
        Self { coeffs, signal_len }
    }

    /// Number of detail levels
    pub fn levels(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    /// Length of the channel these coefficients were computed from
    pub fn signal_len(&self) -> usize {
        self.signal_len
    }

    pub fn approximation(&self) -> &[f64] {
        self.coeffs.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Detail band `level` (1 = coarsest). Returns `None` for 0 or out-of-range levels.
    pub fn detail(&self, level: usize) -> Option<&[f64]> {
        if level == 0 {
            return None;
        }
        self.coeffs.get(level).map(Vec::as_slice)
    }

    pub fn detail_mut(&mut self, level: usize) -> Option<&mut Vec<f64>> {
        if level == 0 {
            return None;
        }
        self.coeffs.get_mut(level)
    }

    /// Iterate `(level, band)` over the detail bands only
    pub fn details_mut(&mut self) -> impl Iterator<Item = (usize, &mut Vec<f64>)> {
        self.coeffs.iter_mut().enumerate().skip(1)
    }

    /// All vectors, approximation first
    pub fn as_slice(&self) -> &[Vec<f64>] {
        &self.coeffs
    }

    pub fn into_inner(self) -> Vec<Vec<f64>> {
        self.coeffs
    }
}

/// Deepest decomposition a channel of `signal_len` samples supports with
/// `filter_len`-tap filters: the largest `l` with `signal_len >= (F - 1) * 2^l`.
pub fn max_level_for(signal_len: usize, filter_len: usize) -> usize {
    let support = filter_len.saturating_sub(1).max(1);
    let mut ratio = signal_len / support;
    let mut level = 0;
    while ratio >= 2 {
        ratio /= 2;
        level += 1;
    }
    level
}

/// Deepest valid decomposition for `family` on a channel of `signal_len` samples
pub fn max_level(signal_len: usize, family: FilterFamily) -> Result<usize, DenoiseError> {
    Ok(max_level_for(signal_len, family.filter_len()?))
}

/// Map an index of the infinitely extended signal back into `0..n`
fn symmetric_index(i: isize, n: usize) -> usize {
    let period = 2 * n as isize;
    let m = i.rem_euclid(period) as usize;
    if m < n {
        m
    } else {
        2 * n - 1 - m
    }
}

/// Filter bank bound to one wavelet family
#[derive(Debug, Clone)]
pub struct WaveletTransform {
    family: FilterFamily,
    bank: FilterBank,
}

impl WaveletTransform {
    pub fn new(family: FilterFamily) -> Result<Self, DenoiseError> {
        Ok(Self {
            family,
            bank: family.filter_bank()?,
        })
    }

    pub fn family(&self) -> FilterFamily {
        self.family
    }

    /// Check a requested depth against the channel length
    pub fn validate_levels(&self, signal_len: usize, levels: usize) -> Result<(), DenoiseError> {
        let max = max_level_for(signal_len, self.bank.support());
        if levels == 0 || levels > max {
            return Err(DenoiseError::InvalidLevel {
                channel_len: signal_len,
                requested: levels,
                max,
            });
        }
        Ok(())
    }

    /// Decompose `channel` into `levels` detail bands plus an approximation
    pub fn decompose(&self, channel: &[f64], levels: usize) -> Result<CoefficientSet, DenoiseError> {
        self.validate_levels(channel.len(), levels)?;

        let mut details = Vec::with_capacity(levels);
        let mut approx = channel.to_vec();
        for _ in 0..levels {
            let (a, d) = self.analysis_step(&approx);
            details.push(d);
            approx = a;
        }

        // Stages run finest first; stored coarsest first
        let mut coeffs = Vec::with_capacity(levels + 1);
        coeffs.push(approx);
        coeffs.extend(details.into_iter().rev());

        Ok(CoefficientSet {
            coeffs,
            signal_len: channel.len(),
        })
    }

    /// Invert `decompose`. The output may be longer than the original
    /// channel; trim to `CoefficientSet::signal_len`.
    pub fn reconstruct(&self, coeffs: &CoefficientSet) -> Result<Vec<f64>, DenoiseError> {
        let mut approx = coeffs.approximation().to_vec();

        for (level, detail) in coeffs.as_slice().iter().enumerate().skip(1) {
            if approx.len() == detail.len() + 1 {
                approx.truncate(detail.len());
            } else if approx.len() != detail.len() {
                return Err(DenoiseError::CoefficientMismatch {
                    level,
                    approx: approx.len(),
                    detail: detail.len(),
                });
            }
            approx = self.synthesis_step(&approx, detail);
        }

        Ok(approx)
    }

    /// One filter-and-downsample stage
    fn analysis_step(&self, x: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let n = x.len();
        let f = self.bank.support();
        let out_len = (n + f - 1) / 2;

        let mut approx = Vec::with_capacity(out_len);
        let mut detail = Vec::with_capacity(out_len);

        for o in 0..out_len {
            let center = (2 * o + 1) as isize;
            let mut lo = 0.0;
            let mut hi = 0.0;
            for j in 0..f {
                let sample = x[symmetric_index(center - j as isize, n)];
                lo += self.bank.dec_lo[j] * sample;
                hi += self.bank.dec_hi[j] * sample;
            }
            approx.push(lo);
            detail.push(hi);
        }

        (approx, detail)
    }

    /// One upsample-and-filter stage, summing both bands
    fn synthesis_step(&self, approx: &[f64], detail: &[f64]) -> Vec<f64> {
        let m = approx.len();
        let f = self.bank.support();
        let out_len = (2 * m + 2).saturating_sub(f);

        let mut out = Vec::with_capacity(out_len);
        for t in 0..out_len {
            // Position in the full convolution of the zero-stuffed bands
            let pos = t + f - 2;
            let mut sum = 0.0;
            // Only even positions of the upsampled bands are non-zero
            let mut j = pos % 2;
            while j < f && j <= pos {
                let k = (pos - j) / 2;
                if k < m {
                    sum += self.bank.rec_lo[j] * approx[k] + self.bank.rec_hi[j] * detail[k];
                }
                j += 2;
            }
            out.push(sum);
        }

        out
    }
}

/// Decompose one channel with `family` to depth `levels`
pub fn decompose(
    channel: &[f64],
    family: FilterFamily,
    levels: usize,
) -> Result<CoefficientSet, DenoiseError> {
    WaveletTransform::new(family)?.decompose(channel, levels)
}

/// Reconstruct a channel from its coefficients
pub fn reconstruct(coeffs: &CoefficientSet, family: FilterFamily) -> Result<Vec<f64>, DenoiseError> {
    WaveletTransform::new(family)?.reconstruct(coeffs)
}
