//! Multichannel sample buffer shared by the loaders, the engine and evaluation

use ndarray::{s, Array2, ArrayView1, Axis};

#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("Channel {channel} has {found} samples, expected {expected}")]
    RaggedChannels {
        channel: usize,
        expected: usize,
        found: usize,
    },
    #[error("Channel index {index} out of range ({channels} channels)")]
    ChannelOutOfRange { index: usize, channels: usize },
}

/// Channels x samples matrix plus sample rate
///
/// Every channel has the same length by construction. The sample rate is
/// carried for callers; the engine itself never reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    data: Array2<f64>,
    sample_rate: f64,
    channel_names: Vec<String>,
}

impl Signal {
    /// Wrap a `(channels, samples)` matrix
    pub fn new(data: Array2<f64>, sample_rate: f64) -> Self {
        Self {
            data: data.as_standard_layout().into_owned(),
            sample_rate,
            channel_names: Vec::new(),
        }
    }

    /// Build from per-channel vectors, rejecting ragged input
    pub fn from_channels(channels: Vec<Vec<f64>>, sample_rate: f64) -> Result<Self, SignalError> {
        let n_channels = channels.len();
        let n_samples = channels.first().map_or(0, Vec::len);

        let mut flat = Vec::with_capacity(n_channels * n_samples);
        for (channel, samples) in channels.into_iter().enumerate() {
            if samples.len() != n_samples {
                return Err(SignalError::RaggedChannels {
                    channel,
                    expected: n_samples,
                    found: samples.len(),
                });
            }
            flat.extend(samples);
        }

        let data = Array2::from_shape_vec((n_channels, n_samples), flat).map_err(|_| {
            SignalError::RaggedChannels {
                channel: 0,
                expected: n_samples,
                found: 0,
            }
        })?;
        Ok(Self::new(data, sample_rate))
    }

    /// New signal with `data` and this signal's sample rate and channel names
    pub fn with_data(&self, data: Array2<f64>) -> Signal {
        Signal::new(data, self.sample_rate).with_channel_names(self.channel_names.clone())
    }

    pub fn with_channel_names(mut self, names: Vec<String>) -> Self {
        self.channel_names = names;
        self
    }

    pub fn n_channels(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate > 0.0 {
            self.n_samples() as f64 / self.sample_rate
        } else {
            0.0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn channel_names(&self) -> &[String] {
        &self.channel_names
    }

    pub fn channel(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        (index < self.n_channels()).then(|| self.data.row(index))
    }

    pub fn channels(&self) -> impl Iterator<Item = ArrayView1<'_, f64>> {
        self.data.rows().into_iter()
    }

    /// Same channel and sample counts
    pub fn same_shape(&self, other: &Signal) -> bool {
        self.data.dim() == other.data.dim()
    }

    /// Copy with every sample multiplied by `factor` (e.g. volts to microvolts)
    pub fn scaled(&self, factor: f64) -> Signal {
        Signal {
            data: &self.data * factor,
            sample_rate: self.sample_rate,
            channel_names: self.channel_names.clone(),
        }
    }

    /// The `duration_secs * sample_rate` samples centred in the recording.
    /// Recordings shorter than the request are returned whole.
    pub fn middle_segment(&self, duration_secs: f64) -> Signal {
        let total = self.n_samples();
        let wanted = (duration_secs * self.sample_rate).max(0.0) as usize;
        if wanted >= total {
            return self.clone();
        }

        let start = total / 2 - wanted / 2;
        let stop = start + wanted;
        Signal {
            data: self.data.slice(s![.., start..stop]).to_owned(),
            sample_rate: self.sample_rate,
            channel_names: self.channel_names.clone(),
        }
    }

    /// Keep only the listed channels, in the given order
    pub fn select_channels(&self, indices: &[usize]) -> Result<Signal, SignalError> {
        let channels = self.n_channels();
        if let Some(&index) = indices.iter().find(|&&i| i >= channels) {
            return Err(SignalError::ChannelOutOfRange { index, channels });
        }

        let channel_names = if self.channel_names.len() == channels {
            indices.iter().map(|&i| self.channel_names[i].clone()).collect()
        } else {
            Vec::new()
        };

        Ok(Signal {
            data: self.data.select(Axis(0), indices),
            sample_rate: self.sample_rate,
            channel_names,
        })
    }
}
