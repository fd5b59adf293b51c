//! WAV reading and writing through hound

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::{deinterleave, LoadError, SignalLoader};
use crate::signal::Signal;

/// Reads PCM/float WAV files. Integer PCM is scaled to [-1, 1).
#[derive(Debug, Clone, Copy, Default)]
pub struct WavLoader;

impl SignalLoader for WavLoader {
    fn load(&self, path: &Path) -> Result<Signal, LoadError> {
        let mut reader = WavReader::open(path)?;
        let spec = reader.spec();

        let interleaved: Vec<f64> = match spec.sample_format {
            SampleFormat::Float => reader
                .samples::<f32>()
                .map(|s| s.map(f64::from))
                .collect::<Result<_, _>>()?,
            SampleFormat::Int => {
                if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                    return Err(LoadError::UnsupportedFormat(format!(
                        "{}-bit integer PCM",
                        spec.bits_per_sample
                    )));
                }
                let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f64;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f64 / full_scale))
                    .collect::<Result<_, _>>()?
            }
        };

        deinterleave(&interleaved, spec.channels as usize, spec.sample_rate as f64)
    }
}

/// Write `signal` as a 32-bit float WAV
pub fn write_wav(path: &Path, signal: &Signal) -> Result<(), LoadError> {
    let channels = u16::try_from(signal.n_channels())
        .map_err(|_| LoadError::UnsupportedFormat(format!("{} channels", signal.n_channels())))?;
    if channels == 0 {
        return Err(LoadError::Empty(path.display().to_string()));
    }

    let spec = WavSpec {
        channels,
        sample_rate: signal.sample_rate().round() as u32,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;
    let data = signal.data();
    for frame in 0..signal.n_samples() {
        for ch in 0..signal.n_channels() {
            writer.write_sample(data[[ch, frame]] as f32)?;
        }
    }
    writer.finalize()?;

    log::info!("Wrote {} ({} channels, {} samples)", path.display(), channels, signal.n_samples());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two_channel.wav");

        let signal = Signal::from_channels(
            vec![vec![0.0, 0.25, -0.5, 0.75], vec![1.0, -1.0, 0.125, 0.0]],
            500.0,
        )
        .unwrap();
        write_wav(&path, &signal).unwrap();

        let loaded = WavLoader.load(&path).unwrap();
        assert_eq!(loaded.n_channels(), 2);
        assert_eq!(loaded.n_samples(), 4);
        assert_eq!(loaded.sample_rate(), 500.0);
        // Values are exactly representable in f32
        assert_eq!(loaded.data(), signal.data());
    }

    #[test]
    fn test_int_pcm_is_scaled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pcm16.wav");

        let spec = WavSpec {
            channels: 1,
            sample_rate: 1000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for v in [0i16, 16384, -32768] {
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();

        let loaded = WavLoader.load(&path).unwrap();
        assert_eq!(loaded.channel(0).unwrap().to_vec(), vec![0.0, 0.5, -1.0]);
    }

    #[test]
    fn test_missing_file() {
        let err = WavLoader.load(Path::new("/nonexistent/recording.wav")).unwrap_err();
        assert!(matches!(err, LoadError::Wav(_)));
    }
}
