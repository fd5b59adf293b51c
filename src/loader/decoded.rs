//! Compressed and container formats through symphonia

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::{deinterleave, LoadError, SignalLoader};
use crate::signal::Signal;

/// Decodes any format registered with symphonia's default codecs
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodedLoader;

impl SignalLoader for DecodedLoader {
    fn load(&self, path: &Path) -> Result<Signal, LoadError> {
        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| LoadError::NoTracks(path.display().to_string()))?;

        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate;
        let mut channels = track.codec_params.channels.map(|c| c.count());

        let mut decoder =
            symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

        let mut interleaved: Vec<f64> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                // Corrupt packets are skipped, as players do
                Err(SymphoniaError::DecodeError(msg)) => {
                    log::warn!("Skipping undecodable packet: {}", msg);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let spec = *decoded.spec();
            sample_rate.get_or_insert(spec.rate);
            channels.get_or_insert(spec.channels.count());

            let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            interleaved.extend(sample_buf.samples().iter().map(|&s| f64::from(s)));
        }

        let (Some(sample_rate), Some(channels)) = (sample_rate, channels) else {
            return Err(LoadError::Empty(path.display().to_string()));
        };

        deinterleave(&interleaved, channels, sample_rate as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::write_wav;

    #[test]
    fn test_decodes_wav_container() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decoded.wav");

        let channels = vec![
            (0..480).map(|i| (i as f64 * 0.05).sin() * 0.5).collect::<Vec<_>>(),
            (0..480).map(|i| (i as f64 * 0.11).cos() * 0.25).collect::<Vec<_>>(),
        ];
        let signal = Signal::from_channels(channels, 2000.0).unwrap();
        write_wav(&path, &signal).unwrap();

        let loaded = DecodedLoader.load(&path).unwrap();
        assert_eq!(loaded.n_channels(), 2);
        assert_eq!(loaded.n_samples(), 480);
        assert_eq!(loaded.sample_rate(), 2000.0);
        for (a, b) in loaded.data().iter().zip(signal.data().iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = DecodedLoader.load(Path::new("/nonexistent/recording.flac")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
