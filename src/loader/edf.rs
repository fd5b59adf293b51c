//! European Data Format (EDF/EDF+) recordings
//!
//! The header is fixed-width ASCII; data records hold little-endian `i16`
//! samples per signal, mapped to physical units with each signal's
//! digital/physical range. EDF+ annotation signals are skipped.

use std::path::Path;

use ndarray::Array2;

use super::{LoadError, SignalLoader};
use crate::signal::Signal;

const FIXED_HEADER_LEN: usize = 256;
const SIGNAL_HEADER_LEN: usize = 256;
const ANNOTATION_LABEL: &str = "EDF Annotations";

#[derive(Debug, Clone, Copy, Default)]
pub struct EdfLoader;

#[derive(Debug, Clone, PartialEq)]
struct SignalHeader {
    label: String,
    physical_min: f64,
    physical_max: f64,
    digital_min: f64,
    digital_max: f64,
    samples_per_record: usize,
}

impl SignalHeader {
    fn is_annotation(&self) -> bool {
        self.label == ANNOTATION_LABEL
    }

    /// Digital to physical: `pmin + (d - dmin) * (pmax - pmin) / (dmax - dmin)`
    fn gain_offset(&self) -> (f64, f64) {
        let span = self.digital_max - self.digital_min;
        if span == 0.0 {
            return (1.0, 0.0);
        }
        let gain = (self.physical_max - self.physical_min) / span;
        (gain, self.physical_min - self.digital_min * gain)
    }
}

fn header_err(msg: impl Into<String>) -> LoadError {
    LoadError::InvalidHeader(msg.into())
}

fn field(bytes: &[u8], start: usize, len: usize) -> Result<&str, LoadError> {
    let raw = bytes
        .get(start..start + len)
        .ok_or_else(|| header_err("header truncated"))?;
    std::str::from_utf8(raw)
        .map(str::trim)
        .map_err(|_| header_err(format!("non-ASCII header field at byte {}", start)))
}

fn parse_field<T: std::str::FromStr>(bytes: &[u8], start: usize, len: usize, name: &str) -> Result<T, LoadError> {
    let text = field(bytes, start, len)?;
    text.parse()
        .map_err(|_| header_err(format!("bad {}: {:?}", name, text)))
}

/// Per-signal header fields are stored column-wise: all labels, then all
/// transducers, and so on
fn signal_headers(bytes: &[u8], count: usize) -> Result<Vec<SignalHeader>, LoadError> {
    let base = FIXED_HEADER_LEN;
    let column = |offset: usize, width: usize, i: usize| base + offset * count + i * width;

    (0..count)
        .map(|i| {
            Ok(SignalHeader {
                label: field(bytes, column(0, 16, i), 16)?.to_string(),
                physical_min: parse_field(bytes, column(104, 8, i), 8, "physical minimum")?,
                physical_max: parse_field(bytes, column(112, 8, i), 8, "physical maximum")?,
                digital_min: parse_field(bytes, column(120, 8, i), 8, "digital minimum")?,
                digital_max: parse_field(bytes, column(128, 8, i), 8, "digital maximum")?,
                samples_per_record: parse_field(bytes, column(216, 8, i), 8, "samples per record")?,
            })
        })
        .collect()
}

fn parse_edf(bytes: &[u8]) -> Result<Signal, LoadError> {
    if bytes.len() < FIXED_HEADER_LEN {
        return Err(header_err("file shorter than the fixed header"));
    }
    let header_len: usize = parse_field(bytes, 184, 8, "header length")?;
    let declared_records: i64 = parse_field(bytes, 236, 8, "record count")?;
    let record_secs: f64 = parse_field(bytes, 244, 8, "record duration")?;
    let n_signals: usize = parse_field(bytes, 252, 4, "signal count")?;

    if header_len != FIXED_HEADER_LEN + n_signals * SIGNAL_HEADER_LEN {
        return Err(header_err(format!(
            "header length {} does not match {} signals",
            header_len, n_signals
        )));
    }
    if record_secs.is_nan() || record_secs <= 0.0 {
        return Err(header_err(format!("record duration {}", record_secs)));
    }

    let signals = signal_headers(bytes, n_signals)?;
    let record_len: usize = signals.iter().map(|s| s.samples_per_record * 2).sum();
    if record_len == 0 {
        return Err(header_err("data records are empty"));
    }

    let data = bytes.get(header_len..).unwrap_or(&[]);
    let available = data.len() / record_len;
    // -1 means the writer never patched the count in
    let n_records = if declared_records < 0 {
        available
    } else {
        let declared = declared_records as usize;
        if declared > available {
            log::warn!("EDF declares {} records but holds {}", declared, available);
        }
        declared.min(available)
    };

    let kept: Vec<usize> = {
        let data_signals: Vec<usize> = (0..signals.len()).filter(|&i| !signals[i].is_annotation()).collect();
        let Some(&first) = data_signals.first() else {
            return Err(LoadError::Empty("EDF holds only annotations".to_string()));
        };
        let rate = signals[first].samples_per_record;
        data_signals
            .into_iter()
            .filter(|&i| {
                let same = signals[i].samples_per_record == rate;
                if !same {
                    log::warn!(
                        "Skipping EDF signal {:?}: {} samples per record, expected {}",
                        signals[i].label,
                        signals[i].samples_per_record,
                        rate
                    );
                }
                same
            })
            .collect()
    };

    let per_record = signals[kept[0]].samples_per_record;
    let sample_rate = per_record as f64 / record_secs;

    // Byte offset of each signal inside one record
    let offsets: Vec<usize> = signals
        .iter()
        .scan(0, |acc, s| {
            let start = *acc;
            *acc += s.samples_per_record * 2;
            Some(start)
        })
        .collect();

    let mut out = Array2::<f64>::zeros((kept.len(), n_records * per_record));
    for (row, &sig) in kept.iter().enumerate() {
        let (gain, offset) = signals[sig].gain_offset();
        for record in 0..n_records {
            let start = record * record_len + offsets[sig];
            let chunk = &data[start..start + per_record * 2];
            for (k, pair) in chunk.chunks_exact(2).enumerate() {
                let digital = i16::from_le_bytes([pair[0], pair[1]]) as f64;
                out[[row, record * per_record + k]] = digital * gain + offset;
            }
        }
    }

    let names = kept.iter().map(|&i| signals[i].label.clone()).collect();
    Ok(Signal::new(out, sample_rate).with_channel_names(names))
}

impl SignalLoader for EdfLoader {
    fn load(&self, path: &Path) -> Result<Signal, LoadError> {
        let bytes = std::fs::read(path)?;
        parse_edf(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(text: &str, width: usize) -> String {
        format!("{:<width$}", text, width = width)
    }

    /// Minimal EDF writer: `(label, samples_per_record, digital samples)`
    fn edf_bytes(records: i64, record_secs: f64, signals: &[(&str, usize, Vec<i16>)]) -> Vec<u8> {
        let ns = signals.len();
        let mut header = String::new();
        header += &pad("0", 8);
        header += &pad("X X X X", 80);
        header += &pad("Startdate X X X X", 80);
        header += &pad("01.01.26", 8);
        header += &pad("00.00.00", 8);
        header += &pad(&(256 + ns * 256).to_string(), 8);
        header += &pad("", 44);
        header += &pad(&records.to_string(), 8);
        header += &pad(&record_secs.to_string(), 8);
        header += &pad(&ns.to_string(), 4);

        let mut column = |width: usize, value: &dyn Fn(&(&str, usize, Vec<i16>)) -> String| {
            for s in signals {
                header += &pad(&value(s), width);
            }
        };
        column(16, &|s| s.0.to_string());
        column(80, &|_| String::new());
        column(8, &|_| "uV".to_string());
        column(8, &|_| "-100".to_string());
        column(8, &|_| "100".to_string());
        column(8, &|_| "-2000".to_string());
        column(8, &|_| "2000".to_string());
        column(80, &|_| String::new());
        column(8, &|s| s.1.to_string());
        column(32, &|_| String::new());

        let mut bytes = header.into_bytes();
        let n_records = signals.first().map_or(0, |s| s.2.len() / s.1);
        for record in 0..n_records {
            for (_, per_record, samples) in signals {
                for v in &samples[record * per_record..(record + 1) * per_record] {
                    bytes.extend_from_slice(&v.to_le_bytes());
                }
            }
        }
        bytes
    }

    #[test]
    fn test_reads_signals_in_physical_units() {
        let bytes = edf_bytes(
            2,
            1.0,
            &[
                ("Fz", 4, vec![0, 2000, -2000, 1000, 20, 40, 60, 80]),
                ("Cz", 4, vec![-1000, 0, 1000, 0, 1, 2, 3, 4]),
                (ANNOTATION_LABEL, 2, vec![0, 0, 0, 0]),
            ],
        );
        let signal = parse_edf(&bytes).unwrap();

        assert_eq!(signal.n_channels(), 2);
        assert_eq!(signal.n_samples(), 8);
        assert_eq!(signal.sample_rate(), 4.0);
        assert_eq!(signal.channel_names(), ["Fz".to_string(), "Cz".to_string()]);

        // 4000 digital steps span 200 uV
        let fz = signal.channel(0).unwrap().to_vec();
        let expected = [0.0, 100.0, -100.0, 50.0, 1.0, 2.0, 3.0, 4.0];
        for (a, e) in fz.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-9, "{} vs {}", a, e);
        }
        assert!((signal.channel(1).unwrap()[0] + 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_record_count_uses_file_length() {
        let bytes = edf_bytes(-1, 0.5, &[("O1", 2, vec![1, 2, 3, 4, 5, 6])]);
        let signal = parse_edf(&bytes).unwrap();
        assert_eq!(signal.n_samples(), 6);
        assert_eq!(signal.sample_rate(), 4.0);
    }

    #[test]
    fn test_mismatched_rates_are_skipped() {
        let bytes = edf_bytes(1, 1.0, &[("A", 4, vec![0; 4]), ("B", 2, vec![0; 2]), ("C", 4, vec![0; 4])]);
        let signal = parse_edf(&bytes).unwrap();
        assert_eq!(signal.channel_names(), ["A".to_string(), "C".to_string()]);
    }

    #[test]
    fn test_rejects_broken_headers() {
        assert!(matches!(parse_edf(b"0       "), Err(LoadError::InvalidHeader(_))));

        let mut bytes = edf_bytes(1, 1.0, &[("A", 2, vec![0, 0])]);
        bytes[184..192].copy_from_slice(b"999     ");
        assert!(matches!(parse_edf(&bytes), Err(LoadError::InvalidHeader(_))));

        let only_annotations = edf_bytes(1, 1.0, &[(ANNOTATION_LABEL, 2, vec![0, 0])]);
        assert!(matches!(parse_edf(&only_annotations), Err(LoadError::Empty(_))));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec.edf");
        std::fs::write(&path, edf_bytes(1, 1.0, &[("Pz", 3, vec![2000, 0, -2000])])).unwrap();

        let signal = crate::loader::load_signal(&path, crate::loader::LoaderKind::Auto).unwrap();
        let pz = signal.channel(0).unwrap().to_vec();
        for (a, e) in pz.iter().zip([100.0, 0.0, -100.0].iter()) {
            assert!((a - e).abs() < 1e-9);
        }
    }
}
