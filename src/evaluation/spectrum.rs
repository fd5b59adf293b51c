//! Spectral measurements of mains interference

use realfft::RealFftPlanner;

use super::EvalError;
use crate::signal::Signal;

/// Assumed mains frequency when a recording is too short to tell
pub const DEFAULT_MAINS_HZ: f64 = 50.0;

const MAX_DETECT_FFT: usize = 8192;
const MIN_DETECT_FFT: usize = 256;

fn hann(i: usize, n: usize) -> f64 {
    0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / n as f64).cos())
}

/// `|X[k]|^2` of the Hann-windowed channel, normalised so a sinusoid of
/// amplitude `A` on an exact bin peaks at `A^2 / 4`
fn windowed_power_spectrum(samples: &[f64]) -> Result<Vec<f64>, EvalError> {
    let n = samples.len();
    if n == 0 {
        return Err(EvalError::Empty);
    }

    let mut planner = RealFftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);

    let mut buffer: Vec<f64> = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| s * hann(i, n))
        .collect();
    let window_sum: f64 = (0..n).map(|i| hann(i, n)).sum();

    let mut spectrum = fft.make_output_vec();
    fft.process(&mut buffer, &mut spectrum)
        .map_err(|e| EvalError::Fft(e.to_string()))?;

    let norm = if window_sum > 0.0 { window_sum * window_sum } else { 1.0 };
    Ok(spectrum.iter().map(|c| c.norm_sqr() / norm).collect())
}

fn nearest_bin(freq: f64, sample_rate: f64, n: usize) -> usize {
    (freq * n as f64 / sample_rate).round().max(0.0) as usize
}

/// Normalised power of one channel at the bin nearest `freq`
pub fn line_noise_power(channel: &[f64], sample_rate: f64, freq: f64) -> Result<f64, EvalError> {
    let spectrum = windowed_power_spectrum(channel)?;
    let bin = nearest_bin(freq, sample_rate, channel.len());
    Ok(spectrum.get(bin).copied().unwrap_or(0.0))
}

/// Share of spectral power within one bin of `freq`, averaged over channels
///
/// Silent channels contribute `0`.
pub fn line_noise_ratio(signal: &Signal, freq: f64) -> Result<f64, EvalError> {
    if signal.is_empty() {
        return Err(EvalError::Empty);
    }

    let n = signal.n_samples();
    let bin = nearest_bin(freq, signal.sample_rate(), n);
    let mut ratio_sum = 0.0;

    for channel in signal.channels() {
        let samples = channel.to_vec();
        let spectrum = windowed_power_spectrum(&samples)?;
        let total: f64 = spectrum.iter().sum();
        if total == 0.0 {
            continue;
        }
        let lo = bin.saturating_sub(1);
        let hi = (bin + 1).min(spectrum.len() - 1);
        let line: f64 = if lo <= hi { spectrum[lo..=hi].iter().sum() } else { 0.0 };
        ratio_sum += line / total;
    }

    Ok(ratio_sum / signal.n_channels() as f64)
}

/// Whether 50 Hz or 60 Hz mains dominates, comparing the first four harmonics
pub fn detect_mains_frequency(samples: &[f64], sample_rate: f64) -> f64 {
    let fft_size = match samples.len() {
        0 => 0,
        len => 1usize << (usize::BITS - 1 - len.leading_zeros()),
    }
    .min(MAX_DETECT_FFT);

    if fft_size < MIN_DETECT_FFT {
        return DEFAULT_MAINS_HZ;
    }

    let mut planner = RealFftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(fft_size);

    // Centre of the recording avoids start-up transients
    let start = (samples.len() - fft_size) / 2;
    let mut buffer: Vec<f64> = samples[start..start + fft_size]
        .iter()
        .enumerate()
        .map(|(i, &s)| s * hann(i, fft_size))
        .collect();

    let mut spectrum = fft.make_output_vec();
    if let Err(e) = fft.process(&mut buffer, &mut spectrum) {
        log::warn!("Mains detection FFT failed: {}", e);
        return DEFAULT_MAINS_HZ;
    }

    let freq_resolution = sample_rate / fft_size as f64;
    let harmonic_energy = |base: f64| -> f64 {
        (1..=4)
            .map(|h| (base * h as f64 / freq_resolution).round() as usize)
            .filter(|&bin| bin < spectrum.len())
            .map(|bin| spectrum[bin].norm_sqr())
            .sum()
    };

    let energy_50 = harmonic_energy(50.0);
    let energy_60 = harmonic_energy(60.0);
    log::debug!("Mains energy: 50 Hz {:.3e}, 60 Hz {:.3e}", energy_50, energy_60);

    // 50 Hz wins ties
    if energy_60 > energy_50 * 1.2 {
        60.0
    } else {
        50.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f64, amplitude: f64, sample_rate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| amplitude * (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_line_noise_power_on_bin() {
        // 50 Hz at 250 Hz over 1000 samples lands exactly on bin 200
        let samples = tone(50.0, 2.0, 250.0, 1000);
        let power = line_noise_power(&samples, 250.0, 50.0).unwrap();
        assert!((power - 1.0).abs() < 1e-9, "power {}", power);

        let elsewhere = line_noise_power(&samples, 250.0, 20.0).unwrap();
        assert!(elsewhere < 1e-9);
    }

    #[test]
    fn test_line_noise_ratio() {
        let hum = tone(50.0, 1.0, 250.0, 1000);
        let slow = tone(3.0, 1.0, 250.0, 1000);
        let signal = Signal::from_channels(vec![hum, slow, vec![0.0; 1000]], 250.0).unwrap();

        let ratio = line_noise_ratio(&signal, 50.0).unwrap();
        // Channel 0 is all hum, the others contribute nothing
        assert!((ratio - 1.0 / 3.0).abs() < 1e-6, "ratio {}", ratio);
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(line_noise_power(&[], 250.0, 50.0), Err(EvalError::Empty)));
    }

    #[test]
    fn test_detect_mains_frequency() {
        let sr = 1000.0;
        assert_eq!(detect_mains_frequency(&tone(60.0, 1.0, sr, 10_000), sr), 60.0);
        assert_eq!(detect_mains_frequency(&tone(50.0, 1.0, sr, 10_000), sr), 50.0);
        // Too short to analyse
        assert_eq!(detect_mains_frequency(&tone(60.0, 1.0, sr, 100), sr), DEFAULT_MAINS_HZ);
    }
}
