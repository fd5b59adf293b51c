//! Synthetic interference for controlled evaluation

use ndarray::Array1;

use crate::signal::Signal;

fn sinusoid(n_samples: usize, sample_rate: f64, freq: f64) -> Array1<f64> {
    Array1::from_shape_fn(n_samples, |i| {
        let t = i as f64 / sample_rate;
        (2.0 * std::f64::consts::PI * freq * t).sin()
    })
}

fn add_to_every_channel(signal: &Signal, noise: &Array1<f64>) -> Signal {
    let mut data = signal.data().clone();
    for mut row in data.rows_mut() {
        row += noise;
    }
    signal.with_data(data)
}

/// Add a mains-hum sinusoid at `freq` Hz, identical on every channel, scaled
/// so that the overall signal-to-noise power ratio is `snr_db`
pub fn add_line_noise(signal: &Signal, freq: f64, snr_db: f64) -> Signal {
    let noise = sinusoid(signal.n_samples(), signal.sample_rate(), freq);

    let signal_power = signal.data().mapv(|v| v * v).mean().unwrap_or(0.0);
    let noise_power = noise.mapv(|v| v * v).mean().unwrap_or(0.0);
    if signal_power == 0.0 || noise_power == 0.0 {
        log::warn!("Line noise skipped: zero signal or noise power");
        return signal.clone();
    }

    let desired_power = signal_power / 10f64.powf(snr_db / 10.0);
    let noise = noise * (desired_power / noise_power).sqrt();
    add_to_every_channel(signal, &noise)
}

/// Add a slow sinusoidal baseline drift of amplitude `amplitude_ratio`
pub fn add_baseline_wander(signal: &Signal, freq: f64, amplitude_ratio: f64) -> Signal {
    let drift = sinusoid(signal.n_samples(), signal.sample_rate(), freq) * amplitude_ratio;
    add_to_every_channel(signal, &drift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::metrics::snr_db;

    fn test_signal() -> Signal {
        let channels = (0..2)
            .map(|ch| {
                (0..1000)
                    .map(|i| ((i as f64) * 0.013 * (ch + 1) as f64).sin() * 20.0)
                    .collect::<Vec<f64>>()
            })
            .collect();
        Signal::from_channels(channels, 250.0).unwrap()
    }

    #[test]
    fn test_line_noise_hits_target_snr() {
        let clean = test_signal();
        let noisy = add_line_noise(&clean, 50.0, 10.0);
        assert!(noisy.same_shape(&clean));
        assert!((snr_db(&clean, &noisy).unwrap() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_line_noise_on_silence_is_noop() {
        let silent = Signal::from_channels(vec![vec![0.0; 64]], 250.0).unwrap();
        assert_eq!(add_line_noise(&silent, 50.0, 5.0), silent);
    }

    #[test]
    fn test_baseline_wander_amplitude() {
        let zeros = Signal::from_channels(vec![vec![0.0; 2500]; 2], 250.0).unwrap();
        let drifted = add_baseline_wander(&zeros, 0.3, 0.05);
        let peak = drifted.data().iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(peak <= 0.05 + 1e-12);
        assert!(peak > 0.049);
        // Same drift on every channel
        assert_eq!(drifted.channel(0), drifted.channel(1));
    }
}
