// FFT module - Fast Fourier Transform computation
//
// Magnitude spectra and real cepstra for arbitrary frame lengths. Callers
// apply their own window; see `window.rs`.

use rustfft::{num_complex::Complex, FftPlanner};
use std::sync::{Arc, Mutex, MutexGuard};

/// Floor applied to power values before taking the log
pub const POWER_FLOOR: f64 = 1e-12;

/// FFT processor shared by every frame-based feature
///
/// Plans are cached by the planner, so reusing one processor across frames
/// of the same length avoids re-planning.
#[derive(Clone)]
pub struct FftProcessor {
    fft_planner: Arc<Mutex<FftPlanner<f64>>>,
}

impl Default for FftProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl FftProcessor {
    pub fn new() -> Self {
        Self {
            fft_planner: Arc::new(Mutex::new(FftPlanner::new())),
        }
    }

    fn planner(&self) -> MutexGuard<'_, FftPlanner<f64>> {
        // The planner only caches plans; a poisoned lock leaves it usable
        self.fft_planner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Full complex forward FFT of a real signal
    fn forward(&self, signal: &[f64]) -> Vec<Complex<f64>> {
        let mut buffer: Vec<Complex<f64>> =
            signal.iter().map(|&s| Complex::new(s, 0.0)).collect();
        if buffer.is_empty() {
            return buffer;
        }
        let fft = self.planner().plan_fft_forward(buffer.len());
        fft.process(&mut buffer);
        buffer
    }

    /// Magnitude spectrum for positive frequencies (size = n / 2 + 1)
    pub fn magnitude_spectrum(&self, signal: &[f64]) -> Vec<f64> {
        if signal.is_empty() {
            return Vec::new();
        }
        let bins = signal.len() / 2 + 1;
        self.forward(signal)[..bins].iter().map(|c| c.norm()).collect()
    }

    /// Real cepstrum of the dB power spectrum
    ///
    /// Power is floored at [POWER_FLOOR], converted to `10·log10`, and the
    /// half spectrum (n / 2 + 1 bins) is inverted as a Hermitian-symmetric
    /// real spectrum. The output has `2 · (n / 2)` samples.
    pub fn power_cepstrum(&self, signal: &[f64]) -> Vec<f64> {
        if signal.len() < 2 {
            return Vec::new();
        }
        let spectrum = self.forward(signal);
        let bins = signal.len() / 2 + 1;
        let log_power: Vec<f64> = spectrum[..bins]
            .iter()
            .map(|c| 10.0 * c.norm_sqr().max(POWER_FLOOR).log10())
            .collect();

        let out_len = 2 * (bins - 1);
        let mut buffer = vec![Complex::new(0.0, 0.0); out_len];
        for (k, &value) in log_power.iter().enumerate() {
            if k < out_len {
                buffer[k] = Complex::new(value, 0.0);
            }
            if k > 0 && k < bins - 1 {
                buffer[out_len - k] = Complex::new(value, 0.0);
            }
        }

        let ifft = self.planner().plan_fft_inverse(out_len);
        ifft.process(&mut buffer);

        let scale = 1.0 / out_len as f64;
        buffer.iter().map(|c| c.re * scale).collect()
    }
}

/// Frequencies of the `n / 2 + 1` positive bins of an n-point FFT
pub fn rfft_frequencies(n: usize, sample_spacing: f64) -> Vec<f64> {
    let bins = n / 2 + 1;
    let step = 1.0 / (n as f64 * sample_spacing);
    (0..bins).map(|k| k as f64 * step).collect()
}

/// `count` evenly spaced values from `start` to `stop` inclusive
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            (0..count).map(|i| start + i as f64 * step).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_magnitude_spectrum_peak_at_tone() {
        let n = 512;
        let sample_rate = 16_000.0;
        // Bin-centred tone: bin 32 = 1000 Hz
        let signal: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * 1000.0 * i as f64 / sample_rate).sin())
            .collect();
        let fft = FftProcessor::new();
        let spectrum = fft.magnitude_spectrum(&signal);

        assert_eq!(spectrum.len(), n / 2 + 1);
        let peak = spectrum
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 32);
        assert!((spectrum[32] - n as f64 / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_cepstrum_of_impulse_is_flat_log() {
        // Unit impulse: flat unit power spectrum, log = 0 everywhere
        let mut signal = vec![0.0; 64];
        signal[0] = 1.0;
        let cepstrum = FftProcessor::new().power_cepstrum(&signal);
        assert_eq!(cepstrum.len(), 64);
        assert!(cepstrum.iter().all(|c| c.abs() < 1e-9));
    }

    #[test]
    fn test_cepstrum_floor_on_silence() {
        let cepstrum = FftProcessor::new().power_cepstrum(&vec![0.0; 32]);
        // log10(1e-12) * 10 = -120 at quefrency 0, zero elsewhere
        assert!((cepstrum[0] + 120.0).abs() < 1e-9);
        assert!(cepstrum[1..].iter().all(|c| c.abs() < 1e-9));
    }

    #[test]
    fn test_frequency_axes() {
        assert_eq!(rfft_frequencies(4, 0.25), vec![0.0, 1.0, 2.0]);
        assert_eq!(linspace(0.0, 8000.0, 3), vec![0.0, 4000.0, 8000.0]);
        assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }
}
