// Window functions and framing helpers

use std::f64::consts::PI;

/// Periodic Hann window (DFT-even), as used for cepstral frames
pub fn hann_periodic(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / len as f64).cos())
        .collect()
}

/// Symmetric Hann window with zero end points
pub fn hann_symmetric(len: usize) -> Vec<f64> {
    if len == 1 {
        return vec![1.0];
    }
    (0..len)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / (len as f64 - 1.0)).cos())
        .collect()
}

/// Multiply samples by a window of the same length, widening to f64
pub fn apply_window(samples: &[f32], window: &[f64]) -> Vec<f64> {
    samples
        .iter()
        .zip(window)
        .map(|(&s, &w)| s as f64 * w)
        .collect()
}

/// Seconds to a whole number of samples (truncating)
pub fn secs_to_samples(secs: f64, sample_rate: u32) -> usize {
    (secs * sample_rate as f64) as usize
}
