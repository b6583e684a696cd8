// Cepstral peak prominence
//
// Algorithm (per 40 ms frame, 10 ms hop):
// 1. Periodic Hann window
// 2. Power spectrum, floored, in dB
// 3. Inverse FFT to the real cepstrum
// 4. Keep quefrencies matching 75-500 Hz pitch
// 5. Least-squares line over that segment
// 6. CPP = cepstral peak minus the line at the peak quefrency
// The feature is the mean CPP over all frames.
//
// References:
// - Hillenbrand, J. et al. (1994). Acoustic correlates of breathy vocal quality

use crate::analysis::spectrum::{secs_to_samples, FrameAnalyzer};
use crate::analysis::stats::{argmax, linear_fit, mean};
use crate::config::CepstralConfig;
use crate::error::FeatureError;
use crate::features::FeatureResult;

/// Quefrency index range `[lo, hi)` for a pitch search band
fn quefrency_range(sample_rate: u32, config: &CepstralConfig, cepstrum_len: usize) -> (usize, usize) {
    let lo = (sample_rate as f64 / config.max_pitch_hz) as usize;
    let hi = ((sample_rate as f64 / config.min_pitch_hz) as usize).min(cepstrum_len.saturating_sub(1));
    (lo, hi)
}

/// Peak prominence of one cepstrum; None if the band is empty
fn frame_prominence(cepstrum: &[f64], lo: usize, hi: usize) -> Option<f64> {
    if lo >= hi {
        return None;
    }
    let region = &cepstrum[lo..hi];
    let quefrency: Vec<f64> = (lo..hi).map(|q| q as f64).collect();
    let fit = linear_fit(&quefrency, region)?;
    let peak = argmax(region)?;
    Some(region[peak] - fit.at(quefrency[peak]))
}

/// Mean cepstral peak prominence over all frames
pub fn cepstral_peak_prominence(
    analyzer: &FrameAnalyzer,
    samples: &[f32],
    config: &CepstralConfig,
) -> FeatureResult {
    let sample_rate = analyzer.sample_rate();
    let frame_len = secs_to_samples(config.frame_secs, sample_rate);
    let hop = secs_to_samples(config.hop_secs, sample_rate);
    if frame_len < 2 || hop == 0 {
        return Err(FeatureError::InvalidInput {
            reason: format!("CPP frame {} / hop {} samples", frame_len, hop),
        });
    }

    let prominences: Vec<f64> = analyzer
        .cepstra(samples, frame_len, hop)
        .filter_map(|cepstrum| {
            let (lo, hi) = quefrency_range(sample_rate, config, cepstrum.len());
            frame_prominence(&cepstrum, lo, hi)
        })
        .collect();

    mean(&prominences).ok_or_else(|| FeatureError::insufficient(
        "cepstral frames",
        1,
        prominences.len(),
    ))
}
