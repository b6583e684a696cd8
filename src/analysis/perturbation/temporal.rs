// Temporal module - Contour and envelope features over time
//
// - Voice breaks: voiced-to-unvoiced transitions per second of audio
// - Tremor power: share of F0-contour modulation energy in the 4-7 Hz band
// - Loudness decay: slope of frame RMS energy across the utterance
//
// The tremor spectrum uses the pitch engine's hop as the sample spacing, so
// it assumes the contour is close to uniformly sampled.

use crate::analysis::spectrum::{rfft_frequencies, secs_to_samples, FftProcessor, FrameAnalyzer};
use crate::analysis::stats::{interp, linear_fit, mean};
use crate::config::{LoudnessConfig, TremorConfig};
use crate::error::FeatureError;
use crate::features::FeatureResult;
use crate::signal::PitchContour;

/// Added to the total energy so a flat contour yields a ratio of 0
const ENERGY_EPSILON: f64 = 1e-12;

/// Voiced-to-unvoiced transitions per second of recording
pub fn voice_break_rate(contour: &PitchContour, duration_secs: f64) -> FeatureResult {
    if contour.len() < 2 {
        return Err(FeatureError::insufficient("pitch frames", 2, contour.len()));
    }
    if duration_secs <= 0.0 {
        return Err(FeatureError::InvalidInput {
            reason: format!("recording duration {}s", duration_secs),
        });
    }

    let breaks = contour
        .frequencies
        .windows(2)
        .filter(|pair| PitchContour::is_voiced(pair[0]) && !PitchContour::is_voiced(pair[1]))
        .count();

    Ok(breaks as f64 / duration_secs)
}

/// F0 contour with unvoiced frames filled by linear interpolation
///
/// Frames before the first (after the last) voiced frame hold its value.
pub fn interpolate_contour(contour: &PitchContour) -> Option<Vec<f64>> {
    let voiced = contour.voiced_indices();
    if voiced.is_empty() {
        return None;
    }
    let xp: Vec<f64> = voiced.iter().map(|&i| i as f64).collect();
    let fp: Vec<f64> = voiced.iter().map(|&i| contour.frequencies[i]).collect();
    (0..contour.len())
        .map(|i| interp(i as f64, &xp, &fp))
        .collect()
}

/// Fraction of contour modulation energy inside the tremor band
pub fn tremor_band_power(
    fft: &FftProcessor,
    contour: &PitchContour,
    config: &TremorConfig,
) -> FeatureResult {
    let voiced_count = contour.voiced_indices().len();
    if voiced_count < config.min_voiced_frames {
        return Err(FeatureError::insufficient(
            "voiced frames",
            config.min_voiced_frames,
            voiced_count,
        ));
    }
    if contour.time_step <= 0.0 {
        return Err(FeatureError::InvalidInput {
            reason: format!("pitch time step {}", contour.time_step),
        });
    }

    let filled = interpolate_contour(contour)
        .ok_or_else(|| FeatureError::insufficient("voiced frames", 1, 0))?;
    let centre = mean(&filled).unwrap_or(0.0);
    let centred: Vec<f64> = filled.iter().map(|f| f - centre).collect();

    let spectrum = fft.magnitude_spectrum(&centred);
    let freqs = rfft_frequencies(centred.len(), contour.time_step);

    let mut band_energy = 0.0;
    let mut band_bins = 0usize;
    for (&f, &mag) in freqs.iter().zip(&spectrum) {
        if f >= config.band_low_hz && f <= config.band_high_hz {
            band_energy += mag * mag;
            band_bins += 1;
        }
    }
    if band_bins == 0 {
        return Err(FeatureError::insufficient("bins in tremor band", 1, 0));
    }

    let total_energy = spectrum.iter().map(|m| m * m).sum::<f64>() + ENERGY_EPSILON;
    Ok(band_energy / total_energy)
}

/// Slope of frame RMS against time (RMS units per second)
pub fn loudness_decay(samples: &[f32], sample_rate: u32, config: &LoudnessConfig) -> FeatureResult {
    let frame_len = secs_to_samples(config.frame_secs, sample_rate);
    let hop = secs_to_samples(config.hop_secs, sample_rate);
    if frame_len == 0 || hop == 0 {
        return Err(FeatureError::InvalidInput {
            reason: format!("loudness frame {} / hop {} samples", frame_len, hop),
        });
    }

    let rms = FrameAnalyzer::rms_frames(samples, frame_len, hop);
    if rms.len() < 3 {
        return Err(FeatureError::insufficient("RMS frames", 3, rms.len()));
    }

    let hop_secs = hop as f64 / sample_rate as f64;
    let times: Vec<f64> = (0..rms.len()).map(|i| i as f64 * hop_secs).collect();
    linear_fit(&times, &rms)
        .map(|fit| fit.slope)
        .ok_or_else(|| FeatureError::degenerate("RMS frames share one timestamp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn modulated_contour(frames: usize, step: f64, rate_hz: f64, depth_hz: f64) -> PitchContour {
        let f0 = (0..frames)
            .map(|i| 150.0 + depth_hz * (2.0 * PI * rate_hz * i as f64 * step).sin())
            .collect();
        PitchContour::new(f0, step, 0.0)
    }

    #[test]
    fn test_voice_breaks_counts_voiced_to_unvoiced() {
        let contour = PitchContour::new(
            vec![0.0, 120.0, 121.0, 0.0, 0.0, 118.0, 0.0, 119.0],
            0.01,
            0.0,
        );
        // Two voiced->unvoiced transitions over 2 seconds
        assert_eq!(voice_break_rate(&contour, 2.0), Ok(1.0));
    }

    #[test]
    fn test_voice_breaks_needs_two_frames_and_duration() {
        let single = PitchContour::new(vec![120.0], 0.01, 0.0);
        assert!(voice_break_rate(&single, 1.0).is_err());

        let pair = PitchContour::new(vec![120.0, 0.0], 0.01, 0.0);
        assert!(voice_break_rate(&pair, 0.0).is_err());
    }

    #[test]
    fn test_interpolation_fills_gaps_and_holds_edges() {
        let contour = PitchContour::new(vec![0.0, 100.0, 0.0, 0.0, 160.0, 0.0], 0.01, 0.0);
        let filled = interpolate_contour(&contour).unwrap();
        assert_eq!(filled, vec![100.0, 100.0, 120.0, 140.0, 160.0, 160.0]);
        assert!(interpolate_contour(&PitchContour::new(vec![0.0; 4], 0.01, 0.0)).is_none());
    }

    #[test]
    fn test_tremor_dominates_for_5hz_modulation() {
        let fft = FftProcessor::new();
        let contour = modulated_contour(400, 0.01, 5.0, 3.0);
        let ratio = tremor_band_power(&fft, &contour, &TremorConfig::default()).unwrap();
        assert!(ratio > 0.9, "Expected tremor ratio > 0.9, got {}", ratio);
    }

    #[test]
    fn test_tremor_small_for_slow_drift() {
        let fft = FftProcessor::new();
        let contour = modulated_contour(400, 0.01, 0.5, 3.0);
        let ratio = tremor_band_power(&fft, &contour, &TremorConfig::default()).unwrap();
        assert!(ratio < 0.05, "Expected tremor ratio < 0.05, got {}", ratio);
    }

    #[test]
    fn test_tremor_flat_contour_is_zero() {
        let fft = FftProcessor::new();
        let contour = PitchContour::new(vec![150.0; 200], 0.01, 0.0);
        let ratio = tremor_band_power(&fft, &contour, &TremorConfig::default()).unwrap();
        assert!(ratio.abs() < 1e-9);
    }

    #[test]
    fn test_tremor_requires_voiced_frames() {
        let fft = FftProcessor::new();
        let mut f0 = vec![0.0; 100];
        for v in f0.iter_mut().take(9) {
            *v = 150.0;
        }
        let contour = PitchContour::new(f0, 0.01, 0.0);
        assert!(matches!(
            tremor_band_power(&fft, &contour, &TremorConfig::default()),
            Err(FeatureError::InsufficientData {
                required: 10,
                available: 9,
                ..
            })
        ));
    }

    #[test]
    fn test_loudness_decay_tracks_fading_signal() {
        let sample_rate = 16_000;
        let n = sample_rate as usize * 2;
        let fading: Vec<f32> = (0..n)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (1.0 - 0.4 * t) * (2.0 * std::f32::consts::PI * 150.0 * t).sin()
            })
            .collect();
        let slope = loudness_decay(&fading, sample_rate, &LoudnessConfig::default()).unwrap();
        // Amplitude falls 0.4/s, so RMS falls ~0.4/sqrt(2) per second
        assert!((slope + 0.283).abs() < 0.02, "Got slope {}", slope);
    }

    #[test]
    fn test_loudness_decay_needs_three_frames() {
        let short = vec![0.1f32; 600];
        assert!(matches!(
            loudness_decay(&short, 16_000, &LoudnessConfig::default()),
            Err(FeatureError::InsufficientData { available: 2, .. })
        ));
    }
}
