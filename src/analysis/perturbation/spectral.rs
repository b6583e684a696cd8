// Spectral module - Frequency-domain voice quality features
//
// Spectral tilt: slope of a line fitted to the dB spectrum of the opening
// stretch of the recording. Steeper negative tilt means weaker high
// frequencies (hypophonic, breathy or fatigued voice).
//
// Breathiness (H1-H2): level difference between the first two harmonics,
// sampled at a subset of voiced pitch frames. Harmonic amplitudes are read
// from the FFT bin nearest to F0 and 2·F0; at low F0 the bin spacing
// (25 Hz for a 40 ms frame) limits accuracy.
//
// References:
// - Hanson, H. M. (1997). Glottal characteristics of female speakers
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

use crate::analysis::spectrum::{linspace, rfft_frequencies, secs_to_samples, FrameAnalyzer};
use crate::analysis::stats::{linear_fit, mean, nearest_index};
use crate::config::{BreathinessConfig, SpectralTiltConfig};
use crate::error::FeatureError;
use crate::features::FeatureResult;
use crate::signal::PitchContour;

/// Magnitude floor before conversion to dB
const MAGNITUDE_FLOOR: f64 = 1e-10;

/// Regression slope of dB level against frequency (dB/Hz)
pub fn spectral_tilt(
    analyzer: &FrameAnalyzer,
    samples: &[f32],
    config: &SpectralTiltConfig,
) -> FeatureResult {
    let sample_rate = analyzer.sample_rate();
    let n = samples
        .len()
        .min(secs_to_samples(config.max_secs, sample_rate));
    if n == 0 {
        return Err(FeatureError::insufficient("samples", 1, 0));
    }

    let spectrum = analyzer.hann_magnitude(&samples[..n]);
    let level_db: Vec<f64> = spectrum
        .iter()
        .map(|&mag| 20.0 * mag.max(MAGNITUDE_FLOOR).log10())
        .collect();
    let freqs = linspace(0.0, sample_rate as f64 / 2.0, level_db.len());

    let (band_freqs, band_levels): (Vec<f64>, Vec<f64>) = freqs
        .iter()
        .zip(&level_db)
        .filter(|(&f, _)| f >= config.min_hz && f <= config.max_hz)
        .map(|(&f, &db)| (f, db))
        .unzip();

    if band_freqs.len() < 3 {
        return Err(FeatureError::insufficient(
            "frequency bins in tilt band",
            3,
            band_freqs.len(),
        ));
    }

    linear_fit(&band_freqs, &band_levels)
        .map(|fit| fit.slope)
        .ok_or_else(|| FeatureError::degenerate("tilt band has a single frequency"))
}

/// Mean H1-H2 level difference in dB over sampled voiced frames
pub fn breathiness_h1h2(
    analyzer: &FrameAnalyzer,
    samples: &[f32],
    contour: &PitchContour,
    config: &BreathinessConfig,
) -> FeatureResult {
    let voiced = contour.voiced_indices();
    if voiced.is_empty() {
        return Err(FeatureError::insufficient("voiced frames", 1, 0));
    }

    let sample_rate = analyzer.sample_rate();
    let frame_len = secs_to_samples(config.frame_secs, sample_rate);
    if frame_len < 2 {
        return Err(FeatureError::InvalidInput {
            reason: format!("H1-H2 frame of {} samples", frame_len),
        });
    }
    let freqs = rfft_frequencies(frame_len, 1.0 / sample_rate as f64);

    let mut differences = Vec::new();
    for &index in voiced.iter().step_by(config.frame_stride.max(1)) {
        let f0 = contour.frequencies[index];
        let center = (contour.frame_time(index) * sample_rate as f64) as i64;
        let start = center - (frame_len / 2) as i64;
        let end = start + frame_len as i64;
        if start < 0 || end > samples.len() as i64 {
            continue;
        }

        let spectrum = analyzer.hann_magnitude(&samples[start as usize..end as usize]);
        let (Some(h1_bin), Some(h2_bin)) =
            (nearest_index(&freqs, f0), nearest_index(&freqs, 2.0 * f0))
        else {
            continue;
        };
        let (h1, h2) = (spectrum[h1_bin], spectrum[h2_bin]);
        if h1 > 0.0 && h2 > 0.0 {
            differences.push(20.0 * (h1 / h2).log10());
        }
    }

    mean(&differences).ok_or_else(|| FeatureError::insufficient(
        "frames with both harmonics",
        1,
        0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn tone_mix(partials: &[(f32, f32)], sample_rate: u32, secs: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * secs) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                partials
                    .iter()
                    .map(|&(freq, amp)| amp * (2.0 * PI * freq * t).sin())
                    .sum()
            })
            .collect()
    }

    fn flat_contour(f0: f64, frames: usize) -> PitchContour {
        PitchContour::new(vec![f0; frames], 0.01, 0.02)
    }

    #[test]
    fn test_tilt_negative_for_low_heavy_spectrum() {
        let analyzer = FrameAnalyzer::new(16_000);
        let signal = tone_mix(
            &[(200.0, 1.0), (1000.0, 0.3), (3000.0, 0.05), (6000.0, 0.01)],
            16_000,
            1.0,
        );
        let tilt = spectral_tilt(&analyzer, &signal, &SpectralTiltConfig::default()).unwrap();
        assert!(tilt < 0.0, "Expected negative tilt, got {}", tilt);
    }

    #[test]
    fn test_tilt_needs_bins_in_band() {
        let analyzer = FrameAnalyzer::new(16_000);
        let result = spectral_tilt(&analyzer, &[0.1, 0.2], &SpectralTiltConfig::default());
        assert!(matches!(result, Err(FeatureError::InsufficientData { .. })));
        assert!(spectral_tilt(&analyzer, &[], &SpectralTiltConfig::default()).is_err());
    }

    #[test]
    fn test_h1h2_sign_follows_harmonic_balance() {
        let analyzer = FrameAnalyzer::new(16_000);
        let config = BreathinessConfig::default();
        let contour = flat_contour(200.0, 90);

        // Strong fundamental: breathy-like positive H1-H2
        let breathy = tone_mix(&[(200.0, 1.0), (400.0, 0.25)], 16_000, 1.0);
        let h1h2 = breathiness_h1h2(&analyzer, &breathy, &contour, &config).unwrap();
        assert!((h1h2 - 12.04).abs() < 0.5, "Expected ~12 dB, got {}", h1h2);

        // Strong second harmonic: pressed-like negative H1-H2
        let pressed = tone_mix(&[(200.0, 0.25), (400.0, 1.0)], 16_000, 1.0);
        let h1h2 = breathiness_h1h2(&analyzer, &pressed, &contour, &config).unwrap();
        assert!(h1h2 < -10.0, "Expected strongly negative H1-H2, got {}", h1h2);
    }

    #[test]
    fn test_h1h2_unvoiced_contour_unavailable() {
        let analyzer = FrameAnalyzer::new(16_000);
        let signal = tone_mix(&[(200.0, 1.0)], 16_000, 0.5);
        let contour = flat_contour(0.0, 40);
        let result =
            breathiness_h1h2(&analyzer, &signal, &contour, &BreathinessConfig::default());
        assert!(matches!(result, Err(FeatureError::InsufficientData { .. })));
    }

    #[test]
    fn test_h1h2_skips_frames_outside_waveform() {
        let analyzer = FrameAnalyzer::new(16_000);
        let signal = tone_mix(&[(200.0, 1.0), (400.0, 0.5)], 16_000, 0.1);
        // Every frame lies beyond the 100 ms of audio
        let contour = PitchContour::new(vec![200.0; 10], 0.01, 0.5);
        let result =
            breathiness_h1h2(&analyzer, &signal, &contour, &BreathinessConfig::default());
        assert!(result.is_err());
    }
}
