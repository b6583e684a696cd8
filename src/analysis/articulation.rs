// Articulation module - Formant-derived measures
//
// Reads the formant engine's per-frame F1/F2/bandwidth values and reduces
// them to means. A frame contributes to a mean only when its value is
// defined, finite and positive.

use crate::analysis::stats::mean;
use crate::error::FeatureError;
use crate::features::FeatureResult;
use crate::signal::FormantFrame;

fn valid_mean(values: impl Iterator<Item = Option<f64>>, what: &'static str) -> FeatureResult {
    let valid: Vec<f64> = values
        .flatten()
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();
    mean(&valid).ok_or_else(|| FeatureError::insufficient(what, 1, 0))
}

/// Mean first formant in Hz
pub fn f1_mean(track: &[FormantFrame]) -> FeatureResult {
    valid_mean(track.iter().map(|f| f.f1), "frames with F1")
}

/// Mean second formant in Hz
pub fn f2_mean(track: &[FormantFrame]) -> FeatureResult {
    valid_mean(track.iter().map(|f| f.f2), "frames with F2")
}

/// Mean F1 bandwidth in Hz
pub fn formant_bandwidth(track: &[FormantFrame]) -> FeatureResult {
    valid_mean(track.iter().map(|f| f.f1_bandwidth), "frames with F1 bandwidth")
}

/// Single-vowel articulation index: mean F2 over mean F1
pub fn articulatory_ratio(f1_mean: &FeatureResult, f2_mean: &FeatureResult) -> FeatureResult {
    match (f1_mean, f2_mean) {
        (Ok(f1), Ok(f2)) if *f1 > 0.0 && *f2 > 0.0 => Ok(f2 / f1),
        (Err(err), _) | (_, Err(err)) => Err(err.clone()),
        _ => Err(FeatureError::degenerate("formant mean is not positive")),
    }
}

/// Vowel space area needs the /a/, /i/ and /u/ corner vowels
///
/// A single analysed vowel can never supply them, so the area is reported
/// unavailable as a structural limitation.
pub fn vowel_space_area() -> FeatureResult {
    Err(FeatureError::insufficient("corner vowel categories", 3, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(f1: Option<f64>, f2: Option<f64>, bw: Option<f64>) -> FormantFrame {
        FormantFrame {
            f1,
            f2,
            f1_bandwidth: bw,
        }
    }

    #[test]
    fn test_means_skip_undefined_and_non_positive() {
        let track = vec![
            frame(Some(700.0), Some(1200.0), Some(80.0)),
            frame(None, Some(1300.0), Some(f64::NAN)),
            frame(Some(-1.0), None, Some(120.0)),
            frame(Some(f64::NAN), Some(0.0), None),
            frame(Some(500.0), Some(1100.0), None),
        ];
        assert_eq!(f1_mean(&track), Ok(600.0));
        assert_eq!(f2_mean(&track), Ok(1200.0));
        assert_eq!(formant_bandwidth(&track), Ok(100.0));
    }

    #[test]
    fn test_ratio_of_means() {
        let track = vec![frame(Some(500.0), Some(1500.0), None)];
        let ratio = articulatory_ratio(&f1_mean(&track), &f2_mean(&track)).unwrap();
        assert!((ratio - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_ratio_unavailable_without_formants() {
        let track = vec![frame(None, Some(1500.0), None)];
        let ratio = articulatory_ratio(&f1_mean(&track), &f2_mean(&track));
        assert!(matches!(ratio, Err(FeatureError::InsufficientData { .. })));
        assert!(f1_mean(&[]).is_err());
    }

    #[test]
    fn test_vowel_space_area_always_unavailable() {
        assert!(vowel_space_area().is_err());
    }
}
