// Sanitizer - single choke point for serializable output
//
// Finite numbers are rounded to a fixed number of decimals, non-finite
// numbers become unavailable, counts and flags pass through.

use crate::config::SanitizerConfig;

use super::{FeatureSet, FeatureValue};

/// Scaled magnitude (2^50) above which dividing back by the scale can land
/// on a neighbour of the rounded value
const ROUNDING_LIMIT: f64 = 1_125_899_906_842_624.0;

/// Round half away from zero to `decimals` places
///
/// Values too large to round stably at this precision come back unchanged,
/// so rounding twice always equals rounding once.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    let scaled = value * scale;
    if !scaled.is_finite() || scaled.abs() >= ROUNDING_LIMIT {
        return value;
    }
    scaled.round() / scale
}

/// Sanitize with the default precision (6 decimals)
pub fn sanitize(set: FeatureSet) -> FeatureSet {
    Sanitizer::default().sanitize(set)
}

/// Normalizes every value of a FeatureSet
#[derive(Debug, Clone, Copy)]
pub struct Sanitizer {
    decimals: u32,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(&SanitizerConfig::default())
    }
}

impl Sanitizer {
    pub fn new(config: &SanitizerConfig) -> Self {
        Self {
            decimals: config.decimals,
        }
    }

    pub fn sanitize_value(&self, value: FeatureValue) -> FeatureValue {
        match value {
            FeatureValue::Number(v) if v.is_finite() => {
                FeatureValue::Number(round_to(v, self.decimals))
            }
            FeatureValue::Number(_) => FeatureValue::Unavailable,
            other => other,
        }
    }

    pub fn sanitize(&self, mut set: FeatureSet) -> FeatureSet {
        let mut dropped = 0usize;
        for value in set.values_mut() {
            let clean = self.sanitize_value(*value);
            if value.is_available() && !clean.is_available() {
                dropped += 1;
            }
            *value = clean;
        }
        if dropped > 0 {
            tracing::debug!(dropped, "Sanitizer replaced non-finite values");
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> FeatureSet {
        let mut set = FeatureSet::new();
        set.insert("cpp", 12.345_678_91);
        set.insert("spectral_tilt", -0.000_123_456_789);
        set.insert("tremor_freq_power", f64::NAN);
        set.insert("loudness_decay", f64::INFINITY);
        set.insert("dfa", f64::NEG_INFINITY);
        set.insert("vsa", FeatureValue::Unavailable);
        set.insert("onset_count", FeatureValue::Count(7));
        set.insert("festination", true);
        set
    }

    #[test]
    fn test_rounds_finite_values() {
        let clean = sanitize(sample_set());
        assert_eq!(clean.get("cpp"), Some(&FeatureValue::Number(12.345679)));
        assert_eq!(
            clean.get("spectral_tilt"),
            Some(&FeatureValue::Number(-0.000123))
        );
    }

    #[test]
    fn test_non_finite_becomes_unavailable() {
        let clean = sanitize(sample_set());
        for key in ["tremor_freq_power", "loudness_decay", "dfa", "vsa"] {
            assert_eq!(clean.get(key), Some(&FeatureValue::Unavailable), "{key}");
        }
    }

    #[test]
    fn test_counts_and_flags_pass_through() {
        let clean = sanitize(sample_set());
        assert_eq!(clean.get("onset_count"), Some(&FeatureValue::Count(7)));
        assert_eq!(clean.get("festination"), Some(&FeatureValue::Flag(true)));
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let once = sanitize(sample_set());
        let twice = sanitize(once.clone());
        assert_eq!(once, twice);

        let mut values = FeatureSet::new();
        for (i, v) in [0.1 + 0.2, 1.0 / 3.0, -2.675, 1e-7, 123456.0000005, -5.0e9 - 0.123]
            .iter()
            .enumerate()
        {
            values.insert(&format!("v{i}"), *v);
        }
        let once = sanitize(values);
        assert_eq!(sanitize(once.clone()), once);
    }

    #[test]
    fn test_custom_precision() {
        let sanitizer = Sanitizer::new(&SanitizerConfig { decimals: 2 });
        assert_eq!(
            sanitizer.sanitize_value(FeatureValue::Number(0.126)),
            FeatureValue::Number(0.13)
        );
    }

    #[test]
    fn test_large_engine_values_are_stable() {
        let mut set = FeatureSet::new();
        set.insert("mfcc2_mean", 4_319_340_614.188_81);
        let once = sanitize(set);
        let twice = sanitize(once.clone());
        assert_eq!(once, twice);
        assert_eq!(
            once.get("mfcc2_mean"),
            Some(&FeatureValue::Number(4_319_340_614.188_81))
        );

        // Straddles the magnitude where rounding stops
        for i in 0..4_000 {
            let v = 1.0e9 + i as f64 * 98_765.432_1;
            let once = round_to(v, 6);
            assert_eq!(round_to(once, 6), once, "unstable at {}", v);
        }
    }

    #[test]
    fn test_round_to_handles_huge_values() {
        assert_eq!(round_to(1e305, 6), 1e305);
    }
}
