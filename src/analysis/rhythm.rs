// Rhythm module - Diadochokinetic (DDK) onset statistics
//
// Works on syllable onset times from an external onset detector:
// - rate: onsets per second between the first and last onset
// - inter-onset interval (IOI) mean, SD and coefficient of variation
// - festination: later intervals systematically shorter than earlier ones,
//   a Parkinsonian acceleration marker

use crate::analysis::stats::{mean, std_dev};
use crate::config::RhythmConfig;
use crate::error::FeatureError;
use crate::features::FeatureResult;

/// Inter-onset interval statistics in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalStats {
    pub mean: f64,
    pub sd: f64,
}

impl IntervalStats {
    /// SD / mean; regularity improves as this approaches 0
    pub fn coefficient_of_variation(&self) -> FeatureResult {
        if self.mean > 0.0 {
            Ok(self.sd / self.mean)
        } else {
            Err(FeatureError::degenerate("mean inter-onset interval is 0"))
        }
    }
}

/// Onsets per second across the span of detected onsets
pub fn ddk_rate(onsets: &[f64]) -> FeatureResult {
    if onsets.len() < 2 {
        return Err(FeatureError::insufficient("onsets", 2, onsets.len()));
    }
    let span = onsets[onsets.len() - 1] - onsets[0];
    if span <= 0.0 {
        return Err(FeatureError::degenerate("onsets span no time"));
    }
    Ok(onsets.len() as f64 / span)
}

/// Strictly positive gaps between consecutive onsets
pub fn inter_onset_intervals(onsets: &[f64]) -> Vec<f64> {
    onsets
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .filter(|&ioi| ioi > 0.0)
        .collect()
}

/// Interval mean and population SD; needs three onsets
pub fn interval_stats(onsets: &[f64]) -> Result<IntervalStats, FeatureError> {
    if onsets.len() < 3 {
        return Err(FeatureError::insufficient("onsets", 3, onsets.len()));
    }
    let intervals = inter_onset_intervals(onsets);
    match (mean(&intervals), std_dev(&intervals)) {
        (Some(mean), Some(sd)) => Ok(IntervalStats { mean, sd }),
        _ => Err(FeatureError::insufficient("positive intervals", 1, 0)),
    }
}

/// Whether the second half of the intervals is markedly shorter than the first
pub fn festination(onsets: &[f64], config: &RhythmConfig) -> Result<bool, FeatureError> {
    if onsets.len() < config.festination_min_onsets {
        return Err(FeatureError::insufficient(
            "onsets",
            config.festination_min_onsets,
            onsets.len(),
        ));
    }
    let intervals = inter_onset_intervals(onsets);
    if intervals.len() < config.festination_min_intervals.max(2) {
        return Err(FeatureError::insufficient(
            "positive intervals",
            config.festination_min_intervals.max(2),
            intervals.len(),
        ));
    }

    let (first, second) = intervals.split_at(intervals.len() / 2);
    let first_mean = mean(first).unwrap_or(0.0);
    let second_mean = mean(second).unwrap_or(0.0);
    let ratio = if first_mean > 0.0 {
        second_mean / first_mean
    } else {
        1.0
    };

    tracing::trace!(ratio, "Festination interval ratio");
    Ok(ratio < config.festination_ratio)
}
