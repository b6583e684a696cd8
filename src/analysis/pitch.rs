// Pitch module - Features read straight off the F0 contour
//
// - PitchSummary: mean, population SD, min and max of voiced F0
// - Pitch period entropy (PPE): Shannon entropy of the semitone-step
//   histogram, after Little et al. (2009)
// - Articulation rate proxy: share of voiced frames

use crate::analysis::stats::{mean, std_dev};
use crate::config::PitchEntropyConfig;
use crate::error::FeatureError;
use crate::features::FeatureResult;
use crate::signal::PitchContour;

/// Voiced F0 statistics in Hz
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchSummary {
    pub mean: f64,
    pub sd: f64,
    pub min: f64,
    pub max: f64,
}

impl PitchSummary {
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Summarize the voiced part of a contour
pub fn pitch_summary(contour: &PitchContour) -> Result<PitchSummary, FeatureError> {
    let voiced = contour.voiced();
    let (Some(mean), Some(sd)) = (mean(&voiced), std_dev(&voiced)) else {
        return Err(FeatureError::insufficient("voiced frames", 1, 0));
    };
    let min = voiced.iter().copied().fold(f64::INFINITY, f64::min);
    let max = voiced.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok(PitchSummary { mean, sd, min, max })
}

/// Equal-width histogram counts over the data range
///
/// Mirrors the usual numeric-library convention: the last bin is closed on
/// the right, and a constant input is binned over `[v - 0.5, v + 0.5]`.
fn histogram(values: &[f64], bins: usize) -> Vec<usize> {
    let mut counts = vec![0usize; bins];
    if values.is_empty() || bins == 0 {
        return counts;
    }
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let edges = bin_edges(lo, hi, bins);
    let width = hi - lo;
    for &v in values {
        let mut bin = ((((v - lo) / width) * bins as f64) as usize).min(bins - 1);
        // The scaled index can land one off for values on an edge
        if v < edges[bin] && bin > 0 {
            bin -= 1;
        } else if bin + 1 < bins && v >= edges[bin + 1] {
            bin += 1;
        }
        counts[bin] += 1;
    }
    counts
}

/// `bins + 1` edges as `i · step + lo`, with the last edge pinned to `hi`
fn bin_edges(lo: f64, hi: f64, bins: usize) -> Vec<f64> {
    let step = (hi - lo) / bins as f64;
    let mut edges: Vec<f64> = (0..=bins).map(|i| i as f64 * step + lo).collect();
    edges[bins] = hi;
    edges
}

/// Pitch period entropy in bits
///
/// Always lies in `[0, log2(bins)]`.
pub fn pitch_period_entropy(contour: &PitchContour, config: &PitchEntropyConfig) -> FeatureResult {
    let voiced = contour.voiced();
    if voiced.len() < 3 {
        return Err(FeatureError::insufficient("voiced frames", 3, voiced.len()));
    }
    if config.histogram_bins == 0 {
        return Err(FeatureError::InvalidInput {
            reason: "PPE histogram needs at least one bin".to_string(),
        });
    }

    let steps: Vec<f64> = voiced
        .windows(2)
        .map(|pair| 12.0 * (pair[1] / pair[0]).log2())
        .filter(|st| st.is_finite())
        .collect();
    if steps.is_empty() {
        return Err(FeatureError::degenerate("no finite semitone steps"));
    }

    let counts = histogram(&steps, config.histogram_bins);
    let total = steps.len() as f64;
    let entropy = counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum::<f64>();

    Ok(entropy.max(0.0))
}

/// Fraction of pitch frames that are voiced
pub fn articulation_rate(contour: &PitchContour) -> FeatureResult {
    if contour.is_empty() {
        return Err(FeatureError::insufficient("pitch frames", 1, 0));
    }
    Ok(contour.voiced_indices().len() as f64 / contour.len() as f64)
}
