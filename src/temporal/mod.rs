//! Temporal indicators from word-level timestamps
//!
//! Five scalar indicators derived only from a transcript's `(word, start,
//! end)` triples and the recording length. Negative gaps between words
//! (overlapping recogniser output) are clamped to zero, never rejected.

mod lexicon;

pub use lexicon::{estimate_syllables, is_function_word, is_likely_noun};

use crate::analysis::stats::{mean, std_dev};
use crate::config::TemporalConfig;
use crate::error::FeatureError;
use crate::features::{round_to, FeatureResult};
use crate::signal::WordTimestamp;

/// The five indicators, each independently available or not
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalIndicators {
    pub pause_before_noun: FeatureResult,
    pub pause_variability: FeatureResult,
    pub syllable_rate_decay: FeatureResult,
    pub word_duration_mean: FeatureResult,
    pub voiced_ratio: FeatureResult,
}

impl TemporalIndicators {
    fn all_failed(err: FeatureError) -> Self {
        Self {
            pause_before_noun: Err(err.clone()),
            pause_variability: Err(err.clone()),
            syllable_rate_decay: Err(err.clone()),
            word_duration_mean: Err(err.clone()),
            voiced_ratio: Err(err),
        }
    }
}

/// Gap before each word after the first, clamped at zero
pub fn inter_word_pauses(words: &[WordTimestamp]) -> Vec<f64> {
    words
        .windows(2)
        .map(|pair| (pair[1].start - pair[0].end).max(0.0))
        .collect()
}

/// Mean pause preceding words that look like nouns
pub fn pause_before_noun(words: &[WordTimestamp], config: &TemporalConfig) -> FeatureResult {
    let noun_pauses: Vec<f64> = words
        .windows(2)
        .filter(|pair| is_likely_noun(&pair[1].text, config.noun_min_chars))
        .map(|pair| (pair[1].start - pair[0].end).max(0.0))
        .collect();
    mean(&noun_pauses).ok_or_else(|| FeatureError::insufficient("likely nouns", 1, 0))
}

/// Coefficient of variation of all inter-word pauses
///
/// Identical pauses have no variability to speak of, so an SD of zero
/// (within rounding of the mean) is reported unavailable.
pub fn pause_variability(words: &[WordTimestamp]) -> FeatureResult {
    let pauses = inter_word_pauses(words);
    if pauses.len() < 2 {
        return Err(FeatureError::insufficient("pauses", 2, pauses.len()));
    }
    let (Some(mean), Some(sd)) = (mean(&pauses), std_dev(&pauses)) else {
        return Err(FeatureError::insufficient("pauses", 2, 0));
    };
    if mean <= 0.0 {
        return Err(FeatureError::degenerate("no pause between any words"));
    }
    if sd <= mean * 1e-12 {
        return Err(FeatureError::degenerate("all pauses are identical"));
    }
    Ok(sd / mean)
}

/// Syllable rate of the second half of the utterance over the first
///
/// Halves are split by comparing each word's midpoint with the midpoint of
/// the span from the first word's start to the last word's end.
pub fn syllable_rate_decay(words: &[WordTimestamp]) -> FeatureResult {
    let (Some(first), Some(last)) = (words.first(), words.last()) else {
        return Err(FeatureError::insufficient("words", 2, 0));
    };
    let split = (first.start + last.end) / 2.0;

    let (mut syllables_first, mut duration_first) = (0usize, 0.0);
    let (mut syllables_second, mut duration_second) = (0usize, 0.0);
    for word in words {
        let syllables = estimate_syllables(&word.text);
        if word.midpoint() < split {
            syllables_first += syllables;
            duration_first += word.duration();
        } else {
            syllables_second += syllables;
            duration_second += word.duration();
        }
    }

    let rate = |syllables: usize, duration: f64| {
        if duration > 0.0 {
            syllables as f64 / duration
        } else {
            0.0
        }
    };
    let rate_first = rate(syllables_first, duration_first);
    let rate_second = rate(syllables_second, duration_second);
    if rate_first <= 0.0 {
        return Err(FeatureError::degenerate("first half has no speaking time"));
    }
    Ok(rate_second / rate_first)
}

/// Mean duration of words with positive length
pub fn word_duration_mean(words: &[WordTimestamp]) -> FeatureResult {
    let durations: Vec<f64> = words
        .iter()
        .map(WordTimestamp::duration)
        .filter(|&d| d > 0.0)
        .collect();
    mean(&durations).ok_or_else(|| FeatureError::insufficient("words with duration", 1, 0))
}

/// Share of the recording covered by words
pub fn voiced_ratio(words: &[WordTimestamp], total_duration: f64) -> FeatureResult {
    if total_duration <= 0.0 {
        return Err(FeatureError::InvalidInput {
            reason: format!("recording duration {}s", total_duration),
        });
    }
    let spoken: f64 = words.iter().map(|w| w.duration().max(0.0)).sum();
    Ok(spoken / total_duration)
}

/// Compute all five indicators, rounded to the configured precision
pub fn temporal_indicators(
    words: &[WordTimestamp],
    total_duration: f64,
    config: &TemporalConfig,
) -> TemporalIndicators {
    if words.len() < 2 {
        return TemporalIndicators::all_failed(FeatureError::insufficient(
            "transcript words",
            2,
            words.len(),
        ));
    }

    let round = |result: FeatureResult| result.map(|v| round_to(v, config.decimals));
    TemporalIndicators {
        pause_before_noun: round(pause_before_noun(words, config)),
        pause_variability: round(pause_variability(words)),
        syllable_rate_decay: round(syllable_rate_decay(words)),
        word_duration_mean: round(word_duration_mean(words)),
        voiced_ratio: round(voiced_ratio(words, total_duration)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transcript() -> Vec<WordTimestamp> {
        vec![
            WordTimestamp::new("the", 0.0, 0.1),
            WordTimestamp::new("elephant", 0.3, 0.9),
            WordTimestamp::new("ran", 1.0, 1.2),
        ]
    }

    #[test]
    fn test_indicators_for_sample_transcript() {
        let indicators =
            temporal_indicators(&sample_transcript(), 1.5, &TemporalConfig::default());
        assert_eq!(indicators.pause_before_noun, Ok(0.2));
        assert_eq!(indicators.word_duration_mean, Ok(0.3));
        assert_eq!(indicators.voiced_ratio, Ok(0.6));
        // Pauses 0.2 and 0.1: SD 0.05 over mean 0.15
        assert_eq!(indicators.pause_variability, Ok(0.3333));
    }

    #[test]
    fn test_syllable_rate_decay_halves() {
        // Split at 1.0 s: 2 syllables in 0.4 s, then 4 syllables in 0.9 s
        let words = vec![
            WordTimestamp::new("one", 0.0, 0.2),
            WordTimestamp::new("two", 0.3, 0.5),
            WordTimestamp::new("banana", 1.0, 1.6),
            WordTimestamp::new("apple", 1.7, 2.0),
        ];
        let decay = syllable_rate_decay(&words).unwrap();
        let expected = (4.0 / 0.9) / (2.0 / 0.4);
        assert!((decay - expected).abs() < 1e-9, "Got {}", decay);
    }

    #[test]
    fn test_identical_pauses_leave_variability_undefined() {
        let words = vec![
            WordTimestamp::new("one", 0.0, 0.2),
            WordTimestamp::new("two", 0.5, 0.7),
            WordTimestamp::new("three", 1.0, 1.2),
            WordTimestamp::new("four", 1.5, 1.7),
        ];
        assert!(matches!(
            pause_variability(&words),
            Err(FeatureError::Degenerate { .. })
        ));
    }

    #[test]
    fn test_overlapping_words_clamp_to_zero_pause() {
        let words = vec![
            WordTimestamp::new("hello", 0.0, 0.5),
            WordTimestamp::new("world", 0.4, 0.9),
        ];
        assert_eq!(inter_word_pauses(&words), vec![0.0]);
        assert_eq!(pause_before_noun(&words, &TemporalConfig::default()), Ok(0.0));
    }

    #[test]
    fn test_short_transcript_all_unavailable() {
        let one = vec![WordTimestamp::new("hello", 0.0, 0.5)];
        let indicators = temporal_indicators(&one, 1.0, &TemporalConfig::default());
        assert!(indicators.pause_before_noun.is_err());
        assert!(indicators.pause_variability.is_err());
        assert!(indicators.syllable_rate_decay.is_err());
        assert!(indicators.word_duration_mean.is_err());
        assert!(indicators.voiced_ratio.is_err());

        let none = temporal_indicators(&[], 1.0, &TemporalConfig::default());
        assert!(none.voiced_ratio.is_err());
    }

    #[test]
    fn test_edge_conditions() {
        let words = sample_transcript();
        assert!(voiced_ratio(&words, 0.0).is_err());

        // No likely nouns
        let plain = vec![
            WordTimestamp::new("to", 0.0, 0.1),
            WordTimestamp::new("be", 0.2, 0.3),
        ];
        assert!(pause_before_noun(&plain, &TemporalConfig::default()).is_err());

        // Zero-length words only
        let instant = vec![
            WordTimestamp::new("uh", 0.5, 0.5),
            WordTimestamp::new("um", 0.7, 0.7),
        ];
        assert!(word_duration_mean(&instant).is_err());
        assert!(syllable_rate_decay(&instant).is_err());
        assert_eq!(voiced_ratio(&instant, 1.0), Ok(0.0));
    }
}
