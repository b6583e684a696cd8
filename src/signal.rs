//! Input data model
//!
//! Every type here is produced once per recording (by the audio decoder or an
//! external analysis engine) and only ever borrowed by the feature code.

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Nominal sample rate the feature definitions were calibrated at
pub const EXPECTED_SAMPLE_RATE: u32 = 16_000;

/// Mono waveform with its sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds (0 for a zero sample rate)
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Check the preconditions every feature relies on
    pub fn validate(&self) -> Result<(), InputError> {
        if self.sample_rate == 0 {
            return Err(InputError::InvalidSampleRate {
                sample_rate: self.sample_rate,
            });
        }
        if self.samples.is_empty() {
            return Err(InputError::EmptyWaveform);
        }
        if let Some(index) = self.samples.iter().position(|s| !s.is_finite()) {
            return Err(InputError::NonFiniteSamples { index });
        }
        Ok(())
    }

    /// Every `step`-th sample widened to f64, as handed to nonlinear engines
    pub fn decimated(&self, step: usize) -> Vec<f64> {
        self.samples
            .iter()
            .step_by(step.max(1))
            .map(|&s| s as f64)
            .collect()
    }
}

/// Per-frame F0 track from the pitch engine
///
/// A frequency of 0 marks an unvoiced frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchContour {
    pub frequencies: Vec<f64>,
    /// Engine-reported hop between frames in seconds
    pub time_step: f64,
    /// Centre time of frame 0 in seconds
    #[serde(default)]
    pub first_frame_time: f64,
}

impl PitchContour {
    pub fn new(frequencies: Vec<f64>, time_step: f64, first_frame_time: f64) -> Self {
        Self {
            frequencies,
            time_step,
            first_frame_time,
        }
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn is_voiced(f0: f64) -> bool {
        f0 > 0.0
    }

    /// Indices of voiced frames, in order
    pub fn voiced_indices(&self) -> Vec<usize> {
        self.frequencies
            .iter()
            .enumerate()
            .filter(|(_, &f0)| Self::is_voiced(f0))
            .map(|(i, _)| i)
            .collect()
    }

    /// F0 values of voiced frames, in order
    pub fn voiced(&self) -> Vec<f64> {
        self.frequencies
            .iter()
            .copied()
            .filter(|&f0| Self::is_voiced(f0))
            .collect()
    }

    /// Centre time of a frame in seconds
    pub fn frame_time(&self, index: usize) -> f64 {
        index as f64 * self.time_step + self.first_frame_time
    }
}

/// One analysis frame of the formant engine; `None` marks an undefined value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FormantFrame {
    #[serde(default)]
    pub f1: Option<f64>,
    #[serde(default)]
    pub f2: Option<f64>,
    /// Bandwidth of F1 in Hz
    #[serde(default)]
    pub f1_bandwidth: Option<f64>,
}

/// Formant frames in time order
pub type FormantTrack = Vec<FormantFrame>;

/// Detected syllable onsets in seconds, increasing
pub type OnsetTimes = Vec<f64>;

/// A recognised word with timestamps in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTimestamp {
    #[serde(alias = "word")]
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl WordTimestamp {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Signed duration; may be negative for malformed recogniser output
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn midpoint(&self) -> f64 {
        self.start + self.duration() / 2.0
    }
}

/// Words ordered by start time
pub type Transcript = Vec<WordTimestamp>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_validation() {
        assert_eq!(
            Waveform::new(vec![], 16_000).validate(),
            Err(InputError::EmptyWaveform)
        );
        assert_eq!(
            Waveform::new(vec![0.0; 10], 0).validate(),
            Err(InputError::InvalidSampleRate { sample_rate: 0 })
        );
        assert_eq!(
            Waveform::new(vec![0.0, f32::NAN, 0.0], 16_000).validate(),
            Err(InputError::NonFiniteSamples { index: 1 })
        );
        assert!(Waveform::new(vec![0.1; 10], 16_000).validate().is_ok());
    }

    #[test]
    fn test_waveform_duration_and_decimation() {
        let waveform = Waveform::new((0..16_000).map(|i| i as f32).collect(), 16_000);
        assert_eq!(waveform.duration_secs(), 1.0);

        let decimated = waveform.decimated(4000);
        assert_eq!(decimated, vec![0.0, 4000.0, 8000.0, 12000.0]);
    }

    #[test]
    fn test_pitch_contour_voicing() {
        let contour = PitchContour::new(vec![0.0, 120.0, 0.0, 130.0], 0.01, 0.02);
        assert_eq!(contour.voiced_indices(), vec![1, 3]);
        assert_eq!(contour.voiced(), vec![120.0, 130.0]);
        assert!((contour.frame_time(3) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_word_timestamp_accepts_word_alias() {
        let word: WordTimestamp =
            serde_json::from_str(r#"{"word": "hello", "start": 0.5, "end": 0.9}"#).unwrap();
        assert_eq!(word.text, "hello");
        assert!((word.midpoint() - 0.7).abs() < 1e-12);
    }
}
