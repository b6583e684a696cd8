//! Feature-set composition
//!
//! Picks the feature groups for a task, runs each one in isolation, merges
//! their keys and sanitizes the result. The waveform is the only input whose
//! defects abort a composition; everything else degrades per key.

mod groups;
mod task;

pub use groups::{
    AnalysisInputs, FeatureGroup, GroupContext, FORMANT_TRACKER, ONSET_DETECTOR, PITCH_TRACKER,
};
pub use task::TaskType;

use crate::analysis::spectrum::FrameAnalyzer;
use crate::config::AnalysisConfig;
use crate::engines::Engines;
use crate::error::{log_input_error, InputError};
use crate::features::{FeatureSet, Sanitizer};
use crate::signal::EXPECTED_SAMPLE_RATE;

/// Runs the feature groups for a task under one configuration
#[derive(Debug, Clone, Default)]
pub struct FeatureComposer {
    config: AnalysisConfig,
}

impl FeatureComposer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Groups to run for a task; temporal indicators join whenever a
    /// transcript is present
    pub fn plan(task: TaskType, inputs: &AnalysisInputs<'_>) -> Vec<FeatureGroup> {
        let mut groups = task.groups().to_vec();
        if inputs.transcript.is_some() {
            groups.push(FeatureGroup::Temporal);
        }
        groups
    }

    /// Compute the sanitized feature set for one recording
    ///
    /// # Errors
    /// Returns `InputError` only when the waveform itself is unusable (no
    /// samples, zero sample rate, non-finite samples).
    pub fn compute(
        &self,
        task: TaskType,
        inputs: &AnalysisInputs<'_>,
        engines: &Engines<'_>,
    ) -> Result<FeatureSet, InputError> {
        if let Err(err) = inputs.waveform.validate() {
            log_input_error(&err, "compose");
            return Err(err);
        }

        let sample_rate = inputs.waveform.sample_rate();
        if sample_rate != EXPECTED_SAMPLE_RATE {
            tracing::warn!(
                sample_rate,
                expected = EXPECTED_SAMPLE_RATE,
                "Waveform is not at the calibrated sample rate; values may not be comparable"
            );
        }

        let analyzer = FrameAnalyzer::new(sample_rate);
        let ctx = GroupContext {
            config: &self.config,
            analyzer: &analyzer,
            inputs,
            engines,
        };

        let mut features = FeatureSet::new();
        for group in Self::plan(task, inputs) {
            let _span = tracing::debug_span!("feature_group", ?group).entered();
            let group_features = group.compute(&ctx);
            tracing::debug!(
                keys = group_features.len(),
                available = group_features.available_count(),
                "Group computed"
            );
            features.merge(group_features);
        }

        let features = Sanitizer::new(&self.config.sanitizer).sanitize(features);
        tracing::info!(
            task = %task,
            duration_s = inputs.waveform.duration_secs(),
            keys = features.len(),
            available = features.available_count(),
            "Feature set composed"
        );
        Ok(features)
    }
}

/// Compute features with the default configuration
pub fn compute_features(
    task: TaskType,
    inputs: &AnalysisInputs<'_>,
    engines: &Engines<'_>,
) -> Result<FeatureSet, InputError> {
    FeatureComposer::default().compute(task, inputs, engines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureValue;
    use crate::signal::{PitchContour, Waveform, WordTimestamp};

    fn voiced_sine(secs: f32) -> Waveform {
        let n = (16_000.0 * secs) as usize;
        let samples = (0..n)
            .map(|i| 0.4 * (2.0 * std::f32::consts::PI * 150.0 * i as f32 / 16_000.0).sin())
            .collect();
        Waveform::new(samples, 16_000)
    }

    #[test]
    fn test_invalid_waveform_is_the_only_outward_error() {
        let empty = Waveform::new(vec![], 16_000);
        let result = compute_features(
            TaskType::Conversation,
            &AnalysisInputs::new(&empty),
            &Engines::none(),
        );
        assert_eq!(result, Err(InputError::EmptyWaveform));
    }

    #[test]
    fn test_task_keys_match_composition() {
        let waveform = voiced_sine(1.0);
        let pitch = PitchContour::new(vec![150.0; 96], 0.01, 0.02);
        let words = vec![
            WordTimestamp::new("the", 0.0, 0.1),
            WordTimestamp::new("elephant", 0.3, 0.9),
        ];
        for task in TaskType::ALL {
            for with_transcript in [false, true] {
                let mut inputs = AnalysisInputs::new(&waveform).with_pitch(&pitch);
                if with_transcript {
                    inputs = inputs.with_transcript(&words);
                }
                let features = compute_features(task, &inputs, &Engines::none()).unwrap();
                let keys: Vec<&str> = features.keys().collect();
                assert_eq!(keys, task.feature_keys(with_transcript), "task {}", task);
            }
        }
    }

    #[test]
    fn test_output_is_sanitized() {
        let waveform = voiced_sine(1.0);
        let pitch = PitchContour::new(vec![150.0; 96], 0.01, 0.02);
        let inputs = AnalysisInputs::new(&waveform).with_pitch(&pitch);
        let features =
            compute_features(TaskType::SustainedVowel, &inputs, &Engines::none()).unwrap();

        for (key, value) in features.iter() {
            if let FeatureValue::Number(v) = value {
                assert!(v.is_finite(), "{} not finite", key);
                assert_eq!(*v, crate::features::round_to(*v, 6), "{} not rounded", key);
            }
        }
        assert_eq!(features.get("f0_mean").and_then(|v| v.as_f64()), Some(150.0));
    }

    #[test]
    fn test_non_default_rate_still_composes() {
        let samples = vec![0.1f32; 8_000];
        let waveform = Waveform::new(samples, 8_000);
        let features = compute_features(
            TaskType::Fluency,
            &AnalysisInputs::new(&waveform),
            &Engines::none(),
        )
        .unwrap();
        assert!(features.contains_key("spectral_tilt"));
    }
}
