// Precomputed engine measures
//
// Lets an out-of-process toolchain (a phonetics package, a DSP library in
// another runtime) measure the engine-backed values and hand them over in
// the analysis request. Any measure left out reports EngineUnavailable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    CepstralCoefficients, HarmonicSeparator, JitterKind, NonlinearDynamics, PerturbationEngine,
    ShimmerKind, CEPSTRAL_ENGINE, HARMONIC_ENGINE, NONLINEAR_ENGINE, PERTURBATION_ENGINE,
};
use crate::error::FeatureError;
use crate::features::FeatureResult;
use crate::signal::Waveform;

/// Engine values measured ahead of time
///
/// ```json
/// {
///   "jitter": {"local": 0.0042, "rap": 0.0021},
///   "shimmer": {"local": 0.031, "local_db": 0.28},
///   "hnr": 18.4,
///   "sample_entropy": 0.61,
///   "mfcc": [[-310.2, -298.7], [92.1, 88.4]]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecomputedMeasures {
    pub jitter: BTreeMap<JitterKind, f64>,
    pub shimmer: BTreeMap<ShimmerKind, f64>,
    /// Mean harmonics-to-noise ratio in dB
    pub hnr: Option<f64>,
    pub sample_entropy: Option<f64>,
    pub detrended_fluctuation: Option<f64>,
    pub correlation_dimension: Option<f64>,
    /// Coefficient rows, one column per frame
    pub mfcc: Option<Vec<Vec<f64>>>,
    /// Harmonic component, sample-aligned with the waveform
    pub harmonic: Option<Vec<f64>>,
}

fn supplied(value: Option<f64>, engine: &'static str) -> FeatureResult {
    value.ok_or(FeatureError::EngineUnavailable { engine })
}

impl PerturbationEngine for PrecomputedMeasures {
    fn jitter(&self, _waveform: &Waveform, kind: JitterKind) -> FeatureResult {
        supplied(self.jitter.get(&kind).copied(), PERTURBATION_ENGINE)
    }

    fn shimmer(&self, _waveform: &Waveform, kind: ShimmerKind) -> FeatureResult {
        supplied(self.shimmer.get(&kind).copied(), PERTURBATION_ENGINE)
    }

    fn harmonicity(&self, _waveform: &Waveform) -> FeatureResult {
        supplied(self.hnr, PERTURBATION_ENGINE)
    }
}

impl NonlinearDynamics for PrecomputedMeasures {
    fn sample_entropy(&self, _series: &[f64], _emb_dim: usize) -> FeatureResult {
        supplied(self.sample_entropy, NONLINEAR_ENGINE)
    }

    fn detrended_fluctuation(&self, _series: &[f64]) -> FeatureResult {
        supplied(self.detrended_fluctuation, NONLINEAR_ENGINE)
    }

    fn correlation_dimension(&self, _series: &[f64], _emb_dim: usize) -> FeatureResult {
        supplied(self.correlation_dimension, NONLINEAR_ENGINE)
    }
}

impl CepstralCoefficients for PrecomputedMeasures {
    fn mfcc(&self, _waveform: &Waveform, n_coefficients: usize) -> Result<Vec<Vec<f64>>, FeatureError> {
        let rows = self.mfcc.as_ref().ok_or(FeatureError::EngineUnavailable {
            engine: CEPSTRAL_ENGINE,
        })?;
        Ok(rows.iter().take(n_coefficients).cloned().collect())
    }
}

impl HarmonicSeparator for PrecomputedMeasures {
    fn harmonic(&self, waveform: &Waveform) -> Result<Vec<f64>, FeatureError> {
        let harmonic = self.harmonic.as_ref().ok_or(FeatureError::EngineUnavailable {
            engine: HARMONIC_ENGINE,
        })?;
        if harmonic.len() != waveform.len() {
            return Err(FeatureError::EngineFailed {
                engine: HARMONIC_ENGINE,
                details: format!(
                    "harmonic component has {} samples, waveform has {}",
                    harmonic.len(),
                    waveform.len()
                ),
            });
        }
        Ok(harmonic.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_measure_names() {
        let measures: PrecomputedMeasures = serde_json::from_str(
            r#"{
                "jitter": {"local": 0.004, "local_absolute": 0.00003, "ppq5": 0.002},
                "shimmer": {"local_db": 0.3, "apq11": 0.05},
                "hnr": 17.5
            }"#,
        )
        .unwrap();

        let waveform = Waveform::new(vec![0.0; 16], 16_000);
        assert_eq!(measures.jitter(&waveform, JitterKind::Local), Ok(0.004));
        assert_eq!(measures.jitter(&waveform, JitterKind::Ppq5), Ok(0.002));
        assert_eq!(measures.shimmer(&waveform, ShimmerKind::Apq11), Ok(0.05));
        assert_eq!(measures.harmonicity(&waveform), Ok(17.5));
        assert!(matches!(
            measures.jitter(&waveform, JitterKind::Rap),
            Err(FeatureError::EngineUnavailable { .. })
        ));
        assert!(measures.sample_entropy(&[], 2).is_err());
    }

    #[test]
    fn test_mfcc_truncates_to_requested_rows() {
        let measures = PrecomputedMeasures {
            mfcc: Some(vec![vec![1.0], vec![2.0], vec![3.0]]),
            ..Default::default()
        };
        let waveform = Waveform::new(vec![0.0; 16], 16_000);
        assert_eq!(measures.mfcc(&waveform, 2).unwrap().len(), 2);
    }

    #[test]
    fn test_harmonic_length_must_match() {
        let measures = PrecomputedMeasures {
            harmonic: Some(vec![0.1; 8]),
            ..Default::default()
        };
        let waveform = Waveform::new(vec![0.2; 16], 16_000);
        assert!(matches!(
            measures.harmonic(&waveform),
            Err(FeatureError::EngineFailed { .. })
        ));
    }
}
