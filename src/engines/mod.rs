// Engines module - Seams for external measurement engines
//
// The feature core never implements pitch-synchronous perturbation,
// nonlinear dynamics, MFCC extraction or harmonic/percussive separation
// itself. Callers plug implementations in through these traits; any engine
// left out turns only its dependent keys unavailable.
//
// Module organization:
// - mod.rs: engine traits, measure kinds, the Engines bundle
// - precomputed: engine implementation backed by values measured elsewhere

mod precomputed;

pub use precomputed::PrecomputedMeasures;

use serde::{Deserialize, Serialize};

use crate::error::FeatureError;
use crate::features::FeatureResult;
use crate::signal::Waveform;

pub const PERTURBATION_ENGINE: &str = "perturbation";
pub const NONLINEAR_ENGINE: &str = "nonlinear dynamics";
pub const CEPSTRAL_ENGINE: &str = "cepstral coefficients";
pub const HARMONIC_ENGINE: &str = "harmonic separator";

/// Cycle-to-cycle period perturbation measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JitterKind {
    Local,
    LocalAbsolute,
    Rap,
    Ppq5,
    Ddp,
}

impl JitterKind {
    pub const ALL: [JitterKind; 5] = [
        JitterKind::Local,
        JitterKind::LocalAbsolute,
        JitterKind::Rap,
        JitterKind::Ppq5,
        JitterKind::Ddp,
    ];

    /// Feature key this measure is reported under
    pub fn key(&self) -> &'static str {
        match self {
            JitterKind::Local => "jitter_local",
            JitterKind::LocalAbsolute => "jitter_local_abs",
            JitterKind::Rap => "jitter_rap",
            JitterKind::Ppq5 => "jitter_ppq5",
            JitterKind::Ddp => "jitter_ddp",
        }
    }
}

/// Cycle-to-cycle amplitude perturbation measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShimmerKind {
    Local,
    LocalDb,
    Apq3,
    Apq5,
    Apq11,
    Dda,
}

impl ShimmerKind {
    pub const ALL: [ShimmerKind; 6] = [
        ShimmerKind::Local,
        ShimmerKind::LocalDb,
        ShimmerKind::Apq3,
        ShimmerKind::Apq5,
        ShimmerKind::Apq11,
        ShimmerKind::Dda,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ShimmerKind::Local => "shimmer_local",
            ShimmerKind::LocalDb => "shimmer_local_db",
            ShimmerKind::Apq3 => "shimmer_apq3",
            ShimmerKind::Apq5 => "shimmer_apq5",
            ShimmerKind::Apq11 => "shimmer_apq11",
            ShimmerKind::Dda => "shimmer_dda",
        }
    }
}

/// Jitter, shimmer and harmonics-to-noise ratio over the waveform's
/// periodic point process
pub trait PerturbationEngine {
    fn jitter(&self, waveform: &Waveform, kind: JitterKind) -> FeatureResult;

    fn shimmer(&self, waveform: &Waveform, kind: ShimmerKind) -> FeatureResult;

    /// Mean harmonics-to-noise ratio in dB
    fn harmonicity(&self, waveform: &Waveform) -> FeatureResult;
}

/// Nonlinear dynamics measures over an already decimated series
pub trait NonlinearDynamics {
    fn sample_entropy(&self, series: &[f64], emb_dim: usize) -> FeatureResult;

    /// Detrended fluctuation analysis scaling exponent
    fn detrended_fluctuation(&self, series: &[f64]) -> FeatureResult;

    fn correlation_dimension(&self, series: &[f64], emb_dim: usize) -> FeatureResult;
}

/// Mel-frequency cepstral coefficient extraction
pub trait CepstralCoefficients {
    /// One row per coefficient, one column per frame
    fn mfcc(&self, waveform: &Waveform, n_coefficients: usize) -> Result<Vec<Vec<f64>>, FeatureError>;
}

/// Harmonic/percussive source separation
pub trait HarmonicSeparator {
    /// Harmonic component, sample-aligned with the input
    fn harmonic(&self, waveform: &Waveform) -> Result<Vec<f64>, FeatureError>;
}

/// Borrowed handles to whichever engines the caller has available
#[derive(Clone, Copy, Default)]
pub struct Engines<'a> {
    pub perturbation: Option<&'a dyn PerturbationEngine>,
    pub nonlinear: Option<&'a dyn NonlinearDynamics>,
    pub cepstral: Option<&'a dyn CepstralCoefficients>,
    pub harmonic: Option<&'a dyn HarmonicSeparator>,
}

impl<'a> Engines<'a> {
    /// No engines: every engine-backed key is unavailable
    pub fn none() -> Self {
        Self::default()
    }

    /// Route every engine to one implementation
    pub fn all<E>(engine: &'a E) -> Self
    where
        E: PerturbationEngine + NonlinearDynamics + CepstralCoefficients + HarmonicSeparator,
    {
        Self {
            perturbation: Some(engine),
            nonlinear: Some(engine),
            cepstral: Some(engine),
            harmonic: Some(engine),
        }
    }

    pub fn with_perturbation(mut self, engine: &'a dyn PerturbationEngine) -> Self {
        self.perturbation = Some(engine);
        self
    }

    pub fn with_nonlinear(mut self, engine: &'a dyn NonlinearDynamics) -> Self {
        self.nonlinear = Some(engine);
        self
    }

    pub fn with_cepstral(mut self, engine: &'a dyn CepstralCoefficients) -> Self {
        self.cepstral = Some(engine);
        self
    }

    pub fn with_harmonic(mut self, engine: &'a dyn HarmonicSeparator) -> Self {
        self.harmonic = Some(engine);
        self
    }

    pub fn perturbation(&self) -> Result<&'a dyn PerturbationEngine, FeatureError> {
        self.perturbation.ok_or(FeatureError::EngineUnavailable {
            engine: PERTURBATION_ENGINE,
        })
    }

    pub fn nonlinear(&self) -> Result<&'a dyn NonlinearDynamics, FeatureError> {
        self.nonlinear.ok_or(FeatureError::EngineUnavailable {
            engine: NONLINEAR_ENGINE,
        })
    }

    pub fn cepstral(&self) -> Result<&'a dyn CepstralCoefficients, FeatureError> {
        self.cepstral.ok_or(FeatureError::EngineUnavailable {
            engine: CEPSTRAL_ENGINE,
        })
    }

    pub fn harmonic(&self) -> Result<&'a dyn HarmonicSeparator, FeatureError> {
        self.harmonic.ok_or(FeatureError::EngineUnavailable {
            engine: HARMONIC_ENGINE,
        })
    }
}

impl std::fmt::Debug for Engines<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engines")
            .field("perturbation", &self.perturbation.is_some())
            .field("nonlinear", &self.nonlinear.is_some())
            .field("cepstral", &self.cepstral.is_some())
            .field("harmonic", &self.harmonic.is_some())
            .finish()
    }
}

/// Decimation step bringing `len` samples down to roughly `target_len`
pub fn decimation_step(len: usize, target_len: usize) -> usize {
    if target_len == 0 {
        return 1;
    }
    (len / target_len).max(1)
}

/// Mean of one MFCC row (row 1 is the second coefficient)
pub fn mfcc_row_mean(rows: &[Vec<f64>], row: usize) -> FeatureResult {
    let values = rows
        .get(row)
        .ok_or_else(|| FeatureError::insufficient("MFCC rows", row + 1, rows.len()))?;
    if values.is_empty() {
        return Err(FeatureError::insufficient("MFCC frames", 1, 0));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Harmonic-component energy as a share of total signal energy
pub fn harmonic_energy_ratio(waveform: &Waveform, harmonic: &[f64]) -> FeatureResult {
    let total: f64 = waveform
        .samples()
        .iter()
        .map(|&s| (s as f64) * (s as f64))
        .sum();
    if total <= 0.0 {
        return Err(FeatureError::degenerate("silent waveform"));
    }
    let harmonic_energy: f64 = harmonic.iter().map(|h| h * h).sum();
    Ok(harmonic_energy / total)
}

/// Noise-to-harmonics ratio (linear) from HNR in dB
pub fn noise_to_harmonics(hnr_db: f64) -> FeatureResult {
    if hnr_db == 0.0 {
        return Err(FeatureError::degenerate("HNR of exactly 0 dB"));
    }
    Ok(1.0 / 10f64.powf(hnr_db / 10.0))
}
