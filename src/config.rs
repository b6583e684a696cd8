//! Configuration management for analysis parameter tuning
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling experimentation with window sizes, frequency bands and
//! thresholds without recompilation. Defaults reproduce the reference
//! feature definitions exactly; changing them changes the biomarkers.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete analysis configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub cepstral: CepstralConfig,
    pub spectral_tilt: SpectralTiltConfig,
    pub tremor: TremorConfig,
    pub breathiness: BreathinessConfig,
    pub loudness: LoudnessConfig,
    pub pitch_entropy: PitchEntropyConfig,
    pub rhythm: RhythmConfig,
    pub temporal: TemporalConfig,
    pub nonlinear: NonlinearConfig,
    pub sanitizer: SanitizerConfig,
}

/// Cepstral peak prominence parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CepstralConfig {
    /// Analysis window in seconds
    pub frame_secs: f64,
    /// Hop between windows in seconds
    pub hop_secs: f64,
    /// Lowest pitch searched (sets the upper quefrency bound)
    pub min_pitch_hz: f64,
    /// Highest pitch searched (sets the lower quefrency bound)
    pub max_pitch_hz: f64,
}

impl Default for CepstralConfig {
    fn default() -> Self {
        Self {
            frame_secs: 0.04,
            hop_secs: 0.01,
            min_pitch_hz: 75.0,
            max_pitch_hz: 500.0,
        }
    }
}

/// Spectral tilt regression parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralTiltConfig {
    /// Longest stretch of audio analysed, from the start
    pub max_secs: f64,
    pub min_hz: f64,
    pub max_hz: f64,
}

impl Default for SpectralTiltConfig {
    fn default() -> Self {
        Self {
            max_secs: 2.0,
            min_hz: 50.0,
            max_hz: 8000.0,
        }
    }
}

/// Tremor band parameters for the F0 contour spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TremorConfig {
    pub band_low_hz: f64,
    pub band_high_hz: f64,
    /// Minimum voiced frames before the contour is interpolated
    pub min_voiced_frames: usize,
}

impl Default for TremorConfig {
    fn default() -> Self {
        Self {
            band_low_hz: 4.0,
            band_high_hz: 7.0,
            min_voiced_frames: 10,
        }
    }
}

/// H1-H2 breathiness parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreathinessConfig {
    /// Analysis window in seconds, centred on each pitch frame
    pub frame_secs: f64,
    /// Take every n-th voiced frame
    pub frame_stride: usize,
}

impl Default for BreathinessConfig {
    fn default() -> Self {
        Self {
            frame_secs: 0.04,
            frame_stride: 3,
        }
    }
}

/// RMS loudness decay parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoudnessConfig {
    pub frame_secs: f64,
    pub hop_secs: f64,
}

impl Default for LoudnessConfig {
    fn default() -> Self {
        Self {
            frame_secs: 0.025,
            hop_secs: 0.010,
        }
    }
}

/// Pitch period entropy parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchEntropyConfig {
    pub histogram_bins: usize,
}

impl Default for PitchEntropyConfig {
    fn default() -> Self {
        Self { histogram_bins: 30 }
    }
}

/// DDK rhythm parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmConfig {
    /// Second-half / first-half interval ratio below which festination is flagged
    pub festination_ratio: f64,
    pub festination_min_onsets: usize,
    pub festination_min_intervals: usize,
}

impl Default for RhythmConfig {
    fn default() -> Self {
        Self {
            festination_ratio: 0.85,
            festination_min_onsets: 6,
            festination_min_intervals: 4,
        }
    }
}

/// Temporal indicator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalConfig {
    /// Words must be longer than this to count as likely nouns
    pub noun_min_chars: usize,
    /// Decimal places kept on indicator values
    pub decimals: u32,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            noun_min_chars: 4,
            decimals: 4,
        }
    }
}

/// Decimation targets for the nonlinear dynamics engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NonlinearConfig {
    /// Approximate series length handed to sample entropy and DFA
    pub entropy_target_len: usize,
    /// Approximate series length handed to correlation dimension
    pub correlation_target_len: usize,
    pub sample_entropy_emb_dim: usize,
    pub correlation_emb_dim: usize,
}

impl Default for NonlinearConfig {
    fn default() -> Self {
        Self {
            entropy_target_len: 5000,
            correlation_target_len: 3000,
            sample_entropy_emb_dim: 2,
            correlation_emb_dim: 10,
        }
    }
}

/// Output sanitizer parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    pub decimals: u32,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self { decimals: 6 }
    }
}

impl AnalysisConfig {
    /// Load configuration from JSON file
    ///
    /// Missing sections and fields take their defaults. If the file doesn't
    /// exist or the JSON is invalid, the full default config is returned.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}
