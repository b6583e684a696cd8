// Voice Biomarkers Core - speech feature extraction
// Acoustic, prosodic and timing biomarkers from one short recording

// Module declarations
pub mod analysis;
pub mod compose;
pub mod config;
pub mod engines;
pub mod error;
pub mod features;
pub mod request;
pub mod signal;
pub mod temporal;

// Re-exports for convenience
pub use compose::{compute_features, AnalysisInputs, FeatureComposer, TaskType};
pub use config::AnalysisConfig;
pub use engines::{Engines, PrecomputedMeasures};
pub use error::{FeatureError, InputError};
pub use features::{sanitize, FeatureSet, FeatureValue};
pub use signal::{FormantFrame, PitchContour, Waveform, WordTimestamp};
