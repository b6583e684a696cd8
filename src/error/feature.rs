// Feature error types and constants

use crate::error::ErrorCode;
use std::fmt;

/// Feature error code constants
///
/// Error code range: 3001-3005
pub struct FeatureErrorCodes {}

impl FeatureErrorCodes {
    /// Too few frames, onsets, words or bins for the computation
    pub const INSUFFICIENT_DATA: i32 = 3001;

    /// Computation produced no usable number (zero denominator, flat input)
    pub const DEGENERATE: i32 = 3002;

    /// Required external engine was not supplied
    pub const ENGINE_UNAVAILABLE: i32 = 3003;

    /// External engine reported a failure
    pub const ENGINE_FAILED: i32 = 3004;

    /// Input had an unusable shape (e.g. zero hop, zero duration)
    pub const INVALID_INPUT: i32 = 3005;
}

/// Log a feature error with structured context
///
/// Feature errors are expected (short recordings, silent takes) so they are
/// logged at debug level; the key still lands in the set as unavailable.
pub fn log_feature_error(err: &FeatureError, feature: &str) {
    tracing::debug!(
        feature,
        code = err.code(),
        "Feature unavailable: {}",
        err.message()
    );
}

/// Reasons a single feature resolves to "unavailable"
///
/// None of these abort composition; each one degrades only the keys that
/// depend on the failed computation.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureError {
    /// Not enough input material
    InsufficientData {
        what: &'static str,
        required: usize,
        available: usize,
    },

    /// Numeric degeneracy
    Degenerate { reason: String },

    /// External engine not supplied for this invocation
    EngineUnavailable { engine: &'static str },

    /// External engine returned an error
    EngineFailed { engine: &'static str, details: String },

    /// Input violates a precondition of this feature
    InvalidInput { reason: String },
}

impl FeatureError {
    pub fn insufficient(what: &'static str, required: usize, available: usize) -> Self {
        FeatureError::InsufficientData {
            what,
            required,
            available,
        }
    }

    pub fn degenerate(reason: impl Into<String>) -> Self {
        FeatureError::Degenerate {
            reason: reason.into(),
        }
    }
}

impl ErrorCode for FeatureError {
    fn code(&self) -> i32 {
        match self {
            FeatureError::InsufficientData { .. } => FeatureErrorCodes::INSUFFICIENT_DATA,
            FeatureError::Degenerate { .. } => FeatureErrorCodes::DEGENERATE,
            FeatureError::EngineUnavailable { .. } => FeatureErrorCodes::ENGINE_UNAVAILABLE,
            FeatureError::EngineFailed { .. } => FeatureErrorCodes::ENGINE_FAILED,
            FeatureError::InvalidInput { .. } => FeatureErrorCodes::INVALID_INPUT,
        }
    }

    fn message(&self) -> String {
        match self {
            FeatureError::InsufficientData {
                what,
                required,
                available,
            } => {
                format!("Insufficient {}: need {}, got {}", what, required, available)
            }
            FeatureError::Degenerate { reason } => format!("Degenerate result: {}", reason),
            FeatureError::EngineUnavailable { engine } => {
                format!("Engine not available: {}", engine)
            }
            FeatureError::EngineFailed { engine, details } => {
                format!("Engine {} failed: {}", engine, details)
            }
            FeatureError::InvalidInput { reason } => format!("Invalid input: {}", reason),
        }
    }
}

impl fmt::Display for FeatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FeatureError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for FeatureError {}
