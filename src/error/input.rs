// Input error types and constants

use crate::error::ErrorCode;
use std::fmt;

/// Input error code constants
///
/// Error code range: 4001-4004
pub struct InputErrorCodes {}

impl InputErrorCodes {
    /// Waveform has no samples
    pub const EMPTY_WAVEFORM: i32 = 4001;

    /// Sample rate is zero
    pub const INVALID_SAMPLE_RATE: i32 = 4002;

    /// Waveform contains NaN or infinite samples
    pub const NON_FINITE_SAMPLES: i32 = 4003;

    /// Task type name is not one of the known selectors
    pub const UNKNOWN_TASK_TYPE: i32 = 4004;
}

/// Log an input error with structured context
pub fn log_input_error(err: &InputError, context: &str) {
    tracing::error!(
        context,
        code = err.code(),
        "Input rejected: {}",
        err.message()
    );
}

/// Precondition violations on the waveform
///
/// These are the only errors that leave the feature core; everything else
/// is reported per key as unavailable.
#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    /// Waveform has no samples
    EmptyWaveform,

    /// Sample rate is zero
    InvalidSampleRate { sample_rate: u32 },

    /// First non-finite sample index
    NonFiniteSamples { index: usize },

    /// Task selector that names no known task
    UnknownTaskType { name: String },
}

impl ErrorCode for InputError {
    fn code(&self) -> i32 {
        match self {
            InputError::EmptyWaveform => InputErrorCodes::EMPTY_WAVEFORM,
            InputError::InvalidSampleRate { .. } => InputErrorCodes::INVALID_SAMPLE_RATE,
            InputError::NonFiniteSamples { .. } => InputErrorCodes::NON_FINITE_SAMPLES,
            InputError::UnknownTaskType { .. } => InputErrorCodes::UNKNOWN_TASK_TYPE,
        }
    }

    fn message(&self) -> String {
        match self {
            InputError::EmptyWaveform => "Waveform contains no samples".to_string(),
            InputError::InvalidSampleRate { sample_rate } => {
                format!("Sample rate must be greater than 0 (got {})", sample_rate)
            }
            InputError::NonFiniteSamples { index } => {
                format!("Waveform sample {} is not finite", index)
            }
            InputError::UnknownTaskType { name } => format!(
                "Unknown task type '{}' (expected conversation, sustained_vowel, ddk or fluency)",
                name
            ),
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InputError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for InputError {}
