// Error types for the voice biomarker core
//
// This module defines custom error types for waveform preconditions and
// per-feature failures, providing structured error handling with numeric
// error codes for the JSON result shell.

mod feature;
mod input;

pub use feature::{log_feature_error, FeatureError, FeatureErrorCodes};
pub use input::{log_input_error, InputError, InputErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent reporting across the
/// library and CLI boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
