//! Core error types for meetingburner-core.
//!
//! This module defines the error hierarchy using thiserror. Lifecycle
//! misuse and bad configuration are reported as values; nothing in the
//! core panics on caller mistakes.

use std::path::PathBuf;
use thiserror::Error;

use crate::meeting::MeetingState;

/// Core error type for meetingburner-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Settings-file errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Lifecycle operation called from the wrong state
    #[error("Transition error: {0}")]
    Transition(#[from] TransitionError),

    /// Starting or resuming a timer outside a tokio runtime
    #[error("no tokio runtime available to drive the tick source")]
    NoRuntime,
}

/// Settings-file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the settings tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Home/config directory could not be resolved or created
    #[error("Configuration directory unavailable: {0}")]
    DirUnavailable(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Attendee count or hourly rate is not strictly positive
    #[error("Invalid configuration for '{field}': {message}")]
    InvalidConfiguration { field: String, message: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Lifecycle errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The operation is not permitted from the current state
    #[error("cannot {operation} a meeting that is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: MeetingState,
    },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_message_names_state() {
        let err = TransitionError::InvalidTransition {
            operation: "pause",
            state: MeetingState::Idle,
        };
        assert_eq!(err.to_string(), "cannot pause a meeting that is idle");
    }

    #[test]
    fn validation_converts_into_core_error() {
        let err: CoreError = ValidationError::InvalidConfiguration {
            field: "attendees".into(),
            message: "must be positive".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn settings_io_failure_keeps_path() {
        let err: CoreError = ConfigError::LoadFailed {
            path: PathBuf::from("/nowhere/config.toml"),
            message: "No such file or directory".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Config(ConfigError::LoadFailed { .. })));
        assert_eq!(
            err.to_string(),
            "Configuration error: Failed to load configuration from /nowhere/config.toml: \
             No such file or directory"
        );
    }
}
