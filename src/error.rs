//! Error types for the tfdrift system.
//!
//! This module provides the error hierarchy for every stage of a drift check:
//! configuration, credential loading, launching Terraform, and failed steps.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::runner::ProcessResult;

/// The main error type for the tfdrift system.
#[derive(Debug, Error)]
pub enum TfDriftError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Credential loading errors.
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// The Terraform process could not be run to completion.
    #[error("Process error: {0}")]
    Process(#[from] ProcessError),

    /// A Terraform sub-command ran but reported failure.
    #[error("Step failed: {0}")]
    Step(#[from] StepFailure),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file was not found.
    #[error("Settings file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The settings file could not be parsed.
    #[error("Failed to parse settings: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Settings validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },
}

/// Errors raised while reading mounted credential files.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The credential file could not be read.
    #[error("Failed to read credential file {path}: {source}")]
    Unreadable {
        /// Path to the credential file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The credential is not valid UTF-8 and cannot be passed as an environment variable.
    #[error("Credential file {path} does not contain valid UTF-8")]
    NotUtf8 {
        /// Path to the credential file.
        path: PathBuf,
    },
}

/// Errors launching or waiting on the Terraform binary.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The binary could not be started (missing executable, permission denied).
    #[error("Failed to launch {binary}: {source}")]
    Spawn {
        /// Binary that was invoked.
        binary: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Waiting for the child process failed.
    #[error("Failed waiting for `{command}`: {source}")]
    Wait {
        /// Description of the invoked command.
        command: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The child did not exit before the configured deadline and was killed.
    #[error("`{command}` did not finish within {}s", .timeout.as_secs())]
    TimedOut {
        /// Description of the invoked command.
        command: String,
        /// Deadline that was exceeded.
        timeout: Duration,
    },
}

/// A Terraform sub-command that exited with a failing code.
///
/// The display form is a one-line summary; the full captured output is
/// available through [`StepFailure::result`].
#[derive(Debug, Error)]
#[error("{} failed with exit code {}", .result.title, .result.exit_code)]
pub struct StepFailure {
    result: Box<ProcessResult>,
}

/// Result type alias for tfdrift operations.
pub type Result<T> = std::result::Result<T, TfDriftError>;

impl TfDriftError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the failed step if this error wraps one.
    #[must_use]
    pub const fn step_failure(&self) -> Option<&StepFailure> {
        match self {
            Self::Step(failure) => Some(failure),
            _ => None,
        }
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl StepFailure {
    /// Wraps the result of a failed sub-command.
    #[must_use]
    pub fn new(result: ProcessResult) -> Self {
        Self {
            result: Box::new(result),
        }
    }

    /// Returns the captured result of the failed sub-command.
    #[must_use]
    pub fn result(&self) -> &ProcessResult {
        &self.result
    }

    /// Returns the exit code of the failed sub-command.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.result.exit_code
    }

    /// Consumes the failure, returning the captured result.
    #[must_use]
    pub fn into_result(self) -> ProcessResult {
        *self.result
    }
}
