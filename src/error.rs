//! Error types for GPU Setup
//!
//! Operators only ever see a severity plus a message. These types carry that
//! message from the step that failed up to the command handler, which prints it
//! once and maps it to the exit status.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::orchestrator::SetupState;

/// Configuration file loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid JSON in config {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error reading config: {0}")]
    IoError(#[from] io::Error),
}

/// Fatal errors that abort a setup run.
///
/// Anything recoverable is logged as a WARNING at the call site and never
/// becomes a `SetupError`.
#[derive(Error, Debug)]
pub enum SetupError {
    /// A step on the fatal whitelist failed
    #[error("{step}: {reason}")]
    StepFailed { step: String, reason: String },

    /// Detection found neither an NVIDIA nor an AMD accelerator
    #[error("No supported GPU detected (NVIDIA or AMD required)")]
    UnsupportedHardware,

    /// The log directory or file could not be created or permissioned
    #[error("Failed to initialise log store at {path}: {reason}")]
    LogStore { path: PathBuf, reason: String },

    /// The vendor state machine was asked to move out of order
    #[error("Invalid setup state transition: {0}")]
    InvalidTransition(String),

    /// A vendor strategy stopped before reaching `Verified`
    #[error("{source} (aborted at state: {state})")]
    Aborted {
        state: SetupState,
        source: Box<SetupError>,
    },
}

impl SetupError {
    /// Build a `StepFailed` error from a step name and a reason.
    pub fn step(step: impl Into<String>, reason: impl Into<String>) -> Self {
        SetupError::StepFailed {
            step: step.into(),
            reason: reason.into(),
        }
    }

    /// Get a user-facing error message suitable for the console
    pub fn user_message(&self) -> String {
        match self {
            SetupError::Aborted { source, .. } => source.user_message(),
            SetupError::UnsupportedHardware => {
                "No supported GPU detected. This tool supports NVIDIA and AMD GPUs only.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// The state a vendor strategy reached before failing, if any.
    pub fn aborted_state(&self) -> Option<SetupState> {
        match self {
            SetupError::Aborted { state, .. } => Some(*state),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_failed_display() {
        let err = SetupError::step("package-index", "apt-get update exited with 100");
        assert_eq!(err.to_string(), "package-index: apt-get update exited with 100");
    }

    #[test]
    fn test_aborted_keeps_inner_message() {
        let err = SetupError::Aborted {
            state: SetupState::PrerequisitesChecked,
            source: Box::new(SetupError::step("rocm-repository", "key download failed")),
        };
        assert_eq!(err.user_message(), "rocm-repository: key download failed");
        assert_eq!(err.aborted_state(), Some(SetupState::PrerequisitesChecked));
        assert!(err.to_string().contains("prerequisites-checked"));
    }

    #[test]
    fn test_unsupported_hardware_message() {
        let err = SetupError::UnsupportedHardware;
        assert!(err.user_message().contains("No supported GPU"));
        assert_eq!(err.aborted_state(), None);
    }
}
