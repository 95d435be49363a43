//! Application layer errors.
//!
//! These errors represent failures while running a generation, not invalid
//! input. Invalid input is a `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during generation orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A content producer failed to render an artifact.
    #[error("Content generation failed for {artifact}: {reason}")]
    ContentGeneration { artifact: String, reason: String },

    /// Filesystem operation failed.
    #[error("Write failed at {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    /// Undoing a failed run failed (best-effort cleanup).
    #[error("Rollback failed for {path}: {reason}")]
    RollbackFailed { path: PathBuf, reason: String },

    /// A generation request file could not be read or parsed.
    #[error("Could not load request from {path}: {reason}")]
    RequestLoad { path: PathBuf, reason: String },

    /// Shared state lock was poisoned.
    #[error("Internal state lock poisoned: {resource}")]
    LockPoisoned { resource: &'static str },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ContentGeneration { artifact, .. } => vec![
                format!("The content for '{}' could not be produced", artifact),
                "Check the module's template and template variables".into(),
                "Nothing was left on disk: the run was rolled back".into(),
            ],
            Self::WriteFailed { path, .. } => vec![
                format!("Failed to write: {}", path.display()),
                "Check that you have write permissions".into(),
                "Check available disk space".into(),
            ],
            Self::RollbackFailed { path, .. } => vec![
                format!("Some generated files may remain under {}", path.display()),
                "Remove them manually before re-running".into(),
            ],
            Self::RequestLoad { path, .. } => vec![
                format!("Check the file at {}", path.display()),
                "Requests must be .json or .toml with `blueprint` and `profile` tables".into(),
            ],
            Self::LockPoisoned { .. } => vec!["This is likely a bug; please report it".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ContentGeneration { .. } => ErrorCategory::Internal,
            Self::WriteFailed { .. } | Self::RollbackFailed { .. } => ErrorCategory::Internal,
            Self::RequestLoad { .. } => ErrorCategory::Validation,
            Self::LockPoisoned { .. } => ErrorCategory::Internal,
        }
    }
}
