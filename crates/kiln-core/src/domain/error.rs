// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (they travel inside `error` events)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (400-level equivalent)
    // ========================================================================
    #[error("Invalid project name '{name}': {reason}")]
    InvalidProjectName { name: String, reason: String },

    #[error("Invalid module name '{name}': {reason}")]
    InvalidModuleName { name: String, reason: String },

    #[error("Blueprint '{blueprint}' declares module '{name}' more than once")]
    DuplicateModule { blueprint: String, name: String },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Path escapes the output root: {path}")]
    PathEscapesRoot { path: String },

    /// Two artifacts of the same run map to one file.
    #[error("{second} would overwrite {first} at '{path}'")]
    ArtifactPathCollision {
        path: String,
        first: String,
        second: String,
    },

    #[error("Unknown {field}: '{value}'")]
    UnknownValue { field: &'static str, value: String },

    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },

    // ========================================================================
    // Dependency Errors
    // ========================================================================
    /// A module depends on itself, directly or transitively.
    ///
    /// `cycle` lists the modules on the cycle in traversal order, starting
    /// and ending with `module`.
    #[error("Circular dependency detected at module '{module}': {}", cycle.join(" -> "))]
    CircularDependency { module: String, cycle: Vec<String> },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidProjectName { name, reason } => vec![
                format!("Project name '{}' is invalid: {}", name, reason),
                "Use alphanumeric characters, hyphens, and underscores".into(),
                "Examples: my-project, my_app, project123".into(),
            ],
            Self::DuplicateModule { name, .. } => vec![
                format!("Module '{}' appears more than once", name),
                "Module names are the ordering key and must be unique".into(),
            ],
            Self::CircularDependency { cycle, .. } => vec![
                format!("Cycle: {}", cycle.join(" -> ")),
                "Remove one of the depends_on edges on this cycle".into(),
            ],
            Self::AbsolutePathNotAllowed { path } | Self::PathEscapesRoot { path } => vec![
                format!("Offending path: {}", path),
                "Generated paths must stay inside the output directory".into(),
            ],
            Self::ArtifactPathCollision { path, .. } => vec![
                format!("Both artifacts would be written to {}", path),
                "Rename the module so its file name is unique".into(),
                "Module names are snake_cased, so 'UserService' and 'user_service' clash".into(),
            ],
            Self::UnknownValue { field, .. } => vec![format!(
                "Check the accepted values for {} with --help",
                field
            )],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CircularDependency { .. } => ErrorCategory::Dependency,
            Self::UnknownValue { .. } => ErrorCategory::NotFound,
            Self::InvalidProjectName { .. }
            | Self::InvalidModuleName { .. }
            | Self::DuplicateModule { .. }
            | Self::AbsolutePathNotAllowed { .. }
            | Self::PathEscapesRoot { .. }
            | Self::ArtifactPathCollision { .. }
            | Self::MissingRequiredField { .. } => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Dependency,
    NotFound,
    Internal,
}
