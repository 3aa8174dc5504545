//! Application layer errors.
//!
//! These errors represent failures in orchestration and I/O, not in pure
//! logic. Logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while resolving templates or writing a package.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// A requested or included template has no source.
    #[error("No template named '{name}' found")]
    TemplateNotFound { name: String },

    /// Metadata malformed or content root missing.
    #[error("Failed to load template at {path}: {reason}")]
    SkeletonLoad { path: PathBuf, reason: String },

    /// A processor failed on one skeleton file.
    #[error("Failed to render {path}: {reason}")]
    RenderingFailed { path: PathBuf, reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError {
        path: PathBuf,
        reason: String,
        /// Template being materialized when the failure happened.
        template: Option<String>,
    },

    /// The collision resolver reported that the operator stopped answering.
    #[error("Terminated by user")]
    CollisionAborted,

    /// Shared state (in-memory adapters) could not be locked.
    #[error("Adapter lock poisoned")]
    LockPoisoned,
}

impl ApplicationError {
    /// Shorthand for a filesystem failure outside any template.
    pub fn filesystem(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FilesystemError {
            path: path.into(),
            reason: reason.into(),
            template: None,
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::TemplateNotFound { name } => vec![
                format!("No template source provides '{}'", name),
                "Try: kiln list to see available templates".into(),
                "Or pick one explicitly with --template".into(),
            ],
            Self::SkeletonLoad { path, .. } => vec![
                format!("Check the template directory: {}", path.display()),
                "A template needs a 'skeleton' directory".into(),
                "meta.yaml, if present, must be a YAML mapping".into(),
            ],
            Self::RenderingFailed { path, .. } => vec![
                format!("Fix the template file: {}", path.display()),
                "Missing values can be passed with --var key=value".into(),
            ],
            Self::FilesystemError { path, template, .. } => {
                let mut suggestions = vec![
                    format!("Failed to access: {}", path.display()),
                    "Check that you have write permissions".into(),
                ];
                if let Some(template) = template {
                    suggestions.push(format!("Failure occurred while writing template '{}'", template));
                    suggestions.push("Files written before the failure were kept".into());
                }
                suggestions
            }
            Self::CollisionAborted => vec![
                "Generation stopped at a file collision".into(),
                "Files written before the prompt were kept".into(),
                "Use --yes or --no-clobber to answer collisions non-interactively".into(),
            ],
            Self::LockPoisoned => vec!["Try again".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TemplateNotFound { .. } => ErrorCategory::NotFound,
            Self::SkeletonLoad { .. } | Self::RenderingFailed { .. } => ErrorCategory::Validation,
            Self::CollisionAborted => ErrorCategory::Aborted,
            Self::FilesystemError { .. } | Self::LockPoisoned => ErrorCategory::Internal,
        }
    }
}
