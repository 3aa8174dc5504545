//! Unified error handling for Kiln Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Kiln Core operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KilnError {
    /// Errors from the domain layer (invalid templates, cycles, rendering).
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (lookup, I/O, collisions).
    #[error("{0}")]
    Application(#[from] ApplicationError),
}

impl KilnError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
        }
    }

    /// True if the failure happened before anything was written.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::Domain(
                DomainError::CircularInclude { .. } | DomainError::InvalidTemplateName { .. }
            ) | Self::Application(
                ApplicationError::TemplateNotFound { .. } | ApplicationError::SkeletonLoad { .. }
            )
        )
    }

    /// Attach the template being materialized to a filesystem error.
    pub fn in_template(self, name: &str) -> Self {
        match self {
            Self::Application(ApplicationError::FilesystemError {
                path,
                reason,
                template: None,
            }) => ApplicationError::FilesystemError {
                path,
                reason,
                template: Some(name.to_owned()),
            }
            .into(),
            other => other,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Aborted,
    Internal,
}

/// Convenient result type alias.
pub type KilnResult<T> = Result<T, KilnError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn in_template_tags_filesystem_errors_only() {
        let err: KilnError = ApplicationError::filesystem("/out/x", "denied").into();
        match err.in_template("gem") {
            KilnError::Application(ApplicationError::FilesystemError { template, .. }) => {
                assert_eq!(template.as_deref(), Some("gem"));
            }
            other => panic!("unexpected: {other:?}"),
        }

        let err: KilnError = ApplicationError::CollisionAborted.into();
        assert_eq!(err.clone().in_template("gem"), err);
    }

    #[test]
    fn resolution_errors_are_flagged() {
        let not_found: KilnError = ApplicationError::TemplateNotFound { name: "x".into() }.into();
        let cycle: KilnError = DomainError::CircularInclude {
            chain: vec!["a".into(), "a".into()],
        }
        .into();
        let io: KilnError = ApplicationError::filesystem(PathBuf::from("/x"), "e").into();

        assert!(not_found.is_resolution_error());
        assert!(cycle.is_resolution_error());
        assert!(!io.is_resolution_error());
    }

    #[test]
    fn categories_map_through() {
        let err: KilnError = ApplicationError::TemplateNotFound { name: "x".into() }.into();
        assert_eq!(err.category(), ErrorCategory::NotFound);
        let err: KilnError = ApplicationError::CollisionAborted.into();
        assert_eq!(err.category(), ErrorCategory::Aborted);
        let err: KilnError = DomainError::DuplicateProcessor {
            extension: ".erb".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Internal);
        let err: KilnError = DomainError::VariablePattern {
            keys: 3,
            reason: "size limit".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Internal);
    }
}
