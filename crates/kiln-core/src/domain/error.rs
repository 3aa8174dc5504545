// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (reports and logs can keep a copy)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Include graph errors
    // ========================================================================
    #[error("Circular include: {}", .chain.join(" -> "))]
    CircularInclude {
        /// The include path that revisited a template, ending with the
        /// repeated name.
        chain: Vec<String>,
    },

    #[error("Invalid template name '{name}': {reason}")]
    InvalidTemplateName { name: String, reason: String },

    // ========================================================================
    // Processor registration errors
    // ========================================================================
    #[error("A processor for '{extension}' is already registered")]
    DuplicateProcessor { extension: String },

    #[error("Invalid processor extension '{extension}'")]
    InvalidExtension { extension: String },

    #[error("Cannot compile a pattern for {keys} path variables: {reason}")]
    VariablePattern { keys: usize, reason: String },

    // ========================================================================
    // Path errors
    // ========================================================================
    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Path escapes its root: {path}")]
    PathEscapesRoot { path: String },

    #[error("Path is not valid UTF-8: {path}")]
    NonUtf8Path { path: String },

    // ========================================================================
    // Rendering errors
    // ========================================================================
    #[error("{processor} rendering failed: {reason}")]
    RenderFailed { processor: String, reason: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::CircularInclude { chain } => vec![
                format!("Include chain: {}", chain.join(" -> ")),
                "Remove one of the `includes` entries in the templates' meta.yaml".into(),
            ],
            Self::InvalidTemplateName { name, .. } => vec![
                format!("'{}' cannot be used as a template name", name),
                "Template names are plain directory names without separators".into(),
                "Try: kiln list".into(),
            ],
            Self::DuplicateProcessor { extension } => vec![
                format!("Only one processor may handle '{}'", extension),
                "This is a programming error in the processor setup".into(),
            ],
            Self::AbsolutePathNotAllowed { path } | Self::PathEscapesRoot { path } => vec![
                format!("Offending path: {}", path),
                "Check the path variables used in skeleton file names".into(),
            ],
            Self::VariablePattern { keys, .. } => vec![
                format!("{} path variables were combined into one pattern", keys),
                "Remove unused entries from path_variables in the config".into(),
            ],
            Self::RenderFailed { processor, reason } => vec![
                format!("The {} processor reported: {}", processor, reason),
                "Check the template file for typos in tags or variable names".into(),
                "Pass missing values with --var key=value".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CircularInclude { .. }
            | Self::InvalidTemplateName { .. }
            | Self::AbsolutePathNotAllowed { .. }
            | Self::PathEscapesRoot { .. }
            | Self::NonUtf8Path { .. }
            | Self::RenderFailed { .. } => ErrorCategory::Validation,
            Self::DuplicateProcessor { .. }
            | Self::InvalidExtension { .. }
            | Self::VariablePattern { .. } => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Internal,
}
