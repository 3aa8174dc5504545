// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Kiln.
//!
//! This module contains pure logic: no filesystem access, no terminal, no
//! process spawning. Reading templates and writing packages happens through
//! the ports defined in the application layer.
//!
//! - **Variables**: literal, single-pass substitution over a closed map
//! - **Processors**: extension-keyed content transformations
//! - **Entities**: skeletons, include chains, relative paths
//! - **Immutable entities**: a loaded `Skeleton` never changes
//!
// Public API - what the world sees
pub mod entities;
pub mod erb;
pub mod error;
pub mod processor;
pub mod project;
pub mod variables;

// Re-exports for convenience
pub use entities::{
    IncludeChain, RelativePath, Skeleton, SkeletonEntry, SkeletonMeta,
    skeleton::{CONTENT_DIR, META_FILE},
    validate_template_name,
};

pub use error::{DomainError, ErrorCategory};

pub use processor::{ProcessedFile, Processor, ProcessorAction, ProcessorRegistry};
pub use project::ProjectVariables;
pub use variables::{VariableMap, VariableSubstitutor};

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Cross-module behaviour
    // ========================================================================

    #[test]
    fn path_and_content_namespaces_stay_independent() {
        let project = ProjectVariables::new("widget");
        let paths = VariableSubstitutor::new(&project.path_variables()).unwrap();
        let registry = ProcessorRegistry::with_builtins();

        let target = paths.replace("lib/PACKAGE_NAME.rb.erb");
        let processed = registry
            .process(
                &RelativePath::try_new(target).unwrap(),
                b"module <%= namespace %>; end # PACKAGE_NAME".to_vec(),
                &project.content_variables(),
            )
            .unwrap();

        assert_eq!(processed.path.as_path(), std::path::Path::new("lib/widget.rb"));
        // Path variables never leak into content.
        assert_eq!(processed.content, b"module Widget; end # PACKAGE_NAME");
    }
}
