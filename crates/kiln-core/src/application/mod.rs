//! Application layer for Kiln.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (ScaffoldService, TemplateService)
//!   and the two engines they drive (IncludeResolver, Materializer)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer. Extension handling,
//! substitution and cycle detection live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    EntryOutcome, IncludeResolver, MaterializeReport, Materializer, ReportEntry,
    ResolvedTemplates, ScaffoldRequest, ScaffoldService, TemplateInfo, TemplateService,
};

// Re-export port traits (for adapter implementation)
pub use ports::{
    CollisionResolver, Filesystem, SkeletonLoader, SourceKind, TemplateEntry, TemplateLocator,
};

pub use error::ApplicationError;
