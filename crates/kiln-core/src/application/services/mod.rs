//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "generate a package" or "list templates".

pub mod include_resolver;
pub mod materializer;
pub mod scaffold_service;
pub mod template_service;

pub use include_resolver::{IncludeResolver, ResolvedTemplates};
pub use materializer::{EntryOutcome, MaterializeReport, Materializer, ReportEntry};
pub use scaffold_service::{ScaffoldRequest, ScaffoldService};
pub use template_service::{TemplateInfo, TemplateService};
