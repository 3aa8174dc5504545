//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `kiln-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `TemplateLocator`: Template name lookup across sources
//!   - `SkeletonLoader`: Reading one template directory
//!   - `CollisionResolver`: Overwrite decisions (the CLI prompts, tests use closures)

pub mod output;

pub use output::{
    CollisionResolver, Filesystem, SkeletonLoader, SourceKind, TemplateEntry, TemplateLocator,
};
