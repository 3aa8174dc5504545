//! Infrastructure adapters for Kiln.
//!
//! This crate implements the ports defined in `kiln-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod filesystem;
pub mod skeleton_loader;
pub mod template_locator;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use skeleton_loader::FsSkeletonLoader;
pub use template_locator::{DirectoryLocator, TemplateSource};
