//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `kiln-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

use crate::domain::Skeleton;
use crate::error::KilnResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `kiln_adapters::filesystem::LocalFilesystem` (production)
/// - `kiln_adapters::filesystem::MemoryFilesystem` (testing)
///
/// Writes are always whole-file.
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories. Existing directories
    /// are not an error.
    fn create_dir_all(&self, path: &Path) -> KilnResult<()>;

    /// Replace the contents of a file, creating it if needed.
    fn write_file(&self, path: &Path, content: &[u8]) -> KilnResult<()>;

    /// Read a whole file.
    fn read_file(&self, path: &Path) -> KilnResult<Vec<u8>>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Whether any execute bit is set on the file.
    fn is_executable(&self, path: &Path) -> bool;

    /// Mark a file executable (or not).
    fn set_executable(&self, path: &Path, executable: bool) -> KilnResult<()>;
}

/// Where a template came from, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    User,
    Plugin(String),
    Bundled,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Plugin(name) => write!(f, "plugin:{}", name),
            Self::Bundled => write!(f, "bundled"),
        }
    }
}

/// One template visible through a locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateEntry {
    pub name: String,
    pub path: PathBuf,
    pub source: SourceKind,
}

/// Port mapping template names to template directories.
///
/// Sources are searched user first, then plugins, then bundled. The first
/// source that has a name wins; later duplicates are shadowed.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateLocator: Send + Sync {
    /// Find the directory of a template by name.
    fn locate(&self, name: &str) -> Option<PathBuf>;

    /// Every visible template, shadowed duplicates removed, sorted by name.
    fn list(&self) -> KilnResult<Vec<TemplateEntry>>;
}

/// Port that reads one template directory into a `Skeleton`.
#[cfg_attr(test, mockall::automock)]
pub trait SkeletonLoader: Send + Sync {
    /// Read metadata and enumerate the content root.
    ///
    /// A missing `meta.yaml` yields empty metadata. A missing content root
    /// or malformed metadata fails with `ApplicationError::SkeletonLoad`.
    fn load(&self, name: &str, path: &Path) -> KilnResult<Skeleton>;
}

/// Decides what happens when a target file already exists with different
/// content.
///
/// Called at most once per colliding file. `Ok(true)` overwrites,
/// `Ok(false)` keeps the existing file. An error (normally
/// `ApplicationError::CollisionAborted`) stops the run.
pub trait CollisionResolver {
    fn resolve(&mut self, target: &Path, new_content: &[u8]) -> KilnResult<bool>;
}

impl<F> CollisionResolver for F
where
    F: FnMut(&Path, &[u8]) -> KilnResult<bool>,
{
    fn resolve(&mut self, target: &Path, new_content: &[u8]) -> KilnResult<bool> {
        self(target, new_content)
    }
}
