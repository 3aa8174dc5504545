use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::entities::common::RelativePath;
use crate::domain::error::DomainError;

/// Name of the subdirectory holding a template's mirrored content.
pub const CONTENT_DIR: &str = "skeleton";

/// Name of the optional metadata document next to [`CONTENT_DIR`].
pub const META_FILE: &str = "meta.yaml";

/// Check that `name` can name a template directory.
///
/// Names are looked up as a single directory below each template source, so
/// separators, `.`/`..` and empty names are rejected.
pub fn validate_template_name(name: &str) -> Result<(), DomainError> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name == "." || name == ".." {
        Some("name refers to a relative directory")
    } else if name.contains(['/', '\\']) {
        Some("name contains a path separator")
    } else if name.starts_with('.') {
        Some("hidden directories are not templates")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(DomainError::InvalidTemplateName {
            name: name.to_owned(),
            reason: reason.to_owned(),
        }),
        None => Ok(()),
    }
}

/// Parsed `meta.yaml`.
///
/// Every key is optional; a template without a metadata file gets
/// `SkeletonMeta::default()`. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeletonMeta {
    /// Templates to materialize before this one, applied recursively.
    pub includes: Vec<String>,
    /// One-line summary shown by `kiln list`.
    pub description: Option<String>,
}

/// One entry found under a skeleton's content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkeletonEntry {
    Directory(RelativePath),
    File(RelativePath),
}

/// One resolved template directory.
///
/// Built once during include resolution and never modified afterwards.
/// Directory and file lists are sorted so materialization order is
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skeleton {
    name: String,
    base_path: PathBuf,
    meta: SkeletonMeta,
    directories: Vec<RelativePath>,
    files: Vec<RelativePath>,
}

impl Skeleton {
    /// Assemble a skeleton from its enumerated entries.
    pub fn new(
        name: impl Into<String>,
        base_path: impl Into<PathBuf>,
        meta: SkeletonMeta,
        entries: impl IntoIterator<Item = SkeletonEntry>,
    ) -> Self {
        let mut directories = Vec::new();
        let mut files = Vec::new();
        for entry in entries {
            match entry {
                SkeletonEntry::Directory(path) => directories.push(path),
                SkeletonEntry::File(path) => files.push(path),
            }
        }
        directories.sort();
        directories.dedup();
        files.sort();
        files.dedup();

        Self {
            name: name.into(),
            base_path: base_path.into(),
            meta,
            directories,
            files,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn meta(&self) -> &SkeletonMeta {
        &self.meta
    }

    /// Names of the templates this one declares as includes.
    pub fn includes(&self) -> &[String] {
        &self.meta.includes
    }

    pub fn directories(&self) -> &[RelativePath] {
        &self.directories
    }

    pub fn files(&self) -> &[RelativePath] {
        &self.files
    }

    /// `<base_path>/skeleton`.
    pub fn content_root(&self) -> PathBuf {
        self.base_path.join(CONTENT_DIR)
    }

    /// Absolute location of an entry on the template source.
    pub fn source_path(&self, entry: &RelativePath) -> PathBuf {
        self.content_root().join(entry)
    }
}
