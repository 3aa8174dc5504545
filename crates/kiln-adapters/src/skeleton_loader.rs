//! Filesystem-based skeleton loader.
//!
//! Reads one template directory into a domain [`Skeleton`].
//!
//! # Directory layout expected
//!
//! ```text
//! default/
//! ├── meta.yaml                 ← optional metadata
//! └── skeleton/                 ← mirrored into the new package
//!     ├── .gitignore
//!     ├── README.md.erb
//!     └── lib/
//!         ├── PACKAGE_NAME.rb.erb
//!         └── PACKAGE_NAME/
//!             └── version.rb.erb
//! ```
//!
//! # `meta.yaml` format
//!
//! ```yaml
//! description: A plain package   # optional, shown by `kiln list`
//! includes:                      # optional, materialized before this one
//!   - license-mit
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument};
use walkdir::WalkDir;

use kiln_core::{
    application::{ApplicationError, ports::SkeletonLoader},
    domain::{CONTENT_DIR, META_FILE, RelativePath, Skeleton, SkeletonEntry, SkeletonMeta},
    error::{KilnError, KilnResult},
};

/// Loads skeletons from template directories on the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSkeletonLoader;

impl FsSkeletonLoader {
    pub fn new() -> Self {
        Self
    }
}

impl SkeletonLoader for FsSkeletonLoader {
    #[instrument(skip(self), fields(path = %path.display()))]
    fn load(&self, name: &str, path: &Path) -> KilnResult<Skeleton> {
        let meta = read_meta(path)?;

        let content_root = path.join(CONTENT_DIR);
        if !content_root.is_dir() {
            return Err(load_error(
                path,
                format!("missing '{}' directory", CONTENT_DIR),
            ));
        }

        let mut entries = Vec::new();
        // Symlinks are followed so linked files are copied like regular ones.
        for walk_entry in WalkDir::new(&content_root).min_depth(1).follow_links(true) {
            let walk_entry =
                walk_entry.map_err(|e| load_error(path, format!("directory walk error: {e}")))?;
            let relative = RelativePath::from_root(&content_root, walk_entry.path())
                .map_err(|e| load_error(path, e.to_string()))?;

            let file_type = walk_entry.file_type();
            if file_type.is_dir() {
                entries.push(SkeletonEntry::Directory(relative));
            } else if file_type.is_file() {
                entries.push(SkeletonEntry::File(relative));
            }
        }

        let skeleton = Skeleton::new(name, path, meta, entries);
        debug!(
            directories = skeleton.directories().len(),
            files = skeleton.files().len(),
            includes = ?skeleton.includes(),
            "Loaded skeleton"
        );
        Ok(skeleton)
    }
}

/// Parse `meta.yaml`. A missing or empty file means default metadata.
fn read_meta(template_dir: &Path) -> KilnResult<SkeletonMeta> {
    let meta_path = template_dir.join(META_FILE);
    if !meta_path.is_file() {
        return Ok(SkeletonMeta::default());
    }

    let raw = fs::read_to_string(&meta_path)
        .map_err(|e| load_error(&meta_path, format!("failed to read: {e}")))?;
    if raw.trim().is_empty() {
        return Ok(SkeletonMeta::default());
    }

    serde_yaml::from_str(&raw).map_err(|e| load_error(&meta_path, format!("malformed YAML: {e}")))
}

fn load_error(path: impl Into<PathBuf>, reason: String) -> KilnError {
    ApplicationError::SkeletonLoad {
        path: path.into(),
        reason,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ── helpers ───────────────────────────────────────────────────────────

    /// Write a template directory under a TempDir. Paths ending in `/` are
    /// created as empty directories.
    fn make_template(meta: Option<&str>, entries: &[(&str, &str)]) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();

        if let Some(meta) = meta {
            fs::write(dir.join(META_FILE), meta).unwrap();
        }
        fs::create_dir_all(dir.join(CONTENT_DIR)).unwrap();

        for (rel_path, content) in entries {
            let full = dir.join(CONTENT_DIR).join(rel_path);
            if rel_path.ends_with('/') {
                fs::create_dir_all(full).unwrap();
                continue;
            }
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, content).unwrap();
        }

        temp
    }

    fn rel(path: &str) -> RelativePath {
        RelativePath::try_new(path).unwrap()
    }

    // ── loading ───────────────────────────────────────────────────────────

    #[test]
    fn enumerates_directories_and_files_sorted() {
        let temp = make_template(
            None,
            &[
                ("lib/PACKAGE_NAME.rb.erb", ""),
                (".gitignore", "/target"),
                ("bin/", ""),
                ("lib/PACKAGE_NAME/version.rb.erb", ""),
            ],
        );

        let skeleton = FsSkeletonLoader::new().load("gem", temp.path()).unwrap();

        assert_eq!(skeleton.name(), "gem");
        assert_eq!(
            skeleton.directories(),
            &[rel("bin"), rel("lib"), rel("lib/PACKAGE_NAME")]
        );
        assert_eq!(
            skeleton.files(),
            &[
                rel(".gitignore"),
                rel("lib/PACKAGE_NAME.rb.erb"),
                rel("lib/PACKAGE_NAME/version.rb.erb"),
            ]
        );
    }

    #[test]
    fn missing_meta_yields_empty_includes() {
        let temp = make_template(None, &[("README", "")]);
        let skeleton = FsSkeletonLoader::new().load("x", temp.path()).unwrap();
        assert!(skeleton.includes().is_empty());
        assert_eq!(skeleton.meta(), &SkeletonMeta::default());
    }

    #[test]
    fn meta_includes_and_description_are_read() {
        let temp = make_template(
            Some("description: Plain gem\nincludes:\n  - license-mit\n  - rspec\n"),
            &[],
        );
        let skeleton = FsSkeletonLoader::new().load("x", temp.path()).unwrap();
        assert_eq!(skeleton.includes(), &["license-mit".to_string(), "rspec".to_string()]);
        assert_eq!(skeleton.meta().description.as_deref(), Some("Plain gem"));
    }

    #[test]
    fn empty_meta_is_default() {
        let temp = make_template(Some("\n"), &[]);
        let skeleton = FsSkeletonLoader::new().load("x", temp.path()).unwrap();
        assert!(skeleton.includes().is_empty());
    }

    #[test]
    fn malformed_meta_is_a_load_error() {
        let temp = make_template(Some("includes: [unclosed"), &[]);
        let err = FsSkeletonLoader::new().load("x", temp.path()).unwrap_err();
        assert!(matches!(
            err,
            KilnError::Application(ApplicationError::SkeletonLoad { .. })
        ));
    }

    #[test]
    fn wrong_meta_shape_is_a_load_error() {
        let temp = make_template(Some("includes: 42"), &[]);
        assert!(FsSkeletonLoader::new().load("x", temp.path()).is_err());
    }

    #[test]
    fn missing_content_root_is_a_load_error() {
        let temp = TempDir::new().unwrap();
        let err = FsSkeletonLoader::new().load("x", temp.path()).unwrap_err();
        match err {
            KilnError::Application(ApplicationError::SkeletonLoad { path, reason }) => {
                assert_eq!(path, temp.path());
                assert!(reason.contains("skeleton"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
