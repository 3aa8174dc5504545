//! Template lookup across ordered source directories.
//!
//! Each source is a directory whose immediate subdirectories are templates.
//! Sources are searched in a fixed order: the user's own templates, then
//! every plugin source in registration order, then the bundled set. The
//! first source containing a name wins.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, trace};

use kiln_core::{
    application::{
        ApplicationError,
        ports::{SourceKind, TemplateEntry, TemplateLocator},
    },
    domain::validate_template_name,
    error::KilnResult,
};

/// One directory of templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    pub kind: SourceKind,
    pub root: PathBuf,
}

impl TemplateSource {
    fn rank(&self) -> u8 {
        match self.kind {
            SourceKind::User => 0,
            SourceKind::Plugin(_) => 1,
            SourceKind::Bundled => 2,
        }
    }
}

/// [`TemplateLocator`] over template directories on disk.
#[derive(Debug, Clone, Default)]
pub struct DirectoryLocator {
    sources: Vec<TemplateSource>,
}

impl DirectoryLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, root: impl Into<PathBuf>) -> Self {
        self.with_source(SourceKind::User, root)
    }

    pub fn with_plugin(self, name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.with_source(SourceKind::Plugin(name.into()), root)
    }

    pub fn with_bundled(self, root: impl Into<PathBuf>) -> Self {
        self.with_source(SourceKind::Bundled, root)
    }

    /// Add a source. Precedence follows the source kind, not call order;
    /// plugins keep their relative order.
    pub fn with_source(mut self, kind: SourceKind, root: impl Into<PathBuf>) -> Self {
        self.sources.push(TemplateSource {
            kind,
            root: root.into(),
        });
        self.sources.sort_by_key(TemplateSource::rank);
        self
    }

    /// Sources in search order.
    pub fn sources(&self) -> &[TemplateSource] {
        &self.sources
    }
}

impl TemplateLocator for DirectoryLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        if validate_template_name(name).is_err() {
            return None;
        }

        self.sources.iter().find_map(|source| {
            let candidate = source.root.join(name);
            trace!(source = %source.kind, candidate = %candidate.display(), "Probing");
            candidate.is_dir().then_some(candidate)
        })
    }

    fn list(&self) -> KilnResult<Vec<TemplateEntry>> {
        let mut found: BTreeMap<String, TemplateEntry> = BTreeMap::new();

        for source in &self.sources {
            for (name, path) in template_dirs(&source.root)? {
                if let Some(winner) = found.get(&name) {
                    debug!(
                        template = %name,
                        shadowed = %source.kind,
                        by = %winner.source,
                        "Template shadowed"
                    );
                    continue;
                }
                found.insert(
                    name.clone(),
                    TemplateEntry {
                        name,
                        path,
                        source: source.kind.clone(),
                    },
                );
            }
        }

        Ok(found.into_values().collect())
    }
}

/// Subdirectories of `root` that are usable template names. A missing root
/// is an empty source.
fn template_dirs(root: &Path) -> KilnResult<Vec<(String, PathBuf)>> {
    let read_dir = match fs::read_dir(root) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(root = %root.display(), "Template source does not exist");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(ApplicationError::filesystem(
                root,
                format!("Failed to read template directory: {e}"),
            )
            .into());
        }
    };

    let mut dirs = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| {
            ApplicationError::filesystem(root, format!("Failed to read directory entry: {e}"))
        })?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if validate_template_name(&name).is_ok() {
            dirs.push((name, path));
        }
    }
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source_with(names: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for name in names {
            fs::create_dir_all(temp.path().join(name)).unwrap();
        }
        temp
    }

    #[test]
    fn user_templates_shadow_bundled_ones() {
        let user = source_with(&["default"]);
        let bundled = source_with(&["default", "license-mit"]);
        let locator = DirectoryLocator::new()
            .with_bundled(bundled.path())
            .with_user(user.path());

        assert_eq!(locator.locate("default"), Some(user.path().join("default")));
        assert_eq!(
            locator.locate("license-mit"),
            Some(bundled.path().join("license-mit"))
        );
        assert_eq!(locator.locate("ghost"), None);
    }

    #[test]
    fn plugins_sit_between_user_and_bundled() {
        let user = source_with(&[]);
        let plugin = source_with(&["rails"]);
        let bundled = source_with(&["rails"]);
        let locator = DirectoryLocator::new()
            .with_bundled(bundled.path())
            .with_plugin("rails-kit", plugin.path())
            .with_user(user.path());

        let kinds: Vec<_> = locator.sources().iter().map(|s| s.kind.to_string()).collect();
        assert_eq!(kinds, vec!["user", "plugin:rails-kit", "bundled"]);
        assert_eq!(locator.locate("rails"), Some(plugin.path().join("rails")));
    }

    #[test]
    fn list_is_sorted_and_deduplicated() {
        let user = source_with(&["zeta", "default"]);
        let bundled = source_with(&["default", "alpha", ".git"]);
        fs::write(bundled.path().join("README"), "not a template").unwrap();
        let locator = DirectoryLocator::new()
            .with_user(user.path())
            .with_bundled(bundled.path());

        let entries = locator.list().unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "default", "zeta"]);

        let default = entries.iter().find(|e| e.name == "default").unwrap();
        assert_eq!(default.source, SourceKind::User);
    }

    #[test]
    fn missing_source_roots_are_empty() {
        let temp = TempDir::new().unwrap();
        let locator = DirectoryLocator::new().with_user(temp.path().join("nope"));
        assert!(locator.list().unwrap().is_empty());
        assert_eq!(locator.locate("default"), None);
    }

    #[test]
    fn names_with_separators_are_never_located() {
        let user = source_with(&["a/b"]);
        let locator = DirectoryLocator::new().with_user(user.path());
        assert_eq!(locator.locate("a/b"), None);
        assert_eq!(locator.locate(".."), None);
    }
}
