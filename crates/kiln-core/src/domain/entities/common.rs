use super::DomainError;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A filesystem path guaranteed to be relative and to stay below its root.
///
/// Invariant: never absolute, never contains `..`. Enforced at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath(PathBuf);

impl RelativePath {
    /// Fallible constructor.
    ///
    /// `.` components are dropped so `./src/lib.rs` and `src/lib.rs` compare
    /// equal.
    pub fn try_new(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        let mut normalized = PathBuf::new();

        for component in path.components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    return Err(DomainError::PathEscapesRoot {
                        path: path.display().to_string(),
                    });
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(DomainError::AbsolutePathNotAllowed {
                        path: path.display().to_string(),
                    });
                }
            }
        }

        Ok(Self(normalized))
    }

    /// Compute the path of `path` relative to `root`.
    ///
    /// Works on path components, so the result does not depend on how `root`
    /// is spelled (trailing separators and the like).
    pub fn from_root(root: &Path, path: &Path) -> Result<Self, DomainError> {
        let relative = path
            .strip_prefix(root)
            .map_err(|_| DomainError::PathEscapesRoot {
                path: path.display().to_string(),
            })?;
        Self::try_new(relative)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// UTF-8 view of the path, needed for variable substitution.
    pub fn to_str(&self) -> Result<&str, DomainError> {
        self.0.to_str().ok_or_else(|| DomainError::NonUtf8Path {
            path: self.0.display().to_string(),
        })
    }

    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name().and_then(|n| n.to_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.as_os_str().is_empty()
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_current_dir_components() {
        let path = RelativePath::try_new("./src/./lib.rs").unwrap();
        assert_eq!(path.as_path(), Path::new("src/lib.rs"));
    }

    #[test]
    fn rejects_parent_components() {
        assert!(matches!(
            RelativePath::try_new("lib/../../etc"),
            Err(DomainError::PathEscapesRoot { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn rejects_absolute_paths() {
        assert!(matches!(
            RelativePath::try_new("/etc/passwd"),
            Err(DomainError::AbsolutePathNotAllowed { .. })
        ));
    }

    #[test]
    fn from_root_ignores_root_spelling() {
        let a = RelativePath::from_root(Path::new("tpl/skeleton/"), Path::new("tpl/skeleton/a/b"));
        let b = RelativePath::from_root(Path::new("tpl/skeleton"), Path::new("tpl/skeleton/a/b"));
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn from_root_rejects_foreign_paths() {
        assert!(RelativePath::from_root(Path::new("tpl"), Path::new("other/file")).is_err());
    }
}
