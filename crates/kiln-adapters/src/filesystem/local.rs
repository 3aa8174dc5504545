//! Local filesystem adapter using std::fs.

use std::io;
use std::path::Path;

use kiln_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{KilnError, KilnResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> KilnResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> KilnResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn read_file(&self, path: &Path) -> KilnResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    #[cfg(unix)]
    fn is_executable(&self, path: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path)
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    fn is_executable(&self, _path: &Path) -> bool {
        false
    }

    fn set_executable(&self, path: &Path, executable: bool) -> KilnResult<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata =
                std::fs::metadata(path).map_err(|e| map_io_error(path, e, "get metadata"))?;
            let mut perms = metadata.permissions();
            let mode = perms.mode();
            // Execute bits mirror the read bits, like `chmod +x`.
            let mode = if executable {
                mode | ((mode & 0o444) >> 2)
            } else {
                mode & !0o111
            };
            perms.set_mode(mode);
            std::fs::set_permissions(path, perms)
                .map_err(|e| map_io_error(path, e, "set permissions"))?;
        }
        #[cfg(not(unix))]
        {
            let _ = (path, executable);
        }
        Ok(())
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> KilnError {
    ApplicationError::filesystem(path, format!("Failed to {}: {}", operation, e)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_then_read_bytes() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let path = temp.path().join("a/b/file.bin");

        fs.create_dir_all(path.parent().unwrap()).unwrap();
        fs.write_file(&path, &[0, 159, 146, 150]).unwrap();

        assert!(fs.is_file(&path));
        assert!(!fs.is_file(path.parent().unwrap()));
        assert_eq!(fs.read_file(&path).unwrap(), vec![0, 159, 146, 150]);
    }

    #[test]
    fn create_dir_all_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let dir = temp.path().join("x/y");

        fs.create_dir_all(&dir).unwrap();
        fs.create_dir_all(&dir).unwrap();
        assert!(fs.exists(&dir));
    }

    #[test]
    fn write_into_missing_parent_fails_with_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing/file");

        let err = LocalFilesystem::new().write_file(&path, b"x").unwrap_err();
        match err {
            KilnError::Application(ApplicationError::FilesystemError { path: p, .. }) => {
                assert_eq!(p, path);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn executable_bit_round_trips() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let path = temp.path().join("run");
        fs.write_file(&path, b"#!/bin/sh\n").unwrap();

        assert!(!fs.is_executable(&path));
        fs.set_executable(&path, true).unwrap();
        assert!(fs.is_executable(&path));
        fs.set_executable(&path, false).unwrap();
        assert!(!fs.is_executable(&path));
    }
}
