//! Local filesystem adapter using std::fs.

use std::io;
use std::path::Path;

use kiln_core::{
    application::{ApplicationError, Filesystem, RemoveOutcome},
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

    fn write_file(&self, path: &Path, content: &str) -> KilnResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_file(&self, path: &Path) -> KilnResult<RemoveOutcome> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(RemoveOutcome::Removed),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(RemoveOutcome::Missing),
            Err(e) => Err(map_io_error(path, e, "remove file")),
        }
    }

    fn remove_dir(&self, path: &Path) -> KilnResult<RemoveOutcome> {
        match std::fs::remove_dir(path) {
            Ok(()) => Ok(RemoveOutcome::Removed),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(RemoveOutcome::Missing),
            Err(e) if e.kind() == io::ErrorKind::DirectoryNotEmpty => Ok(RemoveOutcome::NotEmpty),
            Err(e) => Err(map_io_error(path, e, "remove directory")),
        }
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> KilnError {
    ApplicationError::WriteFailed {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_requires_existing_parent() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();

        let err = fs
            .write_file(&temp.path().join("missing/a.txt"), "x")
            .unwrap_err();
        assert!(err.to_string().contains("write file"));
    }

    #[test]
    fn remove_reports_missing_and_not_empty() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let dir = temp.path().join("dir");
        fs.create_dir_all(&dir).unwrap();
        fs.write_file(&dir.join("keep.txt"), "keep").unwrap();

        assert_eq!(
            fs.remove_file(&dir.join("nope.txt")).unwrap(),
            RemoveOutcome::Missing
        );
        assert_eq!(fs.remove_dir(&dir).unwrap(), RemoveOutcome::NotEmpty);
        assert_eq!(
            fs.remove_file(&dir.join("keep.txt")).unwrap(),
            RemoveOutcome::Removed
        );
        assert_eq!(fs.remove_dir(&dir).unwrap(), RemoveOutcome::Removed);
        assert_eq!(fs.remove_dir(&dir).unwrap(), RemoveOutcome::Missing);
        assert!(!fs.exists(&dir));
    }
}
