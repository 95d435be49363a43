//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use kiln_core::{
    application::{ApplicationError, Filesystem, RemoveOutcome},
    error::KilnResult,
};

/// In-memory filesystem for testing.
///
/// Clones share the same tree, so a test can keep a handle to one clone
/// while the orchestrator owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, String>,
    directories: HashSet<PathBuf>,
    writes: usize,
    fail_after: Option<usize>,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Let the first `n` file writes succeed and fail every one after.
    pub fn failing_after(n: usize) -> Self {
        let fs = Self::new();
        if let Ok(mut inner) = fs.inner.write() {
            inner.fail_after = Some(n);
        }
        fs
    }

    /// Place a file (and its parents) as if it had been there before a run.
    pub fn seed_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref();
        let mut inner = self.write_lock();
        if let Some(parent) = path.parent() {
            insert_ancestors(&mut inner.directories, parent);
        }
        inner.files.insert(path.to_path_buf(), content.into());
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: impl AsRef<Path>) -> Option<String> {
        self.read_lock().files.get(path.as_ref()).cloned()
    }

    /// List all files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.read_lock().files.keys().cloned().collect()
    }

    /// Number of successful and failed file writes so far.
    pub fn write_count(&self) -> usize {
        self.read_lock().writes
    }

    /// Clear all contents.
    pub fn clear(&self) {
        let mut inner = self.write_lock();
        inner.files.clear();
        inner.directories.clear();
        inner.writes = 0;
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, MemoryFilesystemInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, MemoryFilesystemInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_for_update(&self) -> KilnResult<RwLockWriteGuard<'_, MemoryFilesystemInner>> {
        self.inner.write().map_err(|_| {
            ApplicationError::LockPoisoned {
                resource: "memory filesystem",
            }
            .into()
        })
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> KilnResult<()> {
        let mut inner = self.lock_for_update()?;
        insert_ancestors(&mut inner.directories, path);
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> KilnResult<()> {
        let mut inner = self.lock_for_update()?;

        let attempt = inner.writes;
        inner.writes += 1;
        if inner.fail_after.is_some_and(|limit| attempt >= limit) {
            return Err(ApplicationError::WriteFailed {
                path: path.to_path_buf(),
                reason: "injected write failure".into(),
            }
            .into());
        }

        // Ensure parent exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
                return Err(ApplicationError::WriteFailed {
                    path: path.to_path_buf(),
                    reason: "Parent directory does not exist".into(),
                }
                .into());
            }
        }

        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let inner = self.read_lock();
        inner.files.contains_key(path) || inner.directories.contains(path)
    }

    fn remove_file(&self, path: &Path) -> KilnResult<RemoveOutcome> {
        let mut inner = self.lock_for_update()?;
        Ok(match inner.files.remove(path) {
            Some(_) => RemoveOutcome::Removed,
            None => RemoveOutcome::Missing,
        })
    }

    fn remove_dir(&self, path: &Path) -> KilnResult<RemoveOutcome> {
        let mut inner = self.lock_for_update()?;
        if !inner.directories.contains(path) {
            return Ok(RemoveOutcome::Missing);
        }

        let occupied = inner.files.keys().any(|f| f.parent() == Some(path))
            || inner.directories.iter().any(|d| d.parent() == Some(path));
        if occupied {
            return Ok(RemoveOutcome::NotEmpty);
        }

        inner.directories.remove(path);
        Ok(RemoveOutcome::Removed)
    }
}

fn insert_ancestors(directories: &mut HashSet<PathBuf>, path: &Path) {
    let mut current = PathBuf::new();
    for component in path.components() {
        current.push(component);
        directories.insert(current.clone());
    }
}
