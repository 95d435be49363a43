//! In-memory `Filesystem` shared by the service tests.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::application::ApplicationError;
use crate::application::ports::{Filesystem, RemoveOutcome};
use crate::error::KilnResult;

/// Clones share state, so a test can keep a handle after boxing one.
#[derive(Clone, Default)]
pub(crate) struct FakeFs {
    pub(crate) dirs: Arc<Mutex<HashSet<PathBuf>>>,
    pub(crate) files: Arc<Mutex<BTreeMap<PathBuf, String>>>,
    writes: Arc<AtomicUsize>,
    fail_after: Option<usize>,
    fail_removals: bool,
}

impl FakeFs {
    /// Every file write after the first `n` fails.
    pub(crate) fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::default()
        }
    }

    /// Every `remove_file` and `remove_dir` fails.
    pub(crate) fn failing_removals(mut self) -> Self {
        self.fail_removals = true;
        self
    }

    fn check_removal(&self, path: &Path) -> KilnResult<()> {
        if self.fail_removals {
            return Err(ApplicationError::WriteFailed {
                path: path.to_path_buf(),
                reason: "injected removal failure".into(),
            }
            .into());
        }
        Ok(())
    }

    pub(crate) fn read(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(Path::new(path)).cloned()
    }
}

impl Filesystem for FakeFs {
    fn create_dir_all(&self, path: &Path) -> KilnResult<()> {
        let mut dirs = self.dirs.lock().unwrap();
        for ancestor in path.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                dirs.insert(ancestor.to_path_buf());
            }
        }
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> KilnResult<()> {
        let n = self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|limit| n >= limit) {
            return Err(ApplicationError::WriteFailed {
                path: path.to_path_buf(),
                reason: "injected failure".into(),
            }
            .into());
        }
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_owned());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path) || self.dirs.lock().unwrap().contains(path)
    }

    fn remove_file(&self, path: &Path) -> KilnResult<RemoveOutcome> {
        self.check_removal(path)?;
        Ok(match self.files.lock().unwrap().remove(path) {
            Some(_) => RemoveOutcome::Removed,
            None => RemoveOutcome::Missing,
        })
    }

    fn remove_dir(&self, path: &Path) -> KilnResult<RemoveOutcome> {
        self.check_removal(path)?;
        let has_file = self
            .files
            .lock()
            .unwrap()
            .keys()
            .any(|f| f.parent() == Some(path));
        let has_dir = self
            .dirs
            .lock()
            .unwrap()
            .iter()
            .any(|d| d.parent() == Some(path));
        if has_file || has_dir {
            return Ok(RemoveOutcome::NotEmpty);
        }
        Ok(if self.dirs.lock().unwrap().remove(path) {
            RemoveOutcome::Removed
        } else {
            RemoveOutcome::Missing
        })
    }
}
