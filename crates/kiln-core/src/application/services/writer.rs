//! Transactional writer - records everything it creates so a failed run
//! can be undone.
//!
//! In dry-run mode nothing touches the filesystem port. Directories and
//! files are tracked in memory, and the ledger is recorded exactly as it
//! would be for a real run.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::{
    application::{ApplicationError, ports::Filesystem, ports::RemoveOutcome},
    domain::{ArtifactKind, CreatedArtifact, RelativePath},
    error::{KilnError, KilnResult},
};

/// Where writes go.
enum Backend<'fs> {
    Disk(&'fs dyn Filesystem),
    Virtual { directories: BTreeSet<RelativePath> },
}

/// What a rollback did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollbackReport {
    pub files_removed: usize,
    pub directories_removed: usize,
    /// Directories left in place because they held foreign content.
    pub directories_kept: usize,
    /// Entries already gone before rollback reached them.
    pub missing: usize,
}

/// Everything a finished writer produced.
#[derive(Debug, Clone, Default)]
pub struct WriterOutput {
    pub ledger: Vec<CreatedArtifact>,
    pub files: BTreeMap<RelativePath, String>,
}

/// Ledger-keeping writer scoped to one output root and one run.
pub struct TransactionalWriter<'fs> {
    root: PathBuf,
    backend: Backend<'fs>,
    ledger: Vec<CreatedArtifact>,
    files: BTreeMap<RelativePath, String>,
}

impl<'fs> TransactionalWriter<'fs> {
    /// Writer that goes through the filesystem port.
    pub fn new(filesystem: &'fs dyn Filesystem, root: impl Into<PathBuf>) -> Self {
        Self::with_backend(root.into(), Backend::Disk(filesystem))
    }

    /// Writer that keeps everything in memory.
    pub fn dry_run(root: impl Into<PathBuf>) -> Self {
        Self::with_backend(
            root.into(),
            Backend::Virtual {
                directories: BTreeSet::new(),
            },
        )
    }

    fn with_backend(root: PathBuf, backend: Backend<'fs>) -> Self {
        Self {
            root,
            backend,
            ledger: Vec::new(),
            files: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self.backend, Backend::Virtual { .. })
    }

    pub fn ledger(&self) -> &[CreatedArtifact] {
        &self.ledger
    }

    /// Files written during this run, keyed by relative path.
    pub fn files(&self) -> &BTreeMap<RelativePath, String> {
        &self.files
    }

    /// Absolute location of `path` under the output root.
    pub fn resolve(&self, path: &RelativePath) -> PathBuf {
        if path.is_root() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }

    /// Create a directory (and its parents) and record it.
    ///
    /// Intermediate directories below the root are recorded too, shallowest
    /// first, so rollback can prune them. The root is only recorded when it
    /// is the target.
    pub fn create_directory(&mut self, path: &RelativePath) -> KilnResult<()> {
        let absolute = self.resolve(path);

        let mut chain = vec![path.clone()];
        let mut current = path.parent();
        while !current.is_root() {
            chain.push(current.clone());
            current = current.parent();
        }
        chain.reverse();

        match &mut self.backend {
            Backend::Disk(fs) => fs.create_dir_all(&absolute)?,
            Backend::Virtual { directories } => {
                directories.insert(RelativePath::root());
                directories.extend(chain.iter().cloned());
            }
        }

        debug!(path = %absolute.display(), "directory created");
        for dir in chain {
            let dir_absolute = self.resolve(&dir);
            self.record(dir_absolute, dir, ArtifactKind::Directory, 0);
        }
        Ok(())
    }

    /// Write a file, creating its parent directory first. Both are recorded.
    pub fn write_file(&mut self, path: &RelativePath, content: &str) -> KilnResult<()> {
        self.create_directory(&path.parent())?;

        let absolute = self.resolve(path);
        if let Backend::Disk(fs) = &self.backend {
            fs.write_file(&absolute, content)?;
        }

        debug!(path = %absolute.display(), bytes = content.len(), "file written");
        self.files.insert(path.clone(), content.to_owned());
        self.record(absolute, path.clone(), ArtifactKind::File, content.len() as u64);
        Ok(())
    }

    /// Whether `path` exists, on disk or in this run's virtual tree.
    pub fn exists(&self, path: &RelativePath) -> bool {
        match &self.backend {
            Backend::Disk(fs) => fs.exists(&self.resolve(path)),
            Backend::Virtual { directories } => {
                self.files.contains_key(path) || directories.contains(path)
            }
        }
    }

    /// Undo every recorded creation.
    ///
    /// Files go first, newest to oldest. Directories follow, deepest first,
    /// and are only removed when empty. Entries that have already vanished
    /// are tolerated. On success the ledger is cleared.
    pub fn rollback(&mut self) -> KilnResult<RollbackReport> {
        let mut report = RollbackReport::default();

        let files: Vec<(PathBuf, RelativePath)> = self
            .ledger
            .iter()
            .rev()
            .filter(|a| a.is_file())
            .map(|a| (a.absolute_path.clone(), a.relative_path.clone()))
            .collect();

        for (absolute, relative) in files {
            let outcome = match &self.backend {
                Backend::Disk(fs) => fs
                    .remove_file(&absolute)
                    .map_err(|e| rollback_failed(&absolute, e))?,
                Backend::Virtual { .. } => {
                    if self.files.contains_key(&relative) {
                        RemoveOutcome::Removed
                    } else {
                        RemoveOutcome::Missing
                    }
                }
            };
            self.files.remove(&relative);
            report.tally_file(outcome);
        }

        let mut directories: Vec<(PathBuf, RelativePath)> = Vec::new();
        for artifact in self.ledger.iter().filter(|a| a.is_directory()) {
            if !directories.iter().any(|(_, r)| *r == artifact.relative_path) {
                directories.push((
                    artifact.absolute_path.clone(),
                    artifact.relative_path.clone(),
                ));
            }
        }
        // Deepest first; stable so equal lengths keep ledger order.
        directories.sort_by_key(|(abs, _)| std::cmp::Reverse(abs.as_os_str().len()));

        for (absolute, relative) in directories {
            let outcome = match &mut self.backend {
                Backend::Disk(fs) => fs
                    .remove_dir(&absolute)
                    .map_err(|e| rollback_failed(&absolute, e))?,
                Backend::Virtual { directories } => {
                    let occupied = directories.iter().any(|d| relative.contains(d))
                        || self.files.keys().any(|f| relative.contains(f));
                    if occupied {
                        RemoveOutcome::NotEmpty
                    } else if directories.remove(&relative) {
                        RemoveOutcome::Removed
                    } else {
                        RemoveOutcome::Missing
                    }
                }
            };
            if outcome == RemoveOutcome::NotEmpty {
                warn!(path = %absolute.display(), "directory not empty; left in place");
            }
            report.tally_directory(outcome);
        }

        self.ledger.clear();
        info!(
            files = report.files_removed,
            directories = report.directories_removed,
            kept = report.directories_kept,
            "rollback complete"
        );
        Ok(report)
    }

    /// Consume the writer, handing back its ledger and file map.
    pub fn finish(self) -> WriterOutput {
        WriterOutput {
            ledger: self.ledger,
            files: self.files,
        }
    }

    fn record(
        &mut self,
        absolute_path: PathBuf,
        relative_path: RelativePath,
        kind: ArtifactKind,
        byte_size: u64,
    ) {
        self.ledger.push(CreatedArtifact {
            absolute_path,
            relative_path,
            kind,
            byte_size,
            created_at: Utc::now(),
        });
    }
}

impl RollbackReport {
    fn tally_file(&mut self, outcome: RemoveOutcome) {
        match outcome {
            RemoveOutcome::Removed => self.files_removed += 1,
            RemoveOutcome::Missing => self.missing += 1,
            // A file cannot be non-empty in the directory sense.
            RemoveOutcome::NotEmpty => {}
        }
    }

    fn tally_directory(&mut self, outcome: RemoveOutcome) {
        match outcome {
            RemoveOutcome::Removed => self.directories_removed += 1,
            RemoveOutcome::Missing => self.missing += 1,
            RemoveOutcome::NotEmpty => self.directories_kept += 1,
        }
    }
}

fn rollback_failed(path: &Path, source: KilnError) -> KilnError {
    ApplicationError::RollbackFailed {
        path: path.to_path_buf(),
        reason: source.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::test_support::FakeFs;

    #[test]
    fn write_records_parent_then_file() {
        let fs = FakeFs::default();
        let mut writer = TransactionalWriter::new(&fs, "/out");

        writer
            .write_file(&RelativePath::new("src/lib.rs"), "pub fn x() {}")
            .unwrap();

        let ledger = writer.ledger();
        assert_eq!(ledger.len(), 2);
        assert!(ledger[0].is_directory());
        assert_eq!(ledger[0].relative_path, RelativePath::new("src"));
        assert!(ledger[1].is_file());
        assert_eq!(ledger[1].byte_size, 13);
        assert_eq!(ledger[1].absolute_path, PathBuf::from("/out/src/lib.rs"));
        assert!(fs.exists(Path::new("/out/src/lib.rs")));
    }

    #[test]
    fn root_resolves_without_trailing_separator() {
        let fs = FakeFs::default();
        let writer = TransactionalWriter::new(&fs, "/out");
        assert_eq!(writer.resolve(&RelativePath::root()), PathBuf::from("/out"));
    }

    #[test]
    fn rollback_removes_everything_created() {
        let fs = FakeFs::default();
        let mut writer = TransactionalWriter::new(&fs, "/out");
        writer.create_directory(&RelativePath::root()).unwrap();
        writer
            .write_file(&RelativePath::new("src/a.rs"), "a")
            .unwrap();
        writer.write_file(&RelativePath::new("README.md"), "r").unwrap();

        let report = writer.rollback().unwrap();

        assert_eq!(report.files_removed, 2);
        assert_eq!(report.directories_removed, 2);
        assert!(writer.ledger().is_empty());
        assert!(writer.files().is_empty());
        assert!(fs.files.lock().unwrap().is_empty());
        assert!(!fs.exists(Path::new("/out")));
    }

    #[test]
    fn failed_removal_keeps_the_ledger() {
        let fs = FakeFs::default().failing_removals();
        let mut writer = TransactionalWriter::new(&fs, "/out");
        writer.write_file(&RelativePath::new("src/a.rs"), "a").unwrap();

        let err = writer.rollback().unwrap_err();

        match err {
            KilnError::Application(ApplicationError::RollbackFailed { path, reason }) => {
                assert_eq!(path, PathBuf::from("/out/src/a.rs"));
                assert!(reason.contains("injected removal failure"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(writer.ledger().len(), 2);
        assert!(fs.exists(Path::new("/out/src/a.rs")));
    }

    #[test]
    fn rollback_tolerates_externally_deleted_files() {
        let fs = FakeFs::default();
        let mut writer = TransactionalWriter::new(&fs, "/out");
        writer.write_file(&RelativePath::new("a.txt"), "a").unwrap();
        fs.files.lock().unwrap().clear();

        let report = writer.rollback().unwrap();
        assert_eq!(report.missing, 1);
    }

    #[test]
    fn rollback_keeps_directories_with_foreign_content() {
        let fs = FakeFs::default();
        let mut writer = TransactionalWriter::new(&fs, "/out");
        writer.write_file(&RelativePath::new("src/a.rs"), "a").unwrap();
        fs.write_file(Path::new("/out/src/user.rs"), "mine").unwrap();

        let report = writer.rollback().unwrap();

        assert_eq!(report.directories_kept, 1);
        assert!(fs.exists(Path::new("/out/src/user.rs")));
    }

    #[test]
    fn dry_run_tracks_virtual_tree() {
        let mut writer = TransactionalWriter::dry_run("demo");
        assert!(writer.is_dry_run());
        writer
            .write_file(&RelativePath::new("src/plugins/a.rs"), "a")
            .unwrap();

        assert!(writer.exists(&RelativePath::new("src/plugins/a.rs")));
        assert!(writer.exists(&RelativePath::new("src")));
        assert!(!writer.exists(&RelativePath::new("docs")));
        // src, src/plugins, then the file
        assert_eq!(writer.ledger().len(), 3);

        let report = writer.rollback().unwrap();
        assert_eq!(report.files_removed, 1);
        assert_eq!(report.directories_removed, 2);
        assert!(!writer.exists(&RelativePath::new("src/plugins")));
        assert!(!writer.exists(&RelativePath::new("src")));
    }

    #[test]
    fn finish_hands_back_files() {
        let mut writer = TransactionalWriter::dry_run("demo");
        writer.write_file(&RelativePath::new("a.txt"), "hello").unwrap();

        let output = writer.finish();
        assert_eq!(output.files[&RelativePath::new("a.txt")], "hello");
        assert_eq!(output.ledger.len(), 2);
    }
}
