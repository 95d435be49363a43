use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{entities::common::RelativePath, error::DomainError};

/// What a ledger entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    File,
    Directory,
}

/// One successful write or mkdir, as recorded in a writer's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedArtifact {
    pub absolute_path: PathBuf,
    pub relative_path: RelativePath,
    pub kind: ArtifactKind,
    pub byte_size: u64,
    pub created_at: DateTime<Utc>,
}

impl CreatedArtifact {
    pub fn is_file(&self) -> bool {
        self.kind == ArtifactKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == ArtifactKind::Directory
    }
}

/// A producer-supplied file: path relative to the output root plus content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub path: RelativePath,
    pub content: String,
}

impl GeneratedFile {
    /// Build a file from a path known to be relative, typically a literal.
    ///
    /// # Panics
    /// Converting a `&str` path panics if it is absolute or contains `..`.
    /// Use [`GeneratedFile::try_new`] for paths derived from input.
    pub fn new(path: impl Into<RelativePath>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn try_new(
        path: impl Into<PathBuf>,
        content: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            path: RelativePath::try_new(path)?,
            content: content.into(),
        })
    }
}

/// Summary of a finished run. Immutable once built.
///
/// `files` and `directories` are relative to `output_path` and use forward
/// slashes, so a dry run and a real run of the same inputs compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedManifest {
    pub run_id: Uuid,
    pub name: String,
    pub output_path: PathBuf,
    pub files: Vec<String>,
    pub directories: Vec<String>,
    pub total_files: usize,
    pub total_bytes: u64,
    pub duration_ms: u64,
    pub generated_at: DateTime<Utc>,
    pub dry_run: bool,
}

impl GeneratedManifest {
    /// Build a manifest from a writer ledger.
    ///
    /// Paths written more than once appear once, at their first position;
    /// their byte size is the size of the last write. The output root itself
    /// is not listed as a directory.
    pub fn from_ledger(
        name: impl Into<String>,
        output_path: impl Into<PathBuf>,
        ledger: &[CreatedArtifact],
        duration_ms: u64,
        dry_run: bool,
    ) -> Self {
        let mut files: Vec<String> = Vec::new();
        let mut sizes: HashMap<String, u64> = HashMap::new();
        let mut directories: Vec<String> = Vec::new();

        for artifact in ledger {
            let rel = artifact.relative_path.to_slash_string();
            match artifact.kind {
                ArtifactKind::File => {
                    if sizes.insert(rel.clone(), artifact.byte_size).is_none() {
                        files.push(rel);
                    }
                }
                ArtifactKind::Directory => {
                    if !rel.is_empty() && !directories.contains(&rel) {
                        directories.push(rel);
                    }
                }
            }
        }

        Self {
            run_id: Uuid::new_v4(),
            name: name.into(),
            output_path: output_path.into(),
            total_files: files.len(),
            total_bytes: sizes.values().sum(),
            files,
            directories,
            duration_ms,
            generated_at: Utc::now(),
            dry_run,
        }
    }
}
