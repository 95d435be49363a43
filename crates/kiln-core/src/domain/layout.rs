//! Where generated artifacts go.
//!
//! Pure path arithmetic over a [`RequirementsProfile`]: the directory
//! skeleton, and the fixed location of every single-file artifact.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::domain::entities::{
    blueprint::BlueprintModule, common::RelativePath, manifest::GeneratedFile,
    profile::RequirementsProfile, render_context::to_snake_case,
};
use crate::domain::error::DomainError;

/// Directories every project gets, below the root.
pub const SKELETON_DIRS: [&str; 4] = ["src", "tests", "docs", "config"];

pub const PLUGINS_DIR: &str = "src/plugins";
pub const CONTAINER_DIR: &str = "docker";
pub const README: &str = "README.md";
pub const CONTEXT_STUB: &str = "CONTEXT.md";

/// Artifact locations for one profile.
#[derive(Debug, Clone)]
pub struct ProjectLayout<'a> {
    profile: &'a RequirementsProfile,
}

impl<'a> ProjectLayout<'a> {
    pub fn new(profile: &'a RequirementsProfile) -> Self {
        Self { profile }
    }

    /// The root followed by the fixed skeleton, then conditional directories
    /// (plugins, container config, CI workflow) in that order.
    pub fn directories(&self) -> Vec<RelativePath> {
        let mut dirs = vec![RelativePath::root()];
        dirs.extend(SKELETON_DIRS.iter().map(|d| RelativePath::new(*d)));

        if self.profile.domain.needs_plugins_dir() {
            dirs.push(RelativePath::new(PLUGINS_DIR));
        }
        if self.profile.container {
            dirs.push(RelativePath::new(CONTAINER_DIR));
        }
        if let Some(ci) = self.profile.ci {
            dirs.push(RelativePath::new(ci.workflow_dir()));
        }
        dirs
    }

    pub fn module_path(&self, module_name: &str) -> RelativePath {
        RelativePath::new(format!(
            "src/{}.{}",
            to_snake_case(module_name),
            self.profile.language.file_extension()
        ))
    }

    pub fn entry_point(&self) -> RelativePath {
        RelativePath::new(self.profile.language.entry_point())
    }

    pub fn package_manifest(&self) -> RelativePath {
        RelativePath::new(self.profile.language.package_manifest())
    }

    pub fn readme(&self) -> RelativePath {
        RelativePath::new(README)
    }

    pub fn context_stub(&self) -> RelativePath {
        RelativePath::new(CONTEXT_STUB)
    }

    /// Fail if two artifacts of one run would land on the same file.
    ///
    /// Artifacts are checked in write order, so `second` in the error is the
    /// one that would have replaced `first`.
    pub fn ensure_distinct(
        &self,
        modules: &[BlueprintModule],
        config_files: &[GeneratedFile],
        test_files: &[GeneratedFile],
    ) -> Result<(), DomainError> {
        let mut planned = modules
            .iter()
            .map(|m| (self.module_path(&m.name), format!("module '{}'", m.name)))
            .collect::<Vec<_>>();
        planned.push((self.entry_point(), "entry point".to_owned()));
        planned.push((self.package_manifest(), "package manifest".to_owned()));
        planned.push((self.readme(), "README".to_owned()));
        planned.extend(
            config_files
                .iter()
                .map(|f| (f.path.clone(), format!("config file '{}'", f.path))),
        );
        planned.extend(
            test_files
                .iter()
                .map(|f| (f.path.clone(), format!("test file '{}'", f.path))),
        );
        planned.push((self.context_stub(), "context stub".to_owned()));

        let mut seen: HashMap<RelativePath, String> = HashMap::new();
        for (path, label) in planned {
            match seen.entry(path) {
                Entry::Occupied(first) => {
                    return Err(DomainError::ArtifactPathCollision {
                        path: first.key().to_slash_string(),
                        first: first.get().clone(),
                        second: label,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(label);
                }
            }
        }
        Ok(())
    }

    /// Number of tracked steps for a run.
    ///
    /// 1 (directories) + modules + 1 (entry point) + 1 (package manifest)
    /// + 1 (README) + config files + test files + 1 (context stub).
    pub fn total_steps(modules: usize, config_files: usize, test_files: usize) -> usize {
        1 + modules + 1 + 1 + 1 + config_files + test_files + 1
    }
}
