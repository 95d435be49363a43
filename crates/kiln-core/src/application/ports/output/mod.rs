//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `kiln-adapters` crate provides implementations.

use std::path::Path;

use crate::domain::{Blueprint, BlueprintModule, GeneratedFile, RequirementsProfile};
use crate::error::KilnResult;

/// Result of a removal during rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// Nothing was there (already deleted externally).
    Missing,
    /// A directory still had entries and was left in place.
    NotEmpty,
}

/// Port for filesystem operations.
///
/// Implemented by:
/// - `kiln_adapters::filesystem::LocalFilesystem` (production)
/// - `kiln_adapters::filesystem::MemoryFilesystem` (testing)
///
/// Paths are absolute or relative to the process working directory; the
/// transactional writer resolves them against the output root before
/// calling in.
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories. Existing directories
    /// are not an error.
    fn create_dir_all(&self, path: &Path) -> KilnResult<()>;

    /// Write content to a file, replacing it if present. The parent
    /// directory must exist.
    fn write_file(&self, path: &Path, content: &str) -> KilnResult<()>;

    /// Check if path exists (file or directory).
    fn exists(&self, path: &Path) -> bool;

    /// Remove a single file.
    fn remove_file(&self, path: &Path) -> KilnResult<RemoveOutcome>;

    /// Remove a directory only if it is empty.
    fn remove_dir(&self, path: &Path) -> KilnResult<RemoveOutcome>;
}

/// Port for the text of generated artifacts.
///
/// Implemented by:
/// - `kiln_adapters::TemplateContentProducer` (built-in templates)
///
/// Every method is a pure function of its inputs. An `Err` aborts the run
/// and triggers rollback.
#[cfg_attr(test, mockall::automock)]
pub trait ContentProducer: Send + Sync {
    fn render_module(
        &self,
        module: &BlueprintModule,
        profile: &RequirementsProfile,
    ) -> KilnResult<String>;

    /// `modules` is in dependency order.
    fn render_entry_point(
        &self,
        modules: &[BlueprintModule],
        profile: &RequirementsProfile,
    ) -> KilnResult<String>;

    fn render_manifest_file(
        &self,
        profile: &RequirementsProfile,
        modules: &[BlueprintModule],
    ) -> KilnResult<String>;

    fn render_readme(
        &self,
        profile: &RequirementsProfile,
        modules: &[BlueprintModule],
    ) -> KilnResult<String>;

    fn render_config_files(&self, profile: &RequirementsProfile) -> KilnResult<Vec<GeneratedFile>>;

    fn render_test_files(
        &self,
        modules: &[BlueprintModule],
        profile: &RequirementsProfile,
    ) -> KilnResult<Vec<GeneratedFile>>;

    fn render_context_stub(
        &self,
        blueprint: &Blueprint,
        profile: &RequirementsProfile,
    ) -> KilnResult<String>;
}
