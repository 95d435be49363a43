//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `KILN_*` environment variables, `__` between sections
//!    (`KILN_GENERATION__CONFLICT_STRATEGY=merge`)
//! 3. Config file (`--config`, or the platform config directory)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use kiln_core::domain::ConflictStrategy;

use crate::cli::OutputFormat;

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub generation: GenerationConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Strategy used when `--on-conflict` is not given.
    pub conflict_strategy: ConflictStrategy,
    /// Parent directory for projects when `--output` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: OutputFormat,
    /// Show a progress bar while generating.
    pub progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: OutputFormat::Human,
            progress: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, file, and environment.
    ///
    /// `config_file` is the `--config` path. An explicit file must exist
    /// when `require_file` is set; the platform default is always optional.
    pub fn load(config_file: Option<&Path>, require_file: bool) -> anyhow::Result<Self> {
        let mut builder = Config::builder().add_source(
            Config::try_from(&Self::default()).context("Failed to encode built-in defaults")?,
        );

        builder = match config_file {
            Some(path) => builder.add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(require_file),
            ),
            None => builder.add_source(
                File::from(Self::config_path())
                    .format(FileFormat::Toml)
                    .required(false),
            ),
        };

        builder = builder.add_source(
            Environment::with_prefix("KILN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.kiln.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "kiln", "kiln")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".kiln.toml"))
    }

    /// Where to generate `project_name` when no `--output` was given.
    pub fn output_root(&self, project_name: &str) -> PathBuf {
        self.generation
            .default_output
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(project_name)
    }

    /// Look up one dotted key, rendered as text.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "generation.conflict_strategy" => self.generation.conflict_strategy.to_string(),
            "generation.default_output" => self
                .generation
                .default_output
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "output.no_color" => self.output.no_color.to_string(),
            "output.format" => self.output.format.to_string(),
            "output.progress" => self.output.progress.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Every key [`get`](Self::get) understands.
    pub const KEYS: [&'static str; 5] = [
        "generation.conflict_strategy",
        "generation.default_output",
        "output.no_color",
        "output.format",
        "output.progress",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.generation.conflict_strategy, ConflictStrategy::Skip);
        assert_eq!(cfg.output.format, OutputFormat::Human);
        assert!(cfg.output.progress);
        assert!(!cfg.output.no_color);
    }

    #[test]
    fn file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("kiln.toml");
        fs::write(
            &path,
            "[generation]\nconflict_strategy = \"merge\"\ndefault_output = \"/srv/projects\"\n\n\
             [output]\nprogress = false\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path), true).unwrap();

        assert_eq!(cfg.generation.conflict_strategy, ConflictStrategy::Merge);
        assert_eq!(
            cfg.output_root("shop"),
            PathBuf::from("/srv/projects/shop")
        );
        assert!(!cfg.output.progress);
        assert_eq!(cfg.output.format, OutputFormat::Human);
    }

    #[test]
    fn missing_explicit_file_is_an_error_only_when_required() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.toml");

        assert!(AppConfig::load(Some(&path), true).is_err());
        assert!(AppConfig::load(Some(&path), false).is_ok());
    }

    #[test]
    fn bad_value_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("kiln.toml");
        fs::write(&path, "[generation]\nconflict_strategy = \"ask\"\n").unwrap();

        assert!(AppConfig::load(Some(&path), true).is_err());
    }

    #[test]
    fn serialised_defaults_round_trip_through_toml() {
        let text = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let back: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, AppConfig::default());
    }

    #[test]
    fn every_key_resolves() {
        let cfg = AppConfig::default();
        for key in AppConfig::KEYS {
            assert!(cfg.get(key).is_some(), "{key}");
        }
        assert_eq!(cfg.get("generation.conflict_strategy").as_deref(), Some("skip"));
        assert!(cfg.get("templates.registry_url").is_none());
    }

    #[test]
    fn output_root_defaults_to_cwd() {
        assert_eq!(
            AppConfig::default().output_root("shop"),
            PathBuf::from("./shop")
        );
    }
}
