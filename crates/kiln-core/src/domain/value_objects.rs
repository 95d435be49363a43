//! Domain value objects: Language, ProjectDomain, CiProvider, ConflictStrategy.
//!
//! # Design
//!
//! These are pure value types: `Copy`, equality-by-value, no identity.
//! Each one knows its string representation, its `FromStr` parser, and the
//! handful of layout facts the generator needs (file extensions, directory
//! names). Nothing here touches the filesystem.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Language ─────────────────────────────────────────────────────────────────

/// Target language of the generated project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Rust,
    TypeScript,
    Python,
    Go,
}

impl Language {
    pub const ALL: [Language; 4] = [Self::Rust, Self::TypeScript, Self::Python, Self::Go];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::TypeScript => "typescript",
            Self::Python => "python",
            Self::Go => "go",
        }
    }

    pub const fn file_extension(&self) -> &'static str {
        match self {
            Self::Rust => "rs",
            Self::TypeScript => "ts",
            Self::Python => "py",
            Self::Go => "go",
        }
    }

    /// Relative path of the program entry point.
    pub const fn entry_point(&self) -> &'static str {
        match self {
            Self::Rust => "src/main.rs",
            Self::TypeScript => "src/index.ts",
            Self::Python => "src/main.py",
            Self::Go => "main.go",
        }
    }

    /// Relative path of the package descriptor.
    pub const fn package_manifest(&self) -> &'static str {
        match self {
            Self::Rust => "Cargo.toml",
            Self::TypeScript => "package.json",
            Self::Python => "pyproject.toml",
            Self::Go => "go.mod",
        }
    }

    /// Conventional file name for the smoke test of `module` (snake case).
    pub fn test_file_name(&self, module: &str) -> String {
        match self {
            Self::Rust => format!("{module}_test.rs"),
            Self::TypeScript => format!("{module}.test.ts"),
            Self::Python => format!("test_{module}.py"),
            Self::Go => format!("{module}_test.go"),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rust" | "rs" => Ok(Self::Rust),
            "typescript" | "ts" => Ok(Self::TypeScript),
            "python" | "py" => Ok(Self::Python),
            "go" | "golang" => Ok(Self::Go),
            other => Err(DomainError::UnknownValue {
                field: "language",
                value: other.to_string(),
            }),
        }
    }
}

// ── ProjectDomain ────────────────────────────────────────────────────────────

/// The broad shape of the project being generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectDomain {
    #[default]
    Library,
    Service,
    Cli,
    /// A host application that loads plugins at runtime.
    PluginHost,
}

impl ProjectDomain {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Library => "library",
            Self::Service => "service",
            Self::Cli => "cli",
            Self::PluginHost => "plugin_host",
        }
    }

    /// Plugin hosts get an extra `src/plugins` directory.
    pub const fn needs_plugins_dir(self) -> bool {
        matches!(self, Self::PluginHost)
    }
}

impl fmt::Display for ProjectDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectDomain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "library" | "lib" => Ok(Self::Library),
            "service" | "backend" => Ok(Self::Service),
            "cli" => Ok(Self::Cli),
            "plugin_host" | "plugins" => Ok(Self::PluginHost),
            other => Err(DomainError::UnknownValue {
                field: "project domain",
                value: other.to_string(),
            }),
        }
    }
}

// ── CiProvider ───────────────────────────────────────────────────────────────

/// Continuous-integration provider whose workflow directory is scaffolded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CiProvider {
    GitHub,
    GitLab,
    CircleCi,
}

impl CiProvider {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::GitLab => "gitlab",
            Self::CircleCi => "circleci",
        }
    }

    pub const fn workflow_dir(&self) -> &'static str {
        match self {
            Self::GitHub => ".github/workflows",
            Self::GitLab => ".gitlab",
            Self::CircleCi => ".circleci",
        }
    }

    pub const fn workflow_file(&self) -> &'static str {
        match self {
            Self::GitHub => ".github/workflows/ci.yml",
            Self::GitLab => ".gitlab/ci.yml",
            Self::CircleCi => ".circleci/config.yml",
        }
    }
}

impl fmt::Display for CiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CiProvider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" | "gh" => Ok(Self::GitHub),
            "gitlab" => Ok(Self::GitLab),
            "circleci" | "circle" => Ok(Self::CircleCi),
            other => Err(DomainError::UnknownValue {
                field: "CI provider",
                value: other.to_string(),
            }),
        }
    }
}

// ── ConflictStrategy ─────────────────────────────────────────────────────────

/// Run-wide policy for a generated path that already exists.
///
/// The policy itself lives in [`crate::domain::conflict`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStrategy {
    /// Leave the existing file untouched.
    #[default]
    Skip,
    /// Replace the existing file with the new content.
    Overwrite,
    /// Write the new content followed by the merge marker.
    Merge,
}

impl ConflictStrategy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Overwrite => "overwrite",
            Self::Merge => "merge",
        }
    }
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "overwrite" | "force" => Ok(Self::Overwrite),
            "merge" => Ok(Self::Merge),
            other => Err(DomainError::UnknownValue {
                field: "conflict strategy",
                value: other.to_string(),
            }),
        }
    }
}
