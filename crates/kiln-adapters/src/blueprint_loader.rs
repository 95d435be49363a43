//! Loads generation requests from JSON or TOML files.
//!
//! # File format
//!
//! A request pairs a blueprint with a requirements profile:
//!
//! ```toml
//! [blueprint]
//! name = "layered"
//! description = "API over a core library"   # optional
//!
//! [[blueprint.modules]]
//! name = "api"
//! depends_on = ["core"]                     # `dependsOn` also accepted
//!
//! [[blueprint.modules]]
//! name = "core"
//! template = "// {{MODULE_NAME}} v{{VERSION}}\n"   # optional
//! template_vars = { VERSION = "1" }         # `templateVars` also accepted
//!
//! [profile]
//! project_name = "shop"
//! language = "rust"          # rust | typescript | python | go
//! domain = "service"         # library | service | cli | plugin_host
//! container = true
//! ci = "github"              # github | gitlab | circleci
//! ```
//!
//! The JSON form has the same shape.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use kiln_core::{
    application::ApplicationError,
    domain::{Blueprint, RequirementsProfile},
    error::KilnResult,
};

/// A blueprint plus the profile to generate it with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub blueprint: Blueprint,
    pub profile: RequirementsProfile,
}

/// Supported request encodings, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFormat {
    Json,
    Toml,
}

impl RequestFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

impl fmt::Display for RequestFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Toml => "toml",
        })
    }
}

/// Reads [`GenerationRequest`]s from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlueprintLoader;

impl BlueprintLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a request file. The format follows the extension.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::RequestLoad`] if the extension is not
    /// `.json`/`.toml`, the file cannot be read, or it does not parse.
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn load(&self, path: impl AsRef<Path>) -> KilnResult<GenerationRequest> {
        let path = path.as_ref();
        let format = RequestFormat::from_path(path).ok_or_else(|| {
            request_error(path, "unsupported extension; expected .json or .toml")
        })?;

        let raw = fs::read_to_string(path)
            .map_err(|e| request_error(path, format!("failed to read file: {e}")))?;

        let request = self.parse(&raw, format).map_err(|reason| request_error(path, reason))?;
        debug!(
            %format,
            blueprint = %request.blueprint.name,
            modules = request.blueprint.modules.len(),
            "request loaded"
        );
        Ok(request)
    }

    /// Parse request text in the given format.
    pub fn parse(&self, raw: &str, format: RequestFormat) -> Result<GenerationRequest, String> {
        match format {
            RequestFormat::Json => serde_json::from_str(raw).map_err(|e| e.to_string()),
            RequestFormat::Toml => toml::from_str(raw).map_err(|e| e.to_string()),
        }
    }
}

fn request_error(path: &Path, reason: impl Into<String>) -> kiln_core::error::KilnError {
    ApplicationError::RequestLoad {
        path: PathBuf::from(path),
        reason: reason.into(),
    }
    .into()
}
