//! The `RequirementsProfile`: target settings for a generation run.

use serde::{Deserialize, Serialize};

use crate::domain::{
    error::DomainError,
    value_objects::{CiProvider, Language, ProjectDomain},
};

/// Settings that shape the generated project but not its module graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementsProfile {
    pub project_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub domain: ProjectDomain,
    /// Generate container configuration.
    #[serde(default)]
    pub container: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci: Option<CiProvider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl RequirementsProfile {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            description: None,
            language: Language::default(),
            domain: ProjectDomain::default(),
            container: false,
            ci: None,
            author: None,
        }
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn domain(mut self, domain: ProjectDomain) -> Self {
        self.domain = domain;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn container(mut self, enabled: bool) -> Self {
        self.container = enabled;
        self
    }

    pub fn ci(mut self, provider: CiProvider) -> Self {
        self.ci = Some(provider);
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// The project name doubles as the dry-run root, so it must be a
    /// single plain path segment.
    pub fn validate(&self) -> Result<(), DomainError> {
        let name = &self.project_name;
        let reason = if name.trim().is_empty() {
            Some("name cannot be empty")
        } else if name.starts_with('.') {
            Some("name cannot start with '.'")
        } else if name.contains(['/', '\\']) {
            Some("name cannot contain path separators")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(DomainError::InvalidProjectName {
                name: name.clone(),
                reason: reason.into(),
            }),
            None => Ok(()),
        }
    }
}
