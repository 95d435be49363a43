//! The `Blueprint`: what one generation run should produce.
//!
//! A blueprint is immutable input. It names the modules to generate and
//! their same-batch dependencies; everything else (paths, ordering, content)
//! is derived from it by the generator.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::{entities::render_context::to_snake_case, error::DomainError};

/// A resolved architecture description for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub modules: Vec<BlueprintModule>,
}

impl Blueprint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            modules: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_module(mut self, module: BlueprintModule) -> Self {
        self.modules.push(module);
        self
    }

    pub fn module(&self, name: &str) -> Option<&BlueprintModule> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Check module names: non-empty, free of path syntax, unique.
    ///
    /// Dependencies on modules outside the blueprint are *not* an error;
    /// they are treated as already satisfied.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        for module in &self.modules {
            module.validate()?;
            if !seen.insert(module.name.as_str()) {
                return Err(DomainError::DuplicateModule {
                    blueprint: self.name.clone(),
                    name: module.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// A named unit of generated source with declared dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintModule {
    /// Unique within the blueprint; the ordering key.
    pub name: String,
    #[serde(default, alias = "dependsOn")]
    pub depends_on: Vec<String>,
    /// Inline template text rendered by the content producer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, alias = "templateVars", skip_serializing_if = "BTreeMap::is_empty")]
    pub template_vars: BTreeMap<String, String>,
}

impl BlueprintModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            depends_on: Vec::new(),
            template: None,
            template_vars: BTreeMap::new(),
        }
    }

    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(deps.into_iter().map(Into::into));
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.template_vars.insert(key.into(), value.into());
        self
    }

    fn validate(&self) -> Result<(), DomainError> {
        let reason = if self.name.trim().is_empty() {
            Some("name cannot be empty")
        } else if self.name.contains(['/', '\\']) {
            Some("name cannot contain path separators")
        } else if self.name.starts_with('.') {
            Some("name cannot start with '.'")
        } else if to_snake_case(&self.name).is_empty() {
            Some("name needs at least one character besides separators")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(DomainError::InvalidModuleName {
                name: self.name.clone(),
                reason: reason.into(),
            }),
            None => Ok(()),
        }
    }
}
