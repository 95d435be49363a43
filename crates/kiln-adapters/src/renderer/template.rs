//! Default content producer using `{{VARIABLE}}` substitution.

use std::fmt::Write as _;

use kiln_core::{
    application::ContentProducer,
    domain::{
        Blueprint, BlueprintModule, GeneratedFile, Language, RelativePath, RenderContext,
        RequirementsProfile, layout, to_pascal_case, to_snake_case,
    },
    error::{KilnError, KilnResult},
};
use tracing::{debug, instrument};

use super::snippets;

/// Produces every artifact from built-in snippets.
///
/// A module with an inline `template` is rendered from that text instead of
/// the language stub. Module `template_vars` override built-in variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateContentProducer;

impl TemplateContentProducer {
    pub fn new() -> Self {
        Self
    }

    fn context(profile: &RequirementsProfile) -> RenderContext {
        RenderContext::new(&profile.project_name)
            .with_variable(
                "DESCRIPTION",
                profile.description.clone().unwrap_or_default(),
            )
            .with_variable("AUTHOR", profile.author.clone().unwrap_or_default())
            .with_variable("LANGUAGE", profile.language.as_str())
            .with_variable("DOMAIN", profile.domain.as_str())
    }

    fn module_context(module: &BlueprintModule, profile: &RequirementsProfile) -> RenderContext {
        let dependencies = if module.depends_on.is_empty() {
            "none".to_string()
        } else {
            module.depends_on.join(", ")
        };

        Self::context(profile)
            .with_variable("MODULE_NAME", module.name.as_str())
            .with_variable("MODULE_NAME_SNAKE", to_snake_case(&module.name))
            .with_variable("MODULE_NAME_PASCAL", to_pascal_case(&module.name))
            .with_variable("DEPENDENCIES", dependencies)
            .with_variables(&module.template_vars)
    }
}

impl ContentProducer for TemplateContentProducer {
    #[instrument(skip_all, fields(module = %module.name))]
    fn render_module(
        &self,
        module: &BlueprintModule,
        profile: &RequirementsProfile,
    ) -> KilnResult<String> {
        let ctx = Self::module_context(module, profile);
        let source = match &module.template {
            Some(inline) => {
                debug!("rendering inline template");
                inline.as_str()
            }
            None => snippets::module_stub(profile.language),
        };
        Ok(ctx.render(source))
    }

    fn render_entry_point(
        &self,
        modules: &[BlueprintModule],
        profile: &RequirementsProfile,
    ) -> KilnResult<String> {
        let names: Vec<String> = modules.iter().map(|m| to_snake_case(&m.name)).collect();
        let mut out = String::new();

        match profile.language {
            Language::Rust => {
                for name in &names {
                    let _ = writeln!(out, "mod {name};");
                }
                if !names.is_empty() {
                    out.push('\n');
                }
                out.push_str("fn main() {\n");
                for name in &names {
                    let _ = writeln!(out, "    {name}::init();");
                }
                out.push_str("}\n");
            }
            Language::TypeScript => {
                for name in &names {
                    let _ = writeln!(
                        out,
                        "import {{ init as {} }} from \"./{name}\";",
                        init_alias(name)
                    );
                }
                if !names.is_empty() {
                    out.push('\n');
                }
                for name in &names {
                    let _ = writeln!(out, "{}();", init_alias(name));
                }
            }
            Language::Python => {
                for name in &names {
                    let _ = writeln!(out, "import {name}");
                }
                out.push_str("\n\ndef main() -> None:\n");
                if names.is_empty() {
                    out.push_str("    pass\n");
                }
                for name in &names {
                    let _ = writeln!(out, "    {name}.init()");
                }
                out.push_str("\n\nif __name__ == \"__main__\":\n    main()\n");
            }
            Language::Go => {
                out.push_str("package main\n\nfunc main() {\n");
                for module in modules {
                    let _ = writeln!(out, "\tinit{}()", to_pascal_case(&module.name));
                }
                out.push_str("}\n");
            }
        }

        Ok(out)
    }

    fn render_manifest_file(
        &self,
        profile: &RequirementsProfile,
        _modules: &[BlueprintModule],
    ) -> KilnResult<String> {
        let template = match profile.language {
            Language::Rust => {
                let mut s = String::from(
                    "[package]\nname = \"{{PROJECT_NAME_KEBAB}}\"\nversion = \"0.1.0\"\nedition = \"2024\"\n",
                );
                if profile.description.is_some() {
                    s.push_str("description = \"{{DESCRIPTION}}\"\n");
                }
                if profile.author.is_some() {
                    s.push_str("authors = [\"{{AUTHOR}}\"]\n");
                }
                s.push_str("\n[dependencies]\n");
                s
            }
            Language::TypeScript => String::from(
                "{\n  \"name\": \"{{PROJECT_NAME_KEBAB}}\",\n  \"version\": \"0.1.0\",\n  \
                 \"description\": \"{{DESCRIPTION}}\",\n  \"author\": \"{{AUTHOR}}\",\n  \
                 \"scripts\": {\n    \"start\": \"node dist/index.js\",\n    \
                 \"test\": \"jest\"\n  }\n}\n",
            ),
            Language::Python => String::from(
                "[project]\nname = \"{{PROJECT_NAME_KEBAB}}\"\nversion = \"0.1.0\"\n\
                 description = \"{{DESCRIPTION}}\"\nrequires-python = \">=3.12\"\n",
            ),
            Language::Go => String::from("module {{PROJECT_NAME_KEBAB}}\n\ngo 1.22\n"),
        };
        Ok(Self::context(profile).render(&template))
    }

    fn render_readme(
        &self,
        profile: &RequirementsProfile,
        modules: &[BlueprintModule],
    ) -> KilnResult<String> {
        let mut out = String::from("# {{PROJECT_NAME}}\n\n");
        if profile.description.is_some() {
            out.push_str("{{DESCRIPTION}}\n\n");
        }
        out.push_str("A {{LANGUAGE}} {{DOMAIN}} project.\n\n## Modules\n\n");
        if modules.is_empty() {
            out.push_str("_None._\n");
        }
        for module in modules {
            if module.depends_on.is_empty() {
                let _ = writeln!(out, "- `{}`", module.name);
            } else {
                let _ = writeln!(
                    out,
                    "- `{}` (depends on {})",
                    module.name,
                    module.depends_on.join(", ")
                );
            }
        }
        Ok(Self::context(profile).render(&out))
    }

    fn render_config_files(&self, profile: &RequirementsProfile) -> KilnResult<Vec<GeneratedFile>> {
        let ctx = Self::context(profile);
        let language = profile.language;

        let mut files = vec![
            GeneratedFile::new(".gitignore", snippets::gitignore(language)),
            GeneratedFile::new(".editorconfig", snippets::EDITORCONFIG),
        ];
        if profile.container {
            files.push(GeneratedFile::new(
                "Dockerfile",
                ctx.render(snippets::dockerfile(language)),
            ));
            files.push(GeneratedFile::new(
                RelativePath::new(format!("{}/compose.yaml", layout::CONTAINER_DIR)),
                ctx.render(snippets::COMPOSE),
            ));
        }
        if let Some(ci) = profile.ci {
            files.push(GeneratedFile::new(
                ci.workflow_file(),
                snippets::ci_workflow(ci, language),
            ));
        }
        Ok(files)
    }

    fn render_test_files(
        &self,
        modules: &[BlueprintModule],
        profile: &RequirementsProfile,
    ) -> KilnResult<Vec<GeneratedFile>> {
        let language = profile.language;
        modules
            .iter()
            .map(|module| {
                let file_name = language.test_file_name(&to_snake_case(&module.name));
                GeneratedFile::try_new(
                    format!("tests/{file_name}"),
                    Self::module_context(module, profile).render(snippets::test_stub(language)),
                )
                .map_err(KilnError::from)
            })
            .collect()
    }

    fn render_context_stub(
        &self,
        blueprint: &Blueprint,
        profile: &RequirementsProfile,
    ) -> KilnResult<String> {
        let mut out = String::from(
            "# {{PROJECT_NAME}}: assistant context\n\n\
             - Language: {{LANGUAGE}}\n\
             - Domain: {{DOMAIN}}\n",
        );
        let _ = writeln!(out, "- Blueprint: {}", blueprint.name);
        if let Some(description) = &blueprint.description {
            let _ = writeln!(out, "\n{description}");
        }
        out.push_str("\n## Module graph\n\n");
        for module in &blueprint.modules {
            let deps = if module.depends_on.is_empty() {
                "-".to_string()
            } else {
                module.depends_on.join(", ")
            };
            let _ = writeln!(out, "- {} <- {}", module.name, deps);
        }
        Ok(Self::context(profile).render(&out))
    }
}

fn init_alias(name: &str) -> String {
    format!("init{}", to_pascal_case(name))
}
