//! `kiln plan`: show module order and step count without writing.

use serde::Serialize;
use tracing::instrument;

use kiln_adapters::{BlueprintLoader, MemoryFilesystem, TemplateContentProducer};
use kiln_core::application::{GenerationOrchestrator, GenerationPlan};

use crate::{
    cli::{OutputFormat, PlanArgs},
    error::CliResult,
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct PlanReport {
    blueprint: String,
    project: String,
    order: Vec<String>,
    config_files: Vec<String>,
    test_files: Vec<String>,
    total_steps: usize,
}

impl PlanReport {
    fn new(blueprint: &str, project: &str, plan: &GenerationPlan) -> Self {
        Self {
            blueprint: blueprint.to_string(),
            project: project.to_string(),
            order: plan.modules.iter().map(|m| m.name.clone()).collect(),
            config_files: plan
                .config_files
                .iter()
                .map(|f| f.path.to_slash_string())
                .collect(),
            test_files: plan
                .test_files
                .iter()
                .map(|f| f.path.to_slash_string())
                .collect(),
            total_steps: plan.total_steps,
        }
    }
}

#[instrument(skip_all, fields(request = %args.request.display()))]
pub fn execute(args: PlanArgs, output: OutputManager) -> CliResult<()> {
    let request = BlueprintLoader::new().load(&args.request)?;

    // Planning never touches the filesystem.
    let orchestrator = GenerationOrchestrator::new(
        Box::new(MemoryFilesystem::new()),
        Box::new(TemplateContentProducer::new()),
    );
    let plan = orchestrator.plan(&request.blueprint, &request.profile)?;
    let report = PlanReport::new(
        &request.blueprint.name,
        &request.profile.project_name,
        &plan,
    );

    if output.format() == OutputFormat::Json {
        output.json(&report)?;
        return Ok(());
    }

    output.header(&format!(
        "Plan for '{}' (blueprint '{}')",
        report.project, report.blueprint
    ))?;
    output.print("Module order:")?;
    for (index, module) in plan.modules.iter().enumerate() {
        let line = if module.depends_on.is_empty() {
            format!("  {}. {}", index + 1, module.name)
        } else {
            format!(
                "  {}. {} (after {})",
                index + 1,
                module.name,
                module.depends_on.join(", ")
            )
        };
        output.print(&line)?;
    }
    output.print(&format!("Config files: {}", report.config_files.join(", ")))?;
    output.print(&format!("Test files:   {}", report.test_files.len()))?;
    output.print(&format!("Total steps:  {}", report.total_steps))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::domain::{Blueprint, BlueprintModule, RequirementsProfile};

    #[test]
    fn report_follows_plan_order() {
        let blueprint = Blueprint::new("layered")
            .with_module(BlueprintModule::new("api").depends_on(["core"]))
            .with_module(BlueprintModule::new("core"));
        let profile = RequirementsProfile::new("shop");
        let orchestrator = GenerationOrchestrator::new(
            Box::new(MemoryFilesystem::new()),
            Box::new(TemplateContentProducer::new()),
        );

        let plan = orchestrator.plan(&blueprint, &profile).unwrap();
        let report = PlanReport::new("layered", "shop", &plan);

        assert_eq!(report.order, ["core", "api"]);
        assert_eq!(report.test_files, ["tests/core_test.rs", "tests/api_test.rs"]);
        assert_eq!(report.total_steps, plan.total_steps);
    }
}
