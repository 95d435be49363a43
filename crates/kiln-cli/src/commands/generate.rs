//! `kiln generate`: run the orchestrator against a request file.
//!
//! Translates arguments into a request, strategy and output root, wires the
//! progress bar to orchestrator events, and renders the result. No
//! generation logic lives here.

use std::path::Path;
use std::sync::mpsc::Receiver;

use indicatif::ProgressBar;
use serde::Serialize;
use tracing::{debug, info, instrument};

use kiln_adapters::{BlueprintLoader, GenerationRequest, LocalFilesystem, TemplateContentProducer};
use kiln_core::{
    application::{DryRunOutput, GenerationEvent, GenerationOrchestrator},
    domain::{ConflictStrategy, GeneratedManifest, WriteAction},
};

use crate::{
    cli::{GenerateArgs, OutputFormat},
    commands::{confirm, is_non_empty_dir},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute `kiln generate`.
///
/// 1. Load the request file
/// 2. Resolve the conflict strategy and output root
/// 3. Confirm before writing into a non-empty directory unless `--yes`
/// 4. Run (or dry-run) with a progress bar fed by progress events
/// 5. Report conflicts and the manifest
#[instrument(skip_all, fields(request = %args.request.display()))]
pub fn execute(args: GenerateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let request = BlueprintLoader::new().load(&args.request)?;
    let strategy = args
        .on_conflict
        .map(ConflictStrategy::from)
        .unwrap_or(config.generation.conflict_strategy);

    debug!(
        blueprint = %request.blueprint.name,
        project = %request.profile.project_name,
        %strategy,
        "Request resolved"
    );

    let mut orchestrator = GenerationOrchestrator::new(
        Box::new(LocalFilesystem::new()),
        Box::new(TemplateContentProducer::new()),
    )
    .with_conflict_strategy(strategy);

    if args.dry_run {
        let (planned, _) = run_with_progress(&mut orchestrator, &output, |o| {
            o.dry_run(&request.blueprint, &request.profile)
        })?;
        return report_dry_run(&planned, &output);
    }

    let root = args
        .output
        .clone()
        .unwrap_or_else(|| config.output_root(&request.profile.project_name));
    check_root(&root, &args, &output)?;

    info!(root = %root.display(), "Generation started");
    let (manifest, conflicts) = run_with_progress(&mut orchestrator, &output, |o| {
        o.generate(&request.blueprint, &request.profile, &root)
    })?;
    info!(files = manifest.total_files, "Generation completed");

    report_run(&request, &manifest, &conflicts, &output)
}

/// Refuse a file as root; ask before writing next to existing content.
fn check_root(root: &Path, args: &GenerateArgs, output: &OutputManager) -> CliResult<()> {
    if root.exists() && !root.is_dir() {
        return Err(CliError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    if args.yes || !is_non_empty_dir(root)? {
        return Ok(());
    }

    output.warning(&format!("'{}' is not empty", root.display()))?;
    if confirm("Generate into it anyway?")? {
        Ok(())
    } else {
        Err(CliError::Cancelled)
    }
}

/// A conflict as reported to the user.
#[derive(Debug, Clone, Serialize)]
struct ConflictReport {
    path: String,
    strategy: ConflictStrategy,
    written: bool,
}

/// Run `f` with a progress bar attached, collecting conflicts.
fn run_with_progress<T>(
    orchestrator: &mut GenerationOrchestrator,
    output: &OutputManager,
    f: impl FnOnce(&mut GenerationOrchestrator) -> kiln_core::error::KilnResult<T>,
) -> CliResult<(T, Vec<ConflictReport>)> {
    let bar = output.progress_bar(0);
    let listener = orchestrator.on_any(progress_listener(bar.clone()));
    let (channel, events) = orchestrator.events().channel();

    let result = f(orchestrator);

    orchestrator.off(listener);
    orchestrator.off(channel);
    bar.finish_and_clear();

    let value = result?;
    Ok((value, collect_conflicts(&events)))
}

fn progress_listener(bar: ProgressBar) -> impl Fn(&GenerationEvent) + Send + Sync + 'static {
    move |event| match event {
        GenerationEvent::StepStart { label, .. } => bar.set_message(label.clone()),
        GenerationEvent::Progress(progress) => {
            bar.set_length(progress.total_steps as u64);
            bar.set_position(progress.completed_steps as u64);
        }
        _ => {}
    }
}

fn collect_conflicts(events: &Receiver<GenerationEvent>) -> Vec<ConflictReport> {
    events
        .try_iter()
        .filter_map(|event| match event {
            GenerationEvent::Conflict {
                path,
                strategy,
                action,
            } => Some(ConflictReport {
                path: path.to_slash_string(),
                strategy,
                written: action == WriteAction::Write,
            }),
            _ => None,
        })
        .collect()
}

#[derive(Serialize)]
struct RunReport<'a> {
    manifest: &'a GeneratedManifest,
    conflicts: &'a [ConflictReport],
}

fn report_run(
    request: &GenerationRequest,
    manifest: &GeneratedManifest,
    conflicts: &[ConflictReport],
    output: &OutputManager,
) -> CliResult<()> {
    if output.format() == OutputFormat::Json {
        output.json(&RunReport {
            manifest,
            conflicts,
        })?;
        return Ok(());
    }

    for conflict in conflicts {
        let outcome = match (conflict.strategy, conflict.written) {
            (_, false) => "kept existing file",
            (ConflictStrategy::Merge, true) => "wrote new content with merge marker",
            _ => "overwrote existing file",
        };
        output.warning(&format!("{} already existed: {outcome}", conflict.path))?;
    }

    output.manifest_summary(manifest)?;
    output.print("")?;
    output.print("Next steps:")?;
    output.print(&format!("  cd {}", manifest.output_path.display()))?;
    output.print(&format!(
        "  # {} modules from blueprint '{}'",
        request.blueprint.modules.len(),
        request.blueprint.name
    ))?;
    Ok(())
}

#[derive(Serialize)]
struct PlannedFile<'a> {
    path: &'a str,
    bytes: usize,
}

#[derive(Serialize)]
struct DryRunReport<'a> {
    manifest: &'a GeneratedManifest,
    files: Vec<PlannedFile<'a>>,
}

fn report_dry_run(planned: &DryRunOutput, output: &OutputManager) -> CliResult<()> {
    let files: Vec<PlannedFile<'_>> = planned
        .manifest
        .files
        .iter()
        .map(|path| PlannedFile {
            path,
            bytes: planned.file_map.get(path).map_or(0, String::len),
        })
        .collect();

    if output.format() == OutputFormat::Json {
        output.json(&DryRunReport {
            manifest: &planned.manifest,
            files,
        })?;
        return Ok(());
    }

    output.info("Dry run: nothing was written")?;
    output.header("Files")?;
    for file in &files {
        output.print(&format!("  {:>8}  {}", file.bytes, file.path))?;
    }
    output.print("")?;
    output.manifest_summary(&planned.manifest)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::domain::RelativePath;
    use std::sync::mpsc;

    #[test]
    fn conflicts_are_extracted_from_the_event_stream() {
        let (tx, rx) = mpsc::channel();
        tx.send(GenerationEvent::StepComplete {
            label: "Generating README".into(),
        })
        .unwrap();
        tx.send(GenerationEvent::Conflict {
            path: RelativePath::new("README.md"),
            strategy: ConflictStrategy::Skip,
            action: WriteAction::Skip,
        })
        .unwrap();
        tx.send(GenerationEvent::Conflict {
            path: RelativePath::new("src/main.rs"),
            strategy: ConflictStrategy::Merge,
            action: WriteAction::Write,
        })
        .unwrap();
        drop(tx);

        let conflicts = collect_conflicts(&rx);

        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].path, "README.md");
        assert!(!conflicts[0].written);
        assert_eq!(conflicts[1].strategy, ConflictStrategy::Merge);
        assert!(conflicts[1].written);
    }

    #[test]
    fn listener_tracks_progress() {
        use kiln_core::domain::GenerationProgress;

        let bar = ProgressBar::hidden();
        let listener = progress_listener(bar.clone());
        let mut progress = GenerationProgress::planned(4);
        progress.advance();
        listener(&GenerationEvent::Progress(progress));

        assert_eq!(bar.length(), Some(4));
        assert_eq!(bar.position(), 1);
    }
}
