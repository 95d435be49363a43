//! Generation orchestrator - main application entry point.
//!
//! Drives one generation run:
//! 1. Validate the request and order modules by dependency
//! 2. Scaffold directories
//! 3. Write modules, entry point, package manifest and README
//! 4. Write config files, test files and the context stub
//!
//! Every write goes through the conflict resolver and the transactional
//! writer. Any failure rolls back what this run created.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{error, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        events::{EventBus, EventKind, GenerationEvent, ListenerId},
        ports::{ContentProducer, Filesystem},
        services::{
            conflict_resolver::ConflictResolver, step_tracker::StepTracker,
            writer::TransactionalWriter,
        },
    },
    domain::{
        Blueprint, BlueprintModule, ConflictStrategy, CreatedArtifact, DependencyOrderer,
        DomainValidator, GeneratedFile, GeneratedManifest, GenerationProgress, GenerationStatus,
        ProjectLayout, RelativePath, RequirementsProfile,
    },
    error::{KilnError, KilnResult},
};

/// Everything a run will produce, computed before the first write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPlan {
    /// Modules in dependency order.
    pub modules: Vec<BlueprintModule>,
    pub config_files: Vec<GeneratedFile>,
    pub test_files: Vec<GeneratedFile>,
    pub total_steps: usize,
}

/// Result of [`GenerationOrchestrator::dry_run`].
#[derive(Debug, Clone)]
pub struct DryRunOutput {
    /// Relative path (forward slashes) to content.
    pub file_map: BTreeMap<String, String>,
    pub manifest: GeneratedManifest,
}

/// Runs generations one at a time.
///
/// Listeners registered with [`on`](Self::on) survive across runs; progress
/// and the generated file map are reset at the start of each run.
pub struct GenerationOrchestrator {
    filesystem: Box<dyn Filesystem>,
    producer: Box<dyn ContentProducer>,
    resolver: ConflictResolver,
    events: EventBus,
    progress: GenerationProgress,
    generated: BTreeMap<String, String>,
}

impl GenerationOrchestrator {
    /// Create an orchestrator with the default conflict strategy.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use kiln_core::application::GenerationOrchestrator;
    /// use kiln_core::domain::ConflictStrategy;
    ///
    /// let mut orchestrator = GenerationOrchestrator::new(
    ///     Box::new(filesystem), // impl Filesystem
    ///     Box::new(producer),   // impl ContentProducer
    /// )
    /// .with_conflict_strategy(ConflictStrategy::Overwrite);
    /// let manifest = orchestrator.generate(&blueprint, &profile, "./out")?;
    /// ```
    pub fn new(filesystem: Box<dyn Filesystem>, producer: Box<dyn ContentProducer>) -> Self {
        Self {
            filesystem,
            producer,
            resolver: ConflictResolver::default(),
            events: EventBus::new(),
            progress: GenerationProgress::default(),
            generated: BTreeMap::new(),
        }
    }

    pub fn with_conflict_strategy(mut self, strategy: ConflictStrategy) -> Self {
        self.resolver = ConflictResolver::new(strategy);
        self
    }

    pub fn conflict_strategy(&self) -> ConflictStrategy {
        self.resolver.strategy()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&GenerationEvent) + Send + Sync + 'static,
    {
        self.events.on(kind, listener)
    }

    pub fn on_any<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&GenerationEvent) + Send + Sync + 'static,
    {
        self.events.on_any(listener)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    /// Snapshot of the current (or last) run's progress.
    pub fn progress(&self) -> GenerationProgress {
        self.progress.clone()
    }

    /// Files written by the last successful run, keyed by relative path.
    pub fn generated_files(&self) -> &BTreeMap<String, String> {
        &self.generated
    }

    /// Validate and order the request without writing anything.
    pub fn plan(
        &self,
        blueprint: &Blueprint,
        profile: &RequirementsProfile,
    ) -> KilnResult<GenerationPlan> {
        build_plan(self.producer.as_ref(), blueprint, profile)
    }

    /// Generate the project under `output_path`.
    #[instrument(
        skip_all,
        fields(
            blueprint = %blueprint.name,
            project = %profile.project_name,
            output_path = %output_path.as_ref().display()
        )
    )]
    pub fn generate(
        &mut self,
        blueprint: &Blueprint,
        profile: &RequirementsProfile,
        output_path: impl AsRef<Path>,
    ) -> KilnResult<GeneratedManifest> {
        self.execute(blueprint, profile, output_path.as_ref().to_path_buf(), false)
    }

    /// Run the full pipeline in memory. Nothing touches the filesystem.
    #[instrument(
        skip_all,
        fields(blueprint = %blueprint.name, project = %profile.project_name)
    )]
    pub fn dry_run(
        &mut self,
        blueprint: &Blueprint,
        profile: &RequirementsProfile,
    ) -> KilnResult<DryRunOutput> {
        let root = PathBuf::from(&profile.project_name);
        let manifest = self.execute(blueprint, profile, root, true)?;
        Ok(DryRunOutput {
            file_map: self.generated.clone(),
            manifest,
        })
    }

    fn execute(
        &mut self,
        blueprint: &Blueprint,
        profile: &RequirementsProfile,
        root: PathBuf,
        dry_run: bool,
    ) -> KilnResult<GeneratedManifest> {
        info!(
            modules = blueprint.modules.len(),
            strategy = %self.resolver.strategy(),
            dry_run,
            "Starting generation"
        );
        let started = Instant::now();
        self.generated.clear();
        self.progress = GenerationProgress {
            status: GenerationStatus::Running,
            ..GenerationProgress::default()
        };

        let mut writer = if dry_run {
            TransactionalWriter::dry_run(root.clone())
        } else {
            TransactionalWriter::new(self.filesystem.as_ref(), root.clone())
        };
        let mut tracker = StepTracker::new();
        let run = Run {
            producer: self.producer.as_ref(),
            resolver: self.resolver,
            events: &self.events,
        };

        match run.execute(&mut writer, &mut tracker, blueprint, profile) {
            Ok(()) => {
                tracker.complete();
                let output = writer.finish();
                let manifest = GeneratedManifest::from_ledger(
                    profile.project_name.clone(),
                    root,
                    &output.ledger,
                    elapsed_ms(started),
                    dry_run,
                );
                self.generated = output
                    .files
                    .into_iter()
                    .map(|(path, content)| (path.to_slash_string(), content))
                    .collect();
                self.progress = tracker.snapshot();

                info!(
                    files = manifest.total_files,
                    bytes = manifest.total_bytes,
                    duration_ms = manifest.duration_ms,
                    "Generation completed successfully"
                );
                self.events
                    .emit(&GenerationEvent::Complete(manifest.clone()));
                Ok(manifest)
            }
            Err(err) => {
                tracker.fail();
                let step = tracker.current_step().map(str::to_owned);
                self.progress = tracker.snapshot();

                error!(error = %err, step = step.as_deref().unwrap_or("-"), "Generation failed");
                self.events.emit(&GenerationEvent::Error {
                    error: err.clone(),
                    step,
                });

                warn!("Rolling back");
                if let Err(rollback_err) = writer.rollback() {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

/// Borrowed collaborators for a single run.
struct Run<'a> {
    producer: &'a dyn ContentProducer,
    resolver: ConflictResolver,
    events: &'a EventBus,
}

impl Run<'_> {
    fn execute(
        &self,
        writer: &mut TransactionalWriter<'_>,
        tracker: &mut StepTracker,
        blueprint: &Blueprint,
        profile: &RequirementsProfile,
    ) -> KilnResult<()> {
        let plan = build_plan(self.producer, blueprint, profile)?;
        let layout = ProjectLayout::new(profile);
        let events = self.events;

        tracker.begin(plan.total_steps, events);

        tracker.step(events, "Creating directory structure", || {
            for dir in layout.directories() {
                self.create_directory(writer, &dir)?;
            }
            Ok(())
        })?;

        for module in &plan.modules {
            tracker.step(events, format!("Generating module {}", module.name), || {
                let content = produced(&module.name, self.producer.render_module(module, profile))?;
                self.write(writer, &layout.module_path(&module.name), content)
            })?;
        }

        tracker.step(events, "Generating entry point", || {
            let path = layout.entry_point();
            let content = produced(
                &path.to_string(),
                self.producer.render_entry_point(&plan.modules, profile),
            )?;
            self.write(writer, &path, content)
        })?;

        tracker.step(events, "Generating package manifest", || {
            let path = layout.package_manifest();
            let content = produced(
                &path.to_string(),
                self.producer.render_manifest_file(profile, &plan.modules),
            )?;
            self.write(writer, &path, content)
        })?;

        tracker.step(events, "Generating README", || {
            let path = layout.readme();
            let content = produced(
                &path.to_string(),
                self.producer.render_readme(profile, &plan.modules),
            )?;
            self.write(writer, &path, content)
        })?;

        for file in plan.config_files.iter().chain(&plan.test_files) {
            tracker.step(events, format!("Writing {}", file.path), || {
                self.write(writer, &file.path, file.content.clone())
            })?;
        }

        tracker.step(events, "Generating context stub", || {
            let path = layout.context_stub();
            let content = produced(
                &path.to_string(),
                self.producer.render_context_stub(blueprint, profile),
            )?;
            self.write(writer, &path, content)
        })?;

        Ok(())
    }

    fn create_directory(
        &self,
        writer: &mut TransactionalWriter<'_>,
        path: &RelativePath,
    ) -> KilnResult<()> {
        let before = writer.ledger().len();
        writer.create_directory(path)?;
        self.announce(&writer.ledger()[before..]);
        Ok(())
    }

    fn write(
        &self,
        writer: &mut TransactionalWriter<'_>,
        path: &RelativePath,
        content: String,
    ) -> KilnResult<()> {
        let resolution = self.resolver.resolve(writer, path, content, self.events);
        if !resolution.should_write() {
            return Ok(());
        }

        let before = writer.ledger().len();
        writer.write_file(path, &resolution.final_content)?;
        self.announce(&writer.ledger()[before..]);
        Ok(())
    }

    fn announce(&self, artifacts: &[CreatedArtifact]) {
        for artifact in artifacts {
            self.events
                .emit(&GenerationEvent::FileCreated(artifact.clone()));
        }
    }
}

fn build_plan(
    producer: &dyn ContentProducer,
    blueprint: &Blueprint,
    profile: &RequirementsProfile,
) -> KilnResult<GenerationPlan> {
    DomainValidator::validate_request(blueprint, profile)?;

    let modules: Vec<BlueprintModule> = DependencyOrderer::order(&blueprint.modules)?
        .into_iter()
        .cloned()
        .collect();
    let config_files = produced("config files", producer.render_config_files(profile))?;
    let test_files = produced("test files", producer.render_test_files(&modules, profile))?;
    ProjectLayout::new(profile).ensure_distinct(&modules, &config_files, &test_files)?;
    let total_steps =
        ProjectLayout::total_steps(modules.len(), config_files.len(), test_files.len());

    Ok(GenerationPlan {
        modules,
        config_files,
        test_files,
        total_steps,
    })
}

/// Tag a producer failure with the artifact it was producing.
fn produced<T>(artifact: &str, result: KilnResult<T>) -> KilnResult<T> {
    result.map_err(|err| match err {
        KilnError::Application(ApplicationError::ContentGeneration { .. }) => err,
        other => ApplicationError::ContentGeneration {
            artifact: artifact.to_owned(),
            reason: other.to_string(),
        }
        .into(),
    })
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockContentProducer;
    use crate::application::services::test_support::FakeFs;
    use crate::domain::{DomainError, Language, MERGE_MARKER};
    use std::sync::{Arc, Mutex};

    fn stub_producer() -> MockContentProducer {
        let mut producer = MockContentProducer::new();
        producer
            .expect_render_module()
            .returning(|m, _| Ok(format!("// module {}\n", m.name)));
        producer
            .expect_render_entry_point()
            .returning(|mods, _| Ok(format!("// {} modules\n", mods.len())));
        producer
            .expect_render_manifest_file()
            .returning(|p, _| Ok(format!("[package]\nname = \"{}\"\n", p.project_name)));
        producer
            .expect_render_readme()
            .returning(|p, _| Ok(format!("# {}\n", p.project_name)));
        producer
            .expect_render_config_files()
            .returning(|_| Ok(vec![GeneratedFile::new(".gitignore", "target/\n")]));
        producer.expect_render_test_files().returning(|mods, _| {
            Ok(mods
                .iter()
                .map(|m| {
                    GeneratedFile::new(
                        RelativePath::new(format!("tests/{}_test.rs", m.name)),
                        "#[test]\nfn ok() {}\n",
                    )
                })
                .collect())
        });
        producer
            .expect_render_context_stub()
            .returning(|b, _| Ok(format!("# Context for {}\n", b.name)));
        producer
    }

    fn blueprint() -> Blueprint {
        Blueprint::new("layered")
            .with_module(BlueprintModule::new("b").depends_on(["a"]))
            .with_module(BlueprintModule::new("a"))
    }

    fn profile() -> RequirementsProfile {
        RequirementsProfile::new("demo").language(Language::Rust)
    }

    fn orchestrator(fs: &FakeFs) -> GenerationOrchestrator {
        GenerationOrchestrator::new(Box::new(fs.clone()), Box::new(stub_producer()))
    }

    fn record(orch: &GenerationOrchestrator) -> Arc<Mutex<Vec<GenerationEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        orch.on_any(move |e| sink.lock().unwrap().push(e.clone()));
        log
    }

    #[test]
    fn generate_writes_modules_in_dependency_order() {
        let fs = FakeFs::default();
        let mut orch = orchestrator(&fs);
        let log = record(&orch);

        let manifest = orch.generate(&blueprint(), &profile(), "/out").unwrap();

        let written: Vec<String> = log
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                GenerationEvent::FileCreated(a) if a.is_file() => {
                    Some(a.relative_path.to_slash_string())
                }
                _ => None,
            })
            .collect();
        assert_eq!(&written[..2], ["src/a.rs", "src/b.rs"]);
        assert_eq!(
            manifest.files,
            vec![
                "src/a.rs",
                "src/b.rs",
                "src/main.rs",
                "Cargo.toml",
                "README.md",
                ".gitignore",
                "tests/a_test.rs",
                "tests/b_test.rs",
                "CONTEXT.md",
            ]
        );
        assert_eq!(fs.read("/out/README.md").as_deref(), Some("# demo\n"));
        assert!(!manifest.dry_run);
    }

    #[test]
    fn dry_run_matches_real_run() {
        let fs = FakeFs::default();
        let mut orch = orchestrator(&fs);
        let planned = orch.dry_run(&blueprint(), &profile()).unwrap();
        assert!(fs.files.lock().unwrap().is_empty());
        assert!(fs.dirs.lock().unwrap().is_empty());

        let manifest = orch.generate(&blueprint(), &profile(), "/out").unwrap();

        assert!(planned.manifest.dry_run);
        assert_eq!(planned.manifest.files, manifest.files);
        assert_eq!(planned.manifest.directories, manifest.directories);
        assert_eq!(planned.manifest.total_bytes, manifest.total_bytes);
        assert_eq!(&planned.file_map, orch.generated_files());
        for (path, content) in &planned.file_map {
            assert_eq!(fs.read(&format!("/out/{path}")).as_ref(), Some(content));
        }
    }

    #[test]
    fn cycle_fails_before_any_write() {
        let fs = FakeFs::default();
        let mut orch = orchestrator(&fs);
        let log = record(&orch);
        let cyclic = Blueprint::new("loop")
            .with_module(BlueprintModule::new("A").depends_on(["B"]))
            .with_module(BlueprintModule::new("B").depends_on(["A"]));

        let err = orch.generate(&cyclic, &profile(), "/out").unwrap_err();

        assert!(err.is_circular_dependency());
        let message = err.to_string();
        assert!(message.contains('A') && message.contains('B'));
        assert!(fs.dirs.lock().unwrap().is_empty());
        assert_eq!(orch.progress().status, GenerationStatus::Failed);
        assert!(
            log.lock()
                .unwrap()
                .iter()
                .any(|e| matches!(e, GenerationEvent::Error { step: None, .. }))
        );
    }

    #[test]
    fn injected_write_failure_rolls_back_everything() {
        let fs = FakeFs::failing_after(3);
        let mut orch = orchestrator(&fs);
        let log = record(&orch);

        let err = orch.generate(&blueprint(), &profile(), "/out").unwrap_err();

        assert!(matches!(
            err,
            KilnError::Application(ApplicationError::WriteFailed { .. })
        ));
        assert!(fs.files.lock().unwrap().is_empty());
        assert!(!fs.exists(Path::new("/out/src")));
        assert!(!fs.exists(Path::new("/out")));
        assert!(orch.generated_files().is_empty());

        let failed_step = log.lock().unwrap().iter().find_map(|e| match e {
            GenerationEvent::Error { step, .. } => step.clone(),
            _ => None,
        });
        assert_eq!(failed_step.as_deref(), Some("Generating package manifest"));
    }

    #[test]
    fn failed_rollback_still_returns_the_original_error() {
        let fs = FakeFs::failing_after(3).failing_removals();
        let mut orch = orchestrator(&fs);

        let err = orch.generate(&blueprint(), &profile(), "/out").unwrap_err();

        match err {
            KilnError::Application(ApplicationError::WriteFailed { path, reason }) => {
                assert_eq!(path, PathBuf::from("/out/Cargo.toml"));
                assert_eq!(reason, "injected failure");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(orch.progress().status, GenerationStatus::Failed);
        // Nothing could be removed, so the partial output stays behind.
        assert!(fs.exists(Path::new("/out/src/a.rs")));
    }

    #[test]
    fn module_colliding_with_entry_point_fails_before_any_write() {
        let fs = FakeFs::default();
        let mut orch = orchestrator(&fs);
        let log = record(&orch);
        let clash = Blueprint::new("clash").with_module(BlueprintModule::new("main"));

        let err = orch.generate(&clash, &profile(), "/out").unwrap_err();

        assert!(matches!(
            err,
            KilnError::Domain(DomainError::ArtifactPathCollision { ref path, .. })
                if path == "src/main.rs"
        ));
        assert!(fs.dirs.lock().unwrap().is_empty());
        assert!(fs.files.lock().unwrap().is_empty());
        assert!(
            !log.lock()
                .unwrap()
                .iter()
                .any(|e| matches!(e, GenerationEvent::Conflict { .. }))
        );
    }

    #[test]
    fn snake_case_twins_are_rejected() {
        let fs = FakeFs::default();
        let orch = orchestrator(&fs);
        let twins = Blueprint::new("twins")
            .with_module(BlueprintModule::new("A"))
            .with_module(BlueprintModule::new("a"));

        let err = orch.plan(&twins, &profile()).unwrap_err();

        assert!(matches!(
            err,
            KilnError::Domain(DomainError::ArtifactPathCollision { ref first, ref second, .. })
                if first == "module 'A'" && second == "module 'a'"
        ));
    }

    #[test]
    fn producer_error_becomes_content_generation_error() {
        let fs = FakeFs::default();
        let mut producer = MockContentProducer::new();
        producer
            .expect_render_config_files()
            .returning(|_| Ok(Vec::new()));
        producer
            .expect_render_test_files()
            .returning(|_, _| Ok(Vec::new()));
        producer.expect_render_module().returning(|_, _| {
            Err(KilnError::Internal {
                message: "template exploded".into(),
            })
        });
        let mut orch = GenerationOrchestrator::new(Box::new(fs.clone()), Box::new(producer));

        let err = orch.generate(&blueprint(), &profile(), "/out").unwrap_err();

        match err {
            KilnError::Application(ApplicationError::ContentGeneration { artifact, reason }) => {
                assert_eq!(artifact, "a");
                assert!(reason.contains("template exploded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!fs.exists(Path::new("/out")));
    }

    #[test]
    fn skip_leaves_existing_file_untouched() {
        let fs = FakeFs::default();
        fs.files
            .lock()
            .unwrap()
            .insert(PathBuf::from("/out/README.md"), "mine".into());
        let mut orch = orchestrator(&fs).with_conflict_strategy(ConflictStrategy::Skip);
        let log = record(&orch);

        let manifest = orch.generate(&blueprint(), &profile(), "/out").unwrap();

        assert_eq!(fs.read("/out/README.md").as_deref(), Some("mine"));
        assert!(!manifest.files.contains(&"README.md".to_string()));
        let conflicts = log
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind() == EventKind::Conflict)
            .count();
        assert_eq!(conflicts, 1);
    }

    #[test]
    fn merge_appends_marker_to_new_content() {
        let fs = FakeFs::default();
        fs.files
            .lock()
            .unwrap()
            .insert(PathBuf::from("/out/README.md"), "mine".into());
        let mut orch = orchestrator(&fs).with_conflict_strategy(ConflictStrategy::Merge);

        orch.generate(&blueprint(), &profile(), "/out").unwrap();

        let readme = fs.read("/out/README.md").unwrap();
        assert!(readme.starts_with("# demo\n"));
        assert!(readme.contains(MERGE_MARKER));
    }

    #[test]
    fn overwrite_is_idempotent() {
        let fs = FakeFs::default();
        let mut orch = orchestrator(&fs).with_conflict_strategy(ConflictStrategy::Overwrite);

        orch.generate(&blueprint(), &profile(), "/out").unwrap();
        let first = fs.files.lock().unwrap().clone();
        orch.generate(&blueprint(), &profile(), "/out").unwrap();

        assert_eq!(*fs.files.lock().unwrap(), first);
    }

    #[test]
    fn progress_is_monotonic_and_completes() {
        let fs = FakeFs::default();
        let mut orch = orchestrator(&fs);
        let log = record(&orch);

        orch.generate(&blueprint(), &profile(), "/out").unwrap();

        let snapshots: Vec<GenerationProgress> = log
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                GenerationEvent::Progress(p) => Some(p.clone()),
                _ => None,
            })
            .collect();
        assert!(
            snapshots
                .windows(2)
                .all(|w| w[0].completed_steps <= w[1].completed_steps)
        );
        assert_eq!(snapshots.iter().filter(|p| p.percentage == 100).count(), 1);

        let final_progress = orch.progress();
        assert_eq!(final_progress.status, GenerationStatus::Completed);
        assert_eq!(final_progress.completed_steps, final_progress.total_steps);
        assert_eq!(final_progress.total_steps, 10);
        assert!(matches!(
            log.lock().unwrap().last(),
            Some(GenerationEvent::Complete(_))
        ));
    }

    #[test]
    fn panicking_listener_does_not_abort_run() {
        let fs = FakeFs::default();
        let mut orch = orchestrator(&fs);
        orch.on(EventKind::FileCreated, |_| panic!("observer bug"));

        let manifest = orch.generate(&blueprint(), &profile(), "/out").unwrap();
        assert_eq!(manifest.total_files, 9);
    }

    #[test]
    fn plan_reports_order_and_steps() {
        let fs = FakeFs::default();
        let orch = orchestrator(&fs);

        let plan = orch.plan(&blueprint(), &profile()).unwrap();

        let names: Vec<&str> = plan.modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(plan.total_steps, 10);
    }
}
