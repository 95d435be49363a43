//! Kiln Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Kiln, a
//! project generator that turns a blueprint of modules plus a requirements
//! profile into a project tree, transactionally.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             kiln-cli (CLI)              │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         GenerationOrchestrator          │
//! │  (StepTracker, ConflictResolver, Writer)│
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Application Ports (Traits)        │
//! │      (Filesystem, ContentProducer)      │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     kiln-adapters (Infrastructure)      │
//! │ (LocalFilesystem, TemplateContentProducer)
//! └─────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │ (Blueprint, ordering, conflict, layout) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kiln_core::prelude::*;
//!
//! let blueprint = Blueprint::new("layered")
//!     .with_module(BlueprintModule::new("api").depends_on(["core"]))
//!     .with_module(BlueprintModule::new("core"));
//! let profile = RequirementsProfile::new("shop").language(Language::Rust);
//!
//! let mut orchestrator = GenerationOrchestrator::new(filesystem, producer);
//! orchestrator.on(EventKind::Conflict, |event| eprintln!("{event:?}"));
//! let manifest = orchestrator.generate(&blueprint, &profile, "./shop")?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        DryRunOutput, EventKind, GenerationEvent, GenerationOrchestrator, GenerationPlan,
        ListenerId,
        ports::{ContentProducer, Filesystem, RemoveOutcome},
    };
    pub use crate::domain::{
        Blueprint, BlueprintModule, CiProvider, ConflictStrategy, GeneratedFile,
        GeneratedManifest, GenerationProgress, GenerationStatus, Language, ProjectDomain,
        RelativePath, RenderContext, RequirementsProfile,
    };
    pub use crate::error::{KilnError, KilnResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
