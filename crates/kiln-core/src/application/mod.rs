//! Application layer for Kiln.
//!
//! This layer contains:
//! - **Services**: the generation orchestrator and its collaborators
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Events**: typed notifications emitted during a run
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business rules itself. Ordering, conflict policy and layout live in
//! `crate::domain`.

pub mod error;
pub mod events;
pub mod ports;
pub mod services;

pub use services::{
    ConflictResolver, DryRunOutput, GenerationOrchestrator, GenerationPlan, RollbackReport,
    StepTracker, TransactionalWriter,
};

pub use events::{EventBus, EventKind, GenerationEvent, ListenerId};

// Re-export port traits (for adapter implementation)
pub use ports::{ContentProducer, Filesystem, RemoveOutcome};

pub use error::ApplicationError;
