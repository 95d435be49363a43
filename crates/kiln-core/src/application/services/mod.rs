//! Application services - orchestrate a generation run.
//!
//! The orchestrator is the entry point. The writer, conflict resolver and
//! step tracker are public so adapters and tests can drive them directly.

pub mod conflict_resolver;
pub mod orchestrator;
pub mod step_tracker;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_support;

pub use conflict_resolver::ConflictResolver;
pub use orchestrator::{DryRunOutput, GenerationOrchestrator, GenerationPlan};
pub use step_tracker::StepTracker;
pub use writer::{RollbackReport, TransactionalWriter, WriterOutput};
