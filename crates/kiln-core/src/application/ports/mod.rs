//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `kiln-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: Directory and file operations, including removal for rollback
//!   - `ContentProducer`: Text for every generated artifact
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (The CLI drives `GenerationOrchestrator` directly)

pub mod output;

pub use output::{ContentProducer, Filesystem, RemoveOutcome};

#[cfg(test)]
pub use output::MockContentProducer;
