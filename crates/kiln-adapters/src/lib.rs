//! Infrastructure adapters for Kiln.
//!
//! This crate implements the ports defined in `kiln-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod blueprint_loader;
pub mod filesystem;
pub mod renderer;

// Re-export commonly used adapters
pub use blueprint_loader::{BlueprintLoader, GenerationRequest, RequestFormat};
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use renderer::TemplateContentProducer;
