pub mod blueprint;
pub mod common;
pub mod manifest;
pub mod profile;
pub mod progress;
pub mod render_context;

pub use crate::domain::DomainError;
pub use blueprint::{Blueprint, BlueprintModule};
pub use manifest::{ArtifactKind, CreatedArtifact, GeneratedFile, GeneratedManifest};
pub use profile::RequirementsProfile;
pub use progress::{GenerationProgress, GenerationStatus};
pub use render_context::RenderContext;
