// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Kiln.
//!
//! This module contains pure generation logic with no I/O. Filesystem access
//! and content production are handled via ports (traits) defined in the
//! application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No I/O**: No filesystem, network, or external calls
//! - **No tracing**: Observability belongs to the application layer
//! - **Immutable inputs**: `Blueprint` and `RequirementsProfile` are never
//!   mutated by the generator
//! - **Rich domain model**: ordering, conflict policy and layout live here,
//!   not in services
//
// Public API - what the world sees
pub mod conflict;
pub mod entities;
pub mod error;
pub mod layout;
pub mod ordering;
pub mod value_objects;

// Private implementation details - not visible outside domain
mod validation;

// Re-exports for convenience
pub use conflict::{ConflictResolution, MERGE_MARKER, WriteAction};
pub use entities::{
    common::RelativePath,
    render_context::{to_kebab_case, to_pascal_case, to_snake_case},
    ArtifactKind, Blueprint, BlueprintModule, CreatedArtifact, GeneratedFile, GeneratedManifest,
    GenerationProgress, GenerationStatus, RenderContext, RequirementsProfile,
};
pub use error::{DomainError, ErrorCategory};
pub use layout::ProjectLayout;
pub use ordering::DependencyOrderer;
pub use validation::DomainValidator;
pub use value_objects::{CiProvider, ConflictStrategy, Language, ProjectDomain};

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    // ========================================================================
    // Value Object Tests
    // ========================================================================

    #[test]
    fn language_parses_correctly() {
        assert_eq!(Language::from_str("rust").unwrap(), Language::Rust);
        assert_eq!(Language::from_str("RS").unwrap(), Language::Rust);
        assert_eq!(Language::from_str("golang").unwrap(), Language::Go);
        assert!(Language::from_str("java").is_err());
    }

    #[test]
    fn conflict_strategy_parses_correctly() {
        assert_eq!(
            ConflictStrategy::from_str("merge").unwrap(),
            ConflictStrategy::Merge
        );
        assert_eq!(
            ConflictStrategy::from_str("FORCE").unwrap(),
            ConflictStrategy::Overwrite
        );
        assert!(matches!(
            ConflictStrategy::from_str("ask"),
            Err(DomainError::UnknownValue { .. })
        ));
    }

    #[test]
    fn project_domain_accepts_kebab_case() {
        assert_eq!(
            ProjectDomain::from_str("plugin-host").unwrap(),
            ProjectDomain::PluginHost
        );
    }

    #[test]
    fn ci_provider_serde_names() {
        let json = serde_json::to_string(&CiProvider::CircleCi).unwrap();
        assert_eq!(json, "\"circleci\"");
        let back: CiProvider = serde_json::from_str("\"github\"").unwrap();
        assert_eq!(back, CiProvider::GitHub);
    }

    #[test]
    fn language_layout_facts() {
        for lang in Language::ALL {
            assert!(!lang.entry_point().is_empty());
            assert!(!lang.package_manifest().is_empty());
            assert!(lang.test_file_name("core").contains("core"));
        }
    }

    // ========================================================================
    // Validation Tests
    // ========================================================================

    #[test]
    fn request_validation_checks_profile_first() {
        let blueprint = Blueprint::new("bp")
            .with_module(BlueprintModule::new("a"))
            .with_module(BlueprintModule::new("a"));
        let profile = RequirementsProfile::new("");

        assert!(matches!(
            DomainValidator::validate_request(&blueprint, &profile),
            Err(DomainError::InvalidProjectName { .. })
        ));
    }

    #[test]
    fn cycle_errors_are_dependency_category() {
        let err = DomainError::CircularDependency {
            module: "a".into(),
            cycle: vec!["a".into(), "a".into()],
        };
        assert_eq!(err.category(), ErrorCategory::Dependency);
        assert!(!err.suggestions().is_empty());
    }
}
