use crate::domain::{
    entities::{Blueprint, RequirementsProfile},
    error::DomainError,
};

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across entities.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_blueprint(blueprint: &Blueprint) -> Result<(), DomainError> {
        blueprint.validate()
    }

    pub fn validate_profile(profile: &RequirementsProfile) -> Result<(), DomainError> {
        profile.validate()
    }

    /// Validate both inputs of a generation request.
    pub fn validate_request(
        blueprint: &Blueprint,
        profile: &RequirementsProfile,
    ) -> Result<(), DomainError> {
        Self::validate_profile(profile)?;
        Self::validate_blueprint(blueprint)
    }
}
