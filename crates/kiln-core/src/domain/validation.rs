use crate::domain::{
    entities::{common::RelativePath, module::ModuleDescriptor},
    error::DomainError,
};

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across services.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_module(module: &ModuleDescriptor) -> Result<(), DomainError> {
        module.validate()
    }

    /// Check a rendered action target. Placeholders may hide `..` or an
    /// absolute path until rendering, so file actions call this afterwards.
    pub fn validate_target_path(rendered: &str) -> Result<RelativePath, DomainError> {
        let trimmed = rendered.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyTargetPath {
                template: rendered.to_string(),
            });
        }
        RelativePath::try_new(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_targets_must_stay_inside_root() {
        assert_eq!(
            DomainValidator::validate_target_path(" src/db.ts ").unwrap().as_str(),
            "src/db.ts"
        );
        assert!(DomainValidator::validate_target_path("../escape").is_err());
        assert!(DomainValidator::validate_target_path("/etc/hosts").is_err());
        assert!(matches!(
            DomainValidator::validate_target_path("  "),
            Err(DomainError::EmptyTargetPath { .. })
        ));
    }
}
