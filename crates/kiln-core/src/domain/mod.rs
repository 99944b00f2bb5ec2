// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Kiln.
//!
//! Pure business logic: module descriptors, blueprint actions, the run
//! context, the template processor and the file merge strategies. All I/O
//! goes through ports defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, process, or network calls
//! - **Few crates**: std, thiserror, serde/serde_json, uuid
//! - **Immutable descriptors**: Modules and actions never change after registration
//!
// Public API
pub mod capabilities;
pub mod entities;
pub mod error;
pub mod merge;
pub mod template;
pub mod value_objects;

mod validation;

pub use entities::{
    action::{Action, ActionKind, ContentModifier},
    common::RelativePath,
    context::{ProjectContext, ProjectMetadata},
    module::{EnvVar, ModuleBuilder, ModuleDescriptor, ModuleMetadata, ParameterSpec},
    outcome::{Conflict, ExecutionResult, ResolutionResult},
};

pub use error::{DomainError, ErrorCategory, MergeError, RenderError};

pub use template::{OutputHint, PathLookup, Template, Token, evaluate_condition, render};

pub use value_objects::{ListStyle, MergeKind, ModuleId, ParamValue};

pub use validation::DomainValidator;

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::str::FromStr;

    use super::*;

    fn id(s: &str) -> ModuleId {
        ModuleId::parse(s).unwrap()
    }

    // ========================================================================
    // Value Object Tests
    // ========================================================================

    #[test]
    fn module_id_parses_correctly() {
        assert_eq!(ModuleId::from_str("prisma").unwrap().as_str(), "prisma");
        assert!(ModuleId::parse("").is_err());
        assert!(ModuleId::parse("two words").is_err());
        assert!(ModuleId::parse("{{x}}").is_err());
    }

    #[test]
    fn module_id_deserializes_with_validation() {
        let ok: ModuleId = serde_json::from_str(r#""better-auth""#).unwrap();
        assert_eq!(ok, id("better-auth"));
        assert!(serde_json::from_str::<ModuleId>(r#""bad id""#).is_err());
    }

    #[test]
    fn param_value_truthiness() {
        assert!(ParamValue::Bool(true).is_truthy());
        assert!(!ParamValue::Bool(false).is_truthy());
        assert!(!ParamValue::Number(0.0).is_truthy());
        assert!(ParamValue::from("yes").is_truthy());
        assert!(!ParamValue::from("false").is_truthy());
        assert!(!ParamValue::from("").is_truthy());
        assert!(!ParamValue::List(vec![]).is_truthy());
    }

    #[test]
    fn param_value_from_cli() {
        assert_eq!(ParamValue::from_cli("true"), ParamValue::Bool(true));
        assert_eq!(ParamValue::from_cli("10"), ParamValue::Number(10.0));
        assert_eq!(
            ParamValue::from_cli("github, google"),
            ParamValue::List(vec!["github".into(), "google".into()])
        );
        assert_eq!(ParamValue::from_cli("postgresql"), ParamValue::from("postgresql"));
        assert_eq!(ParamValue::Number(10.0).render_scalar(), "10");
        assert_eq!(ParamValue::Number(2.5).render_scalar(), "2.5");
    }

    #[test]
    fn param_value_untagged_serde() {
        let v: Vec<ParamValue> = serde_json::from_str(r#"[true, 3, "x", ["a"]]"#).unwrap();
        assert_eq!(
            v,
            vec![
                ParamValue::Bool(true),
                ParamValue::Number(3.0),
                ParamValue::from("x"),
                ParamValue::List(vec!["a".into()]),
            ]
        );
    }

    #[test]
    fn merge_kind_parses_aliases() {
        assert_eq!(MergeKind::from_str("json").unwrap(), MergeKind::Structured);
        assert_eq!(MergeKind::from_str("ENV").unwrap(), MergeKind::LineAppendDedup);
        assert_eq!(MergeKind::from_str("replace").unwrap(), MergeKind::Replace);
        assert!(MergeKind::from_str("zip").is_err());
        assert_eq!(MergeKind::for_path(Path::new("package.json")), MergeKind::Structured);
    }

    // ========================================================================
    // Module Builder Tests
    // ========================================================================

    #[test]
    fn module_builder_success() {
        let module = ModuleDescriptor::builder(id("prisma"))
            .metadata(ModuleMetadata::new("Prisma").category("database"))
            .depends_on(id("db"))
            .conflicts_with(id("drizzle"))
            .parameter(ParameterSpec::optional("provider", "postgresql"))
            .action(Action::install(&["@prisma/client"]))
            .action(Action::create_file("prisma/schema.prisma", "// schema"))
            .build()
            .unwrap();

        assert!(module.depends_on(&id("db")));
        assert!(module.conflicts_with(&id("drizzle")));
        assert!(module.parameter("provider").is_some());
        assert_eq!(module.actions.len(), 2);
    }

    #[test]
    fn module_builder_requires_metadata() {
        let result = ModuleDescriptor::builder(id("x")).build();
        assert_eq!(
            result.unwrap_err(),
            DomainError::MissingRequiredField { field: "metadata" }
        );
    }

    #[test]
    fn module_rejects_self_dependency() {
        let result = ModuleDescriptor::builder(id("a"))
            .metadata(ModuleMetadata::new("A"))
            .depends_on(id("a"))
            .build();
        assert!(matches!(result, Err(DomainError::SelfDependency { .. })));
    }

    #[test]
    fn module_rejects_contradictory_relation() {
        let result = ModuleDescriptor::builder(id("a"))
            .metadata(ModuleMetadata::new("A"))
            .depends_on(id("b"))
            .conflicts_with(id("b"))
            .build();
        assert_eq!(
            result.unwrap_err().category(),
            ErrorCategory::Compatibility
        );
    }

    #[test]
    fn module_rejects_duplicate_parameters() {
        let result = ModuleDescriptor::builder(id("a"))
            .metadata(ModuleMetadata::new("A"))
            .parameter(ParameterSpec::required("x"))
            .parameter(ParameterSpec::optional("x", "1"))
            .build();
        assert!(matches!(result, Err(DomainError::InvalidParameter { .. })));
    }

    #[test]
    fn module_rejects_escaping_action_paths() {
        let result = ModuleDescriptor::builder(id("a"))
            .metadata(ModuleMetadata::new("A"))
            .action(Action::create_file("../outside.ts", ""))
            .build();
        assert!(matches!(result, Err(DomainError::InvalidAction { index: 0, .. })));

        // Templated paths are checked after rendering instead.
        let ok = ModuleDescriptor::builder(id("a"))
            .metadata(ModuleMetadata::new("A"))
            .action(Action::create_file("{{paths.lib}}/a.ts", ""))
            .build();
        assert!(ok.is_ok());
    }

    #[test]
    fn module_descriptor_deserializes() {
        let json = r#"{
            "id": "auth",
            "metadata": { "name": "Auth" },
            "dependencies": ["db"],
            "parameters": [{ "name": "social", "default": false }],
            "actions": [{ "type": "run-command", "command": "npx auth init" }]
        }"#;
        let module: ModuleDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(module.metadata.version, "0.1.0");
        assert_eq!(module.dependencies, vec![id("db")]);
        assert_eq!(
            module.parameters[0].default,
            Some(ParamValue::Bool(false))
        );
        assert!(DomainValidator::validate_module(&module).is_ok());
    }

    // ========================================================================
    // Error Tests
    // ========================================================================

    #[test]
    fn missing_parameter_suggests_cli_flag() {
        let err = DomainError::from(RenderError::MissingParameter {
            module: "auth".into(),
            name: "secret".into(),
        });
        assert!(
            err.suggestions()
                .iter()
                .any(|s| s.contains("--param auth.secret"))
        );
        assert_eq!(err.category(), ErrorCategory::Validation);
    }
}
