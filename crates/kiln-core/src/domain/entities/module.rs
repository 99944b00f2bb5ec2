//! Module descriptor aggregate.
//!
//! A module is a selectable unit of technology: an ORM, an auth library, a
//! UI kit, a deployment target. Its descriptor declares what it needs
//! (`dependencies`), what it cannot coexist with (`conflicts`), what it can
//! be configured with (`parameters`) and what it does (`actions`, the
//! blueprint).
//!
//! ## Invariants (enforced by `validate()`)
//!
//! 1. `metadata.name` is non-empty
//! 2. A module never depends on itself
//! 3. A module never both depends on and conflicts with the same module
//! 4. Parameter names are unique
//! 5. File actions target paths that stay inside the project root
//!    (checked after rendering by the executor, and statically here when
//!    the path has no placeholders)

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::{action::Action, common::RelativePath},
    error::DomainError,
    value_objects::{ModuleId, ParamValue},
};

/// The module aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub id: ModuleId,
    pub metadata: ModuleMetadata,
    /// Visited in this order during resolution.
    #[serde(default)]
    pub dependencies: Vec<ModuleId>,
    #[serde(default)]
    pub conflicts: Vec<ModuleId>,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    #[serde(default)]
    pub env_vars: Vec<EnvVar>,
    /// The blueprint.
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl ModuleDescriptor {
    pub fn builder(id: ModuleId) -> ModuleBuilder {
        ModuleBuilder::new(id)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let module = self.id.to_string();

        if self.metadata.name.trim().is_empty() {
            return Err(DomainError::InvalidModule {
                module,
                reason: "display name cannot be empty".into(),
            });
        }

        if self.dependencies.contains(&self.id) {
            return Err(DomainError::SelfDependency { module });
        }

        if let Some(other) = self
            .dependencies
            .iter()
            .find(|dep| self.conflicts.contains(dep))
        {
            return Err(DomainError::ContradictoryRelation {
                module,
                other: other.to_string(),
            });
        }

        let mut seen = HashSet::new();
        for param in &self.parameters {
            if param.name.is_empty() || param.name.contains(['.', '{', '}']) {
                return Err(DomainError::InvalidParameter {
                    name: param.name.clone(),
                    reason: format!("not a valid parameter name in module '{module}'"),
                });
            }
            if !seen.insert(param.name.as_str()) {
                return Err(DomainError::InvalidParameter {
                    name: param.name.clone(),
                    reason: format!("declared twice in module '{module}'"),
                });
            }
        }

        for (index, action) in self.actions.iter().enumerate() {
            if let Some(path) = action.kind.target_path() {
                if path.trim().is_empty() {
                    return Err(DomainError::InvalidAction {
                        module,
                        index,
                        reason: "target path is empty".into(),
                    });
                }
                if !path.contains("{{") {
                    RelativePath::try_new(path).map_err(|e| DomainError::InvalidAction {
                        module: module.clone(),
                        index,
                        reason: e.to_string(),
                    })?;
                }
            }
        }

        Ok(())
    }

    pub fn depends_on(&self, other: &ModuleId) -> bool {
        self.dependencies.contains(other)
    }

    pub fn conflicts_with(&self, other: &ModuleId) -> bool {
        self.conflicts.contains(other)
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Human-readable information about a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Grouping for listings, e.g. `database`, `auth`, `ui`.
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

impl ModuleMetadata {
    /// Create metadata with a display name; other fields default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category: String::new(),
            version: default_version(),
            tags: Vec::new(),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn version(mut self, ver: impl Into<String>) -> Self {
        self.version = ver.into();
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// A configurable input of a module, referenced as `{{params.NAME}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(default)]
    pub default: Option<ParamValue>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

impl ParameterSpec {
    pub fn optional(name: impl Into<String>, default: impl Into<ParamValue>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
            required: false,
            description: String::new(),
        }
    }

    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            required: true,
            description: String::new(),
        }
    }

    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }
}

/// An environment variable a module contributes, referenced as `{{env.NAME}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

/// Builder for module descriptors.
///
/// Validation happens once, at `build()`.
pub struct ModuleBuilder {
    id: ModuleId,
    metadata: Option<ModuleMetadata>,
    dependencies: Vec<ModuleId>,
    conflicts: Vec<ModuleId>,
    parameters: Vec<ParameterSpec>,
    env_vars: Vec<EnvVar>,
    actions: Vec<Action>,
}

impl ModuleBuilder {
    pub fn new(id: ModuleId) -> Self {
        Self {
            id,
            metadata: None,
            dependencies: Vec::new(),
            conflicts: Vec::new(),
            parameters: Vec::new(),
            env_vars: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn metadata(mut self, metadata: ModuleMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn depends_on(mut self, id: ModuleId) -> Self {
        self.dependencies.push(id);
        self
    }

    pub fn conflicts_with(mut self, id: ModuleId) -> Self {
        self.conflicts.push(id);
        self
    }

    pub fn parameter(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push(EnvVar {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Consume the builder and construct a validated descriptor.
    ///
    /// # Errors
    ///
    /// - `MissingRequiredField` if metadata was not set
    /// - any invariant violation reported by [`ModuleDescriptor::validate`]
    pub fn build(self) -> Result<ModuleDescriptor, DomainError> {
        let descriptor = ModuleDescriptor {
            id: self.id,
            metadata: self
                .metadata
                .ok_or(DomainError::MissingRequiredField { field: "metadata" })?,
            dependencies: self.dependencies,
            conflicts: self.conflicts,
            parameters: self.parameters,
            env_vars: self.env_vars,
            actions: self.actions,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}
