pub mod action;
pub mod common;
pub mod context;
pub mod module;
pub mod outcome;

pub use crate::domain::DomainError;
pub use action::{Action, ActionKind, ContentModifier};
pub use context::{ProjectContext, ProjectMetadata};
pub use module::{EnvVar, ModuleBuilder, ModuleDescriptor, ModuleMetadata, ParameterSpec};
pub use outcome::{Conflict, ExecutionResult, ResolutionResult};
