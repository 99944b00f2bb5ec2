// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (collected into reports)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("Invalid module id '{id}': {reason}")]
    InvalidModuleId { id: String, reason: String },

    #[error("Invalid module '{module}': {reason}")]
    InvalidModule { module: String, reason: String },

    #[error("Invalid action #{index} in module '{module}': {reason}")]
    InvalidAction {
        module: String,
        index: usize,
        reason: String,
    },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Target path renders to nothing: '{template}'")]
    EmptyTargetPath { template: String },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    // ========================================================================
    // Constraint Violations
    // ========================================================================
    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },

    #[error("Module '{module}' depends on itself")]
    SelfDependency { module: String },

    #[error("Module '{module}' both depends on and conflicts with '{other}'")]
    ContradictoryRelation { module: String, other: String },

    // ========================================================================
    // Rendering / merging (recorded per action by the executor)
    // ========================================================================
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Merge(#[from] MergeError),
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidModuleId { id, .. } => vec![
                format!("'{}' is not a usable module identifier", id),
                "Use lowercase letters, digits, '-', '_' or '.'".into(),
            ],
            Self::InvalidModule { module, reason } => vec![
                format!("Module '{}' is malformed: {}", module, reason),
                "Check the module manifest (module.toml)".into(),
            ],
            Self::InvalidAction { module, index, .. } => vec![
                format!("Inspect action #{} of '{}'", index, module),
                "Every file action needs a relative target path".into(),
            ],
            Self::EmptyTargetPath { .. } => vec![
                "The target path depends on a placeholder with no value".into(),
                "Check the {{paths.*}} and {{params.*}} references in the action".into(),
            ],
            Self::SelfDependency { module } => vec![format!(
                "Remove '{}' from its own dependency list",
                module
            )],
            Self::Render(RenderError::MissingParameter { name, module }) => vec![
                format!("Module '{}' requires parameter '{}'", module, name),
                format!("Pass it with: --param {}.{}=<value>", module, name),
            ],
            Self::Merge(MergeError::Unparsable { path, .. }) => vec![
                format!("'{}' is not valid JSON", path),
                "Fix the file by hand, then re-run; the merge never overwrites unparsable data"
                    .into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidModuleId { .. }
            | Self::InvalidModule { .. }
            | Self::InvalidAction { .. }
            | Self::AbsolutePathNotAllowed { .. }
            | Self::EmptyTargetPath { .. }
            | Self::InvalidParameter { .. }
            | Self::MissingRequiredField { .. } => ErrorCategory::Validation,
            Self::SelfDependency { .. } | Self::ContradictoryRelation { .. } => {
                ErrorCategory::Compatibility
            }
            Self::Render(RenderError::MissingParameter { .. }) => ErrorCategory::Validation,
            Self::Render(_) | Self::Merge(_) => ErrorCategory::Internal,
        }
    }
}

/// Failure while rendering a template.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("unclosed '{{{{#if {condition}}}}}' block at byte {offset}")]
    UnclosedConditional { condition: String, offset: usize },

    #[error("parameter '{name}' of module '{module}' is required but has no value")]
    MissingParameter { module: String, name: String },

    #[error("command renders to nothing")]
    EmptyCommand,

    #[error("unbalanced quote in command '{command}'")]
    UnbalancedQuote { command: String },
}

/// Failure while combining rendered content with an existing file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("cannot merge into '{path}': {reason}")]
    Unparsable { path: String, reason: String },

    #[error("structured content for '{path}' must be a JSON object")]
    NotAnObject { path: String },

    #[error("anchor '{anchor}' not found in '{path}'")]
    AnchorNotFound { path: String, anchor: String },

    #[error("serialisation failed: {0}")]
    Serialize(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    NotFound,
    Internal,
}
