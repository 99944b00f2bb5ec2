//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ResolutionResult;
use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A requested module is not registered.
    #[error("Module not found: {id}")]
    ModuleNotFound { id: String },

    /// Resolution reported conflicts, cycles or missing modules; nothing ran.
    #[error("Module resolution failed: {}", .report.defects().join("; "))]
    ResolutionFailed { report: ResolutionResult },

    /// A module manifest could not be read or parsed.
    #[error("Invalid module manifest {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// A process could not be started.
    #[error("Failed to run '{command}': {reason}")]
    CommandSpawn { command: String, reason: String },

    /// A process exited with a non-zero status.
    #[error("Command '{command}' exited with status {status}{}", format_stderr(.stderr))]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    /// Store access failed (lock poisoned, etc.).
    #[error("Module registry error")]
    StoreLockError,

    /// Port/Adapter not configured.
    #[error("Required adapter not configured: {name}")]
    AdapterNotConfigured { name: &'static str },
}

fn format_stderr(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ModuleNotFound { id } => vec![
                format!("No module named '{}' is registered", id),
                "Try: kiln list to see available modules".into(),
                "Or point KILN_MODULES_DIR at a directory of module manifests".into(),
            ],
            Self::ResolutionFailed { report } => {
                let mut out: Vec<String> = report.defects();
                if report.conflicts.iter().any(|c| !c.is_cycle()) {
                    out.push("Remove one module of each conflicting pair".into());
                }
                if !report.missing.is_empty() {
                    out.push("Try: kiln list to see available modules".into());
                }
                out
            }
            Self::InvalidManifest { path, .. } => vec![
                format!("Check the manifest at {}", path.display()),
                "Every manifest needs a [module] table with at least a name".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::CommandSpawn { command, .. } => vec![
                format!("Is '{}' installed and on PATH?", command),
                "Set project.package_manager in the config to match your tooling".into(),
            ],
            Self::CommandFailed { command, .. } => vec![
                format!("Run '{}' by hand in the project root to see the full output", command),
            ],
            Self::StoreLockError => vec![
                "The module registry is locked".into(),
                "Try again in a moment".into(),
            ],
            Self::AdapterNotConfigured { name } => vec![
                format!("Required component not configured: {}", name),
                "This is likely a configuration error".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ModuleNotFound { .. } => ErrorCategory::NotFound,
            Self::ResolutionFailed { report } if report.conflicts.is_empty() => {
                ErrorCategory::NotFound
            }
            Self::ResolutionFailed { .. } => ErrorCategory::Compatibility,
            Self::InvalidManifest { .. } => ErrorCategory::Validation,
            Self::AdapterNotConfigured { .. } => ErrorCategory::Configuration,
            Self::FilesystemError { .. }
            | Self::CommandSpawn { .. }
            | Self::CommandFailed { .. }
            | Self::StoreLockError => ErrorCategory::Internal,
        }
    }
}
