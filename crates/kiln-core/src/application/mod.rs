//! Application layer for Kiln.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (InstallService, ModuleService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The resolver and blueprint executor live here because they drive ports;
//! the rules they apply (templates, merge strategies) live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    BlueprintExecutor, DependencyResolver, FailurePolicy, InstallEvent, InstallReport,
    InstallRequest, InstallService, ModuleInfo, ModuleReport, ModuleService, ParamAssignment,
};

// Re-export port traits (for adapter implementation)
pub use ports::{CommandOutput, Filesystem, ModuleStore, PathResolver, ProcessRunner};

pub use error::ApplicationError;
