//! Kiln Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Kiln
//! module-based scaffolding engine, following hexagonal (ports and adapters)
//! architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             kiln-cli (CLI)              │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (InstallService, DependencyResolver,   │
//! │   BlueprintExecutor, ModuleService)     │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Application Ports (Traits)        │
//! │ (ModuleStore, Filesystem, ProcessRunner,│
//! │  PathResolver)                          │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     kiln-adapters (Infrastructure)      │
//! │ (InMemoryRegistry, LocalFilesystem, ...)│
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (ModuleDescriptor, Action, Template,    │
//! │  MergeKind, ProjectContext)             │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kiln_core::prelude::*;
//!
//! let executor = BlueprintExecutor::new(filesystem, runner);
//! let service = InstallService::new(store, executor);
//!
//! let mut ctx = ProjectContext::new(ProjectMetadata::new("my-app", "./my-app"));
//! let request = InstallRequest {
//!     modules: vec![ModuleId::parse("auth")?],
//!     ..Default::default()
//! };
//! let report = service.install(&request, &mut ctx)?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        BlueprintExecutor, DependencyResolver, FailurePolicy, InstallEvent, InstallReport,
        InstallRequest, InstallService, ModuleInfo, ModuleService, ParamAssignment,
        ports::{CommandOutput, Filesystem, ModuleStore, PathResolver, ProcessRunner},
    };
    pub use crate::domain::{
        Action, ActionKind, ContentModifier, ExecutionResult, MergeKind, ModuleBuilder,
        ModuleDescriptor, ModuleId, ModuleMetadata, ParamValue, ParameterSpec, ProjectContext,
        ProjectMetadata, ResolutionResult,
    };
    pub use crate::error::{KilnError, KilnResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
