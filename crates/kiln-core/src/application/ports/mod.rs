//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `kiln-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `ProcessRunner`: Package manager and CLI invocations
//!   - `PathResolver`: Layout-dependent directories
//!   - `ModuleStore`: Module registry
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{CommandOutput, Filesystem, ModuleStore, PathResolver, ProcessRunner};

#[cfg(test)]
pub use output::{MockFilesystem, MockModuleStore, MockPathResolver, MockProcessRunner};
