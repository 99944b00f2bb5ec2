//! Infrastructure adapters for Kiln.
//!
//! This crate implements the ports defined in `kiln-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod builtin_modules;
pub mod filesystem;
pub mod module_loader;
pub mod paths;
pub mod process;
pub mod registry;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use module_loader::ModuleManifestLoader;
pub use paths::{Layout, LayoutPathResolver};
pub use process::{RecordingRunner, SystemProcessRunner};
pub use registry::InMemoryRegistry;
