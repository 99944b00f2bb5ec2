//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `kiln-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

use crate::domain::{ModuleDescriptor, ModuleId};
use crate::error::KilnResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `kiln_adapters::filesystem::LocalFilesystem` (production)
/// - `kiln_adapters::filesystem::MemoryFilesystem` (testing)
///
/// Paths handed to the port are already joined onto the project root.
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Read a UTF-8 file.
    fn read_to_string(&self, path: &Path) -> KilnResult<String>;

    /// Write content to a file, replacing it. Parents must exist.
    fn write_file(&self, path: &Path, content: &str) -> KilnResult<()>;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> KilnResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}

/// Port for running external programs (package managers, CLIs).
///
/// Implemented by:
/// - `kiln_adapters::process::SystemProcessRunner` (std::process)
/// - `kiln_adapters::process::RecordingRunner` (testing, dry runs)
#[cfg_attr(test, mockall::automock)]
pub trait ProcessRunner: Send + Sync {
    /// Run `argv[0]` with the remaining arguments in `cwd` and wait for it.
    ///
    /// A non-zero exit is reported through `CommandOutput::status`, not as
    /// an error. Errors mean the process could not be started at all.
    fn run(&self, argv: &[String], cwd: &Path) -> KilnResult<CommandOutput>;
}

/// Port for layout-dependent paths (`{{paths.KEY}}`).
///
/// Implemented by `kiln_adapters::paths::LayoutPathResolver`.
#[cfg_attr(test, mockall::automock)]
pub trait PathResolver: Send + Sync {
    /// Project-relative directory for a well-known key such as `lib` or
    /// `components`.
    fn resolve(&self, key: &str) -> Option<PathBuf>;
}

/// Port for module storage and retrieval.
///
/// Implemented by:
/// - `kiln_adapters::registry::InMemoryRegistry` (built-in and manifest modules)
#[cfg_attr(test, mockall::automock)]
pub trait ModuleStore: Send + Sync {
    /// Get a module by id. `ModuleNotFound` when absent.
    fn get(&self, id: &ModuleId) -> KilnResult<ModuleDescriptor>;

    /// All registered modules, ordered by id.
    fn list(&self) -> KilnResult<Vec<ModuleDescriptor>>;

    /// Insert or replace a module. The descriptor is validated first.
    fn insert(&self, module: ModuleDescriptor) -> KilnResult<()>;

    fn contains(&self, id: &ModuleId) -> bool;
}
