//! Built-in module discovery.
//!
//! [`all_modules`] is the single entry-point for loading the modules that
//! ship with Kiln. Callers do not need to know where modules live on disk.
//!
//! # Resolution order
//!
//! Directories are probed in this order, stopping at the first one that
//! exists and yields at least one valid module:
//!
//! 1. **`$KILN_MODULES_DIR`**: environment override (also read from `.env`)
//! 2. **`./modules`**: relative to the current working directory
//! 3. **`<executable-dir>/modules`**: sibling to the `kiln` binary
//!
//! If nothing is found, [`all_modules`] returns an **empty `Vec`** and logs
//! a warning. The CLI turns that into an actionable message.

use std::path::PathBuf;

use tracing::{debug, info, instrument, warn};

use kiln_core::domain::{DomainError, ModuleDescriptor};

use crate::module_loader::ModuleManifestLoader;

pub const MODULES_DIR_ENV: &str = "KILN_MODULES_DIR";

/// Load all modules using the resolution order described in the module docs.
///
/// # Errors
///
/// Propagates a failure to read a discovered directory. Individual manifests
/// that fail to parse are skipped with a warning.
#[instrument]
pub fn all_modules() -> Result<Vec<ModuleDescriptor>, DomainError> {
    load_first_populated(candidate_paths())
}

/// Like [`all_modules`], but probing `preferred` before the defaults.
pub fn modules_with_override(
    preferred: Option<PathBuf>,
) -> Result<Vec<ModuleDescriptor>, DomainError> {
    let mut candidates: Vec<PathBuf> = preferred.into_iter().collect();
    candidates.extend(candidate_paths());
    load_first_populated(candidates)
}

fn load_first_populated(
    candidates: Vec<PathBuf>,
) -> Result<Vec<ModuleDescriptor>, DomainError> {
    for candidate in candidates {
        debug!(path = %candidate.display(), "Checking candidate modules path");

        if !candidate.is_dir() {
            continue;
        }

        let modules = ModuleManifestLoader::new(&candidate).load_all()?;
        if modules.is_empty() {
            debug!(path = %candidate.display(), "No modules here, trying next");
            continue;
        }

        info!(
            path  = %candidate.display(),
            count = modules.len(),
            "Modules loaded"
        );
        return Ok(modules);
    }

    warn!("No modules directory found; checked ${MODULES_DIR_ENV}, ./modules and <exe>/modules");
    Ok(vec![])
}

/// Ordered candidate directories; unset env vars and unknown exe paths are
/// omitted.
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(3);

    if let Ok(env_dir) = std::env::var(MODULES_DIR_ENV) {
        paths.push(PathBuf::from(env_dir));
    }

    paths.push(PathBuf::from("modules"));

    if let Some(exe_sibling) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("modules")))
    {
        paths.push(exe_sibling);
    }

    paths
}
