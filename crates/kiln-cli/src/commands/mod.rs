//! Command handlers, one module per subcommand.
//!
//! Handlers translate parsed arguments into core calls and render the
//! results; they hold no business rules of their own.

use std::path::PathBuf;

use tracing::debug;

use kiln_adapters::{InMemoryRegistry, builtin_modules};
use kiln_core::domain::ModuleId;

use crate::{
    config::AppConfig,
    error::{CliError, CliResult},
};

pub mod add;
pub mod completions;
pub mod config;
pub mod init;
pub mod list;
pub mod resolve;

/// Build a registry from the first populated module directory.
///
/// `--modules-dir` wins over `modules.local_path` from config; both are
/// probed before the built-in locations.
pub(crate) fn load_registry(
    modules_dir: Option<PathBuf>,
    config: &AppConfig,
) -> CliResult<InMemoryRegistry> {
    let preferred = modules_dir.or_else(|| config.modules.local_path.clone());
    let modules = builtin_modules::modules_with_override(preferred.clone())?;

    if modules.is_empty() {
        let mut searched: Vec<PathBuf> = preferred.into_iter().collect();
        searched.extend(builtin_modules::candidate_paths());
        return Err(CliError::NoModulesFound { searched });
    }

    let registry = InMemoryRegistry::new();
    registry.extend(modules)?;
    debug!(modules = registry.len(), "Module registry ready");
    Ok(registry)
}

/// Parse user-supplied module ids, rejecting the first malformed one.
pub(crate) fn parse_module_ids(raw: &[String]) -> CliResult<Vec<ModuleId>> {
    raw.iter()
        .map(|s| {
            ModuleId::parse(s.as_str()).map_err(|e| CliError::InvalidInput {
                message: format!("'{s}' is not a valid module id"),
                source: Some(Box::new(e)),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn module_ids_are_validated() {
        let ids = parse_module_ids(&["prisma".into(), "next-auth".into()]).unwrap();
        assert_eq!(ids[1].as_str(), "next-auth");

        assert!(matches!(
            parse_module_ids(&["Bad Id!".into()]),
            Err(CliError::InvalidInput { .. })
        ));
    }

    #[test]
    fn explicit_modules_dir_is_loaded() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("zod");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("module.toml"), "[module]\nname = \"Zod\"\n").unwrap();

        let registry =
            load_registry(Some(temp.path().to_path_buf()), &AppConfig::default()).unwrap();
        assert_eq!(registry.len(), 1);
    }
}
