//! `kiln init`: create a default configuration file.

use std::path::{Path, PathBuf};

use crate::{
    cli::InitArgs,
    config::{AppConfig, LOCAL_CONFIG_FILE},
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Create a default Kiln configuration file.
///
/// The global location is used unless `--local` is given.
pub fn execute(args: InitArgs, output: OutputManager) -> CliResult<()> {
    let config_path = if args.local {
        PathBuf::from(LOCAL_CONFIG_FILE)
    } else {
        AppConfig::config_path()
    };

    output.info("Initialising configuration...")?;

    if !write_default_config(&config_path, args.force)? {
        output.warning(&format!(
            "Config already exists at {}  (use --force to overwrite)",
            config_path.display(),
        ))?;
        return Ok(());
    }

    output.success(&format!(
        "Configuration created at {}",
        config_path.display(),
    ))?;
    Ok(())
}

/// Returns `false` when the file exists and `force` is off.
fn write_default_config(path: &Path, force: bool) -> CliResult<bool> {
    if path.exists() && !force {
        return Ok(false);
    }

    let contents = toml::to_string_pretty(&AppConfig::default()).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise default config: {e}"),
        source: Some(Box::new(e)),
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_cli_context(|| {
            format!("Failed to create config directory '{}'", parent.display())
        })?;
    }

    std::fs::write(path, contents)
        .with_cli_context(|| format!("Failed to write config to '{}'", path.display()))?;
    Ok(true)
}
