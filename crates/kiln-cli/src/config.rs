//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `KILN_*` environment variables, `__` between sections
//!    (`KILN_PROJECT__PACKAGE_MANAGER=pnpm`)
//! 3. `--config FILE`
//! 4. `.kiln.toml` in the current directory
//! 5. Global config file ([`AppConfig::config_path`])
//! 6. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const LOCAL_CONFIG_FILE: &str = ".kiln.toml";
const ENV_PREFIX: &str = "KILN";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Defaults for the target project.
    pub project: ProjectConfig,
    /// Install behaviour.
    pub execution: ExecutionConfig,
    /// Output settings.
    pub output: OutputConfig,
    /// Module discovery.
    pub modules: ModulesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// `None` means detect from lockfiles.
    pub package_manager: Option<String>,
    /// `single-app`, `monorepo` or `auto`.
    pub layout: String,
    pub author: Option<String>,
    pub license: Option<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            package_manager: None,
            layout: "auto".into(),
            author: None,
            license: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub stop_on_failure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulesConfig {
    /// Module manifest directory probed before the built-in locations.
    pub local_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from every layer.
    ///
    /// `config_file` is the path the user passed via `--config`; unlike the
    /// implicit locations it must exist.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path(), Path::new(LOCAL_CONFIG_FILE), config_file)
    }

    fn load_from(
        global: &Path,
        local: &Path,
        explicit: Option<&PathBuf>,
    ) -> anyhow::Result<Self> {
        let defaults = toml::to_string(&Self::default())?;

        let mut builder = Config::builder()
            .add_source(File::from_str(&defaults, FileFormat::Toml))
            .add_source(File::from(global).required(false))
            .add_source(File::from(local).required(false));

        if let Some(path) = explicit {
            debug!(path = %path.display(), "Using explicit config file");
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }

        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Look up a dotted key such as `project.layout`.
    ///
    /// Returns `None` for unknown keys; unset optional keys come back as
    /// `Some("")`.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = serde_json::to_value(self).ok()?;
        let pointer = format!("/{}", key.replace('.', "/"));
        match value.pointer(&pointer)? {
            serde_json::Value::Null => Some(String::new()),
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Path to the global configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.kiln.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "kiln", "kiln")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_layout_is_auto() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.project.layout, "auto");
        assert!(cfg.project.package_manager.is_none());
        assert!(!cfg.execution.stop_on_failure);
    }

    #[test]
    fn missing_files_fall_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let cfg = AppConfig::load_from(
            &temp.path().join("global.toml"),
            &temp.path().join(".kiln.toml"),
            None,
        )
        .unwrap();
        assert_eq!(cfg.output.format, "auto");
    }

    #[test]
    fn later_files_override_earlier_ones() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("global.toml");
        let local = temp.path().join(".kiln.toml");
        std::fs::write(
            &global,
            "[project]\npackage_manager = \"yarn\"\nlayout = \"monorepo\"\n",
        )
        .unwrap();
        std::fs::write(&local, "[project]\npackage_manager = \"pnpm\"\n").unwrap();

        let cfg = AppConfig::load_from(&global, &local, None).unwrap();
        assert_eq!(cfg.project.package_manager.as_deref(), Some("pnpm"));
        assert_eq!(cfg.project.layout, "monorepo");
    }

    #[test]
    fn explicit_file_must_exist() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        assert!(
            AppConfig::load_from(
                &temp.path().join("g.toml"),
                &temp.path().join("l.toml"),
                Some(&missing)
            )
            .is_err()
        );
    }

    #[test]
    fn get_known_and_unknown_keys() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.get("project.layout").as_deref(), Some("auto"));
        assert_eq!(cfg.get("execution.stop_on_failure").as_deref(), Some("false"));
        assert_eq!(cfg.get("modules.local_path").as_deref(), Some(""));
        assert_eq!(cfg.get("does.not.exist"), None);
        assert_eq!(cfg.get("project"), None);
    }

    #[test]
    fn config_path_is_not_empty() {
        assert!(!AppConfig::config_path().as_os_str().is_empty());
    }
}
