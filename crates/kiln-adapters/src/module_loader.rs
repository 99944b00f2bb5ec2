//! Filesystem-based module loader.
//!
//! Discovers and parses `module.toml` manifests from a directory tree,
//! converting them into domain [`ModuleDescriptor`]s ready for the registry.
//!
//! # Directory layout expected
//!
//! ```text
//! modules/
//! ├── prisma/
//! │   ├── module.toml          ← manifest (required)
//! │   └── files/
//! │       └── client.ts        ← referenced by `content_file`
//! └── next-auth/
//!     └── module.toml
//! ```
//!
//! # `module.toml` format
//!
//! ```toml
//! [module]
//! id           = "prisma"            # optional; defaults to the directory name
//! name         = "Prisma ORM"
//! description  = "Type-safe database client"
//! category     = "orm"
//! dependencies = ["database"]
//! conflicts    = ["drizzle"]
//!
//! [[parameters]]
//! name    = "provider"
//! default = "postgresql"
//!
//! [[env]]
//! name  = "DATABASE_URL"
//! value = "postgresql://localhost:5432/app"
//!
//! [[actions]]
//! type      = "install-packages"
//! packages  = ["prisma"]
//! dev       = true
//!
//! [[actions]]
//! type         = "create-file"
//! path         = "{{paths.lib}}/db.ts"
//! content_file = "files/client.ts"   # read relative to the module directory
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use kiln_core::domain::{
    Action, DomainError, EnvVar, ModuleDescriptor, ModuleId, ModuleMetadata, ParameterSpec,
};

const MANIFEST_FILE: &str = "module.toml";

// ── Manifest schema ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ModuleManifest {
    module: ModuleSection,
    #[serde(default)]
    parameters: Vec<ParameterSpec>,
    #[serde(default)]
    env: Vec<EnvVar>,
    /// Kept raw so `content_file` can be inlined before the typed parse.
    #[serde(default)]
    actions: Vec<toml::Table>,
}

#[derive(Debug, Deserialize)]
struct ModuleSection {
    id: Option<String>,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    version: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    conflicts: Vec<String>,
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads module manifests from one directory.
///
/// # Example
///
/// ```no_run
/// use kiln_adapters::ModuleManifestLoader;
///
/// let loader = ModuleManifestLoader::new("./modules");
/// let modules = loader.load_all()?;
/// println!("Loaded {} modules", modules.len());
/// # Ok::<(), kiln_core::domain::DomainError>(())
/// ```
pub struct ModuleManifestLoader {
    modules_dir: PathBuf,
}

impl ModuleManifestLoader {
    /// Create a loader pointed at `modules_dir`.
    pub fn new(modules_dir: impl Into<PathBuf>) -> Self {
        Self {
            modules_dir: modules_dir.into(),
        }
    }

    pub fn modules_dir(&self) -> &Path {
        &self.modules_dir
    }

    /// Load every valid module found under `modules_dir`, sorted by id.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidModule`] if `modules_dir` does not exist
    /// or cannot be walked. Individual manifests that are malformed are
    /// **skipped with a `WARN` log** rather than failing the whole batch.
    #[instrument(skip(self), fields(dir = %self.modules_dir.display()))]
    pub fn load_all(&self) -> Result<Vec<ModuleDescriptor>, DomainError> {
        if !self.modules_dir.is_dir() {
            return Err(DomainError::InvalidModule {
                module: self.modules_dir.display().to_string(),
                reason: "modules directory not found".into(),
            });
        }

        let mut modules = Vec::new();

        for entry in WalkDir::new(&self.modules_dir)
            .min_depth(2)
            .max_depth(2)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| DomainError::InvalidModule {
                module: self.modules_dir.display().to_string(),
                reason: format!("directory walk error: {e}"),
            })?;

            if entry.file_name() != MANIFEST_FILE || !entry.file_type().is_file() {
                continue;
            }

            match Self::load_manifest(entry.path()) {
                Ok(module) => {
                    debug!(module = %module.id, actions = module.actions.len(), "Loaded module");
                    modules.push(module);
                }
                Err(e) => {
                    // One bad manifest must not block the others.
                    warn!(
                        path  = %entry.path().display(),
                        error = %e,
                        "Skipping module manifest due to load error"
                    );
                }
            }
        }

        modules.sort_by(|a, b| a.id.cmp(&b.id));
        debug!(count = modules.len(), "Finished loading modules");
        Ok(modules)
    }

    /// Parse one `module.toml`.
    pub fn load_manifest(manifest_path: &Path) -> Result<ModuleDescriptor, DomainError> {
        let dir = manifest_path.parent().unwrap_or(Path::new("."));
        let dir_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let invalid = |reason: String| DomainError::InvalidModule {
            module: dir_name.clone(),
            reason,
        };

        let raw = fs::read_to_string(manifest_path)
            .map_err(|e| invalid(format!("failed to read '{}': {e}", manifest_path.display())))?;
        let manifest: ModuleManifest = toml::from_str(&raw)
            .map_err(|e| invalid(format!("failed to parse '{}': {e}", manifest_path.display())))?;

        let section = manifest.module;
        let id = ModuleId::parse(section.id.unwrap_or_else(|| dir_name.clone()))?;

        let mut metadata = ModuleMetadata::new(section.name)
            .description(section.description)
            .category(section.category)
            .tags(section.tags);
        if let Some(version) = section.version {
            metadata = metadata.version(version);
        }

        let mut builder = ModuleDescriptor::builder(id.clone()).metadata(metadata);
        for dep in section.dependencies {
            builder = builder.depends_on(ModuleId::parse(dep)?);
        }
        for other in section.conflicts {
            builder = builder.conflicts_with(ModuleId::parse(other)?);
        }
        for spec in manifest.parameters {
            builder = builder.parameter(spec);
        }
        for var in manifest.env {
            builder = builder.env(var.name, var.value);
        }
        for (index, table) in manifest.actions.into_iter().enumerate() {
            builder = builder.action(parse_action(dir, &id, index, table)?);
        }

        builder.build()
    }
}

/// Inline `content_file`, then parse the table as a typed [`Action`].
fn parse_action(
    dir: &Path,
    module: &ModuleId,
    index: usize,
    mut table: toml::Table,
) -> Result<Action, DomainError> {
    let invalid = |reason: String| DomainError::InvalidAction {
        module: module.to_string(),
        index,
        reason,
    };

    if let Some(file) = table.remove("content_file") {
        let rel = file
            .as_str()
            .ok_or_else(|| invalid("content_file must be a string".into()))?;
        let body = fs::read_to_string(dir.join(rel))
            .map_err(|e| invalid(format!("failed to read content_file '{rel}': {e}")))?;
        table.insert("content".into(), toml::Value::String(body));
    }

    toml::Value::Table(table)
        .try_into::<Action>()
        .map_err(|e| invalid(e.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
