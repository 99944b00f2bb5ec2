//! Layout-preset path resolver for `{{paths.KEY}}`.
//!
//! ```text
//! key          single-app        monorepo
//! ───────────  ────────────────  ─────────────────────────
//! src          src               apps/web/src
//! app          src/app           apps/web/src/app
//! lib          src/lib           apps/web/src/lib
//! components   src/components    packages/ui/src
//! db           prisma            packages/db
//! api          src/app/api       apps/web/src/app/api
//! config       .                 .
//! public       public            apps/web/public
//! tests        tests             apps/web/tests
//! ```

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use kiln_core::application::ports::PathResolver;

/// Project shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    #[default]
    SingleApp,
    Monorepo,
}

impl Layout {
    /// Guess the layout from workspace markers under `root`.
    pub fn detect(root: &Path) -> Self {
        let markers = ["pnpm-workspace.yaml", "turbo.json", "nx.json", "lerna.json"];
        let is_monorepo = markers.iter().any(|m| root.join(m).exists())
            || (root.join("apps").is_dir() && root.join("packages").is_dir());

        let layout = if is_monorepo {
            Self::Monorepo
        } else {
            Self::SingleApp
        };
        debug!(root = %root.display(), ?layout, "Detected project layout");
        layout
    }

    fn preset(self, key: &str) -> Option<&'static str> {
        let path = match (self, key) {
            (Self::SingleApp, "src") => "src",
            (Self::SingleApp, "app") => "src/app",
            (Self::SingleApp, "lib") => "src/lib",
            (Self::SingleApp, "components") => "src/components",
            (Self::SingleApp, "db") => "prisma",
            (Self::SingleApp, "api") => "src/app/api",
            (Self::SingleApp, "public") => "public",
            (Self::SingleApp, "tests") => "tests",

            (Self::Monorepo, "src") => "apps/web/src",
            (Self::Monorepo, "app") => "apps/web/src/app",
            (Self::Monorepo, "lib") => "apps/web/src/lib",
            (Self::Monorepo, "components") => "packages/ui/src",
            (Self::Monorepo, "db") => "packages/db",
            (Self::Monorepo, "api") => "apps/web/src/app/api",
            (Self::Monorepo, "public") => "apps/web/public",
            (Self::Monorepo, "tests") => "apps/web/tests",

            (_, "config" | "root") => ".",
            _ => return None,
        };
        Some(path)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SingleApp => "single-app",
            Self::Monorepo => "monorepo",
        })
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single-app" | "single" | "app" => Ok(Self::SingleApp),
            "monorepo" | "mono" | "workspace" => Ok(Self::Monorepo),
            other => Err(format!(
                "unknown layout '{other}', expected 'single-app' or 'monorepo'"
            )),
        }
    }
}

/// [`PathResolver`] backed by a [`Layout`] preset plus explicit overrides.
#[derive(Debug, Clone, Default)]
pub struct LayoutPathResolver {
    layout: Layout,
    overrides: HashMap<String, PathBuf>,
}

impl LayoutPathResolver {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            overrides: HashMap::new(),
        }
    }

    /// Pin `key` to `path`, taking precedence over the preset.
    pub fn with_override(mut self, key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.overrides.insert(key.into(), path.into());
        self
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }
}

impl PathResolver for LayoutPathResolver {
    fn resolve(&self, key: &str) -> Option<PathBuf> {
        self.overrides
            .get(key)
            .cloned()
            .or_else(|| self.layout.preset(key).map(PathBuf::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn presets_differ_by_layout() {
        let single = LayoutPathResolver::new(Layout::SingleApp);
        let mono = LayoutPathResolver::new(Layout::Monorepo);

        assert_eq!(single.resolve("lib"), Some(PathBuf::from("src/lib")));
        assert_eq!(mono.resolve("lib"), Some(PathBuf::from("apps/web/src/lib")));
        assert_eq!(mono.resolve("config"), Some(PathBuf::from(".")));
        assert_eq!(single.resolve("nonsense"), None);
    }

    #[test]
    fn overrides_win() {
        let resolver =
            LayoutPathResolver::new(Layout::SingleApp).with_override("db", "database");
        assert_eq!(resolver.resolve("db"), Some(PathBuf::from("database")));
        assert_eq!(resolver.resolve("custom"), None);
    }

    #[test]
    fn detects_workspace_markers() {
        let temp = TempDir::new().unwrap();
        assert_eq!(Layout::detect(temp.path()), Layout::SingleApp);

        std::fs::write(temp.path().join("pnpm-workspace.yaml"), "packages: []\n").unwrap();
        assert_eq!(Layout::detect(temp.path()), Layout::Monorepo);
    }

    #[test]
    fn parses_aliases() {
        assert_eq!("monorepo".parse::<Layout>(), Ok(Layout::Monorepo));
        assert_eq!("Single-App".parse::<Layout>(), Ok(Layout::SingleApp));
        assert!("spaghetti".parse::<Layout>().is_err());
        assert_eq!(Layout::Monorepo.to_string(), "monorepo");
    }
}
