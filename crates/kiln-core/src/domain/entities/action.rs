//! Blueprint actions: the declarative instruction set a module executes.
//!
//! ## Shape
//!
//! ```text
//! Action
//! ├── kind: ActionKind        what to do (closed set, matched exhaustively)
//! ├── condition: Option<..>   `true`, `false`, or `params.flag`
//! └── repeat_over: Option<..> list parameter; one application per element
//! ```
//!
//! Actions are plain data. They are declared in module manifests (serde,
//! tagged by `type`) or built in code, and never mutated after registration.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::MergeKind;

/// One unit of work in a blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(flatten)]
    pub kind: ActionKind,

    /// Boolean template expression; a false result skips the action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    /// Name of a list parameter to iterate; `{{item}}` is bound per element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_over: Option<String>,
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            condition: None,
            repeat_over: None,
        }
    }

    /// Only apply when `condition` evaluates truthy.
    pub fn when(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Apply once per element of the named list parameter.
    pub fn for_each(mut self, collection: impl Into<String>) -> Self {
        self.repeat_over = Some(collection.into());
        self
    }

    // ── Constructors per kind ─────────────────────────────────────────────

    pub fn install(packages: &[&str]) -> Self {
        Self::new(ActionKind::InstallPackages {
            packages: packages.iter().map(|p| p.to_string()).collect(),
            dev: false,
        })
    }

    pub fn install_dev(packages: &[&str]) -> Self {
        Self::new(ActionKind::InstallPackages {
            packages: packages.iter().map(|p| p.to_string()).collect(),
            dev: true,
        })
    }

    pub fn create_file(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(ActionKind::CreateFile {
            path: path.into(),
            content: content.into(),
            merge: None,
        })
    }

    pub fn append(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(ActionKind::AppendContent {
            path: path.into(),
            content: content.into(),
        })
    }

    pub fn command(command: impl Into<String>) -> Self {
        Self::new(ActionKind::RunCommand {
            command: command.into(),
        })
    }

    pub fn merge_json(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(ActionKind::MergeStructuredData {
            path: path.into(),
            content: content.into(),
        })
    }

    pub fn extend_schema(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(ActionKind::ExtendSchema {
            path: path.into(),
            content: content.into(),
        })
    }

    pub fn modify(path: impl Into<String>, modifier: ContentModifier) -> Self {
        Self::new(ActionKind::ModifyContent {
            path: path.into(),
            modifier,
        })
    }

    /// Short label for logs and reports, e.g. `create-file src/db.ts`.
    pub fn describe(&self) -> String {
        match &self.kind {
            ActionKind::InstallPackages { packages, dev } => format!(
                "install-packages{} {}",
                if *dev { " (dev)" } else { "" },
                packages.join(" ")
            ),
            ActionKind::RunCommand { command } => format!("run-command {command}"),
            other => format!(
                "{} {}",
                other.name(),
                other.target_path().unwrap_or_default()
            ),
        }
    }
}

/// The closed set of things a blueprint can do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ActionKind {
    /// Add packages through the project's package manager.
    InstallPackages {
        packages: Vec<String>,
        #[serde(default)]
        dev: bool,
    },

    /// Write a file. The merge strategy comes from `merge` when set,
    /// otherwise from the file name (see `MergeKind::for_path`).
    CreateFile {
        path: String,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        merge: Option<MergeKind>,
    },

    /// Append a block to a file unless it is already present.
    AppendContent { path: String, content: String },

    /// Run a shell-like command line in the project root.
    RunCommand { command: String },

    /// Deep-merge a JSON object into a structured file.
    MergeStructuredData { path: String, content: String },

    /// Append a schema block (models, tables) once.
    ExtendSchema { path: String, content: String },

    /// Apply an in-place edit to an existing file.
    ModifyContent {
        path: String,
        modifier: ContentModifier,
    },
}

impl ActionKind {
    /// Kebab-case name as written in manifests.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::InstallPackages { .. } => "install-packages",
            Self::CreateFile { .. } => "create-file",
            Self::AppendContent { .. } => "append-content",
            Self::RunCommand { .. } => "run-command",
            Self::MergeStructuredData { .. } => "merge-structured-data",
            Self::ExtendSchema { .. } => "extend-schema",
            Self::ModifyContent { .. } => "modify-content",
        }
    }

    /// Unrendered target path for file-writing kinds.
    pub fn target_path(&self) -> Option<&str> {
        match self {
            Self::CreateFile { path, .. }
            | Self::AppendContent { path, .. }
            | Self::MergeStructuredData { path, .. }
            | Self::ExtendSchema { path, .. }
            | Self::ModifyContent { path, .. } => Some(path),
            Self::InstallPackages { .. } | Self::RunCommand { .. } => None,
        }
    }

    /// Whether this kind shells out through the process runner.
    pub const fn is_command(&self) -> bool {
        matches!(self, Self::InstallPackages { .. } | Self::RunCommand { .. })
    }
}

/// A declarative in-place edit.
///
/// Every modifier is idempotent: when the text it would insert is already
/// in the file, the file is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum ContentModifier {
    InsertAfter { anchor: String, content: String },
    InsertBefore { anchor: String, content: String },
    ReplaceText { find: String, replace: String },
    Prepend { content: String },
}
