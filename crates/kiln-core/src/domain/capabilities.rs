//! File-kind capability tables.
//!
//! # Design Rationale
//!
//! Which merge strategy a file gets, and whether a file counts as "source"
//! for list rendering, is decided by file name alone. Both decisions are
//! single static tables here so there is exactly one place to look and one
//! place to test.
//!
//! # Adding a Well-Known File
//!
//! 1. Add one [`MergeRule`] to [`MERGE_RULES`]
//! 2. That's it: `MergeKind::for_path` and the executor pick it up

use std::path::Path;

use crate::domain::value_objects::{ListStyle, MergeKind};

// ── Merge strategy table ─────────────────────────────────────────────────────

/// How a file name is matched against a rule.
#[derive(Debug, Clone, Copy)]
pub enum NamePattern {
    /// Whole file name equals the string.
    Exact(&'static str),
    /// File name starts with the prefix and ends with the suffix.
    Affix {
        prefix: &'static str,
        suffix: &'static str,
    },
}

impl NamePattern {
    fn matches(&self, file_name: &str) -> bool {
        match self {
            Self::Exact(name) => file_name == *name,
            Self::Affix { prefix, suffix } => {
                file_name.len() >= prefix.len() + suffix.len()
                    && file_name.starts_with(prefix)
                    && file_name.ends_with(suffix)
            }
        }
    }
}

/// One row of the file name → merge strategy table.
#[derive(Debug, Clone, Copy)]
pub struct MergeRule {
    pub pattern: NamePattern,
    pub kind: MergeKind,
}

/// Single source of truth for filename-driven merge selection.
///
/// First match wins. Paths not matched by any rule use [`MergeKind::Write`].
pub static MERGE_RULES: &[MergeRule] = &[
    MergeRule {
        pattern: NamePattern::Exact("package.json"),
        kind: MergeKind::Structured,
    },
    MergeRule {
        pattern: NamePattern::Affix {
            prefix: "tsconfig",
            suffix: ".json",
        },
        kind: MergeKind::Structured,
    },
    MergeRule {
        pattern: NamePattern::Exact("jsconfig.json"),
        kind: MergeKind::Structured,
    },
    MergeRule {
        pattern: NamePattern::Exact("composer.json"),
        kind: MergeKind::Structured,
    },
    MergeRule {
        pattern: NamePattern::Exact(".eslintrc.json"),
        kind: MergeKind::Structured,
    },
    MergeRule {
        pattern: NamePattern::Exact("components.json"),
        kind: MergeKind::Structured,
    },
    MergeRule {
        pattern: NamePattern::Exact(".env"),
        kind: MergeKind::LineAppendDedup,
    },
    MergeRule {
        pattern: NamePattern::Affix {
            prefix: ".env.",
            suffix: "",
        },
        kind: MergeKind::LineAppendDedup,
    },
];

/// Look up the merge strategy for a path by its file name.
pub fn merge_kind_for(path: &Path) -> MergeKind {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return MergeKind::Write;
    };

    MERGE_RULES
        .iter()
        .find(|rule| rule.pattern.matches(file_name))
        .map_or(MergeKind::Write, |rule| rule.kind)
}

/// Whether a path is an environment-variable style file.
pub fn is_env_file(path: &Path) -> bool {
    merge_kind_for(path) == MergeKind::LineAppendDedup
}

// ── Source file extensions ───────────────────────────────────────────────────

/// Extensions whose list parameters render as quoted literal arrays.
pub static SOURCE_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "js", "jsx", "mjs", "cjs", "py", "rs", "go", "java", "kt", "swift", "rb", "php",
    "vue", "svelte", "json",
];

pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(ext)))
}

/// List style for a render target: source literal for source files when
/// not rendering a command, space-joined otherwise.
pub fn list_style_for(path: Option<&Path>, command: bool) -> ListStyle {
    match path {
        Some(p) if !command && is_source_file(p) => ListStyle::SourceLiteral,
        _ => ListStyle::SpaceJoined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_files_use_structured_merge() {
        assert_eq!(merge_kind_for(Path::new("package.json")), MergeKind::Structured);
        assert_eq!(
            merge_kind_for(Path::new("apps/web/package.json")),
            MergeKind::Structured
        );
        assert_eq!(merge_kind_for(Path::new("tsconfig.json")), MergeKind::Structured);
        assert_eq!(
            merge_kind_for(Path::new("tsconfig.build.json")),
            MergeKind::Structured
        );
    }

    #[test]
    fn env_files_use_line_append() {
        assert_eq!(merge_kind_for(Path::new(".env")), MergeKind::LineAppendDedup);
        assert_eq!(
            merge_kind_for(Path::new(".env.local")),
            MergeKind::LineAppendDedup
        );
        assert!(is_env_file(Path::new("server/.env.example")));
        assert!(!is_env_file(Path::new("env.ts")));
    }

    #[test]
    fn everything_else_is_written() {
        assert_eq!(merge_kind_for(Path::new("config.json")), MergeKind::Write);
        assert_eq!(merge_kind_for(Path::new("src/db.ts")), MergeKind::Write);
        assert_eq!(merge_kind_for(Path::new("")), MergeKind::Write);
    }

    #[test]
    fn source_extension_detection() {
        assert!(is_source_file(Path::new("src/auth.ts")));
        assert!(is_source_file(Path::new("main.PY")));
        assert!(!is_source_file(Path::new("README.md")));
        assert!(!is_source_file(Path::new("Dockerfile")));
    }

    #[test]
    fn commands_never_get_literal_lists() {
        assert_eq!(
            list_style_for(Some(Path::new("a.ts")), true),
            ListStyle::SpaceJoined
        );
        assert_eq!(
            list_style_for(Some(Path::new("a.ts")), false),
            ListStyle::SourceLiteral
        );
        assert_eq!(list_style_for(None, false), ListStyle::SpaceJoined);
    }
}
