//! Domain value objects: ModuleId, ParamValue, MergeKind.
//!
//! # Design
//!
//! These are pure value types: equality-by-value, no identity. Lookup
//! tables (which file name maps to which merge strategy, which extension is
//! a source file) live in `capabilities.rs`. This file only defines the
//! types, their string representations and their parsers.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

// ── ModuleId ─────────────────────────────────────────────────────────────────

/// Identifier of a selectable module (e.g. `prisma`, `better-auth`).
///
/// Invariant: non-empty, no whitespace, no `{`/`}`. Enforced by `parse`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleId(String);

impl ModuleId {
    /// Parse and validate an identifier.
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        let reason = if raw.is_empty() {
            Some("identifier cannot be empty")
        } else if raw.chars().any(char::is_whitespace) {
            Some("identifier cannot contain whitespace")
        } else if raw.contains(['{', '}']) {
            Some("identifier cannot contain braces")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(DomainError::InvalidModuleId {
                id: raw,
                reason: reason.into(),
            }),
            None => Ok(Self(raw)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ModuleId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ModuleId> for String {
    fn from(id: ModuleId) -> Self {
        id.0
    }
}

impl FromStr for ModuleId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── ParamValue ───────────────────────────────────────────────────────────────

/// A resolved module parameter value.
///
/// Manifests write these as plain TOML/JSON values, so the enum is
/// untagged: `true`, `3`, `"postgres"`, `["a", "b"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl ParamValue {
    /// Truthiness cast used by condition evaluation.
    ///
    /// `false`, `0`, `""`, `"false"`, `"0"`, `"no"` and `[]` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Text(s) => {
                let s = s.trim();
                !(s.is_empty()
                    || s.eq_ignore_ascii_case("false")
                    || s == "0"
                    || s.eq_ignore_ascii_case("no"))
            }
            Self::List(items) => !items.is_empty(),
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Scalar rendering. Lists render space-joined; use
    /// [`ParamValue::render_for`] when the output kind matters.
    pub fn render_scalar(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
            Self::List(items) => items.join(" "),
        }
    }

    /// Render with list formatting chosen by the output kind.
    pub fn render_for(&self, style: ListStyle) -> String {
        match (self, style) {
            (Self::List(items), ListStyle::SourceLiteral) => {
                let quoted: Vec<String> = items.iter().map(|i| format!("\"{i}\"")).collect();
                format!("[{}]", quoted.join(", "))
            }
            _ => self.render_scalar(),
        }
    }

    /// Parse a value typed on the command line (`--param db.pool=10`).
    ///
    /// Commas produce a list, `true`/`false` a bool, canonical numerals a
    /// number. Anything else stays text exactly as typed.
    pub fn from_cli(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.contains(',') {
            return Self::List(
                trimmed
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            );
        }
        match trimmed {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            // Only spellings that render back unchanged become numbers.
            _ => match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() && format_number(n) == trimmed => Self::Number(n),
                _ => Self::Text(trimmed.to_string()),
            },
        }
    }
}

/// Locale-free number formatting: integers without a fractional part.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_scalar())
    }
}

/// How a list parameter is spelled in rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    /// `["a", "b"]` for source files.
    SourceLiteral,
    /// `a b` for command lines and everything else.
    SpaceJoined,
}

// ── MergeKind ────────────────────────────────────────────────────────────────

/// Strategy for combining rendered content with a file that may already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeKind {
    /// Recursive JSON object merge, rendered leaves win.
    Structured,
    /// `KEY=value` lines appended only when the key is new.
    LineAppendDedup,
    /// Rendered content wholly replaces the file.
    Replace,
    /// Default: write rendered content, creating parents.
    Write,
}

impl MergeKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::LineAppendDedup => "line-append-dedup",
            Self::Replace => "replace",
            Self::Write => "write",
        }
    }

    /// Strategy implied by a target path's well-known file name.
    ///
    /// Delegates to the table in `capabilities.rs`.
    pub fn for_path(path: &Path) -> Self {
        crate::domain::capabilities::merge_kind_for(path)
    }
}

impl fmt::Display for MergeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "structured" | "json" => Ok(Self::Structured),
            "line-append-dedup" | "env" => Ok(Self::LineAppendDedup),
            "replace" => Ok(Self::Replace),
            "write" => Ok(Self::Write),
            _ => Err(DomainError::InvalidParameter {
                name: "merge".into(),
                reason: format!(
                    "unknown merge strategy '{s}'; \
                     expected structured, line-append-dedup, replace or write"
                ),
            }),
        }
    }
}
