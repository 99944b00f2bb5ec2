//! File merge strategies.
//!
//! Every function here is pure: it takes what is on disk (if anything) and
//! the rendered content, and returns what should be on disk afterwards.
//! Applying the same input twice yields the same output as applying it once.

use std::collections::HashSet;
use std::path::Path;

use serde_json::{Map, Value};

use crate::domain::{
    entities::action::ContentModifier, error::MergeError, value_objects::MergeKind,
};

impl MergeKind {
    /// Combine `rendered` with the current file content.
    ///
    /// Errors carry an empty path; callers attach one with [`MergeError::at`].
    pub fn apply(self, existing: Option<&str>, rendered: &str) -> Result<String, MergeError> {
        match self {
            Self::Structured => merge_structured(existing, rendered),
            Self::LineAppendDedup => {
                Ok(append_unique_lines(existing.unwrap_or_default(), rendered))
            }
            Self::Replace | Self::Write => Ok(rendered.to_string()),
        }
    }
}

impl MergeError {
    /// Attach the target path to a path-less error.
    pub fn at(self, path: &Path) -> Self {
        let shown = path.display().to_string();
        match self {
            Self::Unparsable { reason, .. } => Self::Unparsable {
                path: shown,
                reason,
            },
            Self::NotAnObject { .. } => Self::NotAnObject { path: shown },
            Self::AnchorNotFound { anchor, .. } => Self::AnchorNotFound {
                path: shown,
                anchor,
            },
            other => other,
        }
    }
}

// ── Structured ───────────────────────────────────────────────────────────────

fn merge_structured(existing: Option<&str>, rendered: &str) -> Result<String, MergeError> {
    let incoming: Value = serde_json::from_str(rendered).map_err(|e| MergeError::Unparsable {
        path: String::new(),
        reason: format!("rendered content is not JSON: {e}"),
    })?;
    if !incoming.is_object() {
        return Err(MergeError::NotAnObject {
            path: String::new(),
        });
    }

    let mut base = match existing.map(str::trim) {
        None | Some("") => Value::Object(Map::new()),
        Some(text) => serde_json::from_str(text).map_err(|e| MergeError::Unparsable {
            path: String::new(),
            reason: e.to_string(),
        })?,
    };

    deep_merge(&mut base, incoming);

    let mut out =
        serde_json::to_string_pretty(&base).map_err(|e| MergeError::Serialize(e.to_string()))?;
    out.push('\n');
    Ok(out)
}

/// Recursive object merge; incoming leaves win, non-objects are replaced.
pub fn deep_merge(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(target_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                match target_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (target, incoming) => *target = incoming,
    }
}

// ── Line append with dedup ───────────────────────────────────────────────────

/// Key of a `KEY=value` line: text before the first `=`, trimmed.
fn line_key(line: &str) -> &str {
    line.split_once('=').map_or(line, |(k, _)| k).trim()
}

fn is_entry(line: &str) -> bool {
    let t = line.trim();
    !t.is_empty() && !t.starts_with('#')
}

/// Append the lines of `incoming` whose keys `existing` does not have yet.
///
/// Blank lines and `#` comments in `incoming` are ignored. `existing` is
/// kept byte for byte.
pub fn append_unique_lines(existing: &str, incoming: &str) -> String {
    let mut keys: HashSet<&str> = existing.lines().filter(|l| is_entry(l)).map(line_key).collect();

    let additions: Vec<&str> = incoming
        .lines()
        .filter(|l| is_entry(l))
        .filter(|&l| keys.insert(line_key(l)))
        .collect();

    if additions.is_empty() {
        return existing.to_string();
    }

    let mut out = existing.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    for line in additions {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

// ── Block append ─────────────────────────────────────────────────────────────

/// Append `block` unless it already occurs in `existing`.
pub fn append_block(existing: &str, block: &str) -> String {
    let needle = block.trim_end();
    if needle.is_empty() || existing.contains(needle) {
        return existing.to_string();
    }

    let mut out = existing.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(needle);
    out.push('\n');
    out
}

// ── In-place modifiers ───────────────────────────────────────────────────────

impl ContentModifier {
    /// Apply the edit. Returns `existing` unchanged when the edit is
    /// already present.
    pub fn apply(&self, existing: &str) -> Result<String, MergeError> {
        match self {
            Self::InsertAfter { anchor, content } => {
                if existing.contains(content.trim_end()) {
                    return Ok(existing.to_string());
                }
                let at = find_anchor(existing, anchor)?;
                let mut out = existing.to_string();
                match existing[at..].find('\n') {
                    Some(nl) => out.insert_str(at + nl + 1, &with_newline(content)),
                    None => {
                        out.push('\n');
                        out.push_str(&with_newline(content));
                    }
                }
                Ok(out)
            }
            Self::InsertBefore { anchor, content } => {
                if existing.contains(content.trim_end()) {
                    return Ok(existing.to_string());
                }
                let at = find_anchor(existing, anchor)?;
                let line_start = existing[..at].rfind('\n').map_or(0, |n| n + 1);
                let mut out = existing.to_string();
                out.insert_str(line_start, &with_newline(content));
                Ok(out)
            }
            Self::ReplaceText { find, replace } => {
                if !replace.is_empty() && existing.contains(replace.as_str()) {
                    return Ok(existing.to_string());
                }
                // A removal that already happened leaves nothing to find.
                if replace.is_empty() && !find.is_empty() && !existing.contains(find.as_str()) {
                    return Ok(existing.to_string());
                }
                find_anchor(existing, find)?;
                Ok(existing.replace(find.as_str(), replace))
            }
            Self::Prepend { content } => {
                if existing.starts_with(content.trim_end()) {
                    return Ok(existing.to_string());
                }
                Ok(format!("{}{}", with_newline(content), existing))
            }
        }
    }
}

fn find_anchor(haystack: &str, anchor: &str) -> Result<usize, MergeError> {
    haystack
        .find(anchor)
        .filter(|_| !anchor.is_empty())
        .ok_or_else(|| MergeError::AnchorNotFound {
            path: String::new(),
            anchor: anchor.to_string(),
        })
}

fn with_newline(s: &str) -> String {
    let mut s = s.trim_end_matches('\n').to_string();
    s.push('\n');
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_merge_into_missing_file() {
        let out = MergeKind::Structured
            .apply(None, r#"{"scripts": {"db": "prisma studio"}}"#)
            .unwrap();
        assert_eq!(out, "{\n  \"scripts\": {\n    \"db\": \"prisma studio\"\n  }\n}\n");
    }

    #[test]
    fn structured_merge_keeps_existing_keys() {
        let existing = r#"{"name": "app", "scripts": {"dev": "next dev"}}"#;
        let out = MergeKind::Structured
            .apply(Some(existing), r#"{"scripts": {"db": "prisma studio"}}"#)
            .unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["name"], "app");
        assert_eq!(value["scripts"]["dev"], "next dev");
        assert_eq!(value["scripts"]["db"], "prisma studio");
    }

    #[test]
    fn structured_merge_is_a_fixed_point() {
        let rendered = r#"{"compilerOptions": {"paths": {"@/*": ["./src/*"]}}}"#;
        let once = MergeKind::Structured.apply(Some("{}"), rendered).unwrap();
        let twice = MergeKind::Structured.apply(Some(&once), rendered).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn structured_leaves_and_arrays_are_replaced() {
        let out = MergeKind::Structured
            .apply(Some(r#"{"a": [1, 2], "b": {"c": 1}}"#), r#"{"a": [3], "b": 5}"#)
            .unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, serde_json::json!({"a": [3], "b": 5}));
    }

    #[test]
    fn structured_rejects_bad_input() {
        assert!(matches!(
            MergeKind::Structured.apply(Some("{ not json"), "{}"),
            Err(MergeError::Unparsable { .. })
        ));
        assert!(matches!(
            MergeKind::Structured.apply(None, "[1]"),
            Err(MergeError::NotAnObject { .. })
        ));
    }

    #[test]
    fn error_path_is_attached() {
        let err = MergeKind::Structured
            .apply(None, "nope")
            .unwrap_err()
            .at(Path::new("package.json"));
        assert!(err.to_string().contains("package.json"));
    }

    #[test]
    fn env_dedup_appends_new_keys_only() {
        let existing = "# db\nDATABASE_URL=postgres://a\n";
        let out = MergeKind::LineAppendDedup
            .apply(
                Some(existing),
                "DATABASE_URL=postgres://b\n\n# auth\nAUTH_SECRET=x\n",
            )
            .unwrap();
        assert_eq!(out, "# db\nDATABASE_URL=postgres://a\nAUTH_SECRET=x\n");

        let again = MergeKind::LineAppendDedup
            .apply(Some(&out), "DATABASE_URL=postgres://b\nAUTH_SECRET=x\n")
            .unwrap();
        assert_eq!(again, out);
    }

    #[test]
    fn env_dedup_terminates_unterminated_existing() {
        let out = append_unique_lines("A=1", "B = 2");
        assert_eq!(out, "A=1\nB = 2\n");
        assert_eq!(append_unique_lines("A=1", " A =9"), "A=1");
    }

    #[test]
    fn write_is_verbatim_and_stable() {
        let first = MergeKind::Write.apply(None, r#"{"a":1}"#).unwrap();
        let second = MergeKind::Write.apply(Some(&first), r#"{"a":1}"#).unwrap();
        assert_eq!(second, r#"{"a":1}"#);
    }

    #[test]
    fn block_append_is_idempotent() {
        let once = append_block("node_modules\n", ".env\n.env.local\n");
        assert_eq!(once, "node_modules\n.env\n.env.local\n");
        assert_eq!(append_block(&once, ".env\n.env.local\n"), once);
    }

    #[test]
    fn insert_after_anchor_line() {
        let m = ContentModifier::InsertAfter {
            anchor: "// imports".into(),
            content: "import { db } from './db';".into(),
        };
        let src = "// imports\nexport default {};\n";
        let out = m.apply(src).unwrap();
        assert_eq!(out, "// imports\nimport { db } from './db';\nexport default {};\n");
        assert_eq!(m.apply(&out).unwrap(), out);
    }

    #[test]
    fn insert_before_anchor_line() {
        let m = ContentModifier::InsertBefore {
            anchor: "export default".into(),
            content: "const x = 1;".into(),
        };
        let out = m.apply("import a;\nexport default x;").unwrap();
        assert_eq!(out, "import a;\nconst x = 1;\nexport default x;");
    }

    #[test]
    fn missing_anchor_is_an_error() {
        let m = ContentModifier::InsertAfter {
            anchor: "nowhere".into(),
            content: "x".into(),
        };
        assert!(matches!(
            m.apply("abc"),
            Err(MergeError::AnchorNotFound { .. })
        ));
    }

    #[test]
    fn replace_and_prepend_are_idempotent() {
        let r = ContentModifier::ReplaceText {
            find: "provider = \"sqlite\"".into(),
            replace: "provider = \"postgresql\"".into(),
        };
        let out = r.apply("provider = \"sqlite\"\n").unwrap();
        assert_eq!(out, "provider = \"postgresql\"\n");
        assert_eq!(r.apply(&out).unwrap(), out);

        let p = ContentModifier::Prepend {
            content: "'use client';".into(),
        };
        let out = p.apply("export {}\n").unwrap();
        assert_eq!(out, "'use client';\nexport {}\n");
        assert_eq!(p.apply(&out).unwrap(), out);
    }

    #[test]
    fn removal_is_idempotent() {
        let r = ContentModifier::ReplaceText {
            find: "DEBUG=1\n".into(),
            replace: String::new(),
        };
        let once = r.apply("A=1\nDEBUG=1\n").unwrap();
        assert_eq!(once, "A=1\n");
        assert_eq!(r.apply(&once).unwrap(), once);
    }
}
