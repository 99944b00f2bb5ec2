//! Results returned by the resolver and the blueprint executor.
//!
//! Both are plain values handed back to the caller and never mutated by the
//! engine after they are returned.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::domain::value_objects::ModuleId;

/// A pair of modules that cannot be installed together.
///
/// A cycle is recorded as a conflict of a module with itself whose reason
/// spells out the loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub a: ModuleId,
    pub b: ModuleId,
    pub reason: String,
}

impl Conflict {
    pub fn new(a: ModuleId, b: ModuleId, reason: impl Into<String>) -> Self {
        Self {
            a,
            b,
            reason: reason.into(),
        }
    }

    pub fn is_cycle(&self) -> bool {
        self.a == self.b
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_cycle() {
            write!(f, "{}: {}", self.a, self.reason)
        } else {
            write!(f, "{} <-> {}: {}", self.a, self.b, self.reason)
        }
    }
}

/// Output of dependency resolution.
///
/// `order` is empty whenever `conflicts` is not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionResult {
    pub order: Vec<ModuleId>,
    pub conflicts: Vec<Conflict>,
    pub missing: Vec<ModuleId>,
}

impl ResolutionResult {
    pub fn is_ok(&self) -> bool {
        self.conflicts.is_empty() && self.missing.is_empty()
    }

    /// One human-readable line per defect.
    pub fn defects(&self) -> Vec<String> {
        self.conflicts
            .iter()
            .map(ToString::to_string)
            .chain(
                self.missing
                    .iter()
                    .map(|id| format!("module '{id}' is not registered")),
            )
            .collect()
    }
}

/// Output of one blueprint execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    /// Files written (or, in dry-run mode, that would be written).
    pub touched: Vec<PathBuf>,
    pub errors: Vec<String>,
    pub success: bool,
    /// Applications skipped because their condition was false.
    pub skipped: usize,
    /// Commands (including package installs) run or planned.
    pub commands_run: usize,
    /// Rendered command lines, in execution order.
    pub commands: Vec<String>,
}

impl ExecutionResult {
    pub(crate) fn finish(mut self) -> Self {
        self.success = self.errors.is_empty();
        self
    }

    /// Fold another result into this one (used for per-run summaries).
    pub fn absorb(&mut self, other: &ExecutionResult) {
        self.touched.extend(other.touched.iter().cloned());
        self.errors.extend(other.errors.iter().cloned());
        self.skipped += other.skipped;
        self.commands_run += other.commands_run;
        self.commands.extend(other.commands.iter().cloned());
        self.success = self.errors.is_empty();
    }
}
