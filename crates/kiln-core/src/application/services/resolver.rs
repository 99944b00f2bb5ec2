//! Dependency Resolver - computes a safe installation order.
//!
//! ## Algorithm
//!
//! 1. Requested ids the store does not know are recorded as missing
//! 2. Every unordered pair of present requested ids is checked for a
//!    declared conflict (either side may declare it)
//! 3. Depth-first post-order walk from each requested id, in request order,
//!    with three-state marking:
//!    - **unvisited**: not reached yet
//!    - **in progress**: on the current path; meeting one again is a cycle
//!    - **settled**: already placed in the order
//! 4. Pairs in the resolved set that involve a module pulled in as a
//!    dependency are checked the same way
//! 5. Any conflict (declared or cycle) clears the order
//!
//! ```text
//! auth ─depends─▶ db          request [auth]   order [db, auth]
//! ```
//!
//! The walk never fails and always terminates: cycles are recorded and the
//! walk continues past them.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument, warn};

use crate::{
    application::ports::ModuleStore,
    domain::{Conflict, ModuleDescriptor, ModuleId, ResolutionResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Settled,
}

/// Resolver over a borrowed module store.
pub struct DependencyResolver<'a> {
    store: &'a dyn ModuleStore,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(store: &'a dyn ModuleStore) -> Self {
        Self { store }
    }

    /// Order `requested` and their transitive dependencies.
    ///
    /// Deterministic for a given store and request order.
    #[instrument(skip_all, fields(requested = requested.len()))]
    pub fn resolve(&self, requested: &[ModuleId]) -> ResolutionResult {
        let mut walk = Walk::new(self);

        let mut present = Vec::new();
        for id in dedup(requested) {
            if walk.descriptor(id).is_some() {
                present.push(id.clone());
            } else {
                walk.record_missing(id);
            }
        }

        walk.detect_declared_conflicts(&present);

        for id in &present {
            walk.visit(id);
        }

        walk.detect_transitive_conflicts(&present);

        let mut result = walk.finish();
        if !result.conflicts.is_empty() {
            warn!(
                conflicts = result.conflicts.len(),
                "Conflicts found, no installation order produced"
            );
            result.order.clear();
        }
        debug!(order = ?result.order, missing = ?result.missing, "Resolution finished");
        result
    }
}

fn dedup(ids: &[ModuleId]) -> Vec<&ModuleId> {
    let mut seen = HashSet::new();
    ids.iter().filter(|id| seen.insert(*id)).collect()
}

/// State of one resolution.
struct Walk<'r, 'a> {
    resolver: &'r DependencyResolver<'a>,
    cache: HashMap<ModuleId, Option<ModuleDescriptor>>,
    marks: HashMap<ModuleId, Mark>,
    path: Vec<ModuleId>,
    result: ResolutionResult,
}

impl<'r, 'a> Walk<'r, 'a> {
    fn new(resolver: &'r DependencyResolver<'a>) -> Self {
        Self {
            resolver,
            cache: HashMap::new(),
            marks: HashMap::new(),
            path: Vec::new(),
            result: ResolutionResult::default(),
        }
    }

    /// Fetch once per resolution. Store errors count as absence.
    fn descriptor(&mut self, id: &ModuleId) -> Option<&ModuleDescriptor> {
        let store = self.resolver.store;
        self.cache
            .entry(id.clone())
            .or_insert_with(|| {
                if !store.contains(id) {
                    return None;
                }
                match store.get(id) {
                    Ok(module) => Some(module),
                    Err(e) => {
                        warn!(module = %id, error = %e, "Module lookup failed");
                        None
                    }
                }
            })
            .as_ref()
    }

    fn record_missing(&mut self, id: &ModuleId) {
        if !self.result.missing.contains(id) {
            self.result.missing.push(id.clone());
        }
    }

    fn detect_declared_conflicts(&mut self, present: &[ModuleId]) {
        for (i, a) in present.iter().enumerate() {
            for b in &present[i + 1..] {
                self.check_pair(a, b, "");
            }
        }
    }

    /// Requested pairs were checked before the walk; only pairs with a
    /// dependency on at least one side are new here.
    fn detect_transitive_conflicts(&mut self, present: &[ModuleId]) {
        let resolved = self.result.order.clone();
        for (i, a) in resolved.iter().enumerate() {
            for b in &resolved[i + 1..] {
                if present.contains(a) && present.contains(b) {
                    continue;
                }
                self.check_pair(a, b, " (pulled in as a dependency)");
            }
        }
    }

    fn check_pair(&mut self, a: &ModuleId, b: &ModuleId, note: &str) {
        let a_names_b = self.descriptor(a).is_some_and(|m| m.conflicts_with(b));
        let b_names_a = self.descriptor(b).is_some_and(|m| m.conflicts_with(a));
        if a_names_b || b_names_a {
            let declared_by = if a_names_b { a } else { b };
            self.result.conflicts.push(Conflict::new(
                a.clone(),
                b.clone(),
                format!("'{declared_by}' declares a conflict{note}"),
            ));
        }
    }

    fn visit(&mut self, id: &ModuleId) {
        match self.marks.get(id) {
            Some(Mark::Settled) => return,
            Some(Mark::InProgress) => {
                self.record_cycle(id);
                return;
            }
            None => {}
        }

        let Some(deps) = self.descriptor(id).map(|m| m.dependencies.clone()) else {
            self.record_missing(id);
            return;
        };

        self.marks.insert(id.clone(), Mark::InProgress);
        self.path.push(id.clone());

        for dep in &deps {
            if self.descriptor(dep).is_none() {
                self.record_missing(dep);
                continue;
            }
            self.visit(dep);
        }

        self.path.pop();
        self.marks.insert(id.clone(), Mark::Settled);
        self.result.order.push(id.clone());
    }

    fn record_cycle(&mut self, id: &ModuleId) {
        let start = self.path.iter().position(|p| p == id).unwrap_or(0);
        let mut names: Vec<&str> = self.path[start..].iter().map(ModuleId::as_str).collect();
        names.push(id.as_str());
        let reason = format!("circular dependency: {}", names.join(" -> "));

        warn!(module = %id, %reason, "Cycle detected");
        self.result
            .conflicts
            .push(Conflict::new(id.clone(), id.clone(), reason));
    }

    fn finish(self) -> ResolutionResult {
        self.result
    }
}
