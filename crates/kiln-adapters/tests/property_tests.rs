//! Property-based tests for resolution order and line merging.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use kiln_adapters::InMemoryRegistry;
use kiln_core::{domain::merge::append_unique_lines, prelude::*};

const MAX_MODULES: usize = 10;

fn id(i: usize) -> ModuleId {
    ModuleId::parse(&format!("m{i}")).unwrap()
}

// =============================================================================
// Dependency resolution
// =============================================================================

/// Module `i` may only depend on modules with a lower index, so every
/// generated graph is acyclic.
fn acyclic_graph() -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1..=MAX_MODULES).prop_flat_map(|n| {
        (0..n)
            .map(|i| proptest::sample::subsequence((0..i).collect::<Vec<_>>(), 0..=i))
            .collect::<Vec<_>>()
    })
}

fn registry(graph: &[Vec<usize>]) -> InMemoryRegistry {
    let modules = graph.iter().enumerate().map(|(i, deps)| {
        deps.iter()
            .fold(
                ModuleDescriptor::builder(id(i)).metadata(ModuleMetadata::new(format!("m{i}"))),
                |builder, &d| builder.depends_on(id(d)),
            )
            .build()
            .unwrap()
    });
    let registry = InMemoryRegistry::new();
    registry.extend(modules).unwrap();
    registry
}

fn graph_and_request() -> impl Strategy<Value = (Vec<Vec<usize>>, Vec<usize>)> {
    acyclic_graph().prop_flat_map(|graph| {
        let n = graph.len();
        let request = proptest::collection::vec(0..n, 1..=n);
        (Just(graph), request)
    })
}

proptest! {
    /// Every module comes after all of its dependencies, exactly once.
    #[test]
    fn dependencies_precede_dependents((graph, request) in graph_and_request()) {
        let registry = registry(&graph);
        let requested: Vec<ModuleId> = request.iter().map(|&i| id(i)).collect();

        let result = DependencyResolver::new(&registry).resolve(&requested);
        prop_assert!(result.is_ok(), "{:?}", result);

        let position: HashMap<&ModuleId, usize> =
            result.order.iter().enumerate().map(|(p, m)| (m, p)).collect();
        prop_assert_eq!(position.len(), result.order.len());

        for m in &requested {
            prop_assert!(position.contains_key(m));
        }
        for m in &result.order {
            let index: usize = m.as_str()[1..].parse().unwrap();
            for &dep in &graph[index] {
                let dep_position = position.get(&id(dep));
                prop_assert!(dep_position.is_some(), "{} missing from order", id(dep));
                prop_assert!(dep_position < position.get(m));
            }
        }
    }

    /// The same request always yields the same order.
    #[test]
    fn resolution_is_deterministic((graph, request) in graph_and_request()) {
        let registry = registry(&graph);
        let requested: Vec<ModuleId> = request.iter().map(|&i| id(i)).collect();
        let resolver = DependencyResolver::new(&registry);

        prop_assert_eq!(resolver.resolve(&requested), resolver.resolve(&requested));
    }
}

// =============================================================================
// Line append with dedup
// =============================================================================

fn env_line() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[A-Z_]{1,6}=[a-z0-9]{0,4}",
        1 => Just(String::new()),
        1 => "# [a-z ]{0,8}",
    ]
}

fn env_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(env_line(), 0..8).prop_map(|lines| lines.join("\n"))
}

fn keys(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| l.split('=').next().unwrap_or(l).trim().to_string())
        .collect()
}

proptest! {
    /// Existing text is kept, no key appears twice, and a second append is a no-op.
    #[test]
    fn line_dedup_keeps_keys_unique(seed in env_text(), incoming in env_text()) {
        // Start from a file whose keys are already unique.
        let existing = append_unique_lines("", &seed);
        let once = append_unique_lines(&existing, &incoming);

        prop_assert!(once.starts_with(&existing));

        let merged = keys(&once);
        let unique: HashSet<&String> = merged.iter().collect();
        prop_assert_eq!(unique.len(), merged.len(), "duplicate key in {:?}", once);

        for key in keys(&incoming) {
            prop_assert!(unique.contains(&key), "{} was dropped", key);
        }

        prop_assert_eq!(append_unique_lines(&once, &incoming), once);
    }
}
