use proptest::prelude::*;

/// Strategy for generating domain names
pub fn domain_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

/// Node count plus, per node, candidate dependency indices.
///
/// Only edges to lower indices are kept when `acyclic` graphs are built, so
/// the result is a DAG by construction.
pub fn dag_strategy() -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1usize..12).prop_flat_map(|nodes| {
        prop::collection::vec(prop::collection::vec(0..nodes, 0..4), nodes)
    })
}

/// Edge lists where every node depends on lower-indexed nodes only.
pub fn acyclic_edges(raw: &[Vec<usize>]) -> Vec<Vec<usize>> {
    raw.iter()
        .enumerate()
        .map(|(index, candidates)| {
            let mut deps: Vec<usize> = candidates.iter().copied().filter(|d| *d < index).collect();
            deps.sort_unstable();
            deps.dedup();
            deps
        })
        .collect()
}

/// Stable node names that do not sort in index order.
pub fn node_name(index: usize) -> String {
    format!("d{:02}_{}", (index * 7) % 13, index)
}
