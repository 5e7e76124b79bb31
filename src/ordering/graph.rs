//! # Dependency Graph
//!
//! Orders domains by their declared dependencies using Kahn's algorithm.
//!
//! Among nodes that become ready at the same time the lexicographically
//! smallest name always goes first, so the same graph yields the same order on
//! every run regardless of insertion order. Disabled nodes still take part in
//! the traversal (they unblock their dependents) but are not emitted.

use super::OrderingStrategy;
use crate::chain::ChainBuilder;
use crate::domain::SharedFactory;
use crate::error::{OrchestratorError, Result};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

struct GraphNode {
    factory: SharedFactory,
    dependencies: BTreeSet<String>,
    dependents: BTreeSet<String>,
}

#[derive(Default)]
pub struct DependencyGraph {
    nodes: HashMap<String, GraphNode>,
    builder: ChainBuilder,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain_builder(mut self, builder: ChainBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Build a graph from factories using each factory's declared dependencies.
    pub fn from_factories<I>(factories: I) -> Result<Self>
    where
        I: IntoIterator<Item = SharedFactory>,
    {
        let mut graph = Self::new();
        for factory in factories {
            let dependencies = factory.dependencies();
            graph.add_node(factory, dependencies)?;
        }
        Ok(graph)
    }

    /// Insert a node and wire its edges in both directions.
    ///
    /// Dependencies on nodes that are not present yet are accepted here and
    /// reported by [`DependencyGraph::validate`] if they never appear.
    pub fn add_node<I, S>(&mut self, factory: SharedFactory, dependencies: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = factory.name().to_string();
        if self.nodes.contains_key(&name) {
            return Err(OrchestratorError::DuplicateDomain(name));
        }

        let dependencies: BTreeSet<String> = dependencies.into_iter().map(Into::into).collect();

        for dependency in &dependencies {
            if let Some(node) = self.nodes.get_mut(dependency) {
                node.dependents.insert(name.clone());
            }
        }

        // Back-fill edges from nodes added earlier that declared this one
        let dependents: BTreeSet<String> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.dependencies.contains(&name))
            .map(|(other, _)| other.clone())
            .collect();

        debug!(
            domain = %name,
            dependencies = ?dependencies,
            "Added dependency graph node"
        );

        self.nodes.insert(
            name,
            GraphNode {
                factory,
                dependencies,
                dependents,
            },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn dependencies_of(&self, name: &str) -> Option<Vec<String>> {
        self.nodes
            .get(name)
            .map(|node| node.dependencies.iter().cloned().collect())
    }

    /// Names of nodes that declared `name` as a dependency, sorted.
    pub fn dependents_of(&self, name: &str) -> Option<Vec<String>> {
        self.nodes
            .get(name)
            .map(|node| node.dependents.iter().cloned().collect())
    }

    fn check_dependencies_resolve(&self) -> Result<()> {
        let mut names: Vec<&String> = self.nodes.keys().collect();
        names.sort();
        for name in names {
            let node = &self.nodes[name];
            if let Some(missing) = node
                .dependencies
                .iter()
                .find(|dependency| !self.nodes.contains_key(*dependency))
            {
                return Err(OrchestratorError::UnknownDependency {
                    domain: name.clone(),
                    dependency: missing.clone(),
                });
            }
        }
        Ok(())
    }

    /// Every declared dependency resolves and the graph has no cycle among
    /// enabled nodes.
    pub fn validate(&self) -> Result<()> {
        self.check_dependencies_resolve()?;
        self.topological_sort().map(|_| ())
    }

    fn in_degrees(&self) -> HashMap<&str, usize> {
        self.nodes
            .iter()
            .map(|(name, node)| (name.as_str(), node.dependencies.len()))
            .collect()
    }

    fn enabled_count(&self) -> usize {
        self.nodes
            .values()
            .filter(|node| node.factory.is_enabled())
            .count()
    }

    fn cycle_error(&self, emitted: &[SharedFactory]) -> OrchestratorError {
        let emitted: BTreeSet<&str> = emitted.iter().map(|f| f.name()).collect();
        let mut blocked: Vec<String> = self
            .nodes
            .iter()
            .filter(|(name, node)| node.factory.is_enabled() && !emitted.contains(name.as_str()))
            .map(|(name, _)| name.clone())
            .collect();
        blocked.sort();
        warn!(blocked = ?blocked, "Circular dependency detected");
        OrchestratorError::CircularDependency(blocked)
    }

    /// Enabled factories in dependency order.
    ///
    /// Fails without a partial result when an enabled node can never become
    /// ready.
    pub fn topological_sort(&self) -> Result<Vec<SharedFactory>> {
        self.check_dependencies_resolve()?;

        let mut in_degree = self.in_degrees();
        let mut ready: BTreeSet<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(name, _)| *name)
            .collect();

        let mut ordered = Vec::with_capacity(self.nodes.len());
        while let Some(name) = ready.pop_first() {
            let node = &self.nodes[name];
            if node.factory.is_enabled() {
                ordered.push(node.factory.clone());
            }
            for dependent in &node.dependents {
                if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        ready.insert(dependent.as_str());
                    }
                }
            }
        }

        if ordered.len() < self.enabled_count() {
            return Err(self.cycle_error(&ordered));
        }
        Ok(ordered)
    }

    /// Enabled factories grouped by depth: every member of a level depends
    /// only on members of earlier levels. Each level is sorted by name.
    pub fn execution_levels(&self) -> Result<Vec<Vec<SharedFactory>>> {
        self.check_dependencies_resolve()?;

        let mut in_degree = self.in_degrees();
        let mut current: BTreeSet<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(name, _)| *name)
            .collect();

        let mut levels = Vec::new();
        let mut emitted = Vec::new();
        while !current.is_empty() {
            let mut next = BTreeSet::new();
            let mut level = Vec::new();
            for name in &current {
                let node = &self.nodes[*name];
                if node.factory.is_enabled() {
                    level.push(node.factory.clone());
                }
                for dependent in &node.dependents {
                    if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                        *degree = degree.saturating_sub(1);
                        if *degree == 0 {
                            next.insert(dependent.as_str());
                        }
                    }
                }
            }
            if !level.is_empty() {
                emitted.extend(level.iter().cloned());
                levels.push(level);
            }
            current = next;
        }

        if emitted.len() < self.enabled_count() {
            return Err(self.cycle_error(&emitted));
        }
        Ok(levels)
    }
}

impl OrderingStrategy for DependencyGraph {
    fn strategy_name(&self) -> &'static str {
        "dependency_graph"
    }

    /// Re-runs the full sort on every call.
    fn ordered_factories(&self) -> Result<Vec<SharedFactory>> {
        self.topological_sort()
    }

    fn validate(&self) -> Result<()> {
        DependencyGraph::validate(self)
    }

    fn chain_builder(&self) -> ChainBuilder {
        self.builder.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FnDomain;
    use crate::handler::FnHandler;
    use crate::ordering::factory_names;

    fn domain(name: &str) -> SharedFactory {
        let handler_name = name.to_string();
        FnDomain::new(name, 0)
            .with_parser(move || FnHandler::pass_through(handler_name.clone()))
            .shared()
    }

    fn graph(edges: &[(&str, &[&str])]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (name, dependencies) in edges {
            graph
                .add_node(domain(name), dependencies.iter().copied())
                .unwrap();
        }
        graph
    }

    #[test]
    fn test_dependencies_come_first() {
        let graph = graph(&[
            ("build", &["service", "language"]),
            ("language", &["service"]),
            ("service", &[]),
        ]);
        assert_eq!(
            factory_names(&graph.topological_sort().unwrap()),
            vec!["service", "language", "build"]
        );
    }

    #[test]
    fn test_ready_nodes_break_ties_by_name() {
        let graph = graph(&[
            ("runtime", &["service"]),
            ("plugin", &["service"]),
            ("service", &[]),
            ("crossdomain", &["plugin", "runtime"]),
            ("language", &[]),
        ]);
        // language and service both start ready; language sorts first
        assert_eq!(
            factory_names(&graph.topological_sort().unwrap()),
            vec!["language", "service", "plugin", "runtime", "crossdomain"]
        );
    }

    #[test]
    fn test_dependents_are_back_filled_regardless_of_insertion_order() {
        let graph = graph(&[("language", &["service"]), ("service", &[])]);
        assert_eq!(
            graph.dependents_of("service").unwrap(),
            vec!["language".to_string()]
        );
        assert_eq!(
            graph.dependencies_of("language").unwrap(),
            vec!["service".to_string()]
        );
    }

    #[test]
    fn test_three_cycle_is_rejected() {
        let graph = graph(&[("a", &["c"]), ("b", &["a"]), ("c", &["b"])]);
        let expected = OrchestratorError::CircularDependency(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
        ]);
        assert_eq!(graph.validate().unwrap_err(), expected);
        assert_eq!(graph.topological_sort().unwrap_err(), expected);
        assert!(graph.build_parse_chain().is_err());
    }

    #[test]
    fn test_unknown_dependency_is_reported() {
        let graph = graph(&[("build", &["toolchain"])]);
        assert_eq!(
            graph.validate().unwrap_err(),
            OrchestratorError::UnknownDependency {
                domain: "build".to_string(),
                dependency: "toolchain".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_node_is_rejected() {
        let mut graph = graph(&[("service", &[])]);
        let err = graph
            .add_node(domain("service"), Vec::<String>::new())
            .unwrap_err();
        assert_eq!(err, OrchestratorError::DuplicateDomain("service".to_string()));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_disabled_node_unblocks_dependents_without_being_emitted() {
        let mut graph = graph(&[("build", &["localdev"])]);
        graph
            .add_node(
                FnDomain::new("localdev", 0).enabled(false).shared(),
                Vec::<String>::new(),
            )
            .unwrap();
        assert_eq!(factory_names(&graph.topological_sort().unwrap()), vec!["build"]);
    }

    #[test]
    fn test_from_factories_uses_declared_dependencies() {
        let graph = DependencyGraph::from_factories(vec![
            FnDomain::new("build", 30).depends_on(["service"]).shared(),
            FnDomain::new("service", 10).shared(),
        ])
        .unwrap();
        assert_eq!(
            factory_names(&graph.topological_sort().unwrap()),
            vec!["service", "build"]
        );
    }

    #[test]
    fn test_execution_levels() {
        let graph = graph(&[
            ("service", &[]),
            ("language", &["service"]),
            ("plugin", &["service"]),
            ("build", &["language", "plugin"]),
        ]);
        let levels: Vec<Vec<String>> = graph
            .execution_levels()
            .unwrap()
            .iter()
            .map(|level| factory_names(level))
            .collect();
        assert_eq!(
            levels,
            vec![
                vec!["service".to_string()],
                vec!["language".to_string(), "plugin".to_string()],
                vec!["build".to_string()],
            ]
        );
    }

    #[test]
    fn test_empty_graph_sorts_to_nothing() {
        let graph = DependencyGraph::new();
        assert!(graph.topological_sort().unwrap().is_empty());
        assert!(graph.build_generate_chain().unwrap().is_empty());
    }
}
