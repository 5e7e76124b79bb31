//! End-to-end ordering scenarios shared by all three strategies.

mod common;

use common::*;
use domain_orchestrator::domain::FnDomain;
use domain_orchestrator::handler::FnHandler;
use domain_orchestrator::ordering::{factory_names, DependencyGraph, DomainRegistry, OrderingStrategy, PriorityChain};
use domain_orchestrator::OrchestratorError;

#[test]
fn test_registry_and_graph_agree_on_declared_order() {
    let registry = DomainRegistry::new();
    registry.register(tracing_domain("build", 30, &["service", "language"])).unwrap();
    registry.register(tracing_domain("service", 10, &[])).unwrap();
    registry.register(tracing_domain("language", 20, &["service"])).unwrap();

    let graph = DependencyGraph::from_factories(vec![
        tracing_domain("language", 20, &["service"]),
        tracing_domain("build", 30, &["service", "language"]),
        tracing_domain("service", 10, &[]),
    ])
    .unwrap();

    let expected = vec!["service", "language", "build"];
    assert_eq!(factory_names(&registry.ordered_factories().unwrap()), expected);
    assert_eq!(factory_names(&graph.ordered_factories().unwrap()), expected);
    assert_eq!(graph.build_parse_chain().unwrap().handler_names(), expected);
}

#[test]
fn test_three_cycle_builds_no_chain() {
    let graph = DependencyGraph::from_factories(vec![
        tracing_domain("a", 0, &["c"]),
        tracing_domain("b", 0, &["a"]),
        tracing_domain("c", 0, &["b"]),
    ])
    .unwrap();

    assert!(matches!(
        graph.validate(),
        Err(OrchestratorError::CircularDependency(_))
    ));
    assert!(matches!(
        graph.topological_sort(),
        Err(OrchestratorError::CircularDependency(_))
    ));
    for result in [
        graph.build_parse_chain(),
        graph.build_validate_chain(),
        graph.build_generate_chain(),
    ] {
        assert!(result.is_err());
    }
}

#[test]
fn test_cycle_among_subset_still_fails() {
    let graph = DependencyGraph::from_factories(vec![
        tracing_domain("service", 10, &[]),
        tracing_domain("plugin", 40, &["service", "runtime"]),
        tracing_domain("runtime", 50, &["plugin"]),
    ])
    .unwrap();

    assert_eq!(
        graph.topological_sort().unwrap_err(),
        OrchestratorError::CircularDependency(vec!["plugin".to_string(), "runtime".to_string()])
    );
}

#[test]
fn test_missing_validator_contributes_no_handler() {
    let without_validator = FnDomain::new("language", 20)
        .with_parser(|| FnHandler::pass_through("language"))
        .shared();
    let factories = vec![
        tracing_domain("service", 10, &[]),
        without_validator,
        tracing_domain("build", 30, &[]),
    ];

    let registry = DomainRegistry::new();
    let mut chain = PriorityChain::new();
    for factory in &factories {
        registry.register(factory.clone()).unwrap();
        chain = chain.then(factory.clone());
    }
    let graph = DependencyGraph::from_factories(factories.clone()).unwrap();

    let with_validators = factories
        .iter()
        .filter(|f| f.create_validator_handler().is_some())
        .count();
    assert_eq!(with_validators, 2);

    let strategies: Vec<Box<dyn OrderingStrategy>> =
        vec![Box::new(registry), Box::new(chain), Box::new(graph)];
    for strategy in strategies {
        let validate = strategy.build_validate_chain().unwrap();
        assert_eq!(validate.len(), with_validators, "{}", strategy.strategy_name());
        assert!(!validate.handler_names().contains(&"language".to_string()));
        assert_eq!(strategy.build_parse_chain().unwrap().len(), 3);
    }
}

#[test]
fn test_graph_order_is_independent_of_insertion_order() {
    let forward = DependencyGraph::from_factories(vec![
        tracing_domain("service", 10, &[]),
        tracing_domain("language", 20, &["service"]),
        tracing_domain("plugin", 40, &["service"]),
        tracing_domain("runtime", 50, &["language"]),
        tracing_domain("localdev", 60, &[]),
    ])
    .unwrap();
    let reverse = DependencyGraph::from_factories(vec![
        tracing_domain("localdev", 60, &[]),
        tracing_domain("runtime", 50, &["language"]),
        tracing_domain("plugin", 40, &["service"]),
        tracing_domain("language", 20, &["service"]),
        tracing_domain("service", 10, &[]),
    ])
    .unwrap();

    let first = factory_names(&forward.topological_sort().unwrap());
    let second = factory_names(&reverse.topological_sort().unwrap());
    assert_eq!(first, second);
    assert_eq!(first, vec!["localdev", "service", "language", "plugin", "runtime"]);
    assert_eq!(first, factory_names(&forward.topological_sort().unwrap()));
}

#[test]
fn test_priority_chain_ignores_priority_numbers() {
    let chain = PriorityChain::new()
        .first(tracing_domain("crossdomain", 999, &[]))
        .then_all(vec![
            tracing_domain("runtime", 50, &[]),
            tracing_domain("plugin", 40, &[]),
        ])
        .finally(tracing_domain("service", 10, &[]));

    chain.validate().unwrap();
    assert_eq!(
        chain.build_generate_chain().unwrap().handler_names(),
        vec!["crossdomain", "runtime", "plugin", "service"]
    );
}
