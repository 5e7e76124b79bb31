//! # Priority Chain
//!
//! Fluent, caller-specified ordering:
//!
//! ```rust
//! use domain_orchestrator::domain::FnDomain;
//! use domain_orchestrator::ordering::{OrderingStrategy, PriorityChain};
//!
//! let chain = PriorityChain::new()
//!     .first(FnDomain::new("service", 0).shared())
//!     .then_all(vec![
//!         FnDomain::new("plugin", 0).shared(),
//!         FnDomain::new("runtime", 0).shared(),
//!     ])
//!     .finally(FnDomain::new("crossdomain", 0).shared());
//!
//! chain.validate().unwrap();
//! assert_eq!(chain.len(), 4);
//! assert_eq!(chain.groups().len(), 3);
//! ```
//!
//! `then_all` records a group of logically independent domains. Members of a
//! group still execute one after another in the order given; the grouping is
//! kept so an executor that fans out independent domains can use it.

use super::OrderingStrategy;
use crate::chain::ChainBuilder;
use crate::domain::SharedFactory;
use crate::error::{OrchestratorError, Result};
use std::collections::{HashMap, HashSet};

#[derive(Default)]
pub struct PriorityChain {
    ordered: Vec<SharedFactory>,
    lookup: HashMap<String, SharedFactory>,
    groups: Vec<Vec<String>>,
    builder: ChainBuilder,
}

impl PriorityChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain_builder(mut self, builder: ChainBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn first(self, factory: SharedFactory) -> Self {
        self.push_group(vec![factory])
    }

    pub fn then(self, factory: SharedFactory) -> Self {
        self.push_group(vec![factory])
    }

    /// Append domains that do not depend on each other, run in the given order.
    pub fn then_all(self, factories: Vec<SharedFactory>) -> Self {
        self.push_group(factories)
    }

    pub fn finally(self, factory: SharedFactory) -> Self {
        self.push_group(vec![factory])
    }

    fn push_group(mut self, factories: Vec<SharedFactory>) -> Self {
        if factories.is_empty() {
            return self;
        }
        let mut group = Vec::with_capacity(factories.len());
        for factory in factories {
            let name = factory.name().to_string();
            self.lookup.entry(name.clone()).or_insert_with(|| factory.clone());
            self.ordered.push(factory);
            group.push(name);
        }
        self.groups.push(group);
        self
    }

    pub fn get(&self, name: &str) -> Option<SharedFactory> {
        self.lookup.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Domain names per appended group, in insertion order.
    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }
}

impl OrderingStrategy for PriorityChain {
    fn strategy_name(&self) -> &'static str {
        "priority_chain"
    }

    fn ordered_factories(&self) -> Result<Vec<SharedFactory>> {
        Ok(self
            .ordered
            .iter()
            .filter(|factory| factory.is_enabled())
            .cloned()
            .collect())
    }

    fn validate(&self) -> Result<()> {
        if self.ordered.is_empty() {
            return Err(OrchestratorError::EmptyChain);
        }
        let mut seen = HashSet::new();
        for factory in &self.ordered {
            if !seen.insert(factory.name()) {
                return Err(OrchestratorError::DuplicateChainEntry(
                    factory.name().to_string(),
                ));
            }
        }
        Ok(())
    }

    fn chain_builder(&self) -> ChainBuilder {
        self.builder.clone()
    }
}
