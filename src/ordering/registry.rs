//! # Domain Registry
//!
//! Factories keyed by name and ordered on demand by explicit priority.
//!
//! The registry never consults declared dependencies, so priority numbers are
//! the only ordering signal. Callers pick numbers consistent with the intended
//! order, e.g. `service = 10`, `language = 20`, `build = 30`,
//! `crossdomain = 999` to always run last.

use super::OrderingStrategy;
use crate::chain::ChainBuilder;
use crate::domain::SharedFactory;
use crate::error::{OrchestratorError, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info};

pub struct DomainRegistry {
    factories: DashMap<String, SharedFactory>,
    builder: ChainBuilder,
}

impl Default for DomainRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainRegistry {
    /// New registry whose chains wrap every handler with logging.
    pub fn new() -> Self {
        Self {
            factories: DashMap::new(),
            builder: ChainBuilder::new().with_logging(),
        }
    }

    pub fn with_chain_builder(mut self, builder: ChainBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn register(&self, factory: SharedFactory) -> Result<()> {
        let name = factory.name().to_string();
        match self.factories.entry(name.clone()) {
            Entry::Occupied(_) => Err(OrchestratorError::DuplicateDomain(name)),
            Entry::Vacant(slot) => {
                info!(
                    domain = %name,
                    priority = factory.priority(),
                    enabled = factory.is_enabled(),
                    "Registered domain"
                );
                slot.insert(factory);
                Ok(())
            }
        }
    }

    pub fn unregister(&self, name: &str) -> Option<SharedFactory> {
        let removed = self.factories.remove(name).map(|(_, factory)| factory);
        if removed.is_some() {
            debug!(domain = %name, "Unregistered domain");
        }
        removed
    }

    pub fn get(&self, name: &str) -> Option<SharedFactory> {
        self.factories.get(name).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Enabled factories sorted by `(priority, name)`.
    pub fn sorted_factories(&self) -> Vec<SharedFactory> {
        let mut enabled: Vec<SharedFactory> = self
            .factories
            .iter()
            .filter(|entry| entry.value().is_enabled())
            .map(|entry| entry.value().clone())
            .collect();
        enabled.sort_by(|a, b| {
            a.priority()
                .cmp(&b.priority())
                .then_with(|| a.name().cmp(b.name()))
        });
        enabled
    }
}

impl OrderingStrategy for DomainRegistry {
    fn strategy_name(&self) -> &'static str {
        "registry"
    }

    fn ordered_factories(&self) -> Result<Vec<SharedFactory>> {
        Ok(self.sorted_factories())
    }

    fn chain_builder(&self) -> ChainBuilder {
        self.builder.clone()
    }
}
