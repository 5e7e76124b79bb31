//! # Ordering Strategies
//!
//! Three interchangeable ways to decide the order in which domains run. All of
//! them produce the same thing: an ordered list of enabled domain factories,
//! from which one handler chain per phase is built.
//!
//! ## Available Strategies
//!
//! - **DomainRegistry**: explicit numeric priority, ties broken by name
//! - **PriorityChain**: caller-specified fluent sequence
//! - **DependencyGraph**: declared dependencies resolved by topological sort
//!
//! ## Architecture
//!
//! ```text
//! OrderingStrategy
//! ├── ordered_factories()      (strategy-specific)
//! └── build_*_chain()          (factory → handler → ChainBuilder)
//! ```

pub mod graph;
pub mod priority_chain;
pub mod registry;

pub use graph::DependencyGraph;
pub use priority_chain::PriorityChain;
pub use registry::DomainRegistry;

use crate::chain::{Chain, ChainBuilder};
use crate::domain::{create_handler, SharedFactory};
use crate::error::{Phase, Result};
use tracing::debug;

pub trait OrderingStrategy: Send + Sync {
    fn strategy_name(&self) -> &'static str;

    /// Enabled factories in execution order.
    fn ordered_factories(&self) -> Result<Vec<SharedFactory>>;

    /// Structural checks run before any chain is built.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Builder used by the `build_*_chain` shortcuts.
    fn chain_builder(&self) -> ChainBuilder;

    /// Re-derive the order, map each factory to its handler for `phase`, drop
    /// absent handlers and link the rest.
    fn build_chain(&self, phase: Phase, builder: &ChainBuilder) -> Result<Chain> {
        let factories = self.ordered_factories()?;
        let chain = builder
            .clone()
            .scoped(phase.as_str())
            .link_optional(factories.iter().map(|factory| create_handler(factory.as_ref(), phase)));

        debug!(
            strategy = self.strategy_name(),
            phase = %phase,
            domains = factories.len(),
            handlers = chain.len(),
            "Phase chain built"
        );

        Ok(chain)
    }

    fn build_parse_chain(&self) -> Result<Chain> {
        self.build_chain(Phase::Parse, &self.chain_builder())
    }

    fn build_validate_chain(&self) -> Result<Chain> {
        self.build_chain(Phase::Validate, &self.chain_builder())
    }

    fn build_generate_chain(&self) -> Result<Chain> {
        self.build_chain(Phase::Generate, &self.chain_builder())
    }
}

/// Names of `factories` in order, mostly for logging and assertions.
pub fn factory_names(factories: &[SharedFactory]) -> Vec<String> {
    factories.iter().map(|f| f.name().to_string()).collect()
}
