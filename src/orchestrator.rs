//! # Orchestrator
//!
//! Facade that turns one ordering strategy into three phase chains and runs
//! them, in order, over a fresh [`ProcessingContext`] per call.
//!
//! ```rust
//! use domain_orchestrator::config::OrchestratorConfig;
//! use domain_orchestrator::context::ProcessingContext;
//! use domain_orchestrator::domain::FnDomain;
//! use domain_orchestrator::handler::FnHandler;
//! use domain_orchestrator::orchestrator::Orchestrator;
//! use serde_json::json;
//!
//! # fn main() -> domain_orchestrator::Result<()> {
//! let service = FnDomain::new("service", 10)
//!     .with_parser(|| {
//!         FnHandler::new("service", |ctx: &ProcessingContext| {
//!             let name = ctx
//!                 .domain_section("service")
//!                 .and_then(|s| s.get("name"))
//!                 .and_then(|n| n.as_str())
//!                 .unwrap_or("unnamed")
//!                 .to_string();
//!             ctx.set_domain_model("service", name);
//!             Ok(())
//!         })
//!     })
//!     .shared();
//!
//! let mut orchestrator = Orchestrator::from_factories(OrchestratorConfig::default(), vec![service])?;
//! orchestrator.initialize()?;
//!
//! let ctx = orchestrator.process(json!({ "service": { "name": "api" } }))?;
//! let model = ctx.get_typed_domain_model::<String>("service")?.unwrap();
//! assert_eq!(model.as_str(), "api");
//! # Ok(())
//! # }
//! ```

use crate::chain::{Chain, ChainBuilder};
use crate::config::{OrchestratorConfig, StrategyKind};
use crate::context::{CancellationSignal, ProcessingContext};
use crate::domain::SharedFactory;
use crate::error::{OrchestratorError, Phase, Result};
use crate::middleware::recovery::panic_message;
use crate::middleware::MetricsCollector;
use crate::ordering::{DependencyGraph, DomainRegistry, OrderingStrategy, PriorityChain};
use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, error, info};

struct PhaseChains {
    parse: Chain,
    validate: Chain,
    generate: Chain,
}

impl PhaseChains {
    fn get(&self, phase: Phase) -> &Chain {
        match phase {
            Phase::Parse => &self.parse,
            Phase::Validate => &self.validate,
            Phase::Generate => &self.generate,
        }
    }
}

pub struct Orchestrator {
    config: OrchestratorConfig,
    strategy: Box<dyn OrderingStrategy>,
    metrics: MetricsCollector,
    chains: Option<PhaseChains>,
}

impl Orchestrator {
    pub fn new(config: OrchestratorConfig, strategy: Box<dyn OrderingStrategy>) -> Self {
        Self {
            config,
            strategy,
            metrics: MetricsCollector::new(),
            chains: None,
        }
    }

    /// Construct the strategy named by `config.strategy` from `factories`.
    ///
    /// For the priority chain the slice order is the execution order.
    pub fn from_factories(config: OrchestratorConfig, factories: Vec<SharedFactory>) -> Result<Self> {
        let strategy: Box<dyn OrderingStrategy> = match config.strategy {
            StrategyKind::Registry => {
                let registry = DomainRegistry::new();
                for factory in factories {
                    registry.register(factory)?;
                }
                Box::new(registry)
            }
            StrategyKind::PriorityChain => {
                let last = factories.len().saturating_sub(1);
                let chain = factories
                    .into_iter()
                    .enumerate()
                    .fold(PriorityChain::new(), |chain, (index, factory)| match index {
                        0 => chain.first(factory),
                        i if i == last => chain.finally(factory),
                        _ => chain.then(factory),
                    });
                Box::new(chain)
            }
            StrategyKind::DependencyGraph => Box::new(DependencyGraph::from_factories(factories)?),
        };
        Ok(Self::new(config, strategy))
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn strategy(&self) -> &dyn OrderingStrategy {
        self.strategy.as_ref()
    }

    /// Per-handler metrics, populated when `middleware.metrics` is enabled.
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub fn is_initialized(&self) -> bool {
        self.chains.is_some()
    }

    pub fn chain(&self, phase: Phase) -> Option<&Chain> {
        self.chains.as_ref().map(|chains| chains.get(phase))
    }

    fn chain_builder(&self) -> ChainBuilder {
        let mut builder = ChainBuilder::new();
        if self.config.middleware.recovery {
            builder = builder.with_recovery();
        }
        if self.config.middleware.metrics {
            builder = builder.with_metrics(self.metrics.clone());
        }
        if self.config.middleware.logging {
            builder = builder.with_logging();
        }
        builder
    }

    /// Validate the ordering and build the parse, validate and generate chains.
    pub fn initialize(&mut self) -> Result<()> {
        self.strategy.validate()?;

        let builder = self.chain_builder();
        let chains = PhaseChains {
            parse: self.strategy.build_chain(Phase::Parse, &builder)?,
            validate: self.strategy.build_chain(Phase::Validate, &builder)?,
            generate: self.strategy.build_chain(Phase::Generate, &builder)?,
        };

        info!(
            strategy = self.strategy.strategy_name(),
            parse_handlers = chains.parse.len(),
            validate_handlers = chains.validate.len(),
            generate_handlers = chains.generate.len(),
            "🔧 Orchestrator initialized"
        );

        self.chains = Some(chains);
        Ok(())
    }

    pub fn process(&self, raw_config: Value) -> Result<ProcessingContext> {
        self.process_with_cancellation(raw_config, CancellationSignal::new())
    }

    /// Run all three phases over a fresh context.
    ///
    /// Returns the first phase failure wrapped with the phase name. Validation
    /// errors recorded under the `Continue` policy do not fail the call; read
    /// them from the returned context.
    pub fn process_with_cancellation(
        &self,
        raw_config: Value,
        cancellation: CancellationSignal,
    ) -> Result<ProcessingContext> {
        let chains = self.chains.as_ref().ok_or(OrchestratorError::NotInitialized)?;
        let ctx = ProcessingContext::with_policy(raw_config, self.config.validation_policy)
            .with_cancellation(cancellation);

        let start = Instant::now();
        for phase in Phase::ALL {
            self.run_phase(phase, chains.get(phase), &ctx)?;
        }

        info!(
            run_id = %ctx.run_id(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            validation_errors = ctx.validation_error_count(),
            generated_files = ctx.generated_file_count(),
            "Processing complete"
        );

        Ok(ctx)
    }

    fn run_phase(&self, phase: Phase, chain: &Chain, ctx: &ProcessingContext) -> Result<()> {
        debug!(run_id = %ctx.run_id(), phase = %phase, handlers = chain.len(), "Phase started");
        let start = Instant::now();

        let result = if self.config.recover_phase_panics {
            catch_unwind(AssertUnwindSafe(|| chain.execute(ctx))).unwrap_or_else(|payload| {
                Err(OrchestratorError::HandlerPanic {
                    handler: format!("{phase} phase"),
                    message: panic_message(payload.as_ref()),
                })
            })
        } else {
            chain.execute(ctx)
        };

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        match result {
            Ok(()) => {
                debug!(run_id = %ctx.run_id(), phase = %phase, duration_ms, "Phase completed");
                Ok(())
            }
            Err(err) => {
                error!(
                    run_id = %ctx.run_id(),
                    phase = %phase,
                    duration_ms,
                    error = %err,
                    "Phase failed"
                );
                Err(OrchestratorError::phase_failed(phase, err))
            }
        }
    }
}
