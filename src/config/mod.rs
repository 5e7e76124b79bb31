//! # Orchestrator Configuration
//!
//! Typed configuration for how domains are ordered, how validation failures
//! propagate and which middleware layers wrap every handler.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use domain_orchestrator::config::OrchestratorConfig;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Defaults, then the file, then DOMAIN_ORCH__* environment overrides
//! let config = OrchestratorConfig::load(Some(Path::new("config/orchestrator.yaml")))?;
//! println!("ordering strategy: {}", config.strategy);
//! # Ok(())
//! # }
//! ```

pub mod loader;

use crate::error::{OrchestratorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use loader::ENV_PREFIX;

/// Which ordering strategy produces the domain execution order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Explicit numeric priority, lower runs first.
    #[default]
    Registry,
    /// Caller-specified insertion order.
    PriorityChain,
    /// Declared dependencies resolved by topological sort.
    DependencyGraph,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Registry => "registry",
            StrategyKind::PriorityChain => "priority_chain",
            StrategyKind::DependencyGraph => "dependency_graph",
        };
        f.write_str(name)
    }
}

/// What a validator does after recording a validation failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Record the failure and let the next validator run.
    #[default]
    Continue,
    /// Record the failure and halt the validate chain.
    Halt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiddlewareConfig {
    /// Wrap every handler with the logging middleware
    pub logging: bool,
    /// Collect per-handler execution counters
    pub metrics: bool,
    /// Convert handler panics into errors
    pub recovery: bool,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            logging: true,
            metrics: false,
            recovery: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Explicit filter directive; falls back to the environment default
    pub level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub strategy: StrategyKind,
    pub validation_policy: ValidationPolicy,
    pub middleware: MiddlewareConfig,
    /// Catch panics that escape a whole phase and report them as phase failures
    pub recover_phase_panics: bool,
    pub logging: LoggingConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            validation_policy: ValidationPolicy::default(),
            middleware: MiddlewareConfig::default(),
            recover_phase_panics: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_validation_policy(mut self, policy: ValidationPolicy) -> Self {
        self.validation_policy = policy;
        self
    }

    pub fn with_middleware(mut self, middleware: MiddlewareConfig) -> Self {
        self.middleware = middleware;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(level) = &self.logging.level {
            if level.trim().is_empty() {
                return Err(OrchestratorError::Configuration(
                    "logging.level must not be empty when set".to_string(),
                ));
            }
        }
        Ok(())
    }
}
