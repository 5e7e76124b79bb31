#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Domain Orchestrator
//!
//! Chain-of-responsibility core that runs a raw configuration document through
//! independently registered domains in three phases: parse, validate and
//! generate.
//!
//! ## Overview
//!
//! Each domain (service, language, build, plugin, runtime, ...) plugs in as a
//! [`DomainFactory`](domain::DomainFactory) that may produce one handler per
//! phase. An ordering strategy decides the domain order, the chain builder
//! links the handlers, and the orchestrator executes the three chains over a
//! shared [`ProcessingContext`](context::ProcessingContext).
//!
//! ## Module Organization
//!
//! - [`handler`] - Handler trait and phase-specific variants
//! - [`context`] - Concurrency-safe state shared by every handler
//! - [`domain`] - Domain factory contract
//! - [`chain`] - Chain linking and middleware layering
//! - [`ordering`] - Registry, priority chain and dependency graph strategies
//! - [`middleware`] - Logging, metrics and panic recovery decorators
//! - [`orchestrator`] - Initialize + process facade
//! - [`config`] - Configuration loading
//! - [`error`] - Structured error handling
//! - [`logging`] - Tracing subscriber setup
//!
//! ## Failure Semantics
//!
//! A handler returning an error halts its phase immediately and the caller
//! receives the error wrapped with the phase name. Validation failures are
//! recorded in the context and, under the default
//! [`ValidationPolicy::Continue`](config::ValidationPolicy), do not stop the
//! chain.
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests
//! ```

pub mod chain;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod handler;
pub mod logging;
pub mod middleware;
pub mod orchestrator;
pub mod ordering;

pub use chain::{Chain, ChainBuilder};
pub use config::{OrchestratorConfig, StrategyKind, ValidationPolicy};
pub use context::{CancellationSignal, ProcessingContext};
pub use domain::{DomainFactory, FnDomain, SharedFactory};
pub use error::{OrchestratorError, Phase, Result};
pub use handler::{FnHandler, GeneratorHandler, Handler, HandlerLink, ParserHandler, ValidatorHandler};
pub use orchestrator::Orchestrator;
pub use ordering::{DependencyGraph, DomainRegistry, OrderingStrategy, PriorityChain};
