//! Error types for the domain orchestrator.
//!

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One full traversal of a chain over the shared context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Parse,
    Validate,
    Generate,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Parse, Phase::Validate, Phase::Generate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Parse => "parse",
            Phase::Validate => "validate",
            Phase::Generate => "generate",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrchestratorError {
    #[error("duplicate domain: {0}")]
    DuplicateDomain(String),
    #[error("domain '{domain}' depends on unknown domain '{dependency}'")]
    UnknownDependency { domain: String, dependency: String },
    #[error("circular dependency detected among domains: {}", .0.join(", "))]
    CircularDependency(Vec<String>),
    #[error("priority chain is empty")]
    EmptyChain,
    #[error("domain '{0}' appears more than once in the priority chain")]
    DuplicateChainEntry(String),
    #[error("Validation error in {domain}: {message}")]
    Validation { domain: String, message: String },
    /// Malformed input shape or a wrong type stored under a domain key.
    #[error("Structural error in {domain}: {message}")]
    Structural { domain: String, message: String },
    #[error("Handler error in {handler}: {message}")]
    Handler { handler: String, message: String },
    #[error("handler '{handler}' panicked: {message}")]
    HandlerPanic { handler: String, message: String },
    #[error("{phase} phase failed: {source}")]
    PhaseFailed {
        phase: Phase,
        source: Box<OrchestratorError>,
    },
    #[error("orchestrator has not been initialized")]
    NotInitialized,
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl OrchestratorError {
    pub fn validation(domain: impl Into<String>, message: impl Into<String>) -> Self {
        OrchestratorError::Validation {
            domain: domain.into(),
            message: message.into(),
        }
    }

    pub fn structural(domain: impl Into<String>, message: impl Into<String>) -> Self {
        OrchestratorError::Structural {
            domain: domain.into(),
            message: message.into(),
        }
    }

    pub fn handler(handler: impl Into<String>, message: impl Into<String>) -> Self {
        OrchestratorError::Handler {
            handler: handler.into(),
            message: message.into(),
        }
    }

    pub fn phase_failed(phase: Phase, source: OrchestratorError) -> Self {
        OrchestratorError::PhaseFailed {
            phase,
            source: Box::new(source),
        }
    }

    /// Strips `PhaseFailed` wrappers and returns the error raised by the handler.
    pub fn root_cause(&self) -> &OrchestratorError {
        match self {
            OrchestratorError::PhaseFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<config::ConfigError> for OrchestratorError {
    fn from(error: config::ConfigError) -> Self {
        OrchestratorError::Configuration(error.to_string())
    }
}

impl From<serde_json::Error> for OrchestratorError {
    fn from(error: serde_json::Error) -> Self {
        OrchestratorError::Configuration(format!("JSON serialization error: {error}"))
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
