//! Configuration Loader
//!
//! Layers built-in defaults, an optional configuration file (format inferred
//! from the extension) and `DOMAIN_ORCH__*` environment variables.

use super::OrchestratorConfig;
use crate::error::{OrchestratorError, Result};
use config::{Config, Environment, File};
use std::path::Path;
use tracing::debug;

/// Prefix for environment overrides, e.g. `DOMAIN_ORCH__STRATEGY=dependency_graph`.
pub const ENV_PREFIX: &str = "DOMAIN_ORCH";

impl OrchestratorConfig {
    /// Load configuration from defaults, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env_prefix(path, ENV_PREFIX)
    }

    /// Same as [`OrchestratorConfig::load`] with a caller-chosen environment prefix.
    pub fn load_with_env_prefix(path: Option<&Path>, prefix: &str) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.is_file() {
                return Err(OrchestratorError::Configuration(format!(
                    "configuration file not found: {}",
                    path.display()
                )));
            }
            debug!(path = %path.display(), "Loading orchestrator configuration file");
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(prefix)
                .separator("__")
                .try_parsing(true),
        );

        let config: OrchestratorConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(
            strategy = %config.strategy,
            validation_policy = ?config.validation_policy,
            "Orchestrator configuration loaded"
        );

        Ok(config)
    }
}
