//! # Processing Context
//!
//! The mutable state threaded through every phase of one `process` call.
//!
//! Domain models, validation errors and generated files live in [`DashMap`]s;
//! metadata and the aggregated error log sit behind a [`parking_lot::Mutex`].
//! Every operation is independently atomic, no lock is ever held across a
//! handler boundary, and a read-then-write sequence inside a handler carries
//! no transactional guarantee against external mutators.

use crate::config::ValidationPolicy;
use crate::error::{OrchestratorError, Result};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Opaque typed value a parser stores for its domain.
pub type DomainModel = Arc<dyn Any + Send + Sync>;

/// Cancellation flag carried alongside the context.
///
/// The core stores it and never consults it; long-running handlers poll
/// [`CancellationSignal::is_cancelled`] themselves.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    cancelled: Arc<AtomicBool>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[derive(Debug, Default)]
struct SharedState {
    metadata: BTreeMap<String, Value>,
    errors: Vec<OrchestratorError>,
}

pub struct ProcessingContext {
    run_id: Uuid,
    created_at: DateTime<Utc>,
    raw_config: Value,
    validation_policy: ValidationPolicy,
    cancellation: CancellationSignal,
    domain_models: DashMap<String, DomainModel>,
    validation_errors: DashMap<String, Vec<OrchestratorError>>,
    generated_files: DashMap<String, Vec<u8>>,
    shared: Mutex<SharedState>,
}

impl ProcessingContext {
    pub fn new(raw_config: Value) -> Self {
        Self::with_policy(raw_config, ValidationPolicy::default())
    }

    pub fn with_policy(raw_config: Value, validation_policy: ValidationPolicy) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            raw_config,
            validation_policy,
            cancellation: CancellationSignal::new(),
            domain_models: DashMap::new(),
            validation_errors: DashMap::new(),
            generated_files: DashMap::new(),
            shared: Mutex::new(SharedState::default()),
        }
    }

    pub fn with_cancellation(mut self, signal: CancellationSignal) -> Self {
        self.cancellation = signal;
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn raw_config(&self) -> &Value {
        &self.raw_config
    }

    /// Top-level section of the raw document keyed by domain name.
    pub fn domain_section(&self, domain: &str) -> Option<&Value> {
        self.raw_config.get(domain)
    }

    pub fn validation_policy(&self) -> ValidationPolicy {
        self.validation_policy
    }

    pub fn cancellation(&self) -> &CancellationSignal {
        &self.cancellation
    }

    // ---- domain models ----

    pub fn set_domain_model<T: Any + Send + Sync>(&self, domain: impl Into<String>, model: T) {
        self.domain_models.insert(domain.into(), Arc::new(model));
    }

    /// Raw model stored for `domain`, if its parser has run.
    pub fn get_domain_model(&self, domain: &str) -> Option<DomainModel> {
        self.domain_models.get(domain).map(|entry| entry.value().clone())
    }

    /// Model stored for `domain` downcast to `T`.
    ///
    /// Returns a structural error when a model exists under a different type.
    pub fn get_typed_domain_model<T: Any + Send + Sync>(&self, domain: &str) -> Result<Option<Arc<T>>> {
        match self.get_domain_model(domain) {
            None => Ok(None),
            Some(model) => model.downcast::<T>().map(Some).map_err(|_| {
                OrchestratorError::structural(
                    domain,
                    format!(
                        "domain model is not of type {}",
                        std::any::type_name::<T>()
                    ),
                )
            }),
        }
    }

    pub fn has_domain_model(&self, domain: &str) -> bool {
        self.domain_models.contains_key(domain)
    }

    pub fn domain_model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .domain_models
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    // ---- validation errors ----

    /// Append to the domain's validation errors and to the aggregate log.
    pub fn add_validation_error(&self, domain: &str, error: OrchestratorError) {
        self.validation_errors
            .entry(domain.to_string())
            .or_default()
            .push(error.clone());
        self.shared.lock().errors.push(error);
    }

    /// Record a validation failure and apply the configured [`ValidationPolicy`].
    ///
    /// Under `Continue` this returns `Ok(())`; under `Halt` it returns the error
    /// so the calling validator stops its chain.
    pub fn record_validation_failure(&self, domain: &str, error: OrchestratorError) -> Result<()> {
        self.add_validation_error(domain, error.clone());
        match self.validation_policy {
            ValidationPolicy::Continue => Ok(()),
            ValidationPolicy::Halt => Err(error),
        }
    }

    pub fn get_validation_errors(&self, domain: &str) -> Vec<OrchestratorError> {
        self.validation_errors
            .get(domain)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Point-in-time snapshot keyed by domain name.
    pub fn get_all_validation_errors(&self) -> BTreeMap<String, Vec<OrchestratorError>> {
        self.validation_errors
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn has_validation_errors(&self) -> bool {
        self.validation_errors.iter().any(|entry| !entry.value().is_empty())
    }

    pub fn validation_error_count(&self) -> usize {
        self.validation_errors.iter().map(|entry| entry.value().len()).sum()
    }

    // ---- generated files ----

    pub fn add_generated_file(&self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.generated_files.insert(path.into(), content.into());
    }

    pub fn get_generated_file(&self, path: &str) -> Option<Vec<u8>> {
        self.generated_files.get(path).map(|entry| entry.value().clone())
    }

    /// Point-in-time snapshot keyed by file path.
    pub fn get_all_generated_files(&self) -> BTreeMap<String, Vec<u8>> {
        self.generated_files
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn generated_file_count(&self) -> usize {
        self.generated_files.len()
    }

    // ---- metadata ----

    pub fn set_metadata(&self, key: impl Into<String>, value: Value) {
        self.shared.lock().metadata.insert(key.into(), value);
    }

    pub fn get_metadata(&self, key: &str) -> Option<Value> {
        self.shared.lock().metadata.get(key).cloned()
    }

    pub fn metadata_snapshot(&self) -> BTreeMap<String, Value> {
        self.shared.lock().metadata.clone()
    }

    // ---- aggregated errors ----

    pub fn add_error(&self, error: OrchestratorError) {
        self.shared.lock().errors.push(error);
    }

    pub fn get_errors(&self) -> Vec<OrchestratorError> {
        self.shared.lock().errors.clone()
    }

    pub fn has_errors(&self) -> bool {
        !self.shared.lock().errors.is_empty()
    }
}

impl fmt::Debug for ProcessingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessingContext")
            .field("run_id", &self.run_id)
            .field("created_at", &self.created_at)
            .field("validation_policy", &self.validation_policy)
            .field("domain_models", &self.domain_model_names())
            .field("validation_errors", &self.validation_error_count())
            .field("generated_files", &self.generated_file_count())
            .finish_non_exhaustive()
    }
}
