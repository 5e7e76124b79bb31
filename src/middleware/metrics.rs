//! Execution counters per wrapped handler instance.

use crate::context::ProcessingContext;
use crate::error::Result;
use crate::handler::Handler;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Live counters shared between a [`MetricsMiddleware`] and its observers.
#[derive(Debug, Default)]
pub struct HandlerMetrics {
    executions: AtomicU64,
    errors: AtomicU64,
    total_nanos: AtomicU64,
}

impl HandlerMetrics {
    fn record(&self, elapsed: Duration, failed: bool) {
        self.executions.fetch_add(1, Ordering::Relaxed);
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
        if failed {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            executions: self.executions.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            total_duration: Duration::from_nanos(self.total_nanos.load(Ordering::Relaxed)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub executions: u64,
    pub errors: u64,
    pub total_duration: Duration,
}

impl MetricsSnapshot {
    pub fn average_duration(&self) -> Duration {
        if self.executions == 0 {
            return Duration::ZERO;
        }
        let nanos = self.total_duration.as_nanos() / u128::from(self.executions);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    pub fn error_rate(&self) -> f64 {
        if self.executions == 0 {
            0.0
        } else {
            self.errors as f64 / self.executions as f64
        }
    }
}

/// Counts executions, failures and cumulative duration of the wrapped handler.
pub struct MetricsMiddleware {
    inner: Box<dyn Handler>,
    metrics: Arc<HandlerMetrics>,
}

impl MetricsMiddleware {
    pub fn new(inner: Box<dyn Handler>) -> Self {
        Self {
            inner,
            metrics: Arc::new(HandlerMetrics::default()),
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Shared handle that stays readable after the middleware is moved into a chain.
    pub fn metrics_handle(&self) -> Arc<HandlerMetrics> {
        Arc::clone(&self.metrics)
    }
}

impl Handler for MetricsMiddleware {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn set_next(&mut self, next: Box<dyn Handler>) -> &mut dyn Handler {
        self.inner.set_next(next)
    }

    fn next(&self) -> Option<&dyn Handler> {
        self.inner.next()
    }

    fn handle(&self, ctx: &ProcessingContext) -> Result<()> {
        let start = Instant::now();
        let result = self.inner.handle(ctx);
        self.metrics.record(start.elapsed(), result.is_err());
        result
    }
}

/// Registry of metrics handles keyed by `scope.handler`.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    entries: Arc<DashMap<String, Arc<HandlerMetrics>>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `inner` and register its counters under `key`.
    pub fn instrument(&self, key: impl Into<String>, inner: Box<dyn Handler>) -> Box<dyn Handler> {
        let middleware = MetricsMiddleware::new(inner);
        self.entries.insert(key.into(), middleware.metrics_handle());
        Box::new(middleware)
    }

    pub fn snapshot(&self, key: &str) -> Option<MetricsSnapshot> {
        self.entries.get(key).map(|entry| entry.value().snapshot())
    }

    pub fn all(&self) -> BTreeMap<String, MetricsSnapshot> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().snapshot()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
