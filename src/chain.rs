//! # Chain Builder
//!
//! Links an ordered list of handlers into a singly-linked [`Chain`]. Each
//! handler is first wrapped in the configured middleware layers, then linked
//! to its successor through [`Handler::set_next`]; middleware delegates
//! linking to the handler it wraps, so continuation stays with the original
//! handlers.

use crate::context::ProcessingContext;
use crate::error::Result;
use crate::handler::Handler;
use crate::middleware::{LoggingMiddleware, MetricsCollector, RecoveryMiddleware};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Head of a linked handler chain. An empty chain is the "no chain" sentinel.
#[derive(Default)]
pub struct Chain {
    head: Option<Box<dyn Handler>>,
}

impl Chain {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_head(head: Box<dyn Handler>) -> Self {
        Self { head: Some(head) }
    }

    pub fn head(&self) -> Option<&dyn Handler> {
        self.head.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn handler_names(&self) -> Vec<String> {
        self.iter().map(|h| h.name().to_string()).collect()
    }

    /// Run the chain from its head. An empty chain succeeds without work.
    pub fn execute(&self, ctx: &ProcessingContext) -> Result<()> {
        match &self.head {
            Some(head) => head.handle(ctx),
            None => Ok(()),
        }
    }

    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter {
            current: self.head(),
        }
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.handler_names()).finish()
    }
}

pub struct ChainIter<'a> {
    current: Option<&'a dyn Handler>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a dyn Handler;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = current.next();
        Some(current)
    }
}

/// Configurable chain builder.
///
/// Layers are applied innermost first: recovery, then metrics, then logging.
#[derive(Debug, Clone, Default)]
pub struct ChainBuilder {
    logging: bool,
    recovery: bool,
    metrics: Option<MetricsCollector>,
    scope: Option<String>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logging(mut self) -> Self {
        self.logging = true;
        self
    }

    pub fn with_recovery(mut self) -> Self {
        self.recovery = true;
        self
    }

    pub fn with_metrics(mut self, collector: MetricsCollector) -> Self {
        self.metrics = Some(collector);
        self
    }

    /// Prefix for metrics keys, usually the phase name.
    pub fn scoped(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Link `handlers` in order without middleware.
    pub fn build(handlers: Vec<Box<dyn Handler>>) -> Chain {
        ChainBuilder::new().link(handlers)
    }

    /// Link `handlers` in order with every handler wrapped in [`LoggingMiddleware`].
    pub fn build_with_logging(handlers: Vec<Box<dyn Handler>>) -> Chain {
        ChainBuilder::new().with_logging().link(handlers)
    }

    /// Drop absent handlers, wrap the rest and link them in order.
    pub fn link_optional<I>(&self, handlers: I) -> Chain
    where
        I: IntoIterator<Item = Option<Box<dyn Handler>>>,
    {
        self.link(handlers.into_iter().flatten().collect())
    }

    pub fn link(&self, handlers: Vec<Box<dyn Handler>>) -> Chain {
        if handlers.is_empty() {
            debug!(scope = ?self.scope, "No handlers supplied, returning empty chain");
            return Chain::empty();
        }

        let count = handlers.len();
        let keys = self.metrics_keys(&handlers);
        let mut head: Option<Box<dyn Handler>> = None;
        for (handler, key) in handlers.into_iter().zip(keys).rev() {
            let mut wrapped = self.wrap(handler, key);
            if let Some(next) = head.take() {
                wrapped.set_next(next);
            }
            head = Some(wrapped);
        }

        debug!(
            scope = ?self.scope,
            handlers = count,
            logging = self.logging,
            recovery = self.recovery,
            metrics = self.metrics.is_some(),
            "Chain linked"
        );

        Chain { head }
    }

    /// Metrics key per handler: `scope.name`, with `#n` appended to the n-th
    /// repeat of a name inside one chain.
    fn metrics_keys(&self, handlers: &[Box<dyn Handler>]) -> Vec<String> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        handlers
            .iter()
            .map(|handler| {
                let name = handler.name();
                let occurrence = seen.entry(name).or_insert(0);
                *occurrence += 1;
                let base = match &self.scope {
                    Some(scope) => format!("{scope}.{name}"),
                    None => name.to_string(),
                };
                match *occurrence {
                    1 => base,
                    n => format!("{base}#{n}"),
                }
            })
            .collect()
    }

    fn wrap(&self, handler: Box<dyn Handler>, metrics_key: String) -> Box<dyn Handler> {
        let mut handler = handler;
        if self.recovery {
            handler = RecoveryMiddleware::wrap(handler);
        }
        if let Some(collector) = &self.metrics {
            handler = collector.instrument(metrics_key, handler);
        }
        if self.logging {
            handler = LoggingMiddleware::wrap(handler);
        }
        handler
    }
}
