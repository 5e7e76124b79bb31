//! # Handler Middleware
//!
//! Transparent decorators layered onto any [`Handler`](crate::handler::Handler).
//!
//! A middleware holds the handler it wraps and delegates `handle`, `set_next`
//! and `next` to it. It never invokes chain continuation itself: the wrapped
//! handler already calls its own successor from inside its `handle`. Linking a
//! wrapped handler therefore links the inner handler, and the chain keeps the
//! same shape with or without middleware.
//!
//! Because continuation happens inside the wrapped call, timings and error
//! counts observed by a middleware include every downstream handler.

pub mod logging;
pub mod metrics;
pub mod recovery;

pub use logging::LoggingMiddleware;
pub use metrics::{HandlerMetrics, MetricsCollector, MetricsMiddleware, MetricsSnapshot};
pub use recovery::RecoveryMiddleware;
