use crate::context::ProcessingContext;
use crate::error::Result;
use crate::handler::Handler;
use std::time::Instant;
use tracing::{debug, error, info};

/// Logs start, completion, duration and failure around the wrapped handler.
pub struct LoggingMiddleware {
    inner: Box<dyn Handler>,
}

impl LoggingMiddleware {
    pub fn new(inner: Box<dyn Handler>) -> Self {
        Self { inner }
    }

    pub fn wrap(inner: Box<dyn Handler>) -> Box<dyn Handler> {
        Box::new(Self::new(inner))
    }
}

impl Handler for LoggingMiddleware {
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
        let handler = self.inner.name();
        let run_id = ctx.run_id();
        debug!(handler = %handler, run_id = %run_id, "Handler started");

        let start = Instant::now();
        let result = self.inner.handle(ctx);
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(()) => info!(
                handler = %handler,
                run_id = %run_id,
                duration_ms = duration_ms,
                "Handler completed"
            ),
            Err(err) => error!(
                handler = %handler,
                run_id = %run_id,
                duration_ms = duration_ms,
                error = %err,
                "Handler failed"
            ),
        }

        result
    }
}
