use crate::context::ProcessingContext;
use crate::error::{OrchestratorError, Result};
use crate::handler::Handler;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::error;

/// Converts a panic raised inside the wrapped handler's call graph into
/// [`OrchestratorError::HandlerPanic`].
pub struct RecoveryMiddleware {
    inner: Box<dyn Handler>,
}

impl RecoveryMiddleware {
    pub fn new(inner: Box<dyn Handler>) -> Self {
        Self { inner }
    }

    pub fn wrap(inner: Box<dyn Handler>) -> Box<dyn Handler> {
        Box::new(Self::new(inner))
    }
}

impl Handler for RecoveryMiddleware {
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
        match catch_unwind(AssertUnwindSafe(|| self.inner.handle(ctx))) {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(
                    handler = %self.inner.name(),
                    run_id = %ctx.run_id(),
                    panic_msg = %message,
                    "Handler panicked"
                );
                Err(OrchestratorError::HandlerPanic {
                    handler: self.inner.name().to_string(),
                    message,
                })
            }
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
