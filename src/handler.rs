//! # Handler Abstraction
//!
//! A handler is one unit of work in a singly-linked chain. It owns its
//! successor, performs its work in [`Handler::handle`] and continues the chain
//! through [`Handler::call_next`]. Returning an error without calling the
//! successor halts the chain; the error travels back up the call stack to
//! the phase driver.
//!
//! ```rust
//! use domain_orchestrator::context::ProcessingContext;
//! use domain_orchestrator::handler::{FnHandler, Handler};
//!
//! let mut first = FnHandler::new("service", |ctx: &ProcessingContext| {
//!     ctx.set_metadata("service.seen", serde_json::json!(true));
//!     Ok(())
//! });
//! first.set_next(Box::new(FnHandler::new("build", |_ctx: &ProcessingContext| Ok(()))));
//!
//! let ctx = ProcessingContext::new(serde_json::json!({}));
//! first.handle(&ctx).unwrap();
//! assert_eq!(ctx.get_metadata("service.seen"), Some(serde_json::json!(true)));
//! ```

use crate::context::ProcessingContext;
use crate::error::Result;
use std::fmt;

pub trait Handler: Send + Sync {
    fn name(&self) -> &str;

    /// Link `next` as this handler's successor and return it for fluent linking.
    fn set_next(&mut self, next: Box<dyn Handler>) -> &mut dyn Handler;

    fn next(&self) -> Option<&dyn Handler>;

    /// Perform this handler's work. The default forwards straight to the successor.
    fn handle(&self, ctx: &ProcessingContext) -> Result<()> {
        self.call_next(ctx)
    }

    fn call_next(&self, ctx: &ProcessingContext) -> Result<()> {
        match self.next() {
            Some(next) => next.handle(ctx),
            None => Ok(()),
        }
    }
}

/// Handler produced for the parse phase.
pub trait ParserHandler: Handler {
    fn parse(&self, ctx: &ProcessingContext) -> Result<()> {
        self.handle(ctx)
    }
}

/// Handler produced for the validate phase.
pub trait ValidatorHandler: Handler {
    fn validate(&self, ctx: &ProcessingContext) -> Result<()> {
        self.handle(ctx)
    }
}

/// Handler produced for the generate phase.
pub trait GeneratorHandler: Handler {
    fn generate(&self, ctx: &ProcessingContext) -> Result<()> {
        self.handle(ctx)
    }
}

/// Successor slot embedded by concrete handlers.
#[derive(Default)]
pub struct HandlerLink {
    next: Option<Box<dyn Handler>>,
}

impl HandlerLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, next: Box<dyn Handler>) -> &mut dyn Handler {
        self.next.insert(next).as_mut()
    }

    pub fn get(&self) -> Option<&dyn Handler> {
        self.next.as_deref()
    }
}

impl fmt::Debug for HandlerLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerLink")
            .field("next", &self.next.as_ref().map(|h| h.name().to_string()))
            .finish()
    }
}

type HandlerFn = dyn Fn(&ProcessingContext) -> Result<()> + Send + Sync;

/// Handler backed by a closure. Runs the closure, then continues the chain.
///
/// Usable in any phase; it implements all three phase traits.
pub struct FnHandler {
    name: String,
    work: Box<HandlerFn>,
    link: HandlerLink,
}

impl FnHandler {
    pub fn new<F>(name: impl Into<String>, work: F) -> Self
    where
        F: Fn(&ProcessingContext) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            work: Box::new(work),
            link: HandlerLink::new(),
        }
    }

    /// Handler with no work of its own.
    pub fn pass_through(name: impl Into<String>) -> Self {
        Self::new(name, |_ctx| Ok(()))
    }
}

impl Handler for FnHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_next(&mut self, next: Box<dyn Handler>) -> &mut dyn Handler {
        self.link.set(next)
    }

    fn next(&self) -> Option<&dyn Handler> {
        self.link.get()
    }

    fn handle(&self, ctx: &ProcessingContext) -> Result<()> {
        (self.work)(ctx)?;
        self.call_next(ctx)
    }
}

impl ParserHandler for FnHandler {}
impl ValidatorHandler for FnHandler {}
impl GeneratorHandler for FnHandler {}

impl fmt::Debug for FnHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler")
            .field("name", &self.name)
            .field("link", &self.link)
            .finish_non_exhaustive()
    }
}
