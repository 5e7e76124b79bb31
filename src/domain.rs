//! # Domain Factory
//!
//! The pluggable contract a configuration domain implements. The core only
//! sees a domain's name, ordering signals and the three handler producers;
//! what the domain's data means stays inside its handlers.

use crate::error::Phase;
use crate::handler::{GeneratorHandler, Handler, ParserHandler, ValidatorHandler};
use std::fmt;
use std::sync::Arc;

pub trait DomainFactory: Send + Sync {
    /// Unique domain key.
    fn name(&self) -> &str;

    /// Lower runs earlier. Only the registry strategy consults it.
    fn priority(&self) -> i32;

    fn is_enabled(&self) -> bool {
        true
    }

    /// Names of domains that must run first. Only the dependency graph consults it.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// `None` means this domain has no parse work.
    fn create_parser_handler(&self) -> Option<Box<dyn ParserHandler>>;

    /// `None` means this domain has no validate work.
    fn create_validator_handler(&self) -> Option<Box<dyn ValidatorHandler>>;

    /// `None` means this domain has no generate work.
    fn create_generator_handler(&self) -> Option<Box<dyn GeneratorHandler>>;
}

impl fmt::Debug for dyn DomainFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainFactory")
            .field("name", &self.name())
            .field("priority", &self.priority())
            .field("enabled", &self.is_enabled())
            .field("dependencies", &self.dependencies())
            .finish()
    }
}

pub type SharedFactory = Arc<dyn DomainFactory>;

/// Produce the factory's handler for `phase` as a plain chain link.
pub fn create_handler(factory: &dyn DomainFactory, phase: Phase) -> Option<Box<dyn Handler>> {
    match phase {
        Phase::Parse => factory
            .create_parser_handler()
            .map(|h| h as Box<dyn Handler>),
        Phase::Validate => factory
            .create_validator_handler()
            .map(|h| h as Box<dyn Handler>),
        Phase::Generate => factory
            .create_generator_handler()
            .map(|h| h as Box<dyn Handler>),
    }
}

type ParserFn = dyn Fn() -> Box<dyn ParserHandler> + Send + Sync;
type ValidatorFn = dyn Fn() -> Box<dyn ValidatorHandler> + Send + Sync;
type GeneratorFn = dyn Fn() -> Box<dyn GeneratorHandler> + Send + Sync;

/// Domain factory assembled from closures.
///
/// ```rust
/// use domain_orchestrator::domain::{DomainFactory, FnDomain};
/// use domain_orchestrator::handler::FnHandler;
///
/// let language = FnDomain::new("language", 20)
///     .depends_on(["service"])
///     .with_parser(|| FnHandler::pass_through("language"));
///
/// assert_eq!(language.dependencies(), vec!["service".to_string()]);
/// assert!(language.create_parser_handler().is_some());
/// assert!(language.create_validator_handler().is_none());
/// ```
pub struct FnDomain {
    name: String,
    priority: i32,
    enabled: bool,
    dependencies: Vec<String>,
    parser: Option<Box<ParserFn>>,
    validator: Option<Box<ValidatorFn>>,
    generator: Option<Box<GeneratorFn>>,
}

impl FnDomain {
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Self {
            name: name.into(),
            priority,
            enabled: true,
            dependencies: Vec::new(),
            parser: None,
            validator: None,
            generator: None,
        }
    }

    pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_parser<F, H>(mut self, create: F) -> Self
    where
        F: Fn() -> H + Send + Sync + 'static,
        H: ParserHandler + 'static,
    {
        self.parser = Some(Box::new(move || Box::new(create()) as Box<dyn ParserHandler>));
        self
    }

    pub fn with_validator<F, H>(mut self, create: F) -> Self
    where
        F: Fn() -> H + Send + Sync + 'static,
        H: ValidatorHandler + 'static,
    {
        self.validator = Some(Box::new(move || Box::new(create()) as Box<dyn ValidatorHandler>));
        self
    }

    pub fn with_generator<F, H>(mut self, create: F) -> Self
    where
        F: Fn() -> H + Send + Sync + 'static,
        H: GeneratorHandler + 'static,
    {
        self.generator = Some(Box::new(move || Box::new(create()) as Box<dyn GeneratorHandler>));
        self
    }

    pub fn shared(self) -> SharedFactory {
        Arc::new(self)
    }
}

impl DomainFactory for FnDomain {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn dependencies(&self) -> Vec<String> {
        self.dependencies.clone()
    }

    fn create_parser_handler(&self) -> Option<Box<dyn ParserHandler>> {
        self.parser.as_ref().map(|create| create())
    }

    fn create_validator_handler(&self) -> Option<Box<dyn ValidatorHandler>> {
        self.validator.as_ref().map(|create| create())
    }

    fn create_generator_handler(&self) -> Option<Box<dyn GeneratorHandler>> {
        self.generator.as_ref().map(|create| create())
    }
}

impl fmt::Debug for FnDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnDomain")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("enabled", &self.enabled)
            .field("dependencies", &self.dependencies)
            .field("parser", &self.parser.is_some())
            .field("validator", &self.validator.is_some())
            .field("generator", &self.generator.is_some())
            .finish()
    }
}
