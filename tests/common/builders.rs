//! Sample configuration domains used across the integration tests.
//!
//! They behave like real domains: parsers pull their section out of the raw
//! document into a typed model, validators record validation failures through
//! the context policy, generators emit files.

use domain_orchestrator::context::ProcessingContext;
use domain_orchestrator::domain::{FnDomain, SharedFactory};
use domain_orchestrator::error::{OrchestratorError, Result};
use domain_orchestrator::handler::FnHandler;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceModel {
    pub name: String,
    #[serde(default)]
    pub port: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LanguageModel {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Parse handler deserializing `section` into `T` and storing it as the domain model.
fn section_parser<T>(domain: &'static str) -> FnHandler
where
    T: for<'de> Deserialize<'de> + Send + Sync + 'static,
{
    FnHandler::new(domain, move |ctx: &ProcessingContext| {
        let Some(section) = ctx.domain_section(domain) else {
            return Ok(());
        };
        if !section.is_object() {
            return Err(OrchestratorError::structural(domain, "section must be a map"));
        }
        let model: T = serde_json::from_value(section.clone())
            .map_err(|e| OrchestratorError::structural(domain, e.to_string()))?;
        ctx.set_domain_model(domain, model);
        Ok(())
    })
}

fn append_trace(ctx: &ProcessingContext, entry: String) {
    let mut trace = ctx.get_metadata("trace").unwrap_or_else(|| json!([]));
    if let Some(list) = trace.as_array_mut() {
        list.push(json!(entry));
    }
    ctx.set_metadata("trace", trace);
}

/// Recorded `phase:domain` visits, in order.
pub fn trace(ctx: &ProcessingContext) -> Vec<String> {
    ctx.get_metadata("trace")
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default()
}

pub fn service_domain() -> SharedFactory {
    FnDomain::new("service", 10)
        .with_parser(|| section_parser::<ServiceModel>("service"))
        .with_validator(|| {
            FnHandler::new("service", |ctx: &ProcessingContext| {
                append_trace(ctx, "validate:service".to_string());
                let Some(service) = ctx.get_typed_domain_model::<ServiceModel>("service")? else {
                    return ctx.record_validation_failure(
                        "service",
                        OrchestratorError::validation("service", "service section is required"),
                    );
                };
                if service.name.trim().is_empty() {
                    ctx.record_validation_failure(
                        "service",
                        OrchestratorError::validation("service", "name is required"),
                    )?;
                }
                if service.port == 0 || service.port > 65535 {
                    ctx.record_validation_failure(
                        "service",
                        OrchestratorError::validation("service", "port must be in 1..=65535"),
                    )?;
                }
                Ok(())
            })
        })
        .with_generator(|| {
            FnHandler::new("service", |ctx: &ProcessingContext| {
                if let Some(service) = ctx.get_typed_domain_model::<ServiceModel>("service")? {
                    ctx.add_generated_file(
                        "service.json",
                        format!("{{\"name\":\"{}\",\"port\":{}}}", service.name, service.port),
                    );
                }
                Ok(())
            })
        })
        .shared()
}

pub fn language_domain() -> SharedFactory {
    FnDomain::new("language", 20)
        .depends_on(["service"])
        .with_parser(|| section_parser::<LanguageModel>("language"))
        .with_validator(|| {
            FnHandler::new("language", |ctx: &ProcessingContext| {
                append_trace(ctx, "validate:language".to_string());
                if ctx.has_domain_model("language") && !ctx.has_domain_model("service") {
                    ctx.record_validation_failure(
                        "language",
                        OrchestratorError::validation("language", "language requires a service"),
                    )?;
                }
                Ok(())
            })
        })
        .shared()
}

pub fn build_domain() -> SharedFactory {
    FnDomain::new("build", 30)
        .depends_on(["service", "language"])
        .with_parser(|| {
            FnHandler::new("build", |ctx: &ProcessingContext| {
                append_trace(ctx, "parse:build".to_string());
                Ok(())
            })
        })
        .with_generator(|| {
            FnHandler::new("build", |ctx: &ProcessingContext| {
                let service = ctx.get_typed_domain_model::<ServiceModel>("service")?;
                let language = ctx.get_typed_domain_model::<LanguageModel>("language")?;
                let target = service.map(|s| s.name.clone()).unwrap_or_else(|| "app".to_string());
                let toolchain = language.map(|l| l.name.clone()).unwrap_or_else(|| "make".to_string());
                ctx.add_generated_file("Makefile", format!("# {toolchain}\nbuild:\n\t{target}\n"));
                Ok(())
            })
        })
        .shared()
}

/// Runs last; flags missing sections as warnings in metadata.
pub fn crossdomain_domain() -> SharedFactory {
    FnDomain::new("crossdomain", 999)
        .depends_on(["service", "language", "build"])
        .with_validator(|| {
            FnHandler::new("crossdomain", |ctx: &ProcessingContext| {
                append_trace(ctx, "validate:crossdomain".to_string());
                if !ctx.has_domain_model("language") {
                    ctx.set_metadata("warnings", json!(["no language section; defaulting to make"]));
                }
                Ok(())
            })
        })
        .shared()
}

/// Domain that only records its visit in each phase.
pub fn tracing_domain(name: &'static str, priority: i32, dependencies: &[&str]) -> SharedFactory {
    FnDomain::new(name, priority)
        .depends_on(dependencies.iter().copied())
        .with_parser(move || {
            FnHandler::new(name, move |ctx: &ProcessingContext| {
                append_trace(ctx, format!("parse:{name}"));
                Ok(())
            })
        })
        .with_validator(move || {
            FnHandler::new(name, move |ctx: &ProcessingContext| {
                append_trace(ctx, format!("validate:{name}"));
                Ok(())
            })
        })
        .with_generator(move || {
            FnHandler::new(name, move |ctx: &ProcessingContext| {
                append_trace(ctx, format!("generate:{name}"));
                Ok(())
            })
        })
        .shared()
}

pub fn sample_document() -> serde_json::Value {
    json!({
        "service": { "name": "billing", "port": 8080 },
        "language": { "name": "rust", "version": "1.86" }
    })
}

pub fn standard_domains() -> Vec<SharedFactory> {
    vec![
        crossdomain_domain(),
        build_domain(),
        language_domain(),
        service_domain(),
    ]
}
