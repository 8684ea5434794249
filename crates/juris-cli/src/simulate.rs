//! # Simulate Subcommand
//!
//! Dry-runs a domain event: activates catalog templates into a fresh
//! registry whose handlers only log, feeds it the event, and prints the
//! execution results as JSON.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use juris_workflow::{
    DomainEvent, EngineConfig, ExecutionResult, HandlerRegistry, TemplateCatalog, WorkflowRegistry,
};

/// Arguments for the `juris simulate` subcommand.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Domain event file (`.json`, `.yaml` or `.yml`).
    #[arg(long, value_name = "PATH")]
    pub event: PathBuf,

    /// Template to activate. Repeatable. Defaults to every catalog template.
    #[arg(long = "template", value_name = "ID")]
    pub templates: Vec<String>,

    /// Per-action handler timeout in milliseconds. Must be positive.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: Option<u64>,
}

/// Execute the simulate subcommand.
///
/// Returns exit code: 0 when every matched workflow succeeded and no
/// condition failed to evaluate, 1 otherwise.
pub fn run_simulate(args: &SimulateArgs) -> Result<u8> {
    let event: DomainEvent = crate::read_document(&args.event)?;
    let mut config = EngineConfig::from_env().context("invalid engine configuration")?;
    if let Some(ms) = args.timeout_ms {
        config = config.with_action_timeout(Duration::from_millis(ms));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start async runtime")?;
    let results = runtime.block_on(simulate(&event, &args.templates, &config))?;

    println!(
        "{}",
        serde_json::to_string_pretty(&results).context("failed to serialize results")?
    );
    Ok(exit_code(&results))
}

/// Activate `templates` (all when empty) and feed `event` to them.
pub async fn simulate(
    event: &DomainEvent,
    templates: &[String],
    config: &EngineConfig,
) -> Result<Vec<ExecutionResult>> {
    let catalog = TemplateCatalog::standard().context("standard templates are invalid")?;
    let mut registry = WorkflowRegistry::new(HandlerRegistry::tracing_only(), config);

    let selected: Vec<String> = if templates.is_empty() {
        catalog.ids().iter().map(|id| id.to_string()).collect()
    } else {
        templates.to_vec()
    };
    for id in &selected {
        registry
            .activate_template(&catalog, id)
            .with_context(|| format!("cannot activate template {id:?}"))?;
    }
    tracing::info!(
        activated = registry.len(),
        event_type = %event.event_type,
        "simulating event"
    );

    Ok(registry.handle(event).await)
}

/// 0 when nothing failed, 1 otherwise.
pub fn exit_code(results: &[ExecutionResult]) -> u8 {
    let failed = results
        .iter()
        .any(|r| (r.matched && !r.success) || r.condition_error.is_some());
    u8::from(failed)
}
