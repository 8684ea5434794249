//! # Validate Subcommand
//!
//! Loads a workflow definition from JSON or YAML and runs the same checks
//! the registry applies at activation time.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use juris_workflow::{ValidationError, WorkflowDefinition};

use crate::Format;

/// Arguments for the `juris validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Definition file (`.json`, `.yaml` or `.yml`).
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when the definition is valid, 1 otherwise.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    match load_definition(&args.path)? {
        Ok(definition) => {
            println!(
                "OK: {} ({}), trigger {}, {} action(s)",
                definition.id,
                definition.name,
                definition.trigger.trigger_type,
                definition.actions.len()
            );
            Ok(0)
        }
        Err(e) => {
            println!("FAIL: {}: {e}", args.path.display());
            Ok(1)
        }
    }
}

/// Read `path` and parse it as a definition.
///
/// The outer `Result` is an I/O failure; the inner one is the verdict.
pub fn load_definition(path: &Path) -> Result<Result<WorkflowDefinition, ValidationError>> {
    let raw = crate::read_file(path)?;
    let parsed = match Format::from_path(path) {
        Format::Json => WorkflowDefinition::from_json(&raw),
        Format::Yaml => WorkflowDefinition::from_yaml(&raw),
    };
    if let Ok(definition) = &parsed {
        tracing::debug!(template_id = %definition.id, "definition loaded");
    }
    Ok(parsed)
}
