//! # Templates Subcommand
//!
//! Lists and prints the standard workflow templates.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};

use juris_workflow::TemplateCatalog;

/// Arguments for the `juris templates` subcommand.
#[derive(Args, Debug)]
pub struct TemplatesArgs {
    #[command(subcommand)]
    pub command: TemplatesCommand,
}

/// Template catalog operations.
#[derive(Subcommand, Debug)]
pub enum TemplatesCommand {
    /// One line per template: id, trigger type, action count, name.
    List,
    /// Print one template as pretty JSON.
    Show {
        /// Template id, e.g. `prazo-7dias-alerta`.
        id: String,
    },
}

/// Execute the templates subcommand.
pub fn run_templates(args: &TemplatesArgs) -> Result<u8> {
    let catalog = TemplateCatalog::standard().context("standard templates are invalid")?;
    match &args.command {
        TemplatesCommand::List => print!("{}", render_list(&catalog)),
        TemplatesCommand::Show { id } => println!("{}", render_template(&catalog, id)?),
    }
    Ok(0)
}

/// Tabular listing of `catalog`.
pub fn render_list(catalog: &TemplateCatalog) -> String {
    let width = catalog
        .ids()
        .iter()
        .map(|id| id.as_str().len())
        .max()
        .unwrap_or(0);
    catalog
        .list()
        .iter()
        .map(|t| {
            format!(
                "{:<width$}  {:<22}  {} action(s)  {}\n",
                t.id.as_str(),
                t.trigger.trigger_type.as_str(),
                t.actions.len(),
                t.name,
            )
        })
        .collect()
}

/// Pretty JSON of the template `id`.
pub fn render_template(catalog: &TemplateCatalog, id: &str) -> Result<String> {
    let template = catalog
        .get(id)
        .ok_or_else(|| anyhow!("unknown template {id:?}; try `juris templates list`"))?;
    serde_json::to_string_pretty(template).context("failed to serialize template")
}
