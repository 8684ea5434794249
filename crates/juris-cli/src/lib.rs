//! # juris-cli — Command Line for the Juris Workflow Engine
//!
//! Provides the `juris` binary.
//!
//! ## Subcommands
//!
//! - `juris templates list|show` — Inspect the standard template catalog.
//! - `juris validate` — Load and validate a workflow definition file.
//! - `juris simulate` — Feed a domain event to activated templates with
//!   logging-only handlers and print the execution results.
//!
//! ```bash
//! juris templates list
//! juris validate workflows/prazo-custom.yaml
//! juris -v simulate --event evento.json --template prazo-7dias-alerta
//! ```

pub mod simulate;
pub mod templates;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Document formats accepted for definition and event files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
}

impl Format {
    /// Infer the format from the file extension. Anything that is not YAML
    /// is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// Read a file to a string with the path in the error context.
pub fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Read and deserialize a JSON or YAML document.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = read_file(path)?;
    let parsed = match Format::from_path(path) {
        Format::Json => serde_json::from_str(&raw).map_err(anyhow::Error::from),
        Format::Yaml => serde_yaml::from_str(&raw).map_err(anyhow::Error::from),
    };
    parsed.with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a.yaml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("a.YML")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("a.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("sem_extensao")), Format::Json);
    }

    #[test]
    fn read_document_reports_path() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{ nope").unwrap();
        let err = read_document::<serde_json::Value>(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse"));
    }

    #[test]
    fn read_missing_file_fails() {
        let err = read_file(Path::new("/nonexistent/juris/evento.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
