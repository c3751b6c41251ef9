//! # model-runner-cli — Schema Checks from the Command Line
//!
//! Provides the `model-runner` binary, which checks model-run documents on
//! disk against the model input and output schemas.
//!
//! ## Subcommands
//!
//! - `model-runner validate input <PATH>` — check a simulation request.
//! - `model-runner validate output <PATH>` — check a model result.
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers.
//! - Handlers delegate to `model-runner-schema`; no validation logic here.

pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use model_runner_schema::SchemaEnforcer;

/// Build the enforcer the CLI runs with.
///
/// Uses the schemas in `schema_dir` when given, otherwise the schemas
/// embedded in `model-runner-schema`.
pub fn load_enforcer(schema_dir: Option<&Path>) -> Result<SchemaEnforcer> {
    match schema_dir {
        Some(dir) => {
            tracing::info!(schema_dir = %dir.display(), "loading schemas from directory");
            SchemaEnforcer::from_dir(dir)
                .with_context(|| format!("failed to load schemas from {}", dir.display()))
        }
        None => SchemaEnforcer::embedded().context("failed to compile embedded schemas"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_enforcer_embedded() {
        load_enforcer(None).unwrap();
    }

    #[test]
    fn load_enforcer_from_schema_dir() {
        let schema_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("model-runner-schema")
            .join("schemas");
        let enforcer = load_enforcer(Some(&schema_dir)).unwrap();
        assert!(enforcer.enforce_input(&serde_json::json!({})).is_err());
    }

    #[test]
    fn load_enforcer_missing_dir_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = load_enforcer(Some(&missing)).unwrap_err();
        assert!(format!("{err:#}").contains("nope"), "got: {err:#}");
    }
}
