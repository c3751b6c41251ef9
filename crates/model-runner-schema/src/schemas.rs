//! # Schema Sources
//!
//! The model input and output schemas, either compiled into the binary or
//! loaded from a directory, plus the local `$ref` resolution that lets the
//! output schema point at definitions in the input schema.
//!
//! ## Schema Resolution
//!
//! Both schemas carry `$id` URIs of the form:
//!   `https://schemas.covid-modeling.org/model-runner/<filename>`
//!
//! The output schema's `metadata` property refers to
//! `model-input.schema.json#/definitions/ModelInput`. That reference is
//! served from memory by [`LocalSchemaRetriever`]; no network request is
//! ever made.

use std::collections::HashMap;
use std::path::Path;

use jsonschema::{Retrieve, Uri};
use serde_json::Value;

use crate::validate::SchemaValidationError;

/// URI prefix shared by the `$id` of every model-runner schema.
pub const SCHEMA_URI_PREFIX: &str = "https://schemas.covid-modeling.org/model-runner/";

/// Filename of the model input (simulation request) schema.
pub const INPUT_SCHEMA_NAME: &str = "model-input.schema.json";

/// Filename of the model output (simulation result) schema.
pub const OUTPUT_SCHEMA_NAME: &str = "model-output.schema.json";

const EMBEDDED_INPUT_SCHEMA: &str = include_str!("../schemas/model-input.schema.json");
const EMBEDDED_OUTPUT_SCHEMA: &str = include_str!("../schemas/model-output.schema.json");

/// The pair of schema documents an enforcer is compiled from.
#[derive(Debug, Clone)]
pub struct SchemaSet {
    /// Parsed `model-input.schema.json`.
    pub input: Value,
    /// Parsed `model-output.schema.json`.
    pub output: Value,
}

impl SchemaSet {
    /// Parse the schemas compiled into this crate.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoad` if an embedded schema is
    /// not valid JSON.
    pub fn embedded() -> Result<Self, SchemaValidationError> {
        Ok(Self {
            input: parse_schema(INPUT_SCHEMA_NAME, EMBEDDED_INPUT_SCHEMA)?,
            output: parse_schema(OUTPUT_SCHEMA_NAME, EMBEDDED_OUTPUT_SCHEMA)?,
        })
    }

    /// Load `model-input.schema.json` and `model-output.schema.json` from
    /// `schema_dir`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoad` if either file is missing,
    /// unreadable, or not valid JSON.
    pub fn from_dir(schema_dir: impl AsRef<Path>) -> Result<Self, SchemaValidationError> {
        let schema_dir = schema_dir.as_ref();
        Ok(Self {
            input: read_schema(schema_dir, INPUT_SCHEMA_NAME)?,
            output: read_schema(schema_dir, OUTPUT_SCHEMA_NAME)?,
        })
    }

    /// Build the retriever that resolves cross-schema `$ref`s between the
    /// two documents of this set.
    pub(crate) fn retriever(&self) -> LocalSchemaRetriever {
        let mut schemas_by_uri = HashMap::new();
        for (filename, value) in [
            (INPUT_SCHEMA_NAME, &self.input),
            (OUTPUT_SCHEMA_NAME, &self.output),
        ] {
            schemas_by_uri.insert(format!("{SCHEMA_URI_PREFIX}{filename}"), value.clone());

            // A schema loaded from disk may declare a different `$id`.
            if let Some(id) = value.get("$id").and_then(Value::as_str) {
                schemas_by_uri.insert(id.to_string(), value.clone());
            }

            schemas_by_uri.insert(filename.to_string(), value.clone());
        }
        LocalSchemaRetriever { schemas_by_uri }
    }
}

fn parse_schema(schema_name: &str, content: &str) -> Result<Value, SchemaValidationError> {
    serde_json::from_str(content).map_err(|e| SchemaValidationError::SchemaLoad {
        schema_name: schema_name.to_string(),
        reason: format!("invalid JSON: {e}"),
    })
}

fn read_schema(schema_dir: &Path, schema_name: &str) -> Result<Value, SchemaValidationError> {
    let path = schema_dir.join(schema_name);
    let content =
        std::fs::read_to_string(&path).map_err(|e| SchemaValidationError::SchemaLoad {
            schema_name: schema_name.to_string(),
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
    parse_schema(schema_name, &content)
}

/// Resolves `$ref` URIs against the in-memory schema set.
pub(crate) struct LocalSchemaRetriever {
    /// Map from URI string (or bare filename) to schema value.
    schemas_by_uri: HashMap<String, Value>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }

        // Fall back to the last path segment so relative refs such as
        // `model-input.schema.json#/definitions/...` resolve too.
        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        if let Some(value) = self.schemas_by_uri.get(filename) {
            return Ok(value.clone());
        }

        Err(format!("schema '{uri_str}' is not part of the model-runner schema set").into())
    }
}
