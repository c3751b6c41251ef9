//! # Schema Enforcement
//!
//! Validation of model-run documents against the input and output JSON
//! Schemas (Draft 7).
//!
//! ## Contract
//!
//! A document either conforms, or enforcement fails with a single
//! [`SchemaValidationError::ValidationFailed`] listing *every* violation
//! the checker found, so a caller can fix all problems in one pass. The
//! rendered message always starts with a fixed prefix:
//!
//! - `Invalid model input JSON. Details:`
//! - `Invalid model output JSON. Details:`
//!
//! Downstream consumers match on these literal strings.
//!
//! Reading or parsing a document from disk can fail before any schema check
//! runs. Those failures are reported as [`SchemaValidationError::DocumentRead`]
//! and [`SchemaValidationError::DocumentParse`] and do not carry the prefix.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use jsonschema::Validator;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::schemas::{SchemaSet, INPUT_SCHEMA_NAME, OUTPUT_SCHEMA_NAME};

/// Which side of a model run a document describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// A simulation request handed to the model runner.
    Input,
    /// A normalized simulation result produced by a model.
    Output,
}

impl DocumentKind {
    /// The fixed leading message of a [`SchemaValidationError::ValidationFailed`]
    /// for this kind of document.
    pub const fn error_prefix(self) -> &'static str {
        match self {
            Self::Input => "Invalid model input JSON. Details:",
            Self::Output => "Invalid model output JSON. Details:",
        }
    }

    /// Filename of the schema this kind of document is checked against.
    pub const fn schema_name(self) -> &'static str {
        match self {
            Self::Input => INPUT_SCHEMA_NAME,
            Self::Output => OUTPUT_SCHEMA_NAME,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// A schema failed to compile into a validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("validator build error for schema '{schema_name}': {reason}")]
pub struct SchemaBuildError {
    /// Schema filename or identifier.
    pub schema_name: String,
    /// Reason the validator could not be built.
    pub reason: String,
}

/// Error during schema enforcement.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The document did not conform to the schema.
    #[error("{}\n{violations}", .kind.error_prefix())]
    ValidationFailed {
        /// Which schema the document was checked against.
        kind: DocumentKind,
        /// Every violation found, in checker order.
        violations: ValidationViolations,
    },

    /// The document file could not be read.
    #[error("cannot read document '{}': {source}", .path.display())]
    DocumentRead {
        /// Path to the document that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The document file is not well-formed JSON.
    #[error("document '{}' is not valid JSON: {source}", .path.display())]
    DocumentParse {
        /// Path to the document that failed to parse.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// A schema file could not be loaded.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoad {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// A schema could not be compiled.
    #[error(transparent)]
    ValidatorBuild(#[from] SchemaBuildError),
}

impl SchemaValidationError {
    /// The violations carried by a `ValidationFailed` error, if any.
    pub fn violations(&self) -> Option<&ValidationViolations> {
        match self {
            Self::ValidationFailed { violations, .. } => Some(violations),
            _ => None,
        }
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Compiled input and output schemas.
///
/// ## Thread Safety
///
/// `SchemaEnforcer` is `Send + Sync` and holds no mutable state after
/// construction. [`SchemaEnforcer::global`] hands out one shared instance
/// per process.
pub struct SchemaEnforcer {
    input: Validator,
    output: Validator,
}

impl fmt::Debug for SchemaEnforcer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaEnforcer").finish_non_exhaustive()
    }
}

/// A failure to build the global enforcer, kept so every later caller sees
/// the same error kind.
#[derive(Debug, Clone, PartialEq, Eq)]
enum GlobalInitError {
    Load { schema_name: String, reason: String },
    Build(SchemaBuildError),
}

impl From<SchemaValidationError> for GlobalInitError {
    fn from(err: SchemaValidationError) -> Self {
        match err {
            SchemaValidationError::SchemaLoad { schema_name, reason } => {
                Self::Load { schema_name, reason }
            }
            SchemaValidationError::ValidatorBuild(build) => Self::Build(build),
            // Building from embedded schemas never touches a document.
            other => Self::Build(SchemaBuildError {
                schema_name: "embedded schema set".to_string(),
                reason: other.to_string(),
            }),
        }
    }
}

impl From<&GlobalInitError> for SchemaValidationError {
    fn from(err: &GlobalInitError) -> Self {
        match err {
            GlobalInitError::Load { schema_name, reason } => Self::SchemaLoad {
                schema_name: schema_name.clone(),
                reason: reason.clone(),
            },
            GlobalInitError::Build(build) => Self::ValidatorBuild(build.clone()),
        }
    }
}

static GLOBAL_ENFORCER: OnceLock<Result<SchemaEnforcer, GlobalInitError>> = OnceLock::new();

impl SchemaEnforcer {
    /// Compile both schemas of `set`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidatorBuild` if either schema is not
    /// a valid Draft 7 schema or has an unresolvable `$ref`.
    pub fn new(set: &SchemaSet) -> Result<Self, SchemaValidationError> {
        Ok(Self {
            input: compile(set, &set.input, INPUT_SCHEMA_NAME)?,
            output: compile(set, &set.output, OUTPUT_SCHEMA_NAME)?,
        })
    }

    /// Compile the schemas embedded in this crate.
    pub fn embedded() -> Result<Self, SchemaValidationError> {
        Self::new(&SchemaSet::embedded()?)
    }

    /// Compile `model-input.schema.json` and `model-output.schema.json`
    /// found in `schema_dir`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoad` if either file is missing
    /// or malformed, and `SchemaValidationError::ValidatorBuild` if it does
    /// not compile.
    pub fn from_dir(schema_dir: impl AsRef<Path>) -> Result<Self, SchemaValidationError> {
        Self::new(&SchemaSet::from_dir(schema_dir)?)
    }

    /// The process-wide enforcer built from the embedded schemas.
    ///
    /// Compiled on first use; every later call returns the same instance
    /// (or the same failure: `SchemaLoad` for an unparsable embedded
    /// schema, `ValidatorBuild` for one that does not compile).
    pub fn global() -> Result<&'static Self, SchemaValidationError> {
        GLOBAL_ENFORCER
            .get_or_init(|| Self::embedded().map_err(GlobalInitError::from))
            .as_ref()
            .map_err(SchemaValidationError::from)
    }

    /// Validate `document` against the schema for `kind`.
    ///
    /// Runs the full check without stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidationFailed` carrying every
    /// violation if the document does not conform.
    pub fn enforce(&self, kind: DocumentKind, document: &Value) -> Result<(), SchemaValidationError> {
        let validator = match kind {
            DocumentKind::Input => &self.input,
            DocumentKind::Output => &self.output,
        };

        let violations: Vec<Violation> = validator
            .iter_errors(document)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            tracing::debug!(%kind, "document conforms to schema");
            Ok(())
        } else {
            tracing::debug!(
                %kind,
                violation_count = violations.len(),
                "document failed schema validation"
            );
            Err(SchemaValidationError::ValidationFailed {
                kind,
                violations: ValidationViolations { violations },
            })
        }
    }

    /// Validate a parsed model input document.
    pub fn enforce_input(&self, document: &Value) -> Result<(), SchemaValidationError> {
        self.enforce(DocumentKind::Input, document)
    }

    /// Validate a parsed model output document.
    pub fn enforce_output(&self, document: &Value) -> Result<(), SchemaValidationError> {
        self.enforce(DocumentKind::Output, document)
    }

    /// Read the JSON document at `path` and validate it against the schema
    /// for `kind`.
    ///
    /// # Errors
    ///
    /// Returns `DocumentRead` if the file cannot be read, `DocumentParse` if
    /// it is not JSON, and `ValidationFailed` if it does not conform.
    pub fn enforce_file(&self, kind: DocumentKind, path: &Path) -> Result<(), SchemaValidationError> {
        let document = load_document(path)?;
        tracing::debug!(%kind, path = %path.display(), "loaded document");
        self.enforce(kind, &document)
    }
}

fn compile(set: &SchemaSet, schema: &Value, schema_name: &str) -> Result<Validator, SchemaBuildError> {
    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft7);
    opts.with_retriever(set.retriever());

    let validator = opts.build(schema).map_err(|e| SchemaBuildError {
        schema_name: schema_name.to_string(),
        reason: e.to_string(),
    })?;
    tracing::debug!(schema_name, "compiled schema");
    Ok(validator)
}

/// Read and parse the JSON document at `path`.
///
/// # Errors
///
/// Returns `DocumentRead` on I/O failure and `DocumentParse` on malformed JSON,
/// including content that is not UTF-8.
pub fn load_document(path: &Path) -> Result<Value, SchemaValidationError> {
    let content = std::fs::read(path).map_err(|source| SchemaValidationError::DocumentRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&content).map_err(|source| SchemaValidationError::DocumentParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Validate a parsed model input document against the embedded input schema.
///
/// # Errors
///
/// Fails with a message starting `Invalid model input JSON. Details:` that
/// lists every violation.
pub fn enforce_input_schema(document: &Value) -> Result<(), SchemaValidationError> {
    SchemaEnforcer::global()?.enforce_input(document)
}

/// Read the model output document at `path` and validate it against the
/// embedded output schema.
///
/// # Errors
///
/// Fails with a message starting `Invalid model output JSON. Details:` that
/// lists every violation. Unreadable files and malformed JSON surface as
/// `DocumentRead` / `DocumentParse` instead.
pub fn enforce_output_schema(path: &Path) -> Result<(), SchemaValidationError> {
    SchemaEnforcer::global()?.enforce_file(DocumentKind::Output, path)
}

/// Validate a parsed model output document against the embedded output schema.
pub fn enforce_output_document(document: &Value) -> Result<(), SchemaValidationError> {
    SchemaEnforcer::global()?.enforce_output(document)
}

/// Read the model input document at `path` and validate it against the
/// embedded input schema.
pub fn enforce_input_file(path: &Path) -> Result<(), SchemaValidationError> {
    SchemaEnforcer::global()?.enforce_file(DocumentKind::Input, path)
}
