//! # model-runner-schema — Model Run Schema Enforcement
//!
//! Checks the JSON documents that flow through the model runner against
//! their published JSON Schemas:
//!
//! - **Input:** the simulation request (`RequestInput`) handed to a model
//!   container, validated with [`enforce_input_schema`].
//! - **Output:** the normalized result (`ModelOutput`) a model writes to
//!   disk, validated with [`enforce_output_schema`].
//!
//! ## Design
//!
//! Both schemas are embedded at compile time ([`schemas`]) and compiled
//! once per process into a shared [`SchemaEnforcer`]. Validation never
//! stops at the first problem: a failure is a single
//! [`SchemaValidationError::ValidationFailed`] whose message starts with
//! `Invalid model input JSON. Details:` or
//! `Invalid model output JSON. Details:` and lists every violation.
//!
//! Deployments that pin a different schema revision can build an enforcer
//! from a directory with [`SchemaEnforcer::from_dir`].

pub mod schemas;
pub mod validate;

// Re-export primary types for ergonomic imports.
pub use schemas::{SchemaSet, INPUT_SCHEMA_NAME, OUTPUT_SCHEMA_NAME, SCHEMA_URI_PREFIX};
pub use validate::{
    enforce_input_file, enforce_input_schema, enforce_output_document, enforce_output_schema,
    load_document, DocumentKind, SchemaBuildError, SchemaEnforcer, SchemaValidationError,
    ValidationViolations, Violation,
};
