//! # Validate Subcommand
//!
//! Checks a single JSON document against the model input or output schema.
//!
//! Exit codes: 0 when the document conforms, 1 when it violates the schema.
//! Unreadable or malformed documents are operational errors returned as
//! `Err` and mapped to exit code 2 by the binary.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use model_runner_schema::{DocumentKind, SchemaEnforcer, SchemaValidationError, Violation};

/// Which contract to check the document against.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    /// Simulation request (model-input.schema.json).
    Input,
    /// Model result (model-output.schema.json).
    Output,
}

impl From<KindArg> for DocumentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Input => Self::Input,
            KindArg::Output => Self::Output,
        }
    }
}

/// Arguments for the `model-runner validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema to validate against.
    #[arg(value_enum)]
    pub kind: KindArg,

    /// Path to the JSON document.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Print a JSON report instead of plain text.
    #[arg(long)]
    pub json: bool,
}

/// Machine-readable result of a `validate` run.
#[derive(Serialize, Debug)]
pub struct ValidationReport<'a> {
    /// The document that was checked.
    pub path: &'a Path,
    /// The schema it was checked against.
    pub kind: DocumentKind,
    /// Whether the document conforms.
    pub valid: bool,
    /// Every violation found; empty when `valid`.
    pub violations: &'a [Violation],
}

/// Execute the validate subcommand, writing the result to `out`.
///
/// Returns exit code: 0 on success, 1 on schema violation.
pub fn run_validate(
    args: &ValidateArgs,
    enforcer: &SchemaEnforcer,
    out: &mut impl Write,
) -> Result<u8> {
    let kind = DocumentKind::from(args.kind);
    let result = match enforcer.enforce_file(kind, &args.path) {
        Err(e) if e.violations().is_none() => {
            return Err(e).with_context(|| format!("failed to validate {}", args.path.display()));
        }
        other => other,
    };

    let violations: &[Violation] = result
        .as_ref()
        .err()
        .and_then(SchemaValidationError::violations)
        .map(|v| v.violations())
        .unwrap_or_default();
    let code = u8::from(result.is_err());

    tracing::info!(
        %kind,
        path = %args.path.display(),
        violation_count = violations.len(),
        "validated document"
    );

    if args.json {
        let report = ValidationReport {
            path: &args.path,
            kind,
            valid: code == 0,
            violations,
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        match &result {
            Ok(()) => writeln!(
                out,
                "OK: {} conforms to the model {kind} schema",
                args.path.display()
            )?,
            Err(e) => writeln!(out, "FAIL: {}\n{e}", args.path.display())?,
        }
    }

    Ok(code)
}
