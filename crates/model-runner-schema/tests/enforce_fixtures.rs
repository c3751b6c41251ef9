//! Integration test: enforce the model input and output schemas against the
//! fixture documents shipped with the model runner.

use std::path::PathBuf;

use model_runner_schema::{
    enforce_input_schema, enforce_output_schema, load_document, SchemaEnforcer,
    SchemaValidationError,
};
use serde_json::Value;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_fixture(name: &str) -> Value {
    let content = std::fs::read_to_string(fixture(name)).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[test]
fn enforce_input_schema_on_valid_input() {
    let input = read_fixture("test-job-mrc-ide-covidsim.json");
    enforce_input_schema(&input).unwrap();
}

#[test]
fn enforce_input_schema_on_invalid_input() {
    let input: Value = serde_json::from_str("{}").unwrap();
    let err = enforce_input_schema(&input).unwrap_err();
    assert!(
        err.to_string().starts_with("Invalid model input JSON. Details:"),
        "unexpected message: {err}"
    );
}

#[test]
fn enforce_output_schema_on_valid_output() {
    enforce_output_schema(&fixture("valid-output.json")).unwrap();
}

#[test]
fn enforce_output_schema_on_invalid_output() {
    let err = enforce_output_schema(&fixture("bad-output-schema.json")).unwrap_err();
    assert!(
        err.to_string().starts_with("Invalid model output JSON. Details:"),
        "unexpected message: {err}"
    );
}

#[test]
fn invalid_output_lists_every_violation() {
    let err = enforce_output_schema(&fixture("bad-output-schema.json")).unwrap_err();
    let violations = match &err {
        SchemaValidationError::ValidationFailed { violations, .. } => violations,
        other => panic!("Expected ValidationFailed, got: {other}"),
    };

    // Missing `aggregate`, plus two non-integer timestamps.
    assert_eq!(violations.len(), 3, "got:\n{violations}");

    let paths: Vec<&str> = violations
        .violations()
        .iter()
        .map(|v| v.instance_path.as_str())
        .collect();
    assert!(paths.contains(&""));
    assert!(paths.contains(&"/time/timestamps/0"));
    assert!(paths.contains(&"/time/timestamps/1"));

    let message = err.to_string();
    assert!(message.contains("\"aggregate\""));
    assert!(message.contains("\"day-0\""));
    assert!(message.contains("\"day-1\""));
}

#[test]
fn repeated_enforcement_is_stable() {
    let input = read_fixture("test-job-mrc-ide-covidsim.json");
    enforce_input_schema(&input).unwrap();
    enforce_input_schema(&input).unwrap();

    let path = fixture("bad-output-schema.json");
    let first = enforce_output_schema(&path).unwrap_err().to_string();
    let second = enforce_output_schema(&path).unwrap_err().to_string();
    assert_eq!(first, second);
}

#[test]
fn request_configuration_is_valid_output_metadata() {
    // A result echoes the configuration it was run with.
    let input = read_fixture("test-job-mrc-ide-covidsim.json");
    let mut output = load_document(&fixture("valid-output.json")).unwrap();
    output["metadata"] = input["configuration"].clone();
    SchemaEnforcer::global()
        .unwrap()
        .enforce_output(&output)
        .unwrap();
}

#[test]
fn enforcer_from_schema_dir_matches_embedded() {
    let schema_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("schemas");
    let enforcer = SchemaEnforcer::from_dir(&schema_dir).unwrap();

    enforcer
        .enforce_input(&read_fixture("test-job-mrc-ide-covidsim.json"))
        .unwrap();
    enforcer
        .enforce_output(&read_fixture("valid-output.json"))
        .unwrap();

    let from_dir = enforcer
        .enforce_output(&read_fixture("bad-output-schema.json"))
        .unwrap_err()
        .to_string();
    let embedded = enforce_output_schema(&fixture("bad-output-schema.json"))
        .unwrap_err()
        .to_string();
    assert_eq!(from_dir, embedded);
}
