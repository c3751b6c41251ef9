//! # model-runner CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use model_runner_cli::load_enforcer;
use model_runner_cli::validate::{run_validate, ValidateArgs};

/// Model runner schema tooling.
///
/// Checks simulation requests and model results against the published
/// model input and output JSON Schemas.
#[derive(Parser, Debug)]
#[command(name = "model-runner", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory containing model-input.schema.json and
    /// model-output.schema.json. Defaults to the embedded schemas.
    #[arg(long, global = true)]
    schema_dir: Option<PathBuf>,

    /// Emit log lines as JSON objects.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a model input or output document against its schema.
    Validate(ValidateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let enforcer = match load_enforcer(cli.schema_dir.as_deref()) {
        Ok(enforcer) => enforcer,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(2);
        }
    };

    let mut stdout = std::io::stdout().lock();
    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &enforcer, &mut stdout),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_runner_cli::validate::KindArg;

    #[test]
    fn cli_parse_validate_input() {
        let cli = Cli::try_parse_from(["model-runner", "validate", "input", "job.json"]).unwrap();
        let Commands::Validate(args) = cli.command;
        assert_eq!(args.kind, KindArg::Input);
        assert_eq!(args.path, PathBuf::from("job.json"));
        assert!(!args.json);
    }

    #[test]
    fn cli_parse_validate_output_json() {
        let cli =
            Cli::try_parse_from(["model-runner", "validate", "output", "out.json", "--json"])
                .unwrap();
        let Commands::Validate(args) = cli.command;
        assert_eq!(args.kind, KindArg::Output);
        assert!(args.json);
    }

    #[test]
    fn cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "model-runner",
            "-vv",
            "validate",
            "--schema-dir",
            "schemas",
            "input",
            "job.json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.schema_dir, Some(PathBuf::from("schemas")));
        assert!(!cli.log_json);
    }

    #[test]
    fn cli_parse_log_json() {
        let cli = Cli::try_parse_from([
            "model-runner",
            "--log-json",
            "validate",
            "output",
            "out.json",
        ])
        .unwrap();
        assert!(cli.log_json);
    }

    #[test]
    fn cli_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["model-runner", "validate", "request", "job.json"]).is_err());
    }

    #[test]
    fn cli_requires_path() {
        assert!(Cli::try_parse_from(["model-runner", "validate", "input"]).is_err());
    }
}
