//! slatejs CLI
//!
//! A command-line interface for the slatejs runtime.

use anyhow::Context;
use clap::{Parser, Subcommand};
use slatejs::runtime::temporal;
use slatejs::test_runner::{builtin_suites, TestConfig, TestRunner};
use slatejs::{Runtime, Value, VERSION};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slatejs")]
#[command(author, version, about = "Receiver binding and Temporal.Instant for JavaScript, in Rust", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the built-in conformance suites
    Test {
        /// Filter tests by name pattern
        #[arg(short, long)]
        filter: Option<String>,
        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
        /// Also write the JSON report to this file
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
        /// Stop at the first failure
        #[arg(long)]
        fail_fast: bool,
    },

    /// Construct a Temporal.Instant from epoch nanoseconds
    Instant {
        /// Epoch nanoseconds (decimal, or 0x/0o/0b prefixed)
        #[arg(allow_hyphen_values = true)]
        nanoseconds: String,
        /// Compare against another instant (nanoseconds or an RFC 3339 string)
        #[arg(long, value_name = "OTHER", allow_hyphen_values = true)]
        equals: Option<String>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose)?;
    tracing::debug!(version = VERSION, "slatejs starting");

    match cli.command {
        Commands::Test {
            filter,
            json,
            report,
            fail_fast,
        } => run_tests(filter, json, report, fail_fast, cli.verbose > 0),
        Commands::Instant {
            nanoseconds,
            equals,
        } => Ok(run_instant(&nanoseconds, equals.as_deref())),
    }
}

fn setup_logging(verbosity: u8) -> anyhow::Result<()> {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::from_default_env().add_directive(
        format!("slatejs={}", level)
            .parse::<Directive>()
            .context("invalid log directive")?,
    );
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn run_tests(
    filter: Option<String>,
    json: bool,
    report_path: Option<PathBuf>,
    fail_fast: bool,
    verbose: bool,
) -> anyhow::Result<ExitCode> {
    let config = TestConfig {
        filter,
        verbose,
        fail_fast,
    };
    let mut runner = TestRunner::new(config);
    for suite in builtin_suites() {
        runner.add_suite(suite);
    }

    let report = runner.run();
    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report);
    }
    if let Some(path) = report_path {
        report
            .write_json(&path)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_instant(nanoseconds: &str, other: Option<&str>) -> ExitCode {
    let mut runtime = Runtime::new();
    match evaluate_instant(&mut runtime, nanoseconds, other) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            match err.kind() {
                Some(kind) => eprintln!("{}: {}", kind, err.message()),
                None => eprintln!("{}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn evaluate_instant(
    runtime: &mut Runtime,
    nanoseconds: &str,
    other: Option<&str>,
) -> slatejs::Result<String> {
    let constructor = runtime.lookup("Temporal.Instant")?;
    let instant = runtime.construct(&constructor, &[Value::from(nanoseconds)])?;

    let Some(other) = other else {
        return Ok(format!("{:?}", instant));
    };

    // BigInt literals name epoch nanoseconds; anything else goes through string parsing
    let other = if temporal::to_big_int(&Value::from(other)).is_ok() {
        runtime.construct(&constructor, &[Value::from(other)])?
    } else {
        Value::from(other)
    };
    let result = runtime.call_method(&instant, "equals", &[other])?;
    Ok(result.to_js_string())
}
