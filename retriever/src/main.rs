//! `get-licenses` CLI entrypoint.
//!
//! Looks up the licenses of one dependency and prints them as a CI output
//! line (or a JSON report with `--json`). Progress is logged to stderr;
//! failures print `Error: <message>` and exit with status 1.

use clap::Parser;
use license_retriever::cli::{Cli, CliError};
use license_retriever::config::RetrieverConfig;
use license_retriever::output::{write_json_report, write_report};
use license_retriever::retriever::{LicenseRetriever, RetrievalRequest};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging(cli: &Cli) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(cli.log_level())
        .format_timestamp(None)
        .parse_default_env();
    if builder.try_init().is_err() {
        // A logger is already installed.
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write) -> Result<(), CliError> {
    let (dependency_name, url) = cli.lookup_target()?;
    let config = RetrieverConfig::load(cli.config.as_deref())?;
    let retriever = LicenseRetriever::new(&config);

    let report = retriever.lookup_report(&RetrievalRequest::new(dependency_name, url))?;

    if cli.json {
        write_json_report(&report, stdout)?;
    } else {
        write_report(&report, stdout)?;
    }
    Ok(())
}

fn exit_code_for_run_result(result: Result<(), CliError>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format_args!("Error: {err}"));
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort reporting; ignore write failures.
    }
}
