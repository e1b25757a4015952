//! CLI argument definitions for `get-licenses`.
//!
//! Both lookup flags are optional at the clap level so that a missing flag
//! is reported in the same `Error: ...` form as every other failure, before
//! any network access happens.

use crate::config::ConfigError;
use crate::error::RetrievalError;
use camino::Utf8PathBuf;
use clap::Parser;
use log::LevelFilter;
use thiserror::Error;

/// Retrieve the licenses of an upstream dependency.
#[derive(Parser, Debug, Default)]
#[command(name = "get-licenses")]
#[command(version, about)]
#[command(long_about = concat!(
    "Retrieve the licenses of an upstream dependency.\n\n",
    "The source artefact at --url is downloaded, unpacked according to the ",
    "packaging strategy of --dependency-name, and scanned for license files. ",
    "The sorted SPDX identifiers are printed as a CI output line.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Look up a generic tarball:\n",
    "    $ get-licenses --dependency-name node \\\n",
    "        --url https://nodejs.org/dist/v22.0.0/node-v22.0.0.tar.gz\n\n",
    "  Emit a JSON report instead:\n",
    "    $ get-licenses --dependency-name bundler --url <gem-url> --json",
))]
pub struct Cli {
    /// Dependency name, matched case-sensitively against the strategy table.
    #[arg(long, value_name = "NAME")]
    pub dependency_name: Option<String>,

    /// URL of the dependency's upstream source artefact.
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// TOML file overriding strategies, scan and fetch settings.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Print the report as JSON instead of the CI output line.
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Return the dependency name and URL, or the first missing flag.
    ///
    /// Empty values count as missing.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingFlag`] naming the absent flag.
    ///
    /// # Examples
    ///
    /// ```
    /// use license_retriever::cli::Cli;
    ///
    /// let cli = Cli {
    ///     dependency_name: Some("node".to_owned()),
    ///     ..Cli::default()
    /// };
    /// let err = cli.lookup_target().unwrap_err();
    /// assert_eq!(err.to_string(), "missing required flag --url");
    /// ```
    pub fn lookup_target(&self) -> Result<(&str, &str), CliError> {
        let dependency_name = required(self.dependency_name.as_deref(), "dependency-name")?;
        let url = required(self.url.as_deref(), "url")?;
        Ok((dependency_name, url))
    }

    /// Log level implied by `-v` and `-q`.
    #[must_use]
    pub const fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbosity {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn required<'a>(value: Option<&'a str>, flag: &'static str) -> Result<&'a str, CliError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(CliError::MissingFlag { flag }),
    }
}

/// Failures of a CLI run.
#[derive(Debug, Error)]
pub enum CliError {
    /// A required flag was absent or empty.
    #[error("missing required flag --{flag}")]
    MissingFlag {
        /// Flag name without the leading dashes.
        flag: &'static str,
    },

    /// The configuration file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The lookup failed.
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    /// The report could not be serialised.
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),

    /// Writing to standard output failed.
    #[error("failed to write output: {0}")]
    Write(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
