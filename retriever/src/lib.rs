//! License retrieval for upstream dependencies.
//!
//! Given a dependency name and the URL of its source artefact, this crate
//! downloads the artefact, unpacks it according to the dependency's
//! packaging strategy and classifies the license files it contains. It is
//! used by the `get-licenses` CLI binary and can be consumed
//! programmatically.
//!
//! # Modules
//!
//! - [`artifact`] - Download and archive extraction
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - TOML configuration with built-in defaults
//! - [`error`] - Retrieval error taxonomy
//! - [`output`] - CI output line and JSON report formatting
//! - [`retriever`] - Pipeline orchestration and the public entry point
//! - [`scan`] - License file discovery and classification
//! - [`strategy`] - Dependency name to packaging strategy mapping

pub mod artifact;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod retriever;
pub mod scan;
pub mod strategy;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use error::{Result, RetrievalError};
pub use retriever::{LicenseReport, LicenseRetriever, RetrievalRequest};
