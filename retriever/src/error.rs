//! Error taxonomy of a license retrieval.
//!
//! A successful lookup that finds no license is not an error: it yields an
//! empty result. Every variant here is a genuine failure of the pipeline
//! and carries the context needed to act on it.

use crate::artifact::extraction::ExtractError;
use crate::artifact::fetch::FetchError;
use crate::scan::ScanError;
use std::fmt;
use thiserror::Error;

/// Which extraction pass failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractionStage {
    /// The downloaded artefact itself.
    Source,
    /// The inner archive of a nested artefact.
    InnerSource,
}

impl fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source file"),
            Self::InnerSource => f.write_str("inner source file"),
        }
    }
}

/// Errors that end a license retrieval.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The request could not be completed.
    #[error("failed to query url {url}: {reason}")]
    FetchFailed {
        /// URL of the source artefact.
        url: String,
        /// Description of the transport failure.
        reason: String,
    },

    /// The server answered with a non-2xx status.
    #[error("failed to query url {url} with: status code {code}")]
    BadStatus {
        /// URL of the source artefact.
        url: String,
        /// HTTP status code returned.
        code: u16,
    },

    /// The artefact could not be saved or unpacked.
    #[error("failed to decompress {stage}: {source}")]
    ExtractionFailed {
        /// The extraction pass that failed.
        stage: ExtractionStage,
        /// Underlying extraction error.
        #[source]
        source: ExtractError,
    },

    /// License detection failed for a reason other than finding nothing.
    #[error("failed to detect licenses: {source}")]
    ScanFailed {
        /// Underlying scan error.
        #[source]
        source: ScanError,
    },

    /// The scoped working directory could not be created.
    #[error("failed to create working directory: {source}")]
    Workspace {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl From<FetchError> for RetrievalError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::Transport { url, reason } => Self::FetchFailed { url, reason },
            FetchError::BadStatus { url, code } => Self::BadStatus { url, code },
        }
    }
}

impl RetrievalError {
    /// Wrap an extraction error with the pass it occurred in.
    #[must_use]
    pub fn extraction(stage: ExtractionStage, source: ExtractError) -> Self {
        Self::ExtractionFailed { stage, source }
    }
}

/// Result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;
