//! License detection over an extracted source tree.
//!
//! This module provides:
//! - [`candidate`] - file-name rules selecting files worth reading
//! - [`classifier`] - license identification for one file's text
//! - [`markers`] - SPDX tags and well-known license titles
//! - [`templates`] - the embedded template corpus
//!
//! [`LicenseScanner`] walks a directory, classifies each candidate file and
//! merges the findings into one map keyed by SPDX identifier.

pub mod candidate;
pub mod classifier;
pub mod markers;
pub mod templates;

use crate::config::ScanConfig;
use candidate::{SKIPPED_DIRECTORIES, is_license_candidate};
use classifier::TemplateClassifier;
use log::{debug, trace};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Identifier to best confidence, ordered by identifier.
pub type Findings = BTreeMap<String, f32>;

/// Errors raised while scanning a source tree.
#[derive(Debug, Error)]
pub enum ScanError {
    /// No candidate file matched any template.
    #[error("no license file was found")]
    NoLicenseFound,

    /// The directory tree could not be traversed.
    #[error("failed to walk {path}: {source}")]
    Walk {
        /// Directory being walked.
        path: PathBuf,
        /// Underlying traversal error.
        #[source]
        source: walkdir::Error,
    },

    /// A candidate file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Candidate file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A candidate file is not valid UTF-8 text.
    #[error("{path} is not valid UTF-8")]
    Encoding {
        /// Candidate file path.
        path: PathBuf,
    },
}

/// Walks a source tree and classifies license candidates.
#[derive(Debug)]
pub struct LicenseScanner {
    classifier: TemplateClassifier,
    max_file_size: u64,
}

impl LicenseScanner {
    /// Create a scanner with the given tuning.
    #[must_use]
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            classifier: TemplateClassifier::new(config.confidence_threshold),
            max_file_size: config.max_file_size,
        }
    }

    /// Scan `root` recursively and return every license found.
    ///
    /// When a license matches in several files its highest confidence is
    /// kept.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NoLicenseFound`] when nothing matched, and the
    /// other variants when the tree or a candidate file cannot be read.
    pub fn scan(&self, root: &Path) -> Result<Findings, ScanError> {
        let mut findings = Findings::new();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_skipped_directory(entry));

        for entry in walker {
            let entry = entry.map_err(|source| ScanError::Walk {
                path: root.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if !is_license_candidate(&name) {
                trace!("ignoring {}", entry.path().display());
                continue;
            }
            self.scan_file(entry.path(), &mut findings)?;
        }

        if findings.is_empty() {
            return Err(ScanError::NoLicenseFound);
        }
        Ok(findings)
    }

    fn scan_file(&self, path: &Path, findings: &mut Findings) -> Result<(), ScanError> {
        let read_error = |source| ScanError::Read {
            path: path.to_path_buf(),
            source,
        };
        let size = std::fs::metadata(path).map_err(read_error)?.len();
        if size > self.max_file_size {
            debug!("skipping {} ({size} bytes exceeds cap)", path.display());
            return Ok(());
        }
        let bytes = std::fs::read(path).map_err(read_error)?;
        let text = decode(&bytes).ok_or_else(|| ScanError::Encoding {
            path: path.to_path_buf(),
        })?;

        for finding in self.classifier.classify(text) {
            debug!(
                "{} matches {} ({:.3})",
                path.display(),
                finding.identifier,
                finding.confidence
            );
            let best = findings.entry(finding.identifier).or_insert(0.0);
            *best = best.max(finding.confidence);
        }
        Ok(())
    }
}

fn is_skipped_directory(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && SKIPPED_DIRECTORIES
            .iter()
            .any(|skipped| entry.file_name() == *skipped)
}

fn decode(bytes: &[u8]) -> Option<&str> {
    let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    std::str::from_utf8(body).ok()
}

#[cfg(test)]
#[path = "scan_tests.rs"]
mod tests;
