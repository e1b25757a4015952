//! Retrieval orchestration: fetch, extract, scan and normalise.
//!
//! [`LicenseRetriever`] is the public entry point. A call walks the stages
//! `Idle -> Fetching -> Extracting -> Scanning -> Done`; any stage may end
//! in failure instead. The artefact and its extracted tree live in a
//! temporary directory owned by the call, which is removed on every exit
//! path because it is dropped with the call's stack frame.

use crate::artifact::extraction::{ArchiveExtractor, ExtractError, SniffingExtractor};
use crate::artifact::fetch::{ArtifactFetcher, HttpFetcher};
use crate::config::RetrieverConfig;
use crate::error::{ExtractionStage, Result, RetrievalError};
use crate::scan::{LicenseScanner, ScanError};
use crate::strategy::{PackagingStrategy, StrategyTable};
use log::{debug, info, warn};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Prefix of every per-call working directory.
pub const WORKSPACE_PREFIX: &str = "dep-licenses-";

const ARTIFACT_FILE_NAME: &str = "artifact";
const TREE_DIR_NAME: &str = "tree";

/// One lookup: which dependency and where its source lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetrievalRequest {
    /// Dependency name, matched case-sensitively against the strategy table.
    pub dependency_name: String,
    /// URL of the upstream source artefact.
    pub source_url: String,
}

impl RetrievalRequest {
    /// Build a request from borrowed parts.
    #[must_use]
    pub fn new(dependency_name: &str, source_url: &str) -> Self {
        Self {
            dependency_name: dependency_name.to_owned(),
            source_url: source_url.to_owned(),
        }
    }
}

/// Outcome of a successful lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LicenseReport {
    /// Dependency the report describes.
    pub dependency: String,
    /// Unique license identifiers, sorted ascending.
    pub licenses: Vec<String>,
    /// Lowercase hex SHA-256 of the fetched artefact, absent when skipped.
    pub source_sha256: Option<String>,
}

impl LicenseReport {
    /// Whether the lookup short-circuited without fetching anything.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        self.source_sha256.is_none()
    }
}

/// Pipeline stage of a single lookup, used for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetrievalStage {
    /// Strategy resolved, nothing started.
    Idle,
    /// Downloading the artefact.
    Fetching,
    /// Unpacking the artefact.
    Extracting,
    /// Classifying candidate files.
    Scanning,
    /// Result produced.
    Done,
}

impl fmt::Display for RetrievalStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Scanning => "scanning",
            Self::Done => "done",
        };
        f.write_str(label)
    }
}

/// Determines the licenses of upstream dependencies.
///
/// Holds no per-call state, so one retriever may serve many lookups.
///
/// # Examples
///
/// ```no_run
/// use license_retriever::config::RetrieverConfig;
/// use license_retriever::retriever::LicenseRetriever;
///
/// let retriever = LicenseRetriever::new(&RetrieverConfig::default());
/// let licenses = retriever
///     .lookup_licenses("node", "https://nodejs.org/dist/v22.0.0/node-v22.0.0.tar.gz")?;
/// println!("{licenses:?}");
/// # Ok::<(), license_retriever::error::RetrievalError>(())
/// ```
pub struct LicenseRetriever {
    strategies: StrategyTable,
    fetcher: Box<dyn ArtifactFetcher>,
    extractor: Box<dyn ArchiveExtractor>,
    scanner: LicenseScanner,
    temp_root: Option<PathBuf>,
}

impl LicenseRetriever {
    /// Build a retriever using HTTP and the sniffing extractor.
    #[must_use]
    pub fn new(config: &RetrieverConfig) -> Self {
        Self::with_parts(
            config,
            Box::new(HttpFetcher::new(config.fetch.timeout())),
            Box::new(SniffingExtractor),
        )
    }

    /// Build a retriever with injected transport and extraction.
    #[must_use]
    pub fn with_parts(
        config: &RetrieverConfig,
        fetcher: Box<dyn ArtifactFetcher>,
        extractor: Box<dyn ArchiveExtractor>,
    ) -> Self {
        Self {
            strategies: config.strategies.clone(),
            fetcher,
            extractor,
            scanner: LicenseScanner::new(&config.scan),
            temp_root: None,
        }
    }

    /// Create working directories under `root` instead of the system
    /// temporary directory.
    #[must_use]
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    /// Return the sorted, unique license identifiers of a dependency.
    ///
    /// An empty vector is a successful answer: the dependency is skipped or
    /// its source holds no recognisable license file.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError`] when the artefact cannot be fetched,
    /// unpacked or scanned.
    pub fn lookup_licenses(&self, dependency_name: &str, source_url: &str) -> Result<Vec<String>> {
        let request = RetrievalRequest::new(dependency_name, source_url);
        self.lookup_report(&request).map(|report| report.licenses)
    }

    /// Run the full pipeline and return the licenses with provenance.
    ///
    /// # Errors
    ///
    /// See [`Self::lookup_licenses`].
    pub fn lookup_report(&self, request: &RetrievalRequest) -> Result<LicenseReport> {
        let strategy = self.strategies.select(&request.dependency_name);
        debug!(
            "{} uses the {} strategy",
            request.dependency_name,
            strategy.label()
        );
        enter(RetrievalStage::Idle);

        if strategy == PackagingStrategy::Skip {
            info!(
                "skipping {}: no automatically retrievable license",
                request.dependency_name
            );
            enter(RetrievalStage::Done);
            return Ok(LicenseReport {
                dependency: request.dependency_name.clone(),
                licenses: Vec::new(),
                source_sha256: None,
            });
        }

        let workspace = self.create_workspace()?;
        let (licenses, digest) = self.retrieve(request, &strategy, workspace.path())?;
        if let Err(err) = workspace.close() {
            warn!("failed to remove working directory: {err}");
        }
        enter(RetrievalStage::Done);

        Ok(LicenseReport {
            dependency: request.dependency_name.clone(),
            licenses,
            source_sha256: Some(digest),
        })
    }

    fn retrieve(
        &self,
        request: &RetrievalRequest,
        strategy: &PackagingStrategy,
        workspace: &Path,
    ) -> Result<(Vec<String>, String)> {
        enter(RetrievalStage::Fetching);
        info!("Fetching source from {}", request.source_url);
        let mut body = self.fetcher.fetch(&request.source_url)?;
        let archive_path = workspace.join(ARTIFACT_FILE_NAME);
        let digest = save_artifact(&mut body, &archive_path)
            .map_err(|err| RetrievalError::extraction(ExtractionStage::Source, ExtractError::Io(err)))?;
        debug!("artefact sha256 {digest}");

        enter(RetrievalStage::Extracting);
        let tree = workspace.join(TREE_DIR_NAME);
        fs::create_dir(&tree).map_err(|source| RetrievalError::Workspace { source })?;
        self.unpack(strategy, &archive_path, &tree)?;

        enter(RetrievalStage::Scanning);
        info!("Scanning for licenses");
        let licenses = match self.scanner.scan(&tree) {
            Ok(findings) => findings.into_keys().collect(),
            Err(ScanError::NoLicenseFound) => {
                info!("no license file was found");
                Vec::new()
            }
            Err(source) => return Err(RetrievalError::ScanFailed { source }),
        };
        info!("Licenses found: {licenses:?}");
        Ok((licenses, digest))
    }

    fn unpack(&self, strategy: &PackagingStrategy, archive: &Path, tree: &Path) -> Result<()> {
        match strategy {
            PackagingStrategy::Skip => Ok(()),
            PackagingStrategy::Generic { strip_components } => {
                info!("Decompressing source");
                self.extract(ExtractionStage::Source, archive, tree, *strip_components)
            }
            PackagingStrategy::Nested { inner_archive } => {
                info!("Decompressing source and inner {inner_archive}");
                self.extract(ExtractionStage::Source, archive, tree, 0)?;
                let inner = tree.join(inner_archive);
                self.extract(ExtractionStage::InnerSource, &inner, tree, 0)
            }
        }
    }

    fn extract(
        &self,
        stage: ExtractionStage,
        archive: &Path,
        dest: &Path,
        strip_components: usize,
    ) -> Result<()> {
        debug!("extracting {stage} {}", archive.display());
        self.extractor
            .extract(archive, dest, strip_components)
            .map_err(|source| RetrievalError::extraction(stage, source))
    }

    fn create_workspace(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let created = match &self.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        let workspace = created.map_err(|source| RetrievalError::Workspace { source })?;
        debug!("working directory {}", workspace.path().display());
        Ok(workspace)
    }
}

fn enter(stage: RetrievalStage) {
    debug!("stage: {stage}");
}

/// Stream `body` to `path`, hashing it on the way.
fn save_artifact(body: &mut dyn Read, path: &Path) -> io::Result<String> {
    let mut file = fs::File::create(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = body.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
        file.write_all(&buffer[..bytes_read])?;
    }
    file.flush()?;
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
#[path = "retriever_tests.rs"]
mod tests;
