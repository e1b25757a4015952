//! Retriever configuration loaded from TOML.
//!
//! Every section falls back to built-in defaults, so an absent file, an
//! empty file and a file overriding a single key are all valid. The
//! strategy table is plain data: membership of the skip list and the
//! strategy families is configuration rather than code.

use crate::strategy::StrategyTable;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse configuration {path}: {source}")]
    Parse {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Description of the offending value.
        reason: String,
    },
}

/// Top-level retriever configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RetrieverConfig {
    /// Dependency name to packaging strategy mapping.
    pub strategies: StrategyTable,
    /// License scanner tuning.
    pub scan: ScanConfig,
    /// Artefact download settings.
    pub fetch: FetchConfig,
}

impl RetrieverConfig {
    /// Load configuration from `path`, or return the defaults when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, does not parse,
    /// or holds out-of-range values.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config: Self = toml::from_str(&source).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.scan.confidence_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::Invalid {
                reason: format!("scan.confidence_threshold must be in (0, 1], got {threshold}"),
            });
        }
        if !is_plain_file_name(&self.strategies.inner_archive) {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "strategies.inner_archive must be a plain file name, got {:?}",
                    self.strategies.inner_archive
                ),
            });
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                reason: "fetch.timeout_secs must be positive".to_owned(),
            });
        }
        Ok(())
    }
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Utf8Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Utf8Component::Normal(_)), None)
    )
}

/// Settings for the license scanner.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Minimum similarity for a template match to be reported.
    pub confidence_threshold: f32,
    /// Candidate files larger than this many bytes are ignored.
    pub max_file_size: u64,
}

impl ScanConfig {
    /// Default acceptance threshold for template matches.
    pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.75;
    /// Default size cap for candidate license files (1 MiB).
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: Self::DEFAULT_CONFIDENCE_THRESHOLD,
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Settings for the artefact download.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Global timeout for a single download, in seconds.
    pub timeout_secs: u64,
}

impl FetchConfig {
    /// The configured timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::PackagingStrategy;
    use rstest::rstest;

    #[rstest]
    fn defaults_match_the_reference_tables() {
        let config = RetrieverConfig::default();

        assert_eq!(config.scan.confidence_threshold, 0.75);
        assert_eq!(config.fetch.timeout(), Duration::from_secs(30));
        assert_eq!(config.strategies.select("composer"), PackagingStrategy::Skip);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    fn missing_path_yields_defaults() {
        let config = RetrieverConfig::load(None).expect("defaults load");
        assert_eq!(config, RetrieverConfig::default());
    }

    #[rstest]
    fn loads_overrides_from_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("retriever.toml");
        std::fs::write(
            &path,
            concat!(
                "[strategies]\n",
                "nested = [\"bundler\", \"rubygems\"]\n",
                "\n",
                "[scan]\n",
                "confidence_threshold = 0.9\n",
            ),
        )
        .expect("write config");
        let path = Utf8PathBuf::try_from(path).expect("UTF-8 path");

        let config = RetrieverConfig::load(Some(&path)).expect("config loads");

        assert_eq!(config.scan.confidence_threshold, 0.9);
        assert_eq!(config.scan.max_file_size, ScanConfig::DEFAULT_MAX_FILE_SIZE);
        assert_eq!(config.strategies.select("rubygems").label(), "nested");
        assert_eq!(config.strategies.select("composer"), PackagingStrategy::Skip);
    }

    #[rstest]
    fn unreadable_file_reports_path() {
        let path = Utf8PathBuf::from("/definitely/not/here/retriever.toml");
        let err = RetrieverConfig::load(Some(&path)).expect_err("missing file must fail");
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/definitely/not/here/retriever.toml"));
    }

    #[rstest]
    fn unknown_keys_are_rejected() {
        let result = toml::from_str::<RetrieverConfig>("[scan]\nthreshold = 0.5\n");
        assert!(result.is_err());
    }

    #[rstest]
    #[case::zero(0.0)]
    #[case::negative(-0.5)]
    #[case::above_one(1.5)]
    fn out_of_range_threshold_is_invalid(#[case] threshold: f32) {
        let config = RetrieverConfig {
            scan: ScanConfig {
                confidence_threshold: threshold,
                ..ScanConfig::default()
            },
            ..RetrieverConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[rstest]
    #[case::empty("")]
    #[case::parent("../data.tar.gz")]
    #[case::nested("inner/data.tar.gz")]
    #[case::absolute("/data.tar.gz")]
    fn inner_archive_must_be_a_file_name(#[case] name: &str) {
        let config = RetrieverConfig {
            strategies: StrategyTable {
                inner_archive: name.to_owned(),
                ..StrategyTable::default()
            },
            ..RetrieverConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[rstest]
    fn zero_timeout_is_invalid() {
        let config = RetrieverConfig {
            fetch: FetchConfig { timeout_secs: 0 },
            ..RetrieverConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
