//! Source artefact download over HTTP(S).
//!
//! [`ArtifactFetcher`] hides the transport so the orchestrator can be
//! exercised without network access. The production implementation,
//! [`HttpFetcher`], issues a single GET with a global timeout and never
//! retries: retry policy belongs to the caller.

use std::io::Read;
use std::time::Duration;

/// Trait for fetching a source artefact by URL.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use license_retriever::artifact::fetch::HttpFetcher;
///
/// let fetcher = HttpFetcher::new(Duration::from_secs(30));
/// // Use fetcher.fetch("https://example.com/source.tgz") in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArtifactFetcher {
    /// Issue a GET request for `url` and return the response body.
    ///
    /// The status check happens before the body is returned, so a
    /// successful call always yields a 2xx body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::BadStatus`] for non-2xx responses and
    /// [`FetchError::Transport`] when the request cannot be made.
    fn fetch(&self, url: &str) -> Result<Box<dyn Read + Send>, FetchError>;
}

/// Errors arising from artefact downloads.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request could not be completed (DNS, connect, TLS, bad URL).
    #[error("failed to query url {url}: {reason}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The server answered with a non-success status code.
    #[error("failed to query url {url} with: status code {code}")]
    BadStatus {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code returned.
        code: u16,
    },
}

/// HTTP-based fetcher using `ureq`.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl ArtifactFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Box<dyn Read + Send>, FetchError> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(FetchError::BadStatus {
                url: url.to_owned(),
                code: status,
            });
        }
        Ok(Box::new(response.into_body().into_reader()))
    }
}

/// Map a ureq error to a [`FetchError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> FetchError {
    match err {
        ureq::Error::StatusCode(code) => FetchError::BadStatus {
            url: url.to_owned(),
            code: *code,
        },
        other => FetchError::Transport {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
