//! Client configuration.
//!
//! Built once in `main` from the command line and handed to the API client,
//! so tests can point a client at a mock backend without touching the
//! environment.

use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid backend URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("backend URL must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Always ends with `/`, so endpoint paths are appended after any prefix.
    pub backend_url: Url,
    pub request_timeout: Duration,
}

impl Config {
    pub fn new(backend_url: &str, request_timeout: Duration) -> Result<Self, ConfigError> {
        let mut url = Url::parse(backend_url).map_err(|source| ConfigError::InvalidUrl {
            url: backend_url.to_string(),
            source,
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
        }
        if request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self {
            backend_url: url,
            request_timeout,
        })
    }
}
