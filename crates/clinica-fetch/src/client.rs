//! HTTP / filesystem document fetcher.

use crate::error::{FetchError, FetchResult};
use clinica_config::SourcesConfig;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Location of a source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Url(String),
    File(PathBuf),
}

impl DocumentSource {
    /// Classify a location string: `http(s)://` is a URL, anything else a path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DocumentSource::Url(trimmed.to_string())
        } else {
            DocumentSource::File(PathBuf::from(shellexpand::tilde(trimmed).into_owned()))
        }
    }
}

impl std::fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentSource::Url(url) => write!(f, "{}", url),
            DocumentSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Fetches raw document bytes.
#[derive(Clone)]
pub struct DocumentFetcher {
    client: Client,
    timeout: Duration,
}

impl DocumentFetcher {
    /// Create a new fetcher from configuration.
    pub fn from_config(config: &SourcesConfig) -> FetchResult<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FetchError::Http)?;

        Ok(Self { client, timeout })
    }

    /// Fetch a document's bytes.
    pub async fn fetch(&self, source: &DocumentSource) -> FetchResult<Vec<u8>> {
        match source {
            DocumentSource::Url(url) => self.fetch_url(url).await,
            DocumentSource::File(path) => {
                if !path.exists() {
                    return Err(FetchError::FileNotFound(path.clone()));
                }
                debug!("Reading {:?}", path);
                Ok(tokio::fs::read(path).await?)
            }
        }
    }

    /// Fetch a document and decode it as UTF-8 (lossy).
    pub async fn fetch_text(&self, source: &DocumentSource) -> FetchResult<String> {
        let bytes = self.fetch(source).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn fetch_url(&self, url: &str) -> FetchResult<Vec<u8>> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_connect() {
                FetchError::Connection {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            } else if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    seconds: self.timeout.as_secs(),
                }
            } else {
                FetchError::Http(e)
            }
        })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        info!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}
