//! Document fetchers
//!
//! A fetcher turns a canonical data-store key (a relative path such as
//! `detail/pump.json`) into raw bytes. Keys are validated by the data store
//! before they reach a fetcher.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;

use crate::error::{Error, LoadError, Result};

/// Default timeout for HTTP fetches in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Source of raw JSON documents addressed by relative path
pub trait Fetcher: Send + Sync {
    fn fetch(
        &self,
        key: &str,
    ) -> impl Future<Output = std::result::Result<Vec<u8>, LoadError>> + Send;
}

/// Reads documents below a base directory
#[derive(Debug, Clone)]
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Fetcher for DirFetcher {
    async fn fetch(&self, key: &str) -> std::result::Result<Vec<u8>, LoadError> {
        let path = self.root.join(key);
        log::debug!("Reading {}", path.display());
        tokio::fs::read(&path)
            .await
            .map_err(|e| LoadError::fetch(key, e))
    }
}

/// Issues plain GET requests below a base URL
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base: String,
}

impl HttpFetcher {
    /// `base` is joined with each key; a trailing `/` is added when missing
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("HTTP client: {e}")))?;

        Ok(Self { client, base })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url_for(&self, key: &str) -> String {
        format!("{}{}", self.base, key)
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, key: &str) -> std::result::Result<Vec<u8>, LoadError> {
        let url = self.url_for(key);
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LoadError::fetch(key, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                path: key.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LoadError::fetch(key, e))?;
        Ok(bytes.to_vec())
    }
}

/// Fetcher chosen at runtime from a data location
#[derive(Debug, Clone)]
pub enum Source {
    Dir(DirFetcher),
    Http(HttpFetcher),
}

impl Source {
    /// `http://` and `https://` locations fetch over HTTP; anything else is a directory
    pub fn from_location(location: &str, timeout: Duration) -> Result<Self> {
        let location = location.trim();
        if location.is_empty() {
            return Err(Error::config("data location is empty"));
        }

        if location.starts_with("http://") || location.starts_with("https://") {
            Ok(Self::Http(HttpFetcher::new(location, timeout)?))
        } else {
            Ok(Self::Dir(DirFetcher::new(location)))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

impl Fetcher for Source {
    async fn fetch(&self, key: &str) -> std::result::Result<Vec<u8>, LoadError> {
        match self {
            Self::Dir(fetcher) => fetcher.fetch(key).await,
            Self::Http(fetcher) => fetcher.fetch(key).await,
        }
    }
}
