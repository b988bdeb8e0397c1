//! Catalog transports
//!
//! A fetcher turns a source id (a relative location such as
//! `data/Batch_1.csv`) into the raw bytes of that document. Fetch failures
//! are reported as errors here; the loader decides what to do with them.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use reqwest::Url;

use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("revguess/", env!("CARGO_PKG_VERSION"));

/// Source of raw catalog documents
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    /// Fetch the full body of `location`
    async fn fetch(&self, location: &str) -> Result<Vec<u8>>;

    /// Human-readable resolved form of `location` (for logging)
    fn describe(&self, location: &str) -> String {
        location.to_string()
    }
}

/// Reads catalogs from a directory on disk
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        self.root.join(location)
    }
}

#[async_trait]
impl CatalogFetcher for FileFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(self.resolve(location)).await?)
    }

    fn describe(&self, location: &str) -> String {
        self.resolve(location).display().to_string()
    }
}

/// Fetches catalogs over HTTP relative to a base URL
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpFetcher {
    /// Create a fetcher rooted at `base_url`
    ///
    /// A trailing slash is added when missing so that relative source ids
    /// resolve beneath the base rather than replacing its last segment.
    pub fn new(base_url: &str) -> Result<Self> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| Error::Config(format!("Invalid catalog base URL '{}': {}", base_url, e)))?;

        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self { client, base_url })
    }

    fn resolve(&self, location: &str) -> Result<Url> {
        self.base_url
            .join(location)
            .map_err(|e| Error::InvalidInput(format!("Cannot resolve '{}': {}", location, e)))
    }
}

#[async_trait]
impl CatalogFetcher for HttpFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        let url = self.resolve(location)?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                location: location.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    fn describe(&self, location: &str) -> String {
        match self.resolve(location) {
            Ok(url) => url.to_string(),
            Err(_) => location.to_string(),
        }
    }
}

/// In-memory catalogs keyed by location, counting every fetch
///
/// Unknown locations fail like a missing file would. Clones share the
/// fetch counters.
#[derive(Debug, Default, Clone)]
pub struct StaticFetcher {
    documents: HashMap<String, Vec<u8>>,
    fetches: Arc<Mutex<HashMap<String, usize>>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document (builder style)
    pub fn with_document(mut self, location: &str, body: impl Into<Vec<u8>>) -> Self {
        self.documents.insert(location.to_string(), body.into());
        self
    }

    /// Number of fetches issued for `location` so far
    pub fn fetch_count(&self, location: &str) -> usize {
        self.counters().get(location).copied().unwrap_or(0)
    }

    fn counters(&self) -> MutexGuard<'_, HashMap<String, usize>> {
        self.fetches.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CatalogFetcher for StaticFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        *self.counters().entry(location.to_string()).or_insert(0) += 1;

        self.documents.get(location).cloned().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no static catalog registered for '{}'", location),
            ))
        })
    }
}
