//! Memoised catalog loading
//!
//! Every source id is fetched and parsed at most once per cache. The cache
//! stores the shared in-flight future, so concurrent callers asking for the
//! same source before it resolves all await the one fetch the first caller
//! started. Failures resolve to an empty catalog, which is cached like any
//! other result: there is no retry and no eviction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use super::{parse_catalog, CatalogFetcher, MetaRecord};
use crate::error::Error;

type PendingCatalog = Shared<BoxFuture<'static, Arc<[MetaRecord]>>>;

/// Per-source memo of catalog results (pending or resolved)
#[derive(Default)]
pub struct CatalogCache {
    entries: Mutex<HashMap<String, PendingCatalog>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sources with an entry
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Whether `source_id` has been requested through this cache
    pub fn contains(&self, source_id: &str) -> bool {
        self.entries().contains_key(source_id)
    }

    /// Existing entry for `source_id`, or the one built by `start`
    ///
    /// The map lock is held across the check and the insert, so only one
    /// caller can ever start the fetch for a given source.
    fn get_or_start(
        &self,
        source_id: &str,
        start: impl FnOnce() -> PendingCatalog,
    ) -> PendingCatalog {
        let mut entries = self.entries();
        if let Some(pending) = entries.get(source_id) {
            return pending.clone();
        }
        let pending = start();
        entries.insert(source_id.to_string(), pending.clone());
        pending
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, PendingCatalog>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut sources: Vec<String> = self.entries().keys().cloned().collect();
        sources.sort();
        f.debug_struct("CatalogCache").field("sources", &sources).finish()
    }
}

/// Loads catalogs through a fetcher, memoising per source id
///
/// Cheap to clone; clones share the fetcher and the cache.
#[derive(Clone)]
pub struct CatalogLoader {
    fetcher: Arc<dyn CatalogFetcher>,
    cache: Arc<CatalogCache>,
}

impl CatalogLoader {
    /// Loader with its own, fresh cache
    pub fn new(fetcher: Arc<dyn CatalogFetcher>) -> Self {
        Self::with_cache(fetcher, Arc::new(CatalogCache::new()))
    }

    /// Loader sharing an existing cache
    pub fn with_cache(fetcher: Arc<dyn CatalogFetcher>, cache: Arc<CatalogCache>) -> Self {
        Self { fetcher, cache }
    }

    pub fn cache(&self) -> &Arc<CatalogCache> {
        &self.cache
    }

    /// Records of `source_id`, empty if the source could not be fetched
    ///
    /// Never fails. Repeated calls return the same `Arc`.
    pub async fn load(&self, source_id: &str) -> Arc<[MetaRecord]> {
        let pending = self.cache.get_or_start(source_id, || {
            let fetcher = Arc::clone(&self.fetcher);
            let source_id = source_id.to_string();
            async move { fetch_and_parse(fetcher, source_id).await }
                .boxed()
                .shared()
        });
        pending.await
    }
}

impl std::fmt::Debug for CatalogLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogLoader")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

async fn fetch_and_parse(fetcher: Arc<dyn CatalogFetcher>, source_id: String) -> Arc<[MetaRecord]> {
    let location = fetcher.describe(&source_id);
    debug!("Fetching catalog {} from {}", source_id, location);

    let body = match fetcher.fetch(&source_id).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to load catalog {} ({}): {}", source_id, location, e);
            return empty();
        }
    };

    let text = match String::from_utf8(body) {
        Ok(text) => text,
        Err(e) => {
            let err = Error::Decode {
                location,
                reason: e.utf8_error().to_string(),
            };
            warn!("Failed to load catalog {}: {}", source_id, err);
            return empty();
        }
    };

    let records = parse_catalog(&text);
    debug!("Loaded {} records from catalog {}", records.len(), source_id);
    Arc::from(records)
}

fn empty() -> Arc<[MetaRecord]> {
    Arc::from(Vec::new())
}
