//! Integration tests for catalog loading and selection
//!
//! Covers fetch deduplication (sequential and concurrent), failure caching,
//! file-backed catalogs, and the balanced-to-raw fallback chain.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use revguess_common::catalog::{CatalogFetcher, FileFetcher, StaticFetcher};
use revguess_common::{
    CatalogLoader, CatalogSources, Error, Result, ScriptedRandom, SelectionMode, SelectionPolicy,
};
use tempfile::TempDir;
use tokio::sync::Notify;

/// Fetcher that blocks until released, so requests overlap while pending
struct GatedFetcher {
    gate: Arc<Notify>,
    calls: AtomicUsize,
    body: &'static str,
}

#[async_trait]
impl CatalogFetcher for GatedFetcher {
    async fn fetch(&self, _location: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(self.body.as_bytes().to_vec())
    }
}

/// Fetcher that always answers like an HTTP 404
struct NotFoundFetcher {
    calls: AtomicUsize,
}

#[async_trait]
impl CatalogFetcher for NotFoundFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::HttpStatus {
            location: location.to_string(),
            status: 404,
        })
    }
}

#[tokio::test]
async fn test_concurrent_loads_share_one_pending_fetch() {
    let gate = Arc::new(Notify::new());
    let fetcher = Arc::new(GatedFetcher {
        gate: Arc::clone(&gate),
        calls: AtomicUsize::new(0),
        body: "10,2000,Action\n20,2001,RPG\n",
    });
    let loader = CatalogLoader::new(fetcher.clone());

    let first = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load("data/Batch_1.csv").await }
    });
    let second = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load("data/Batch_1.csv").await }
    });

    // Let both tasks reach the pending fetch before releasing it
    while fetcher.calls.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    gate.notify_one();

    let first = first.await.unwrap();
    let second = second.await.unwrap();

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.len(), 2);
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_transport_failure_cached_without_retry() {
    let fetcher = Arc::new(NotFoundFetcher {
        calls: AtomicUsize::new(0),
    });
    let loader = CatalogLoader::new(fetcher.clone());

    for _ in 0..3 {
        assert!(loader.load("data/released_appids.csv").await.is_empty());
    }

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_file_catalogs_end_to_end() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("data")).unwrap();
    std::fs::write(
        dir.path().join("data/released_appids.csv"),
        "AppID,Year,Tags\r\n570,2013,MOBA;Free to Play\r\n730,2012,FPS\r\n",
    )
    .unwrap();

    let loader = CatalogLoader::new(Arc::new(FileFetcher::new(dir.path())));
    let records = loader.load("data/released_appids.csv").await;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, 570);
    assert_eq!(records[0].year, Some(2013));
    assert_eq!(records[0].tags, vec!["moba".to_string(), "freetoplay".to_string()]);
}

#[tokio::test]
async fn test_balanced_fallback_chain() {
    let fetcher = StaticFetcher::new().with_document("released.csv", "AppID,Year,Tags\n42,,\n");
    let sources = CatalogSources {
        released: "released.csv".to_string(),
        shards: vec!["missing_1.csv".to_string(), "missing_2.csv".to_string()],
    };
    let policy = SelectionPolicy::new(
        CatalogLoader::new(Arc::new(fetcher.clone())),
        sources,
        Arc::new(ScriptedRandom::new([0.6, 0.0])),
    );

    let picked = policy.pick_target(SelectionMode::Balanced).await;

    assert_eq!(picked.map(|r| r.id), Some(42));
    assert_eq!(fetcher.fetch_count("missing_2.csv"), 1);
    assert_eq!(fetcher.fetch_count("missing_1.csv"), 0);
}

#[tokio::test]
async fn test_selection_without_any_catalog_is_none() {
    let policy = SelectionPolicy::new(
        CatalogLoader::new(Arc::new(StaticFetcher::new())),
        CatalogSources::default(),
        Arc::new(ScriptedRandom::new([0.1])),
    );

    assert!(policy.pick_target(SelectionMode::Balanced).await.is_none());
    assert!(policy.released_ids().await.is_empty());
}

#[tokio::test]
async fn test_every_pick_comes_from_the_pool() {
    let fetcher = StaticFetcher::new().with_document("released.csv", "1,,\n2,,\n3,,\n4,,\n5,,\n");
    let sources = CatalogSources {
        released: "released.csv".to_string(),
        shards: vec![],
    };
    let policy = SelectionPolicy::new(
        CatalogLoader::new(Arc::new(fetcher.clone())),
        sources,
        Arc::new(revguess_common::ThreadRandom),
    );

    for _ in 0..200 {
        let id = policy.pick_target(SelectionMode::Raw).await.unwrap().id;
        assert!((1..=5).contains(&id));
    }
    assert_eq!(fetcher.fetch_count("released.csv"), 1);
}
