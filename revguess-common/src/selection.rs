//! Next-target selection policy
//!
//! `Raw` samples uniformly from the released catalog. `Balanced` first picks
//! one shard uniformly, then samples uniformly within it, which evens out
//! the weight of each partition regardless of its size. An empty shard falls
//! back to the released pool; an empty released pool means "no target" and
//! the caller decides where to go instead.

use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::{CatalogLoader, MetaRecord};
use crate::prefs::SelectionMode;
use crate::random::{pick_index, RandomSource};

/// Default released catalog source id
pub const DEFAULT_RELEASED_CATALOG: &str = "data/released_appids.csv";

/// Default balanced-mode shard source ids
pub const DEFAULT_SHARD_CATALOGS: [&str; 6] = [
    "data/Batch_1.csv",
    "data/Batch_2.csv",
    "data/Batch_3.csv",
    "data/Batch_4.csv",
    "data/Batch_5.csv",
    "data/Batch_6.csv",
];

/// Which catalog sources feed each mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSources {
    /// Full released catalog (raw mode, and fallback for balanced)
    pub released: String,
    /// Partitioned shards sampled in balanced mode
    pub shards: Vec<String>,
}

impl Default for CatalogSources {
    fn default() -> Self {
        Self {
            released: DEFAULT_RELEASED_CATALOG.to_string(),
            shards: DEFAULT_SHARD_CATALOGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Picks the next target record
#[derive(Clone)]
pub struct SelectionPolicy {
    loader: CatalogLoader,
    sources: CatalogSources,
    random: Arc<dyn RandomSource>,
}

impl SelectionPolicy {
    pub fn new(loader: CatalogLoader, sources: CatalogSources, random: Arc<dyn RandomSource>) -> Self {
        Self {
            loader,
            sources,
            random,
        }
    }

    /// One record chosen per `mode`, or `None` when every pool is empty
    pub async fn pick_target(&self, mode: SelectionMode) -> Option<MetaRecord> {
        let pool = match mode {
            SelectionMode::Raw => self.released_pool().await,
            SelectionMode::Balanced => {
                let shard_pool = self.random_shard_pool().await;
                if shard_pool.is_empty() {
                    info!("Balanced pool empty, falling back to released catalog");
                    self.released_pool().await
                } else {
                    shard_pool
                }
            }
        };

        let index = pick_index(pool.len(), self.random.as_ref())?;
        Some(pool[index].clone())
    }

    /// Identifiers of every released record, in catalog order
    pub async fn released_ids(&self) -> Vec<u64> {
        self.released_pool().await.iter().map(|r| r.id).collect()
    }

    async fn released_pool(&self) -> Arc<[MetaRecord]> {
        self.loader.load(&self.sources.released).await
    }

    async fn random_shard_pool(&self) -> Arc<[MetaRecord]> {
        let Some(index) = pick_index(self.sources.shards.len(), self.random.as_ref()) else {
            debug!("No shards configured");
            return Arc::from(Vec::new());
        };
        let shard = &self.sources.shards[index];
        debug!("Balanced mode sampling shard {}", shard);
        self.loader.load(shard).await
    }
}

impl std::fmt::Debug for SelectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionPolicy")
            .field("loader", &self.loader)
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}
