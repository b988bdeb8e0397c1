//! Application state wired from configuration

use std::sync::Arc;

use revguess_common::config::TomlConfig;
use revguess_common::{
    CatalogLoader, LifetimeStats, PreferenceStore, RandomSource, Result, RoundSummary,
    SelectionMode, SelectionPolicy, StatsStore, Storage, ThreadRandom,
};

use crate::navigation::{next_target, store_url};

/// Everything one command needs
#[derive(Debug)]
pub struct App {
    pub policy: SelectionPolicy,
    pub stats: StatsStore,
    pub prefs: PreferenceStore,
    pub default_target_id: u64,
    pub store_url_template: String,
}

impl App {
    /// Build from configuration with file-backed storage and the thread RNG
    pub fn from_config(config: &TomlConfig) -> Result<Self> {
        let fetcher = config.build_fetcher()?;
        Ok(Self::with_parts(
            config,
            CatalogLoader::new(fetcher),
            config.session_storage(),
            config.long_lived_storage(),
            Arc::new(ThreadRandom),
        ))
    }

    /// Build from explicit components
    pub fn with_parts(
        config: &TomlConfig,
        loader: CatalogLoader,
        session: Storage,
        long_lived: Storage,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            policy: SelectionPolicy::new(loader, config.catalog_sources(), random),
            stats: StatsStore::new(session, long_lived.clone()),
            prefs: PreferenceStore::new(long_lived),
            default_target_id: config.default_target_id,
            store_url_template: config.store_url_template.clone(),
        }
    }

    /// Next target id, using the persisted mode unless one is given
    pub async fn next_id(&self, mode: Option<SelectionMode>) -> u64 {
        let mode = mode.unwrap_or_else(|| self.prefs.mode());
        next_target(&self.policy, mode, self.default_target_id).await
    }

    /// Store page URL of the next target
    pub async fn next_url(&self, mode: Option<SelectionMode>) -> String {
        store_url(&self.store_url_template, self.next_id(mode).await)
    }

    pub fn record(&self, is_correct: bool) -> RoundSummary {
        self.stats.record_outcome(is_correct)
    }
}

/// "Current Streak: N"
pub fn streak_label(streak: u64) -> String {
    format!("Current Streak: {}", streak)
}

/// "Lifetime: correct/total"
pub fn lifetime_label(stats: &LifetimeStats) -> String {
    format!("Lifetime: {}/{}", stats.correct, stats.total)
}
