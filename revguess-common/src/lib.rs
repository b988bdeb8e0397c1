//! # Review Guesser Common Library
//!
//! Core of the "next game" control:
//! - Catalog loading, parsing and per-source memoisation
//! - Random target selection (balanced shards or the raw released pool)
//! - Streak and lifetime statistics
//! - User preferences (selection mode, result layout)
//! - Storage capability with non-throwing access
//! - Bootstrap configuration loading

pub mod catalog;
pub mod config;
pub mod error;
pub mod prefs;
pub mod random;
pub mod selection;
pub mod stats;
pub mod storage;

pub use catalog::{CatalogCache, CatalogLoader, MetaRecord};
pub use error::{Error, Result};
pub use prefs::{PreferenceStore, ResultLayout, SelectionMode};
pub use random::{RandomSource, ScriptedRandom, ThreadRandom};
pub use selection::{CatalogSources, SelectionPolicy};
pub use stats::{LifetimeStats, RoundSummary, StatsStore};
pub use storage::Storage;
