//! Parsed catalog row

use serde::{Deserialize, Serialize};

/// One game entry from a catalog source
///
/// Immutable once parsed. `id` is positive and unique within its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaRecord {
    /// Store identifier of the game
    pub id: u64,
    /// Release year, absent when the column was empty or unparseable
    pub year: Option<i32>,
    /// Normalised tags (lowercase ASCII alphanumerics), first-seen order
    pub tags: Vec<String>,
}

impl MetaRecord {
    pub fn new(id: u64, year: Option<i32>, tags: Vec<String>) -> Self {
        Self { id, year, tags }
    }
}
