//! Persisted user preferences
//!
//! Both preferences are validated on write and on read. Invalid input is
//! coerced to the default before it is stored, and an invalid stored value
//! (edited by hand, written by an older build) reads back as the default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Error;
use crate::storage::Storage;

/// Long-lived key of the selection mode
pub const MODE_KEY: &str = "preferred_mode";
/// Long-lived key of the result layout
pub const LAYOUT_KEY: &str = "preferred_layout";

/// How the next target is sampled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Uniform shard first, then uniform within the shard
    #[default]
    Balanced,
    /// Uniform over the whole released catalog
    Raw,
}

impl SelectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMode::Balanced => "balanced",
            SelectionMode::Raw => "raw",
        }
    }

    /// Parsed value, or the default when `raw` is not a known mode
    pub fn coerce(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl FromStr for SelectionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "balanced" | "smart" => Ok(SelectionMode::Balanced),
            "raw" | "pure" => Ok(SelectionMode::Raw),
            other => Err(Error::InvalidInput(format!("unknown selection mode '{}'", other))),
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How guess results are presented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultLayout {
    /// Bucketed ranges
    #[default]
    Ranges,
    /// Exact values
    Exact,
}

impl ResultLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultLayout::Ranges => "ranges",
            ResultLayout::Exact => "exact",
        }
    }

    /// Parsed value, or the default when `raw` is not a known layout
    pub fn coerce(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl FromStr for ResultLayout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ranges" => Ok(ResultLayout::Ranges),
            "exact" => Ok(ResultLayout::Exact),
            other => Err(Error::InvalidInput(format!("unknown result layout '{}'", other))),
        }
    }
}

impl fmt::Display for ResultLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preference accessors over long-lived storage
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    storage: Storage,
}

impl PreferenceStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn mode(&self) -> SelectionMode {
        self.read_or_default(MODE_KEY)
    }

    /// Persist `raw` (coerced to the default when invalid) and return it
    pub fn set_mode(&self, raw: &str) -> SelectionMode {
        let mode = SelectionMode::coerce(raw);
        self.storage.set(MODE_KEY, mode.as_str());
        mode
    }

    pub fn layout(&self) -> ResultLayout {
        self.read_or_default(LAYOUT_KEY)
    }

    /// Persist `raw` (coerced to the default when invalid) and return it
    pub fn set_layout(&self, raw: &str) -> ResultLayout {
        let layout = ResultLayout::coerce(raw);
        self.storage.set(LAYOUT_KEY, layout.as_str());
        layout
    }

    fn read_or_default<T: FromStr + Default>(&self, key: &str) -> T {
        let Some(raw) = self.storage.get(key) else {
            return T::default();
        };
        raw.parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid stored value {:?} for '{}'", raw, key);
            T::default()
        })
    }
}
