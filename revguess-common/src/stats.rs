//! Guess statistics
//!
//! The current streak lives in session-scoped storage; lifetime totals live
//! in long-lived storage until the user clears them. Every stored value is
//! sanitised on read and on write (non-negative integers, `correct` never
//! above `total`), so corrupted storage degrades to sane numbers instead of
//! errors.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::debug;

use crate::storage::Storage;

/// Session key of the current streak
pub const STREAK_KEY: &str = "current_streak";
/// Long-lived key of the lifetime round count
pub const LIFETIME_TOTAL_KEY: &str = "lifetime_total";
/// Long-lived key of the lifetime correct count
pub const LIFETIME_CORRECT_KEY: &str = "lifetime_correct";

/// Cumulative results across sessions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LifetimeStats {
    pub correct: u64,
    pub total: u64,
}

impl LifetimeStats {
    /// Build from raw counts, clamping `correct` to `total`
    pub fn new(correct: u64, total: u64) -> Self {
        Self {
            correct: correct.min(total),
            total,
        }
    }

    /// Fraction of correct rounds, `None` before the first round
    pub fn accuracy(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.correct as f64 / self.total as f64)
        }
    }
}

/// Counters after a round has been recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub streak: u64,
    pub lifetime: LifetimeStats,
}

/// Streak and lifetime counters over two storage scopes
#[derive(Debug)]
pub struct StatsStore {
    session: Storage,
    persistent: Storage,
    // Makes record_outcome's read-modify-write appear atomic to other callers
    update: Mutex<()>,
}

impl StatsStore {
    pub fn new(session: Storage, persistent: Storage) -> Self {
        Self {
            session,
            persistent,
            update: Mutex::new(()),
        }
    }

    /// Current streak, 0 when absent or unreadable
    pub fn streak(&self) -> u64 {
        read_count(&self.session, STREAK_KEY)
    }

    /// Lifetime counters, zero when absent or unreadable
    pub fn lifetime(&self) -> LifetimeStats {
        LifetimeStats::new(
            read_count(&self.persistent, LIFETIME_CORRECT_KEY),
            read_count(&self.persistent, LIFETIME_TOTAL_KEY),
        )
    }

    /// Record one finished round
    ///
    /// A correct guess extends the streak, a wrong one resets it to 0. The
    /// lifetime total always grows by one and `correct` grows on a correct
    /// guess.
    pub fn record_outcome(&self, is_correct: bool) -> RoundSummary {
        let _guard = self.update.lock().unwrap_or_else(PoisonError::into_inner);

        let streak = if is_correct {
            self.streak().saturating_add(1)
        } else {
            0
        };
        self.session.set(STREAK_KEY, &streak.to_string());

        let previous = self.lifetime();
        let lifetime = LifetimeStats::new(
            previous.correct.saturating_add(u64::from(is_correct)),
            previous.total.saturating_add(1),
        );
        self.write_lifetime(lifetime);

        debug!(
            "Recorded {} guess: streak {}, lifetime {}/{}",
            if is_correct { "correct" } else { "incorrect" },
            streak,
            lifetime.correct,
            lifetime.total
        );

        RoundSummary { streak, lifetime }
    }

    /// Reset lifetime counters; the streak is left alone
    pub fn clear_lifetime(&self) {
        let _guard = self.update.lock().unwrap_or_else(PoisonError::into_inner);
        self.persistent.remove(LIFETIME_TOTAL_KEY);
        self.persistent.remove(LIFETIME_CORRECT_KEY);
    }

    fn write_lifetime(&self, stats: LifetimeStats) {
        self.persistent.set(LIFETIME_TOTAL_KEY, &stats.total.to_string());
        self.persistent.set(LIFETIME_CORRECT_KEY, &stats.correct.to_string());
    }
}

fn read_count(storage: &Storage, key: &str) -> u64 {
    storage.get(key).map(|raw| sanitize_count(&raw)).unwrap_or(0)
}

/// Stored text as a non-negative integer
///
/// Integers are taken as-is, finite decimals are truncated toward zero,
/// negatives clamp to 0 and anything else reads as 0.
pub fn sanitize_count(raw: &str) -> u64 {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u64>() {
        return n;
    }
    if let Ok(n) = raw.parse::<i64>() {
        return n.max(0) as u64;
    }
    match raw.parse::<f64>() {
        // `as` saturates at u64::MAX for huge values
        Ok(n) if n.is_finite() && n > 0.0 => n.trunc() as u64,
        _ => 0,
    }
}
