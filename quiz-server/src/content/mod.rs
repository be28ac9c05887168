//! In-memory quiz content
//!
//! A [`Snapshot`] holds one complete load of the reference data. The
//! [`ContentStore`] publishes snapshots atomically; readers never see a mix
//! of two synchronization cycles.

pub mod hash;
pub mod readiness;
pub mod store;

use chrono::{DateTime, Utc};
use quiz_common::db::{Difficulty, GameMode, Question};

pub use hash::{compute_hash, has_changed};
pub use readiness::is_ready;
pub use store::ContentStore;

/// Immutable set of reference data published by one synchronization cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub difficulties: Vec<Difficulty>,
    pub questions: Vec<Question>,
    pub gamemodes: Vec<GameMode>,
    /// Digest of `questions`, see [`compute_hash`]
    pub content_hash: i32,
    /// `None` until the first cycle has published
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Placeholder published before the first load completes
    pub fn empty() -> Self {
        Self::default()
    }
}
