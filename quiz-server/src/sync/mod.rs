//! Content synchronization
//!
//! Reloads reference data from the persistent store in a fixed stage order
//! (difficulties, questions, game modes), resolves the content hash and
//! publishes the finished snapshot into the [`ContentStore`] in one swap.
//!
//! State machine: `Idle -> Fetching -> Idle` on success, `Fetching ->
//! Terminated` on any stage failure. A fetch failure is fatal at every
//! cycle, not just at startup: the caller exits with
//! [`FetchError::exit_code`] and a supervisor restarts the process. There
//! is no retry.
//!
//! At most one cycle runs at a time. The periodic loop skips ticks that
//! fire while a cycle is still in flight instead of queueing them.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::content::{compute_hash, has_changed, ContentStore, Snapshot};
use crate::db;
use crate::metrics::{catalog, MetricsAggregator};

/// Failure of one fetch stage
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to fetch difficulties: {0}")]
    Difficulties(#[source] sqlx::Error),

    #[error("Failed to fetch questions: {0}")]
    Questions(#[source] sqlx::Error),

    #[error("Failed to fetch game modes: {0}")]
    GameModes(#[source] sqlx::Error),
}

impl FetchError {
    /// Process exit code identifying the failed stage
    pub fn exit_code(&self) -> i32 {
        match self {
            FetchError::Difficulties(_) => 2,
            FetchError::Questions(_) => 3,
            FetchError::GameModes(_) => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SyncState {
    Idle = 0,
    Fetching = 1,
    Terminated = 2,
}

impl SyncState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SyncState::Idle,
            1 => SyncState::Fetching,
            _ => SyncState::Terminated,
        }
    }
}

/// Result of one synchronization attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A new snapshot was published
    Published { content_hash: i32, changed: bool },
    /// Another cycle was still in flight
    Skipped,
}

pub struct Synchronizer {
    pool: SqlitePool,
    store: Arc<ContentStore>,
    metrics: Arc<MetricsAggregator>,
    in_flight: Mutex<()>,
    state: AtomicU8,
}

impl Synchronizer {
    pub fn new(pool: SqlitePool, store: Arc<ContentStore>, metrics: Arc<MetricsAggregator>) -> Self {
        Self {
            pool,
            store,
            metrics,
            in_flight: Mutex::new(()),
            state: AtomicU8::new(SyncState::Idle as u8),
        }
    }

    pub fn state(&self) -> SyncState {
        SyncState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Fetch all stages and assemble a candidate snapshot
    ///
    /// Does not publish. Size gauges are updated after each successful stage.
    pub async fn refresh(&self) -> Result<Snapshot, FetchError> {
        debug!("Fetching difficulties");
        let difficulties = db::fetch_difficulties(&self.pool)
            .await
            .map_err(FetchError::Difficulties)?;
        self.record_size(catalog::DIFFICULTIES, difficulties.len());

        debug!("Fetching questions");
        let questions = db::fetch_questions(&self.pool)
            .await
            .map_err(FetchError::Questions)?;
        self.record_size(catalog::QUESTIONS, questions.len());

        debug!("Fetching game modes");
        let gamemodes = db::fetch_gamemodes(&self.pool)
            .await
            .map_err(FetchError::GameModes)?;
        self.record_size(catalog::GAMEMODES, gamemodes.len());

        let previous = self.store.content_hash();
        let candidate = compute_hash(&questions);
        let content_hash = if has_changed(previous, candidate) {
            info!(old = previous, new = candidate, "Content hash changed");
            candidate
        } else {
            previous
        };

        Ok(Snapshot {
            difficulties,
            questions,
            gamemodes,
            content_hash,
            refreshed_at: Some(Utc::now()),
        })
    }

    /// Run one cycle and publish its snapshot
    ///
    /// Returns [`SyncOutcome::Skipped`] without touching the store when a
    /// cycle is already in flight.
    pub async fn sync_once(&self) -> Result<SyncOutcome, FetchError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("Content synchronization still in flight, skipping");
            return Ok(SyncOutcome::Skipped);
        };

        self.state.store(SyncState::Fetching as u8, Ordering::Release);
        let snapshot = match self.refresh().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.state.store(SyncState::Terminated as u8, Ordering::Release);
                error!("Content synchronization failed: {}", e);
                return Err(e);
            }
        };

        let content_hash = snapshot.content_hash;
        let counts = (snapshot.difficulties.len(), snapshot.questions.len(), snapshot.gamemodes.len());
        let previous = self.store.publish(snapshot);
        self.state.store(SyncState::Idle as u8, Ordering::Release);

        debug!(
            difficulties = counts.0,
            questions = counts.1,
            gamemodes = counts.2,
            content_hash,
            "Published content snapshot"
        );

        Ok(SyncOutcome::Published {
            content_hash,
            changed: has_changed(previous.content_hash, content_hash),
        })
    }

    /// Reload every `period` until cancelled or a cycle fails
    ///
    /// The initial load is expected to have run already, so the first
    /// cycle starts one full period after the call.
    pub async fn run(self: Arc<Self>, period: Duration, cancel: CancellationToken) -> Result<(), FetchError> {
        let mut tick = interval(period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tick.tick().await;

        info!("Content synchronization every {} ms", period.as_millis());

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Content synchronization stopped");
                    return Ok(());
                }
                _ = tick.tick() => {}
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Content synchronization cancelled mid-cycle");
                    return Ok(());
                }
                result = self.sync_once() => {
                    result?;
                }
            }
        }
    }

    fn record_size(&self, metric: &str, len: usize) {
        self.metrics
            .record_set(metric, &[], i64::try_from(len).unwrap_or(i64::MAX));
    }
}
