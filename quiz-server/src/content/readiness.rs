//! Readiness gate
//!
//! Ready means "a usable snapshot is published": at least one difficulty
//! and at least one question. Evaluated on every call so a later cycle
//! that publishes empty collections turns readiness off again.

use super::Snapshot;

pub fn is_ready(snapshot: &Snapshot) -> bool {
    !snapshot.difficulties.is_empty() && !snapshot.questions.is_empty()
}
