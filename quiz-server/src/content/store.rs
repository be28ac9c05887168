//! Published content snapshot
//!
//! The store owns a single atomically swappable reference to the current
//! [`Snapshot`]. Readers take one atomic load and keep the `Arc` for as long
//! as they need it; no lock is held across a request. Superseded snapshots
//! are freed once the last reader drops its reference.

use std::sync::Arc;

use arc_swap::ArcSwap;

use super::{readiness, Snapshot};

#[derive(Debug)]
pub struct ContentStore {
    current: ArcSwap<Snapshot>,
}

impl ContentStore {
    /// Create a store holding the empty placeholder snapshot
    pub fn new() -> Self {
        Self::with_snapshot(Snapshot::empty())
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    /// Current snapshot
    pub fn load(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Replace the current snapshot, returning the one it superseded
    ///
    /// Only the synchronizer publishes.
    pub(crate) fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        self.current.swap(Arc::new(snapshot))
    }

    /// Hash of the published questions
    pub fn content_hash(&self) -> i32 {
        self.current.load().content_hash
    }

    /// Readiness of the published snapshot, re-evaluated per call
    pub fn is_ready(&self) -> bool {
        readiness::is_ready(&self.current.load())
    }
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::compute_hash;
    use quiz_common::db::{Difficulty, Question};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn snapshot_with(revision: i64) -> Snapshot {
        let questions: Vec<Question> = (1..=revision % 5 + 1)
            .map(|id| Question {
                id,
                difficulty: 1,
                question: format!("Frage {} in Revision {}", id, revision),
                answer1: "a".to_string(),
                answer2: "b".to_string(),
                answer3: "c".to_string(),
                answer4: "d".to_string(),
                solution: 1,
                reference: None,
            })
            .collect();
        Snapshot {
            difficulties: vec![Difficulty {
                id: 1,
                name: "Leicht".to_string(),
                points: 1,
            }],
            content_hash: compute_hash(&questions),
            questions,
            gamemodes: Vec::new(),
            refreshed_at: Some(chrono::Utc::now()),
        }
    }

    #[test]
    fn starts_empty_and_not_ready() {
        let store = ContentStore::new();
        assert_eq!(*store.load(), Snapshot::empty());
        assert_eq!(store.content_hash(), 0);
        assert!(!store.is_ready());
    }

    #[test]
    fn publish_replaces_whole_snapshot() {
        let store = ContentStore::new();
        let first = snapshot_with(1);
        let previous = store.publish(first.clone());

        assert_eq!(*previous, Snapshot::empty());
        assert_eq!(*store.load(), first);
        assert_eq!(store.content_hash(), first.content_hash);
        assert!(store.is_ready());
    }

    #[test]
    fn readers_keep_their_snapshot_across_publish() {
        let store = ContentStore::new();
        store.publish(snapshot_with(1));

        let held = store.load();
        store.publish(snapshot_with(2));

        assert_eq!(held.questions, snapshot_with(1).questions);
        assert_ne!(held.content_hash, store.content_hash());
    }

    #[test]
    fn concurrent_readers_never_see_mixed_state() {
        let store = Arc::new(ContentStore::new());
        store.publish(snapshot_with(0));
        let done = Arc::new(AtomicBool::new(false));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let done = Arc::clone(&done);
                std::thread::spawn(move || {
                    let mut observed = 0usize;
                    loop {
                        let snapshot = store.load();
                        assert_eq!(snapshot.content_hash, compute_hash(&snapshot.questions));
                        observed += 1;
                        if done.load(Ordering::Relaxed) {
                            break observed;
                        }
                    }
                })
            })
            .collect();

        for revision in 1..500 {
            store.publish(snapshot_with(revision));
        }
        done.store(true, Ordering::Relaxed);

        for reader in readers {
            assert!(reader.join().expect("reader panicked") > 0);
        }
    }
}
