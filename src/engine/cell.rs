//! Once-only engine initialization
//!
//! Startup code paths may race to build the engine; the first one wins
//! and every caller gets the same instance. Before initialization every
//! request answers "no recommendation".

use std::sync::{Arc, OnceLock};

use super::recommender::Recommender;
use super::scorer::ScoredCandidate;
use crate::catalog::{BookId, UserId};

#[derive(Default)]
pub struct EngineCell {
    engine: OnceLock<Arc<Recommender>>,
}

impl EngineCell {
    pub const fn new() -> Self {
        Self {
            engine: OnceLock::new(),
        }
    }

    /// Initialize with `init` unless already initialized
    pub fn get_or_init(&self, init: impl FnOnce() -> Recommender) -> Arc<Recommender> {
        Arc::clone(self.engine.get_or_init(|| Arc::new(init())))
    }

    pub fn get(&self) -> Option<Arc<Recommender>> {
        self.engine.get().cloned()
    }

    pub fn is_ready(&self) -> bool {
        self.engine.get().is_some()
    }

    pub fn recommend(&self, user: &UserId, top_k: usize) -> Vec<ScoredCandidate> {
        match self.engine.get() {
            Some(engine) => engine.recommend(user, top_k),
            None => Vec::new(),
        }
    }

    pub fn recommend_one(&self, user: &UserId) -> Option<BookId> {
        self.engine.get()?.recommend_one(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactError;
    use crate::catalog::FeatureCatalog;
    use crate::embedding::EmbeddingStore;
    use crate::engine::EngineSettings;
    use crate::ledger::MemoryLedger;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn engine() -> Recommender {
        Recommender::new(
            FeatureCatalog::empty(),
            EmbeddingStore::disabled(ArtifactError::missing("none")),
            Arc::new(MemoryLedger::new()),
            EngineSettings::default(),
        )
    }

    #[test]
    fn test_uninitialized_degrades() {
        let cell = EngineCell::new();
        assert!(!cell.is_ready());
        assert!(cell.recommend_one(&UserId::new("1")).is_none());
        assert!(cell.recommend(&UserId::new("1"), 5).is_empty());
    }

    #[test]
    fn test_initializes_once() {
        let cell = EngineCell::new();
        let builds = AtomicUsize::new(0);

        let first = cell.get_or_init(|| {
            builds.fetch_add(1, Ordering::SeqCst);
            engine()
        });
        let second = cell.get_or_init(|| {
            builds.fetch_add(1, Ordering::SeqCst);
            engine()
        });

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cell.is_ready());
    }

    #[test]
    fn test_concurrent_init_single_instance() {
        let cell = EngineCell::new();
        let builds = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    cell.get_or_init(|| {
                        builds.fetch_add(1, Ordering::SeqCst);
                        engine()
                    });
                });
            }
        });

        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }
}
