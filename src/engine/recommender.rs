//! Recommender - the engine context shared by all requests

use chrono::Utc;
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;

use super::candidates::{self, CandidateContext, CandidateSet, CandidateSettings, CandidateSource};
use super::history::{build_history, HistorySettings, UserHistory};
use super::popularity::PopularityCounters;
use super::scorer::{ScoreBreakdown, ScoredCandidate, Scorer, ScoringWeights};
use super::selector;
use crate::catalog::{BookId, FeatureCatalog, UserId};
use crate::config::Config;
use crate::embedding::{EmbeddingStatus, EmbeddingStore};
use crate::ledger::BorrowLedger;

/// Tunables of the engine
#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub history: HistorySettings,
    pub candidates: CandidateSettings,
    pub scoring: ScoringWeights,
}

/// Snapshot of engine state for operators
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub catalog_books: usize,
    pub embeddings: EmbeddingStatus,
    pub users_observed: usize,
    pub total_borrows: u64,
}

/// Hybrid recommendation engine.
///
/// Catalog and embedding store are immutable after construction. The
/// popularity counters are the only shared mutable state and sit behind
/// one mutex.
pub struct Recommender {
    catalog: FeatureCatalog,
    embeddings: EmbeddingStore,
    ledger: Arc<dyn BorrowLedger>,
    settings: EngineSettings,
    sources: Vec<Box<dyn CandidateSource>>,
    popularity: Mutex<PopularityCounters>,
}

impl Recommender {
    pub fn new(
        catalog: FeatureCatalog,
        embeddings: EmbeddingStore,
        ledger: Arc<dyn BorrowLedger>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            catalog,
            embeddings,
            ledger,
            settings,
            sources: candidates::default_sources(),
            popularity: Mutex::new(PopularityCounters::new()),
        }
    }

    /// Load artifacts named by `config`. A missing or malformed catalog
    /// leaves an empty catalog; a missing embedding bundle disables the
    /// latent term. Neither is fatal.
    pub fn load(config: &Config, ledger: Arc<dyn BorrowLedger>) -> Self {
        let catalog = FeatureCatalog::load(config.catalog.resolved_path())
            .into_loaded()
            .unwrap_or_default();
        let embeddings = EmbeddingStore::load(
            config.embeddings.resolved_vectors_path(),
            config.embeddings.resolved_mapping_path(),
        );
        Self::new(catalog, embeddings, ledger, config.engine_settings())
    }

    pub fn catalog(&self) -> &FeatureCatalog {
        &self.catalog
    }

    pub fn embeddings(&self) -> &EmbeddingStore {
        &self.embeddings
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Count every user's borrows so cold start has something to offer.
    ///
    /// Returns the number of users observed.
    pub fn warm_popularity(&self) -> anyhow::Result<usize> {
        let users = self.ledger.list_users()?;
        let mut observed = 0;
        for user in &users {
            let interactions = self.ledger.list_interactions(user)?;
            self.popularity
                .lock()
                .observe(user, interactions.iter().map(|i| &i.book_id));
            observed += 1;
        }
        tracing::info!(users = observed, "popularity counters warmed");
        Ok(observed)
    }

    /// Rebuild a user's weighted history from the ledger and refresh the
    /// global counters with it.
    ///
    /// A failed ledger read yields an empty history and leaves the counters
    /// untouched, so the user's earlier borrows still count for everyone.
    pub fn history(&self, user: &UserId) -> UserHistory {
        let interactions = match self.ledger.list_interactions(user) {
            Ok(interactions) => interactions,
            Err(e) => {
                tracing::warn!(user = %user, "ledger read failed, treating history as empty: {e:#}");
                return UserHistory::default();
            }
        };

        let history = build_history(&interactions, &self.catalog, &self.settings.history, Utc::now());
        self.popularity.lock().observe(user, history.book_ids());
        history
    }

    /// Candidate set for a user with a prepared history
    pub fn candidates(&self, user: &UserId, history: &UserHistory) -> CandidateSet {
        let ctx = CandidateContext {
            user,
            history,
            catalog: &self.catalog,
            embeddings: &self.embeddings,
            settings: &self.settings.candidates,
        };
        candidates::generate(&self.sources, &ctx)
    }

    /// Up to `top_k` recommendations, best first.
    ///
    /// Users without history get the most borrowed books. An empty result
    /// means no recommendation is available.
    pub fn recommend(&self, user: &UserId, top_k: usize) -> Vec<ScoredCandidate> {
        let history = self.history(user);
        if history.is_empty() {
            tracing::debug!(user = %user, "no history, using popularity");
            return selector::cold_start(&self.popularity.lock(), top_k);
        }

        let candidates = self.candidates(user, &history);
        // copy the counts out so scoring runs without the lock
        let borrows = self.popularity.lock().counts_for(candidates.iter());
        let scorer = Scorer {
            weights: &self.settings.scoring,
            catalog: &self.catalog,
            embeddings: &self.embeddings,
            popularity: &borrows,
        };
        let scored: Vec<ScoredCandidate> = candidates
            .iter()
            .filter_map(|book_id| {
                scorer.score(user, book_id, &history).map(|score| ScoredCandidate {
                    book_id: book_id.clone(),
                    score,
                })
            })
            .collect();

        tracing::debug!(
            user = %user,
            candidates = candidates.len(),
            scored = scored.len(),
            "candidates scored"
        );
        selector::rank(scored, top_k)
    }

    /// Single best book for a user, if any
    pub fn recommend_one(&self, user: &UserId) -> Option<BookId> {
        self.recommend(user, 1).into_iter().next().map(|c| c.book_id)
    }

    /// Recommendations for many users in parallel, in input order
    pub fn recommend_many(
        &self,
        users: &[UserId],
        top_k: usize,
    ) -> Vec<(UserId, Vec<ScoredCandidate>)> {
        users
            .par_iter()
            .map(|user| (user.clone(), self.recommend(user, top_k)))
            .collect()
    }

    /// Term-by-term score of one book for a user
    pub fn explain(&self, user: &UserId, book: &BookId) -> Option<ScoreBreakdown> {
        let history = self.history(user);
        let borrows = self.popularity.lock().counts_for([book]);
        let scorer = Scorer {
            weights: &self.settings.scoring,
            catalog: &self.catalog,
            embeddings: &self.embeddings,
            popularity: &borrows,
        };
        scorer.breakdown(user, book, &history)
    }

    /// Most borrowed books with their counts
    pub fn popular(&self, n: usize) -> Vec<(BookId, u64)> {
        self.popularity.lock().most_popular(n)
    }

    pub fn status(&self) -> EngineStatus {
        let counters = self.popularity.lock();
        EngineStatus {
            catalog_books: self.catalog.len(),
            embeddings: self.embeddings.status(),
            users_observed: counters.users_observed(),
            total_borrows: counters.total_borrows(),
        }
    }
}
