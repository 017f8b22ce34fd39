//! Multi-signal scoring of candidates
//!
//! score = base
//!       + author * author_pref + publisher * publisher_pref
//!       + category1 * category1_pref + category2 * category2_pref
//!       + latent * sigmoid(latent_score)
//!       + popularity * min(borrows / popularity_cap, 1)
//!
//! base is `unseen_base` for books never borrowed by the user and
//! `repeat_base + repeat_step * n` after n borrows. Terms without a signal
//! are omitted. Scores are only meaningful relative to each other.

use serde::{Deserialize, Serialize};

use super::history::UserHistory;
use super::popularity::BorrowCounts;
use crate::catalog::{BookId, FeatureCatalog, UserId};
use crate::embedding::EmbeddingStore;

/// Additive weights (`[scoring]` in config)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub unseen_base: f64,
    pub repeat_base: f64,
    pub repeat_step: f64,
    pub author: f64,
    pub publisher: f64,
    pub category1: f64,
    pub category2: f64,
    pub latent: f64,
    pub popularity: f64,
    /// Borrow count at which the popularity term saturates
    pub popularity_cap: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            unseen_base: 0.1,
            repeat_base: 1.0,
            repeat_step: 0.2,
            author: 0.3,
            publisher: 0.2,
            category1: 0.2,
            category2: 0.1,
            latent: 0.3,
            popularity: 0.01,
            popularity_cap: 100.0,
        }
    }
}

/// A candidate with its final score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub book_id: BookId,
    pub score: f64,
}

/// Per-term contributions of one score
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub repeat_count: usize,
    pub author: f64,
    pub publisher: f64,
    pub category1: f64,
    pub category2: f64,
    /// `None` when the latent model had nothing to say
    pub latent: Option<f64>,
    pub popularity: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.base
            + self.author
            + self.publisher
            + self.category1
            + self.category2
            + self.latent.unwrap_or(0.0)
            + self.popularity
    }
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Read-only view of everything scoring depends on
pub(crate) struct Scorer<'a> {
    pub weights: &'a ScoringWeights,
    pub catalog: &'a FeatureCatalog,
    pub embeddings: &'a EmbeddingStore,
    pub popularity: &'a BorrowCounts,
}

impl Scorer<'_> {
    /// Score one book for a user. `None` for books missing from the catalog.
    pub fn breakdown(
        &self,
        user: &UserId,
        book_id: &BookId,
        history: &UserHistory,
    ) -> Option<ScoreBreakdown> {
        let book = self.catalog.get(book_id)?;
        let w = self.weights;
        let prefs = &history.preferences;

        let repeat_count = history.repeat_count(book_id);
        let base = if repeat_count > 0 {
            w.repeat_base + w.repeat_step * repeat_count as f64
        } else {
            w.unseen_base
        };

        let term = |weight: f64, pref: Option<f64>| pref.map_or(0.0, |p| weight * p);

        let borrows = self.popularity.get(book_id) as f64;
        let popularity = w.popularity * (borrows / w.popularity_cap).min(1.0);

        Some(ScoreBreakdown {
            base,
            repeat_count,
            author: term(w.author, book.author.as_deref().and_then(|a| prefs.author(a))),
            publisher: term(
                w.publisher,
                book.publisher.as_deref().and_then(|p| prefs.publisher(p)),
            ),
            category1: term(
                w.category1,
                book.category1.as_deref().and_then(|c| prefs.category1(c)),
            ),
            category2: term(
                w.category2,
                book.category2.as_deref().and_then(|c| prefs.category2(c)),
            ),
            latent: self
                .embeddings
                .score(user, book_id)
                .map(|s| w.latent * sigmoid(s)),
            popularity,
        })
    }

    pub fn score(&self, user: &UserId, book_id: &BookId, history: &UserHistory) -> Option<f64> {
        self.breakdown(user, book_id, history).map(|b| b.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactError;
    use crate::catalog::BookFeature;
    use crate::embedding::EmbeddingTable;
    use crate::engine::PopularityCounters;
    use crate::engine::history::{build_history, HistorySettings};
    use crate::ledger::Interaction;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};
    use ndarray::array;

    fn catalog() -> FeatureCatalog {
        FeatureCatalog::from_books(vec![
            BookFeature {
                id: BookId::new("B1"),
                title: "One".into(),
                author: Some("A".into()),
                publisher: Some("P".into()),
                category1: Some("C1".into()),
                category2: Some("C2".into()),
            },
            BookFeature {
                id: BookId::new("B2"),
                title: "Two".into(),
                author: Some("A".into()),
                publisher: Some("Q".into()),
                category1: None,
                category2: None,
            },
        ])
    }

    fn history(borrows: &[&str], catalog: &FeatureCatalog) -> UserHistory {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let interactions: Vec<_> = borrows
            .iter()
            .map(|b| Interaction::borrow("u".into(), (*b).into(), start))
            .collect();
        build_history(&interactions, catalog, &HistorySettings::default(), start + Duration::days(1))
    }

    fn disabled() -> EmbeddingStore {
        EmbeddingStore::disabled(ArtifactError::missing("none"))
    }

    #[test]
    fn test_repeat_and_preference_terms() {
        let catalog = catalog();
        let history = history(&["B1"], &catalog);
        let weights = ScoringWeights::default();
        let counters = BorrowCounts::default();
        let embeddings = disabled();
        let scorer = Scorer {
            weights: &weights,
            catalog: &catalog,
            embeddings: &embeddings,
            popularity: &counters,
        };
        let user = UserId::new("u");

        // B1: 1.0 + 0.2 + 0.3 + 0.2 + 0.2 + 0.1
        let b1 = scorer.breakdown(&user, &BookId::new("B1"), &history).unwrap();
        assert_eq!(b1.repeat_count, 1);
        assert_relative_eq!(b1.total(), 2.0, epsilon = 1e-9);
        assert!(b1.latent.is_none());

        // B2: 0.1 + 0.3 (author only)
        let b2 = scorer.score(&user, &BookId::new("B2"), &history).unwrap();
        assert_relative_eq!(b2, 0.4, epsilon = 1e-9);

        assert!(scorer.score(&user, &BookId::new("B9"), &history).is_none());
    }

    #[test]
    fn test_repeat_borrows_increase_score() {
        let catalog = catalog();
        let weights = ScoringWeights::default();
        let counters = BorrowCounts::default();
        let embeddings = disabled();
        let scorer = Scorer {
            weights: &weights,
            catalog: &catalog,
            embeddings: &embeddings,
            popularity: &counters,
        };
        let user = UserId::new("u");
        let book = BookId::new("B2");

        let once = scorer.score(&user, &book, &history(&["B2"], &catalog)).unwrap();
        let twice = scorer.score(&user, &book, &history(&["B2", "B2"], &catalog)).unwrap();
        let thrice = scorer
            .score(&user, &book, &history(&["B2", "B2", "B2"], &catalog))
            .unwrap();
        assert!(once < twice && twice < thrice);
    }

    #[test]
    fn test_latent_term_and_popularity_cap() {
        let catalog = catalog();
        let weights = ScoringWeights::default();
        let mut counters = PopularityCounters::new();
        let many: Vec<BookId> = (0..250).map(|_| BookId::new("B2")).collect();
        counters.observe(&UserId::new("other"), &many);
        let table = EmbeddingTable::new(
            vec!["u".into()],
            vec!["B2".into()],
            array![[0.0]],
            array![[0.0]],
            None,
            None,
        )
        .unwrap();
        let embeddings = EmbeddingStore::from_table(table);
        let borrows = counters.counts_for([&BookId::new("B2")]);
        let scorer = Scorer {
            weights: &weights,
            catalog: &catalog,
            embeddings: &embeddings,
            popularity: &borrows,
        };

        let b = scorer
            .breakdown(&UserId::new("u"), &BookId::new("B2"), &UserHistory::default())
            .unwrap();
        // sigmoid(0) = 0.5
        assert_relative_eq!(b.latent.unwrap(), 0.15, epsilon = 1e-9);
        assert_relative_eq!(b.popularity, 0.01, epsilon = 1e-12);
        assert_relative_eq!(b.total(), 0.1 + 0.15 + 0.01, epsilon = 1e-9);
    }

    #[test]
    fn test_sigmoid() {
        assert_relative_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(10.0) > 0.9999);
        assert!(sigmoid(-10.0) < 0.0001);
    }
}
