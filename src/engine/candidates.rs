//! Candidate generation - narrowing the catalog before scoring
//!
//! Each source proposes book ids from one signal. The union is taken in
//! source order (history, same author, latent) and cut to a fixed budget
//! without looking at scores; ranking is the scorer's job.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::history::UserHistory;
use crate::catalog::{BookId, FeatureCatalog, UserId};
use crate::embedding::EmbeddingStore;

/// Candidate budget settings (`[candidates]` in config)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateSettings {
    /// Most recent history entries used as seeds
    pub history_window: usize,
    /// Items requested from the latent model
    pub latent_top_k: usize,
    /// Upper bound on the candidate set
    pub max_candidates: usize,
}

impl Default for CandidateSettings {
    fn default() -> Self {
        Self {
            history_window: 50,
            latent_top_k: 20,
            max_candidates: 100,
        }
    }
}

/// Everything a source may read for one request
pub(crate) struct CandidateContext<'a> {
    pub user: &'a UserId,
    pub history: &'a UserHistory,
    pub catalog: &'a FeatureCatalog,
    pub embeddings: &'a EmbeddingStore,
    pub settings: &'a CandidateSettings,
}

/// One candidate-producing strategy
pub(crate) trait CandidateSource: Send + Sync {
    /// Source name for debug logging
    fn name(&self) -> &'static str;

    /// Proposed book ids, in the source's preferred order
    fn propose(&self, ctx: &CandidateContext<'_>) -> Vec<BookId>;

    /// Whether this source can contribute (model loaded, etc.)
    fn is_available(&self, _ctx: &CandidateContext<'_>) -> bool {
        true
    }
}

/// The user's own most recent borrows
pub(crate) struct HistorySource;

impl CandidateSource for HistorySource {
    fn name(&self) -> &'static str {
        "history"
    }

    fn propose(&self, ctx: &CandidateContext<'_>) -> Vec<BookId> {
        ctx.history
            .recent_books(ctx.settings.history_window)
            .cloned()
            .collect()
    }
}

/// Other catalog books by the authors in the recent window
pub(crate) struct SameAuthorSource;

impl CandidateSource for SameAuthorSource {
    fn name(&self) -> &'static str {
        "same_author"
    }

    fn propose(&self, ctx: &CandidateContext<'_>) -> Vec<BookId> {
        let mut proposed = Vec::new();
        for seed in ctx.history.recent_books(ctx.settings.history_window) {
            let Some(author) = ctx.catalog.get(seed).and_then(|b| b.author.as_deref()) else {
                continue;
            };
            proposed.extend(
                ctx.catalog
                    .books_by_author(author)
                    .filter(|b| &b.id != seed)
                    .map(|b| b.id.clone()),
            );
        }
        proposed
    }

    fn is_available(&self, ctx: &CandidateContext<'_>) -> bool {
        !ctx.catalog.is_empty()
    }
}

/// Nearest items under the latent-factor model, limited to catalog books
pub(crate) struct LatentSource;

impl CandidateSource for LatentSource {
    fn name(&self) -> &'static str {
        "latent"
    }

    fn propose(&self, ctx: &CandidateContext<'_>) -> Vec<BookId> {
        ctx.embeddings
            .top_items(ctx.user, ctx.settings.latent_top_k)
            .into_iter()
            .filter_map(|key| ctx.catalog.resolve(key).cloned())
            .collect()
    }

    fn is_available(&self, ctx: &CandidateContext<'_>) -> bool {
        ctx.embeddings.is_enabled()
    }
}

/// Deduplicated, bounded candidate ids in generation order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSet {
    ids: Vec<BookId>,
}

impl CandidateSet {
    fn collect(proposals: impl IntoIterator<Item = BookId>, limit: usize) -> Self {
        let mut seen = HashSet::new();
        let ids = proposals
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .take(limit)
            .collect();
        Self { ids }
    }

    pub fn iter(&self) -> impl Iterator<Item = &BookId> {
        self.ids.iter()
    }

    pub fn contains(&self, id: &BookId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

pub(crate) fn default_sources() -> Vec<Box<dyn CandidateSource>> {
    vec![
        Box::new(HistorySource),
        Box::new(SameAuthorSource),
        Box::new(LatentSource),
    ]
}

/// Union of all available sources, truncated to `max_candidates`.
///
/// Falls back to the raw history ids when the sources produce nothing.
pub(crate) fn generate(
    sources: &[Box<dyn CandidateSource>],
    ctx: &CandidateContext<'_>,
) -> CandidateSet {
    let proposals: Vec<BookId> = sources
        .iter()
        .filter(|s| s.is_available(ctx))
        .flat_map(|source| {
            let proposed = source.propose(ctx);
            tracing::debug!(source = source.name(), count = proposed.len(), "candidates proposed");
            proposed
        })
        .collect();

    let set = CandidateSet::collect(proposals, ctx.settings.max_candidates);
    if !set.is_empty() {
        return set;
    }
    CandidateSet::collect(ctx.history.book_ids().cloned(), ctx.settings.max_candidates)
}
