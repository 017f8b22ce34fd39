//! Final selection: rank scored candidates, cold-start fallback

use super::popularity::PopularityCounters;
use super::scorer::ScoredCandidate;

/// Best `top_k` by descending score. Ties keep candidate order.
pub fn rank(mut scored: Vec<ScoredCandidate>, top_k: usize) -> Vec<ScoredCandidate> {
    // sort_by is stable
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_k);
    scored
}

/// Non-personalized fallback: most borrowed books, scored by borrow count
pub fn cold_start(popularity: &PopularityCounters, top_k: usize) -> Vec<ScoredCandidate> {
    popularity
        .most_popular(top_k)
        .into_iter()
        .map(|(book_id, count)| ScoredCandidate {
            book_id,
            score: count as f64,
        })
        .collect()
}
