//! Global borrow counters
//!
//! The only state shared across requests. Each observation of a user
//! replaces that user's previous contribution, so re-reading the same
//! history leaves the totals unchanged.

use std::collections::HashMap;

use crate::catalog::{BookId, UserId};

#[derive(Debug, Default)]
pub struct PopularityCounters {
    per_user: HashMap<UserId, HashMap<BookId, u64>>,
    user_totals: HashMap<UserId, u64>,
    book_totals: HashMap<BookId, u64>,
    /// Books in the order they were first counted; ranking tie-break
    first_seen: Vec<BookId>,
}

impl PopularityCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the full borrow list of a user, replacing any earlier one
    pub fn observe<'a>(&mut self, user: &UserId, books: impl IntoIterator<Item = &'a BookId>) {
        let mut counts: HashMap<BookId, u64> = HashMap::new();
        let mut total = 0;
        for book in books {
            if !self.book_totals.contains_key(book) {
                self.book_totals.insert(book.clone(), 0);
                self.first_seen.push(book.clone());
            }
            *counts.entry(book.clone()).or_default() += 1;
            total += 1;
        }

        if let Some(previous) = self.per_user.remove(user) {
            for (book, n) in previous {
                if let Some(t) = self.book_totals.get_mut(&book) {
                    *t = t.saturating_sub(n);
                }
            }
        }
        for (book, n) in &counts {
            *self.book_totals.entry(book.clone()).or_default() += n;
        }

        self.user_totals.insert(user.clone(), total);
        self.per_user.insert(user.clone(), counts);
    }

    pub fn book_count(&self, book: &BookId) -> u64 {
        self.book_totals.get(book).copied().unwrap_or(0)
    }

    pub fn user_count(&self, user: &UserId) -> u64 {
        self.user_totals.get(user).copied().unwrap_or(0)
    }

    /// Snapshot of the counts for `books`, for use after the lock is released
    pub fn counts_for<'a>(&self, books: impl IntoIterator<Item = &'a BookId>) -> BorrowCounts {
        BorrowCounts(
            books
                .into_iter()
                .map(|b| (b.clone(), self.book_count(b)))
                .collect(),
        )
    }

    pub fn total_borrows(&self) -> u64 {
        self.user_totals.values().sum()
    }

    pub fn users_observed(&self) -> usize {
        self.per_user.len()
    }

    /// Up to `n` books by descending borrow count; ties keep first-seen order.
    /// Books with no borrows are never returned.
    pub fn most_popular(&self, n: usize) -> Vec<(BookId, u64)> {
        let mut ranked: Vec<(BookId, u64)> = self
            .first_seen
            .iter()
            .map(|b| (b.clone(), self.book_count(b)))
            .filter(|(_, count)| *count > 0)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

/// Borrow counts copied out of `PopularityCounters`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BorrowCounts(HashMap<BookId, u64>);

impl BorrowCounts {
    /// Count for `book`, 0 when it was not part of the snapshot
    pub fn get(&self, book: &BookId) -> u64 {
        self.0.get(book).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn books(ids: &[&str]) -> Vec<BookId> {
        ids.iter().map(|s| BookId::new(s)).collect()
    }

    #[test]
    fn test_counts_accumulate_across_users() {
        let mut counters = PopularityCounters::new();
        counters.observe(&UserId::new("u1"), &books(&["a", "b", "a"]));
        counters.observe(&UserId::new("u2"), &books(&["b"]));

        assert_eq!(counters.book_count(&BookId::new("a")), 2);
        assert_eq!(counters.book_count(&BookId::new("b")), 2);
        assert_eq!(counters.user_count(&UserId::new("u1")), 3);
        assert_eq!(counters.total_borrows(), 4);
    }

    #[test]
    fn test_reobserving_user_is_idempotent() {
        let mut counters = PopularityCounters::new();
        let user = UserId::new("u1");
        counters.observe(&user, &books(&["a", "b"]));
        counters.observe(&user, &books(&["a", "b"]));

        assert_eq!(counters.book_count(&BookId::new("a")), 1);
        assert_eq!(counters.total_borrows(), 2);

        counters.observe(&user, &books(&["b", "c"]));
        assert_eq!(counters.book_count(&BookId::new("a")), 0);
        assert_eq!(counters.book_count(&BookId::new("c")), 1);
    }

    #[test]
    fn test_most_popular_ties_first_seen() {
        let mut counters = PopularityCounters::new();
        counters.observe(&UserId::new("u1"), &books(&["x", "y", "z"]));
        counters.observe(&UserId::new("u2"), &books(&["z"]));

        let top = counters.most_popular(3);
        let ids: Vec<_> = top.iter().map(|(b, _)| b.as_str()).collect();
        assert_eq!(ids, vec!["z", "x", "y"]);
        assert_eq!(top[0].1, 2);
    }

    #[test]
    fn test_most_popular_skips_zero_counts() {
        let mut counters = PopularityCounters::new();
        let user = UserId::new("u1");
        counters.observe(&user, &books(&["a"]));
        counters.observe(&user, &books(&[]));

        assert!(counters.most_popular(5).is_empty());
    }

    #[test]
    fn test_counts_for_is_detached_snapshot() {
        let mut counters = PopularityCounters::new();
        counters.observe(&UserId::new("u1"), &books(&["a", "a", "b"]));

        let wanted = books(&["a", "zzz"]);
        let snapshot = counters.counts_for(&wanted);
        counters.observe(&UserId::new("u1"), &books(&[]));

        assert_eq!(snapshot.get(&BookId::new("a")), 2);
        assert_eq!(snapshot.get(&BookId::new("zzz")), 0);
        // not requested
        assert_eq!(snapshot.get(&BookId::new("b")), 0);
        assert_eq!(counters.book_count(&BookId::new("a")), 0);
    }
}
