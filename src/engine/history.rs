//! Interaction history with recency decay and feature preferences

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::catalog::{BookFeature, BookId, FeatureCatalog};
use crate::ledger::Interaction;

/// Point in time that recency is measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayReference {
    /// The user's own most recent borrow; their latest book always has weight 1.0
    #[default]
    LastInteraction,
    /// Wall-clock time of the request; dormant users decay as a whole
    Now,
}

/// History decay settings (`[history]` in config)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// e-folding time of the exponential decay, in days
    pub decay_days: f64,
    pub decay_reference: DecayReference,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            decay_days: 120.0,
            decay_reference: DecayReference::LastInteraction,
        }
    }
}

/// A borrowed book with its recency weight in (0, 1]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedHistoryEntry {
    pub book_id: BookId,
    pub recency_weight: f64,
    pub borrowed_at: DateTime<Utc>,
}

/// Recency-weighted totals per author, publisher and category
#[derive(Debug, Clone, Default)]
pub struct PreferenceAccumulator {
    pub authors: HashMap<String, f64>,
    pub publishers: HashMap<String, f64>,
    pub category1: HashMap<String, f64>,
    pub category2: HashMap<String, f64>,
}

impl PreferenceAccumulator {
    fn absorb(&mut self, book: &BookFeature, weight: f64) {
        let fields = [
            (&mut self.authors, &book.author),
            (&mut self.publishers, &book.publisher),
            (&mut self.category1, &book.category1),
            (&mut self.category2, &book.category2),
        ];
        for (map, value) in fields {
            if let Some(value) = value {
                *map.entry(value.clone()).or_default() += weight;
            }
        }
    }

    pub fn author(&self, author: &str) -> Option<f64> {
        self.authors.get(author).copied()
    }

    pub fn publisher(&self, publisher: &str) -> Option<f64> {
        self.publishers.get(publisher).copied()
    }

    pub fn category1(&self, category: &str) -> Option<f64> {
        self.category1.get(category).copied()
    }

    pub fn category2(&self, category: &str) -> Option<f64> {
        self.category2.get(category).copied()
    }
}

/// Request-scoped history of one user
#[derive(Debug, Clone, Default)]
pub struct UserHistory {
    pub entries: Vec<WeightedHistoryEntry>,
    pub preferences: PreferenceAccumulator,
}

impl UserHistory {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// How many times this exact book was borrowed
    pub fn repeat_count(&self, book: &BookId) -> usize {
        self.entries.iter().filter(|e| &e.book_id == book).count()
    }

    /// Book ids of the `n` most recent entries, oldest first
    pub fn recent_books(&self, n: usize) -> impl Iterator<Item = &BookId> {
        let start = self.entries.len().saturating_sub(n);
        self.entries[start..].iter().map(|e| &e.book_id)
    }

    pub fn book_ids(&self) -> impl Iterator<Item = &BookId> {
        self.entries.iter().map(|e| &e.book_id)
    }
}

/// Build a weighted history from time-ordered interactions.
///
/// weight = exp(-age_days / decay_days), where age is counted in whole
/// days back from the reference point. Books found in the catalog feed
/// their attributes into the preference accumulator.
pub fn build_history(
    interactions: &[Interaction],
    catalog: &FeatureCatalog,
    settings: &HistorySettings,
    now: DateTime<Utc>,
) -> UserHistory {
    let reference = match settings.decay_reference {
        DecayReference::LastInteraction => {
            match interactions.iter().map(|i| i.borrowed_at).max() {
                Some(latest) => latest,
                None => return UserHistory::default(),
            }
        }
        DecayReference::Now => now,
    };

    let mut history = UserHistory {
        entries: Vec::with_capacity(interactions.len()),
        preferences: PreferenceAccumulator::default(),
    };

    for interaction in interactions {
        let weight = recency_weight(reference, interaction.borrowed_at, settings.decay_days);
        if let Some(book) = catalog.get(&interaction.book_id) {
            history.preferences.absorb(book, weight);
        }
        history.entries.push(WeightedHistoryEntry {
            book_id: interaction.book_id.clone(),
            recency_weight: weight,
            borrowed_at: interaction.borrowed_at,
        });
    }

    history
}

/// exp(-days / decay_days), clamped so future timestamps weigh 1.0
pub fn recency_weight(reference: DateTime<Utc>, at: DateTime<Utc>, decay_days: f64) -> f64 {
    let age_days = (reference - at).num_days().max(0) as f64;
    (-age_days / decay_days).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, TimeZone};

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
    }

    fn feature(id: &str, author: &str, c1: Option<&str>) -> BookFeature {
        BookFeature {
            id: BookId::new(id),
            title: id.to_string(),
            author: Some(author.to_string()),
            publisher: Some("Press".to_string()),
            category1: c1.map(str::to_string),
            category2: None,
        }
    }

    fn borrow(book: &str, days_before: i64) -> Interaction {
        Interaction::borrow(
            "u".into(),
            book.into(),
            reference() - Duration::days(days_before),
        )
    }

    #[test]
    fn test_decay_relative_to_last_borrow() {
        let catalog = FeatureCatalog::from_books(vec![
            feature("b1", "A", Some("Fiction")),
            feature("b2", "B", Some("Fiction")),
        ]);
        let interactions = vec![borrow("b1", 60), borrow("b2", 0)];

        let history = build_history(
            &interactions,
            &catalog,
            &HistorySettings::default(),
            reference() + Duration::days(365),
        );

        assert_abs_diff_eq!(history.entries[0].recency_weight, (-0.5f64).exp(), epsilon = 1e-6);
        assert_abs_diff_eq!(history.entries[0].recency_weight, 0.6065, epsilon = 1e-4);
        assert_abs_diff_eq!(history.entries[1].recency_weight, 1.0, epsilon = 1e-12);

        let prefs = &history.preferences;
        assert_abs_diff_eq!(prefs.author("A").unwrap(), 0.60653066, epsilon = 1e-6);
        assert_abs_diff_eq!(prefs.author("B").unwrap(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(prefs.publisher("Press").unwrap(), 1.60653066, epsilon = 1e-6);
        assert_abs_diff_eq!(prefs.category1("Fiction").unwrap(), 1.60653066, epsilon = 1e-6);
        assert!(prefs.category2.is_empty());
    }

    #[test]
    fn test_decay_from_now() {
        let catalog = FeatureCatalog::empty();
        let settings = HistorySettings {
            decay_reference: DecayReference::Now,
            ..Default::default()
        };
        let history = build_history(
            &[borrow("b1", 0)],
            &catalog,
            &settings,
            reference() + Duration::days(120),
        );
        assert_abs_diff_eq!(history.entries[0].recency_weight, (-1.0f64).exp(), epsilon = 1e-9);
    }

    #[test]
    fn test_partial_days_truncate() {
        let at = reference() - Duration::hours(47);
        assert_abs_diff_eq!(
            recency_weight(reference(), at, 120.0),
            (-1.0f64 / 120.0).exp(),
            epsilon = 1e-12
        );
        assert_eq!(recency_weight(reference(), reference() + Duration::days(3), 120.0), 1.0);
    }

    #[test]
    fn test_unknown_books_kept_without_preferences() {
        let catalog = FeatureCatalog::empty();
        let history = build_history(
            &[borrow("ghost", 3), borrow("ghost", 0)],
            &catalog,
            &HistorySettings::default(),
            reference(),
        );
        assert_eq!(history.len(), 2);
        assert_eq!(history.repeat_count(&BookId::new("ghost")), 2);
        assert!(history.preferences.authors.is_empty());
    }

    #[test]
    fn test_recent_books_window() {
        let catalog = FeatureCatalog::empty();
        let interactions: Vec<_> = (0..5).map(|i| borrow(&format!("b{i}"), 10 - i)).collect();
        let history = build_history(
            &interactions,
            &catalog,
            &HistorySettings::default(),
            reference(),
        );

        let recent: Vec<_> = history.recent_books(2).map(|b| b.as_str()).collect();
        assert_eq!(recent, vec!["b3", "b4"]);
        assert_eq!(history.recent_books(50).count(), 5);
    }

    #[test]
    fn test_empty_interactions() {
        let history = build_history(
            &[],
            &FeatureCatalog::empty(),
            &HistorySettings::default(),
            reference(),
        );
        assert!(history.is_empty());
    }
}
