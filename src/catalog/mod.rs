//! Feature catalog - descriptive attributes per book
//!
//! Public interface:
//! - `FeatureCatalog` read-only map from `BookId` to `BookFeature`
//! - `FeatureCatalog::load` for the tabular catalog file
//! - `BookId` / `UserId` canonical identifiers
//!
//! The catalog is loaded once and never mutated. A missing or malformed
//! table yields an empty catalog, so every content-based signal
//! contributes nothing.
//!
//! # Example
//!
//! ```no_run
//! use bookwise::catalog::{BookId, FeatureCatalog};
//!
//! let catalog = FeatureCatalog::load("data/item.csv").into_loaded().unwrap_or_default();
//! if let Some(book) = catalog.get(&BookId::new("1001")) {
//!     println!("{} by {:?}", book.title, book.author);
//! }
//! ```

mod id;
mod table;

use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::artifact::{load_artifact, Availability};

pub use id::{canonical_id, BookId, UserId};
pub(crate) use id::canonical_json_id;

/// Descriptive attributes of one book
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookFeature {
    pub id: BookId,
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub category1: Option<String>,
    pub category2: Option<String>,
}

/// Immutable book-feature lookup, iterated in load order
#[derive(Debug, Default)]
pub struct FeatureCatalog {
    books: Vec<BookFeature>,
    index: HashMap<BookId, usize>,
    by_author: HashMap<String, Vec<usize>>,
}

impl FeatureCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from records. The first record wins when an id repeats.
    pub fn from_books(books: impl IntoIterator<Item = BookFeature>) -> Self {
        let mut catalog = Self::default();
        for book in books {
            if catalog.index.contains_key(&book.id) {
                tracing::debug!(book_id = %book.id, "duplicate catalog row skipped");
                continue;
            }
            let pos = catalog.books.len();
            if let Some(author) = &book.author {
                catalog.by_author.entry(author.clone()).or_default().push(pos);
            }
            catalog.index.insert(book.id.clone(), pos);
            catalog.books.push(book);
        }
        catalog
    }

    /// Load the catalog table (CSV with a header row)
    pub fn load(path: impl AsRef<Path>) -> Availability<Self> {
        let path = path.as_ref();
        let loaded = load_artifact("catalog", &[path], || table::read_catalog(path));
        if let Some(catalog) = loaded.loaded() {
            tracing::info!(books = catalog.len(), path = %path.display(), "catalog loaded");
        }
        loaded
    }

    pub fn get(&self, id: &BookId) -> Option<&BookFeature> {
        self.index.get(id).map(|&pos| &self.books[pos])
    }

    pub fn contains(&self, id: &BookId) -> bool {
        self.index.contains_key(id)
    }

    /// Map a string key (e.g. from the embedding index) to a catalog id
    pub fn resolve(&self, key: &str) -> Option<&BookId> {
        self.index
            .get_key_value(&BookId::new(key))
            .map(|(id, _)| id)
    }

    /// Books by exactly this author, in catalog order
    pub fn books_by_author<'a>(&'a self, author: &str) -> impl Iterator<Item = &'a BookFeature> {
        self.by_author
            .get(author)
            .into_iter()
            .flatten()
            .map(move |&pos| &self.books[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &BookFeature> {
        self.books.iter()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
