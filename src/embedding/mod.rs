//! Embedding store - pretrained latent-factor model lookup
//!
//! Public interface:
//! - `EmbeddingStore::load` reads the vectors bundle and the id mapping
//! - `EmbeddingStore::score` for one (user, book) pair
//! - `EmbeddingStore::top_items` for the best-scoring items of a user
//!
//! Both files must exist. Otherwise the store is disabled and every
//! operation answers "no contribution" (`None` / empty). Training is done
//! elsewhere; the store is read-only after load.

mod artifact;
mod table;

use serde::Serialize;
use std::path::Path;

use crate::artifact::{load_artifact, ArtifactError, Availability};
use crate::catalog::{BookId, UserId};

pub use artifact::{ITEM_BIASES, ITEM_EMBEDDINGS, USER_BIASES, USER_EMBEDDINGS};
pub use table::EmbeddingTable;

/// Latent-factor store, enabled or disabled at load time
#[derive(Debug)]
pub struct EmbeddingStore {
    state: Availability<EmbeddingTable>,
}

/// Summary for status reporting
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EmbeddingStatus {
    Enabled {
        users: usize,
        items: usize,
        dimension: usize,
    },
    Disabled {
        reason: String,
    },
}

impl EmbeddingStore {
    /// Load from the vectors bundle and the mapping document
    pub fn load(vectors_path: impl AsRef<Path>, mapping_path: impl AsRef<Path>) -> Self {
        let vectors_path = vectors_path.as_ref();
        let mapping_path = mapping_path.as_ref();

        let state = load_artifact("embeddings", &[vectors_path, mapping_path], || {
            artifact::read_table(vectors_path, mapping_path)
        });
        if let Some(table) = state.loaded() {
            tracing::info!(
                users = table.user_count(),
                items = table.item_count(),
                dimension = table.dimension(),
                "latent-factor model loaded"
            );
        }
        Self { state }
    }

    pub fn from_table(table: EmbeddingTable) -> Self {
        Self {
            state: Availability::Loaded(table),
        }
    }

    pub fn disabled(reason: ArtifactError) -> Self {
        Self {
            state: Availability::Disabled(reason),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_loaded()
    }

    pub fn table(&self) -> Option<&EmbeddingTable> {
        self.state.loaded()
    }

    /// Latent compatibility of a user and a book.
    ///
    /// `None` when the store is disabled or either id is unmapped.
    pub fn score(&self, user: &UserId, book: &BookId) -> Option<f64> {
        self.table()?.score(user.as_str(), book.as_str())
    }

    /// Top `k` item keys for a user, best first. Empty when disabled or
    /// the user is unmapped.
    pub fn top_items(&self, user: &UserId, k: usize) -> Vec<&str> {
        match self.table() {
            Some(table) => table.top_items(user.as_str(), k),
            None => Vec::new(),
        }
    }

    pub fn status(&self) -> EmbeddingStatus {
        match &self.state {
            Availability::Loaded(table) => EmbeddingStatus::Enabled {
                users: table.user_count(),
                items: table.item_count(),
                dimension: table.dimension(),
            },
            Availability::Disabled(reason) => EmbeddingStatus::Disabled {
                reason: reason.to_string(),
            },
        }
    }
}
