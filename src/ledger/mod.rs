//! Borrow ledger - append-only borrowing history
//!
//! The recommendation core only reads the ledger: one time-ordered
//! interaction list per user. Writes (borrow / return) belong to the
//! circulation desk and are exposed here for fixtures and the CLI.
//!
//! Implementations:
//! - `SqliteLedger` backed by a `borrow_records` table
//! - `MemoryLedger` for tests and demos

mod sqlite;

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::catalog::{BookId, UserId};

pub use sqlite::SqliteLedger;

/// One borrow event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interaction {
    pub user_id: UserId,
    pub book_id: BookId,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl Interaction {
    pub fn borrow(user_id: UserId, book_id: BookId, borrowed_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            book_id,
            borrowed_at,
            returned_at: None,
        }
    }
}

/// Read interface the recommendation core depends on
pub trait BorrowLedger: Send + Sync {
    /// All interactions of a user, oldest first
    fn list_interactions(&self, user: &UserId) -> Result<Vec<Interaction>>;

    /// Every user with at least one interaction
    fn list_users(&self) -> Result<Vec<UserId>>;
}

/// In-memory ledger, ordered by borrow time then insertion
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: RwLock<Vec<Interaction>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interactions(interactions: impl IntoIterator<Item = Interaction>) -> Self {
        let ledger = Self::new();
        for interaction in interactions {
            ledger.record(interaction);
        }
        ledger
    }

    pub fn record(&self, interaction: Interaction) {
        self.records.write().push(interaction);
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl BorrowLedger for MemoryLedger {
    fn list_interactions(&self, user: &UserId) -> Result<Vec<Interaction>> {
        let mut found: Vec<Interaction> = self
            .records
            .read()
            .iter()
            .filter(|r| &r.user_id == user)
            .cloned()
            .collect();
        // Stable: equal timestamps keep insertion order
        found.sort_by_key(|r| r.borrowed_at);
        Ok(found)
    }

    fn list_users(&self) -> Result<Vec<UserId>> {
        let mut users: Vec<UserId> = Vec::new();
        for record in self.records.read().iter() {
            if !users.contains(&record.user_id) {
                users.push(record.user_id.clone());
            }
        }
        Ok(users)
    }
}
