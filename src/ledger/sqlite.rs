//! SQLite-backed borrow ledger
//!
//! Schema: a single `borrow_records` table. Timestamps are stored as
//! RFC 3339 text via rusqlite's chrono support.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::{BorrowLedger, Interaction};
use crate::catalog::{BookId, UserId};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS borrow_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    book_id TEXT NOT NULL,
    borrow_date TEXT NOT NULL,
    return_date TEXT
);
CREATE INDEX IF NOT EXISTS idx_borrow_records_user
    ON borrow_records(user_id, borrow_date);
";

/// Borrow ledger stored in SQLite
pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    /// Open or create a ledger database file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open ledger {}", path.display()))?;
        Self::with_connection(conn)
    }

    /// Create an in-memory ledger for testing
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to create in-memory ledger")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .context("Failed to create borrow_records schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Append a borrow event, returning its row id
    pub fn record_borrow(
        &self,
        user: &UserId,
        book: &BookId,
        borrowed_at: DateTime<Utc>,
    ) -> Result<i64> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO borrow_records (user_id, book_id, borrow_date) VALUES (?1, ?2, ?3)",
            params![user.as_str(), book.as_str(), borrowed_at],
        )
        .context("Failed to record borrow")?;
        Ok(conn.last_insert_rowid())
    }

    /// Close the most recent open borrow of this book by this user.
    ///
    /// Returns false when no open borrow exists.
    pub fn record_return(
        &self,
        user: &UserId,
        book: &BookId,
        returned_at: DateTime<Utc>,
    ) -> Result<bool> {
        let conn = self.conn.lock();
        let open: Option<i64> = conn
            .query_row(
                "SELECT id FROM borrow_records
                 WHERE user_id = ?1 AND book_id = ?2 AND return_date IS NULL
                 ORDER BY borrow_date DESC, id DESC
                 LIMIT 1",
                params![user.as_str(), book.as_str()],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to look up open borrow")?;

        let Some(id) = open else {
            return Ok(false);
        };
        conn.execute(
            "UPDATE borrow_records SET return_date = ?1 WHERE id = ?2",
            params![returned_at, id],
        )
        .context("Failed to record return")?;
        Ok(true)
    }

    /// Total number of borrow events
    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM borrow_records", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

impl BorrowLedger for SqliteLedger {
    fn list_interactions(&self, user: &UserId) -> Result<Vec<Interaction>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT book_id, borrow_date, return_date FROM borrow_records
             WHERE user_id = ?1
             ORDER BY borrow_date ASC, id ASC",
        )?;

        let rows = stmt.query_map(params![user.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, DateTime<Utc>>(1)?,
                row.get::<_, Option<DateTime<Utc>>>(2)?,
            ))
        })?;

        let mut interactions = Vec::new();
        for row in rows {
            let (book_id, borrowed_at, returned_at) =
                row.with_context(|| format!("Corrupt borrow record for user {user}"))?;
            interactions.push(Interaction {
                user_id: user.clone(),
                book_id: BookId::new(book_id),
                borrowed_at,
                returned_at,
            });
        }
        Ok(interactions)
    }

    fn list_users(&self) -> Result<Vec<UserId>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT user_id FROM borrow_records GROUP BY user_id ORDER BY MIN(id)",
        )?;
        let users = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .map(|r| r.map(UserId::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}
