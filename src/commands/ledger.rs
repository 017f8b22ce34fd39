//! Borrow / return bookkeeping against the SQLite ledger

use anyhow::{Context, Result};
use bookwise::config;
use bookwise::{BookId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use colored::*;
use std::path::Path;

use super::open_ledger;

pub fn borrow(config_path: Option<&Path>, user: &str, book: &str, at: Option<&str>) -> Result<()> {
    let config = config::load(config_path)?;
    let ledger = open_ledger(&config)?;
    let borrowed_at = match at {
        Some(raw) => parse_timestamp(raw)?,
        None => Utc::now(),
    };

    let id = ledger.record_borrow(&UserId::new(user), &BookId::new(book), borrowed_at)?;
    println!(
        "{} borrow #{} user {} book {} at {}",
        "✓".green(),
        id,
        user,
        book,
        borrowed_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!("  ledger holds {} borrows", ledger.count()?);
    Ok(())
}

pub fn give_back(config_path: Option<&Path>, user: &str, book: &str) -> Result<()> {
    let config = config::load(config_path)?;
    let ledger = open_ledger(&config)?;

    if ledger.record_return(&UserId::new(user), &BookId::new(book), Utc::now())? {
        println!("{} returned book {} for user {}", "✓".green(), book, user);
    } else {
        println!(
            "{} no open borrow of book {} by user {}",
            "!".yellow(),
            book,
            user
        );
    }
    Ok(())
}

/// Accept RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC)
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid timestamp '{raw}', expected RFC 3339 or YYYY-MM-DD"))?;
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .with_context(|| format!("Invalid timestamp '{raw}'"))
}
