pub mod batch;
pub mod config;
pub mod explain;
pub mod ledger;
pub mod popular;
pub mod recommend;
pub mod shelf;
pub mod status;

use anyhow::{Context, Result};
use bookwise::catalog::{BookId, FeatureCatalog};
use bookwise::config::Config;
use bookwise::ledger::SqliteLedger;
use bookwise::Recommender;
use colored::*;
use std::path::Path;
use std::sync::Arc;

/// Load config, open the ledger and build a warmed engine
pub fn open_engine(config_path: Option<&Path>) -> Result<Recommender> {
    let config = bookwise::config::load(config_path)?;
    let ledger = open_ledger(&config)?;
    let engine = Recommender::load(&config, Arc::new(ledger));
    engine
        .warm_popularity()
        .context("Failed to read borrow ledger")?;
    Ok(engine)
}

pub fn open_ledger(config: &Config) -> Result<SqliteLedger> {
    let path = config.ledger.resolved_db_path();
    SqliteLedger::open(&path)
        .with_context(|| format!("Failed to open ledger {}", path.display()))
}

/// One display line for a book: title and author when the catalog knows it
pub fn describe(catalog: &FeatureCatalog, book: &BookId) -> String {
    match catalog.get(book) {
        Some(feature) => match &feature.author {
            Some(author) => format!("{} {}", feature.title, format!("({author})").dimmed()),
            None => feature.title.clone(),
        },
        None => "(not in catalog)".dimmed().to_string(),
    }
}
