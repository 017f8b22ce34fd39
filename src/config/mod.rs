//! Config module - bookwise.toml
//!
//! Artifact locations and engine tunables. Every section and field is
//! optional; a missing file means all defaults. Defaults reproduce the
//! fixed scoring constants.
//!
//! # Example
//!
//! ```toml
//! [catalog]
//! path = "data/item.csv"
//!
//! [embeddings]
//! vectors_path = "data/model.safetensors"
//! mapping_path = "data/model_mappings.json"
//!
//! [history]
//! decay_days = 120.0
//! decay_reference = "last_interaction"   # or "now"
//!
//! [candidates]
//! max_candidates = 100
//! ```

mod internal;

use anyhow::Result;
use std::path::Path;

pub use internal::{CatalogSection, Config, EmbeddingsSection, LedgerSection};

/// Load config: explicit path, then `./bookwise.toml`, then
/// `~/.bookwise/config.toml`, then defaults.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    internal::load(explicit)
}

/// Parse config from TOML text
pub fn parse(content: &str) -> Result<Config> {
    internal::parse(content)
}

/// Save config as TOML, creating parent directories
pub fn save(path: &Path, config: &Config) -> Result<()> {
    internal::save(path, config)
}
