//! Internal implementation for config module
//!
//! Handles bookwise.toml - every section optional with defaults.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::{CandidateSettings, EngineSettings, HistorySettings, ScoringWeights};
use crate::paths;

// =============================================================================
// Config Types
// =============================================================================

/// Configuration stored in bookwise.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogSection,
    #[serde(default)]
    pub embeddings: EmbeddingsSection,
    #[serde(default)]
    pub ledger: LedgerSection,
    #[serde(default)]
    pub history: HistorySettings,
    #[serde(default)]
    pub candidates: CandidateSettings,
    #[serde(default)]
    pub scoring: ScoringWeights,
}

impl Config {
    /// Engine tunables drawn from this config
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            history: self.history.clone(),
            candidates: self.candidates.clone(),
            scoring: self.scoring.clone(),
        }
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.history.decay_days > 0.0) {
            bail!("history.decay_days must be positive, got {}", self.history.decay_days);
        }
        if !(self.scoring.popularity_cap > 0.0) {
            bail!(
                "scoring.popularity_cap must be positive, got {}",
                self.scoring.popularity_cap
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSection {
    /// Catalog table (CSV)
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

fn default_catalog_path() -> String {
    paths::catalog_csv().to_string_lossy().into_owned()
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

impl CatalogSection {
    pub fn resolved_path(&self) -> PathBuf {
        expand(&self.path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsSection {
    /// Latent-factor bundle (safetensors)
    #[serde(default = "default_vectors_path")]
    pub vectors_path: String,
    /// Id mapping document (JSON)
    #[serde(default = "default_mapping_path")]
    pub mapping_path: String,
}

fn default_vectors_path() -> String {
    paths::embedding_vectors().to_string_lossy().into_owned()
}
fn default_mapping_path() -> String {
    paths::embedding_mappings().to_string_lossy().into_owned()
}

impl Default for EmbeddingsSection {
    fn default() -> Self {
        Self {
            vectors_path: default_vectors_path(),
            mapping_path: default_mapping_path(),
        }
    }
}

impl EmbeddingsSection {
    pub fn resolved_vectors_path(&self) -> PathBuf {
        expand(&self.vectors_path)
    }

    pub fn resolved_mapping_path(&self) -> PathBuf {
        expand(&self.mapping_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSection {
    /// SQLite database holding borrow_records
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String {
    paths::ledger_db().to_string_lossy().into_owned()
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

impl LedgerSection {
    pub fn resolved_db_path(&self) -> PathBuf {
        expand(&self.db_path)
    }
}

/// Expand `~` and environment variables in a configured path
fn expand(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(path).as_ref()),
    }
}

// =============================================================================
// Load / Save
// =============================================================================

/// Parse config from TOML text
pub fn parse(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse config TOML")?;
    config.validate()?;
    Ok(config)
}

/// Load from an explicit file, which must exist
pub fn load_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    parse(&content).with_context(|| format!("Invalid config {}", path.display()))
}

/// Load from the first config found, or defaults when none exists.
///
/// Order: explicit path, `./bookwise.toml`, `~/.bookwise/config.toml`.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return load_file(path);
    }

    for candidate in [PathBuf::from(paths::CONFIG_FILE), paths::user_config_path()] {
        if candidate.exists() {
            tracing::debug!(path = %candidate.display(), "loading config");
            return load_file(&candidate);
        }
    }

    Ok(Config::default())
}

/// Write config as TOML
pub fn save(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
