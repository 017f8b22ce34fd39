//! Single source of truth for bookwise filesystem layout.
//!
//! This module defines WHERE data lives. It has no I/O, no validation,
//! no business logic.
//!
//! # User-Level Paths (~/.bookwise/)
//!
//! ```text
//! ~/.bookwise/
//! └── config.toml              # Fallback config
//! ```
//!
//! # Working-Directory Paths
//!
//! ```text
//! ./
//! ├── bookwise.toml            # Config (preferred)
//! └── data/
//!     ├── item.csv             # Catalog table
//!     ├── model.safetensors    # Latent factors
//!     ├── model_mappings.json  # Factor row -> id mapping
//!     └── library.db           # Borrow ledger (SQLite)
//! ```

use std::path::PathBuf;

/// Config file name looked up in the working directory
pub const CONFIG_FILE: &str = "bookwise.toml";

// =============================================================================
// User Level (~/.bookwise/)
// =============================================================================

/// User's bookwise home directory: `~/.bookwise/`
pub fn bookwise_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bookwise")
}

/// Fallback config file: `~/.bookwise/config.toml`
pub fn user_config_path() -> PathBuf {
    bookwise_home().join("config.toml")
}

// =============================================================================
// Data Layout (./data/)
// =============================================================================

/// Data directory: `data/`
pub fn data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Catalog table: `data/item.csv`
pub fn catalog_csv() -> PathBuf {
    data_dir().join("item.csv")
}

/// Latent-factor bundle: `data/model.safetensors`
pub fn embedding_vectors() -> PathBuf {
    data_dir().join("model.safetensors")
}

/// Latent-factor id mapping: `data/model_mappings.json`
pub fn embedding_mappings() -> PathBuf {
    data_dir().join("model_mappings.json")
}

/// Borrow ledger: `data/library.db`
pub fn ledger_db() -> PathBuf {
    data_dir().join("library.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_files_live_under_data_dir() {
        for path in [catalog_csv(), embedding_vectors(), embedding_mappings(), ledger_db()] {
            assert!(path.starts_with(data_dir()), "{} outside data/", path.display());
        }
    }

    #[test]
    fn test_user_config_under_home() {
        assert!(user_config_path().ends_with(".bookwise/config.toml"));
    }
}
