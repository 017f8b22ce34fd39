//! Load-once artifacts with soft degradation
//!
//! Catalog tables and embedding bundles are produced outside this crate.
//! When one is absent or unreadable the affected subsystem is disabled
//! rather than failing startup. `Availability` carries that outcome
//! explicitly so callers branch on it instead of catching errors.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why an artifact could not be used
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArtifactError {
    /// File does not exist
    #[error("artifact not found: {}", path.display())]
    Missing { path: PathBuf },

    /// File exists but could not be parsed or failed validation
    #[error("malformed artifact {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

impl ArtifactError {
    pub fn missing(path: impl Into<PathBuf>) -> Self {
        Self::Missing { path: path.into() }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Path of the offending file
    pub fn path(&self) -> &Path {
        match self {
            Self::Missing { path } | Self::Malformed { path, .. } => path,
        }
    }
}

/// Outcome of loading an artifact: usable, or disabled with a reason
#[derive(Debug)]
pub enum Availability<T> {
    Loaded(T),
    Disabled(ArtifactError),
}

impl<T> Availability<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Disabled(_) => None,
        }
    }

    pub fn into_loaded(self) -> Option<T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Disabled(_) => None,
        }
    }

    pub fn disabled_reason(&self) -> Option<&ArtifactError> {
        match self {
            Self::Loaded(_) => None,
            Self::Disabled(reason) => Some(reason),
        }
    }
}

/// Load an artifact made of one or more co-located files.
///
/// Every path must exist before `parse` runs. A missing file or a parse
/// failure yields `Disabled`, logged once here with the artifact kind.
pub(crate) fn load_artifact<T>(
    kind: &str,
    paths: &[&Path],
    parse: impl FnOnce() -> anyhow::Result<T>,
) -> Availability<T> {
    if let Some(missing) = paths.iter().find(|p| !p.exists()) {
        let err = ArtifactError::missing(*missing);
        tracing::warn!(artifact = kind, "{err}; {kind} disabled");
        return Availability::Disabled(err);
    }

    match parse() {
        Ok(value) => Availability::Loaded(value),
        Err(e) => {
            // Attribute the failure to the first file; multi-file artifacts
            // name the actual file in the reason chain.
            let path = paths.first().map(|p| p.to_path_buf()).unwrap_or_default();
            let err = ArtifactError::malformed(path, format!("{e:#}"));
            tracing::warn!(artifact = kind, "{err}; {kind} disabled");
            Availability::Disabled(err)
        }
    }
}
