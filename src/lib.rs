pub mod artifact;
pub mod catalog;
pub mod config;
pub mod embedding;
pub mod engine;
pub mod ledger;
pub mod paths;

// Re-export commonly used types
pub use artifact::{ArtifactError, Availability};
pub use catalog::{BookFeature, BookId, FeatureCatalog, UserId};
pub use config::Config;
pub use embedding::EmbeddingStore;
pub use engine::{EngineCell, EngineSettings, Recommender, ScoredCandidate};
pub use ledger::{BorrowLedger, Interaction, MemoryLedger, SqliteLedger};
