//! Engine module - hybrid next-book recommendation
//!
//! Public interface:
//! - `Recommender` context: history, candidates, scoring, selection
//! - `EngineCell` for once-only initialization at startup
//! - `EngineSettings` and the per-stage settings it groups
//! - `Shelf` for the "N books around one pick" view
//!
//! Request flow: ledger -> `build_history` (decay + preferences) ->
//! candidate sources (history, same author, latent) -> `Scorer` ->
//! `selector::rank`, or `selector::cold_start` without history.
//!
//! Internal (not exported):
//! - `CandidateSource` trait and its implementations
//! - `Scorer`

mod candidates;
mod cell;
pub mod history;
mod popularity;
mod recommender;
mod scorer;
pub mod selector;
mod shelf;

pub use candidates::{CandidateSet, CandidateSettings};
pub use cell::EngineCell;
pub use history::{
    build_history, DecayReference, HistorySettings, PreferenceAccumulator, UserHistory,
    WeightedHistoryEntry,
};
pub use popularity::{BorrowCounts, PopularityCounters};
pub use recommender::{EngineSettings, EngineStatus, Recommender};
pub use scorer::{sigmoid, ScoreBreakdown, ScoredCandidate, ScoringWeights};
pub use shelf::Shelf;
