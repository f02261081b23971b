//! moldock-cache — Persisted docking score cache.
//!
//! A two-level map `target → (SMILES → score record)` stored as a single JSON
//! document on disk. Supports partial lookups, incremental merge-writes,
//! aggregate stats and per-target clearing.

pub mod store;

pub use store::{
    CacheDocument, CacheStats, LoadOutcome, ScoreCache, ScoreRecord, ScoreSource, ScoredValue,
};
