//! moldock-docking — Docking score computation with cache orchestration.
//!
//! The flow for a batch of SMILES against one target:
//! 1. Resolve cache hits from [`moldock_cache::ScoreCache`]
//! 2. Validate the remaining SMILES; invalid ones resolve to `None`
//! 3. Dock the valid remainder via a [`ScoringBackend`], or substitute the
//!    deterministic fallback score when the backend is unavailable or fails
//! 4. Persist all freshly computed scores in one merge-write

pub mod backend;
pub mod computer;
pub mod fallback;

pub use backend::{ScoringBackend, TargetHandle, VinaBackend};
pub use computer::ScoreComputer;
pub use fallback::fallback_score;
