//! Batch score orchestration: cache check, validation, docking, write-back.

use moldock_cache::{CacheStats, ScoreCache, ScoreSource, ScoredValue};
use moldock_common::is_valid_smiles;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::backend::{ScoringBackend, TargetHandle};
use crate::fallback::fallback_score;

/// Produces a complete `SMILES → score` mapping for a batch against one
/// target, computing only what the cache does not already hold.
///
/// Synchronous and single-threaded; a hanging backend call blocks the whole
/// batch, so callers wanting bounded latency must wrap `compute_scores` in
/// their own timeout.
pub struct ScoreComputer {
    cache: ScoreCache,
    backend: Option<Box<dyn ScoringBackend>>,
}

impl ScoreComputer {
    /// Create a computer over the given cache. With no backend configured,
    /// every fresh score comes from the deterministic fallback.
    pub fn new(cache: ScoreCache, backend: Option<Box<dyn ScoringBackend>>) -> Self {
        Self { cache, backend }
    }

    /// Score a batch of SMILES against `target`.
    ///
    /// The result holds exactly one entry per unique input key: cached hits,
    /// freshly docked (or fallback) scores, and `None` for syntactically
    /// invalid SMILES. Invalid keys are never forwarded to the backend and
    /// never cached. Newly computed scores are persisted in a single
    /// merge-write at the end; a batch of pure cache hits writes nothing.
    pub fn compute_scores(&self, smiles: &[String], target: &str) -> BTreeMap<String, Option<f64>> {
        let mut results = BTreeMap::new();
        if smiles.is_empty() {
            return results;
        }

        let mut unique: Vec<String> = Vec::with_capacity(smiles.len());
        for smi in smiles {
            if !unique.contains(smi) {
                unique.push(smi.clone());
            }
        }

        let cached = self.cache.get_existing(target, &unique);
        let mut fresh: BTreeMap<String, ScoredValue> = BTreeMap::new();
        // Target binding happens at most once per batch, and only if some
        // key actually needs computing.
        let mut handle: Option<Box<dyn TargetHandle>> = None;
        let mut binding_attempted = false;

        for smi in &unique {
            if let Some(record) = cached.get(smi) {
                debug!(smiles = %smi, score = ?record.score, "Cache hit for {target}");
                results.insert(smi.clone(), record.score);
                continue;
            }

            if !is_valid_smiles(smi) {
                warn!(smiles = %smi, "Invalid SMILES, not scoreable");
                results.insert(smi.clone(), None);
                continue;
            }

            if !binding_attempted {
                binding_attempted = true;
                handle = self.bind_target(target);
            }

            let (score, source) = match handle.as_deref() {
                Some(handle) => match handle.score(smi) {
                    Ok(score) => (score, ScoreSource::Docked),
                    Err(e) => {
                        warn!(smiles = %smi, error = %e, "Docking failed for {target}, using fallback score");
                        (fallback_score(smi), ScoreSource::Fallback)
                    }
                },
                None => (fallback_score(smi), ScoreSource::Fallback),
            };

            results.insert(smi.clone(), Some(score));
            fresh.insert(smi.clone(), ScoredValue { score, source });
        }

        if !fresh.is_empty() {
            self.cache.merge_write(target, &fresh);
        }

        results
    }

    /// Aggregate cache counts.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop one target partition, or the whole cache.
    pub fn clear(&self, target: Option<&str>) {
        self.cache.clear(target);
    }

    fn bind_target(&self, target: &str) -> Option<Box<dyn TargetHandle>> {
        let backend = match &self.backend {
            Some(backend) => backend,
            None => {
                debug!("No docking backend configured, using fallback scores for {target}");
                return None;
            }
        };
        match backend.load(target) {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "Failed to load target {target}, whole batch falls back");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    /// Backend returning a fixed score, counting every docking call.
    pub(crate) struct FixedBackend {
        pub score: f64,
        pub fail_load: bool,
        pub score_calls: Arc<AtomicUsize>,
    }

    impl FixedBackend {
        pub fn new(score: f64) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    score,
                    fail_load: false,
                    score_calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[derive(Debug)]
    struct FixedHandle {
        score: f64,
        score_calls: Arc<AtomicUsize>,
    }

    impl ScoringBackend for FixedBackend {
        fn load(&self, target: &str) -> moldock_common::Result<Box<dyn TargetHandle>> {
            if self.fail_load {
                return Err(moldock_common::MoldockError::Backend(format!(
                    "unknown target {target}"
                )));
            }
            Ok(Box::new(FixedHandle {
                score: self.score,
                score_calls: self.score_calls.clone(),
            }))
        }
    }

    impl TargetHandle for FixedHandle {
        fn score(&self, _smiles: &str) -> moldock_common::Result<f64> {
            self.score_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.score)
        }
    }

    fn keys(smiles: &[&str]) -> Vec<String> {
        smiles.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_batch_no_cache_no_write() {
        let dir = tempdir().unwrap();
        let cache = ScoreCache::new(dir.path().join("scores.json"));
        let computer = ScoreComputer::new(cache, None);

        let results = computer.compute_scores(&[], "F2");
        assert!(results.is_empty());
        assert!(!dir.path().join("scores.json").exists());
    }

    #[test]
    fn test_invalid_smiles_resolves_to_none_and_writes_nothing() {
        let dir = tempdir().unwrap();
        let cache = ScoreCache::new(dir.path().join("scores.json"));
        let computer = ScoreComputer::new(cache, None);

        let results = computer.compute_scores(&keys(&["not-a-valid-key"]), "TGT1");
        assert_eq!(results.len(), 1);
        assert_eq!(results["not-a-valid-key"], None);
        assert!(!dir.path().join("scores.json").exists());
    }

    #[test]
    fn test_mixed_validity_caches_only_valid_keys() {
        let dir = tempdir().unwrap();
        let cache = ScoreCache::new(dir.path().join("scores.json"));
        let computer = ScoreComputer::new(cache, None);

        let results = computer.compute_scores(&keys(&["CCO", "not-a-valid-key", "CCN"]), "TGT1");
        assert_eq!(results.len(), 3);
        assert!(results["CCO"].is_some());
        assert!(results["CCN"].is_some());
        assert_eq!(results["not-a-valid-key"], None);

        assert_eq!(computer.stats().per_target["TGT1"], 2);
    }

    #[test]
    fn test_duplicates_collapse_to_one_entry() {
        let dir = tempdir().unwrap();
        let cache = ScoreCache::new(dir.path().join("scores.json"));
        let (backend, calls) = FixedBackend::new(-8.5);
        let computer = ScoreComputer::new(cache, Some(Box::new(backend)));

        let results = computer.compute_scores(&keys(&["CCO", "CCO", "CCN"]), "F2");
        assert_eq!(results.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(computer.stats().per_target["F2"], 2);
    }

    #[test]
    fn test_load_failure_degrades_whole_batch_to_fallback() {
        let dir = tempdir().unwrap();
        let cache = ScoreCache::new(dir.path().join("scores.json"));
        let (mut backend, calls) = FixedBackend::new(-8.5);
        backend.fail_load = true;
        let computer = ScoreComputer::new(cache, Some(Box::new(backend)));

        let results = computer.compute_scores(&keys(&["CCO", "CCN"]), "NOPE");
        assert_eq!(results["CCO"], Some(fallback_score("CCO")));
        assert_eq!(results["CCN"], Some(fallback_score("CCN")));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_per_key_failure_falls_back_for_that_key_only() {
        struct FlakyBackend;
        #[derive(Debug)]
        struct FlakyHandle;
        impl ScoringBackend for FlakyBackend {
            fn load(&self, _target: &str) -> moldock_common::Result<Box<dyn TargetHandle>> {
                Ok(Box::new(FlakyHandle))
            }
        }
        impl TargetHandle for FlakyHandle {
            fn score(&self, smiles: &str) -> moldock_common::Result<f64> {
                if smiles == "CCN" {
                    return Err(moldock_common::MoldockError::Backend(
                        "pose search did not converge".to_string(),
                    ));
                }
                Ok(-8.5)
            }
        }

        let dir = tempdir().unwrap();
        let cache = ScoreCache::new(dir.path().join("scores.json"));
        let computer = ScoreComputer::new(cache, Some(Box::new(FlakyBackend)));

        let results = computer.compute_scores(&keys(&["CCO", "CCN"]), "F2");
        assert_eq!(results["CCO"], Some(-8.5));
        assert_eq!(results["CCN"], Some(fallback_score("CCN")));
    }
}
