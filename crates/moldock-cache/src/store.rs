//! On-disk score store.
//!
//! Document shape (JSON):
//! `{ "<target>": { "<smiles>": { "score": <number|null>, "timestamp": "<ISO-8601>", "computed": true, "source": "docked" }, ... }, ... }`
//!
//! There is no schema version field; documents written before the `source`
//! field existed still deserialize (it defaults to `docked`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where a cached score came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    /// Produced by the real docking backend.
    #[default]
    Docked,
    /// Deterministic substitute used when the backend was unavailable.
    Fallback,
}

/// One cached result for a (target, SMILES) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Binding affinity in kcal/mol; `None` marks an unscoreable entry.
    pub score: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub computed: bool,
    #[serde(default)]
    pub source: ScoreSource,
}

/// A freshly computed score about to be written.
#[derive(Debug, Clone, Copy)]
pub struct ScoredValue {
    pub score: f64,
    pub source: ScoreSource,
}

/// The whole persisted document: target → SMILES → record.
pub type CacheDocument = BTreeMap<String, BTreeMap<String, ScoreRecord>>;

/// Result of loading the persisted document.
///
/// High-level cache operations degrade `Corrupt` to an empty store; callers
/// that want to surface persistence problems can call
/// [`ScoreCache::load_document`] directly.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(CacheDocument),
    /// No file on disk yet.
    Empty,
    /// File exists but could not be read or parsed.
    Corrupt { reason: String },
}

/// Aggregate counts over the store.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total_targets: usize,
    pub total_molecules: usize,
    pub per_target: BTreeMap<String, usize>,
}

/// Durable key-value store for docking score records, partitioned by target.
///
/// Every write is a full read-modify-write of the document with no locking:
/// concurrent writers race and the last one wins at the document level. The
/// store assumes a single writer process.
pub struct ScoreCache {
    path: PathBuf,
}

impl ScoreCache {
    /// Create a cache backed by the given file. The file is created lazily on
    /// first write.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted document, reporting exactly what happened.
    pub fn load_document(&self) -> LoadOutcome {
        if !self.path.exists() {
            return LoadOutcome::Empty;
        }
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                return LoadOutcome::Corrupt {
                    reason: format!("read failed: {e}"),
                }
            }
        };
        match serde_json::from_str(&raw) {
            Ok(doc) => LoadOutcome::Loaded(doc),
            Err(e) => LoadOutcome::Corrupt {
                reason: format!("parse failed: {e}"),
            },
        }
    }

    /// Return the records present in `target`'s partition for the requested
    /// SMILES. Absent keys are omitted; a missing target, missing file or
    /// unreadable file all yield an empty map.
    pub fn get_existing(&self, target: &str, smiles: &[String]) -> BTreeMap<String, ScoreRecord> {
        let doc = self.document_or_empty();
        let Some(partition) = doc.get(target) else {
            return BTreeMap::new();
        };
        smiles
            .iter()
            .filter_map(|smi| partition.get(smi).map(|rec| (smi.clone(), rec.clone())))
            .collect()
    }

    /// Upsert freshly computed scores into `target`'s partition and persist.
    ///
    /// Each entry gets the current timestamp and `computed = true`. Later
    /// writes overwrite earlier records; no history is kept. Save failures
    /// are logged and swallowed.
    pub fn merge_write(&self, target: &str, new_results: &BTreeMap<String, ScoredValue>) {
        if new_results.is_empty() {
            return;
        }
        let mut doc = self.document_or_empty();
        let partition = doc.entry(target.to_string()).or_default();
        let now = Utc::now();
        for (smi, value) in new_results {
            partition.insert(
                smi.clone(),
                ScoreRecord {
                    score: Some(value.score),
                    timestamp: now,
                    computed: true,
                    source: value.source,
                },
            );
        }
        debug!(n_new = new_results.len(), "Merging scores into cache for {target}");
        self.save(&doc);
    }

    /// Fraction of the requested SMILES already present in `target`'s
    /// partition. An empty request yields 0.0.
    pub fn hit_rate(&self, target: &str, smiles: &[String]) -> f64 {
        if smiles.is_empty() {
            return 0.0;
        }
        let cached = self.get_existing(target, smiles);
        cached.len() as f64 / smiles.len() as f64
    }

    /// Aggregate counts, read-only.
    pub fn stats(&self) -> CacheStats {
        let doc = self.document_or_empty();
        let per_target: BTreeMap<String, usize> = doc
            .iter()
            .map(|(target, partition)| (target.clone(), partition.len()))
            .collect();
        CacheStats {
            total_targets: doc.len(),
            total_molecules: per_target.values().sum(),
            per_target,
        }
    }

    /// Delete one target partition, or the entire store if no target given.
    /// Clearing an absent target or an absent store is a silent no-op.
    pub fn clear(&self, target: Option<&str>) {
        match target {
            Some(target) => {
                let mut doc = self.document_or_empty();
                if doc.remove(target).is_some() {
                    info!("Cleared cache partition for {target}");
                    self.save(&doc);
                }
            }
            None => {
                if self.path.exists() {
                    if let Err(e) = fs::remove_file(&self.path) {
                        warn!(path = %self.path.display(), error = %e, "Failed to remove cache file");
                    } else {
                        info!(path = %self.path.display(), "Cleared entire cache");
                    }
                }
            }
        }
    }

    fn document_or_empty(&self) -> CacheDocument {
        match self.load_document() {
            LoadOutcome::Loaded(doc) => doc,
            LoadOutcome::Empty => CacheDocument::new(),
            LoadOutcome::Corrupt { reason } => {
                warn!(path = %self.path.display(), %reason, "Cache unreadable, starting cold");
                CacheDocument::new()
            }
        }
    }

    fn save(&self, doc: &CacheDocument) {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = fs::create_dir_all(parent) {
                    warn!(path = %parent.display(), error = %e, "Failed to create cache directory");
                    return;
                }
            }
        }
        let json = match serde_json::to_string_pretty(doc) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cache");
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, json) {
            warn!(path = %self.path.display(), error = %e, "Failed to save cache");
        }
    }
}
