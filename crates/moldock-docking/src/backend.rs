//! Scoring backend abstraction and the AutoDock Vina process backend.

use moldock_common::{MoldockError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// A scoring engine bound to one target.
pub trait TargetHandle: std::fmt::Debug {
    /// Dock one molecule and return its best binding affinity in kcal/mol.
    fn score(&self, smiles: &str) -> Result<f64>;
}

/// Factory for target-bound scoring handles.
///
/// Both seams are fallible and tolerated independently by the caller:
/// a `load` failure degrades a whole batch to fallback scoring, a `score`
/// failure degrades only that molecule.
pub trait ScoringBackend {
    fn load(&self, target: &str) -> Result<Box<dyn TargetHandle>>;
}

/// Backend shelling out to an AutoDock-Vina-style CLI.
///
/// Expects a wrapper executable that accepts `--receptor <file> --smiles
/// <string>` and prints the best affinity on the first non-empty line of
/// stdout. Receptors live as `<target>.pdbqt` files under `receptor_dir`.
pub struct VinaBackend {
    executable: PathBuf,
    receptor_dir: PathBuf,
}

impl VinaBackend {
    /// Create a new VinaBackend.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(executable: P, receptor_dir: Q) -> Self {
        Self {
            executable: executable.as_ref().to_path_buf(),
            receptor_dir: receptor_dir.as_ref().to_path_buf(),
        }
    }
}

impl ScoringBackend for VinaBackend {
    fn load(&self, target: &str) -> Result<Box<dyn TargetHandle>> {
        let receptor = self.receptor_dir.join(format!("{target}.pdbqt"));
        if !receptor.exists() {
            return Err(MoldockError::Backend(format!(
                "no receptor file for target {target} at {}",
                receptor.display()
            )));
        }
        info!(receptor = %receptor.display(), "Loaded docking target {target}");
        Ok(Box::new(VinaTarget {
            executable: self.executable.clone(),
            receptor,
        }))
    }
}

#[derive(Debug)]
struct VinaTarget {
    executable: PathBuf,
    receptor: PathBuf,
}

impl TargetHandle for VinaTarget {
    fn score(&self, smiles: &str) -> Result<f64> {
        debug!(smiles = %smiles, receptor = %self.receptor.display(), "Running docking");

        let output = Command::new(&self.executable)
            .arg("--receptor")
            .arg(&self.receptor)
            .arg("--smiles")
            .arg(smiles)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MoldockError::Backend(format!(
                "docking process failed: {stderr}"
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .ok_or_else(|| MoldockError::Backend("empty docking output".to_string()))?;

        line.parse::<f64>()
            .map_err(|e| MoldockError::Backend(format!("unparseable affinity {line:?}: {e}")))
    }
}
