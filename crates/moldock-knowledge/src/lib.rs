//! moldock-knowledge — Docking score interpretation and target background.
//!
//! The knowledge base is an explicitly constructed, immutable value: build it
//! once (from a JSON file, or empty) and pass it to whichever component needs
//! it. There is no process-wide singleton. The base *content* — band
//! descriptions, target entries, process explanations — lives in a data file;
//! this crate only implements the lookup and interpretation layer.

use moldock_common::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Affinity band for a docking score, in kcal/mol.
///
/// More negative is stronger. The bands are advisory: the score cache never
/// enforces this range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreCategory {
    Excellent,
    Good,
    Moderate,
    Weak,
}

impl ScoreCategory {
    /// Classify a docking score.
    pub fn of(score: f64) -> Self {
        if score < -8.0 {
            ScoreCategory::Excellent
        } else if score < -6.0 {
            ScoreCategory::Good
        } else if score < -4.0 {
            ScoreCategory::Moderate
        } else {
            ScoreCategory::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreCategory::Excellent => "excellent",
            ScoreCategory::Good => "good",
            ScoreCategory::Moderate => "moderate",
            ScoreCategory::Weak => "weak",
        }
    }
}

/// Knowledge-base text for one affinity band.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBand {
    #[serde(default)]
    pub range: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recommendation: String,
}

/// Knowledge-base entry for one protein target.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub drug_examples: Vec<String>,
    #[serde(default)]
    pub binding_site: String,
    #[serde(default)]
    pub therapeutic_area: String,
}

/// Explanation of a scientific process (docking, virtual screening, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessInfo {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<String>,
}

/// Description of a molecular property (logP, TPSA, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyInfo {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ideal_range: String,
}

/// Interpretation of one docking score.
#[derive(Debug, Clone)]
pub struct ScoreInterpretation {
    pub score: f64,
    pub category: ScoreCategory,
    pub band: ScoreBand,
}

/// Resolved target information, always fully populated.
#[derive(Debug, Clone, Serialize)]
pub struct TargetInfo {
    pub target_id: String,
    pub name: String,
    pub description: String,
    pub drug_examples: Vec<String>,
    pub binding_site: String,
    pub therapeutic_area: String,
    pub has_known_drugs: bool,
}

/// Immutable domain knowledge lookup table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default)]
    docking_scores: BTreeMap<String, ScoreBand>,
    #[serde(default)]
    targets: BTreeMap<String, TargetEntry>,
    #[serde(default)]
    processes: BTreeMap<String, ProcessInfo>,
    #[serde(default)]
    molecular_properties: BTreeMap<String, PropertyInfo>,
}

impl KnowledgeBase {
    /// A knowledge base with no content. Interpretations still work, with
    /// empty band text.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the knowledge base from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Interpret one docking score against the band table.
    pub fn interpret_score(&self, score: f64) -> ScoreInterpretation {
        let category = ScoreCategory::of(score);
        let band = self
            .docking_scores
            .get(category.as_str())
            .cloned()
            .unwrap_or_default();
        ScoreInterpretation {
            score,
            category,
            band,
        }
    }

    /// Look up a protein target, falling back to an "unknown target" stub.
    pub fn target_info(&self, target_id: &str) -> TargetInfo {
        let entry = self.targets.get(target_id).cloned().unwrap_or(TargetEntry {
            name: format!("Unknown target {target_id}"),
            description: "No information available".to_string(),
            ..TargetEntry::default()
        });
        TargetInfo {
            target_id: target_id.to_string(),
            has_known_drugs: !entry.drug_examples.is_empty(),
            name: entry.name,
            description: entry.description,
            drug_examples: entry.drug_examples,
            binding_site: entry.binding_site,
            therapeutic_area: entry.therapeutic_area,
        }
    }

    /// Explanation for a named process, if the base knows it.
    pub fn explain_process(&self, process: &str) -> Option<&ProcessInfo> {
        self.processes.get(&process.to_lowercase())
    }

    /// Names of all processes the base can explain.
    pub fn available_processes(&self) -> Vec<&str> {
        self.processes.keys().map(|s| s.as_str()).collect()
    }

    /// Information about a molecular property, if the base knows it.
    pub fn property_info(&self, property: &str) -> Option<&PropertyInfo> {
        self.molecular_properties.get(&property.to_lowercase())
    }

    /// Names of all molecular properties the base describes.
    pub fn available_properties(&self) -> Vec<&str> {
        self.molecular_properties.keys().map(|s| s.as_str()).collect()
    }

    /// Summarise a batch of docking results into human-readable lines.
    pub fn analysis_insights(
        &self,
        results: &BTreeMap<String, Option<f64>>,
        target: Option<&str>,
    ) -> Vec<String> {
        if results.is_empty() {
            return vec!["No results to analyze".to_string()];
        }

        let valid: Vec<(&str, f64)> = results
            .iter()
            .filter_map(|(smi, score)| score.map(|s| (smi.as_str(), s)))
            .collect();
        if valid.is_empty() {
            return vec!["No valid scores found".to_string()];
        }

        let (mut best_mol, mut best) = valid[0];
        let mut worst = valid[0].1;
        let mut sum = 0.0;
        for &(smi, score) in &valid {
            if score < best {
                best = score;
                best_mol = smi;
            }
            worst = worst.max(score);
            sum += score;
        }
        let avg = sum / valid.len() as f64;
        let spread = worst - best;

        let mut insights = vec![
            format!("Best binding: {best_mol} ({best:.1} kcal/mol)"),
            format!("Average binding: {avg:.1} kcal/mol"),
            format!("Score range: {spread:.1} kcal/mol"),
        ];

        let mut bands: BTreeMap<&str, usize> = BTreeMap::new();
        for &(_, score) in &valid {
            *bands.entry(ScoreCategory::of(score).as_str()).or_default() += 1;
        }
        for (band, count) in &bands {
            insights.push(format!("{count} compound(s) show {band} binding"));
        }

        if let Some(target_id) = target {
            let info = self.target_info(target_id);
            if info.has_known_drugs {
                insights.push(format!(
                    "Target {}: known drugs {}",
                    info.name,
                    info.drug_examples.join(", ")
                ));
            }
        }

        if bands.contains_key("excellent") {
            insights.push("Focus on compounds with excellent binding for lead optimization".to_string());
        } else if bands.contains_key("good") {
            insights.push("Investigate compounds with good binding affinity".to_string());
        } else {
            insights.push("All compounds bind weakly; consider different scaffolds".to_string());
        }

        if spread > 2.0 {
            insights.push("Significant differences in binding affinity detected".to_string());
        } else {
            insights.push("Similar binding affinities across compounds".to_string());
        }

        insights
    }
}
