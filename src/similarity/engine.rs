//! The similarity orchestrator.
//!
//! [`SimilarityEngine`] runs either the pruning scorer alone or the whole
//! detailed pipeline (pruning, column scoring, greedy matching and
//! aggregation) over a pair of tables. It always returns a continuous
//! score; turning that into a verdict is done by the caller with
//! [`Thresholds`].
//!
//! # Example
//!
//! ```
//! use tablesim::prelude::*;
//!
//! let engine = SimilarityEngine::new(SimilarityConfig::default()).unwrap();
//!
//! let orders = TableInfo::new(
//!     TableMetadata::new("orders", "", "warehouse", "orders"),
//!     vec![ColumnInfo::new(ColumnMetadata::for_table("orders", "order_id", "", "int64"))],
//! )
//! .unwrap();
//! let copy = TableInfo::new(
//!     TableMetadata::new("orders_v2", "", "warehouse", "orders_v2"),
//!     vec![ColumnInfo::new(ColumnMetadata::for_table("orders_v2", "order_id", "", "bigint"))],
//! )
//! .unwrap();
//!
//! let (result, columns) = engine.check_similarity(&orders, &copy, CheckOptions::detailed(false));
//! assert_eq!(result.mode, ComparisonMode::Detailed);
//! assert_eq!(columns.len(), 1);
//! assert!(engine.thresholds().final_label(result.score).is_similar());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::metadata::TableInfo;

use super::column::{score_columns, ColumnContext};
use super::embedding::EmbeddingIndex;
use super::features::TableFeatures;
use super::matcher::{greedy_match, ColumnPairKey};
use super::pruning::score_tables;
use super::registry::{
    default_column_weights, default_pruning_weights, ColumnRegistry, PruningRegistry,
};
use super::signals::SignalEvidence;
use super::thresholds::{COLUMN_SIMILARITY_THRESHOLD, FINAL_THRESHOLD, PRUNING_THRESHOLD};

/// Binary verdict derived from a score and a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityLabel {
    Similar,
    NotSimilar,
}

impl SimilarityLabel {
    pub fn is_similar(self) -> bool {
        self == Self::Similar
    }
}

impl fmt::Display for SimilarityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Similar => "similar",
            Self::NotSimilar => "not_similar",
        })
    }
}

/// The three independent cut points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Column pairs at or above this are similar.
    pub column: f64,
    /// Table pairs above this survive pruning.
    pub pruning: f64,
    /// Detailed scores above this are similar.
    #[serde(rename = "final")]
    pub final_: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            column: COLUMN_SIMILARITY_THRESHOLD,
            pruning: PRUNING_THRESHOLD,
            final_: FINAL_THRESHOLD,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in [
            ("column", self.column),
            ("pruning", self.pruning),
            ("final", self.final_),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }
        Ok(())
    }

    /// Inclusive: a score equal to the threshold is similar. `None` never is.
    pub fn column_label(&self, score: Option<f64>) -> SimilarityLabel {
        match score {
            Some(score) if score >= self.column => SimilarityLabel::Similar,
            _ => SimilarityLabel::NotSimilar,
        }
    }

    /// Exclusive: a pair at exactly the threshold is pruned out.
    pub fn pruning_label(&self, score: f64) -> SimilarityLabel {
        exclusive(score, self.pruning)
    }

    /// Exclusive, like [`Thresholds::pruning_label`].
    pub fn final_label(&self, score: f64) -> SimilarityLabel {
        exclusive(score, self.final_)
    }
}

fn exclusive(score: f64, threshold: f64) -> SimilarityLabel {
    if score > threshold {
        SimilarityLabel::Similar
    } else {
        SimilarityLabel::NotSimilar
    }
}

/// Which pipeline produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    Pruning,
    Detailed,
}

/// Per-call switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOptions {
    pub pruning_mode: bool,
    /// Only consulted in detailed mode.
    pub use_embeddings: bool,
}

impl CheckOptions {
    pub fn pruning() -> Self {
        Self {
            pruning_mode: true,
            use_embeddings: false,
        }
    }

    pub fn detailed(use_embeddings: bool) -> Self {
        Self {
            pruning_mode: false,
            use_embeddings,
        }
    }

    pub fn mode(&self) -> ComparisonMode {
        if self.pruning_mode {
            ComparisonMode::Pruning
        } else {
            ComparisonMode::Detailed
        }
    }
}

/// Engine configuration: thresholds, default switches and signal weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityConfig {
    pub thresholds: Thresholds,
    pub pruning_mode: bool,
    pub use_embeddings: bool,
    /// Weight per column signal name.
    pub column_weights: BTreeMap<String, f64>,
    /// Weight per pruning signal name.
    pub pruning_weights: BTreeMap<String, f64>,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            pruning_mode: true,
            use_embeddings: false,
            column_weights: default_column_weights(),
            pruning_weights: default_pruning_weights(),
        }
    }
}

impl SimilarityConfig {
    /// Check thresholds and both weight tables.
    pub fn validate(&self) -> ConfigResult<()> {
        self.thresholds.validate()?;
        ColumnRegistry::columns(&self.column_weights)?;
        PruningRegistry::pruning(&self.pruning_weights)?;
        Ok(())
    }

    /// The configured default switches.
    pub fn options(&self) -> CheckOptions {
        CheckOptions {
            pruning_mode: self.pruning_mode,
            use_embeddings: self.use_embeddings,
        }
    }
}

/// Score of one column pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSimilarityResult {
    pub column_a: String,
    pub column_b: String,
    /// `None` when the columns are incomparable.
    pub score: Option<f64>,
    pub evidence: Vec<SignalEvidence>,
}

impl ColumnSimilarityResult {
    /// Inclusive threshold; an incomparable pair is never similar.
    pub fn label(&self, threshold: f64) -> SimilarityLabel {
        match self.score {
            Some(score) if score >= threshold => SimilarityLabel::Similar,
            _ => SimilarityLabel::NotSimilar,
        }
    }
}

pub type ColumnResults = BTreeMap<ColumnPairKey, ColumnSimilarityResult>;

/// Table-level outcome of one comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResult {
    pub table_a: String,
    pub table_b: String,
    pub mode: ComparisonMode,
    /// Pruning score in pruning mode, aggregated column score in detailed mode.
    pub score: f64,
    pub pruning_score: f64,
    /// Breakdown of the pruning score.
    pub evidence: Vec<SignalEvidence>,
    pub matched_columns: Vec<ColumnPairKey>,
    pub unmatched_a: Vec<String>,
    pub unmatched_b: Vec<String>,
    /// Why a minimal score was returned without scoring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SimilarityResult {
    /// Label against the threshold of the mode that produced this result.
    pub fn label(&self, thresholds: &Thresholds) -> SimilarityLabel {
        match self.mode {
            ComparisonMode::Pruning => thresholds.pruning_label(self.score),
            ComparisonMode::Detailed => thresholds.final_label(self.score),
        }
    }
}

/// Validated configuration with its signal registries.
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    config: SimilarityConfig,
    columns: ColumnRegistry,
    pruning: PruningRegistry,
}

impl SimilarityEngine {
    /// Validate `config` and build the registries.
    pub fn new(config: SimilarityConfig) -> ConfigResult<Self> {
        config.thresholds.validate()?;
        let columns = ColumnRegistry::columns(&config.column_weights)?;
        let pruning = PruningRegistry::pruning(&config.pruning_weights)?;
        Ok(Self {
            config,
            columns,
            pruning,
        })
    }

    pub fn config(&self) -> &SimilarityConfig {
        &self.config
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.config.thresholds
    }

    /// Compare two tables.
    pub fn check_similarity(
        &self,
        a: &TableInfo,
        b: &TableInfo,
        options: CheckOptions,
    ) -> (SimilarityResult, ColumnResults) {
        self.check_similarity_with(a, b, options, None)
    }

    /// Compare two tables, attaching column vectors from `embeddings`.
    pub fn check_similarity_with(
        &self,
        a: &TableInfo,
        b: &TableInfo,
        options: CheckOptions,
        embeddings: Option<&EmbeddingIndex>,
    ) -> (SimilarityResult, ColumnResults) {
        let embeddings = embeddings.filter(|_| options.use_embeddings && !options.pruning_mode);
        let fa = TableFeatures::extract(a, embeddings);
        let fb = TableFeatures::extract(b, embeddings);
        self.compare_features(&fa, &fb, options)
    }

    /// Compare two tables from features extracted beforehand.
    pub fn compare_features(
        &self,
        a: &TableFeatures,
        b: &TableFeatures,
        options: CheckOptions,
    ) -> (SimilarityResult, ColumnResults) {
        let mode = options.mode();
        let mut result = SimilarityResult {
            table_a: a.table_id.clone(),
            table_b: b.table_id.clone(),
            mode,
            score: 0.0,
            pruning_score: 0.0,
            evidence: Vec::new(),
            matched_columns: Vec::new(),
            unmatched_a: Vec::new(),
            unmatched_b: Vec::new(),
            note: None,
        };

        if a.column_count() == 0 || b.column_count() == 0 {
            warn!(
                table_a = %a.table_id,
                table_b = %b.table_id,
                "table without columns, scoring pair as 0"
            );
            result.note = Some("table has no columns".to_string());
            return (result, ColumnResults::new());
        }

        let pruning = score_tables(&self.pruning, a, b);
        result.pruning_score = pruning.score;
        result.evidence = pruning.evidence;
        result.note = pruning.note;

        if options.pruning_mode {
            result.score = pruning.score;
            debug!(
                table_a = %a.table_id,
                table_b = %b.table_id,
                score = result.score,
                "pruning score"
            );
            return (result, ColumnResults::new());
        }

        let ctx = ColumnContext {
            use_embeddings: options.use_embeddings,
        };
        let mut scored = BTreeMap::new();
        let ids_a: Vec<&str> = a.columns.iter().map(|c| c.column_id.as_str()).collect();
        let ids_b: Vec<&str> = b.columns.iter().map(|c| c.column_id.as_str()).collect();
        let matching = greedy_match(&ids_a, &ids_b, |i, j| {
            let column = score_columns(&self.columns, &a.columns[i], &b.columns[j], &ctx);
            let score = column.score;
            scored.insert((i, j), column);
            score
        });

        let mut columns = ColumnResults::new();
        let mut total = 0.0;
        for pair in &matching.pairs {
            total += pair.score.unwrap_or(0.0);
            let key = ColumnPairKey::new(ids_a[pair.index_a], ids_b[pair.index_b]);
            let evidence = scored
                .remove(&(pair.index_a, pair.index_b))
                .map(|c| c.evidence)
                .unwrap_or_default();
            result.matched_columns.push(key.clone());
            columns.insert(
                key,
                ColumnSimilarityResult {
                    column_a: ids_a[pair.index_a].to_string(),
                    column_b: ids_b[pair.index_b].to_string(),
                    score: pair.score,
                    evidence,
                },
            );
        }

        result.score = if matching.pairs.is_empty() {
            0.0
        } else {
            (total / matching.pairs.len() as f64).clamp(0.0, 1.0)
        };
        result.unmatched_a = matching
            .unmatched_a
            .iter()
            .map(|&i| ids_a[i].to_string())
            .collect();
        result.unmatched_b = matching
            .unmatched_b
            .iter()
            .map(|&j| ids_b[j].to_string())
            .collect();

        debug!(
            table_a = %a.table_id,
            table_b = %b.table_id,
            score = result.score,
            pruning_score = result.pruning_score,
            matched = matching.pairs.len(),
            "detailed score"
        );
        (result, columns)
    }
}

/// Validate `config`, then compare `a` and `b` once.
///
/// No vectors are available here, so `use_embeddings` leaves the score
/// unchanged; pass an index to [`check_similarity_with`] for that.
/// Prefer building a [`SimilarityEngine`] when comparing many pairs; this
/// rebuilds the registries on every call.
pub fn check_similarity(
    a: &TableInfo,
    b: &TableInfo,
    pruning_mode: bool,
    use_embeddings: bool,
    config: &SimilarityConfig,
) -> ConfigResult<(SimilarityResult, ColumnResults)> {
    check_similarity_with(a, b, pruning_mode, use_embeddings, config, None)
}

/// Like [`check_similarity`], reading column vectors from `embeddings`.
pub fn check_similarity_with(
    a: &TableInfo,
    b: &TableInfo,
    pruning_mode: bool,
    use_embeddings: bool,
    config: &SimilarityConfig,
    embeddings: Option<&EmbeddingIndex>,
) -> ConfigResult<(SimilarityResult, ColumnResults)> {
    let engine = SimilarityEngine::new(config.clone())?;
    Ok(engine.check_similarity_with(
        a,
        b,
        CheckOptions {
            pruning_mode,
            use_embeddings,
        },
        embeddings,
    ))
}
