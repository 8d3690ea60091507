//! Table and column similarity scoring.
//!
//! This module provides:
//! - Feature extraction for columns and tables
//! - A static registry of weighted signals for columns and for pruning
//! - The column scorer, the greedy column matcher and the pruning scorer
//! - [`SimilarityEngine`], which runs either pass over a pair of tables
//!
//! Every signal reports a [`SignalOutcome`]: a score in [0, 1] or a skip
//! with a reason. Skipped signals drop out of the weighted blend.

pub mod aggregator;
pub mod column;
pub mod embedding;
pub mod engine;
pub mod features;
pub mod matcher;
pub mod pruning;
pub mod registry;
pub mod signals;
pub mod text;
pub mod values;

pub use column::ColumnContext;
pub use embedding::{cosine_similarity, EmbeddingIndex, EmbeddingInput, EmbeddingProvider, StaticEmbeddings};
pub use engine::{
    check_similarity, check_similarity_with, CheckOptions, ColumnResults, ColumnSimilarityResult,
    ComparisonMode, SimilarityConfig, SimilarityEngine, SimilarityLabel, SimilarityResult, Thresholds,
};
pub use features::{ColumnFeatures, TableFeatures};
pub use matcher::{greedy_match, ColumnMatch, ColumnMatching, ColumnPairKey};
pub use registry::{default_column_weights, default_pruning_weights};
pub use signals::{SignalEvidence, SignalOutcome};
pub use values::ValueSummary;

/// Default cut points.
pub mod thresholds {
    /// Column pairs scoring at or above this are similar.
    pub const COLUMN_SIMILARITY_THRESHOLD: f64 = 0.8;

    /// Table pairs must score above this in the pruning pass to be compared in detail.
    pub const PRUNING_THRESHOLD: f64 = 0.8;

    /// Detailed scores above this are similar.
    pub const FINAL_THRESHOLD: f64 = 0.6;
}
