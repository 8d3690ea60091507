//! # tablesim
//!
//! A two-phase similarity engine that finds tables (and the columns within
//! them) describing the same real-world entity across a catalog.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                TableInfo / ColumnInfo                    │
//! │   (metadata, sampled values, infotype proposals)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [feature extraction]
//! ┌─────────────────────────────────────────────────────────┐
//! │         TableFeatures / ColumnFeatures                   │
//! │   (name tokens, datatype class, value summary, vectors)  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [pruning pass: cheap, every pair]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Pruning scorer (names, platform, column-set overlap)   │
//! └─────────────────────────────────────────────────────────┘
//!                          │  score > pruning threshold
//!                          ▼ [detailed pass: survivors only]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Column scorer + greedy matcher + aggregation           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │   SimilarityResult + column pair results                 │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine itself never labels anything: it returns continuous scores and
//! callers apply [`Thresholds`] to get `similar` / `not_similar` verdicts.

pub mod config;
pub mod driver;
pub mod error;
pub mod metadata;
pub mod similarity;
pub mod synth;

pub use error::{ConfigError, EmbeddingError, MetadataError};
pub use metadata::{ColumnInfo, ColumnMetadata, DatatypeClass, TableInfo, TableMetadata};
pub use similarity::{
    check_similarity, check_similarity_with, CheckOptions, ColumnPairKey, ColumnResults,
    ColumnSimilarityResult, SimilarityConfig, SimilarityEngine, SimilarityLabel, SimilarityResult,
    Thresholds,
};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::driver::{BatchReport, PairState, SimilarityDriver, TablePairKey};
    pub use crate::metadata::{
        ColumnInfo, ColumnMetadata, DatatypeClass, InfotypeProposal, TableInfo, TableMetadata,
    };
    pub use crate::similarity::{
        check_similarity, check_similarity_with, CheckOptions, ColumnPairKey, ColumnResults,
        ColumnSimilarityResult, ComparisonMode, SimilarityConfig, SimilarityEngine,
        SimilarityLabel, SimilarityResult, Thresholds,
    };
}
