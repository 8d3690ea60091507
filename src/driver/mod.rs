//! Batch driver for many table pairs.
//!
//! The driver owns the two-pass pipeline:
//! 1. Extract features once per table (parallel)
//! 2. Prune every pair (parallel)
//! 3. Wait for all pruning results, fix the candidate set
//! 4. Score candidates in detail (parallel)
//!
//! Pairs are independent, so both sweeps are plain `rayon` maps. Results
//! are collected into a [`BatchReport`] returned to the caller.

mod pair;
mod report;
mod sweep;

pub use pair::{PairState, TablePairKey};
pub use report::{BatchReport, PairVerdict};
pub use sweep::SimilarityDriver;
