//! Cheap table-level scoring used to discard unrelated pairs early.
//!
//! Pruning never looks at column pairs. It compares table names,
//! descriptions, platforms, column counts, the vocabulary of column names
//! and the datatype mix, all of which are linear in the column count.

use std::collections::BTreeMap;

use crate::metadata::DatatypeClass;

use super::features::TableFeatures;
use super::registry::PruningRegistry;
use super::signals::{SignalEvidence, SignalOutcome};
use super::text::{jaccard, overlap_coefficient, text_similarity};

pub const TABLE_NAME: &str = "table_name";
pub const TABLE_DESCRIPTION: &str = "table_description";
pub const PLATFORM: &str = "platform";
pub const COLUMN_COUNT: &str = "column_count";
pub const COLUMN_NAMES: &str = "column_names";
pub const COLUMN_TYPES: &str = "column_types";

/// Table-level score with its breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct PruningScore {
    pub score: f64,
    pub evidence: Vec<SignalEvidence>,
    /// Set when the score was forced rather than computed.
    pub note: Option<String>,
}

/// Score a table pair from table-level features only.
///
/// A table without columns has nothing to compare and scores 0.0.
pub fn score_tables(registry: &PruningRegistry, a: &TableFeatures, b: &TableFeatures) -> PruningScore {
    if a.column_count() == 0 || b.column_count() == 0 {
        return PruningScore {
            score: 0.0,
            evidence: Vec::new(),
            note: Some("table has no columns".to_string()),
        };
    }

    let blend = registry.evaluate(|eval| eval(a, b));
    PruningScore {
        score: blend.score.unwrap_or(0.0),
        evidence: blend.evidence,
        note: None,
    }
}

pub fn table_name_signal(a: &TableFeatures, b: &TableFeatures) -> SignalOutcome {
    SignalOutcome::from_option(text_similarity(&a.name, &b.name), "table name has no tokens")
}

/// Skipped only when neither table has a description; one missing side scores 0.0.
pub fn table_description_signal(a: &TableFeatures, b: &TableFeatures) -> SignalOutcome {
    if a.description.is_empty() && b.description.is_empty() {
        return SignalOutcome::skipped("missing table description");
    }
    SignalOutcome::scored(text_similarity(&a.description, &b.description).unwrap_or(0.0))
}

pub fn platform_signal(a: &TableFeatures, b: &TableFeatures) -> SignalOutcome {
    SignalOutcome::scored(if a.platform == b.platform { 1.0 } else { 0.0 })
}

pub fn column_count_signal(a: &TableFeatures, b: &TableFeatures) -> SignalOutcome {
    let (m, n) = (a.column_count(), b.column_count());
    if m.max(n) == 0 {
        return SignalOutcome::skipped("no columns");
    }
    SignalOutcome::scored(m.min(n) as f64 / m.max(n) as f64)
}

/// Overlap of the column-name vocabularies.
pub fn column_names_signal(a: &TableFeatures, b: &TableFeatures) -> SignalOutcome {
    if a.column_name_tokens.is_empty() || b.column_name_tokens.is_empty() {
        return SignalOutcome::skipped("column names have no tokens");
    }
    let (ta, tb) = (&a.column_name_tokens, &b.column_name_tokens);
    SignalOutcome::scored((jaccard(ta, tb) + overlap_coefficient(ta, tb)) / 2.0)
}

/// Agreement of the datatype histograms.
///
/// Mean of the weighted Jaccard index and the containment of the smaller
/// table's mix in the larger one.
pub fn column_types_signal(a: &TableFeatures, b: &TableFeatures) -> SignalOutcome {
    SignalOutcome::from_option(
        histogram_similarity(&a.datatype_histogram, &b.datatype_histogram),
        "no columns",
    )
}

fn histogram_similarity(
    a: &BTreeMap<DatatypeClass, usize>,
    b: &BTreeMap<DatatypeClass, usize>,
) -> Option<f64> {
    let total_a: usize = a.values().sum();
    let total_b: usize = b.values().sum();
    if total_a == 0 || total_b == 0 {
        return None;
    }

    let (mut shared, mut spanned) = (0usize, 0usize);
    for class in DatatypeClass::ALL {
        let ca = a.get(&class).copied().unwrap_or(0);
        let cb = b.get(&class).copied().unwrap_or(0);
        shared += ca.min(cb);
        spanned += ca.max(cb);
    }

    let weighted_jaccard = shared as f64 / spanned as f64;
    let containment = shared as f64 / total_a.min(total_b) as f64;
    Some((weighted_jaccard + containment) / 2.0)
}
