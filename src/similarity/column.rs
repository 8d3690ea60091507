//! Column similarity scoring.
//!
//! A column pair is scored by blending name, description, datatype, value,
//! embedding and infotype signals with the configured weights. A pair whose
//! datatype classes cannot be compared (numeric vs. string, say) and that
//! has no embedding evidence to vouch for it gets no score at all: the
//! result is `None`, which labels as `not_similar` and counts as zero.

use crate::metadata::DatatypeClass;

use super::aggregator::Blend;
use super::embedding::cosine_similarity;
use super::features::ColumnFeatures;
use super::registry::ColumnRegistry;
use super::signals::{SignalEvidence, SignalOutcome};
use super::text::{jaccard, text_similarity};

pub const NAME: &str = "name";
pub const DESCRIPTION: &str = "description";
pub const DATATYPE: &str = "datatype";
pub const VALUES: &str = "values";
pub const EMBEDDING: &str = "embedding";
pub const INFOTYPE: &str = "infotype";

/// Per-call options visible to column signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnContext {
    pub use_embeddings: bool,
}

/// Score of one column pair with its breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnScore {
    pub score: Option<f64>,
    pub evidence: Vec<SignalEvidence>,
}

/// Score a column pair.
pub fn score_columns(
    registry: &ColumnRegistry,
    a: &ColumnFeatures,
    b: &ColumnFeatures,
    ctx: &ColumnContext,
) -> ColumnScore {
    let blend = registry.evaluate(|eval| eval(a, b, ctx));
    let incompatible = blend.outcome(DATATYPE).and_then(SignalOutcome::score) == Some(0.0);
    let has_embedding = blend.outcome(EMBEDDING).is_some_and(SignalOutcome::is_scored);
    let Blend { score, evidence } = blend;

    let score = if incompatible && !has_embedding {
        tracing::trace!(
            column_a = %a.column_id,
            column_b = %b.column_id,
            "incompatible datatypes, no score"
        );
        None
    } else {
        score
    };

    ColumnScore { score, evidence }
}

/// Name similarity: exact or normalized equality, else edit distance and token overlap.
///
/// Distinct names where one side has no letters at all score 0.0.
pub fn name_signal(a: &ColumnFeatures, b: &ColumnFeatures, _: &ColumnContext) -> SignalOutcome {
    if !a.raw_name.is_empty() && a.raw_name == b.raw_name {
        return SignalOutcome::scored(1.0);
    }
    match text_similarity(&a.name, &b.name) {
        Some(score) => SignalOutcome::scored(score),
        None if a.raw_name.is_empty() && b.raw_name.is_empty() => {
            SignalOutcome::skipped("columns have no names")
        }
        None => SignalOutcome::scored(0.0),
    }
}

/// Skipped only when neither side has a description; one missing side scores 0.0.
pub fn description_signal(
    a: &ColumnFeatures,
    b: &ColumnFeatures,
    _: &ColumnContext,
) -> SignalOutcome {
    if a.description.is_empty() && b.description.is_empty() {
        return SignalOutcome::skipped("missing description");
    }
    SignalOutcome::scored(text_similarity(&a.description, &b.description).unwrap_or(0.0))
}

pub fn datatype_signal(a: &ColumnFeatures, b: &ColumnFeatures, _: &ColumnContext) -> SignalOutcome {
    SignalOutcome::scored(datatype_compatibility(a.datatype, b.datatype))
}

pub fn values_signal(a: &ColumnFeatures, b: &ColumnFeatures, _: &ColumnContext) -> SignalOutcome {
    match (&a.values, &b.values) {
        (Some(va), Some(vb)) => {
            SignalOutcome::from_option(va.similarity(vb), "value profiles differ in kind")
        }
        _ => SignalOutcome::skipped("no sampled values"),
    }
}

pub fn embedding_signal(
    a: &ColumnFeatures,
    b: &ColumnFeatures,
    ctx: &ColumnContext,
) -> SignalOutcome {
    if !ctx.use_embeddings {
        return SignalOutcome::skipped("embeddings disabled");
    }
    match (&a.embedding, &b.embedding) {
        (Some(ea), Some(eb)) => {
            SignalOutcome::from_option(cosine_similarity(ea, eb), "embedding dimensions differ")
        }
        _ => SignalOutcome::skipped("missing embedding"),
    }
}

pub fn infotype_signal(a: &ColumnFeatures, b: &ColumnFeatures, _: &ColumnContext) -> SignalOutcome {
    if a.infotypes.is_empty() || b.infotypes.is_empty() {
        return SignalOutcome::skipped("no infotype proposals");
    }
    SignalOutcome::scored(jaccard(&a.infotypes, &b.infotypes))
}

/// Compatibility of two datatype classes; 0.0 means incomparable.
pub fn datatype_compatibility(a: DatatypeClass, b: DatatypeClass) -> f64 {
    use DatatypeClass::*;

    match (a, b) {
        _ if a == b => 1.0,
        (Other, _) | (_, Other) => 0.5,
        (Numeric, Boolean) | (Boolean, Numeric) => 0.5,
        (String, Datetime) | (Datetime, String) => 0.5,
        _ => 0.0,
    }
}
