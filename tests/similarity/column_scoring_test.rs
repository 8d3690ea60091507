//! Tests for column-level scoring through the public engine.

use serde_json::json;
use tablesim::prelude::*;
use tablesim::similarity::column::{score_columns, ColumnContext, EMBEDDING, NAME};
use tablesim::similarity::registry::ColumnRegistry;
use tablesim::similarity::{ColumnFeatures, SignalEvidence, SignalOutcome};

fn features(info: &ColumnInfo) -> ColumnFeatures {
    ColumnFeatures::extract(info, None)
}

fn column(table: &str, name: &str, desc: &str, dtype: &str) -> ColumnInfo {
    ColumnInfo::new(ColumnMetadata::for_table(table, name, desc, dtype))
}

fn registry(config: &SimilarityConfig) -> ColumnRegistry {
    ColumnRegistry::columns(&config.column_weights).unwrap()
}

#[test]
fn test_threshold_boundary_is_inclusive() {
    let at = ColumnSimilarityResult {
        column_a: "a_SPLITTER_x".to_string(),
        column_b: "b_SPLITTER_x".to_string(),
        score: Some(0.8),
        evidence: vec![],
    };
    assert_eq!(at.label(0.8), SimilarityLabel::Similar);

    let below = ColumnSimilarityResult {
        score: Some(0.8 - f64::EPSILON),
        ..at.clone()
    };
    assert_eq!(below.label(0.8), SimilarityLabel::NotSimilar);

    let null = ColumnSimilarityResult { score: None, ..at };
    assert_eq!(null.label(0.0), SimilarityLabel::NotSimilar);
}

#[test]
fn test_perturbed_names_still_match() {
    let config = SimilarityConfig::default();
    let a = features(&column("t1", "Customer_ID", "", "int64"));
    let b = features(&column("t2", "#cUSTOMER7iD~", "", "bigint"));
    let result = score_columns(&registry(&config), &a, &b, &ColumnContext::default());
    assert_eq!(result.score, Some(1.0));
}

#[test]
fn test_scores_are_deterministic() {
    let config = SimilarityConfig::default();
    let a = column("t1", "order_total", "Total amount of the order", "float64")
        .with_values(vec![json!(10.5), json!(20.0), json!(null)]);
    let b = column("t2", "total_usd", "Order total in dollars", "decimal(10,2)")
        .with_values(vec![json!(12.0), json!(18.25)]);
    let (fa, fb) = (features(&a), features(&b));

    let r = registry(&config);
    let first = score_columns(&r, &fa, &fb, &ColumnContext::default());
    let second = score_columns(&r, &fa, &fb, &ColumnContext::default());
    assert_eq!(first, second);
    let score = first.score.unwrap();
    assert!((0.0..=1.0).contains(&score));
}

#[test]
fn test_weights_are_configurable() {
    let mut config = SimilarityConfig::default();
    config.column_weights.insert(NAME.to_string(), 0.0);
    let a = features(&column("t1", "alpha", "", "int64"));
    let b = features(&column("t2", "omega", "", "int64"));

    let without_name = score_columns(&registry(&config), &a, &b, &ColumnContext::default());
    // Only the datatype signal is left, and it agrees
    assert_eq!(without_name.score, Some(1.0));
    assert!(without_name.evidence.iter().all(|e| e.signal != NAME));

    let with_name = score_columns(
        &registry(&SimilarityConfig::default()),
        &a,
        &b,
        &ColumnContext::default(),
    );
    assert!(with_name.score.unwrap() < 1.0);
}

#[test]
fn test_embeddings_only_when_enabled() {
    let config = SimilarityConfig::default();
    let a_info = column("t1", "zip", "", "object");
    let b_info = column("t2", "postcode", "", "object");
    let a = ColumnFeatures::extract(&a_info, Some(&[0.6f32, 0.8][..]));
    let b = ColumnFeatures::extract(&b_info, Some(&[0.6f32, 0.8][..]));
    let r = registry(&config);

    let off = score_columns(&r, &a, &b, &ColumnContext::default());
    let embedding = |evidence: &[SignalEvidence]| {
        evidence
            .iter()
            .find(|e| e.signal == EMBEDDING)
            .map(|e| e.outcome.clone())
    };
    assert!(matches!(
        embedding(&off.evidence),
        Some(SignalOutcome::Skipped { .. })
    ));

    let on = score_columns(
        &r,
        &a,
        &b,
        &ColumnContext {
            use_embeddings: true,
        },
    );
    assert!(embedding(&on.evidence).unwrap().is_scored());
    assert!(on.score.unwrap() > off.score.unwrap());
}

#[test]
fn test_incomparable_pairs_stay_in_mapping() {
    let a = TableInfo::new(
        TableMetadata::new("a", "", "x", "a"),
        vec![column("a", "amount", "", "float64")],
    )
    .unwrap();
    let b = TableInfo::new(
        TableMetadata::new("b", "", "x", "b"),
        vec![column("b", "amount", "", "varchar")],
    )
    .unwrap();

    let (result, columns) =
        check_similarity(&a, &b, false, false, &SimilarityConfig::default()).unwrap();
    assert_eq!(columns.len(), 1);
    let pair = &columns[&ColumnPairKey::new("b_SPLITTER_amount", "a_SPLITTER_amount")];
    assert_eq!(pair.score, None);
    assert_eq!(pair.label(0.8), SimilarityLabel::NotSimilar);
    assert_eq!(result.score, 0.0);
}
