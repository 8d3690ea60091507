//! End-to-end tests for `check_similarity` in both modes.

use serde_json::json;
use tablesim::prelude::*;
use tablesim::similarity::EmbeddingIndex;
use tablesim::ConfigError;

fn column(table: &str, name: &str, desc: &str, dtype: &str) -> ColumnInfo {
    ColumnInfo::new(ColumnMetadata::for_table(table, name, desc, dtype))
}

fn orders(id: &str, name: &str) -> TableInfo {
    TableInfo::new(
        TableMetadata::new(name, "Customer orders", "postgres", id),
        vec![
            column(id, "order_id", "Order key", "int64")
                .with_values(vec![json!(1), json!(2), json!(3)]),
            column(id, "customer_email", "Email of the buyer", "object")
                .with_values(vec![json!("a@x.com"), json!("b@x.com")]),
            column(id, "placed_at", "When the order was placed", "datetime64[ns]"),
            column(id, "total", "Order total", "float64")
                .with_values(vec![json!(9.5), json!(20.0)]),
        ],
    )
    .unwrap()
}

fn engine() -> SimilarityEngine {
    SimilarityEngine::new(SimilarityConfig::default()).unwrap()
}

#[test]
fn test_identical_columns_different_table_names() {
    let a = orders("orders", "orders");
    let b = orders("purchases", "purchase_history");

    let (result, columns) = engine().check_similarity(&a, &b, CheckOptions::detailed(false));
    assert_eq!(result.mode, ComparisonMode::Detailed);
    assert!((result.score - 1.0).abs() < 1e-9, "score {}", result.score);
    assert_eq!(columns.len(), 4);
    assert!(result.unmatched_a.is_empty() && result.unmatched_b.is_empty());

    // Every column met its namesake
    for pair in columns.values() {
        let a_name = pair.column_a.rsplit("_SPLITTER_").next();
        let b_name = pair.column_b.rsplit("_SPLITTER_").next();
        assert_eq!(a_name, b_name);
        assert_eq!(pair.label(0.8), SimilarityLabel::Similar);
    }
    assert!(engine().thresholds().final_label(result.score).is_similar());
}

#[test]
fn test_pruning_pass_does_not_imply_final_pass() {
    let a = TableInfo::new(
        TableMetadata::new("orders", "Customer orders", "postgres", "orders_a"),
        vec![
            column("orders_a", "order_id", "", "int64"),
            column("orders_a", "amount", "", "float64"),
            column("orders_a", "quantity", "", "int32"),
        ],
    )
    .unwrap();
    let b = TableInfo::new(
        TableMetadata::new("orders", "Customer orders", "postgres", "orders_b"),
        vec![
            column("orders_b", "order_id", "", "int64"),
            column("orders_b", "amount", "", "object"),
            column("orders_b", "quantity", "", "object"),
        ],
    )
    .unwrap();

    let engine = engine();
    let thresholds = engine.thresholds();

    let (pruning, _) = engine.check_similarity(&a, &b, CheckOptions::pruning());
    assert!(thresholds.pruning_label(pruning.score).is_similar(), "{}", pruning.score);

    let (detailed, columns) = engine.check_similarity(&a, &b, CheckOptions::detailed(false));
    assert!(!thresholds.final_label(detailed.score).is_similar(), "{}", detailed.score);
    assert!((detailed.score - 1.0 / 3.0).abs() < 1e-9);
    assert_eq!(detailed.pruning_score, pruning.score);

    // Incomparable pairs are reported, not dropped
    assert_eq!(columns.len(), 3);
    assert_eq!(columns.values().filter(|c| c.score.is_none()).count(), 2);
}

#[test]
fn test_empty_table_edge_case() {
    let a = orders("orders", "orders");
    let empty = TableInfo::new(TableMetadata::new("empty", "", "postgres", "empty"), vec![])
        .unwrap();

    for pruning_mode in [true, false] {
        for (x, y) in [(&a, &empty), (&empty, &a), (&empty, &empty)] {
            let (result, columns) =
                check_similarity(x, y, pruning_mode, true, &SimilarityConfig::default()).unwrap();
            assert_eq!(result.score, 0.0);
            assert!(columns.is_empty());
            assert!(result.note.is_some());
        }
    }
}

#[test]
fn test_determinism() {
    let a = orders("orders", "orders");
    let mut b_cols: Vec<ColumnInfo> = orders("o2", "o2").columns().to_vec();
    b_cols.truncate(3);
    b_cols.push(column("o2", "coupon_code", "Discount code", "object"));
    let b = TableInfo::new(TableMetadata::new("order_log", "", "mysql", "o2"), b_cols).unwrap();

    let engine = engine();
    for options in [CheckOptions::pruning(), CheckOptions::detailed(false)] {
        let first = engine.check_similarity(&a, &b, options);
        let second = engine.check_similarity(&a, &b, options);
        assert_eq!(first.0.score.to_bits(), second.0.score.to_bits());
        assert_eq!(first, second);
    }
}

#[test]
fn test_symmetry() {
    let a = orders("orders", "orders");
    let b = TableInfo::new(
        TableMetadata::new("sales", "All sales", "postgres", "sales"),
        vec![
            column("sales", "sale_id", "Sale key", "bigint"),
            column("sales", "buyer_email", "Email of the customer", "varchar"),
            column("sales", "total", "Sale total", "decimal(10,2)"),
        ],
    )
    .unwrap();

    let engine = engine();
    for options in [CheckOptions::pruning(), CheckOptions::detailed(false)] {
        let (ab, ab_cols) = engine.check_similarity(&a, &b, options);
        let (ba, ba_cols) = engine.check_similarity(&b, &a, options);
        assert!((ab.score - ba.score).abs() < 1e-12, "{} vs {}", ab.score, ba.score);
        let ab_keys: Vec<_> = ab_cols.keys().collect();
        let ba_keys: Vec<_> = ba_cols.keys().collect();
        assert_eq!(ab_keys, ba_keys);
    }
}

#[test]
fn test_pair_keys_are_order_independent() {
    let a = orders("orders", "orders");
    let b = orders("purchases", "purchases");
    let (_, columns) = engine().check_similarity(&a, &b, CheckOptions::detailed(false));
    let key = ColumnPairKey::new("purchases_SPLITTER_total", "orders_SPLITTER_total");
    assert_eq!(columns[&key].column_a, "orders_SPLITTER_total");
}

#[test]
fn test_config_errors_surface_at_entry() {
    let a = orders("orders", "orders");
    let mut config = SimilarityConfig::default();
    config.thresholds.column = -0.1;
    assert_eq!(
        check_similarity(&a, &a, true, false, &config).unwrap_err(),
        ConfigError::ThresholdOutOfRange {
            name: "column",
            value: -0.1
        }
    );

    let mut config = SimilarityConfig::default();
    config
        .column_weights
        .insert("row_count".to_string(), 0.5);
    assert!(matches!(
        SimilarityEngine::new(config),
        Err(ConfigError::UnknownSignal { .. })
    ));
}

#[test]
fn test_non_latin_names_are_compared() {
    let a = TableInfo::new(
        TableMetadata::new("personas", "", "postgres", "personas"),
        vec![
            column("personas", "年龄", "", "int64"),
            column("personas", "città", "", "object"),
        ],
    )
    .unwrap();
    let b = TableInfo::new(
        TableMetadata::new("precios", "", "postgres", "precios"),
        vec![
            column("precios", "价格", "", "int64"),
            column("precios", "größe", "", "object"),
        ],
    )
    .unwrap();

    let engine = engine();
    let (result, columns) = engine.check_similarity(&a, &b, CheckOptions::detailed(false));
    assert_eq!(columns.len(), 2);
    for pair in columns.values() {
        assert_eq!(pair.label(engine.thresholds().column), SimilarityLabel::NotSimilar);
    }
    assert!(!result.label(engine.thresholds()).is_similar(), "{}", result.score);

    // The same names on both sides still match perfectly
    let (same, _) = engine.check_similarity(&a, &a, CheckOptions::detailed(false));
    assert!((same.score - 1.0).abs() < 1e-9);
}

#[test]
fn test_embeddings_need_an_index() {
    let a = TableInfo::new(
        TableMetadata::new("a", "", "x", "a"),
        vec![column("a", "zip", "", "object")],
    )
    .unwrap();
    let b = TableInfo::new(
        TableMetadata::new("b", "", "x", "b"),
        vec![column("b", "postcode", "", "object")],
    )
    .unwrap();
    let config = SimilarityConfig::default();

    let (plain, _) = check_similarity(&a, &b, false, false, &config).unwrap();
    let (flag_only, _) = check_similarity(&a, &b, false, true, &config).unwrap();
    assert_eq!(plain.score, flag_only.score);

    let mut index = EmbeddingIndex::default();
    index.insert("a_SPLITTER_zip", vec![0.6, 0.8]);
    index.insert("b_SPLITTER_postcode", vec![0.6, 0.8]);
    let (with_index, _) =
        check_similarity_with(&a, &b, false, true, &config, Some(&index)).unwrap();
    assert!(with_index.score > plain.score);
}
