//! Tests for the batch driver.

use std::collections::HashMap;

use serde_json::json;
use tablesim::prelude::*;
use tablesim::similarity::column::EMBEDDING;
use tablesim::similarity::StaticEmbeddings;

fn column(table: &str, name: &str, desc: &str, dtype: &str) -> ColumnInfo {
    ColumnInfo::new(ColumnMetadata::for_table(table, name, desc, dtype))
}

fn orders(id: &str, name: &str) -> TableInfo {
    TableInfo::new(
        TableMetadata::new(name, "Customer orders", "postgres", id),
        vec![
            column(id, "order_id", "Order key", "int64").with_values(vec![json!(1), json!(2)]),
            column(id, "customer_email", "Email of the buyer", "object"),
            column(id, "placed_at", "", "datetime64[ns]"),
            column(id, "total", "Order total", "float64"),
        ],
    )
    .unwrap()
}

fn weather() -> TableInfo {
    TableInfo::new(
        TableMetadata::new("weather_readings", "Sensor data", "hive", "weather"),
        vec![
            column("weather", "temperature", "", "float64"),
            column("weather", "wind_speed", "", "float64"),
        ],
    )
    .unwrap()
}

fn catalog() -> Vec<TableInfo> {
    vec![orders("orders", "orders"), weather(), orders("orders_copy", "orders_copy")]
}

fn driver() -> SimilarityDriver {
    SimilarityDriver::new(SimilarityConfig::default()).unwrap()
}

#[test]
fn test_two_pass_states() {
    let report = driver().run(&catalog(), None);
    assert_eq!(report.len(), 3);

    let copy = report.get("orders_copy", "orders").unwrap();
    assert_eq!(copy.state, PairState::Final);
    assert_eq!(copy.label, SimilarityLabel::Similar);
    assert!(copy.detailed.is_some());
    assert_eq!(copy.columns.len(), 4);

    // Disjoint tables never reach the detailed pass
    for other in ["orders", "orders_copy"] {
        let verdict = report.get("weather", other).unwrap();
        assert_eq!(verdict.state, PairState::PrunedOut);
        assert!(verdict.detailed.is_none());
        assert!(verdict.columns.is_empty());
        assert_eq!(verdict.label, SimilarityLabel::NotSimilar);
    }

    assert_eq!(report.count(PairState::Final), 1);
    assert_eq!(report.count(PairState::PrunedOut), 2);
    assert_eq!(report.similar_pairs().count(), 1);
    assert!(report.iter().all(|v| v.state.is_terminal()));
}

#[test]
fn test_report_is_deterministic() {
    let tables = catalog();
    let first = driver().run(&tables, None);
    let second = driver().with_threads(2).run(&tables, None);
    assert_eq!(first, second);
    assert_eq!(first.config_fingerprint.len(), 64);
}

#[test]
fn test_fingerprint_tracks_config() {
    let mut config = SimilarityConfig::default();
    config.thresholds.final_ = 0.9;
    let tweaked = SimilarityDriver::new(config).unwrap().run(&catalog(), None);
    let default = driver().run(&catalog(), None);
    assert_ne!(tweaked.config_fingerprint, default.config_fingerprint);
}

#[test]
fn test_explicit_pairs() {
    let tables = catalog();
    let keys = vec![
        TablePairKey::new("orders", "orders_copy"),
        TablePairKey::new("orders", "missing"),
        TablePairKey::new("weather", "weather"),
    ];
    let report = driver().run_pairs(&tables, &keys, None);
    assert_eq!(report.len(), 1);
    assert!(report.get("orders", "orders_copy").is_some());
}

#[test]
fn test_pair_keys_sort_case_insensitively() {
    let key = TablePairKey::new("orders", "Inventory");
    assert_eq!(key.to_string(), "Inventory_SPLITTER_orders");
    assert_eq!(key, TablePairKey::new("Inventory", "orders"));
}

#[test]
fn test_rendered_report() {
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

    let report = driver().run(&[a, b], None);
    insta::assert_snapshot!(
        report.render_text().trim_end(),
        @"orders_a_SPLITTER_orders_b final pruning=0.853 detailed=0.333 not_similar"
    );
}

#[tokio::test]
async fn test_embeddings_from_provider() {
    let tables = vec![orders("orders", "orders"), orders("orders_copy", "orders_copy")];
    let vectors: HashMap<String, Vec<f32>> = tables
        .iter()
        .flat_map(|t| t.columns())
        .map(|c| (c.column_id().to_string(), vec![1.0, 0.0, 0.5]))
        .collect();
    let provider = StaticEmbeddings::new(vectors);

    let mut config = SimilarityConfig::default();
    config.use_embeddings = true;
    let report = SimilarityDriver::new(config)
        .unwrap()
        .run_with_provider(&tables, &provider)
        .await;

    let verdict = report.get("orders", "orders_copy").unwrap();
    let first = verdict.columns.values().next().unwrap();
    let embedding = first.evidence.iter().find(|e| e.signal == EMBEDDING).unwrap();
    assert!(embedding.outcome.is_scored());
}

#[test]
fn test_empty_table_in_batch() {
    let mut tables = catalog();
    tables.push(
        TableInfo::new(TableMetadata::new("empty", "", "postgres", "empty"), vec![]).unwrap(),
    );
    let report = driver().run(&tables, None);
    assert_eq!(report.len(), 6);
    let verdict = report.get("empty", "orders").unwrap();
    assert_eq!(verdict.state, PairState::PrunedOut);
    assert!(verdict.pruning.note.is_some());
}
