//! Recall checks against synthetic logical copies.

use serde_json::json;
use tablesim::prelude::*;
use tablesim::synth::LogicalCopy;

const SEEDS: [u64; 5] = [1, 7, 42, 100, 2024];

fn source() -> TableInfo {
    let columns = [
        ("order_id", "int64", json!([1, 2, 3])),
        ("customer_id", "int64", json!([10, 11, 12])),
        ("order_date", "datetime64[ns]", json!(["2021-01-01", "2021-01-02"])),
        ("amount", "float64", json!([9.5, 12.0, 3.25])),
        ("status", "object", json!(["open", "shipped"])),
        ("city", "object", json!(["Lyon", "Porto"])),
    ]
    .into_iter()
    .map(|(name, dtype, values)| {
        let desc = format!(" {}", name);
        let values = values.as_array().cloned().unwrap_or_default();
        ColumnInfo::new(ColumnMetadata::for_table("orders", name, &desc, dtype)).with_values(values)
    })
    .collect();

    TableInfo::new(
        TableMetadata::new(
            "orders",
            "This table contains description of orders",
            "postgres",
            "orders",
        ),
        columns,
    )
    .unwrap()
}

fn donor() -> TableInfo {
    let columns = ["temperature", "wind_speed"]
        .into_iter()
        .map(|name| {
            ColumnInfo::new(ColumnMetadata::for_table("weather", name, "", "float64"))
                .with_values(vec![json!(18.5), json!(21.0)])
        })
        .collect();
    TableInfo::new(
        TableMetadata::new("weather", "Hourly readings", "hive", "weather"),
        columns,
    )
    .unwrap()
}

fn engine() -> SimilarityEngine {
    SimilarityEngine::new(SimilarityConfig::default()).unwrap()
}

#[test]
fn test_copies_pass_pruning() {
    let (source, donor) = (source(), donor());
    let engine = engine();
    for seed in SEEDS {
        let copy = LogicalCopy::new(seed).derive(&source, &donor).unwrap();
        let (result, columns) = engine.check_similarity(&source, &copy, CheckOptions::pruning());
        assert!(columns.is_empty());
        assert!(
            result.label(engine.thresholds()).is_similar(),
            "seed {} pruning score {}",
            seed,
            result.score
        );
    }
}

#[test]
fn test_copies_pass_detailed() {
    let (source, donor) = (source(), donor());
    let engine = engine();
    for seed in SEEDS {
        let copy = LogicalCopy::new(seed).derive(&source, &donor).unwrap();
        let (result, _) = engine.check_similarity(&source, &copy, CheckOptions::detailed(false));
        assert!(
            result.label(engine.thresholds()).is_similar(),
            "seed {} detailed score {}",
            seed,
            result.score
        );
        assert!((result.score - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_matches_follow_provenance() {
    let (source, donor) = (source(), donor());
    let engine = engine();
    for seed in SEEDS {
        let copy = LogicalCopy::new(seed).derive(&source, &donor).unwrap();
        let (result, columns) = engine.check_similarity(&source, &copy, CheckOptions::detailed(false));

        assert_eq!(result.matched_columns.len(), source.columns().len());
        assert!(result.unmatched_a.is_empty());
        assert_eq!(result.unmatched_b.len(), 2);

        for copied in copy.columns() {
            let parent = copied.parent_columns().and_then(|p| p.first()).cloned().flatten();
            match parent {
                Some(parent) => {
                    let key = ColumnPairKey::new(parent.as_str(), copied.column_id());
                    assert!(columns.contains_key(&key), "seed {} missing {}", seed, key);
                    assert!(result.matched_columns.contains(&key));
                }
                None => assert!(result.unmatched_b.iter().any(|id| id == copied.column_id())),
            }
        }
    }
}

#[test]
fn test_driver_finds_copies() {
    let (source, donor) = (source(), donor());
    let copy = LogicalCopy::new(42).derive(&source, &donor).unwrap();
    let copy_id = copy.table_id().to_string();

    let driver = SimilarityDriver::new(SimilarityConfig::default()).unwrap();
    let report = driver.run(&[source, donor, copy], None);

    let verdict = report.get("orders", &copy_id).unwrap();
    assert_eq!(verdict.state, PairState::Final);
    assert!(verdict.label.is_similar());
    assert!(!report.get("orders", "weather").unwrap().label.is_similar());
}
