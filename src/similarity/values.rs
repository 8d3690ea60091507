//! Compact summaries of sampled column values.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use super::text::jaccard;

/// Maximum number of distinct string values kept per summary.
pub const MAX_DISTINCT_VALUES: usize = 256;

/// Range statistics for a numeric sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// What the non-null values of a sample look like.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ValueProfile {
    /// Every non-null value parsed as a finite number.
    Numeric(NumericRange),
    /// Anything else; values kept as lower-cased strings.
    Text {
        distinct: BTreeSet<String>,
        mean_length: f64,
    },
}

/// Summary of a column's sampled values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueSummary {
    pub sample_size: usize,
    pub null_ratio: f64,
    /// Distinct non-null values over non-null values.
    pub distinct_ratio: f64,
    pub profile: ValueProfile,
}

impl ValueSummary {
    /// Summarize a sample. Returns `None` when the sample has no non-null values.
    pub fn from_values(values: &[Value]) -> Option<Self> {
        let non_null: Vec<&Value> = values.iter().filter(|v| !v.is_null()).collect();
        if non_null.is_empty() {
            return None;
        }

        let sample_size = values.len();
        let null_ratio = (sample_size - non_null.len()) as f64 / sample_size as f64;

        let rendered: Vec<String> = non_null.iter().map(|v| render(v)).collect();
        let all_distinct: BTreeSet<&str> = rendered.iter().map(String::as_str).collect();
        let distinct_ratio = all_distinct.len() as f64 / non_null.len() as f64;

        let numbers: Option<Vec<f64>> = non_null.iter().map(|v| as_number(v)).collect();
        let profile = match numbers {
            Some(numbers) => {
                let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
                let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
                ValueProfile::Numeric(NumericRange { min, max, mean })
            }
            None => {
                let mean_length =
                    rendered.iter().map(|s| s.chars().count()).sum::<usize>() as f64
                        / rendered.len() as f64;
                let distinct = rendered
                    .iter()
                    .map(|s| s.to_lowercase())
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .take(MAX_DISTINCT_VALUES)
                    .collect();
                ValueProfile::Text {
                    distinct,
                    mean_length,
                }
            }
        };

        Some(Self {
            sample_size,
            null_ratio,
            distinct_ratio,
            profile,
        })
    }

    /// Similarity of two summaries in [0, 1].
    ///
    /// `None` when the profiles are of different kinds, so the comparison
    /// carries no information.
    pub fn similarity(&self, other: &ValueSummary) -> Option<f64> {
        let distinct_agreement = 1.0 - (self.distinct_ratio - other.distinct_ratio).abs();

        let content = match (&self.profile, &other.profile) {
            (ValueProfile::Numeric(a), ValueProfile::Numeric(b)) => range_overlap(a, b),
            (
                ValueProfile::Text { distinct: a, .. },
                ValueProfile::Text { distinct: b, .. },
            ) => jaccard(a, b),
            _ => return None,
        };

        Some((0.7 * content + 0.3 * distinct_agreement).clamp(0.0, 1.0))
    }
}

/// Length of the intersection of two ranges over the length of their union.
fn range_overlap(a: &NumericRange, b: &NumericRange) -> f64 {
    let union = a.max.max(b.max) - a.min.min(b.min);
    if union <= 0.0 {
        // Both ranges are the same single point
        return 1.0;
    }
    let intersection = (a.max.min(b.max) - a.min.max(b.min)).max(0.0);
    intersection / union
}

fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
