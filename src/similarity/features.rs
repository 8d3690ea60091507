//! Feature extraction for columns and tables.
//!
//! Features are derived once per table and reused for every pair the table
//! takes part in. Extraction never fails: missing inputs simply leave the
//! optional features empty.

use std::collections::{BTreeMap, BTreeSet};

use crate::metadata::{ColumnInfo, DatatypeClass, TableInfo};

use super::embedding::EmbeddingIndex;
use super::text::NormalizedText;
use super::values::ValueSummary;

/// Comparable features of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFeatures {
    pub column_id: String,
    /// Name exactly as declared.
    pub raw_name: String,
    pub name: NormalizedText,
    pub description: NormalizedText,
    pub datatype: DatatypeClass,
    pub values: Option<ValueSummary>,
    pub embedding: Option<Vec<f32>>,
    /// Labels proposed by the infotype classifier.
    pub infotypes: BTreeSet<String>,
}

impl ColumnFeatures {
    pub fn extract(column: &ColumnInfo, embedding: Option<&[f32]>) -> Self {
        let meta = column.metadata();
        Self {
            column_id: column.column_id().to_string(),
            raw_name: meta.name().to_string(),
            name: NormalizedText::name(meta.name()),
            description: NormalizedText::description(meta.description()),
            datatype: meta.datatype_class(),
            values: ValueSummary::from_values(column.values()),
            embedding: embedding.map(<[f32]>::to_vec),
            infotypes: column
                .infotype_proposals()
                .iter()
                .map(|p| p.label.to_lowercase())
                .collect(),
        }
    }
}

/// Comparable features of a table and all of its columns.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFeatures {
    pub table_id: String,
    pub name: NormalizedText,
    pub description: NormalizedText,
    /// Lower-cased, trimmed platform identifier.
    pub platform: String,
    pub columns: Vec<ColumnFeatures>,
    /// Union of the name tokens of every column.
    pub column_name_tokens: BTreeSet<String>,
    /// Number of columns per datatype class.
    pub datatype_histogram: BTreeMap<DatatypeClass, usize>,
}

impl TableFeatures {
    /// Extract features, attaching vectors from `embeddings` when given.
    pub fn extract(table: &TableInfo, embeddings: Option<&EmbeddingIndex>) -> Self {
        let meta = table.metadata();
        let columns: Vec<ColumnFeatures> = table
            .columns()
            .iter()
            .map(|c| ColumnFeatures::extract(c, embeddings.and_then(|e| e.get(c.column_id()))))
            .collect();

        let column_name_tokens = columns
            .iter()
            .flat_map(|c| c.name.tokens.iter().cloned())
            .collect();

        let mut datatype_histogram = BTreeMap::new();
        for column in &columns {
            *datatype_histogram.entry(column.datatype).or_insert(0) += 1;
        }

        Self {
            table_id: meta.table_id().to_string(),
            name: NormalizedText::name(meta.name()),
            description: NormalizedText::description(meta.description()),
            platform: meta.platform().trim().to_lowercase(),
            columns,
            column_name_tokens,
            datatype_histogram,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
