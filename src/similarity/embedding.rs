//! Embedding vectors for column name and description text.
//!
//! How vectors are produced is up to the caller: anything implementing
//! [`EmbeddingProvider`] works, from a remote model endpoint to a map of
//! precomputed vectors. Lookups are the only slow step of a run, so they are
//! done up front, in batches, into an [`EmbeddingIndex`] that the scoring
//! code reads synchronously.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::error::EmbeddingError;
use crate::metadata::{ColumnInfo, TableInfo};

/// One column to embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingInput {
    pub column_id: String,
    /// Column name and description, space separated.
    pub text: String,
}

impl EmbeddingInput {
    pub fn for_column(column: &ColumnInfo) -> Self {
        let meta = column.metadata();
        let text = if meta.description().trim().is_empty() {
            meta.name().to_string()
        } else {
            format!("{} {}", meta.name(), meta.description().trim())
        };
        Self {
            column_id: column.column_id().to_string(),
            text,
        }
    }
}

/// Source of embedding vectors.
///
/// Implementations return one vector per input, in input order. An empty
/// vector means "no embedding for this input".
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed_batch(&self, inputs: &[EmbeddingInput]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Provider backed by precomputed vectors keyed by column id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticEmbeddings {
    vectors: HashMap<String, Vec<f32>>,
}

impl StaticEmbeddings {
    pub fn new(vectors: HashMap<String, Vec<f32>>) -> Self {
        Self { vectors }
    }
}

#[async_trait]
impl EmbeddingProvider for StaticEmbeddings {
    async fn embed_batch(&self, inputs: &[EmbeddingInput]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(inputs
            .iter()
            .map(|input| self.vectors.get(&input.column_id).cloned().unwrap_or_default())
            .collect())
    }
}

/// Vectors by column id, ready for synchronous scoring.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingIndex {
    vectors: HashMap<String, Vec<f32>>,
}

impl EmbeddingIndex {
    /// Embed every column of `tables`, `batch_size` columns per provider call.
    ///
    /// Batches run concurrently. A failed batch is logged and its columns
    /// are left without vectors; the embedding signal then skips them.
    pub async fn build(
        provider: &dyn EmbeddingProvider,
        tables: &[TableInfo],
        batch_size: usize,
    ) -> Self {
        let inputs: Vec<EmbeddingInput> = tables
            .iter()
            .flat_map(|t| t.columns().iter().map(EmbeddingInput::for_column))
            .collect();

        let chunks: Vec<&[EmbeddingInput]> = inputs.chunks(batch_size.max(1)).collect();
        tracing::info!(
            columns = inputs.len(),
            batches = chunks.len(),
            "requesting column embeddings"
        );

        let futures: Vec<_> = chunks.iter().map(|chunk| provider.embed_batch(chunk)).collect();
        let results = join_all(futures).await;

        let mut index = Self::default();
        for (chunk, result) in chunks.iter().zip(results) {
            match result {
                Ok(vectors) if vectors.len() == chunk.len() => {
                    for (input, vector) in chunk.iter().zip(vectors) {
                        index.insert(input.column_id.clone(), vector);
                    }
                }
                Ok(vectors) => {
                    let err = EmbeddingError::CountMismatch {
                        expected: chunk.len(),
                        got: vectors.len(),
                    };
                    tracing::warn!(error = %err, "discarding embedding batch");
                }
                Err(err) => {
                    tracing::warn!(error = %err, columns = chunk.len(), "embedding batch failed");
                }
            }
        }
        index
    }

    /// Store a vector; empty vectors are ignored.
    pub fn insert(&mut self, column_id: impl Into<String>, vector: Vec<f32>) {
        if !vector.is_empty() {
            self.vectors.insert(column_id.into(), vector);
        }
    }

    pub fn get(&self, column_id: &str) -> Option<&[f32]> {
        self.vectors.get(column_id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Cosine similarity clamped to [0, 1].
///
/// `None` when dimensions differ or either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    let cosine = dot / (norm_a.sqrt() * norm_b.sqrt());
    cosine.is_finite().then(|| cosine.clamp(0.0, 1.0))
}
