//! The two parallel sweeps.

use std::collections::HashMap;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::{config_fingerprint, Settings, SettingsError};
use crate::error::ConfigResult;
use crate::metadata::TableInfo;
use crate::similarity::{
    CheckOptions, ColumnResults, EmbeddingIndex, EmbeddingProvider, SimilarityConfig,
    SimilarityEngine, SimilarityLabel, SimilarityResult, TableFeatures,
};

use super::pair::{PairState, TablePairKey};
use super::report::{BatchReport, PairVerdict};

/// Runs the pruning and detailed passes over many table pairs.
#[derive(Debug, Clone)]
pub struct SimilarityDriver {
    engine: SimilarityEngine,
    threads: usize,
    embedding_batch_size: usize,
}

struct Pruned<'a> {
    key: TablePairKey,
    a: &'a TableFeatures,
    b: &'a TableFeatures,
    result: SimilarityResult,
    passed: bool,
}

impl SimilarityDriver {
    pub fn new(config: SimilarityConfig) -> ConfigResult<Self> {
        Ok(Self {
            engine: SimilarityEngine::new(config)?,
            threads: 0,
            embedding_batch_size: 64,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let mut driver = Self::new(settings.to_config()?)?;
        driver.threads = settings.driver.threads;
        driver.embedding_batch_size = settings.driver.embedding_batch_size;
        Ok(driver)
    }

    /// Builder: size of the worker pool; 0 uses the global rayon pool.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn engine(&self) -> &SimilarityEngine {
        &self.engine
    }

    /// Compare every unordered pair of `tables`.
    pub fn run(&self, tables: &[TableInfo], embeddings: Option<&EmbeddingIndex>) -> BatchReport {
        let mut keys = Vec::with_capacity(tables.len() * tables.len().saturating_sub(1) / 2);
        for (i, a) in tables.iter().enumerate() {
            for b in &tables[i + 1..] {
                keys.push(TablePairKey::new(a.table_id(), b.table_id()));
            }
        }
        self.run_pairs(tables, &keys, embeddings)
    }

    /// Fetch embeddings from `provider` first, then compare every pair.
    pub async fn run_with_provider(
        &self,
        tables: &[TableInfo],
        provider: &dyn EmbeddingProvider,
    ) -> BatchReport {
        let index = if self.engine.config().use_embeddings {
            Some(EmbeddingIndex::build(provider, tables, self.embedding_batch_size).await)
        } else {
            None
        };
        self.run(tables, index.as_ref())
    }

    /// Compare the given pairs.
    ///
    /// Pairs naming unknown tables, or a table with itself, are skipped with
    /// a warning.
    pub fn run_pairs(
        &self,
        tables: &[TableInfo],
        keys: &[TablePairKey],
        embeddings: Option<&EmbeddingIndex>,
    ) -> BatchReport {
        match self.pool() {
            Some(pool) => pool.install(|| self.sweep(tables, keys, embeddings)),
            None => self.sweep(tables, keys, embeddings),
        }
    }

    fn pool(&self) -> Option<rayon::ThreadPool> {
        if self.threads == 0 {
            return None;
        }
        match rayon::ThreadPoolBuilder::new().num_threads(self.threads).build() {
            Ok(pool) => Some(pool),
            Err(err) => {
                warn!(error = %err, "could not build worker pool, using the global one");
                None
            }
        }
    }

    fn sweep(
        &self,
        tables: &[TableInfo],
        keys: &[TablePairKey],
        embeddings: Option<&EmbeddingIndex>,
    ) -> BatchReport {
        let config = self.engine.config();
        let thresholds = self.engine.thresholds();
        let fingerprint = config_fingerprint(config).unwrap_or_else(|err| {
            warn!(error = %err, "could not fingerprint configuration");
            String::new()
        });
        let embeddings = embeddings.filter(|_| config.use_embeddings);

        let started = Instant::now();
        let features: Vec<TableFeatures> = tables
            .par_iter()
            .map(|t| TableFeatures::extract(t, embeddings))
            .collect();

        let mut by_id: HashMap<&str, &TableFeatures> = HashMap::with_capacity(features.len());
        for f in &features {
            if by_id.insert(f.table_id.as_str(), f).is_some() {
                warn!(table = %f.table_id, "duplicate table id, keeping the last one");
            }
        }

        let resolved: Vec<(TablePairKey, &TableFeatures, &TableFeatures)> = keys
            .iter()
            .filter_map(|key| {
                if key.first() == key.second() {
                    warn!(table = key.first(), "skipping self-pair");
                    return None;
                }
                match (by_id.get(key.first()), by_id.get(key.second())) {
                    (Some(a), Some(b)) => Some((key.clone(), *a, *b)),
                    _ => {
                        warn!(pair = %key, "skipping pair with unknown table");
                        None
                    }
                }
            })
            .collect();

        // Every pruning result is known before the candidate set is fixed
        let pruned: Vec<Pruned<'_>> = resolved
            .into_par_iter()
            .map(|(key, a, b)| {
                let (result, _) = self.engine.compare_features(a, b, CheckOptions::pruning());
                let passed = thresholds.pruning_label(result.score).is_similar();
                Pruned {
                    key,
                    a,
                    b,
                    result,
                    passed,
                }
            })
            .collect();

        let candidates = pruned.iter().filter(|p| p.passed).count();
        info!(
            pairs = pruned.len(),
            candidates,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pruning pass done"
        );

        let started = Instant::now();
        let detailed_options = CheckOptions::detailed(config.use_embeddings);
        let verdicts: Vec<PairVerdict> = pruned
            .into_par_iter()
            .map(|p| {
                let state = PairState::after_pruning(p.passed);
                if state == PairState::PrunedOut {
                    return PairVerdict {
                        key: p.key,
                        state,
                        pruning: p.result,
                        detailed: None,
                        columns: ColumnResults::new(),
                        label: SimilarityLabel::NotSimilar,
                    };
                }

                let (detailed, columns) = self.engine.compare_features(p.a, p.b, detailed_options);
                let label = thresholds.final_label(detailed.score);
                debug!(pair = %p.key, score = detailed.score, %label, "pair final");
                PairVerdict {
                    key: p.key,
                    state: PairState::Final,
                    pruning: p.result,
                    detailed: Some(detailed),
                    columns,
                    label,
                }
            })
            .collect();

        info!(
            candidates,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "detailed pass done"
        );

        let mut report = BatchReport::new(fingerprint);
        for verdict in verdicts {
            report.insert(verdict);
        }
        report
    }
}
