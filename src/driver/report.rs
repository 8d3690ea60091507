//! Results of a batch run.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::similarity::{ColumnResults, SimilarityLabel, SimilarityResult};

use super::pair::{PairState, TablePairKey};

/// Everything known about one table pair after a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairVerdict {
    pub key: TablePairKey,
    pub state: PairState,
    pub pruning: SimilarityResult,
    /// Present once the pair reached `Final`.
    pub detailed: Option<SimilarityResult>,
    pub columns: ColumnResults,
    /// Final verdict; pruned-out pairs are never similar.
    pub label: SimilarityLabel,
}

impl PairVerdict {
    /// The score the verdict was based on.
    pub fn score(&self) -> f64 {
        self.detailed
            .as_ref()
            .map_or(self.pruning.score, |detailed| detailed.score)
    }
}

/// Results of one driver run, owned by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// SHA-256 of the engine configuration used.
    pub config_fingerprint: String,
    pub pairs: BTreeMap<TablePairKey, PairVerdict>,
}

impl BatchReport {
    pub fn new(config_fingerprint: String) -> Self {
        Self {
            config_fingerprint,
            pairs: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, verdict: PairVerdict) {
        self.pairs.insert(verdict.key.clone(), verdict);
    }

    /// Look up a pair in either order.
    pub fn get(&self, a: &str, b: &str) -> Option<&PairVerdict> {
        self.pairs.get(&TablePairKey::new(a, b))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PairVerdict> {
        self.pairs.values()
    }

    pub fn count(&self, state: PairState) -> usize {
        self.iter().filter(|v| v.state == state).count()
    }

    /// Pairs labeled similar, in key order.
    pub fn similar_pairs(&self) -> impl Iterator<Item = &PairVerdict> {
        self.iter().filter(|v| v.label.is_similar())
    }

    /// One line per pair.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for verdict in self.iter() {
            let detailed = verdict
                .detailed
                .as_ref()
                .map_or_else(|| "-".to_string(), |d| format!("{:.3}", d.score));
            let _ = writeln!(
                out,
                "{} {} pruning={:.3} detailed={} {}",
                verdict.key, verdict.state, verdict.pruning.score, detailed, verdict.label
            );
        }
        out
    }
}
