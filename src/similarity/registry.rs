//! Static signal registry.
//!
//! Each signal has a fixed name and a plain function pointer. A registry
//! pairs the built-in signals of one family (column or pruning) with their
//! configured weights. It is built once when the engine is constructed and
//! rejects unknown names, missing weights and out-of-range weights right
//! there, before any pair is scored.

use std::collections::BTreeMap;

use crate::error::{ConfigError, ConfigResult};

use super::aggregator::{blend, Blend};
use super::column::{self, ColumnContext};
use super::features::{ColumnFeatures, TableFeatures};
use super::pruning;
use super::signals::SignalOutcome;

/// Scores one column pair.
pub type ColumnSignalFn = fn(&ColumnFeatures, &ColumnFeatures, &ColumnContext) -> SignalOutcome;

/// Scores one table pair from cheap table-level features.
pub type TableSignalFn = fn(&TableFeatures, &TableFeatures) -> SignalOutcome;

/// Built-in column signals.
pub const COLUMN_SIGNALS: &[(&str, ColumnSignalFn)] = &[
    (column::NAME, column::name_signal),
    (column::DESCRIPTION, column::description_signal),
    (column::DATATYPE, column::datatype_signal),
    (column::VALUES, column::values_signal),
    (column::EMBEDDING, column::embedding_signal),
    (column::INFOTYPE, column::infotype_signal),
];

/// Built-in pruning signals.
pub const PRUNING_SIGNALS: &[(&str, TableSignalFn)] = &[
    (pruning::TABLE_NAME, pruning::table_name_signal),
    (pruning::TABLE_DESCRIPTION, pruning::table_description_signal),
    (pruning::PLATFORM, pruning::platform_signal),
    (pruning::COLUMN_COUNT, pruning::column_count_signal),
    (pruning::COLUMN_NAMES, pruning::column_names_signal),
    (pruning::COLUMN_TYPES, pruning::column_types_signal),
];

/// A signal with its weight.
#[derive(Debug, Clone, Copy)]
pub struct RegisteredSignal<F> {
    pub name: &'static str,
    pub weight: f64,
    pub eval: F,
}

/// The signals of one family, in built-in order.
#[derive(Debug, Clone)]
pub struct SignalRegistry<F> {
    family: &'static str,
    signals: Vec<RegisteredSignal<F>>,
}

pub type ColumnRegistry = SignalRegistry<ColumnSignalFn>;
pub type PruningRegistry = SignalRegistry<TableSignalFn>;

impl<F: Copy> SignalRegistry<F> {
    /// Pair `builtins` with `weights`, failing fast on any mismatch.
    pub fn build(
        family: &'static str,
        builtins: &[(&'static str, F)],
        weights: &BTreeMap<String, f64>,
    ) -> ConfigResult<Self> {
        if let Some(unknown) = weights
            .keys()
            .find(|name| !builtins.iter().any(|(builtin, _)| *builtin == name.as_str()))
        {
            return Err(ConfigError::UnknownSignal {
                family,
                signal: unknown.clone(),
            });
        }

        let mut signals = Vec::with_capacity(builtins.len());
        for (name, eval) in builtins {
            let weight = *weights
                .get(*name)
                .ok_or(ConfigError::MissingWeight {
                    family,
                    signal: *name,
                })?;
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(ConfigError::InvalidWeight {
                    family,
                    signal: name.to_string(),
                    value: weight,
                });
            }
            signals.push(RegisteredSignal {
                name: *name,
                weight,
                eval: *eval,
            });
        }

        if signals.iter().all(|s| s.weight == 0.0) {
            return Err(ConfigError::NoPositiveWeight { family });
        }

        Ok(Self { family, signals })
    }

    pub fn family(&self) -> &'static str {
        self.family
    }

    pub fn signals(&self) -> &[RegisteredSignal<F>] {
        &self.signals
    }

    /// Evaluate every signal with weight above zero and blend the outcomes.
    pub fn evaluate(&self, mut run: impl FnMut(F) -> SignalOutcome) -> Blend {
        let outcomes = self
            .signals
            .iter()
            .filter(|s| s.weight > 0.0)
            .map(|s| {
                let outcome = run(s.eval);
                tracing::trace!(family = self.family, signal = s.name, ?outcome, "signal evaluated");
                (s.name, s.weight, outcome)
            })
            .collect();
        blend(outcomes)
    }
}

impl ColumnRegistry {
    pub fn columns(weights: &BTreeMap<String, f64>) -> ConfigResult<Self> {
        Self::build("column", COLUMN_SIGNALS, weights)
    }
}

impl PruningRegistry {
    pub fn pruning(weights: &BTreeMap<String, f64>) -> ConfigResult<Self> {
        Self::build("pruning", PRUNING_SIGNALS, weights)
    }
}

/// Default column signal weights.
pub fn default_column_weights() -> BTreeMap<String, f64> {
    [
        (column::NAME, 0.4),
        (column::DESCRIPTION, 0.2),
        (column::DATATYPE, 0.2),
        (column::VALUES, 0.1),
        (column::EMBEDDING, 0.3),
        (column::INFOTYPE, 0.1),
    ]
    .into_iter()
    .map(|(name, weight)| (name.to_string(), weight))
    .collect()
}

/// Default pruning signal weights.
pub fn default_pruning_weights() -> BTreeMap<String, f64> {
    [
        (pruning::TABLE_NAME, 0.15),
        (pruning::TABLE_DESCRIPTION, 0.05),
        (pruning::PLATFORM, 0.05),
        (pruning::COLUMN_COUNT, 0.1),
        (pruning::COLUMN_NAMES, 0.45),
        (pruning::COLUMN_TYPES, 0.2),
    ]
    .into_iter()
    .map(|(name, weight)| (name.to_string(), weight))
    .collect()
}
