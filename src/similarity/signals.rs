//! Per-signal outcomes.
//!
//! Every signal either produces a score in [0, 1] or is skipped with a
//! reason (missing description, embeddings disabled, incompatible value
//! profiles). Skipped signals drop out of the weighted blend instead of
//! counting as zero.

use serde::{Deserialize, Serialize};

/// Result of evaluating one signal on one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignalOutcome {
    Scored { score: f64 },
    Skipped { reason: String },
}

impl SignalOutcome {
    /// A scored outcome, clamped to [0, 1]. NaN becomes a skip.
    pub fn scored(score: f64) -> Self {
        if score.is_nan() {
            return Self::skipped("score was not a number");
        }
        Self::Scored {
            score: score.clamp(0.0, 1.0),
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    /// Score when present, otherwise skip with `reason`.
    pub fn from_option(score: Option<f64>, reason: &str) -> Self {
        match score {
            Some(score) => Self::scored(score),
            None => Self::skipped(reason),
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            Self::Scored { score } => Some(*score),
            Self::Skipped { .. } => None,
        }
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, Self::Scored { .. })
    }
}

/// How one signal contributed to a blended score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvidence {
    pub signal: String,
    pub outcome: SignalOutcome,
    /// Configured weight.
    pub weight: f64,
    /// Share of the blended score; 0.0 for skipped signals.
    pub contribution: f64,
}
