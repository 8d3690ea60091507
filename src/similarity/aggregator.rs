//! Blending signal outcomes into one score.
//!
//! The blend is a weighted mean over scored signals. Skipped signals leave
//! both numerator and denominator untouched, so a missing description
//! neither helps nor hurts a pair.

use super::signals::{SignalEvidence, SignalOutcome};

/// Blended score with its per-signal breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct Blend {
    /// `None` when no weighted signal produced a score.
    pub score: Option<f64>,
    pub evidence: Vec<SignalEvidence>,
}

impl Blend {
    /// Outcome of the named signal, if it was evaluated.
    pub fn outcome(&self, signal: &str) -> Option<&SignalOutcome> {
        self.evidence
            .iter()
            .find(|e| e.signal == signal)
            .map(|e| &e.outcome)
    }
}

/// Blend `(signal, weight, outcome)` triples, keeping their order in the evidence.
pub fn blend(outcomes: Vec<(&'static str, f64, SignalOutcome)>) -> Blend {
    let mut total_weight = 0.0;
    let mut weighted_sum = 0.0;
    for (_, weight, outcome) in &outcomes {
        if let Some(score) = outcome.score() {
            total_weight += weight;
            weighted_sum += weight * score;
        }
    }

    let score = if total_weight > 0.0 {
        Some((weighted_sum / total_weight).clamp(0.0, 1.0))
    } else {
        None
    };

    let evidence = outcomes
        .into_iter()
        .map(|(signal, weight, outcome)| {
            let contribution = match outcome.score() {
                Some(s) if total_weight > 0.0 => weight * s / total_weight,
                _ => 0.0,
            };
            SignalEvidence {
                signal: signal.to_string(),
                outcome,
                weight,
                contribution,
            }
        })
        .collect();

    Blend { score, evidence }
}
