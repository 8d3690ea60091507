//! Table pair keys and per-pair state.

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::metadata::COLUMN_ID_SEPARATOR;

/// Canonical key of an unordered table pair.
///
/// Table ids are sorted case-insensitively (exact order breaks ties), so
/// `("Orders", "customers")` and `("customers", "Orders")` build the same
/// key. Renders as `<first>_SPLITTER_<second>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TablePairKey {
    first: String,
    second: String,
}

impl TablePairKey {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if case_insensitive(&a, &b) == Ordering::Greater {
            Self { first: b, second: a }
        } else {
            Self { first: a, second: b }
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }
}

fn case_insensitive(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

impl Ord for TablePairKey {
    fn cmp(&self, other: &Self) -> Ordering {
        case_insensitive(&self.first, &other.first)
            .then_with(|| case_insensitive(&self.second, &other.second))
    }
}

impl PartialOrd for TablePairKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TablePairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.first, COLUMN_ID_SEPARATOR, self.second)
    }
}

impl Serialize for TablePairKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Where a table pair is in the two-pass pipeline.
///
/// ```text
/// Unscored ──► PrunedOut                  (pruning score <= threshold)
///     └─────► Candidate ──► Final         (pruning score >  threshold)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairState {
    Unscored,
    PrunedOut,
    Candidate,
    Final,
}

impl PairState {
    /// State after the pruning pass.
    pub fn after_pruning(passed: bool) -> Self {
        if passed {
            Self::Candidate
        } else {
            Self::PrunedOut
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::PrunedOut | Self::Final)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unscored => "unscored",
            Self::PrunedOut => "pruned_out",
            Self::Candidate => "candidate",
            Self::Final => "final",
        }
    }
}

impl fmt::Display for PairState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
