//! One-to-one column matching.
//!
//! Matching is greedy: every column pair is ranked by score and pairs are
//! accepted best-first while both columns are still free. This is not a
//! globally optimal assignment. It can lose to the Hungarian method when a
//! single strong pair blocks two slightly weaker ones, but it is stable and
//! cheap. Ties are broken by the canonical [`ColumnPairKey`], so swapping the
//! two tables mirrors the matching instead of changing it.

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

/// Unordered pair of column ids.
///
/// The constructor puts the ids in lexicographic order, so `(a, b)` and
/// `(b, a)` build the same key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnPairKey {
    first: String,
    second: String,
}

impl ColumnPairKey {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn contains(&self, column_id: &str) -> bool {
        self.first == column_id || self.second == column_id
    }
}

impl fmt::Display for ColumnPairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.first, self.second)
    }
}

// Keys appear as JSON object keys, so they serialize as strings.
impl Serialize for ColumnPairKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// An accepted pair, as indexes into the two column lists.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMatch {
    pub index_a: usize,
    pub index_b: usize,
    pub score: Option<f64>,
}

/// Outcome of matching two column lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMatching {
    /// Accepted pairs in acceptance order (best first).
    pub pairs: Vec<ColumnMatch>,
    /// Indexes of columns of the first list left without a partner.
    pub unmatched_a: Vec<usize>,
    pub unmatched_b: Vec<usize>,
}

struct Candidate<'a> {
    index_a: usize,
    index_b: usize,
    score: Option<f64>,
    key: (&'a str, &'a str),
}

impl Candidate<'_> {
    fn rank(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}

/// Greedily match columns `ids_a` against `ids_b`.
///
/// `score(i, j)` is called once for every pair. Exactly `min(m, n)` pairs
/// are accepted; an incomparable pair (`None`) ranks like 0.0 and is still
/// taken when nothing better is left.
pub fn greedy_match<A, B, F>(ids_a: &[A], ids_b: &[B], mut score: F) -> ColumnMatching
where
    A: AsRef<str>,
    B: AsRef<str>,
    F: FnMut(usize, usize) -> Option<f64>,
{
    let mut candidates = Vec::with_capacity(ids_a.len() * ids_b.len());
    for (i, a) in ids_a.iter().enumerate() {
        for (j, b) in ids_b.iter().enumerate() {
            let (a, b) = (a.as_ref(), b.as_ref());
            candidates.push(Candidate {
                index_a: i,
                index_b: j,
                score: score(i, j),
                key: if a <= b { (a, b) } else { (b, a) },
            });
        }
    }

    candidates.sort_by(|x, y| {
        y.rank()
            .total_cmp(&x.rank())
            .then_with(|| x.key.cmp(&y.key))
            .then_with(|| tie_on_index(x, y))
    });

    let mut taken_a = vec![false; ids_a.len()];
    let mut taken_b = vec![false; ids_b.len()];
    let limit = ids_a.len().min(ids_b.len());
    let mut pairs = Vec::with_capacity(limit);

    for candidate in candidates {
        if pairs.len() == limit {
            break;
        }
        if taken_a[candidate.index_a] || taken_b[candidate.index_b] {
            continue;
        }
        taken_a[candidate.index_a] = true;
        taken_b[candidate.index_b] = true;
        pairs.push(ColumnMatch {
            index_a: candidate.index_a,
            index_b: candidate.index_b,
            score: candidate.score,
        });
    }

    ColumnMatching {
        pairs,
        unmatched_a: free_indexes(&taken_a),
        unmatched_b: free_indexes(&taken_b),
    }
}

// Only reached when both tables carry the same column id.
fn tie_on_index(x: &Candidate<'_>, y: &Candidate<'_>) -> Ordering {
    (x.index_a.min(x.index_b), x.index_a.max(x.index_b))
        .cmp(&(y.index_a.min(y.index_b), y.index_a.max(y.index_b)))
}

fn free_indexes(taken: &[bool]) -> Vec<usize> {
    taken
        .iter()
        .enumerate()
        .filter(|(_, taken)| !**taken)
        .map(|(i, _)| i)
        .collect()
}
