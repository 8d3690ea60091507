//! Text normalization and set-overlap measures.
//!
//! Names are compared on tokens: lower-cased, split on every character that
//! is not a letter in any script (so digits and punctuation disappear) and
//! singularized with the `inflector` crate plus a table of irregular plurals
//! common in schemas. Only ASCII words are singularized.

use std::collections::BTreeSet;

use inflector::Inflector;
use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALPHA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}]+").expect("token separator pattern is valid"));

/// Known irregular plurals that inflector doesn't handle well for schema names.
static IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("mouse", "mice"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("half", "halves"),
    ("analysis", "analyses"),
    ("basis", "bases"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("medium", "media"),
    ("index", "indices"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
    ("status", "statuses"),
    ("address", "addresses"),
];

/// Filler words dropped from descriptions before comparison.
static STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "is", "it", "of",
    "on", "or", "that", "the", "this", "to", "with",
];

/// Singularize a word, handling irregulars first then falling back to inflector.
pub fn singularize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let lower = word.to_lowercase();

    for (singular, plural) in IRREGULAR_PLURALS {
        if lower == *plural || lower == *singular {
            return singular.to_string();
        }
    }

    // Short tokens like "id", "ss" or "us" are abbreviations, not plurals
    if !lower.is_ascii() || lower.len() <= 3 {
        return lower;
    }

    lower.to_singular()
}

/// Tokens of a name or description, in order of appearance.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    NON_ALPHA
        .split(&lower)
        .filter(|t| !t.is_empty())
        .map(singularize)
        .collect()
}

/// Tokens of free text with stop words removed.
pub fn description_tokens(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    NON_ALPHA
        .split(&lower)
        .filter(|t| !t.is_empty() && !STOP_WORDS.contains(t))
        .map(singularize)
        .collect()
}

/// Normalized text: its token list plus the tokens joined without separators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedText {
    pub tokens: BTreeSet<String>,
    pub joined: String,
}

impl NormalizedText {
    pub fn name(text: &str) -> Self {
        Self::from_tokens(tokenize(text))
    }

    pub fn description(text: &str) -> Self {
        Self::from_tokens(description_tokens(text))
    }

    fn from_tokens(tokens: Vec<String>) -> Self {
        let joined = tokens.concat();
        Self {
            tokens: tokens.into_iter().collect(),
            joined,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// |A ∩ B| / |A ∪ B|, 0.0 when both are empty.
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// |A ∩ B| / min(|A|, |B|), 0.0 when either is empty.
pub fn overlap_coefficient<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let smaller = a.len().min(b.len());
    if smaller == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / smaller as f64
}

/// Similarity of two normalized texts in [0, 1].
///
/// Equal token strings score 1.0. Otherwise the larger of the normalized
/// Levenshtein similarity of the joined tokens and the mean of Jaccard and
/// overlap coefficient over the token sets. Returns `None` when either side
/// has no tokens.
pub fn text_similarity(a: &NormalizedText, b: &NormalizedText) -> Option<f64> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    if a.joined == b.joined {
        return Some(1.0);
    }

    let edit = strsim::normalized_levenshtein(&a.joined, &b.joined);
    let token = (jaccard(&a.tokens, &b.tokens) + overlap_coefficient(&a.tokens, &b.tokens)) / 2.0;
    Some(edit.max(token).clamp(0.0, 1.0))
}
