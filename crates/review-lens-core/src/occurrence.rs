//! Per-word index of the comments that produced each word.

use std::collections::{HashMap, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One comment paired with the file it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Occurrence {
    /// Comment text as read (trimmed at the ends only).
    pub comment: String,
    /// Source label.
    pub source: String,
}

impl Occurrence {
    /// Pair a comment with its source label.
    pub fn new(comment: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct OccurrenceSet {
    ordered: Vec<Occurrence>,
    seen: HashSet<Occurrence>,
}

/// Maps each word to the distinct `(comment, source)` pairs containing it.
///
/// Pairs are kept in first-insertion order. The same comment from two
/// different sources is two entries; collapsing them is the deduplicator's
/// job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceIndex {
    words: HashMap<String, OccurrenceSet>,
}

impl OccurrenceIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `word` occurred in `comment` from `source`.
    ///
    /// Returns `false` if the pair was already recorded for this word.
    pub fn insert(&mut self, word: &str, comment: &str, source: &str) -> bool {
        let set = self.words.entry(word.to_string()).or_default();
        let occurrence = Occurrence::new(comment, source);
        if set.seen.contains(&occurrence) {
            return false;
        }
        set.seen.insert(occurrence.clone());
        set.ordered.push(occurrence);
        true
    }

    /// Occurrences for `word`, empty if the word was never indexed.
    pub fn get(&self, word: &str) -> &[Occurrence] {
        self.words
            .get(word)
            .map(|set| set.ordered.as_slice())
            .unwrap_or_default()
    }

    /// Number of indexed words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
