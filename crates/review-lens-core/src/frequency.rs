//! Insertion-ordered word counts and top-K selection.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of words returned by [`WordFrequency::top_k`] when unspecified.
pub const DEFAULT_TOP_N: usize = 20;

/// A word and its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WordCount {
    /// The token.
    pub word: String,
    /// Number of times it was counted.
    pub count: usize,
}

/// Token counts that remember first-encounter order.
///
/// The order matters: [`top_k`](Self::top_k) breaks count ties by it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordFrequency {
    entries: Vec<WordCount>,
    index: HashMap<String, usize>,
}

impl WordFrequency {
    /// Create an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `word`.
    pub fn increment(&mut self, word: &str) {
        if let Some(&slot) = self.index.get(word) {
            self.entries[slot].count += 1;
        } else {
            self.index.insert(word.to_string(), self.entries.len());
            self.entries.push(WordCount {
                word: word.to_string(),
                count: 1,
            });
        }
    }

    /// Count for `word`, zero if never seen.
    pub fn get(&self, word: &str) -> usize {
        self.index
            .get(word)
            .map_or(0, |&slot| self.entries[slot].count)
    }

    /// Whether `word` has been counted.
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been counted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Entries in first-encounter order.
    pub fn iter(&self) -> impl Iterator<Item = &WordCount> {
        self.entries.iter()
    }

    /// The `n` most frequent words, highest count first.
    ///
    /// Equal counts keep first-encounter order. Returns every word when
    /// fewer than `n` exist.
    pub fn top_k(&self, n: usize) -> Vec<WordCount> {
        let mut ranked: Vec<&WordCount> = self.entries.iter().collect();
        // stable: ties stay in insertion order
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.into_iter().take(n).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(words: &[&str]) -> WordFrequency {
        let mut freq = WordFrequency::new();
        for w in words {
            freq.increment(w);
        }
        freq
    }

    fn words(top: &[WordCount]) -> Vec<&str> {
        top.iter().map(|w| w.word.as_str()).collect()
    }

    #[test]
    fn counts_and_lookup() {
        let freq = counter(&["导游", "酒店", "导游"]);
        assert_eq!(freq.get("导游"), 2);
        assert_eq!(freq.get("酒店"), 1);
        assert_eq!(freq.get("景点"), 0);
        assert_eq!(freq.len(), 2);
        assert_eq!(freq.total(), 3);
    }

    #[test]
    fn top_k_sorts_by_count_descending() {
        let freq = counter(&["a1", "b2", "b2", "c3", "c3", "c3"]);
        let top = freq.top_k(DEFAULT_TOP_N);
        assert_eq!(words(&top), vec!["c3", "b2", "a1"]);
        assert_eq!(top[0].count, 3);
    }

    #[test]
    fn ties_keep_first_encounter_order() {
        let freq = counter(&["酒店", "导游", "景点", "导游", "酒店", "景点"]);
        assert_eq!(words(&freq.top_k(3)), vec!["酒店", "导游", "景点"]);
    }

    #[test]
    fn top_k_truncates() {
        let freq = counter(&["a1", "b2", "b2", "c3", "c3", "c3"]);
        assert_eq!(words(&freq.top_k(2)), vec!["c3", "b2"]);
        assert!(freq.top_k(0).is_empty());
    }

    #[test]
    fn top_k_returns_every_word_once_when_n_is_large() {
        let freq = counter(&["x1", "y2", "x1", "z3", "y2", "w4"]);
        let top = freq.top_k(100);
        assert_eq!(top.len(), freq.len());
        let mut seen = words(&top);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), freq.len());
    }

    #[test]
    fn empty_counter_yields_empty_top_k() {
        assert!(WordFrequency::new().top_k(DEFAULT_TOP_N).is_empty());
    }
}
