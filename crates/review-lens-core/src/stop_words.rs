//! Session-scoped stop-word set.
//!
//! The effective set is the built-in list plus words the user adds during a
//! session. Built-in words can never be removed; user words live only as
//! long as the owning [`StopWords`] value.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::word_lists::BUILTIN_STOP_WORDS;

/// Separators accepted when adding several words from one input string.
static WORD_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s,，、;；]+").expect("valid regex"));

/// Split a delimited string (spaces, commas, `、`, `;`) into non-empty words.
pub fn split_words(input: &str) -> impl Iterator<Item = &str> {
    WORD_SEPARATORS.split(input).filter(|word| !word.is_empty())
}

/// Built-in stop words plus a user-managed extension set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWords {
    user: BTreeSet<String>,
}

impl StopWords {
    /// Create a set with only the built-in words.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set seeded with extra user words.
    pub fn with_user_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for word in words {
            set.add(word.as_ref());
        }
        set
    }

    /// Whether `word` is excluded from counting.
    pub fn contains(&self, word: &str) -> bool {
        BUILTIN_STOP_WORDS.contains(word) || self.user.contains(word)
    }

    /// Add one user word. Returns `true` if the effective set changed.
    ///
    /// The word is trimmed; blank words and built-in words are ignored.
    pub fn add(&mut self, word: &str) -> bool {
        let word = word.trim();
        if word.is_empty() || BUILTIN_STOP_WORDS.contains(word) {
            return false;
        }
        let added = self.user.insert(word.to_string());
        if added {
            tracing::debug!(word, "added user stop word");
        }
        added
    }

    /// Add every word in a delimited string (spaces, commas, `、`, `;`).
    ///
    /// Returns the number of words that were newly added.
    pub fn add_many(&mut self, input: &str) -> usize {
        split_words(input).filter(|word| self.add(word)).count()
    }

    /// Remove a user word. Returns `true` if it was present.
    pub fn remove(&mut self, word: &str) -> bool {
        let removed = self.user.remove(word.trim());
        if removed {
            tracing::debug!(word, "removed user stop word");
        }
        removed
    }

    /// Drop all user words, keeping the built-in set.
    pub fn clear(&mut self) {
        tracing::debug!(count = self.user.len(), "cleared user stop words");
        self.user.clear();
    }

    /// User-added words in sorted order.
    pub fn user_words(&self) -> impl Iterator<Item = &str> {
        self.user.iter().map(String::as_str)
    }

    /// Number of user-added words.
    pub fn user_len(&self) -> usize {
        self.user.len()
    }

    /// The full effective set, sorted.
    pub fn effective(&self) -> Vec<&str> {
        let mut words: Vec<&str> = BUILTIN_STOP_WORDS
            .iter()
            .copied()
            .chain(self.user_words())
            .collect();
        words.sort_unstable();
        words
    }
}
