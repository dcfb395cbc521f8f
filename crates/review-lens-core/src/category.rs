//! Category vocabularies: suggestion and negative-sentiment words.
//!
//! A vocabulary answers two different questions, and they are kept apart on
//! purpose:
//!
//! - [`Vocabulary::appears_in`] is a substring test over raw comment text,
//!   used by the record filter. A single-character marker such as `差`
//!   matches inside `很差`.
//! - [`Vocabulary::contains_token`] is exact membership, used when tagging
//!   segmented tokens. The token `很差` is only tagged if `很差` itself is
//!   listed.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::LazyLock;

use aho_corasick::AhoCorasick;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::word_lists::{NEGATIVE_WORDS, SUGGESTION_WORDS};

/// A fixed word list with both exact and substring lookups.
#[derive(Debug)]
pub struct Vocabulary {
    words: HashSet<&'static str>,
    matcher: AhoCorasick,
}

impl Vocabulary {
    fn new(words: &'static [&'static str]) -> Self {
        Self {
            words: words.iter().copied().collect(),
            matcher: AhoCorasick::new(words).expect("valid vocabulary"),
        }
    }

    /// Whether `token` is literally one of the vocabulary words.
    pub fn contains_token(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    /// Whether any vocabulary word occurs anywhere inside `text`.
    pub fn appears_in(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }

    /// Number of words in the vocabulary.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

static SUGGESTION: LazyLock<Vocabulary> = LazyLock::new(|| Vocabulary::new(SUGGESTION_WORDS));
static NEGATIVE: LazyLock<Vocabulary> = LazyLock::new(|| Vocabulary::new(NEGATIVE_WORDS));

/// A comment category backed by a fixed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Comments proposing an improvement.
    Suggestion,
    /// Comments describing a bad experience.
    Negative,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Self; 2] = [Self::Suggestion, Self::Negative];

    /// The vocabulary behind this category.
    pub fn vocabulary(self) -> &'static Vocabulary {
        match self {
            Self::Suggestion => &SUGGESTION,
            Self::Negative => &NEGATIVE,
        }
    }

    /// Returns the category as a kebab-case string slice.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Suggestion => "suggestion",
            Self::Negative => "negative",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record-filter selector. `All` disables category filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum CategorySelector {
    /// Keep every record.
    All,
    /// Keep records mentioning a suggestion word.
    Suggestion,
    /// Keep records mentioning a negative word.
    Negative,
}

impl CategorySelector {
    /// The category this selector narrows to, or `None` for `All`.
    pub const fn category(self) -> Option<Category> {
        match self {
            Self::All => None,
            Self::Suggestion => Some(Category::Suggestion),
            Self::Negative => Some(Category::Negative),
        }
    }

    /// Returns the selector as a kebab-case string slice.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Suggestion => "suggestion",
            Self::Negative => "negative",
        }
    }
}

impl FromStr for CategorySelector {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "suggestion" => Ok(Self::Suggestion),
            "negative" => Ok(Self::Negative),
            _ => Err(AnalysisError::UnknownCategory {
                name: s.to_string(),
                available: "all, suggestion, negative".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_test_matches_inside_longer_words() {
        let negative = Category::Negative.vocabulary();
        assert!(negative.appears_in("活动很差，建议改进"));
        assert!(negative.appears_in("差"));
        assert!(!negative.appears_in("非常推荐"));
    }

    #[test]
    fn token_test_is_exact() {
        let suggestion = Category::Suggestion.vocabulary();
        assert!(suggestion.contains_token("建议"));
        assert!(!suggestion.contains_token("建议书"));
        assert!(!suggestion.contains_token("议"));
    }

    #[test]
    fn vocabularies_are_populated() {
        for category in Category::ALL {
            assert!(!category.vocabulary().is_empty());
        }
        assert_eq!(
            Category::Negative.vocabulary().len(),
            NEGATIVE_WORDS.len()
        );
    }

    #[test]
    fn selector_parses_case_insensitively() {
        assert_eq!(
            "Negative".parse::<CategorySelector>().unwrap(),
            CategorySelector::Negative
        );
        assert_eq!(
            " all ".parse::<CategorySelector>().unwrap(),
            CategorySelector::All
        );
    }

    #[test]
    fn selector_rejects_unknown_names() {
        let err = "praise".parse::<CategorySelector>().unwrap_err();
        assert!(err.to_string().contains("praise"));
    }

    #[test]
    fn selector_maps_to_category() {
        assert_eq!(CategorySelector::All.category(), None);
        assert_eq!(
            CategorySelector::Suggestion.category(),
            Some(Category::Suggestion)
        );
    }
}
