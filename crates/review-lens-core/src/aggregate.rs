//! Tokenization and per-scope aggregation.
//!
//! One pass over the filtered reviews fills four scopes at once. Every token
//! that reaches a narrower scope was first counted in [`Scope::Overall`], so
//! the narrower counters are always bounded by the overall one.

use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::AnalysisError;
use crate::frequency::WordFrequency;
use crate::occurrence::OccurrenceIndex;
use crate::record::Review;
use crate::segment::Segmenter;
use crate::stop_words::StopWords;

/// An aggregation scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Scope {
    /// Every qualifying token.
    Overall,
    /// Tokens from reviews scored at or below the low-score threshold.
    LowScore,
    /// Tokens that are suggestion words.
    Suggestion,
    /// Tokens that are negative words.
    Negative,
}

impl Scope {
    /// All scopes, in report order.
    pub const ALL: [Self; 4] = [Self::Overall, Self::LowScore, Self::Suggestion, Self::Negative];

    /// Returns the scope as a kebab-case string slice.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overall => "overall",
            Self::LowScore => "low-score",
            Self::Suggestion => "suggestion",
            Self::Negative => "negative",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "overall" | "all" => Ok(Self::Overall),
            "low-score" | "low" => Ok(Self::LowScore),
            "suggestion" => Ok(Self::Suggestion),
            "negative" => Ok(Self::Negative),
            _ => Err(AnalysisError::UnknownScope {
                name: s.to_string(),
                available: Self::ALL.map(Self::as_str).join(", "),
            }),
        }
    }
}

/// Counts and occurrences for one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeTally {
    /// Token counts.
    pub frequency: WordFrequency,
    /// Comments per token.
    pub occurrences: OccurrenceIndex,
}

impl ScopeTally {
    fn record(&mut self, token: &str, review: &Review<'_>) {
        self.frequency.increment(token);
        self.occurrences.insert(token, review.text, review.source);
    }
}

/// Result of aggregating a set of reviews.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    overall: ScopeTally,
    low_score: ScopeTally,
    suggestion: ScopeTally,
    negative: ScopeTally,
}

impl Aggregation {
    /// The tally for `scope`.
    pub const fn scope(&self, scope: Scope) -> &ScopeTally {
        match scope {
            Scope::Overall => &self.overall,
            Scope::LowScore => &self.low_score,
            Scope::Suggestion => &self.suggestion,
            Scope::Negative => &self.negative,
        }
    }

    fn category_mut(&mut self, category: Category) -> &mut ScopeTally {
        match category {
            Category::Suggestion => &mut self.suggestion,
            Category::Negative => &mut self.negative,
        }
    }

    /// Whether no token qualified at all.
    pub fn is_empty(&self) -> bool {
        self.overall.frequency.is_empty()
    }
}

/// Whether a trimmed token is worth counting.
///
/// Rejects single characters, purely numeric tokens, and stop words.
pub fn qualifies(token: &str, stop_words: &StopWords) -> bool {
    token.chars().nth(1).is_some()
        && !token.chars().all(char::is_numeric)
        && !stop_words.contains(token)
}

/// Tokenizes reviews and accumulates per-scope counts.
pub struct Aggregator<'a> {
    segmenter: &'a dyn Segmenter,
    stop_words: &'a StopWords,
    low_score_threshold: f64,
}

impl<'a> Aggregator<'a> {
    /// Create an aggregator over a segmenter and an effective stop-word set.
    pub fn new(segmenter: &'a dyn Segmenter, stop_words: &'a StopWords, low_score_threshold: f64) -> Self {
        Self {
            segmenter,
            stop_words,
            low_score_threshold,
        }
    }

    /// Aggregate `reviews` in order.
    #[tracing::instrument(skip_all, fields(reviews = reviews.len()))]
    pub fn aggregate(&self, reviews: &[Review<'_>]) -> Aggregation {
        let mut aggregation = Aggregation::default();

        for review in reviews {
            let low_score = review.is_low_score(self.low_score_threshold);
            for raw in self.segmenter.segment(review.text) {
                let token = raw.trim();
                if !qualifies(token, self.stop_words) {
                    continue;
                }

                aggregation.overall.record(token, review);
                if low_score {
                    aggregation.low_score.record(token, review);
                }
                for category in Category::ALL {
                    if category.vocabulary().contains_token(token) {
                        aggregation.category_mut(category).record(token, review);
                    }
                }
            }
        }

        tracing::debug!(
            distinct = aggregation.overall.frequency.len(),
            low_score = aggregation.low_score.frequency.len(),
            "aggregation complete"
        );
        aggregation
    }
}
