//! Input rows and the validated reviews derived from them.

use serde::{Deserialize, Serialize};

/// Source label used when rows do not come from a named file.
pub const DEFAULT_SOURCE: &str = "upload";

/// Scores at or below this value count as low-score reviews.
pub const DEFAULT_LOW_SCORE_THRESHOLD: f64 = 3.0;

/// One input row as read from a table.
///
/// Either field may be missing; such rows are carried through loading so
/// row counts stay faithful, and dropped by the record filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Free-text comment, if the cell was non-empty.
    pub text: Option<String>,
    /// Numeric score, if the cell parsed as a number.
    pub score: Option<f64>,
    /// Label of the file the row came from.
    pub source: String,
    /// Route or product name, when the table has such a column.
    pub route: Option<String>,
}

impl Record {
    /// Create a complete record with the default source label.
    pub fn new(text: impl Into<String>, score: f64) -> Self {
        Self {
            text: Some(text.into()),
            score: Some(score),
            source: DEFAULT_SOURCE.to_string(),
            route: None,
        }
    }

    /// Set the source label.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the route name.
    #[must_use]
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// View this record as a [`Review`] if both text and score are usable.
    ///
    /// Whitespace-only text and NaN scores count as missing.
    pub fn as_review(&self) -> Option<Review<'_>> {
        let text = self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        let score = self.score.filter(|s| !s.is_nan())?;
        Some(Review {
            text,
            score,
            source: &self.source,
            route: self.route.as_deref(),
        })
    }
}

/// A record with guaranteed text and score, borrowed from its [`Record`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Review<'a> {
    /// Trimmed comment text, never empty.
    pub text: &'a str,
    /// Numeric score.
    pub score: f64,
    /// Source label.
    pub source: &'a str,
    /// Route name, if present.
    pub route: Option<&'a str>,
}

impl Review<'_> {
    /// Whether this review falls in the low-score subset.
    pub fn is_low_score(&self, threshold: f64) -> bool {
        self.score <= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_record_becomes_review() {
        let record = Record::new("  很好，非常推荐 ", 5.0).with_source("a.csv");
        let review = record.as_review().unwrap();
        assert_eq!(review.text, "很好，非常推荐");
        assert_eq!(review.source, "a.csv");
        assert!(review.route.is_none());
    }

    #[test]
    fn missing_fields_are_rejected() {
        let no_text = Record {
            text: None,
            ..Record::new("", 1.0)
        };
        assert!(no_text.as_review().is_none());

        let blank_text = Record::new("   ", 1.0);
        assert!(blank_text.as_review().is_none());

        let no_score = Record {
            score: None,
            ..Record::new("不错", 1.0)
        };
        assert!(no_score.as_review().is_none());

        let nan_score = Record::new("不错", f64::NAN);
        assert!(nan_score.as_review().is_none());
    }

    #[test]
    fn low_score_boundary_is_inclusive() {
        let record = Record::new("一般", 3.0);
        let review = record.as_review().unwrap();
        assert!(review.is_low_score(DEFAULT_LOW_SCORE_THRESHOLD));
        let record = Record::new("一般", 3.5);
        assert!(!record.as_review().unwrap().is_low_score(DEFAULT_LOW_SCORE_THRESHOLD));
    }
}
