//! Serializable analysis reports.
//!
//! These are what chart and word-cloud renderers consume, and what the CLI
//! prints with `--json` and the MCP server returns.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::aggregate::Scope;
use crate::frequency::WordCount;

/// Row and review counts for one analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReviewStats {
    /// Rows loaded, including incomplete ones.
    pub total_rows: usize,
    /// Rows with both comment text and a numeric score.
    pub usable_rows: usize,
    /// Usable rows passing the keyword/category filter.
    pub matched_reviews: usize,
    /// Matched reviews scored at or below the low-score threshold.
    pub low_score_reviews: usize,
}

/// Per-route summary over matched reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RouteSummary {
    /// Route or product name.
    pub route: String,
    /// Matched reviews for this route.
    pub reviews: usize,
    /// Of which low-score.
    pub low_score_reviews: usize,
    /// Mean score, rounded to two decimals.
    pub mean_score: f64,
}

/// Top words for one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScopeReport {
    /// The scope.
    pub scope: Scope,
    /// Distinct qualifying words.
    pub distinct_words: usize,
    /// Total qualifying tokens.
    pub total_tokens: usize,
    /// Highest-count words, ties in first-seen order.
    pub top_words: Vec<WordCount>,
}

/// Full analysis report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisReport {
    /// Row and review counts.
    pub stats: ReviewStats,
    /// Per-route summaries, when the table has a route column.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<RouteSummary>,
    /// One entry per scope, in [`Scope::ALL`] order.
    pub scopes: Vec<ScopeReport>,
}

impl AnalysisReport {
    /// The report for `scope`.
    pub fn scope(&self, scope: Scope) -> Option<&ScopeReport> {
        self.scopes.iter().find(|s| s.scope == scope)
    }

    /// Whether any word was counted at all.
    pub fn has_data(&self) -> bool {
        self.scope(Scope::Overall)
            .is_some_and(|s| s.distinct_words > 0)
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_report() -> AnalysisReport {
        AnalysisReport {
            stats: ReviewStats::default(),
            routes: Vec::new(),
            scopes: Scope::ALL
                .into_iter()
                .map(|scope| ScopeReport {
                    scope,
                    distinct_words: 0,
                    total_tokens: 0,
                    top_words: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn empty_report_has_no_data() {
        assert!(!empty_report().has_data());
    }

    #[test]
    fn json_uses_kebab_case_scopes_and_omits_empty_routes() {
        let json = empty_report().to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["scopes"][1]["scope"], "low-score");
        assert!(value.get("routes").is_none());
        assert_eq!(value["stats"]["total_rows"], 0);
    }

    #[test]
    fn round2_rounds_half_away() {
        assert!((round2(3.456) - 3.46).abs() < f64::EPSILON);
        assert!((round2(2.0) - 2.0).abs() < f64::EPSILON);
    }
}
