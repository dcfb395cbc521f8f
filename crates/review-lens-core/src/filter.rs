//! Record selection by keyword and category.

use serde::{Deserialize, Serialize};

use crate::category::{Category, CategorySelector};
use crate::record::{Record, Review};

/// Keyword and category criteria applied before aggregation.
///
/// Both criteria must hold (logical AND). An empty keyword and an empty or
/// `All`-containing selector list each disable their criterion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Literal, case-sensitive substring the comment must contain.
    pub keyword: Option<String>,
    /// Category selectors; selected vocabularies are unioned.
    pub categories: Vec<CategorySelector>,
}

impl RecordFilter {
    /// A filter that keeps every complete record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the comment to contain `keyword`.
    #[must_use]
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Restrict to comments mentioning words from the selected categories.
    #[must_use]
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = CategorySelector>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    /// The categories actually narrowing the selection, or `None` when
    /// category filtering is off.
    fn active_categories(&self) -> Option<Vec<Category>> {
        if self.categories.is_empty() || self.categories.contains(&CategorySelector::All) {
            return None;
        }
        let mut selected: Vec<Category> = Vec::new();
        for category in self.categories.iter().filter_map(|s| s.category()) {
            if !selected.contains(&category) {
                selected.push(category);
            }
        }
        Some(selected)
    }

    fn passes(&self, text: &str, categories: Option<&[Category]>) -> bool {
        if let Some(keyword) = self.keyword.as_deref().filter(|k| !k.is_empty())
            && !text.contains(keyword)
        {
            return false;
        }
        categories.is_none_or(|selected| {
            selected
                .iter()
                .any(|category| category.vocabulary().appears_in(text))
        })
    }

    /// Whether a comment passes both criteria.
    ///
    /// For many comments prefer [`apply`](Self::apply), which resolves the
    /// category selection once.
    pub fn matches(&self, text: &str) -> bool {
        self.passes(text, self.active_categories().as_deref())
    }

    /// Select the complete records that pass the filter, in input order.
    ///
    /// Records with missing text or score are always dropped.
    #[tracing::instrument(skip(records), fields(records = records.len()))]
    pub fn apply<'a>(&self, records: &'a [Record]) -> Vec<Review<'a>> {
        let categories = self.active_categories();
        let reviews: Vec<Review<'a>> = records
            .iter()
            .filter_map(Record::as_review)
            .filter(|review| self.passes(review.text, categories.as_deref()))
            .collect();
        tracing::debug!(kept = reviews.len(), "records filtered");
        reviews
    }
}
