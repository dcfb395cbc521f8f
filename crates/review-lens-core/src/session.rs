//! Analysis sessions.
//!
//! A [`Session`] owns everything that survives between requests: the loaded
//! rows, the user's stop words, and the segmenter. Each call to
//! [`Session::analyze`] recomputes filter, aggregation and reports from
//! scratch.

use std::collections::HashMap;

use camino::Utf8PathBuf;

use crate::aggregate::{Aggregation, Aggregator, Scope};
use crate::config::Config;
use crate::dedupe::dedupe;
use crate::filter::RecordFilter;
use crate::frequency::WordCount;
use crate::occurrence::Occurrence;
use crate::record::{DEFAULT_LOW_SCORE_THRESHOLD, Review};
use crate::report::{AnalysisReport, ReviewStats, RouteSummary, ScopeReport, round2};
use crate::segment::{Segmenter, SegmenterKind};
use crate::stop_words::StopWords;
use crate::table::{self, Dataset, FileOutcome, TableOptions};

/// Settings fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    /// Scores at or below this are low-score.
    pub low_score_threshold: f64,
    /// Segmentation backend.
    pub segmenter: SegmenterKind,
    /// Table layout.
    pub table: TableOptions,
    /// Per-file size limit.
    pub max_input_bytes: Option<usize>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            low_score_threshold: DEFAULT_LOW_SCORE_THRESHOLD,
            segmenter: SegmenterKind::default(),
            table: TableOptions::default(),
            max_input_bytes: Some(crate::DEFAULT_MAX_INPUT_BYTES),
        }
    }
}

impl SessionOptions {
    /// Derive session options from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            low_score_threshold: config.low_score_threshold,
            segmenter: config.segmenter,
            table: config.table_options(),
            max_input_bytes: config.max_input(),
        }
    }
}

/// One interactive analysis session.
pub struct Session {
    options: SessionOptions,
    segmenter: Box<dyn Segmenter>,
    stop_words: StopWords,
    dataset: Dataset,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("options", &self.options)
            .field("stop_words", &self.stop_words)
            .field("rows", &self.dataset.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start a session with the configured segmenter and no data.
    pub fn new(options: SessionOptions) -> Self {
        let segmenter = options.segmenter.build();
        Self::with_segmenter(options, segmenter)
    }

    /// Start a session with an explicit segmenter.
    pub fn with_segmenter(options: SessionOptions, segmenter: Box<dyn Segmenter>) -> Self {
        Self {
            options,
            segmenter,
            stop_words: StopWords::new(),
            dataset: Dataset::default(),
        }
    }

    /// Session settings.
    pub const fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// The stop-word set.
    pub const fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    /// The stop-word set, for add/remove/clear.
    pub const fn stop_words_mut(&mut self) -> &mut StopWords {
        &mut self.stop_words
    }

    /// Rows loaded so far.
    pub const fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Append rows to the session.
    pub fn extend(&mut self, dataset: Dataset) {
        self.dataset.merge(dataset);
    }

    /// Drop all loaded rows.
    pub fn clear_dataset(&mut self) {
        self.dataset = Dataset::default();
    }

    /// Load table files and append the rows of those that succeed.
    pub fn load_files<F>(&mut self, paths: &[Utf8PathBuf], on_file: F) -> Vec<FileOutcome>
    where
        F: FnMut(&FileOutcome),
    {
        let (dataset, outcomes) = table::load_files(
            paths,
            &self.options.table,
            self.options.max_input_bytes,
            on_file,
        );
        self.extend(dataset);
        outcomes
    }

    /// Filter and aggregate the loaded rows.
    #[tracing::instrument(skip_all, fields(rows = self.dataset.len(), keyword = ?filter.keyword))]
    pub fn analyze(&self, filter: &RecordFilter) -> Analysis<'_> {
        let reviews = filter.apply(&self.dataset.records);
        let aggregation = Aggregator::new(
            self.segmenter.as_ref(),
            &self.stop_words,
            self.options.low_score_threshold,
        )
        .aggregate(&reviews);

        let usable_rows = self
            .dataset
            .records
            .iter()
            .filter(|r| r.as_review().is_some())
            .count();

        Analysis {
            total_rows: self.dataset.len(),
            usable_rows,
            low_score_threshold: self.options.low_score_threshold,
            reviews,
            aggregation,
        }
    }
}

/// The result of one filter + aggregate pass.
#[derive(Debug)]
pub struct Analysis<'a> {
    total_rows: usize,
    usable_rows: usize,
    low_score_threshold: f64,
    reviews: Vec<Review<'a>>,
    aggregation: Aggregation,
}

impl<'a> Analysis<'a> {
    /// Reviews that passed the filter.
    pub fn reviews(&self) -> &[Review<'a>] {
        &self.reviews
    }

    /// Per-scope counters and occurrence indices.
    pub const fn aggregation(&self) -> &Aggregation {
        &self.aggregation
    }

    /// Whether no word qualified.
    pub fn is_empty(&self) -> bool {
        self.aggregation.is_empty()
    }

    /// Highest-count words for `scope`.
    pub fn top_words(&self, scope: Scope, n: usize) -> Vec<WordCount> {
        self.aggregation.scope(scope).frequency.top_k(n)
    }

    /// Deduplicated comments containing `word` within `scope`.
    pub fn comments_for(&self, scope: Scope, word: &str) -> Vec<Occurrence> {
        dedupe(self.aggregation.scope(scope).occurrences.get(word))
    }

    /// Row and review counts.
    pub fn stats(&self) -> ReviewStats {
        ReviewStats {
            total_rows: self.total_rows,
            usable_rows: self.usable_rows,
            matched_reviews: self.reviews.len(),
            low_score_reviews: self
                .reviews
                .iter()
                .filter(|r| r.is_low_score(self.low_score_threshold))
                .count(),
        }
    }

    /// Per-route summaries in first-seen order.
    pub fn routes(&self) -> Vec<RouteSummary> {
        let mut order: Vec<&str> = Vec::new();
        let mut totals: HashMap<&str, (usize, usize, f64)> = HashMap::new();

        for review in &self.reviews {
            let Some(route) = review.route else { continue };
            let entry = totals.entry(route).or_insert_with(|| {
                order.push(route);
                (0, 0, 0.0)
            });
            entry.0 += 1;
            if review.is_low_score(self.low_score_threshold) {
                entry.1 += 1;
            }
            entry.2 += review.score;
        }

        order
            .into_iter()
            .map(|route| {
                let (reviews, low, sum) = totals[route];
                RouteSummary {
                    route: route.to_string(),
                    reviews,
                    low_score_reviews: low,
                    mean_score: round2(sum / reviews as f64),
                }
            })
            .collect()
    }

    /// Build the full report with `top_n` words per scope.
    pub fn report(&self, top_n: usize) -> AnalysisReport {
        let scopes = Scope::ALL
            .into_iter()
            .map(|scope| {
                let frequency = &self.aggregation.scope(scope).frequency;
                ScopeReport {
                    scope,
                    distinct_words: frequency.len(),
                    total_tokens: frequency.total(),
                    top_words: frequency.top_k(top_n),
                }
            })
            .collect();

        AnalysisReport {
            stats: self.stats(),
            routes: self.routes(),
            scopes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategorySelector;
    use crate::record::Record;
    use crate::segment::UnicodeSegmenter;

    fn session(records: Vec<Record>) -> Session {
        let mut session = Session::with_segmenter(SessionOptions::default(), Box::new(UnicodeSegmenter));
        session.extend(Dataset {
            headers: Vec::new(),
            records,
        });
        session
    }

    #[test]
    fn whitespace_duplicates_collapse_when_shown() {
        let session = session(vec![
            Record::new("很好 非常推荐", 5.0),
            Record::new("很好 非常推荐 ", 2.0),
            Record::new("很好   非常推荐", 4.0),
        ]);
        let analysis = session.analyze(&RecordFilter::new());
        let shown = analysis.comments_for(Scope::Overall, "很好");
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].comment, "很好   非常推荐");
    }

    #[test]
    fn whitespace_variants_split_by_score() {
        let session = session(vec![
            Record::new("很好，非常推荐", 5.0),
            Record::new("很好 非常推荐", 2.0),
        ]);
        let analysis = session.analyze(&RecordFilter::new());
        let low = analysis.top_words(Scope::LowScore, 20);
        assert_eq!(
            low.iter().map(|w| w.word.as_str()).collect::<Vec<_>>(),
            vec!["很好", "非常推荐"]
        );
        assert!(low.iter().all(|w| w.count == 1));
        let low_comments = analysis.comments_for(Scope::LowScore, "很好");
        assert_eq!(low_comments.len(), 1);
        assert_eq!(low_comments[0].comment, "很好 非常推荐");
    }

    #[test]
    fn same_comment_in_two_files_shows_once_with_first_source() {
        let session = session(vec![
            Record::new("导游 热情", 5.0).with_source("a.csv"),
            Record::new("导游 热情", 5.0).with_source("b.csv"),
        ]);
        let analysis = session.analyze(&RecordFilter::new());
        let index = analysis.aggregation().scope(Scope::Overall);
        assert_eq!(index.occurrences.get("导游").len(), 2);

        let shown = analysis.comments_for(Scope::Overall, "导游");
        assert_eq!(shown, vec![Occurrence::new("导游 热情", "a.csv")]);
    }

    #[test]
    fn stop_words_added_mid_session_apply_to_next_analysis() {
        let mut session = session(vec![Record::new("行程 导游", 4.0)]);
        assert_eq!(session.analyze(&RecordFilter::new()).top_words(Scope::Overall, 20).len(), 2);

        session.stop_words_mut().add("行程");
        let after = session.analyze(&RecordFilter::new()).top_words(Scope::Overall, 20);
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].word, "导游");

        session.stop_words_mut().clear();
        assert_eq!(session.analyze(&RecordFilter::new()).top_words(Scope::Overall, 20).len(), 2);
    }

    #[test]
    fn stats_count_rows_usable_matched_and_low() {
        let session = session(vec![
            Record::new("服务 很差", 1.0),
            Record::new("导游 热情", 5.0),
            Record {
                score: None,
                ..Record::new("没有 打分", 1.0)
            },
            Record::new("吃得 差", 3.0),
        ]);
        let analysis = session.analyze(&RecordFilter::new().with_keyword("差"));
        let stats = analysis.stats();
        assert_eq!(stats.total_rows, 4);
        assert_eq!(stats.usable_rows, 3);
        assert_eq!(stats.matched_reviews, 2);
        assert_eq!(stats.low_score_reviews, 2);
    }

    #[test]
    fn routes_are_summarized_in_first_seen_order() {
        let session = session(vec![
            Record::new("好 玩", 5.0).with_route("云南"),
            Record::new("累 了", 2.0).with_route("西藏"),
            Record::new("不错", 4.0).with_route("云南"),
            Record::new("无线路", 4.0),
        ]);
        let routes = session.analyze(&RecordFilter::new()).routes();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].route, "云南");
        assert_eq!(routes[0].reviews, 2);
        assert!((routes[0].mean_score - 4.5).abs() < f64::EPSILON);
        assert_eq!(routes[1].low_score_reviews, 1);
    }

    #[test]
    fn report_covers_every_scope() {
        let session = session(vec![
            Record::new("建议 改进 很差", 2.0),
            Record::new("导游 热情", 5.0),
        ]);
        let report = session
            .analyze(&RecordFilter::new().with_categories([CategorySelector::All]))
            .report(20);
        assert_eq!(report.scopes.len(), Scope::ALL.len());
        assert!(report.has_data());
        assert_eq!(report.scope(Scope::Suggestion).unwrap().distinct_words, 2);
        assert_eq!(report.scope(Scope::Negative).unwrap().total_tokens, 1);
        assert_eq!(report.scope(Scope::Overall).unwrap().distinct_words, 5);
    }

    #[test]
    fn empty_filter_result_is_informational() {
        let session = session(vec![Record::new("导游 热情", 5.0)]);
        let analysis = session.analyze(&RecordFilter::new().with_keyword("不存在"));
        assert!(analysis.is_empty());
        let report = analysis.report(20);
        assert!(!report.has_data());
        assert_eq!(report.stats.matched_reviews, 0);
    }

    #[test]
    fn load_files_appends_across_calls() {
        use std::fs;
        use tempfile::TempDir;

        let tmp = TempDir::new().unwrap();
        let preamble = "a\nb\nc\nd\ne\n";
        let first = tmp.path().join("one.csv");
        fs::write(&first, format!("{preamble}评价内容,总安排打分\n导游 热情,5\n")).unwrap();
        let second = tmp.path().join("two.csv");
        fs::write(&second, format!("{preamble}评价内容,总安排打分\n导游 热情,5\n")).unwrap();

        let mut session = Session::with_segmenter(SessionOptions::default(), Box::new(UnicodeSegmenter));
        let first = Utf8PathBuf::try_from(first).unwrap();
        let second = Utf8PathBuf::try_from(second).unwrap();
        session.load_files(&[first], |_| {});
        session.load_files(&[second], |_| {});
        assert_eq!(session.dataset().len(), 2);

        let analysis = session.analyze(&RecordFilter::new());
        assert_eq!(analysis.comments_for(Scope::Overall, "导游").len(), 1);
        assert_eq!(
            analysis.aggregation().scope(Scope::Overall).occurrences.get("导游").len(),
            2
        );

        session.clear_dataset();
        assert!(session.dataset().is_empty());
    }
}
