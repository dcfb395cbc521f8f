//! Core library for review-lens.
//!
//! Word-frequency and keyword drill-down analysis over review tables: each
//! row carries a free-text comment and a numeric score. Comments are
//! segmented into words, counted per scope (overall, low-score, suggestion,
//! negative), and every counted word keeps the comments it came from.
//!
//! # Modules
//!
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//! - [`table`] - Reading review tables into [`Record`]s
//! - [`filter`] - Keyword and category record filtering
//! - [`segment`] - Word segmentation backends
//! - [`aggregate`] - Per-scope word counting
//! - [`dedupe`] - Collapsing near-duplicate comments
//! - [`highlight`] - Marking words in display text
//! - [`session`] - Stop words and loaded data across requests
//!
//! # Quick Start
//!
//! ```no_run
//! use review_lens_core::{RecordFilter, Scope, Session, SessionOptions};
//!
//! let mut session = Session::new(SessionOptions::default());
//! session.load_files(&["may.csv".into()], |_| {});
//!
//! let analysis = session.analyze(&RecordFilter::new());
//! for word in analysis.top_words(Scope::LowScore, 10) {
//!     println!("{} {}", word.count, word.word);
//! }
//! ```
#![deny(unsafe_code)]

pub mod aggregate;
pub mod category;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod filter;
pub mod frequency;
pub mod highlight;
pub mod occurrence;
pub mod record;
pub mod report;
pub mod segment;
pub mod session;
pub mod stop_words;
pub mod table;
pub mod word_lists;

/// Default maximum size of one input file: 5 MiB.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 5 * 1024 * 1024;

pub use aggregate::{Aggregation, Aggregator, Scope};
pub use category::{Category, CategorySelector};
pub use config::{Config, ConfigLoader, ConfigSources, LogLevel};
pub use dedupe::dedupe;
pub use error::{AnalysisError, ConfigError, ConfigResult, InputError, InputResult};
pub use filter::RecordFilter;
pub use frequency::{WordCount, WordFrequency};
pub use highlight::{Highlighter, Markup};
pub use occurrence::{Occurrence, OccurrenceIndex};
pub use record::{Record, Review};
pub use report::{AnalysisReport, ReviewStats, RouteSummary, ScopeReport};
pub use segment::{Segmenter, SegmenterKind};
pub use session::{Analysis, Session, SessionOptions};
pub use stop_words::StopWords;
pub use table::{Dataset, FileOutcome, TableOptions};
