//! Error types for review-lens-core.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while reading one tabular input file.
///
/// These are always scoped to a single file: callers loading several files
/// report the failure and keep going with the rest.
#[derive(Error, Debug)]
pub enum InputError {
    /// The file could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that failed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not a well-formed table.
    #[error("malformed table: {0}")]
    Csv(#[from] csv::Error),

    /// The file is not a readable spreadsheet workbook.
    #[error("malformed workbook: {0}")]
    Workbook(#[from] calamine::Error),

    /// The workbook contains no worksheets.
    #[error("workbook has no worksheets")]
    NoWorksheet,

    /// The file ended before the header row.
    #[error("no header row found after skipping {offset} leading rows")]
    MissingHeader {
        /// Number of leading rows skipped before the header.
        offset: usize,
    },

    /// No header contains the score marker.
    #[error("no column header contains \"{marker}\"")]
    ScoreColumnMissing {
        /// The marker phrase that was searched for.
        marker: String,
    },

    /// The file exceeds the configured input limit.
    #[error("input too large: {path} is {size} bytes (limit: {limit} bytes)")]
    TooLarge {
        /// The oversized file.
        path: Utf8PathBuf,
        /// Actual size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: usize,
    },
}

/// Result type alias using [`InputError`].
pub type InputResult<T> = Result<T, InputError>;

/// Errors that can occur while interpreting analysis requests.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnalysisError {
    /// An unknown aggregation scope name was provided.
    #[error("unknown scope: {name}. Use: {available}")]
    UnknownScope {
        /// The scope name that was requested.
        name: String,
        /// Comma-separated list of available scope names.
        available: String,
    },

    /// An unknown category selector was provided.
    #[error("unknown category: {name}. Use: {available}")]
    UnknownCategory {
        /// The category name that was requested.
        name: String,
        /// Comma-separated list of available category names.
        available: String,
    },

    /// An unknown highlight markup was provided.
    #[error("unknown markup: {0}. Use: html, plain")]
    UnknownMarkup(String),
}
