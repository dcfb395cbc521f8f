//! Reading review tables.
//!
//! A table has a fixed number of leading rows (titles, export notes) before
//! its header row. The comment is always the first column. The score column
//! is the first whose header contains the score marker, and the optional
//! route column the first whose header contains the route marker.
//!
//! Column resolution happens once per file, in [`ColumnLayout::resolve`].
//! CSV exports (UTF-8 or GBK) and spreadsheet workbooks go through the same
//! row handling.

use std::borrow::Cow;

use calamine::{Data, Reader, open_workbook_auto};
use camino::{Utf8Path, Utf8PathBuf};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{InputError, InputResult};
use crate::record::Record;

/// Default number of rows skipped before the header row.
pub const DEFAULT_HEADER_OFFSET: usize = 5;

/// Default phrase identifying the overall score column.
pub const DEFAULT_SCORE_MARKER: &str = "总安排打分";

/// Default phrase identifying the route/product name column.
pub const DEFAULT_ROUTE_MARKER: &str = "线路名称";

/// How to locate the header and columns in a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    /// Rows to skip before the header row.
    pub header_offset: usize,
    /// Phrase the score column header must contain.
    pub score_marker: String,
    /// Phrase the route column header must contain, if grouping by route.
    pub route_marker: Option<String>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            header_offset: DEFAULT_HEADER_OFFSET,
            score_marker: DEFAULT_SCORE_MARKER.to_string(),
            route_marker: Some(DEFAULT_ROUTE_MARKER.to_string()),
        }
    }
}

/// Resolved column positions for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Comment column (always the first).
    pub comment: usize,
    /// Score column.
    pub score: usize,
    /// Route column, when present.
    pub route: Option<usize>,
}

impl ColumnLayout {
    /// Locate the columns in a header row.
    ///
    /// Fails with [`InputError::ScoreColumnMissing`] when no header contains
    /// the score marker. A missing route column is not an error.
    pub fn resolve<S: AsRef<str>>(headers: &[S], options: &TableOptions) -> InputResult<Self> {
        let find = |marker: &str| {
            headers
                .iter()
                .position(|h| h.as_ref().contains(marker))
        };

        let score = find(&options.score_marker).ok_or_else(|| InputError::ScoreColumnMissing {
            marker: options.score_marker.clone(),
        })?;
        let route = options
            .route_marker
            .as_deref()
            .filter(|m| !m.is_empty())
            .and_then(find);

        Ok(Self {
            comment: 0,
            score,
            route,
        })
    }
}

/// Rows read from one or more tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Header row of the first table read.
    pub headers: Vec<String>,
    /// Rows in file order, files concatenated in load order.
    pub records: Vec<Record>,
}

impl Dataset {
    /// Append another dataset's rows after this one's.
    pub fn merge(&mut self, other: Self) {
        if self.headers.is_empty() {
            self.headers = other.headers;
        }
        self.records.extend(other.records);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn cell(row: &[String], index: usize) -> Option<String> {
    row.get(index)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_score(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Turn a header row followed by data rows into a dataset.
///
/// Shared by every table format, so column resolution and cell handling
/// are the same whatever the file type.
fn collect_rows<I>(mut rows: I, source: &str, options: &TableOptions) -> InputResult<Dataset>
where
    I: Iterator<Item = InputResult<Vec<String>>>,
{
    let header_row = rows.next().transpose()?.ok_or(InputError::MissingHeader {
        offset: options.header_offset,
    })?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    let layout = ColumnLayout::resolve(&headers, options)?;
    tracing::debug!(?layout, "resolved columns");

    let mut records = Vec::new();
    for row in rows {
        let row = row?;
        records.push(Record {
            text: cell(&row, layout.comment),
            score: cell(&row, layout.score).as_deref().and_then(parse_score),
            source: source.to_string(),
            route: layout.route.and_then(|i| cell(&row, i)),
        });
    }

    tracing::info!(rows = records.len(), "table read");
    Ok(Dataset { headers, records })
}

/// Skip `count` physical lines, blank ones included.
///
/// Returns `None` when the text runs out first.
fn skip_lines(text: &str, count: usize) -> Option<&str> {
    let mut rest = text;
    for _ in 0..count {
        let newline = rest.find('\n')?;
        rest = &rest[newline + 1..];
    }
    Some(rest)
}

/// Read CSV text, labelling every row with `source`.
///
/// The first `header_offset` physical lines are skipped, blank lines
/// included, before the header row. Empty cells become missing values; a
/// score that does not parse as a number is missing too. Rows stay in file
/// order.
#[tracing::instrument(skip(text, options))]
pub fn read_table(text: &str, source: &str, options: &TableOptions) -> InputResult<Dataset> {
    let text = text.trim_start_matches('\u{feff}');
    let body = skip_lines(text, options.header_offset).ok_or(InputError::MissingHeader {
        offset: options.header_offset,
    })?;

    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());
    let rows = csv.records().map(|row| {
        row.map(|r| r.iter().map(str::to_string).collect())
            .map_err(InputError::from)
    });
    collect_rows(rows, source, options)
}

/// Decode CSV bytes: UTF-8 when valid, otherwise GB18030 (a superset of GBK).
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }
    let (text, had_errors) = encoding_rs::GB18030.decode_without_bom_handling(bytes);
    if had_errors {
        tracing::warn!("input is neither UTF-8 nor GBK; undecodable bytes replaced");
    } else {
        tracing::debug!("decoded input as GBK");
    }
    text
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read the first worksheet of a workbook, labelling every row with `source`.
///
/// Rows count from the top of the sheet, so leading blank rows count toward
/// `header_offset` just as they do in a CSV export.
#[tracing::instrument(skip(path, options), fields(path = %path))]
pub fn read_workbook(path: &Utf8Path, source: &str, options: &TableOptions) -> InputResult<Dataset> {
    let mut workbook = open_workbook_auto(path.as_std_path())?;
    let range = workbook.worksheet_range_at(0).ok_or(InputError::NoWorksheet)??;

    // The range begins at the first non-empty cell, not at A1.
    let (first_row, first_col) = range
        .start()
        .map_or((0, 0), |(row, col)| (row as usize, col as usize));
    let skip = options.header_offset.saturating_sub(first_row);
    if range.is_empty() || skip >= range.height() {
        return Err(InputError::MissingHeader {
            offset: options.header_offset,
        });
    }

    let rows = range.rows().skip(skip).map(|row| {
        let mut cells = vec![String::new(); first_col];
        cells.extend(row.iter().map(cell_text));
        Ok(cells)
    });
    collect_rows(rows, source, options)
}

/// File extensions read as spreadsheet workbooks rather than CSV.
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

fn is_workbook(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| WORKBOOK_EXTENSIONS.iter().any(|w| ext.eq_ignore_ascii_case(w)))
}

/// Source label for a file: its file name, or the full path if it has none.
pub fn source_label(path: &Utf8Path) -> String {
    path.file_name().unwrap_or(path.as_str()).to_string()
}

/// Read one table file, enforcing an optional size limit.
///
/// Workbook extensions are read as spreadsheets; anything else as CSV.
#[tracing::instrument(skip_all, fields(path = %path))]
pub fn load_file(path: &Utf8Path, options: &TableOptions, max_bytes: Option<usize>) -> InputResult<Dataset> {
    let io_err = |source| InputError::Io {
        path: path.to_path_buf(),
        source,
    };

    let metadata = std::fs::metadata(path.as_std_path()).map_err(io_err)?;
    if let Some(limit) = max_bytes
        && metadata.len() > limit as u64
    {
        return Err(InputError::TooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit,
        });
    }

    let source = source_label(path);
    if is_workbook(path) {
        return read_workbook(path, &source, options);
    }
    let bytes = std::fs::read(path.as_std_path()).map_err(io_err)?;
    read_table(&decode_text(&bytes), &source, options)
}

/// Outcome of loading one file in a multi-file batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FileOutcome {
    /// The file that was attempted.
    pub path: String,
    /// Source label its rows carry.
    pub source: String,
    /// Rows read, when loading succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    /// User-facing failure message, when loading failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOutcome {
    /// Whether the file loaded.
    pub const fn is_ok(&self) -> bool {
        self.rows.is_some()
    }
}

/// Load several files, isolating failures per file.
///
/// Rows from the files that load are concatenated in argument order. A file
/// that fails contributes nothing and is reported in its [`FileOutcome`];
/// `on_file` is called after each attempt.
#[tracing::instrument(skip_all, fields(files = paths.len()))]
pub fn load_files<F>(
    paths: &[Utf8PathBuf],
    options: &TableOptions,
    max_bytes: Option<usize>,
    mut on_file: F,
) -> (Dataset, Vec<FileOutcome>)
where
    F: FnMut(&FileOutcome),
{
    let mut dataset = Dataset::default();
    let mut outcomes = Vec::with_capacity(paths.len());

    for path in paths {
        let outcome = match load_file(path, options, max_bytes) {
            Ok(loaded) => {
                let rows = loaded.len();
                dataset.merge(loaded);
                FileOutcome {
                    path: path.to_string(),
                    source: source_label(path),
                    rows: Some(rows),
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "skipping file");
                FileOutcome {
                    path: path.to_string(),
                    source: source_label(path),
                    rows: None,
                    error: Some(e.to_string()),
                }
            }
        };
        on_file(&outcome);
        outcomes.push(outcome);
    }

    (dataset, outcomes)
}
