//! Command implementations.

use anyhow::bail;
use camino::Utf8PathBuf;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use review_lens_core::{
    CategorySelector, Config, FileOutcome, RecordFilter, SegmenterKind, Session, SessionOptions,
};

pub mod analyze;
pub mod comments;
pub mod info;
#[cfg(feature = "mcp")]
pub mod serve;
pub mod stop_words;

/// Input files and filters shared by the analysis commands.
#[derive(Args, Debug, Clone, Default)]
pub struct DataArgs {
    /// Review tables to load (CSV or xlsx/xls/ods).
    #[arg(required = true, num_args = 1..)]
    pub files: Vec<Utf8PathBuf>,

    /// Keep only comments containing this text.
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Keep only comments mentioning a category word (repeatable or comma-separated).
    #[arg(long, value_enum, value_delimiter = ',')]
    pub category: Vec<CategorySelector>,

    /// Extra stop words for this run (separated by spaces, commas or 、).
    #[arg(long = "stop-word", value_name = "WORDS")]
    pub stop_words: Vec<String>,

    /// Word segmentation backend.
    #[arg(long, value_enum)]
    pub segmenter: Option<SegmenterKind>,

    /// Scores at or below this are low-score.
    #[arg(long)]
    pub threshold: Option<f64>,
}

impl DataArgs {
    /// The record filter these arguments describe.
    pub fn filter(&self) -> RecordFilter {
        let mut filter = RecordFilter::new().with_categories(self.category.clone());
        if let Some(ref keyword) = self.keyword {
            filter = filter.with_keyword(keyword.clone());
        }
        filter
    }

    /// Session options from config, overridden by flags.
    pub fn session_options(&self, config: &Config) -> SessionOptions {
        let mut options = SessionOptions::from_config(config);
        if let Some(segmenter) = self.segmenter {
            options.segmenter = segmenter;
        }
        if let Some(threshold) = self.threshold {
            options.low_score_threshold = threshold;
        }
        options
    }
}

/// Seed a session's user stop words from config and command-line input.
pub fn seed_stop_words<'a, I>(session: &mut Session, config: &Config, extra: I) -> usize
where
    I: IntoIterator<Item = &'a String>,
{
    let stop_words = session.stop_words_mut();
    let from_config: usize = config.stop_words.iter().map(|w| usize::from(stop_words.add(w))).sum();
    let from_args: usize = extra.into_iter().map(|w| stop_words.add_many(w)).sum();
    from_config + from_args
}

/// Build a session and load the requested files.
///
/// Files that fail are reported on stderr and skipped. Fails only when no
/// file could be loaded.
pub fn open_session(
    args: &DataArgs,
    config: &Config,
    show_progress: bool,
) -> anyhow::Result<(Session, Vec<FileOutcome>)> {
    let mut session = Session::new(args.session_options(config));
    seed_stop_words(&mut session, config, &args.stop_words);

    let pb = if show_progress && args.files.len() > 1 {
        let pb = ProgressBar::new(args.files.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{msg} [{bar:30.cyan/blue}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        pb.set_message("loading");
        pb
    } else {
        ProgressBar::hidden()
    };

    let outcomes = session.load_files(&args.files, |outcome| {
        pb.inc(1);
        pb.set_message(outcome.source.clone());
    });
    pb.finish_and_clear();

    for outcome in outcomes.iter().filter(|o| !o.is_ok()) {
        eprintln!(
            "{} {}: {}",
            "skipped".yellow(),
            outcome.path,
            outcome.error.as_deref().unwrap_or_default()
        );
    }

    if !outcomes.iter().any(FileOutcome::is_ok) {
        bail!("none of the {} input file(s) could be loaded", outcomes.len());
    }

    Ok((session, outcomes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TABLE: &str = "导出,1\n说明,2\n说明,3\n说明,4\n说明,5\n评价内容,总安排打分\n导游服务很差,2\n行程安排合理,5\n";

    fn write_table(dir: &TempDir, name: &str) -> Utf8PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, TABLE).unwrap();
        Utf8PathBuf::try_from(path).unwrap()
    }

    #[test]
    fn filter_combines_keyword_and_categories() {
        let args = DataArgs {
            keyword: Some("导游".into()),
            category: vec![CategorySelector::Negative],
            ..DataArgs::default()
        };
        let filter = args.filter();
        assert_eq!(filter.keyword.as_deref(), Some("导游"));
        assert_eq!(filter.categories, vec![CategorySelector::Negative]);
    }

    #[test]
    fn flags_override_config() {
        let args = DataArgs {
            segmenter: Some(SegmenterKind::Unicode),
            threshold: Some(2.0),
            ..DataArgs::default()
        };
        let options = args.session_options(&Config::default());
        assert_eq!(options.segmenter, SegmenterKind::Unicode);
        assert!((options.low_score_threshold - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stop_words_come_from_config_and_args() {
        let config = Config {
            stop_words: vec!["导游".into()],
            ..Config::default()
        };
        let mut session = Session::new(SessionOptions::default());
        let added = seed_stop_words(&mut session, &config, &["行程，酒店".to_string()]);
        assert_eq!(added, 3);
        assert!(session.stop_words().contains("酒店"));
    }

    #[test]
    fn open_session_skips_bad_files() {
        let tmp = TempDir::new().unwrap();
        let good = write_table(&tmp, "good.csv");
        let missing = Utf8PathBuf::try_from(tmp.path().join("missing.csv")).unwrap();
        let args = DataArgs {
            files: vec![missing, good],
            ..DataArgs::default()
        };

        let (session, outcomes) = open_session(&args, &Config::default(), false).unwrap();
        assert_eq!(session.dataset().len(), 2);
        assert!(!outcomes[0].is_ok());
        assert!(outcomes[1].is_ok());
    }

    #[test]
    fn open_session_fails_when_nothing_loads() {
        let tmp = TempDir::new().unwrap();
        let missing = Utf8PathBuf::try_from(tmp.path().join("missing.csv")).unwrap();
        let args = DataArgs {
            files: vec![missing],
            ..DataArgs::default()
        };
        assert!(open_session(&args, &Config::default(), false).is_err());
    }
}
