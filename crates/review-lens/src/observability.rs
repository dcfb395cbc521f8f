//! Logging setup.
//!
//! Events go to stderr at a level chosen by `-q`/`-v`, and to a JSON log
//! file when a log location is configured. The file writer is non-blocking;
//! keep the returned guard alive until exit so buffered lines are flushed.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable naming an explicit log file.
const ENV_LOG_PATH: &str = "REVIEW_LENS_LOG_PATH";

/// Environment variable naming a log directory.
const ENV_LOG_DIR: &str = "REVIEW_LENS_LOG_DIR";

/// File name prefix for daily-rolling logs.
const LOG_FILE_PREFIX: &str = "review-lens.jsonl";

/// Where file logs go, if anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Single log file, never rotated.
    pub log_path: Option<PathBuf>,
    /// Directory for daily-rolling log files.
    pub log_dir: Option<PathBuf>,
}

impl ObservabilityConfig {
    /// Read `REVIEW_LENS_LOG_PATH` / `REVIEW_LENS_LOG_DIR`, falling back to
    /// the configured directory.
    pub fn from_env_with_overrides(config_log_dir: Option<PathBuf>) -> Self {
        Self::from_values(
            std::env::var_os(ENV_LOG_PATH).map(PathBuf::from),
            std::env::var_os(ENV_LOG_DIR).map(PathBuf::from),
            config_log_dir,
        )
    }

    fn from_values(
        env_path: Option<PathBuf>,
        env_dir: Option<PathBuf>,
        config_dir: Option<PathBuf>,
    ) -> Self {
        let non_empty = |p: &PathBuf| !p.as_os_str().is_empty();
        let log_path = env_path.filter(non_empty);
        let log_dir = if log_path.is_some() {
            None
        } else {
            env_dir.filter(non_empty).or(config_dir)
        };
        Self { log_path, log_dir }
    }
}

/// Filter for the file log: `RUST_LOG` when set, otherwise the configured
/// level raised or lowered by `-q`/`-v`.
pub fn env_filter(quiet: bool, verbose: u8, level: &str) -> EnvFilter {
    if !quiet
        && verbose == 0
        && let Ok(filter) = EnvFilter::try_from_default_env()
    {
        return filter;
    }
    EnvFilter::new(directive(quiet, verbose, level))
}

fn directive(quiet: bool, verbose: u8, level: &str) -> &str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => level,
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Level for stderr output.
pub const fn console_level(quiet: bool, verbose: u8) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the global subscriber.
///
/// Returns the file writer's guard when file logging is active.
pub fn init_observability(
    config: &ObservabilityConfig,
    env_filter: EnvFilter,
    console: LevelFilter,
) -> anyhow::Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match file_writer(config)? {
        Some((writer, guard)) => {
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(env_filter);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(console);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(guard)
}

fn file_writer(
    config: &ObservabilityConfig,
) -> anyhow::Result<Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)>> {
    let appender = if let Some(ref path) = config.log_path {
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let file_name = path
            .file_name()
            .with_context(|| format!("log path has no file name: {}", path.display()))?;
        ensure_dir(dir)?;
        tracing_appender::rolling::never(dir, file_name)
    } else if let Some(ref dir) = config.log_dir {
        ensure_dir(dir)?;
        tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX)
    } else {
        return Ok(None);
    };
    Ok(Some(tracing_appender::non_blocking(appender)))
}

fn ensure_dir(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins_over_directories() {
        let config = ObservabilityConfig::from_values(
            Some(PathBuf::from("/tmp/one.log")),
            Some(PathBuf::from("/tmp/env")),
            Some(PathBuf::from("/tmp/config")),
        );
        assert_eq!(config.log_path, Some(PathBuf::from("/tmp/one.log")));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn env_dir_wins_over_config_dir() {
        let config = ObservabilityConfig::from_values(
            None,
            Some(PathBuf::from("/tmp/env")),
            Some(PathBuf::from("/tmp/config")),
        );
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/env")));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let config = ObservabilityConfig::from_values(
            Some(PathBuf::new()),
            Some(PathBuf::new()),
            Some(PathBuf::from("/tmp/config")),
        );
        assert!(config.log_path.is_none());
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/config")));
    }

    #[test]
    fn no_locations_means_no_file_logging() {
        let config = ObservabilityConfig::default();
        assert!(file_writer(&config).unwrap().is_none());
    }

    #[test]
    fn flags_pick_directive() {
        assert_eq!(directive(true, 2, "info"), "error");
        assert_eq!(directive(false, 0, "warn"), "warn");
        assert_eq!(directive(false, 1, "info"), "debug");
        assert_eq!(directive(false, 3, "info"), "trace");
    }

    #[test]
    fn console_defaults_to_warn() {
        assert_eq!(console_level(false, 0), LevelFilter::WARN);
        assert_eq!(console_level(true, 0), LevelFilter::ERROR);
        assert_eq!(console_level(false, 1), LevelFilter::DEBUG);
    }
}
