//! Analyze command: word frequencies per scope.

use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use review_lens_core::{AnalysisReport, Config, FileOutcome, RouteSummary, Scope, ScopeReport};

use super::{DataArgs, open_session};

/// Widest bar in the terminal chart.
const BAR_WIDTH: usize = 30;

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Input files and filters.
    #[command(flatten)]
    pub data: DataArgs,

    /// Scopes to chart (comma-separated). Omit for all scopes.
    #[arg(long, value_enum, value_delimiter = ',')]
    pub scope: Vec<Scope>,

    /// Words per chart.
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Serialize)]
struct AnalyzeOutput<'a> {
    files: &'a [FileOutcome],
    #[serde(flatten)]
    report: &'a AnalysisReport,
}

/// Load the files, count words, and print the top words per scope.
#[instrument(name = "cmd_analyze", skip_all, fields(files = args.data.files.len()))]
pub fn cmd_analyze(args: AnalyzeArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(keyword = ?args.data.keyword, categories = ?args.data.category, "executing analyze command");

    let (session, outcomes) = open_session(&args.data, config, !global_json)?;
    let analysis = session.analyze(&args.data.filter());
    let top_n = args.top.unwrap_or(config.top_n);

    let mut report = analysis.report(top_n);
    if !args.scope.is_empty() {
        report.scopes.retain(|s| args.scope.contains(&s.scope));
    }

    if global_json {
        let output = AnalyzeOutput {
            files: &outcomes,
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if outcomes.len() > 1 {
        for outcome in &outcomes {
            print_outcome(outcome);
        }
        println!();
    }

    let stats = &report.stats;
    println!(
        "{}: {} rows, {} usable, {} matched, {} low-score (<= {})",
        "Reviews".bold(),
        stats.total_rows,
        stats.usable_rows,
        stats.matched_reviews,
        stats.low_score_reviews.red(),
        session.options().low_score_threshold,
    );

    if analysis.is_empty() {
        println!("{}", "no data: no words left after filtering".yellow());
        return Ok(());
    }

    if !report.routes.is_empty() {
        println!();
        println!("{}", "Routes".bold().underline());
        for route in &report.routes {
            print_route(route);
        }
    }

    for scope in &report.scopes {
        println!();
        print_scope(scope);
    }

    Ok(())
}

fn print_outcome(outcome: &FileOutcome) {
    match (outcome.rows, outcome.error.as_deref()) {
        (Some(rows), _) => println!("{} {} ({rows} rows)", "loaded".green(), outcome.path),
        (None, error) => println!(
            "{} {}: {}",
            "failed".red(),
            outcome.path,
            error.unwrap_or_default()
        ),
    }
}

fn print_route(route: &RouteSummary) {
    println!(
        "  {}  {} reviews, {} low-score, mean {:.2}",
        route.route,
        route.reviews,
        route.low_score_reviews,
        route.mean_score
    );
}

fn print_scope(scope: &ScopeReport) {
    println!(
        "{} {}",
        scope.scope.as_str().bold().underline(),
        format!("({} distinct, {} total)", scope.distinct_words, scope.total_tokens).dimmed()
    );
    if scope.top_words.is_empty() {
        println!("  {}", "no data".dimmed());
        return;
    }
    let max = scope.top_words.iter().map(|w| w.count).max().unwrap_or(1);
    for word in &scope.top_words {
        println!(
            "{:>5}  {:<width$}  {}",
            word.count,
            bar(word.count, max),
            word.word,
            width = BAR_WIDTH
        );
    }
}

/// A bar proportional to `count / max`, at least one cell wide.
fn bar(count: usize, max: usize) -> String {
    let cells = if max == 0 {
        0
    } else {
        (count * BAR_WIDTH / max).max(1)
    };
    "█".repeat(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_scales_to_max() {
        assert_eq!(bar(10, 10).chars().count(), BAR_WIDTH);
        assert_eq!(bar(5, 10).chars().count(), BAR_WIDTH / 2);
    }

    #[test]
    fn bar_is_never_empty_for_counted_words() {
        assert_eq!(bar(1, 1000).chars().count(), 1);
    }
}
