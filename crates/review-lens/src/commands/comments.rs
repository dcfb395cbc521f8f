//! Comments command: drill down from a word to the reviews behind it.

use clap::{Args, ValueEnum};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use tracing::{debug, instrument};

use review_lens_core::{Config, Highlighter, Markup, Occurrence, Scope, dedupe};

use super::{DataArgs, open_session};

/// How highlighted words are marked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MarkupChoice {
    /// Bold red when the terminal supports color.
    #[default]
    Terminal,
    /// HTML spans, for pasting into web pages.
    Html,
    /// 【word】 brackets.
    Plain,
}

impl MarkupChoice {
    fn markup(self) -> Markup {
        match self {
            Self::Terminal => Markup::Custom(Box::new(|word: &str| {
                word.if_supports_color(Stream::Stdout, |w| w.red().bold().to_string())
                    .to_string()
            })),
            Self::Html => Markup::Html,
            Self::Plain => Markup::Plain,
        }
    }
}

/// Arguments for the `comments` subcommand.
#[derive(Args, Debug)]
pub struct CommentsArgs {
    /// Input files and filters.
    #[command(flatten)]
    pub data: DataArgs,

    /// Word to look up (repeatable).
    #[arg(short, long = "word", required = true)]
    pub words: Vec<String>,

    /// Scope to look the words up in.
    #[arg(long, value_enum, default_value_t = Scope::Overall)]
    pub scope: Scope,

    /// Highlight style.
    #[arg(long, value_enum, default_value_t)]
    pub markup: MarkupChoice,
}

#[derive(Serialize)]
struct CommentsOutput<'a> {
    scope: Scope,
    words: &'a [String],
    comments: &'a [Occurrence],
}

/// Print the deduplicated comments containing the requested words.
#[instrument(name = "cmd_comments", skip_all, fields(scope = %args.scope))]
pub fn cmd_comments(args: CommentsArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(words = ?args.words, "executing comments command");

    let (session, _outcomes) = open_session(&args.data, config, !global_json)?;
    let analysis = session.analyze(&args.data.filter());

    let matched: Vec<Occurrence> = args
        .words
        .iter()
        .flat_map(|word| analysis.comments_for(args.scope, word))
        .collect();
    let comments = dedupe(&matched);

    if global_json {
        let output = CommentsOutput {
            scope: args.scope,
            words: &args.words,
            comments: &comments,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if comments.is_empty() {
        println!(
            "{}",
            format!(
                "no data: no {} comments contain {}",
                args.scope,
                args.words.join(", ")
            )
            .yellow()
        );
        return Ok(());
    }

    let targets: Vec<&str> = args.words.iter().map(String::as_str).collect();
    let highlighter = Highlighter::new(args.markup.markup());
    for (i, occurrence) in comments.iter().enumerate() {
        if i > 0 {
            println!();
        }
        match args.markup {
            MarkupChoice::Terminal => {
                println!("{}", highlighter.highlight(&occurrence.comment, &targets));
                if !occurrence.source.is_empty() {
                    println!(
                        "{}",
                        format!("来源: {}", occurrence.source)
                            .if_supports_color(Stream::Stdout, |s| s.dimmed().to_string())
                    );
                }
            }
            MarkupChoice::Html | MarkupChoice::Plain => {
                println!("{}", highlighter.render(occurrence, &targets));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_markup_keeps_the_word() {
        let highlighter = Highlighter::new(MarkupChoice::Terminal.markup());
        let out = highlighter.highlight("导游很差", &["很差"]);
        assert!(out.starts_with("导游"));
        assert!(out.contains("很差"));
    }

    #[test]
    fn plain_markup_brackets_words() {
        let highlighter = Highlighter::new(MarkupChoice::Plain.markup());
        assert_eq!(highlighter.highlight("导游很差", &["很差"]), "导游【很差】");
    }
}
