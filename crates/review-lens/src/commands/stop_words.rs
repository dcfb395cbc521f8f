//! Stop-words command: show which words are excluded from counts.

use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use review_lens_core::{Config, StopWords};

/// Arguments for the `stop-words` subcommand.
#[derive(Args, Debug, Default)]
pub struct StopWordsArgs {
    /// List only configured and added words, not the built-in set.
    #[arg(long)]
    pub user_only: bool,

    /// Extra words to include, as `analyze --stop-word` would.
    #[arg(long = "stop-word", value_name = "WORDS")]
    pub stop_words: Vec<String>,
}

#[derive(Serialize)]
struct StopWordsOutput<'a> {
    user: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    effective: Option<Vec<&'a str>>,
}

/// Print the effective stop-word set.
#[instrument(name = "cmd_stop_words", skip_all, fields(user_only = args.user_only))]
pub fn cmd_stop_words(args: StopWordsArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(extra = args.stop_words.len(), "executing stop-words command");

    let mut stop_words = StopWords::with_user_words(&config.stop_words);
    for words in &args.stop_words {
        stop_words.add_many(words);
    }

    let output = StopWordsOutput {
        user: stop_words.user_words().collect(),
        effective: (!args.user_only).then(|| stop_words.effective()),
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match output.effective {
        Some(ref effective) => {
            println!(
                "{} {}",
                "Stop words".bold().underline(),
                format!("({} total, {} user)", effective.len(), output.user.len()).dimmed()
            );
            println!("{}", effective.join(" "));
        }
        None if output.user.is_empty() => println!("{}", "no user stop words".dimmed()),
        None => println!("{}", output.user.join(" ")),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_stop_words_text_succeeds() {
        assert!(cmd_stop_words(StopWordsArgs::default(), false, &Config::default()).is_ok());
    }

    #[test]
    fn test_cmd_stop_words_json_user_only() {
        let args = StopWordsArgs {
            user_only: true,
            stop_words: vec!["导游 行程".into()],
        };
        assert!(cmd_stop_words(args, true, &Config::default()).is_ok());
    }
}
