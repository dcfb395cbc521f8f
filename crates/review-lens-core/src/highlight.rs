//! Marking chosen words inside comment text.

use std::borrow::Cow;
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::str::FromStr;

use aho_corasick::AhoCorasick;

use crate::error::AnalysisError;
use crate::occurrence::Occurrence;

/// Opening tag used by [`Markup::Html`].
const HTML_OPEN: &str = r#"<span style="color: red; font-weight: bold;">"#;

/// How marked words and source footers are rendered.
pub enum Markup {
    /// Inline HTML spans and a `<br>` footer.
    Html,
    /// `【word】` brackets and a plain-text footer line.
    Plain,
    /// Caller-supplied word styling (e.g. terminal colors); plain footer.
    Custom(Box<dyn Fn(&str) -> String + Send + Sync>),
}

impl std::fmt::Debug for Markup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Html => f.write_str("Html"),
            Self::Plain => f.write_str("Plain"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl FromStr for Markup {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "plain" | "text" => Ok(Self::Plain),
            _ => Err(AnalysisError::UnknownMarkup(s.to_string())),
        }
    }
}

/// Marks target words in display text.
#[derive(Debug)]
pub struct Highlighter {
    markup: Markup,
}

impl Highlighter {
    /// Create a highlighter with the given markup.
    pub const fn new(markup: Markup) -> Self {
        Self { markup }
    }

    fn mark(&self, word: &str) -> String {
        match &self.markup {
            Markup::Html => format!("{HTML_OPEN}{word}</span>"),
            Markup::Plain => format!("【{word}】"),
            Markup::Custom(style) => style(word),
        }
    }

    /// Escape comment text for the current markup.
    fn escape<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self.markup {
            Markup::Html => html_escape::encode_safe(text),
            Markup::Plain | Markup::Custom(_) => Cow::Borrowed(text),
        }
    }

    /// Mark every occurrence of every target in `text`.
    ///
    /// Matches are found on the original text, so markup inserted for one
    /// target is never rewritten by another. Each target is marked on its
    /// own: a target inside another target's match gets its own mark nested
    /// within the outer one. Two matches that cross are split where the
    /// first one ends. In HTML markup, comment text is escaped.
    pub fn highlight(&self, text: &str, targets: &[&str]) -> String {
        let patterns: Vec<&str> = targets.iter().copied().filter(|t| !t.is_empty()).collect();
        if patterns.is_empty() {
            return self.escape(text).into_owned();
        }
        let matcher = match AhoCorasick::new(&patterns) {
            Ok(matcher) => matcher,
            Err(e) => {
                tracing::warn!(error = %e, "could not build highlight matcher");
                return self.escape(text).into_owned();
            }
        };

        let spans = nest_spans(
            matcher
                .find_overlapping_iter(text)
                .map(|m| (m.start(), m.end())),
        );
        self.render_spans(text, 0, text.len(), &spans)
    }

    /// Render `text[start..end]`, marking `spans` (nested, sorted, in range).
    fn render_spans(&self, text: &str, start: usize, end: usize, spans: &[(usize, usize)]) -> String {
        let mut out = String::with_capacity(end - start);
        let mut cursor = start;
        let mut i = 0;
        while i < spans.len() {
            let (span_start, span_end) = spans[i];
            let inner_len = spans[i + 1..]
                .iter()
                .take_while(|(s, _)| *s < span_end)
                .count();
            out.push_str(&self.escape(&text[cursor..span_start]));
            let inner = self.render_spans(text, span_start, span_end, &spans[i + 1..i + 1 + inner_len]);
            out.push_str(&self.mark(&inner));
            cursor = span_end;
            i += 1 + inner_len;
        }
        out.push_str(&self.escape(&text[cursor..end]));
        out
    }

    /// Footer naming the source file.
    pub fn footer(&self, source: &str) -> String {
        match self.markup {
            Markup::Html => format!(
                r#"<br><small style="color: gray;">来源: {}</small>"#,
                html_escape::encode_safe(source)
            ),
            Markup::Plain | Markup::Custom(_) => format!("\n来源: {source}"),
        }
    }

    /// Highlight a comment and append its source footer when labelled.
    pub fn render(&self, occurrence: &Occurrence, targets: &[&str]) -> String {
        let mut out = self.highlight(&occurrence.comment, targets);
        if !occurrence.source.is_empty() {
            out.push_str(&self.footer(&occurrence.source));
        }
        out
    }
}

/// Turn raw match spans into a properly nested set.
///
/// Output is sorted by start, longer spans first, with every span either
/// inside or disjoint from each earlier one. A span crossing the end of an
/// enclosing span is split at that end.
fn nest_spans(spans: impl IntoIterator<Item = (usize, usize)>) -> Vec<(usize, usize)> {
    let mut pending: BTreeSet<(usize, Reverse<usize>)> =
        spans.into_iter().map(|(s, e)| (s, Reverse(e))).collect();
    let mut enclosing: Vec<usize> = Vec::new();
    let mut nested = Vec::with_capacity(pending.len());

    while let Some((start, Reverse(end))) = pending.pop_first() {
        while enclosing.last().is_some_and(|&outer| outer <= start) {
            enclosing.pop();
        }
        let end = match enclosing.last() {
            Some(&outer) if end > outer => {
                pending.insert((outer, Reverse(end)));
                outer
            }
            _ => end,
        };
        nested.push((start, end));
        enclosing.push(end);
    }
    nested
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(Markup::Html)
    }
}
