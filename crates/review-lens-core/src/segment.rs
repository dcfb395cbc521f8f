//! Word segmentation backends.
//!
//! Chinese text has no spaces between words, so the default backend is the
//! jieba dictionary/HMM segmenter. The Unicode backend splits on UAX #29
//! word boundaries and keeps runs of CJK ideographs together, which is good
//! enough for pre-spaced text and for builds without the `jieba` feature.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Splits comment text into raw word-like pieces.
///
/// Implementations return untrimmed, unfiltered pieces; length, digit and
/// stop-word filtering happen in the aggregator.
pub trait Segmenter: Send + Sync {
    /// Segment `text` into tokens, in order of appearance.
    fn segment(&self, text: &str) -> Vec<String>;
}

/// Segmentation backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SegmenterKind {
    /// jieba dictionary segmenter (default).
    #[default]
    Jieba,
    /// Unicode word boundaries with CJK runs merged.
    Unicode,
}

impl SegmenterKind {
    /// Returns the backend name as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Jieba => "jieba",
            Self::Unicode => "unicode",
        }
    }

    /// Construct the segmenter for this backend.
    ///
    /// Without the `jieba` feature, `Jieba` falls back to the Unicode
    /// segmenter.
    #[tracing::instrument]
    pub fn build(self) -> Box<dyn Segmenter> {
        match self {
            #[cfg(feature = "jieba")]
            Self::Jieba => Box::new(JiebaSegmenter::new()),
            #[cfg(not(feature = "jieba"))]
            Self::Jieba => {
                tracing::warn!("built without jieba support, using unicode segmenter");
                Box::new(UnicodeSegmenter)
            }
            Self::Unicode => Box::new(UnicodeSegmenter),
        }
    }
}

impl std::fmt::Display for SegmenterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Segmenter backed by `jieba-rs` with HMM enabled for unknown words.
#[cfg(feature = "jieba")]
pub struct JiebaSegmenter {
    jieba: jieba_rs::Jieba,
}

#[cfg(feature = "jieba")]
impl JiebaSegmenter {
    /// Load the bundled dictionary.
    pub fn new() -> Self {
        tracing::debug!("loading jieba dictionary");
        Self {
            jieba: jieba_rs::Jieba::new(),
        }
    }
}

#[cfg(feature = "jieba")]
impl Default for JiebaSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "jieba")]
impl Segmenter for JiebaSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        self.jieba
            .cut(text, true)
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

/// Segmenter using Unicode word boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSegmenter;

impl Segmenter for UnicodeSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut run = String::new();

        for piece in text.split_word_bounds() {
            if piece.chars().all(is_cjk_ideograph) {
                run.push_str(piece);
                continue;
            }
            if !run.is_empty() {
                tokens.push(std::mem::take(&mut run));
            }
            if piece.chars().any(char::is_alphanumeric) {
                tokens.push(piece.to_string());
            }
        }
        if !run.is_empty() {
            tokens.push(run);
        }

        tokens
    }
}

const fn is_cjk_ideograph(c: char) -> bool {
    matches!(
        c,
        '\u{4E00}'..='\u{9FFF}'
            | '\u{3400}'..='\u{4DBF}'
            | '\u{F900}'..='\u{FAFF}'
            | '\u{20000}'..='\u{2A6DF}'
    )
}
