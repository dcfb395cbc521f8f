//! Collapsing near-duplicate comments for display.
//!
//! Spreadsheet exports often repeat a review with incidental whitespace
//! changes. Comments that are equal after whitespace normalization form one
//! group, represented by its longest original text.

use std::collections::HashMap;

use crate::occurrence::Occurrence;

/// Collapse whitespace runs to single spaces and trim the ends.
pub fn normalize_comment(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep one occurrence per normalized comment.
///
/// Within a group the longest original text (in characters) wins, along
/// with its own source label. On equal length the first-seen occurrence
/// wins. Groups are returned in order of their first occurrence.
pub fn dedupe(occurrences: &[Occurrence]) -> Vec<Occurrence> {
    let mut groups: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<Occurrence> = Vec::new();

    for occurrence in occurrences {
        let key = normalize_comment(&occurrence.comment);
        match groups.get(&key) {
            Some(&slot) => {
                if occurrence.comment.chars().count() > kept[slot].comment.chars().count() {
                    kept[slot] = occurrence.clone();
                }
            }
            None => {
                groups.insert(key, kept.len());
                kept.push(occurrence.clone());
            }
        }
    }

    tracing::trace!(before = occurrences.len(), after = kept.len(), "deduplicated comments");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_and_trims() {
        assert_eq!(normalize_comment("  很好   非常\t推荐 \n"), "很好 非常 推荐");
        assert_eq!(normalize_comment("很好\u{3000}推荐"), "很好 推荐");
        assert_eq!(normalize_comment(""), "");
    }

    #[test]
    fn whitespace_variants_collapse_to_longest() {
        let input = vec![
            Occurrence::new("很好 非常推荐", "a.csv"),
            Occurrence::new("很好  非常推荐", "b.csv"),
            Occurrence::new("导游热情", "a.csv"),
        ];
        let out = dedupe(&input);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].comment, "很好  非常推荐");
        assert_eq!(out[0].source, "b.csv");
        assert_eq!(out[1].comment, "导游热情");
    }

    #[test]
    fn punctuation_differences_are_not_collapsed() {
        let input = vec![
            Occurrence::new("很好，非常推荐", "a.csv"),
            Occurrence::new("很好 非常推荐", "a.csv"),
        ];
        assert_eq!(dedupe(&input).len(), 2);
    }

    #[test]
    fn equal_length_keeps_first_seen_source() {
        let input = vec![
            Occurrence::new("导游很好", "first.csv"),
            Occurrence::new("导游很好", "second.csv"),
        ];
        let out = dedupe(&input);
        assert_eq!(out, vec![Occurrence::new("导游很好", "first.csv")]);
    }

    #[test]
    fn dedupe_is_idempotent() {
        let input = vec![
            Occurrence::new("很好 推荐", "a.csv"),
            Occurrence::new(" 很好 推荐", "b.csv"),
            Occurrence::new("很好\n推荐", "c.csv"),
            Occurrence::new("行程合理", "a.csv"),
        ];
        let once = dedupe(&input);
        let twice = dedupe(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_input() {
        assert!(dedupe(&[]).is_empty());
    }
}
