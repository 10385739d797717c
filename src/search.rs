//! Case-insensitive text search over paragraph content, and find/replace built on top of it.

use crate::document::Document;
use crate::edit_plan::{Edit, IndexRange};
use crate::token::utf16_len;
use serde::Serialize;

/// Characters of surrounding text kept on each side of a match.
pub const CONTEXT_CHARS: usize = 20;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// One occurrence of the query.
pub struct Match {
    /// First position of the match.
    pub start_index: u32,
    /// One past its last position.
    pub end_index: u32,
    /// The matched text as it appears in the document.
    pub text: String,
    /// Up to [`CONTEXT_CHARS`] characters either side, clipped to the paragraph.
    pub context: String,
    /// Start of the paragraph the match sits in.
    pub paragraph_start: u32,
}

impl Match {
    #[must_use]
    /// The matched span.
    pub fn range(&self) -> IndexRange {
        IndexRange::new(self.start_index, self.end_index)
    }
}

/// Find every non-overlapping occurrence of `query`, ignoring case.
///
/// Only paragraphs starting inside `within` are scanned when a bound is given; table cells are
/// never searched.
#[must_use]
pub fn search(document: &Document, query: &str, within: Option<IndexRange>) -> Vec<Match> {
    let needle: Vec<char> = query.chars().collect();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    for (element, paragraph) in document.paragraphs() {
        if within.is_some_and(|bound| !bound.contains(element.start_index)) {
            continue;
        }

        let mut positioned: Vec<(char, u32)> = Vec::new();
        for run_element in &paragraph.elements {
            let Some(run) = &run_element.text_run else {
                continue;
            };
            let mut index = run_element.start_index;
            for ch in run.content.chars() {
                positioned.push((ch, index));
                index += u32::try_from(ch.len_utf16()).unwrap_or(1);
            }
        }

        let mut i = 0;
        while i + needle.len() <= positioned.len() {
            let window = &positioned[i..i + needle.len()];
            let hit = window
                .iter()
                .zip(&needle)
                .all(|((ch, _), wanted)| same_letter(*ch, *wanted));
            if !hit {
                i += 1;
                continue;
            }

            let (last_char, last_index) = window[window.len() - 1];
            let before = i.saturating_sub(CONTEXT_CHARS);
            let after = (i + needle.len() + CONTEXT_CHARS).min(positioned.len());
            let context: String = positioned[before..after].iter().map(|(ch, _)| ch).collect();
            matches.push(Match {
                start_index: window[0].1,
                end_index: last_index + u32::try_from(last_char.len_utf16()).unwrap_or(1),
                text: window.iter().map(|(ch, _)| ch).collect(),
                context: context.trim_end_matches('\n').to_string(),
                paragraph_start: element.start_index,
            });
            i += needle.len();
        }
    }
    matches
}

fn same_letter(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Edits replacing every match with `replacement`, valid against the searched snapshot.
///
/// `matches` must be in ascending document order and non-overlapping, as [`search`] returns them.
/// All deletions come first in descending position order, so each one only shifts text after
/// positions that are still to be deleted. All insertions follow in ascending order, each
/// placed at its match's original start minus the text removed before it plus the replacement
/// text already inserted before it.
#[must_use]
pub fn replacement_edits(matches: &[Match], replacement: &str) -> Vec<Edit> {
    let mut edits: Vec<Edit> = matches
        .iter()
        .rev()
        .map(|m| Edit::delete_range(m.range()))
        .collect();

    if !replacement.is_empty() {
        let replacement_len = utf16_len(replacement);
        let mut removed = 0;
        let mut inserted = 0;
        for m in matches {
            edits.push(Edit::insert_text(
                m.start_index - removed + inserted,
                replacement,
            ));
            removed += m.range().len();
            inserted += replacement_len;
        }
    }
    edits
}

#[cfg(test)]
#[path = "tests/search.rs"]
mod tests;
