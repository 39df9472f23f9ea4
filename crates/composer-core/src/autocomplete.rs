use std::sync::OnceLock;

use regex_lite::Regex;

use crate::boundary::{next_grapheme_end, previous_grapheme_start, word_start_before};
use crate::config::ComposerConfig;
use crate::core::{Document, Node, Point, Selection, TextRange};

/// The `@partial` token under the caret, with the candidates it matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocompleteTarget {
    /// Span of the token, trigger character included.
    pub range: TextRange,
    pub partial: String,
    /// Highlighted position in `matches`.
    pub index: usize,
    pub matches: Vec<String>,
}

impl AutocompleteTarget {
    /// Whether the candidate list should be offered. A target without
    /// matches is kept for bookkeeping only.
    pub fn is_active(&self) -> bool {
        !self.matches.is_empty()
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.matches.get(self.index).map(String::as_str)
    }

    pub fn select_next(&mut self) {
        self.index = next_index(self.index, self.matches.len());
    }

    pub fn select_previous(&mut self) {
        self.index = previous_index(self.index, self.matches.len());
    }
}

pub fn next_index(index: usize, len: usize) -> usize {
    if len == 0 || index + 1 >= len {
        0
    } else {
        index + 1
    }
}

pub fn previous_index(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else if index == 0 || index >= len {
        len - 1
    } else {
        index - 1
    }
}

/// Case-insensitive prefix filter over `candidates`, keeping their order.
pub fn filter_candidates(candidates: &[String], partial: &str, max: usize) -> Vec<String> {
    let partial = partial.to_lowercase();
    candidates
        .iter()
        .filter(|candidate| candidate.to_lowercase().starts_with(&partial))
        .take(max)
        .cloned()
        .collect()
}

fn partial_pattern() -> &'static Regex {
    static PARTIAL: OnceLock<Regex> = OnceLock::new();
    PARTIAL.get_or_init(|| Regex::new(r"^\w+$").expect("partial pattern must compile"))
}

/// Recomputes the autocomplete target from scratch.
///
/// The caret must be collapsed inside a text run, directly after
/// `<trigger><word chars>`, and followed by whitespace or nothing. The scan
/// stays inside the caret's run, so a token never reaches across a void.
pub fn derive_autocomplete_state(
    doc: &Document,
    selection: &Selection,
    candidates: &[String],
    config: &ComposerConfig,
) -> Option<AutocompleteTarget> {
    if !selection.is_collapsed() {
        return None;
    }
    let focus = &selection.focus;
    let text = text_at(doc, focus)?;

    let word_before = word_start_before(text, focus.offset)?;
    let before = previous_grapheme_start(text, word_before)?;
    let before_text = text.get(before..focus.offset)?;

    let partial = before_text.strip_prefix(config.trigger)?;
    if !partial_pattern().is_match(partial) {
        return None;
    }

    let after_text = next_grapheme_end(text, focus.offset)
        .and_then(|end| text.get(focus.offset..end))
        .unwrap_or("");
    if !after_text.chars().next().is_none_or(char::is_whitespace) {
        return None;
    }

    Some(AutocompleteTarget {
        range: TextRange::new(Point::new(focus.path.clone(), before), focus.clone()),
        partial: partial.to_string(),
        index: 0,
        matches: filter_candidates(candidates, partial, config.max_candidates),
    })
}

fn text_at<'a>(doc: &'a Document, point: &Point) -> Option<&'a str> {
    let [block_ix, child_ix] = point.path.as_slice() else {
        return None;
    };
    let Node::Paragraph(paragraph) = doc.children.get(*block_ix)? else {
        return None;
    };
    paragraph
        .children
        .get(*child_ix)?
        .as_text()
        .map(|run| run.text.as_str())
}
