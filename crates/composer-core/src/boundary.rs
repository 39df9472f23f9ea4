//! Grapheme and word boundary helpers used for caret-relative scanning.
//!
//! Offsets are byte offsets into a single text run. Scans never cross the
//! run, so a void node next to the run always acts as a boundary.

use unicode_segmentation::UnicodeSegmentation;

/// Start of the grapheme cluster ending at `offset`.
pub fn previous_grapheme_start(text: &str, offset: usize) -> Option<usize> {
    text.get(..offset)?
        .grapheme_indices(true)
        .next_back()
        .map(|(ix, _)| ix)
}

/// End of the grapheme cluster starting at `offset`.
pub fn next_grapheme_end(text: &str, offset: usize) -> Option<usize> {
    text.get(offset..)?
        .graphemes(true)
        .next()
        .map(|grapheme| offset + grapheme.len())
}

/// Start of the word preceding `offset`: non-word graphemes directly before
/// the caret are skipped, then word graphemes are consumed up to the next
/// non-word grapheme.
pub fn word_start_before(text: &str, offset: usize) -> Option<usize> {
    let before = text.get(..offset)?;
    let mut start = None;
    let mut started = false;
    for (ix, grapheme) in before.grapheme_indices(true).rev() {
        if is_word_grapheme(grapheme) {
            started = true;
            start = Some(ix);
        } else if !started {
            start = Some(ix);
        } else {
            break;
        }
    }
    start
}

pub fn is_word_grapheme(grapheme: &str) -> bool {
    grapheme
        .chars()
        .next()
        .is_some_and(|c| !c.is_whitespace() && !is_punctuation(c))
}

// ASCII punctuation plus the general, CJK and fullwidth punctuation blocks.
fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(
            c,
            '¡' | '§'
                | '«'
                | '¶'
                | '·'
                | '»'
                | '¿'
                | '\u{2010}'..='\u{2027}'
                | '\u{2030}'..='\u{205E}'
                | '\u{3001}'..='\u{3003}'
                | '\u{3008}'..='\u{3011}'
                | '\u{3014}'..='\u{301F}'
                | '\u{FF01}'..='\u{FF0F}'
        )
}

pub(crate) fn clamp_to_char_boundary(s: &str, mut ix: usize) -> usize {
    ix = ix.min(s.len());
    while ix > 0 && !s.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}
