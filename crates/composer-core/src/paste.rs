use std::borrow::Cow;

use crate::weight::text_weight;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteDecision {
    Accept { weight: usize },
    Reject { weight: usize, remaining: usize },
}

/// All-or-nothing budget check for a plain-text paste. Only the payload's
/// character count matters; a paste that does not fit entirely is refused.
pub fn check_paste(weighted_length: usize, pasted: &str, limit: usize) -> PasteDecision {
    let weight = text_weight(pasted);
    if weighted_length + weight > limit {
        PasteDecision::Reject {
            weight,
            remaining: limit.saturating_sub(weighted_length),
        }
    } else {
        PasteDecision::Accept { weight }
    }
}

/// The composer holds a single paragraph, so pasted line breaks become
/// spaces.
pub fn flatten_line_breaks(text: &str) -> Cow<'_, str> {
    if !text.contains(['\r', '\n']) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", " ").replace(['\r', '\n'], " "))
}
