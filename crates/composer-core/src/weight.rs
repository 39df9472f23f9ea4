use crate::core::{Document, Node};

/// Budget cost of one custom emoji, whatever its name.
pub const EMOJI_WEIGHT: usize = 5;

/// Budget cost of `node`: characters for text, [`EMOJI_WEIGHT`] for an
/// emoji, and the length of `@name` for a mention.
pub fn weighted_length(node: &Node) -> usize {
    match node {
        Node::Text(run) => text_weight(&run.text),
        Node::Paragraph(paragraph) => paragraph.children.iter().map(weighted_length).sum(),
        Node::Emoji(_) => EMOJI_WEIGHT,
        Node::Mention(mention) => mention_weight(&mention.display_name),
    }
}

pub fn document_weighted_length(doc: &Document) -> usize {
    doc.children.iter().map(weighted_length).sum()
}

pub fn text_weight(text: &str) -> usize {
    text.chars().count()
}

pub fn mention_weight(display_name: &str) -> usize {
    1 + text_weight(display_name)
}
