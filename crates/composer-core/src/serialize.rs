//! Conversion of the document into the string handed to the chat transport.
//!
//! Nothing is escaped here: text, URLs and names are written as-is and the
//! receiving side is responsible for escaping.

use crate::core::{Document, Node};

pub fn serialize(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

pub fn serialize_document(doc: &Document) -> String {
    let mut out = String::new();
    for block in &doc.children {
        write_node(&mut out, block);
    }
    out
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Text(run) => out.push_str(&run.text),
        Node::Paragraph(paragraph) => {
            out.push_str("<p>");
            for child in &paragraph.children {
                write_node(out, child);
            }
            out.push_str("</p>");
        }
        Node::Emoji(emoji) => {
            out.push_str("<img src=\"");
            out.push_str(&emoji.image_url);
            out.push_str("\" alt=\"");
            out.push_str(&emoji.alt_text);
            out.push_str("\" title=\"");
            out.push_str(&emoji.name);
            out.push_str("\" class=\"emoji\"/>");
        }
        Node::Mention(mention) => {
            out.push('@');
            out.push_str(&mention.display_name);
            out.push_str("&nbsp;");
        }
    }
}
