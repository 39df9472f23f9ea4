use crate::boundary::clamp_to_char_boundary;
use crate::core::{Document, Node, Point, Selection, has_placeholder, is_void, placeholder_children};
use crate::ops::Op;

/// One structural rule of a well-formed document. A pass inspects the
/// document and returns the ops that repair it, or nothing when the rule
/// already holds. Ops are ordered so each path is valid when it is applied.
pub trait NormalizePass: Send + Sync {
    fn id(&self) -> &'static str;
    fn run(&self, doc: &Document) -> Vec<Op>;
}

static PASSES: &[&dyn NormalizePass] = &[
    &EnsureNonEmptyDocument,
    &EnsureTopLevelParagraphs,
    &FlattenNestedParagraphs,
    &EnsureParagraphHasTextLeaf,
    &EnsureVoidPlaceholder,
    &EnsureTextAroundVoids,
    &MergeAdjacentTextRuns,
];

pub fn normalize_passes() -> &'static [&'static dyn NormalizePass] {
    PASSES
}

/// Ops of the first pass that finds something to fix. The editor applies
/// them and asks again until nothing is left.
pub fn normalize_ops(doc: &Document) -> Vec<Op> {
    for pass in PASSES {
        let ops = pass.run(doc);
        if !ops.is_empty() {
            tracing::trace!(pass = pass.id(), ops = ops.len(), "normalize");
            return ops;
        }
    }
    Vec::new()
}

struct EnsureNonEmptyDocument;

impl NormalizePass for EnsureNonEmptyDocument {
    fn id(&self) -> &'static str {
        "ensure_non_empty_document"
    }

    fn run(&self, doc: &Document) -> Vec<Op> {
        if doc.children.is_empty() {
            return vec![Op::InsertNode {
                path: vec![0],
                node: Node::paragraph(""),
            }];
        }
        Vec::new()
    }
}

struct EnsureTopLevelParagraphs;

impl NormalizePass for EnsureTopLevelParagraphs {
    fn id(&self) -> &'static str {
        "ensure_top_level_paragraphs"
    }

    fn run(&self, doc: &Document) -> Vec<Op> {
        let mut ops = Vec::new();
        for (ix, node) in doc.children.iter().enumerate().rev() {
            if matches!(node, Node::Paragraph(_)) {
                continue;
            }
            ops.push(Op::RemoveNode { path: vec![ix] });
            ops.push(Op::InsertNode {
                path: vec![ix],
                node: Node::paragraph_with(vec![node.clone()]),
            });
        }
        ops
    }
}

struct FlattenNestedParagraphs;

impl NormalizePass for FlattenNestedParagraphs {
    fn id(&self) -> &'static str {
        "flatten_nested_paragraphs"
    }

    fn run(&self, doc: &Document) -> Vec<Op> {
        let mut ops = Vec::new();
        for (block_ix, block) in doc.children.iter().enumerate() {
            let Node::Paragraph(paragraph) = block else {
                continue;
            };
            for (child_ix, child) in paragraph.children.iter().enumerate().rev() {
                let Node::Paragraph(nested) = child else {
                    continue;
                };
                ops.push(Op::RemoveNode {
                    path: vec![block_ix, child_ix],
                });
                for (i, node) in nested.children.iter().enumerate() {
                    ops.push(Op::InsertNode {
                        path: vec![block_ix, child_ix + i],
                        node: node.clone(),
                    });
                }
            }
        }
        ops
    }
}

struct EnsureParagraphHasTextLeaf;

impl NormalizePass for EnsureParagraphHasTextLeaf {
    fn id(&self) -> &'static str {
        "ensure_paragraph_has_text_leaf"
    }

    fn run(&self, doc: &Document) -> Vec<Op> {
        doc.children
            .iter()
            .enumerate()
            .filter_map(|(ix, block)| match block {
                Node::Paragraph(p) if p.children.is_empty() => Some(Op::InsertNode {
                    path: vec![ix, 0],
                    node: Node::text(""),
                }),
                _ => None,
            })
            .collect()
    }
}

struct EnsureVoidPlaceholder;

impl NormalizePass for EnsureVoidPlaceholder {
    fn id(&self) -> &'static str {
        "ensure_void_placeholder"
    }

    fn run(&self, doc: &Document) -> Vec<Op> {
        let mut ops = Vec::new();
        for (block_ix, block) in doc.children.iter().enumerate() {
            let Node::Paragraph(paragraph) = block else {
                continue;
            };
            for (child_ix, child) in paragraph.children.iter().enumerate() {
                let repaired = match child {
                    Node::Emoji(emoji) if !has_placeholder(&emoji.children) => {
                        let mut emoji = emoji.clone();
                        emoji.children = placeholder_children();
                        Node::Emoji(emoji)
                    }
                    Node::Mention(mention) if !has_placeholder(&mention.children) => {
                        let mut mention = mention.clone();
                        mention.children = placeholder_children();
                        Node::Mention(mention)
                    }
                    _ => continue,
                };
                let path = vec![block_ix, child_ix];
                ops.push(Op::RemoveNode { path: path.clone() });
                ops.push(Op::InsertNode {
                    path,
                    node: repaired,
                });
            }
        }
        ops
    }
}

/// Every inline void gets a text run on both sides so the caret always has
/// somewhere to rest before and after it.
struct EnsureTextAroundVoids;

impl NormalizePass for EnsureTextAroundVoids {
    fn id(&self) -> &'static str {
        "ensure_text_around_voids"
    }

    fn run(&self, doc: &Document) -> Vec<Op> {
        let mut ops = Vec::new();
        for (block_ix, block) in doc.children.iter().enumerate() {
            let Node::Paragraph(paragraph) = block else {
                continue;
            };
            for (child_ix, child) in paragraph.children.iter().enumerate().rev() {
                if !is_void(child) {
                    continue;
                }
                if !matches!(paragraph.children.get(child_ix + 1), Some(Node::Text(_))) {
                    ops.push(Op::InsertNode {
                        path: vec![block_ix, child_ix + 1],
                        node: Node::text(""),
                    });
                }
                // Between two voids the left one already gets a trailing run.
                if child_ix == 0 {
                    ops.push(Op::InsertNode {
                        path: vec![block_ix, 0],
                        node: Node::text(""),
                    });
                }
            }
        }
        ops
    }
}

struct MergeAdjacentTextRuns;

impl NormalizePass for MergeAdjacentTextRuns {
    fn id(&self) -> &'static str {
        "merge_adjacent_text_runs"
    }

    fn run(&self, doc: &Document) -> Vec<Op> {
        let mut ops = Vec::new();

        for (block_ix, block) in doc.children.iter().enumerate() {
            let Node::Paragraph(paragraph) = block else {
                continue;
            };
            let children = &paragraph.children;
            if children.len() < 2 {
                continue;
            }

            let mut ix = children.len();
            while ix > 0 {
                ix -= 1;
                if !matches!(children[ix], Node::Text(_)) {
                    continue;
                }

                let mut start = ix;
                while start > 0 && matches!(children.get(start - 1), Some(Node::Text(_))) {
                    start -= 1;
                }
                if start == ix {
                    continue;
                }

                let Some(Node::Text(first)) = children.get(start) else {
                    continue;
                };
                let appended: String = children[start + 1..=ix]
                    .iter()
                    .filter_map(|node| node.as_text().map(|run| run.text.as_str()))
                    .collect();

                if !appended.is_empty() {
                    ops.push(Op::InsertText {
                        path: vec![block_ix, start],
                        offset: first.text.len(),
                        text: appended,
                    });
                }
                for remove_ix in (start + 1..=ix).rev() {
                    ops.push(Op::RemoveNode {
                        path: vec![block_ix, remove_ix],
                    });
                }

                ix = start;
            }
        }

        ops
    }
}

/// Re-anchors both ends of `selection` onto existing text runs. A point that
/// lands on a void moves just past it.
pub fn normalize_selection(doc: &Document, selection: &Selection) -> Selection {
    let fallback = first_text_point(doc).unwrap_or_else(|| Point::new(vec![0, 0], 0));

    let anchor = normalize_point(doc, &selection.anchor).unwrap_or_else(|| {
        normalize_point(doc, &selection.focus).unwrap_or_else(|| fallback.clone())
    });
    let focus = normalize_point(doc, &selection.focus).unwrap_or_else(|| anchor.clone());

    Selection { anchor, focus }
}

fn normalize_point(doc: &Document, point: &Point) -> Option<Point> {
    let (&block_ix, rest) = point.path.split_first()?;
    if block_ix >= doc.children.len() {
        return last_text_point(doc);
    }
    let Node::Paragraph(paragraph) = &doc.children[block_ix] else {
        return None;
    };

    let Some(&child_ix) = rest.first() else {
        return text_point_in_block(doc, block_ix, 0, false);
    };
    if child_ix >= paragraph.children.len() {
        return text_point_in_block(doc, block_ix, paragraph.children.len(), true);
    }

    match &paragraph.children[child_ix] {
        Node::Text(run) => Some(Point::new(
            vec![block_ix, child_ix],
            clamp_to_char_boundary(&run.text, point.offset),
        )),
        Node::Emoji(_) | Node::Mention(_) => text_point_in_block(doc, block_ix, child_ix + 1, false)
            .or_else(|| text_point_in_block(doc, block_ix, child_ix, true)),
        Node::Paragraph(_) => None,
    }
}

// Nearest text run at or after `from` (or strictly before it when
// `backward`). Backward hits land at the end of the run.
fn text_point_in_block(doc: &Document, block_ix: usize, from: usize, backward: bool) -> Option<Point> {
    let Some(Node::Paragraph(paragraph)) = doc.children.get(block_ix) else {
        return None;
    };
    if backward {
        paragraph.children[..from.min(paragraph.children.len())]
            .iter()
            .enumerate()
            .rev()
            .find_map(|(ix, node)| {
                node.as_text()
                    .map(|run| Point::new(vec![block_ix, ix], run.text.len()))
            })
    } else {
        paragraph
            .children
            .iter()
            .enumerate()
            .skip(from)
            .find_map(|(ix, node)| node.as_text().map(|_| Point::new(vec![block_ix, ix], 0)))
    }
}

pub fn first_text_point(doc: &Document) -> Option<Point> {
    (0..doc.children.len()).find_map(|block_ix| text_point_in_block(doc, block_ix, 0, false))
}

pub fn last_text_point(doc: &Document) -> Option<Point> {
    (0..doc.children.len())
        .rev()
        .find_map(|block_ix| text_point_in_block(doc, block_ix, usize::MAX, true))
}
