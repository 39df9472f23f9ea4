use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::boundary::previous_grapheme_start;
use crate::normalize::{first_text_point, last_text_point, normalize_ops, normalize_selection};
use crate::ops::{Op, Path, Transaction};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Document {
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Document {
    pub fn empty() -> Self {
        Self::with_text("")
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            children: vec![Node::paragraph(text)],
        }
    }
}

/// A node of the composer tree. The set of kinds is closed; void and inline
/// behavior is decided by [`is_void`] and [`is_inline`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Text(TextRun),
    Paragraph(ParagraphNode),
    Emoji(EmojiNode),
    Mention(MentionNode),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(TextRun { text: text.into() })
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::paragraph_with(vec![Node::text(text)])
    }

    pub fn paragraph_with(children: Vec<Node>) -> Self {
        Node::Paragraph(ParagraphNode { children })
    }

    /// Custom emoji picked by name. The name doubles as alt text.
    pub fn emoji(name: impl Into<String>, image_url: impl Into<String>) -> Self {
        let name = name.into();
        Node::Emoji(EmojiNode {
            alt_text: name.clone(),
            image_url: image_url.into(),
            name,
            children: placeholder_children(),
        })
    }

    pub fn mention(display_name: impl Into<String>) -> Self {
        Node::Mention(MentionNode {
            display_name: display_name.into(),
            children: placeholder_children(),
        })
    }

    pub fn is_void(&self) -> bool {
        is_void(self)
    }

    pub fn is_inline(&self) -> bool {
        is_inline(self)
    }

    pub fn as_text(&self) -> Option<&TextRun> {
        match self {
            Node::Text(run) => Some(run),
            _ => None,
        }
    }
}

pub fn is_void(node: &Node) -> bool {
    matches!(node, Node::Emoji(_) | Node::Mention(_))
}

pub fn is_inline(node: &Node) -> bool {
    matches!(node, Node::Text(_) | Node::Emoji(_) | Node::Mention(_))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TextRun {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ParagraphNode {
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiNode {
    pub alt_text: String,
    pub image_url: String,
    pub name: String,
    #[serde(default = "placeholder_children")]
    pub children: Vec<TextRun>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionNode {
    pub display_name: String,
    #[serde(default = "placeholder_children")]
    pub children: Vec<TextRun>,
}

pub(crate) fn placeholder_children() -> Vec<TextRun> {
    vec![TextRun::default()]
}

pub(crate) fn has_placeholder(children: &[TextRun]) -> bool {
    matches!(children, [run] if run.text.is_empty())
}

/// A caret position. `path` addresses a text run (`[block, child]`) and
/// `offset` is a byte offset on a char boundary of that run.
///
/// The derived ordering is document order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// The selected span in document order, regardless of direction.
    pub fn range(&self) -> TextRange {
        TextRange::new(self.anchor.clone(), self.focus.clone())
    }
}

impl From<TextRange> for Selection {
    fn from(range: TextRange) -> Self {
        Self {
            anchor: range.start,
            focus: range.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    pub start: Point,
    pub end: Point,
}

impl TextRange {
    pub fn new(a: Point, b: Point) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("offset {offset} is not a char boundary inside the text run at {path:?}")]
    InvalidOffset { path: Path, offset: usize },
    #[error("node at {0:?} is not a void node")]
    NotVoid(Path),
    #[error("normalization did not converge after {0} iterations")]
    NormalizeDidNotConverge(usize),
}

impl From<PathError> for ApplyError {
    fn from(value: PathError) -> Self {
        ApplyError::InvalidPath(value.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PathError(pub String);

#[derive(Debug, Clone, Default)]
pub struct EditorConfig {
    pub max_normalize_iterations: usize,
}

impl EditorConfig {
    fn with_defaults(mut self) -> Self {
        if self.max_normalize_iterations == 0 {
            self.max_normalize_iterations = 100;
        }
        self
    }
}

/// Owns the document and the selection. Every mutation goes through a
/// [`Transaction`] and leaves the tree normalized.
#[derive(Debug, Clone)]
pub struct Editor {
    doc: Document,
    selection: Selection,
    config: EditorConfig,
}

impl Editor {
    pub fn new(doc: Document, selection: Selection) -> Self {
        Self::with_config(doc, selection, EditorConfig::default())
    }

    /// Like [`Editor::try_with_config`], but a document that cannot be
    /// normalized is replaced by an empty one so the tree invariants hold.
    pub fn with_config(doc: Document, selection: Selection, config: EditorConfig) -> Self {
        let config = config.with_defaults();
        match Self::try_with_config(doc, selection, config.clone()) {
            Ok(editor) => editor,
            Err(err) => {
                tracing::warn!("initial document failed to normalize, starting empty: {err}");
                Self {
                    doc: Document::empty(),
                    selection: Selection::collapsed(Point::new(vec![0, 0], 0)),
                    config,
                }
            }
        }
    }

    pub fn try_with_config(
        doc: Document,
        selection: Selection,
        config: EditorConfig,
    ) -> Result<Self, ApplyError> {
        let mut editor = Self {
            doc,
            selection,
            config: config.with_defaults(),
        };
        editor.normalize()?;
        Ok(editor)
    }

    pub fn empty() -> Self {
        Self::new(
            Document::empty(),
            Selection::collapsed(Point::new(vec![0, 0], 0)),
        )
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = normalize_selection(&self.doc, &selection);
    }

    /// Selects `range`, anchored at its start.
    pub fn select(&mut self, range: TextRange) {
        self.set_selection(Selection::from(range));
    }

    pub fn node(&self, path: &[usize]) -> Option<&Node> {
        node_ref(&self.doc, path)
    }

    /// First caret position of the document.
    pub fn start(&self) -> Point {
        first_text_point(&self.doc).unwrap_or_else(|| Point::new(vec![0, 0], 0))
    }

    /// Last caret position of the document.
    pub fn end(&self) -> Point {
        last_text_point(&self.doc).unwrap_or_else(|| Point::new(vec![0, 0], 0))
    }

    /// Plain text covered by `range`. Void nodes contribute nothing.
    pub fn string(&self, range: &TextRange) -> String {
        let mut out = String::new();
        for (block_ix, block) in self.doc.children.iter().enumerate() {
            let Node::Paragraph(paragraph) = block else {
                continue;
            };
            for (child_ix, child) in paragraph.children.iter().enumerate() {
                let Node::Text(run) = child else {
                    continue;
                };
                let path = vec![block_ix, child_ix];
                if path < range.start.path || path > range.end.path {
                    continue;
                }
                let from = if path == range.start.path {
                    range.start.offset
                } else {
                    0
                };
                let to = if path == range.end.path {
                    range.end.offset
                } else {
                    run.text.len()
                };
                if let Some(slice) = run.text.get(from..to) {
                    out.push_str(slice);
                }
            }
        }
        out
    }

    /// Applies `tx` atomically: either every op and the follow-up
    /// normalization succeed, or the editor is left untouched.
    pub fn apply(&mut self, tx: Transaction) -> Result<(), ApplyError> {
        let mut doc = self.doc.clone();
        let mut selection = self.selection.clone();

        for op in tx.ops {
            apply_op_to(&mut doc, &mut selection, op)?;
        }
        if let Some(sel) = tx.selection_after {
            selection = sel;
        }
        normalize_to_fixed_point(
            &mut doc,
            &mut selection,
            self.config.max_normalize_iterations,
        )?;

        self.doc = doc;
        self.selection = selection;
        Ok(())
    }

    pub fn normalize(&mut self) -> Result<(), ApplyError> {
        self.apply(Transaction::default())
    }

    /// Inserts `text` at the caret, replacing an expanded selection first.
    pub fn insert_text(&mut self, text: &str) -> Result<(), ApplyError> {
        self.delete_selection()?;
        if text.is_empty() {
            return Ok(());
        }

        let focus = self.selection.focus.clone();
        self.checked_run(&focus)?;

        let after = Point::new(focus.path.clone(), focus.offset + text.len());
        let tx = Transaction::with_selection(
            vec![Op::InsertText {
                path: focus.path,
                offset: focus.offset,
                text: text.to_string(),
            }],
            Selection::collapsed(after),
        );
        self.apply(tx)
    }

    /// Splits the run under the caret and inserts `node` between the halves.
    /// The caret ends up at the start of the run following the node.
    /// Returns the path of the inserted node.
    pub fn insert_void_node(&mut self, node: Node) -> Result<Path, ApplyError> {
        if !is_void(&node) {
            return Err(ApplyError::NotVoid(self.selection.focus.path.clone()));
        }
        self.delete_selection()?;

        let focus = self.selection.focus.clone();
        let run = self.checked_run(&focus)?;
        let left = run.text[..focus.offset].to_string();
        let right = run.text[focus.offset..].to_string();

        let (child_ix, block_path) = focus
            .path
            .split_last()
            .ok_or_else(|| ApplyError::InvalidPath("Caret is not in a text run".into()))?;

        let mut replacement: Vec<Node> = Vec::new();
        let base_child_ix = *child_ix;
        let mut void_ix = base_child_ix;

        if !left.is_empty() {
            replacement.push(Node::text(left));
            void_ix += 1;
        }
        replacement.push(node);
        replacement.push(Node::text(right));

        let mut ops: Vec<Op> = Vec::new();
        ops.push(Op::RemoveNode {
            path: focus.path.clone(),
        });
        for (i, node) in replacement.into_iter().enumerate() {
            let mut path = block_path.to_vec();
            path.push(base_child_ix + i);
            ops.push(Op::InsertNode { path, node });
        }

        let mut selection_path = block_path.to_vec();
        selection_path.push(void_ix + 1);
        let tx =
            Transaction::with_selection(ops, Selection::collapsed(Point::new(selection_path, 0)));
        self.apply(tx)?;

        // Normalization may have shifted the node; it always sits right
        // before the caret's run.
        let (caret_ix, caret_block) = self
            .selection
            .focus
            .path
            .split_last()
            .ok_or_else(|| ApplyError::InvalidPath("Caret is not in a text run".into()))?;
        let mut void_path = caret_block.to_vec();
        void_path.push(caret_ix.saturating_sub(1));
        Ok(void_path)
    }

    /// Removes everything between `range.start` and `range.end`. Runs that are
    /// only partly covered are trimmed; when the range spans blocks, what is
    /// left of the end block is merged into the start block.
    pub fn delete_range(&mut self, range: &TextRange) -> Result<(), ApplyError> {
        let start = range.start.clone();
        let end = range.end.clone();
        let start_len = self.checked_run(&start)?.text.len();
        let end_run = self.checked_run(&end)?.clone();

        if range.is_collapsed() {
            self.selection = Selection::collapsed(start);
            return Ok(());
        }

        let (&start_block, &start_child) = split_text_path(&start.path)?;
        let (&end_block, &end_child) = split_text_path(&end.path)?;

        let mut ops: Vec<Op> = Vec::new();

        if start_block == end_block {
            if start_child == end_child {
                ops.push(Op::RemoveText {
                    path: start.path.clone(),
                    range: start.offset..end.offset,
                });
            } else {
                if end.offset > 0 {
                    ops.push(Op::RemoveText {
                        path: end.path.clone(),
                        range: 0..end.offset,
                    });
                }
                for ix in (start_child + 1..end_child).rev() {
                    ops.push(Op::RemoveNode {
                        path: vec![start_block, ix],
                    });
                }
                if start.offset < start_len {
                    ops.push(Op::RemoveText {
                        path: start.path.clone(),
                        range: start.offset..start_len,
                    });
                }
            }
        } else {
            let Some(Node::Paragraph(end_paragraph)) = self.doc.children.get(end_block) else {
                return Err(ApplyError::InvalidPath(format!(
                    "Block {end_block} is not a paragraph"
                )));
            };
            let mut tail: Vec<Node> = Vec::new();
            tail.push(Node::text(&end_run.text[end.offset..]));
            tail.extend(end_paragraph.children.iter().skip(end_child + 1).cloned());

            let start_children = match self.doc.children.get(start_block) {
                Some(Node::Paragraph(p)) => p.children.len(),
                _ => {
                    return Err(ApplyError::InvalidPath(format!(
                        "Block {start_block} is not a paragraph"
                    )));
                }
            };

            for ix in (start_block + 1..=end_block).rev() {
                ops.push(Op::RemoveNode { path: vec![ix] });
            }
            for ix in (start_child + 1..start_children).rev() {
                ops.push(Op::RemoveNode {
                    path: vec![start_block, ix],
                });
            }
            if start.offset < start_len {
                ops.push(Op::RemoveText {
                    path: start.path.clone(),
                    range: start.offset..start_len,
                });
            }
            for (i, node) in tail.into_iter().enumerate() {
                ops.push(Op::InsertNode {
                    path: vec![start_block, start_child + 1 + i],
                    node,
                });
            }
        }

        let tx = Transaction::with_selection(ops, Selection::collapsed(start));
        self.apply(tx)
    }

    /// Backspace: removes the expanded selection, the previous grapheme, or
    /// the whole void node right before the caret. Returns `false` when the
    /// caret is at the very start of the document and nothing was removed.
    pub fn delete_backward(&mut self) -> Result<bool, ApplyError> {
        if !self.selection.is_collapsed() {
            let range = self.selection.range();
            self.delete_range(&range)?;
            return Ok(true);
        }

        let focus = self.selection.focus.clone();
        let run = self.checked_run(&focus)?;

        if let Some(prev) = previous_grapheme_start(&run.text, focus.offset) {
            let tx = Transaction::with_selection(
                vec![Op::RemoveText {
                    path: focus.path.clone(),
                    range: prev..focus.offset,
                }],
                Selection::collapsed(Point::new(focus.path, prev)),
            );
            self.apply(tx)?;
            return Ok(true);
        }

        let (&block_ix, &child_ix) = split_text_path(&focus.path)?;
        if child_ix > 0 {
            let prev_path = vec![block_ix, child_ix - 1];
            let tx = match self.node(&prev_path) {
                Some(Node::Text(prev_run)) => {
                    let Some(prev) = previous_grapheme_start(&prev_run.text, prev_run.text.len())
                    else {
                        return Ok(false);
                    };
                    Transaction::new(vec![Op::RemoveText {
                        path: prev_path,
                        range: prev..prev_run.text.len(),
                    }])
                }
                Some(_) => Transaction::new(vec![Op::RemoveNode { path: prev_path }]),
                None => return Ok(false),
            };
            // The caret's own run is untouched; op transforms carry it.
            self.apply(tx)?;
            return Ok(true);
        }

        if block_ix > 0 {
            let previous_end = last_text_point_in_block(&self.doc, block_ix - 1).ok_or_else(|| {
                ApplyError::InvalidPath(format!("Block {} has no text run", block_ix - 1))
            })?;
            self.delete_range(&TextRange::new(previous_end, focus))?;
            return Ok(true);
        }

        Ok(false)
    }

    /// Collapses the caret onto the start of the run following the void node
    /// at `path`.
    pub fn move_cursor_past(&mut self, path: &[usize]) -> Result<(), ApplyError> {
        match node_ref(&self.doc, path) {
            Some(node) if is_void(node) => {}
            Some(_) => return Err(ApplyError::NotVoid(path.to_vec())),
            None => return Err(ApplyError::InvalidPath(format!("No node at {path:?}"))),
        }

        let (ix, parent) = path
            .split_last()
            .ok_or_else(|| ApplyError::InvalidPath("Empty path".into()))?;
        let mut next = parent.to_vec();
        next.push(ix + 1);
        match node_ref(&self.doc, &next) {
            Some(Node::Text(_)) => {
                self.selection = Selection::collapsed(Point::new(next, 0));
                Ok(())
            }
            _ => Err(ApplyError::InvalidPath(format!(
                "No text run follows the void node at {path:?}"
            ))),
        }
    }

    fn delete_selection(&mut self) -> Result<(), ApplyError> {
        if self.selection.is_collapsed() {
            return Ok(());
        }
        let range = self.selection.range();
        self.delete_range(&range)
    }

    fn checked_run(&self, point: &Point) -> Result<&TextRun, ApplyError> {
        let run = match node_ref(&self.doc, &point.path) {
            Some(Node::Text(run)) => run,
            _ => {
                return Err(ApplyError::InvalidPath(format!(
                    "No text run at {:?}",
                    point.path
                )));
            }
        };
        check_offset(&run.text, &point.path, point.offset)?;
        Ok(run)
    }
}

fn split_text_path(path: &[usize]) -> Result<(&usize, &usize), ApplyError> {
    match path {
        [block, child] => Ok((block, child)),
        _ => Err(ApplyError::InvalidPath(format!(
            "Expected a [block, child] path, got {path:?}"
        ))),
    }
}

fn last_text_point_in_block(doc: &Document, block_ix: usize) -> Option<Point> {
    let Some(Node::Paragraph(paragraph)) = doc.children.get(block_ix) else {
        return None;
    };
    paragraph
        .children
        .iter()
        .enumerate()
        .rev()
        .find_map(|(ix, node)| match node {
            Node::Text(run) => Some(Point::new(vec![block_ix, ix], run.text.len())),
            _ => None,
        })
}

fn normalize_to_fixed_point(
    doc: &mut Document,
    selection: &mut Selection,
    max_iterations: usize,
) -> Result<(), ApplyError> {
    for _ in 0..max_iterations {
        let ops = normalize_ops(doc);
        if ops.is_empty() {
            *selection = normalize_selection(doc, selection);
            return Ok(());
        }
        for op in ops {
            apply_op_to(doc, selection, op)?;
        }
    }
    Err(ApplyError::NormalizeDidNotConverge(max_iterations))
}

fn check_offset(text: &str, path: &[usize], offset: usize) -> Result<(), ApplyError> {
    if offset > text.len() || !text.is_char_boundary(offset) {
        return Err(ApplyError::InvalidOffset {
            path: path.to_vec(),
            offset,
        });
    }
    Ok(())
}

fn apply_op_to(doc: &mut Document, selection: &mut Selection, op: Op) -> Result<(), ApplyError> {
    match op {
        Op::InsertText { path, offset, text } => {
            let run = text_run_mut(doc, &path)?;
            check_offset(&run.text, &path, offset)?;
            run.text.insert_str(offset, &text);
            transform_selection_insert_text(selection, &path, offset, text.len());
        }
        Op::RemoveText { path, range } => {
            let run = text_run_mut(doc, &path)?;
            check_offset(&run.text, &path, range.start)?;
            check_offset(&run.text, &path, range.end)?;
            if range.start > range.end {
                return Err(ApplyError::InvalidOffset {
                    path,
                    offset: range.start,
                });
            }
            run.text.replace_range(range.clone(), "");
            transform_selection_remove_text(selection, &path, range);
        }
        Op::InsertNode { path, node } => {
            insert_node(doc, &path, node)?;
            transform_selection_insert_node(selection, &path);
        }
        Op::RemoveNode { path } => {
            let removed = remove_node(doc, &path)?;
            transform_selection_remove_node(selection, &path, &removed, doc);
        }
    }
    Ok(())
}

fn transform_selection_insert_text(
    selection: &mut Selection,
    path: &[usize],
    offset: usize,
    len: usize,
) {
    // A point sitting exactly at `offset` stays put; edits that move the
    // caret along with the text set `selection_after` instead.
    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.path == path && point.offset > offset {
            point.offset = point.offset.saturating_add(len);
        }
    }
}

fn transform_selection_remove_text(
    selection: &mut Selection,
    path: &[usize],
    range: std::ops::Range<usize>,
) {
    let removed_len = range.end.saturating_sub(range.start);
    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.path != path || point.offset <= range.start {
            continue;
        }
        if point.offset >= range.end {
            point.offset = point.offset.saturating_sub(removed_len);
        } else {
            point.offset = range.start;
        }
    }
}

fn transform_selection_insert_node(selection: &mut Selection, path: &[usize]) {
    let Some((index, parent_path)) = path.split_last() else {
        return;
    };

    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.path.len() <= parent_path.len() || !point.path.starts_with(parent_path) {
            continue;
        }
        let depth = parent_path.len();
        if point.path[depth] >= *index {
            point.path[depth] += 1;
        }
    }
}

fn transform_selection_remove_node(
    selection: &mut Selection,
    path: &[usize],
    removed: &Node,
    doc_after_remove: &Document,
) {
    let Some((&index, parent_path)) = path.split_last() else {
        return;
    };

    // A text run removed right after a run that now ends with its content was
    // merged into that run; points inside it follow the text.
    let merge_prefix_len = match (removed, index.checked_sub(1)) {
        (Node::Text(removed_run), Some(left_index)) => {
            let mut left_path = parent_path.to_vec();
            left_path.push(left_index);
            match node_ref(doc_after_remove, &left_path) {
                Some(Node::Text(left_run)) if left_run.text.ends_with(&removed_run.text) => {
                    Some(left_run.text.len() - removed_run.text.len())
                }
                _ => None,
            }
        }
        _ => None,
    };

    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.path.len() <= parent_path.len() || !point.path.starts_with(parent_path) {
            continue;
        }
        let depth = parent_path.len();
        let ix = point.path[depth];
        if ix > index {
            point.path[depth] = ix - 1;
            continue;
        }
        if ix < index {
            continue;
        }

        // Point was inside the removed subtree. Map it to a nearby point.
        point.path.truncate(depth + 1);
        match (merge_prefix_len, removed) {
            (Some(prefix), Node::Text(removed_run)) => {
                point.path[depth] = index - 1;
                point.offset = prefix + point.offset.min(removed_run.text.len());
            }
            _ => {
                // Re-anchored by the selection normalizer.
                point.path[depth] = index;
                point.offset = 0;
            }
        }
    }
}

fn node_ref<'a>(doc: &'a Document, path: &[usize]) -> Option<&'a Node> {
    let (first, rest) = path.split_first()?;
    let mut node = doc.children.get(*first)?;
    for &ix in rest {
        node = match node {
            Node::Paragraph(p) => p.children.get(ix)?,
            Node::Text(_) | Node::Emoji(_) | Node::Mention(_) => return None,
        };
    }
    Some(node)
}

fn node_mut<'a>(doc: &'a mut Document, path: &[usize]) -> Result<&'a mut Node, PathError> {
    let Some((&first, rest)) = path.split_first() else {
        return Err(PathError("Empty path".into()));
    };

    let len = doc.children.len();
    let mut node = doc
        .children
        .get_mut(first)
        .ok_or_else(|| PathError(format!("Path out of bounds at depth 0: {first} >= {len}")))?;

    for (depth, &ix) in rest.iter().enumerate() {
        let children = match node {
            Node::Paragraph(p) => &mut p.children,
            Node::Text(_) | Node::Emoji(_) | Node::Mention(_) => {
                return Err(PathError(format!("Non-container node at depth {depth}")));
            }
        };
        let len = children.len();
        node = children.get_mut(ix).ok_or_else(|| {
            PathError(format!(
                "Path out of bounds at depth {}: {ix} >= {len}",
                depth + 1
            ))
        })?;
    }
    Ok(node)
}

fn text_run_mut<'a>(doc: &'a mut Document, path: &[usize]) -> Result<&'a mut TextRun, PathError> {
    match node_mut(doc, path)? {
        Node::Text(run) => Ok(run),
        _ => Err(PathError(format!("Expected a text run at {path:?}"))),
    }
}

fn children_mut<'a>(
    doc: &'a mut Document,
    parent_path: &[usize],
) -> Result<&'a mut Vec<Node>, PathError> {
    if parent_path.is_empty() {
        return Ok(&mut doc.children);
    }
    match node_mut(doc, parent_path)? {
        Node::Paragraph(p) => Ok(&mut p.children),
        _ => Err(PathError("Parent is not a container".into())),
    }
}

fn insert_node(doc: &mut Document, path: &[usize], node: Node) -> Result<(), PathError> {
    let Some((&index, parent_path)) = path.split_last() else {
        return Err(PathError("Empty insert path".into()));
    };
    let children = children_mut(doc, parent_path)?;
    if index > children.len() {
        return Err(PathError(format!(
            "Insert index out of bounds: {index} > {}",
            children.len()
        )));
    }
    children.insert(index, node);
    Ok(())
}

fn remove_node(doc: &mut Document, path: &[usize]) -> Result<Node, PathError> {
    let Some((&index, parent_path)) = path.split_last() else {
        return Err(PathError("Empty remove path".into()));
    };
    let children = children_mut(doc, parent_path)?;
    if index >= children.len() {
        return Err(PathError(format!(
            "Remove index out of bounds: {index} >= {}",
            children.len()
        )));
    }
    Ok(children.remove(index))
}
