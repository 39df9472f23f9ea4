use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::core::{Node, Selection};

pub type Path = Vec<usize>;

/// A primitive document mutation. Every structural edit is expressed as an
/// ordered list of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    InsertText {
        #[serde(default)]
        path: Path,
        offset: usize,
        text: String,
    },
    RemoveText {
        #[serde(default)]
        path: Path,
        range: Range<usize>,
    },
    InsertNode {
        #[serde(default)]
        path: Path,
        node: Node,
    },
    RemoveNode {
        #[serde(default)]
        path: Path,
    },
}

/// Ops applied in order as one atomic edit. When `selection_after` is set it
/// replaces the selection that the ops' own point transforms produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub ops: Vec<Op>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_after: Option<Selection>,
}

impl Transaction {
    pub fn new(ops: Vec<Op>) -> Self {
        Self {
            ops,
            selection_after: None,
        }
    }

    /// Edit that leaves the caret at a known place, e.g. right after
    /// inserted text.
    pub fn with_selection(ops: Vec<Op>, selection: Selection) -> Self {
        Self {
            ops,
            selection_after: Some(selection),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
