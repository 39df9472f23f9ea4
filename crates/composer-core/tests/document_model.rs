use chat_composer_core::{
    ApplyError, Document, Editor, EditorConfig, MentionNode, Node, Op, Point, Selection,
    TextRange, Transaction,
};
use pretty_assertions::assert_eq;

fn editor_with(children: Vec<Node>, caret: Point) -> Editor {
    Editor::new(Document { children }, Selection::collapsed(caret))
}

#[test]
fn insert_text_moves_caret_after_inserted_text() {
    let mut editor = Editor::empty();
    editor.insert_text("hello").unwrap();
    editor.insert_text(" wörld").unwrap();

    assert_eq!(editor.doc(), &Document::with_text("hello wörld"));
    assert_eq!(
        editor.selection(),
        &Selection::collapsed(Point::new(vec![0, 0], "hello wörld".len()))
    );
}

#[test]
fn insert_text_replaces_expanded_selection() {
    let mut editor = Editor::new(
        Document::with_text("hello world"),
        Selection {
            anchor: Point::new(vec![0, 0], 5),
            focus: Point::new(vec![0, 0], 0),
        },
    );
    editor.insert_text("bye").unwrap();

    assert_eq!(editor.doc(), &Document::with_text("bye world"));
    assert_eq!(
        editor.selection(),
        &Selection::collapsed(Point::new(vec![0, 0], 3))
    );
}

#[test]
fn insert_void_node_splits_the_run_under_the_caret() {
    let mut editor = editor_with(vec![Node::paragraph("hello")], Point::new(vec![0, 0], 2));
    let path = editor
        .insert_void_node(Node::emoji("party", "https://cdn.test/party.png"))
        .unwrap();

    assert_eq!(path, vec![0, 1]);
    assert_eq!(
        editor.doc().children,
        vec![Node::paragraph_with(vec![
            Node::text("he"),
            Node::emoji("party", "https://cdn.test/party.png"),
            Node::text("llo"),
        ])]
    );
    assert_eq!(
        editor.selection(),
        &Selection::collapsed(Point::new(vec![0, 2], 0))
    );
}

#[test]
fn insert_void_node_at_run_start_keeps_a_leading_run() {
    let mut editor = editor_with(vec![Node::paragraph("hello")], Point::new(vec![0, 0], 0));
    let path = editor.insert_void_node(Node::mention("Bob")).unwrap();

    assert_eq!(path, vec![0, 1]);
    assert_eq!(
        editor.doc().children,
        vec![Node::paragraph_with(vec![
            Node::text(""),
            Node::mention("Bob"),
            Node::text("hello"),
        ])]
    );
    assert_eq!(
        editor.selection(),
        &Selection::collapsed(Point::new(vec![0, 2], 0))
    );
}

#[test]
fn insert_void_node_rejects_non_void_nodes() {
    let mut editor = editor_with(vec![Node::paragraph("hi")], Point::new(vec![0, 0], 1));
    let before = editor.doc().clone();

    let err = editor.insert_void_node(Node::text("x")).unwrap_err();
    assert!(matches!(err, ApplyError::NotVoid(_)));
    assert_eq!(editor.doc(), &before);
}

#[test]
fn delete_backward_removes_previous_grapheme() {
    let mut editor = editor_with(
        vec![Node::paragraph("héllo")],
        Point::new(vec![0, 0], "hé".len()),
    );
    assert!(editor.delete_backward().unwrap());

    assert_eq!(editor.doc(), &Document::with_text("hllo"));
    assert_eq!(
        editor.selection(),
        &Selection::collapsed(Point::new(vec![0, 0], 1))
    );
}

#[test]
fn delete_backward_removes_void_before_caret_and_merges_runs() {
    let mut editor = editor_with(vec![Node::paragraph("a")], Point::new(vec![0, 0], 1));
    editor
        .insert_void_node(Node::emoji("wave", "https://cdn.test/wave.png"))
        .unwrap();
    assert_eq!(editor.doc().children.len(), 1);

    assert!(editor.delete_backward().unwrap());
    assert_eq!(editor.doc(), &Document::with_text("a"));
    assert_eq!(
        editor.selection(),
        &Selection::collapsed(Point::new(vec![0, 0], 1))
    );
}

#[test]
fn delete_backward_at_document_start_does_nothing() {
    let mut editor = Editor::empty();
    assert!(!editor.delete_backward().unwrap());
    assert_eq!(editor.doc(), &Document::empty());
}

#[test]
fn delete_backward_joins_blocks() {
    let mut editor = editor_with(
        vec![Node::paragraph("ab"), Node::paragraph("cd")],
        Point::new(vec![1, 0], 0),
    );
    assert!(editor.delete_backward().unwrap());

    assert_eq!(editor.doc(), &Document::with_text("abcd"));
    assert_eq!(
        editor.selection(),
        &Selection::collapsed(Point::new(vec![0, 0], 2))
    );
}

#[test]
fn delete_range_across_blocks_keeps_the_tail() {
    let mut editor = editor_with(
        vec![Node::paragraph("abc"), Node::paragraph("def")],
        Point::new(vec![0, 0], 0),
    );
    let range = TextRange::new(Point::new(vec![1, 0], 2), Point::new(vec![0, 0], 1));
    editor.delete_range(&range).unwrap();

    assert_eq!(editor.doc(), &Document::with_text("af"));
    assert_eq!(
        editor.selection(),
        &Selection::collapsed(Point::new(vec![0, 0], 1))
    );
}

#[test]
fn delete_range_over_whole_document_leaves_one_empty_run() {
    let mut editor = editor_with(
        vec![Node::paragraph_with(vec![
            Node::text("hi "),
            Node::mention("Bob"),
            Node::text(" there"),
        ])],
        Point::new(vec![0, 2], 6),
    );
    let everything = TextRange::new(editor.start(), editor.end());
    editor.delete_range(&everything).unwrap();

    assert_eq!(editor.doc(), &Document::empty());
    assert_eq!(editor.selection(), &Selection::collapsed(editor.start()));
}

#[test]
fn string_skips_void_nodes() {
    let editor = editor_with(
        vec![Node::paragraph_with(vec![
            Node::text("hi "),
            Node::mention("Bob"),
            Node::text(" there"),
        ])],
        Point::new(vec![0, 0], 0),
    );
    let range = TextRange::new(editor.start(), editor.end());
    assert_eq!(editor.string(&range), "hi  there");

    let partial = TextRange::new(Point::new(vec![0, 0], 1), Point::new(vec![0, 2], 3));
    assert_eq!(editor.string(&partial), "i  th");
}

#[test]
fn apply_is_atomic_on_invalid_ops() {
    let mut editor = editor_with(vec![Node::paragraph("hi")], Point::new(vec![0, 0], 2));
    let before = editor.doc().clone();

    let tx = Transaction::new(vec![
        Op::InsertText {
            path: vec![0, 0],
            offset: 2,
            text: "!".to_string(),
        },
        Op::InsertText {
            path: vec![0, 5],
            offset: 0,
            text: "?".to_string(),
        },
    ]);
    let err = editor.apply(tx).unwrap_err();

    assert!(matches!(err, ApplyError::InvalidPath(_)));
    assert_eq!(editor.doc(), &before);
}

#[test]
fn apply_rejects_offsets_inside_a_char() {
    let mut editor = editor_with(vec![Node::paragraph("é")], Point::new(vec![0, 0], 0));
    let tx = Transaction::new(vec![Op::InsertText {
        path: vec![0, 0],
        offset: 1,
        text: "x".to_string(),
    }]);

    assert_eq!(
        editor.apply(tx).unwrap_err(),
        ApplyError::InvalidOffset {
            path: vec![0, 0],
            offset: 1
        }
    );
}

#[test]
fn move_cursor_past_requires_a_void() {
    let mut editor = editor_with(
        vec![Node::paragraph_with(vec![
            Node::text("a"),
            Node::mention("Bob"),
            Node::text("b"),
        ])],
        Point::new(vec![0, 0], 0),
    );

    editor.move_cursor_past(&[0, 1]).unwrap();
    assert_eq!(
        editor.selection(),
        &Selection::collapsed(Point::new(vec![0, 2], 0))
    );

    assert!(matches!(
        editor.move_cursor_past(&[0, 0]),
        Err(ApplyError::NotVoid(_))
    ));
}

#[test]
fn set_selection_moves_points_off_voids() {
    let mut editor = editor_with(
        vec![Node::paragraph_with(vec![
            Node::text("a"),
            Node::mention("Bob"),
            Node::text("b"),
        ])],
        Point::new(vec![0, 0], 0),
    );
    editor.set_selection(Selection::collapsed(Point::new(vec![0, 1], 0)));

    assert_eq!(
        editor.selection(),
        &Selection::collapsed(Point::new(vec![0, 2], 0))
    );
}

#[test]
fn void_nodes_are_inline() {
    let mention = Node::mention("Bob");
    assert!(mention.is_void());
    assert!(mention.is_inline());
    assert!(!Node::text("x").is_void());
    assert!(!Node::paragraph("x").is_inline());
}

#[test]
fn nodes_serialize_with_a_type_tag() {
    let value = serde_json::to_value(Node::mention("Bob")).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "type": "mention",
            "display_name": "Bob",
            "children": [{ "text": "" }],
        })
    );

    let parsed: Node =
        serde_json::from_value(serde_json::json!({ "type": "mention", "display_name": "Bob" }))
            .unwrap();
    assert_eq!(
        parsed,
        Node::Mention(MentionNode {
            display_name: "Bob".to_string(),
            children: vec![Default::default()],
        })
    );
}

#[test]
fn ops_serialize_with_an_op_tag() {
    let op = Op::RemoveText {
        path: vec![0, 0],
        range: 1..3,
    };
    let value = serde_json::to_value(&op).unwrap();
    assert_eq!(value["op"], "remove_text");
    assert_eq!(serde_json::from_value::<Op>(value).unwrap(), op);
}

#[test]
fn transaction_selection_overrides_op_transforms() {
    let mut editor = editor_with(vec![Node::paragraph("ac")], Point::new(vec![0, 0], 1));
    let insert = || Op::InsertText {
        path: vec![0, 0],
        offset: 1,
        text: "b".to_string(),
    };

    editor.apply(Transaction::new(vec![insert()])).unwrap();
    assert_eq!(editor.doc(), &Document::with_text("abc"));
    assert_eq!(
        editor.selection(),
        &Selection::collapsed(Point::new(vec![0, 0], 1))
    );

    editor
        .apply(Transaction::with_selection(
            vec![insert()],
            Selection::collapsed(Point::new(vec![0, 0], 2)),
        ))
        .unwrap();
    assert_eq!(editor.doc(), &Document::with_text("abbc"));
    assert_eq!(
        editor.selection(),
        &Selection::collapsed(Point::new(vec![0, 0], 2))
    );
}

#[test]
fn transaction_serializes_ops_and_selection_only() {
    let tx = Transaction::with_selection(
        vec![Op::RemoveNode { path: vec![0, 1] }],
        Selection::collapsed(Point::new(vec![0, 0], 0)),
    );
    let value = serde_json::to_value(&tx).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "ops": [{ "op": "remove_node", "path": [0, 1] }],
            "selection_after": {
                "anchor": { "path": [0, 0], "offset": 0 },
                "focus": { "path": [0, 0], "offset": 0 },
            },
        })
    );
    assert_eq!(serde_json::from_value::<Transaction>(value).unwrap(), tx);
    assert!(Transaction::default().is_empty());
}

#[test]
fn unnormalizable_document_is_an_error_or_starts_empty() {
    let doc = Document {
        children: vec![Node::paragraph_with(vec![Node::text("a"), Node::text("b")])],
    };
    let caret = Selection::collapsed(Point::new(vec![0, 1], 1));
    let config = EditorConfig {
        max_normalize_iterations: 1,
    };

    let err = Editor::try_with_config(doc.clone(), caret.clone(), config.clone()).unwrap_err();
    assert_eq!(err, ApplyError::NormalizeDidNotConverge(1));

    let editor = Editor::with_config(doc, caret, config);
    assert_eq!(editor.doc(), &Document::empty());
    assert_eq!(
        editor.selection(),
        &Selection::collapsed(Point::new(vec![0, 0], 0))
    );
}
