use chat_composer_core::{
    Document, EmojiNode, MentionNode, Node, Point, Selection, normalize_ops, normalize_passes,
    normalize_selection,
};
use chat_composer_core::{Editor, EditorConfig};
use pretty_assertions::assert_eq;

fn normalized(children: Vec<Node>, caret: Point) -> Editor {
    Editor::new(Document { children }, Selection::collapsed(caret))
}

#[test]
fn empty_document_gets_a_paragraph() {
    let editor = normalized(Vec::new(), Point::new(vec![0, 0], 0));
    assert_eq!(editor.doc(), &Document::empty());
    assert_eq!(
        editor.selection(),
        &Selection::collapsed(Point::new(vec![0, 0], 0))
    );
}

#[test]
fn empty_paragraph_gets_a_text_leaf() {
    let editor = normalized(
        vec![Node::paragraph_with(Vec::new())],
        Point::new(vec![0, 0], 0),
    );
    assert_eq!(editor.doc(), &Document::empty());
}

#[test]
fn top_level_inlines_are_wrapped_in_paragraphs() {
    let editor = normalized(vec![Node::text("hi")], Point::new(vec![0, 0], 0));
    assert_eq!(editor.doc(), &Document::with_text("hi"));
}

#[test]
fn nested_paragraphs_are_flattened() {
    let editor = normalized(
        vec![Node::paragraph_with(vec![
            Node::text("a"),
            Node::paragraph("b"),
        ])],
        Point::new(vec![0, 0], 0),
    );
    assert_eq!(editor.doc(), &Document::with_text("ab"));
}

#[test]
fn adjacent_runs_merge_and_caret_follows_the_text() {
    let editor = normalized(
        vec![Node::paragraph_with(vec![Node::text("ab"), Node::text("cd")])],
        Point::new(vec![0, 1], 1),
    );
    assert_eq!(editor.doc(), &Document::with_text("abcd"));
    assert_eq!(
        editor.selection(),
        &Selection::collapsed(Point::new(vec![0, 0], 3))
    );
}

#[test]
fn voids_get_text_runs_on_both_sides() {
    let editor = normalized(
        vec![Node::paragraph_with(vec![
            Node::mention("Bob"),
            Node::mention("Ann"),
        ])],
        Point::new(vec![0, 0], 0),
    );
    assert_eq!(
        editor.doc().children,
        vec![Node::paragraph_with(vec![
            Node::text(""),
            Node::mention("Bob"),
            Node::text(""),
            Node::mention("Ann"),
            Node::text(""),
        ])]
    );
}

#[test]
fn void_placeholder_children_are_restored() {
    let editor = normalized(
        vec![Node::paragraph_with(vec![
            Node::text("a"),
            Node::Mention(MentionNode {
                display_name: "Bob".to_string(),
                children: Vec::new(),
            }),
            Node::text("b"),
            Node::Emoji(EmojiNode {
                alt_text: "wave".to_string(),
                image_url: "https://cdn.test/wave.png".to_string(),
                name: "wave".to_string(),
                children: vec![Default::default(), Default::default()],
            }),
            Node::text(""),
        ])],
        Point::new(vec![0, 0], 0),
    );
    assert_eq!(
        editor.doc().children,
        vec![Node::paragraph_with(vec![
            Node::text("a"),
            Node::mention("Bob"),
            Node::text("b"),
            Node::emoji("wave", "https://cdn.test/wave.png"),
            Node::text(""),
        ])]
    );
}

#[test]
fn normalized_document_produces_no_ops() {
    let editor = normalized(
        vec![Node::paragraph_with(vec![
            Node::text("x"),
            Node::mention("Bob"),
        ])],
        Point::new(vec![0, 0], 0),
    );
    assert!(normalize_ops(editor.doc()).is_empty());
}

#[test]
fn passes_have_unique_ids() {
    let mut ids: Vec<_> = normalize_passes().iter().map(|pass| pass.id()).collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);
}

#[test]
fn selection_is_clamped_into_existing_runs() {
    let doc = Document::with_text("héllo");
    let selection = Selection {
        anchor: Point::new(vec![0, 0], 2),
        focus: Point::new(vec![4, 0], 0),
    };
    assert_eq!(
        normalize_selection(&doc, &selection),
        Selection {
            anchor: Point::new(vec![0, 0], 1),
            focus: Point::new(vec![0, 0], "héllo".len()),
        }
    );
}

#[test]
fn iteration_limit_is_configurable() {
    let editor = Editor::with_config(
        Document {
            children: vec![Node::paragraph_with(vec![Node::mention("Bob")])],
        },
        Selection::collapsed(Point::new(vec![0, 0], 0)),
        EditorConfig {
            max_normalize_iterations: 50,
        },
    );
    assert!(normalize_ops(editor.doc()).is_empty());
}
