use super::rebase;
use crate::compiler::{compile, CompileOptions};
use crate::edit_plan::{Edit, IndexRange, NamedStyleType};
use crate::error::Error;
use crate::formats::markdown::MarkdownFormat;
use crate::formats::Format;

fn sample() -> Vec<Edit> {
    vec![
        Edit::insert_text(1, "Title\n"),
        Edit::set_paragraph_style(IndexRange::new(1, 6), NamedStyleType::Heading1),
        Edit::delete_range(IndexRange::new(7, 9)),
    ]
}

#[test]
fn test_rebase_shifts_every_field() {
    let mut edits = sample();
    rebase(&mut edits, 10).unwrap();
    assert_eq!(
        edits,
        vec![
            Edit::insert_text(11, "Title\n"),
            Edit::set_paragraph_style(IndexRange::new(11, 16), NamedStyleType::Heading1),
            Edit::delete_range(IndexRange::new(17, 19)),
        ]
    );
}

#[test]
fn test_rebase_moves_bullet_removal() {
    let mut edits = vec![Edit::delete_bullets(IndexRange::new(1, 2))];
    rebase(&mut edits, 5).unwrap();
    assert_eq!(edits, vec![Edit::delete_bullets(IndexRange::new(6, 7))]);
}

#[test]
fn test_rebase_there_and_back() {
    let mut edits = sample();
    rebase(&mut edits, 42).unwrap();
    rebase(&mut edits, -42).unwrap();
    assert_eq!(edits, sample());
}

#[test]
fn test_rebase_below_one_changes_nothing() {
    let mut edits = sample();
    let result = rebase(&mut edits, -1);
    assert!(matches!(
        result,
        Err(Error::IndexUnderflow {
            index: 1,
            offset: -1
        })
    ));
    assert_eq!(edits, sample(), "A failed rebase must not move anything");
}

#[test]
fn test_rebase_leaves_table_inserts_alone() {
    let mut edits = vec![Edit::insert_table(5, 2, 2)];
    rebase(&mut edits, 3).unwrap();
    assert_eq!(edits, vec![Edit::insert_table(5, 2, 2)]);
}

#[test]
fn test_script_rebased_moves_placeholders_and_cursor() {
    let tokens = MarkdownFormat.tokenize("Intro\n\n| A |\n|---|\n| 1 |\n");
    let script = compile(&tokens, &CompileOptions::default()).unwrap();
    let placeholder = script.tables[0].placeholder_range;
    let cursor = script.cursor;

    let moved = script.rebased(20).unwrap();
    assert_eq!(moved.cursor, cursor + 19);
    assert_eq!(
        moved.tables[0].placeholder_range,
        IndexRange::new(placeholder.start_index + 19, placeholder.end_index + 19)
    );
    assert_eq!(moved.requests[0], Edit::insert_text(20, "Intro\n"));
}

#[test]
fn test_script_rebased_to_start_is_identity() {
    let tokens = MarkdownFormat.tokenize("# Same\n");
    let script = compile(&tokens, &CompileOptions::default()).unwrap();
    let before = script.requests.clone();
    assert_eq!(script.rebased(1).unwrap().requests, before);
}
