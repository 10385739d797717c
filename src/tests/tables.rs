use super::{cell_edits, find_placeholder, materialize_tables, TableReport};
use crate::compiler::{compile, CellData, CompileOptions, TableSpec};
use crate::edit_plan::{Edit, EditPlan, IndexRange, TextStyle};
use crate::formats::markdown::MarkdownFormat;
use crate::formats::Format;
use crate::service::{DocumentService, MemoryDocument};

fn apply(memory: &mut MemoryDocument, edits: Vec<Edit>) {
    let snapshot = memory.snapshot();
    memory
        .apply("doc", EditPlan::against(&snapshot, edits))
        .unwrap();
}

fn spec(rows: u32, cols: u32, cell_data: Vec<CellData>) -> TableSpec {
    TableSpec {
        placeholder_range: IndexRange::new(1, 1),
        rows,
        cols,
        cell_data,
    }
}

fn data(row: u32, col: u32, text: &str) -> CellData {
    CellData {
        row,
        col,
        text: text.to_string(),
        bold: row == 0,
    }
}

#[test]
fn test_find_placeholder_covers_marker_only() {
    let mut memory = MemoryDocument::new("doc");
    apply(&mut memory, vec![Edit::insert_text(1, "Intro\n[TABLE:2x1]\n")]);
    let doc = memory.snapshot();

    let found = find_placeholder(&doc, "[TABLE:2x1]", 1);
    assert_eq!(found, Some(IndexRange::new(7, 18)));
    assert_eq!(find_placeholder(&doc, "[TABLE:9x9]", 1), None);
}

#[test]
fn test_find_placeholder_starts_at_search_point() {
    let mut memory = MemoryDocument::new("doc");
    apply(
        &mut memory,
        vec![Edit::insert_text(1, "[TABLE:1x1]\nmiddle\n[TABLE:1x1]\n")],
    );
    let doc = memory.snapshot();

    assert_eq!(
        find_placeholder(&doc, "[TABLE:1x1]", 1).map(|r| r.start_index),
        Some(1)
    );
    assert_eq!(
        find_placeholder(&doc, "[TABLE:1x1]", 2).map(|r| r.start_index),
        Some(20),
        "A placeholder before the splice point is not ours"
    );
}

#[test]
fn test_cell_edits_shift_and_bold() {
    let mut memory = MemoryDocument::new("doc");
    apply(&mut memory, vec![Edit::insert_table(1, 2, 2)]);
    let doc = memory.snapshot();
    let (_, table) = doc.tables().next().unwrap();

    let (edits, skipped) = cell_edits(
        table,
        &spec(
            2,
            2,
            vec![
                data(0, 0, "A"),
                data(0, 1, "B"),
                data(1, 0, "1"),
                data(1, 1, "22"),
            ],
        ),
    );

    let bold = TextStyle {
        bold: Some(true),
        ..TextStyle::default()
    };
    assert_eq!(skipped, 0);
    assert_eq!(
        edits,
        vec![
            Edit::insert_text(4, "A"),
            Edit::set_text_style(IndexRange::new(4, 5), bold.clone()),
            Edit::insert_text(7, "B"),
            Edit::set_text_style(IndexRange::new(7, 8), bold),
            Edit::insert_text(11, "1"),
            Edit::insert_text(14, "22"),
        ]
    );
}

#[test]
fn test_cell_edits_follow_anchor_order() {
    let mut memory = MemoryDocument::new("doc");
    apply(&mut memory, vec![Edit::insert_table(1, 2, 2)]);
    let doc = memory.snapshot();
    let (_, table) = doc.tables().next().unwrap();

    let (edits, skipped) = cell_edits(
        table,
        &spec(
            2,
            2,
            vec![
                data(1, 1, "22"),
                data(1, 0, "1"),
                data(0, 1, "B"),
                data(0, 0, "A"),
            ],
        ),
    );

    let bold = TextStyle {
        bold: Some(true),
        ..TextStyle::default()
    };
    assert_eq!(skipped, 0);
    assert_eq!(
        edits,
        vec![
            Edit::insert_text(4, "A"),
            Edit::set_text_style(IndexRange::new(4, 5), bold.clone()),
            Edit::insert_text(7, "B"),
            Edit::set_text_style(IndexRange::new(7, 8), bold),
            Edit::insert_text(11, "1"),
            Edit::insert_text(14, "22"),
        ],
        "Cells are filled by anchor, whatever order they were recorded in"
    );
}

#[test]
fn test_cell_edits_never_overwrite() {
    let mut memory = MemoryDocument::new("doc");
    apply(&mut memory, vec![Edit::insert_table(1, 1, 2)]);
    apply(&mut memory, vec![Edit::insert_text(6, "taken")]);
    let doc = memory.snapshot();
    let (_, table) = doc.tables().next().unwrap();

    let (edits, skipped) = cell_edits(
        table,
        &spec(
            1,
            2,
            vec![data(0, 0, "h"), data(0, 1, "y"), data(3, 3, "far away")],
        ),
    );

    assert_eq!(skipped, 2, "One occupied cell and one out of bounds");
    assert_eq!(edits.len(), 2);
    assert_eq!(edits[0], Edit::insert_text(4, "h"));
}

#[test]
fn test_empty_cell_text_is_not_inserted() {
    let mut memory = MemoryDocument::new("doc");
    apply(&mut memory, vec![Edit::insert_table(1, 1, 1)]);
    let doc = memory.snapshot();
    let (_, table) = doc.tables().next().unwrap();

    let (edits, skipped) = cell_edits(table, &spec(1, 1, vec![data(0, 0, "")]));
    assert!(edits.is_empty());
    assert_eq!(skipped, 0);
}

#[test]
fn test_materialize_fills_table() {
    let tokens = MarkdownFormat.tokenize("Intro\n\n| A | B |\n|---|---|\n| 1 | 2 |\n");
    let script = compile(&tokens, &CompileOptions::default()).unwrap();
    let mut memory = MemoryDocument::new("doc");
    apply(&mut memory, script.requests.clone());

    let report = materialize_tables(&mut memory, "doc", &script.tables, 1).unwrap();
    assert_eq!(
        report,
        TableReport {
            tables_materialized: 1,
            tables_skipped: 0,
            cells_written: 4,
            cells_skipped: 0,
        }
    );

    let doc = memory.snapshot();
    assert!(
        find_placeholder(&doc, "[TABLE:2x2]", 1).is_none(),
        "Placeholder text should be gone"
    );
    let (_, table) = doc.tables().next().unwrap();
    let texts: Vec<String> = (0..2)
        .flat_map(|row| (0..2).map(move |col| (row, col)))
        .map(|(row, col)| table.cell(row, col).unwrap().text())
        .collect();
    assert_eq!(texts, vec!["A\n", "B\n", "1\n", "2\n"]);

    let header_run = table.cell(0, 0).unwrap().content[0]
        .paragraph
        .as_ref()
        .unwrap()
        .elements[0]
        .text_run
        .clone()
        .unwrap();
    assert_eq!(header_run.text_style.bold, Some(true));
    let (intro, _) = doc.paragraphs().next().unwrap();
    assert_eq!(intro.range(), IndexRange::new(1, 7), "Text before the table is untouched");
}

#[test]
fn test_missing_placeholder_is_skipped() {
    let mut memory = MemoryDocument::new("doc");
    apply(&mut memory, vec![Edit::insert_text(1, "no tables here\n")]);

    let report =
        materialize_tables(&mut memory, "doc", &[spec(2, 2, vec![data(0, 0, "x")])], 1).unwrap();
    assert_eq!(report.tables_skipped, 1);
    assert_eq!(report.tables_materialized, 0);
    assert_eq!(memory.text(), "no tables here\n\n");
}
