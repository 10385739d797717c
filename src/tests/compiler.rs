use super::{compile, CompileOptions};
use crate::edit_plan::{BulletPreset, Edit, IndexRange, NamedStyleType, TextStyle};
use crate::error::Error;
use crate::formats::markdown::MarkdownFormat;
use crate::formats::Format;
use crate::token::{ListItem, TableCell, Token};

fn compile_markdown(source: &str) -> super::Script {
    let tokens = MarkdownFormat.tokenize(source);
    compile(&tokens, &CompileOptions::default()).unwrap()
}

fn bold() -> TextStyle {
    TextStyle {
        bold: Some(true),
        ..TextStyle::default()
    }
}

fn cell(text: &str) -> TableCell {
    TableCell {
        text: text.to_string(),
        tokens: Vec::new(),
    }
}

#[test]
fn test_heading_and_bold_paragraph() {
    let script = compile_markdown("# Title\n\nHello **world**");

    assert_eq!(
        script.requests,
        vec![
            Edit::insert_text(1, "Title\n"),
            Edit::set_paragraph_style(IndexRange::new(1, 6), NamedStyleType::Heading1),
            Edit::insert_text(7, "Hello world\n"),
            Edit::set_text_style(IndexRange::new(13, 18), bold()),
        ]
    );
    assert_eq!(script.cursor, 19);
}

#[test]
fn test_cursor_tracks_inserted_length() {
    let script = compile_markdown(
        "# Größe 😀\n\nSome *text* here.\n\n- a\n- b\n\n```\ncode\n```\n\n| A | B |\n|---|---|\n| 1 | 2 |\n",
    );
    assert_eq!(script.cursor, 1 + script.inserted_len());
}

#[test]
fn test_space_tokens_emit_nothing() {
    let script = compile(&[Token::Space, Token::Space], &CompileOptions::default()).unwrap();
    assert!(script.is_empty());
    assert_eq!(script.cursor, 1);
}

#[test]
fn test_nested_inline_styles_use_absolute_positions() {
    // **bold *and* nested**
    let script = compile_markdown("**bold *and* nested**");

    assert_eq!(script.requests[0], Edit::insert_text(1, "bold and nested\n"));
    assert!(script
        .requests
        .contains(&Edit::set_text_style(IndexRange::new(1, 16), bold())));
    assert!(
        script.requests.contains(&Edit::set_text_style(
            IndexRange::new(6, 9),
            TextStyle {
                italic: Some(true),
                ..TextStyle::default()
            }
        )),
        "Italic should cover 'and': {:#?}",
        script.requests
    );
}

#[test]
fn test_link_style() {
    let script = compile_markdown("Go [home](https://example.com)");
    let Some(Edit::SetTextStyle(link)) = script.requests.get(1) else {
        panic!("Expected a link style: {:#?}", script.requests);
    };
    assert_eq!(link.range, IndexRange::new(4, 8));
    assert_eq!(link.fields, "link");
    assert_eq!(
        link.text_style.link.as_ref().map(|l| l.url.as_str()),
        Some("https://example.com")
    );
}

#[test]
fn test_list_items_each_get_bullets() {
    let script = compile_markdown("1. one\n2. two\n");
    assert_eq!(
        script.requests,
        vec![
            Edit::insert_text(1, "one\n"),
            Edit::set_bullets(IndexRange::new(1, 5), BulletPreset::Ordered),
            Edit::insert_text(5, "two\n"),
            Edit::set_bullets(IndexRange::new(5, 9), BulletPreset::Ordered),
        ]
    );
}

#[test]
fn test_code_block_gets_monospace_and_trailing_blank_line() {
    let options = CompileOptions {
        code_font: "Fira Code".to_string(),
        ..CompileOptions::default()
    };
    let tokens = vec![Token::Code {
        lang: Some("sh".to_string()),
        text: "ls".to_string(),
    }];
    let script = compile(&tokens, &options).unwrap();

    assert_eq!(script.requests[0], Edit::insert_text(1, "ls\n\n"));
    let Edit::SetTextStyle(style) = &script.requests[1] else {
        panic!("Expected code styling");
    };
    assert_eq!(style.range, IndexRange::new(1, 3));
    assert_eq!(
        style
            .text_style
            .weighted_font_family
            .as_ref()
            .map(|f| f.font_family.as_str()),
        Some("Fira Code")
    );
    assert!(style.text_style.background_color.is_some());
    assert_eq!(script.cursor, 5);
}

#[test]
fn test_empty_code_block_is_not_styled() {
    let tokens = vec![Token::Code {
        lang: None,
        text: String::new(),
    }];
    let script = compile(&tokens, &CompileOptions::default()).unwrap();
    assert_eq!(script.requests, vec![Edit::insert_text(1, "\n\n")]);
}

#[test]
fn test_empty_heading_styles_its_newline() {
    let tokens = vec![Token::Heading {
        depth: 2,
        text: String::new(),
        tokens: Vec::new(),
    }];
    let script = compile(&tokens, &CompileOptions::default()).unwrap();
    assert_eq!(
        script.requests[1],
        Edit::set_paragraph_style(IndexRange::new(1, 2), NamedStyleType::Heading2)
    );
}

#[test]
fn test_table_becomes_placeholder() {
    let tokens = vec![
        Token::Paragraph {
            text: "Intro".to_string(),
            tokens: vec![Token::text("Intro")],
        },
        Token::Table {
            header: vec![cell("Name"), cell("Value")],
            rows: vec![vec![cell("a"), cell("1")], vec![cell("b"), cell("")]],
        },
    ];
    let script = compile(&tokens, &CompileOptions::default()).unwrap();

    assert_eq!(script.requests[1], Edit::insert_text(7, "[TABLE:3x2]\n"));
    assert_eq!(script.tables.len(), 1);

    let table = &script.tables[0];
    assert_eq!(table.marker(), "[TABLE:3x2]");
    assert_eq!(table.placeholder_range, IndexRange::new(7, 18));
    assert_eq!((table.rows, table.cols), (3, 2));
    assert_eq!(table.cell_data.len(), 6);
    assert!(table.cell_data.iter().filter(|c| c.row == 0).all(|c| c.bold));
    assert!(table.cell_data.iter().filter(|c| c.row > 0).all(|c| !c.bold));
    assert_eq!(table.cell_data[3].text, "1");
}

#[test]
fn test_headerless_table_is_skipped() {
    let tokens = vec![Token::Table {
        header: Vec::new(),
        rows: vec![vec![cell("x")]],
    }];
    let script = compile(&tokens, &CompileOptions::default()).unwrap();
    assert!(script.is_empty());
    assert!(script.tables.is_empty());
}

#[test]
fn test_too_deep_input_is_refused() {
    let mut token = Token::text("x");
    for _ in 0..40 {
        token = Token::Em {
            text: "*x*".to_string(),
            tokens: vec![token],
        };
    }
    let tokens = vec![Token::Paragraph {
        text: "x".to_string(),
        tokens: vec![token],
    }];

    let result = compile(&tokens, &CompileOptions::default());
    assert!(
        matches!(result, Err(Error::NestingTooDeep { limit: 32, .. })),
        "Expected nesting error, got {result:?}"
    );
}

#[test]
fn test_list_items_flatten_their_markup() {
    let tokens = vec![Token::List {
        ordered: false,
        items: vec![ListItem {
            text: "**hi**".to_string(),
            tokens: vec![Token::Strong {
                text: "**hi**".to_string(),
                tokens: vec![Token::text("hi")],
            }],
        }],
    }];
    let script = compile(&tokens, &CompileOptions::default()).unwrap();
    assert_eq!(script.requests[0], Edit::insert_text(1, "hi\n"));
    assert!(script
        .requests
        .contains(&Edit::set_text_style(IndexRange::new(1, 3), bold())));
}
