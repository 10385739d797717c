use super::MarkdownFormat;
use crate::formats::Format;
use crate::token::{cell_text, item_text, plain_text, Token};

fn tokenize(source: &str) -> Vec<Token> {
    MarkdownFormat.tokenize(source)
}

#[test]
fn test_heading_space_paragraph() {
    let tokens = tokenize("# Title\n\nHello **world**");

    assert_eq!(tokens.len(), 3, "Expected heading, space, paragraph: {tokens:#?}");
    match &tokens[0] {
        Token::Heading { depth, text, .. } => {
            assert_eq!(*depth, 1);
            assert_eq!(text, "Title");
        }
        other => panic!("Expected heading, got {other:?}"),
    }
    assert_eq!(tokens[1], Token::Space);
    assert_eq!(plain_text(&tokens[2]), "Hello world");

    let Some(children) = tokens[2].children() else {
        panic!("Paragraph should have inline children");
    };
    let strong = children
        .iter()
        .find(|t| matches!(t, Token::Strong { .. }))
        .unwrap();
    assert_eq!(strong.literal(), "**world**", "Raw markup is kept on the node");
    assert_eq!(plain_text(strong), "world");
}

#[test]
fn test_heading_depths() {
    let tokens = tokenize("# One\n## Two\n### Three");
    let depths: Vec<u8> = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Heading { depth, .. } => Some(*depth),
            _ => None,
        })
        .collect();
    assert_eq!(depths, vec![1, 2, 3]);
    assert!(
        !tokens.contains(&Token::Space),
        "No blank lines, so no space tokens"
    );
}

#[test]
fn test_soft_break_joins_lines() {
    let tokens = tokenize("line one\nline two");
    assert_eq!(tokens.len(), 1);
    assert_eq!(plain_text(&tokens[0]), "line one line two");
}

#[test]
fn test_nested_list_is_flattened() {
    let tokens = tokenize("- one\n- two\n  - nested\n- three\n");
    assert_eq!(tokens.len(), 1);
    let Token::List { ordered, items } = &tokens[0] else {
        panic!("Expected list, got {:?}", tokens[0]);
    };
    assert!(!ordered);
    let texts: Vec<String> = items.iter().map(item_text).collect();
    assert_eq!(texts, vec!["one", "two", "nested", "three"]);
}

#[test]
fn test_ordered_list() {
    let tokens = tokenize("1. first\n2. *second*\n");
    let Token::List { ordered, items } = &tokens[0] else {
        panic!("Expected list");
    };
    assert!(ordered);
    assert_eq!(item_text(&items[1]), "second");
}

#[test]
fn test_fenced_code_block() {
    let tokens = tokenize("```rust\nfn main() {}\n```\n");
    assert_eq!(
        tokens,
        vec![Token::Code {
            lang: Some("rust".to_string()),
            text: "fn main() {}".to_string(),
        }]
    );
}

#[test]
fn test_pipe_table() {
    let tokens = tokenize("| Name | Value |\n|------|-------|\n| a | **1** |\n| b | 2 |\n");
    let Token::Table { header, rows } = &tokens[0] else {
        panic!("Expected table, got {tokens:?}");
    };
    let header: Vec<String> = header.iter().map(cell_text).collect();
    assert_eq!(header, vec!["Name", "Value"]);
    assert_eq!(rows.len(), 2);
    assert_eq!(cell_text(&rows[0][1]), "1");
    assert_eq!(cell_text(&rows[1][0]), "b");
}

#[test]
fn test_link_and_codespan() {
    let tokens = tokenize("Read [the guide](https://example.com) or run `make`.");
    let children = tokens[0].children().unwrap();
    assert!(children.iter().any(|t| matches!(
        t,
        Token::Link { href, .. } if href == "https://example.com"
    )));
    assert!(children
        .iter()
        .any(|t| matches!(t, Token::Codespan { text } if text == "make")));
    assert_eq!(plain_text(&tokens[0]), "Read the guide or run make.");
}

#[test]
fn test_empty_source() {
    assert!(tokenize("").is_empty());
}
