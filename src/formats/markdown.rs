//! Markdown format implementation using pulldown-cmark.
//!
//! The event stream is folded into the block/inline token tree with an explicit frame stack.
//! Nested lists are flattened into their enclosing list in document order, and a `Space` token
//! marks every blank line between top-level blocks.

use crate::formats::Format;
use crate::token::{plain_text_all, ListItem, TableCell, Token};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use std::ops::Range;

/// GitHub-flavoured markdown with pipe tables.
pub struct MarkdownFormat;

impl Format for MarkdownFormat {
    fn tokenize(&self, source: &str) -> Vec<Token> {
        let mut builder = TreeBuilder::new(source);
        for (event, span) in Parser::new_ext(source, Options::ENABLE_TABLES).into_offset_iter() {
            builder.event(event, span);
        }
        builder.blocks
    }
}

enum InlineKind {
    Strong,
    Em,
    Link(String),
    Plain,
}

enum Frame {
    Heading {
        depth: u8,
        span: Range<usize>,
        tokens: Vec<Token>,
    },
    Paragraph {
        span: Range<usize>,
        tokens: Vec<Token>,
    },
    Inline {
        kind: InlineKind,
        span: Range<usize>,
        tokens: Vec<Token>,
    },
    List {
        ordered: bool,
        span: Range<usize>,
        items: Vec<ListItem>,
    },
    Item {
        tokens: Vec<Token>,
        nested: Vec<ListItem>,
    },
    Code {
        lang: Option<String>,
        span: Range<usize>,
        text: String,
    },
    Table {
        span: Range<usize>,
        header: Vec<TableCell>,
        rows: Vec<Vec<TableCell>>,
    },
    Row {
        cells: Vec<TableCell>,
    },
    Cell {
        span: Range<usize>,
        tokens: Vec<Token>,
    },
    Container,
}

struct TreeBuilder<'a> {
    source: &'a str,
    blocks: Vec<Token>,
    stack: Vec<Frame>,
    last_block_end: Option<usize>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            blocks: Vec::new(),
            stack: Vec::new(),
            last_block_end: None,
        }
    }

    fn raw(&self, span: &Range<usize>) -> &'a str {
        self.source.get(span.clone()).unwrap_or("")
    }

    fn event(&mut self, event: Event<'_>, span: Range<usize>) {
        match event {
            Event::Start(tag) => self.start(tag, span),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some(Frame::Code { text: code, .. }) = self.stack.last_mut() {
                    code.push_str(&text);
                } else {
                    self.push_inline(Token::text(text.to_string()));
                }
            }
            Event::Code(text) => self.push_inline(Token::Codespan {
                text: text.to_string(),
            }),
            Event::InlineHtml(html) | Event::Html(html) => {
                self.push_inline(Token::text(html.trim_end_matches('\n').to_string()));
            }
            Event::SoftBreak => self.push_inline(Token::text(" ")),
            Event::HardBreak => self.push_inline(Token::text("\n")),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>, span: Range<usize>) {
        let frame = match tag {
            Tag::Heading { level, .. } => Frame::Heading {
                depth: level as u8,
                span,
                tokens: Vec::new(),
            },
            Tag::Paragraph => Frame::Paragraph {
                span,
                tokens: Vec::new(),
            },
            Tag::Strong => Frame::Inline {
                kind: InlineKind::Strong,
                span,
                tokens: Vec::new(),
            },
            Tag::Emphasis => Frame::Inline {
                kind: InlineKind::Em,
                span,
                tokens: Vec::new(),
            },
            Tag::Link { dest_url, .. } => Frame::Inline {
                kind: InlineKind::Link(dest_url.to_string()),
                span,
                tokens: Vec::new(),
            },
            Tag::Image { .. } | Tag::Strikethrough => Frame::Inline {
                kind: InlineKind::Plain,
                span,
                tokens: Vec::new(),
            },
            Tag::List(first) => Frame::List {
                ordered: first.is_some(),
                span,
                items: Vec::new(),
            },
            Tag::Item => Frame::Item {
                tokens: Vec::new(),
                nested: Vec::new(),
            },
            Tag::CodeBlock(kind) => Frame::Code {
                lang: match kind {
                    CodeBlockKind::Fenced(info) if !info.is_empty() => Some(info.to_string()),
                    _ => None,
                },
                span,
                text: String::new(),
            },
            Tag::Table(_) => Frame::Table {
                span,
                header: Vec::new(),
                rows: Vec::new(),
            },
            Tag::TableHead | Tag::TableRow => Frame::Row { cells: Vec::new() },
            Tag::TableCell => Frame::Cell {
                span,
                tokens: Vec::new(),
            },
            _ => Frame::Container,
        };
        self.stack.push(frame);
    }

    fn end(&mut self, tag: TagEnd) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame {
            Frame::Heading {
                depth,
                span,
                tokens,
            } => {
                let text = self
                    .raw(&span)
                    .lines()
                    .next()
                    .unwrap_or("")
                    .trim()
                    .trim_start_matches('#')
                    .trim_end_matches('#')
                    .trim()
                    .to_string();
                let heading = Token::Heading {
                    depth,
                    text,
                    tokens,
                };
                self.push_block(heading, &span);
            }
            Frame::Paragraph { span, tokens } => {
                if let Some(Frame::Item { tokens: item, .. }) = self.stack.last_mut() {
                    if !item.is_empty() {
                        item.push(Token::text(" "));
                    }
                    item.extend(tokens);
                } else {
                    let text = self.raw(&span).trim_end().to_string();
                    self.push_block(Token::Paragraph { text, tokens }, &span);
                }
            }
            Frame::Inline { kind, span, tokens } => {
                let text = self.raw(&span).to_string();
                let token = match kind {
                    InlineKind::Strong => Token::Strong { text, tokens },
                    InlineKind::Em => Token::Em { text, tokens },
                    InlineKind::Link(href) => Token::Link { href, text, tokens },
                    InlineKind::Plain => Token::Text { text, tokens },
                };
                self.push_inline(token);
            }
            Frame::List {
                ordered,
                span,
                items,
            } => {
                if let Some(Frame::Item { nested, .. }) = self.stack.last_mut() {
                    nested.extend(items);
                } else {
                    self.push_block(Token::List { ordered, items }, &span);
                }
            }
            Frame::Item { tokens, nested } => {
                if let Some(Frame::List { items, .. }) = self.stack.last_mut() {
                    items.push(ListItem {
                        text: plain_text_all(&tokens),
                        tokens,
                    });
                    items.extend(nested);
                }
            }
            Frame::Code { lang, span, text } => {
                let text = text.strip_suffix('\n').unwrap_or(&text).to_string();
                if let Some(Frame::Item { tokens, .. }) = self.stack.last_mut() {
                    tokens.push(Token::text(text));
                } else {
                    self.push_block(Token::Code { lang, text }, &span);
                }
            }
            Frame::Table { span, header, rows } => {
                self.push_block(Token::Table { header, rows }, &span);
            }
            Frame::Row { cells } => {
                if let Some(Frame::Table { header, rows, .. }) = self.stack.last_mut() {
                    if matches!(tag, TagEnd::TableHead) {
                        *header = cells;
                    } else {
                        rows.push(cells);
                    }
                }
            }
            Frame::Cell { span, tokens } => {
                let text = self.raw(&span).trim().trim_matches('|').trim().to_string();
                if let Some(Frame::Row { cells }) = self.stack.last_mut() {
                    cells.push(TableCell { text, tokens });
                }
            }
            Frame::Container => {}
        }
    }

    fn push_inline(&mut self, token: Token) {
        match self.stack.last_mut() {
            Some(
                Frame::Heading { tokens, .. }
                | Frame::Paragraph { tokens, .. }
                | Frame::Inline { tokens, .. }
                | Frame::Item { tokens, .. }
                | Frame::Cell { tokens, .. },
            ) => tokens.push(token),
            _ => {}
        }
    }

    /// Emit a top-level block, preceded by `Space` if a blank line separates it from the last one.
    fn push_block(&mut self, token: Token, span: &Range<usize>) {
        if let Some(previous_end) = self.last_block_end {
            let gap = self.source.get(previous_end..span.start).unwrap_or("");
            if gap.matches('\n').count() >= 2 {
                self.blocks.push(Token::Space);
            }
        }
        let trimmed_end = span.start + self.raw(span).trim_end().len();
        self.last_block_end = Some(trimmed_end);
        self.blocks.push(token);
    }
}

#[cfg(test)]
#[path = "../tests/markdown.rs"]
mod tests;
