//! The token tree consumed by the compiler.
//!
//! Block tokens (headings, paragraphs, lists, code, tables) sit at the top level and own inline
//! spans. Formatting spans carry both their raw markup in `text` and their semantic content in
//! `tokens`, so anything that wants visible text must go through [`plain_text`] rather than
//! reading `text` directly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// One node of a lexed markdown document.
pub enum Token {
    /// ATX or setext heading, `depth` 1 to 6.
    Heading {
        /// Heading level.
        depth: u8,
        /// Raw source text.
        text: String,
        /// Inline content.
        tokens: Vec<Token>,
    },
    /// A paragraph of inline content.
    Paragraph {
        /// Raw source text.
        text: String,
        /// Inline content.
        tokens: Vec<Token>,
    },
    /// Bulleted or numbered list, nested lists already flattened into their items.
    List {
        /// Numbered rather than bulleted.
        ordered: bool,
        /// Entries in order.
        items: Vec<ListItem>,
    },
    /// Fenced or indented code, `text` without its trailing newline.
    Code {
        /// Info string of a fenced block.
        lang: Option<String>,
        /// The code.
        text: String,
    },
    /// Pipe table.
    Table {
        /// Header row.
        header: Vec<TableCell>,
        /// Body rows.
        rows: Vec<Vec<TableCell>>,
    },
    /// Blank line between blocks.
    Space,
    /// Bold span.
    Strong {
        /// Raw markup, delimiters included.
        text: String,
        /// Content inside the delimiters.
        tokens: Vec<Token>,
    },
    /// Italic span.
    Em {
        /// Raw markup, delimiters included.
        text: String,
        /// Content inside the delimiters.
        tokens: Vec<Token>,
    },
    /// Hyperlink.
    Link {
        /// Target URL.
        href: String,
        /// Raw markup.
        text: String,
        /// Link label.
        tokens: Vec<Token>,
    },
    /// Inline code.
    Codespan {
        /// The code, without backticks.
        text: String,
    },
    /// Plain text run.
    Text {
        /// The text.
        text: String,
        /// Nested content, usually empty.
        #[serde(default)]
        tokens: Vec<Token>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A single bullet or numbered entry.
pub struct ListItem {
    /// Raw source text.
    pub text: String,
    /// Inline content.
    pub tokens: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A header or body cell of a pipe table.
pub struct TableCell {
    /// Raw source text.
    pub text: String,
    /// Inline content.
    pub tokens: Vec<Token>,
}

impl Token {
    /// Convenience constructor for an unstyled run.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            tokens: Vec::new(),
        }
    }

    /// Nested inline content, if this node has any.
    #[must_use]
    pub fn children(&self) -> Option<&[Token]> {
        let tokens = match self {
            Self::Heading { tokens, .. }
            | Self::Paragraph { tokens, .. }
            | Self::Strong { tokens, .. }
            | Self::Em { tokens, .. }
            | Self::Link { tokens, .. }
            | Self::Text { tokens, .. } => tokens,
            _ => return None,
        };
        if tokens.is_empty() {
            None
        } else {
            Some(tokens)
        }
    }

    /// The node's own literal text, ignoring any children.
    #[must_use]
    pub fn literal(&self) -> &str {
        match self {
            Self::Heading { text, .. }
            | Self::Paragraph { text, .. }
            | Self::Code { text, .. }
            | Self::Strong { text, .. }
            | Self::Em { text, .. }
            | Self::Link { text, .. }
            | Self::Codespan { text }
            | Self::Text { text, .. } => text,
            Self::List { .. } | Self::Table { .. } => "",
            Self::Space => " ",
        }
    }
}

/// Visible text of a node: children first, literal text only for leaves.
#[must_use]
pub fn plain_text(token: &Token) -> String {
    let mut out = String::new();
    push_plain_text(token, &mut out);
    out
}

/// Visible text of a sequence of sibling nodes.
#[must_use]
pub fn plain_text_all(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        push_plain_text(token, &mut out);
    }
    out
}

fn push_plain_text(token: &Token, out: &mut String) {
    match token {
        Token::List { items, .. } => {
            for item in items {
                out.push_str(&item_text(item));
            }
        }
        Token::Table { .. } => {}
        _ => match token.children() {
            Some(children) => {
                for child in children {
                    push_plain_text(child, out);
                }
            }
            None => out.push_str(token.literal()),
        },
    }
}

/// Visible text of a list item.
#[must_use]
pub fn item_text(item: &ListItem) -> String {
    if item.tokens.is_empty() {
        item.text.clone()
    } else {
        plain_text_all(&item.tokens)
    }
}

/// Visible text of a table cell.
#[must_use]
pub fn cell_text(cell: &TableCell) -> String {
    if cell.tokens.is_empty() {
        cell.text.clone()
    } else {
        plain_text_all(&cell.tokens)
    }
}

/// Deepest nesting level in a token forest, computed without recursion.
///
/// Top-level tokens are depth 1.
#[must_use]
pub fn nesting_depth(tokens: &[Token]) -> usize {
    let mut stack: Vec<(&Token, usize)> = tokens.iter().map(|t| (t, 1)).collect();
    let mut deepest = 0;
    while let Some((token, depth)) = stack.pop() {
        deepest = deepest.max(depth);
        match token {
            Token::List { items, .. } => {
                for item in items {
                    stack.extend(item.tokens.iter().map(|t| (t, depth + 1)));
                }
            }
            Token::Table { header, rows } => {
                for cell in header.iter().chain(rows.iter().flatten()) {
                    stack.extend(cell.tokens.iter().map(|t| (t, depth + 1)));
                }
            }
            _ => {
                if let Some(children) = token.children() {
                    stack.extend(children.iter().map(|t| (t, depth + 1)));
                }
            }
        }
    }
    deepest
}

/// Length of `text` in the units the remote document indexes by (UTF-16 code units).
#[must_use]
pub fn utf16_len(text: &str) -> u32 {
    u32::try_from(text.encode_utf16().count()).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[path = "tests/token.rs"]
mod tests;
