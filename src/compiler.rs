//! Compiles a markdown token tree into an ordered edit script.
//!
//! The script is laid out as if it were written into an empty document starting at position 1.
//! A running cursor tracks where the next block lands; every style range is derived from the
//! cursor and from the flattened length of the inline spans before it, never from the raw
//! markup length. Tables cannot be inserted natively alongside plain text in one pass, so each
//! one becomes a `[TABLE:RxC]` placeholder paragraph plus a [`TableSpec`] for the second pass.

use crate::config::Config;
use crate::edit_plan::{
    BulletPreset, Edit, IndexRange, Link, NamedStyleType, OptionalColor, TextStyle,
    WeightedFontFamily,
};
use crate::error::{Error, Result};
use crate::token::{cell_text, item_text, nesting_depth, plain_text, utf16_len, TableCell, Token};
use serde::Serialize;

/// Background fill for code blocks and inline code.
const CODE_BACKGROUND: f64 = 0.95;

#[derive(Clone, Debug)]
/// Knobs that change what the compiler emits.
pub struct CompileOptions {
    /// Monospace family for code.
    pub code_font: String,
    /// Deepest token nesting accepted before compilation is refused.
    pub max_nesting: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            code_font: "Courier New".to_string(),
            max_nesting: 32,
        }
    }
}

impl From<&Config> for CompileOptions {
    fn from(config: &Config) -> Self {
        Self {
            code_font: config.code_font.clone(),
            max_nesting: config.max_nesting,
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// Text destined for one cell of a materialized table.
pub struct CellData {
    /// Zero-based row, the header being row 0.
    pub row: u32,
    /// Zero-based column.
    pub col: u32,
    /// Flattened cell text.
    pub text: String,
    /// Header cells (row 0) are always bold.
    pub bold: bool,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// A table waiting to replace its placeholder paragraph.
pub struct TableSpec {
    /// Marker text, excluding the paragraph's newline.
    pub placeholder_range: IndexRange,
    /// Header row included.
    pub rows: u32,
    /// Column count, taken from the header.
    pub cols: u32,
    /// Every cell's text in row-major order.
    pub cell_data: Vec<CellData>,
}

impl TableSpec {
    /// The literal placeholder text this table was compiled to.
    #[must_use]
    pub fn marker(&self) -> String {
        placeholder(self.rows, self.cols)
    }
}

fn placeholder(rows: u32, cols: u32) -> String {
    format!("[TABLE:{rows}x{cols}]")
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
/// Compiled edits together with the tables still to materialize.
pub struct Script {
    /// Edits in application order.
    pub requests: Vec<Edit>,
    /// Tables in document order.
    pub tables: Vec<TableSpec>,
    /// Position after the last inserted character.
    pub cursor: u32,
}

impl Script {
    /// Total UTF-16 length of every inserted text.
    #[must_use]
    pub fn inserted_len(&self) -> u32 {
        self.requests.iter().map(Edit::inserted_len).sum()
    }

    /// Whether compiling produced no edits at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// Compile top-level `tokens` into a script that starts at position 1.
///
/// # Errors
///
/// Returns [`Error::NestingTooDeep`] if the token tree is deeper than `options.max_nesting`.
pub fn compile(tokens: &[Token], options: &CompileOptions) -> Result<Script> {
    let depth = nesting_depth(tokens);
    if depth > options.max_nesting {
        return Err(Error::NestingTooDeep {
            depth,
            limit: options.max_nesting,
        });
    }

    let mut emitter = Emitter {
        options,
        cursor: 1,
        requests: Vec::new(),
        tables: Vec::new(),
    };
    for token in tokens {
        emitter.block(token);
    }
    tracing::debug!(
        requests = emitter.requests.len(),
        tables = emitter.tables.len(),
        cursor = emitter.cursor,
        "compiled script"
    );

    Ok(Script {
        requests: emitter.requests,
        tables: emitter.tables,
        cursor: emitter.cursor,
    })
}

struct Emitter<'o> {
    options: &'o CompileOptions,
    cursor: u32,
    requests: Vec<Edit>,
    tables: Vec<TableSpec>,
}

impl Emitter<'_> {
    /// Insert `text` at the cursor and return the span it now occupies.
    fn insert(&mut self, text: String) -> IndexRange {
        let start = self.cursor;
        self.cursor += utf16_len(&text);
        self.requests.push(Edit::insert_text(start, text));
        IndexRange::new(start, self.cursor)
    }

    fn block(&mut self, token: &Token) {
        match token {
            Token::Space => {}
            Token::Heading { depth, .. } => {
                let span = self.insert(format!("{}\n", plain_text(token)));
                let styled = without_newline(span);
                self.requests.push(Edit::set_paragraph_style(
                    if styled.is_empty() { span } else { styled },
                    NamedStyleType::heading(*depth),
                ));
                if let Some(children) = token.children() {
                    self.inline(children, span.start_index);
                }
            }
            Token::List { ordered, items } => {
                let preset = if *ordered {
                    BulletPreset::Ordered
                } else {
                    BulletPreset::Unordered
                };
                for item in items {
                    let span = self.insert(format!("{}\n", item_text(item)));
                    self.requests.push(Edit::set_bullets(span, preset));
                    self.inline(&item.tokens, span.start_index);
                }
            }
            Token::Code { text, .. } => {
                let span = self.insert(format!("{text}\n\n"));
                let code = IndexRange::new(span.start_index, span.end_index - 2);
                if !code.is_empty() {
                    let style = self.code_style();
                    self.requests.push(Edit::set_text_style(code, style));
                }
            }
            Token::Table { header, rows } => self.table(header, rows),
            _ => {
                let span = self.insert(format!("{}\n", plain_text(token)));
                if let Some(children) = token.children() {
                    self.inline(children, span.start_index);
                }
            }
        }
    }

    /// Style inline spans of a block whose visible text begins at `start`.
    fn inline(&mut self, children: &[Token], start: u32) {
        let mut offset = 0;
        for child in children {
            let len = utf16_len(&plain_text(child));
            let at = start + offset;
            if len > 0 {
                if let Some(style) = self.inline_style(child) {
                    self.requests
                        .push(Edit::set_text_style(IndexRange::new(at, at + len), style));
                }
            }
            if let Some(nested) = child.children() {
                self.inline(nested, at);
            }
            offset += len;
        }
    }

    fn inline_style(&self, token: &Token) -> Option<TextStyle> {
        match token {
            Token::Strong { .. } => Some(TextStyle {
                bold: Some(true),
                ..TextStyle::default()
            }),
            Token::Em { .. } => Some(TextStyle {
                italic: Some(true),
                ..TextStyle::default()
            }),
            Token::Link { href, .. } => Some(TextStyle {
                link: Some(Link { url: href.clone() }),
                ..TextStyle::default()
            }),
            Token::Codespan { .. } => Some(self.code_style()),
            _ => None,
        }
    }

    fn code_style(&self) -> TextStyle {
        TextStyle {
            weighted_font_family: Some(WeightedFontFamily {
                font_family: self.options.code_font.clone(),
                weight: None,
            }),
            background_color: Some(OptionalColor::grey(CODE_BACKGROUND)),
            ..TextStyle::default()
        }
    }

    fn table(&mut self, header: &[TableCell], rows: &[Vec<TableCell>]) {
        let cols = u32::try_from(header.len()).unwrap_or(u32::MAX);
        if cols == 0 {
            return;
        }
        let total_rows = u32::try_from(rows.len() + 1).unwrap_or(u32::MAX);
        let marker = placeholder(total_rows, cols);
        let span = self.insert(format!("{marker}\n"));

        let header_cells = header.iter().enumerate().map(|(col, cell)| (0, col, cell));
        let body_cells = rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(col, cell)| (row + 1, col, cell))
        });
        let cell_data = header_cells
            .chain(body_cells)
            .map(|(row, col, cell)| CellData {
                row: u32::try_from(row).unwrap_or(u32::MAX),
                col: u32::try_from(col).unwrap_or(u32::MAX),
                text: cell_text(cell),
                bold: row == 0,
            })
            .collect();

        self.tables.push(TableSpec {
            placeholder_range: without_newline(span),
            rows: total_rows,
            cols,
            cell_data,
        });
    }
}

fn without_newline(span: IndexRange) -> IndexRange {
    IndexRange::new(span.start_index, span.end_index.saturating_sub(1).max(span.start_index))
}

#[cfg(test)]
#[path = "tests/compiler.rs"]
mod tests;
