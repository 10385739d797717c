//! Read-only model of a retrieved remote document.
//!
//! A [`Document`] is one immutable snapshot: its positions are only valid until the next batch is
//! applied, after which it must be fetched again.

use crate::edit_plan::{IndexRange, ParagraphStyle, TextStyle};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
/// One fetched snapshot of a document.
pub struct Document {
    /// Remote id.
    #[serde(default)]
    pub document_id: String,
    /// Document title, which is not part of the body.
    #[serde(default)]
    pub title: String,
    /// Revision this snapshot was taken at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_id: Option<String>,
    /// Main body.
    #[serde(default)]
    pub body: Body,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
/// The document's main segment.
pub struct Body {
    /// Elements in document order, starting with a section break at 0.
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
/// A positioned unit of body content. Exactly one payload is set.
pub struct StructuralElement {
    /// First position of the element.
    #[serde(default)]
    pub start_index: u32,
    /// One past its last position.
    #[serde(default)]
    pub end_index: u32,
    /// Set for paragraphs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph: Option<Paragraph>,
    /// Set for tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
    /// Set for section breaks, whose contents docsmith never reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_break: Option<serde_json::Value>,
}

/// Borrowed view of an element's payload.
pub enum ElementKind<'a> {
    /// A paragraph.
    Paragraph(&'a Paragraph),
    /// A table.
    Table(&'a Table),
    /// Section breaks and anything else.
    Other,
}

impl StructuralElement {
    #[must_use]
    /// Which payload the element carries.
    pub fn kind(&self) -> ElementKind<'_> {
        if let Some(paragraph) = &self.paragraph {
            ElementKind::Paragraph(paragraph)
        } else if let Some(table) = &self.table {
            ElementKind::Table(table)
        } else {
            ElementKind::Other
        }
    }

    #[must_use]
    /// The element's span.
    pub fn range(&self) -> IndexRange {
        IndexRange::new(self.start_index, self.end_index)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
/// A paragraph, ending in its newline.
pub struct Paragraph {
    /// Runs in order.
    #[serde(default)]
    pub elements: Vec<ParagraphElement>,
    /// Named style and heading id.
    #[serde(default)]
    pub paragraph_style: ParagraphStyle,
    /// Set when the paragraph is a list item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullet: Option<Bullet>,
}

impl Paragraph {
    /// Concatenated run text, including the trailing newline.
    #[must_use]
    pub fn text(&self) -> String {
        self.elements
            .iter()
            .filter_map(|element| element.text_run.as_ref())
            .map(|run| run.content.as_str())
            .collect()
    }

    /// Heading level 1 to 6 if the paragraph is styled as a heading.
    #[must_use]
    pub fn heading_level(&self) -> Option<u8> {
        self.paragraph_style
            .named_style_type
            .and_then(|style| style.heading_level())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
/// A positioned piece of a paragraph.
pub struct ParagraphElement {
    /// First position of the piece.
    #[serde(default)]
    pub start_index: u32,
    /// One past its last position.
    #[serde(default)]
    pub end_index: u32,
    /// Set for text; other inline objects leave it empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_run: Option<TextRun>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
/// Uniformly styled text.
pub struct TextRun {
    /// The text.
    #[serde(default)]
    pub content: String,
    /// Its formatting.
    #[serde(default)]
    pub text_style: TextStyle,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// List membership of a paragraph.
pub struct Bullet {
    /// Paragraphs sharing a list id belong to the same list.
    #[serde(default)]
    pub list_id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
/// A native table.
pub struct Table {
    /// Row count.
    #[serde(default)]
    pub rows: u32,
    /// Column count.
    #[serde(default)]
    pub columns: u32,
    /// Rows in order.
    #[serde(default)]
    pub table_rows: Vec<TableRow>,
}

impl Table {
    #[must_use]
    /// Cell at zero-based `row` and `col`, if the table has one there.
    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.table_rows.get(row)?.table_cells.get(col)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
/// One table row.
pub struct TableRow {
    /// Position of the row marker.
    #[serde(default)]
    pub start_index: u32,
    /// One past the row's last cell.
    #[serde(default)]
    pub end_index: u32,
    /// Cells in column order.
    #[serde(default)]
    pub table_cells: Vec<TableCell>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
/// One table cell.
pub struct TableCell {
    /// Position of the cell marker, one before its content.
    #[serde(default)]
    pub start_index: u32,
    /// One past the cell's content.
    #[serde(default)]
    pub end_index: u32,
    /// Paragraphs inside the cell; a fresh cell holds one empty paragraph.
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

impl TableCell {
    /// Text of every paragraph in the cell.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|element| element.paragraph.as_ref())
            .map(Paragraph::text)
            .collect()
    }

    /// Where text typed into the cell lands: the start of its first content run.
    #[must_use]
    pub fn anchor(&self) -> Option<u32> {
        let first = self.content.first()?;
        let run_start = first
            .paragraph
            .as_ref()
            .and_then(|paragraph| paragraph.elements.first())
            .map(|element| element.start_index);
        Some(run_start.unwrap_or(first.start_index))
    }
}

impl Document {
    #[must_use]
    /// Body elements in document order.
    pub fn elements(&self) -> &[StructuralElement] {
        &self.body.content
    }

    /// One past the last body position.
    #[must_use]
    pub fn end_index(&self) -> u32 {
        self.body
            .content
            .last()
            .map_or(1, |element| element.end_index.max(1))
    }

    /// Top-level paragraphs with their elements, skipping tables and their cells.
    pub fn paragraphs(&self) -> impl Iterator<Item = (&StructuralElement, &Paragraph)> {
        self.body
            .content
            .iter()
            .filter_map(|element| element.paragraph.as_ref().map(|p| (element, p)))
    }

    /// Top-level tables with their elements, in document order.
    pub fn tables(&self) -> impl Iterator<Item = (&StructuralElement, &Table)> {
        self.body
            .content
            .iter()
            .filter_map(|element| element.table.as_ref().map(|t| (element, t)))
    }
}
