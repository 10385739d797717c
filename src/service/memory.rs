//! In-process stand-in for the remote document.
//!
//! The body is stored as a flat run of units, one per document position: UTF-16 code units of
//! text, paragraph-ending newlines that carry the paragraph's style, and the structural markers
//! that open and close tables, rows and cells. Position `i` is `units[i - 1]`, and the final
//! newline of the body can never be deleted. Batches apply to a draft copy and only replace the
//! live state once every edit has succeeded.
//!
//! Inserted text starts unstyled. A newline splits the paragraph it lands in, and the new
//! paragraph copies the split paragraph's style and bullet, with a fresh heading id if it is a
//! heading.

use crate::document::{
    Body, Bullet, Document, Paragraph, ParagraphElement, StructuralElement, Table, TableCell,
    TableRow, TextRun,
};
use crate::edit_plan::{
    BatchReply, BulletPreset, Edit, EditPlan, IndexRange, NamedStyleType, ParagraphStyle,
    TextStyle, WriteControl,
};
use crate::error::{Error, Result};
use crate::service::DocumentService;

#[derive(Clone, Debug, Default, PartialEq)]
struct ParagraphMeta {
    style: ParagraphStyle,
    bullet: Option<Bullet>,
}

#[derive(Clone, Debug, PartialEq)]
enum Unit {
    Text { code: u16, style: TextStyle },
    Newline { style: TextStyle, paragraph: ParagraphMeta },
    TableStart,
    RowStart,
    CellStart,
    TableEnd,
}

impl Unit {
    fn newline() -> Self {
        Self::Newline {
            style: TextStyle::default(),
            paragraph: ParagraphMeta::default(),
        }
    }

    fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. } | Self::Newline { .. })
    }

    fn text_style(&self) -> Option<&TextStyle> {
        match self {
            Self::Text { style, .. } | Self::Newline { style, .. } => Some(style),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
/// A single document held in memory, addressed exactly like the remote one.
pub struct MemoryDocument {
    document_id: String,
    title: String,
    units: Vec<Unit>,
    revision: u64,
    next_heading: u64,
    next_list: u64,
}

impl MemoryDocument {
    #[must_use]
    /// An empty document: one empty paragraph.
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            title: String::new(),
            units: vec![Unit::newline()],
            revision: 1,
            next_heading: 1,
            next_list: 1,
        }
    }

    #[must_use]
    /// Current revision, `rev-1` for a new document.
    pub fn revision_id(&self) -> String {
        format!("rev-{}", self.revision)
    }

    #[must_use]
    /// Body text with table structure dropped, final newline included.
    pub fn text(&self) -> String {
        let codes: Vec<u16> = self
            .units
            .iter()
            .filter_map(|unit| match unit {
                Unit::Text { code, .. } => Some(*code),
                Unit::Newline { .. } => Some(u16::from(b'\n')),
                _ => None,
            })
            .collect();
        String::from_utf16_lossy(&codes)
    }

    #[must_use]
    /// Render the current state the way the retrieval call would return it.
    pub fn snapshot(&self) -> Document {
        let mut content = vec![StructuralElement {
            start_index: 0,
            end_index: 1,
            section_break: Some(serde_json::json!({})),
            ..StructuralElement::default()
        }];
        let mut pos = 0;
        while pos < self.units.len() {
            let (element, next) = if self.units[pos] == Unit::TableStart {
                self.render_table(pos)
            } else {
                self.render_paragraph(pos)
            };
            content.push(element);
            pos = next.max(pos + 1);
        }
        Document {
            document_id: self.document_id.clone(),
            title: self.title.clone(),
            revision_id: Some(self.revision_id()),
            body: Body { content },
        }
    }

    fn render_paragraph(&self, start: usize) -> (StructuralElement, usize) {
        let mut elements: Vec<ParagraphElement> = Vec::new();
        let mut codes: Vec<u16> = Vec::new();
        let mut run_start = start;
        let mut run_style: Option<TextStyle> = None;
        let mut meta = ParagraphMeta::default();
        let mut pos = start;

        while pos < self.units.len() {
            let unit = &self.units[pos];
            let Some(style) = unit.text_style() else {
                break;
            };
            if run_style.as_ref().is_some_and(|current| current != style) {
                elements.push(text_element(run_start, pos, &codes, run_style.take()));
                codes.clear();
                run_start = pos;
            }
            run_style.get_or_insert_with(|| style.clone());
            match unit {
                Unit::Text { code, .. } => codes.push(*code),
                Unit::Newline { paragraph, .. } => {
                    codes.push(u16::from(b'\n'));
                    meta = paragraph.clone();
                    pos += 1;
                    break;
                }
                _ => {}
            }
            pos += 1;
        }
        if !codes.is_empty() {
            elements.push(text_element(run_start, pos, &codes, run_style));
        }

        let element = StructuralElement {
            start_index: position(start),
            end_index: position(pos),
            paragraph: Some(Paragraph {
                elements,
                paragraph_style: meta.style,
                bullet: meta.bullet,
            }),
            ..StructuralElement::default()
        };
        (element, pos)
    }

    fn render_table(&self, start: usize) -> (StructuralElement, usize) {
        let mut pos = start + 1;
        let mut table_rows = Vec::new();

        while self.units.get(pos) == Some(&Unit::RowStart) {
            let row_start = pos;
            pos += 1;
            let mut table_cells = Vec::new();
            while self.units.get(pos) == Some(&Unit::CellStart) {
                let cell_start = pos;
                pos += 1;
                let mut content = Vec::new();
                while self.units.get(pos).is_some_and(Unit::is_text) {
                    let (paragraph, next) = self.render_paragraph(pos);
                    content.push(paragraph);
                    pos = next;
                }
                table_cells.push(TableCell {
                    start_index: position(cell_start),
                    end_index: position(pos),
                    content,
                });
            }
            table_rows.push(TableRow {
                start_index: position(row_start),
                end_index: position(pos),
                table_cells,
            });
        }
        if self.units.get(pos) == Some(&Unit::TableEnd) {
            pos += 1;
        }

        let columns = table_rows.first().map_or(0, |row| row.table_cells.len());
        let element = StructuralElement {
            start_index: position(start),
            end_index: position(pos),
            table: Some(Table {
                rows: u32::try_from(table_rows.len()).unwrap_or(u32::MAX),
                columns: u32::try_from(columns).unwrap_or(u32::MAX),
                table_rows,
            }),
            ..StructuralElement::default()
        };
        (element, pos)
    }

    fn apply_edit(&mut self, edit: &Edit) -> Result<()> {
        match edit {
            Edit::InsertText(insert) => self.insert_text(insert.location.index, &insert.text),
            Edit::SetTextStyle(update) => {
                let range = self.style_range(update.range)?;
                for unit in &mut self.units[range] {
                    if let Unit::Text { style, .. } | Unit::Newline { style, .. } = unit {
                        style.merge(&update.text_style, &update.fields);
                    }
                }
                Ok(())
            }
            Edit::SetParagraphStyle(update) => {
                let named = update.paragraph_style.named_style_type;
                for newline in self.paragraph_ends(update.range)? {
                    if let Unit::Newline { paragraph, .. } = &mut self.units[newline] {
                        paragraph.style.named_style_type = named;
                        if named.and_then(NamedStyleType::heading_level).is_none() {
                            paragraph.style.heading_id = None;
                        } else if paragraph.style.heading_id.is_none() {
                            paragraph.style.heading_id = Some(format!("h.{}", self.next_heading));
                            self.next_heading += 1;
                        }
                    }
                }
                Ok(())
            }
            Edit::SetBullets(update) => {
                let list_id = format!(
                    "kix.{}{}",
                    match update.bullet_preset {
                        BulletPreset::Ordered => "ordered",
                        BulletPreset::Unordered => "bullet",
                    },
                    self.next_list
                );
                self.next_list += 1;
                for newline in self.paragraph_ends(update.range)? {
                    if let Unit::Newline { paragraph, .. } = &mut self.units[newline] {
                        paragraph.bullet = Some(Bullet {
                            list_id: list_id.clone(),
                        });
                    }
                }
                Ok(())
            }
            Edit::DeleteBullets(update) => {
                for newline in self.paragraph_ends(update.range)? {
                    if let Unit::Newline { paragraph, .. } = &mut self.units[newline] {
                        paragraph.bullet = None;
                    }
                }
                Ok(())
            }
            Edit::DeleteRange(delete) => self.delete(delete.range),
            Edit::InsertTable(insert) => {
                self.insert_table(insert.location.index, insert.rows, insert.columns)
            }
        }
    }

    /// Vector position for inserting at document `index`, which must sit inside a body paragraph.
    fn insertion_point(&self, index: u32) -> Result<usize> {
        let pos = usize::try_from(index)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .filter(|pos| *pos < self.units.len())
            .ok_or_else(|| Error::InvalidEdit(format!("index {index} is outside the body")))?;
        if self.units[pos].is_text() {
            Ok(pos)
        } else {
            Err(Error::InvalidEdit(format!(
                "index {index} is not inside a paragraph"
            )))
        }
    }

    fn insert_text(&mut self, index: u32, text: &str) -> Result<()> {
        let pos = self.insertion_point(index)?;
        let split = self.units[pos..]
            .iter()
            .find_map(|unit| match unit {
                Unit::Newline { paragraph, .. } => Some(paragraph.clone()),
                _ => None,
            })
            .unwrap_or_default();

        let mut inserted = Vec::new();
        for ch in text.chars() {
            if ch == '\n' {
                let mut paragraph = split.clone();
                paragraph.style.heading_id = None;
                let heading = paragraph.style.named_style_type;
                if heading.and_then(NamedStyleType::heading_level).is_some() {
                    paragraph.style.heading_id = Some(self.fresh_heading_id());
                }
                inserted.push(Unit::Newline {
                    style: TextStyle::default(),
                    paragraph,
                });
            } else {
                let mut buffer = [0u16; 2];
                for code in ch.encode_utf16(&mut buffer) {
                    inserted.push(Unit::Text {
                        code: *code,
                        style: TextStyle::default(),
                    });
                }
            }
        }
        self.units.splice(pos..pos, inserted);
        Ok(())
    }

    fn fresh_heading_id(&mut self) -> String {
        let id = format!("h.{}", self.next_heading);
        self.next_heading += 1;
        id
    }

    fn delete(&mut self, range: IndexRange) -> Result<()> {
        let len = self.units.len();
        let start = usize::try_from(range.start_index).unwrap_or(usize::MAX);
        let end = usize::try_from(range.end_index).unwrap_or(usize::MAX);
        if start < 1 || end <= start {
            return Err(Error::InvalidEdit(format!("empty or invalid range {range:?}")));
        }
        if end > len {
            return Err(Error::InvalidEdit(
                "cannot delete the final newline of the body".to_string(),
            ));
        }

        let mut depth = 0i32;
        for unit in &self.units[start - 1..end - 1] {
            match unit {
                Unit::TableStart => depth += 1,
                Unit::TableEnd => depth -= 1,
                Unit::RowStart | Unit::CellStart if depth == 0 => depth = -1,
                _ => {}
            }
            if depth < 0 {
                break;
            }
        }
        if depth != 0 {
            return Err(Error::InvalidEdit(format!(
                "range {range:?} only partially covers a table"
            )));
        }

        self.units.drain(start - 1..end - 1);
        Ok(())
    }

    fn insert_table(&mut self, index: u32, rows: u32, columns: u32) -> Result<()> {
        let pos = self.insertion_point(index)?;
        let nesting: i32 = self.units[..pos]
            .iter()
            .map(|unit| match unit {
                Unit::TableStart => 1,
                Unit::TableEnd => -1,
                _ => 0,
            })
            .sum();
        if nesting != 0 {
            return Err(Error::InvalidEdit("tables cannot be nested".to_string()));
        }
        if rows == 0 || columns == 0 {
            return Err(Error::InvalidEdit("a table needs rows and columns".to_string()));
        }

        let mut table = Vec::new();
        let at_paragraph_start = pos == 0
            || matches!(self.units[pos - 1], Unit::Newline { .. } | Unit::TableEnd);
        if !at_paragraph_start {
            table.push(Unit::newline());
        }
        table.push(Unit::TableStart);
        for _ in 0..rows {
            table.push(Unit::RowStart);
            for _ in 0..columns {
                table.push(Unit::CellStart);
                table.push(Unit::newline());
            }
        }
        table.push(Unit::TableEnd);
        self.units.splice(pos..pos, table);
        Ok(())
    }

    fn style_range(&self, range: IndexRange) -> Result<std::ops::Range<usize>> {
        let start = usize::try_from(range.start_index).unwrap_or(usize::MAX);
        let end = usize::try_from(range.end_index).unwrap_or(usize::MAX);
        if start < 1 || end < start || end > self.units.len() + 1 {
            return Err(Error::InvalidEdit(format!(
                "range {range:?} is outside the body"
            )));
        }
        Ok(start - 1..end - 1)
    }

    /// Positions of the newlines ending every paragraph that overlaps `range`.
    fn paragraph_ends(&self, range: IndexRange) -> Result<Vec<usize>> {
        let span = self.style_range(range)?;
        let mut ends = Vec::new();
        for pos in span.start..self.units.len() {
            if matches!(self.units[pos], Unit::Newline { .. }) {
                ends.push(pos);
                if pos + 1 >= span.end {
                    break;
                }
            }
        }
        Ok(ends)
    }
}

fn position(pos: usize) -> u32 {
    u32::try_from(pos + 1).unwrap_or(u32::MAX)
}

fn text_element(
    start: usize,
    end: usize,
    codes: &[u16],
    style: Option<TextStyle>,
) -> ParagraphElement {
    ParagraphElement {
        start_index: position(start),
        end_index: position(end),
        text_run: Some(TextRun {
            content: String::from_utf16_lossy(codes),
            text_style: style.unwrap_or_default(),
        }),
    }
}

impl DocumentService for MemoryDocument {
    fn fetch(&self, document_id: &str) -> Result<Document> {
        if document_id != self.document_id {
            return Err(Error::Service {
                status: 404,
                message: format!("no document {document_id}"),
            });
        }
        Ok(self.snapshot())
    }

    fn apply(&mut self, document_id: &str, plan: EditPlan) -> Result<BatchReply> {
        if document_id != self.document_id {
            return Err(Error::Service {
                status: 404,
                message: format!("no document {document_id}"),
            });
        }
        let current = self.revision_id();
        if let Some(expected) = plan.required_revision() {
            if expected != current {
                return Err(Error::StaleRevision {
                    expected: expected.to_string(),
                    actual: current,
                });
            }
        }

        let mut draft = self.clone();
        for edit in plan.requests() {
            draft.apply_edit(edit)?;
        }
        draft.revision += 1;
        *self = draft;
        tracing::debug!(document_id, revision = self.revision, "applied batch in memory");

        Ok(BatchReply {
            document_id: self.document_id.clone(),
            write_control: Some(WriteControl {
                required_revision_id: Some(self.revision_id()),
                target_revision_id: None,
            }),
        })
    }
}

#[cfg(test)]
#[path = "../tests/memory.rs"]
mod tests;
