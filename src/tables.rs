//! Turns committed `[TABLE:RxC]` placeholders into native tables and fills their cells.
//!
//! Tables are handled one at a time, and every step works on a freshly fetched snapshot:
//!
//! 1. find the placeholder paragraph for this table;
//! 2. delete the marker text and insert an empty native table where it started;
//! 3. fetch again and locate the new table by its ordinal among the document's tables;
//! 4. fill the cells in ascending anchor order, shifting each anchor by the text already
//!    inserted ahead of it in this table.
//!
//! A missing placeholder, or a table that cannot be found again after insertion, only skips that
//! table. Service failures abort the rest.

use crate::compiler::TableSpec;
use crate::document::{Document, ElementKind, Table};
use crate::edit_plan::{Edit, EditPlan, IndexRange, TextStyle};
use crate::error::Result;
use crate::service::DocumentService;
use crate::token::utf16_len;
use serde::Serialize;

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// Tally of one materialization run.
pub struct TableReport {
    /// Tables inserted in place of their placeholder.
    pub tables_materialized: usize,
    /// Tables whose placeholder or inserted table could not be found.
    pub tables_skipped: usize,
    /// Cells that received text.
    pub cells_written: usize,
    /// Cells out of bounds, already filled, or without an insertion point.
    pub cells_skipped: usize,
}

/// Span of the first paragraph at or after `search_from` whose text is exactly `marker`.
///
/// The span covers the marker text only, leaving the paragraph's newline in place.
#[must_use]
pub fn find_placeholder(document: &Document, marker: &str, search_from: u32) -> Option<IndexRange> {
    document.elements().iter().find_map(|element| {
        let ElementKind::Paragraph(paragraph) = element.kind() else {
            return None;
        };
        if element.start_index < search_from || paragraph.text().trim() != marker {
            return None;
        }
        let start = paragraph
            .elements
            .first()
            .map_or(element.start_index, |run| run.start_index);
        Some(IndexRange::new(start, start + utf16_len(marker)))
    })
}

/// Cell insertions for a freshly materialized `table`, valid against the snapshot it came from.
///
/// Cells outside the table or already holding text are skipped, never overwritten. The edits
/// are ordered by ascending anchor and each anchor is shifted by the length of every cell text
/// inserted before it, since each insertion pushes all later cells of the table along.
#[must_use]
pub fn cell_edits(table: &Table, spec: &TableSpec) -> (Vec<Edit>, usize) {
    let mut skipped = 0;
    let mut pending = Vec::new();

    for data in &spec.cell_data {
        let Some(cell) = table.cell(data.row as usize, data.col as usize) else {
            tracing::warn!(
                row = data.row,
                col = data.col,
                rows = table.rows,
                columns = table.columns,
                "cell is outside the table, skipping"
            );
            skipped += 1;
            continue;
        };
        if !cell.text().trim().is_empty() {
            tracing::warn!(row = data.row, col = data.col, "cell already has content, skipping");
            skipped += 1;
            continue;
        }
        if data.text.is_empty() {
            continue;
        }
        match cell.anchor() {
            Some(anchor) => pending.push((anchor, data)),
            None => {
                tracing::warn!(row = data.row, col = data.col, "cell has no insertion point");
                skipped += 1;
            }
        }
    }

    pending.sort_by_key(|(anchor, _)| *anchor);

    let mut edits = Vec::new();
    let mut shift = 0;
    for (anchor, data) in pending {
        let at = anchor + shift;
        let len = utf16_len(&data.text);
        edits.push(Edit::insert_text(at, data.text.clone()));
        if data.bold {
            edits.push(Edit::set_text_style(
                IndexRange::new(at, at + len),
                TextStyle {
                    bold: Some(true),
                    ..TextStyle::default()
                },
            ));
        }
        shift += len;
    }
    (edits, skipped)
}

/// Replace each table's placeholder with a populated native table.
///
/// Placeholders are only looked for at or after `search_from`, the position the compiled script
/// was spliced in at. A table missing from the snapshot fetched after its insertion is skipped
/// with a warning and counted in `tables_skipped`, not treated as fatal.
///
/// # Errors
///
/// Returns an error if fetching or applying fails.
pub fn materialize_tables<S: DocumentService>(
    service: &mut S,
    document_id: &str,
    tables: &[TableSpec],
    search_from: u32,
) -> Result<TableReport> {
    let mut report = TableReport::default();

    for spec in tables {
        let marker = spec.marker();
        let before = service.fetch(document_id)?;
        let Some(placeholder) = find_placeholder(&before, &marker, search_from) else {
            tracing::warn!(%marker, "placeholder not found, skipping table");
            report.tables_skipped += 1;
            continue;
        };
        let ordinal = before
            .tables()
            .filter(|(element, _)| element.start_index < placeholder.start_index)
            .count();

        let swap = EditPlan::against(
            &before,
            vec![
                Edit::delete_range(placeholder),
                Edit::insert_table(placeholder.start_index, spec.rows, spec.cols),
            ],
        );
        service.apply(document_id, swap)?;

        let after = service.fetch(document_id)?;
        let Some((_, table)) = after.tables().nth(ordinal) else {
            tracing::warn!(
                %marker,
                ordinal,
                found = after.tables().count(),
                "inserted table not found, leaving it empty"
            );
            report.tables_skipped += 1;
            continue;
        };

        let (edits, skipped) = cell_edits(table, spec);
        let written = edits
            .iter()
            .filter(|edit| matches!(edit, Edit::InsertText(_)))
            .count();
        if !edits.is_empty() {
            service.apply(document_id, EditPlan::against(&after, edits))?;
        }
        tracing::info!(%marker, written, skipped, "materialized table");

        report.tables_materialized += 1;
        report.cells_written += written;
        report.cells_skipped += skipped;
    }
    Ok(report)
}

#[cfg(test)]
#[path = "tests/tables.rs"]
mod tests;
