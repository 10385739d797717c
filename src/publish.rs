//! Commands that change a remote document, built from one fetched snapshot each.
//!
//! Every command fetches the document, computes its edits against that snapshot, and commits
//! them as a single batch before any table placeholders are materialized. A compiled script is
//! always spliced into an empty paragraph with normal style, so the inserted paragraphs never
//! inherit a heading or list style from whatever they land in front of. Splicing in front of
//! existing content therefore leaves one empty paragraph between the script and that content.

use crate::compiler::{compile, CompileOptions, Script};
use crate::document::{Document, Paragraph};
use crate::edit_plan::{Edit, EditPlan, IndexRange, NamedStyleType};
use crate::error::Result;
use crate::formats::markdown::MarkdownFormat;
use crate::formats::Format;
use crate::search::{replacement_edits, search, Match};
use crate::section::{clamp_to_body, find_section, outline, sections, Section};
use crate::service::DocumentService;
use crate::tables::{materialize_tables, TableReport};
use serde::Serialize;

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// What a publishing command did to the document.
pub struct PublishReport {
    /// Document the command changed.
    pub document_id: String,
    /// Where the compiled script landed.
    pub insert_index: u32,
    /// Requests sent in the main batch, deletions included.
    pub requests: usize,
    /// UTF-16 length of the inserted script text.
    pub inserted: u32,
    /// Outcome of materializing the script's tables.
    pub tables: TableReport,
}

/// Tokenize markdown `source` and compile it.
///
/// # Errors
///
/// Returns an error if the source nests deeper than `options` allow.
pub fn compile_markdown(source: &str, options: &CompileOptions) -> Result<Script> {
    let tokens = MarkdownFormat.tokenize(source);
    compile(&tokens, options)
}

/// Replace the whole body of the document with `script`.
///
/// # Errors
///
/// Returns an error if the document cannot be fetched or the batch is rejected.
pub fn write_document<S: DocumentService>(
    service: &mut S,
    document_id: &str,
    script: Script,
) -> Result<PublishReport> {
    let snapshot = service.fetch(document_id)?;
    let end = snapshot.end_index();

    let mut requests = Vec::new();
    if end > 2 {
        requests.push(Edit::delete_range(IndexRange::new(1, end - 1)));
    }
    // Only the final paragraph survives the wipe, empty but with its own style.
    let opened = settle_paragraph(1, last_paragraph(&snapshot));

    tracing::info!(document_id, cleared = end.saturating_sub(2), "writing document");
    commit(service, document_id, &snapshot, requests, opened, script)
}

/// Add `script` after the current end of the document.
///
/// # Errors
///
/// Returns an error if the document cannot be fetched or the batch is rejected.
pub fn append_document<S: DocumentService>(
    service: &mut S,
    document_id: &str,
    script: Script,
) -> Result<PublishReport> {
    let snapshot = service.fetch(document_id)?;
    let end = snapshot.end_index();
    let last = last_paragraph(&snapshot);
    let opened = if last.is_some_and(|p| is_plain(p) && p.text() == "\n") {
        (Vec::new(), end.saturating_sub(1).max(1))
    } else {
        split_paragraph(end, end, has_bullet(last))
    };

    tracing::info!(document_id, end, "appending to document");
    commit(service, document_id, &snapshot, Vec::new(), opened, script)
}

/// Swap the body of the section titled `title` for `script`, keeping its heading.
///
/// # Errors
///
/// Returns an error if no section matches, or if fetching or applying fails.
pub fn replace_section<S: DocumentService>(
    service: &mut S,
    document_id: &str,
    title: &str,
    script: Script,
) -> Result<PublishReport> {
    let snapshot = service.fetch(document_id)?;
    let end = snapshot.end_index();
    let flat = sections(&snapshot);
    let section = find_section(&flat, title)?;

    let content = clamp_to_body(section.content_range, end);
    let mut requests = Vec::new();
    if !content.is_empty() {
        requests.push(Edit::delete_range(content));
    }

    let at = section.content_range.start_index;
    // Content that ran to the end of the body leaves its final newline behind, empty.
    let reaches_end = section.content_range.end_index >= end && at < end;
    let opened = if reaches_end {
        settle_paragraph(at, last_paragraph(&snapshot))
    } else {
        // Once the content is gone, the paragraph that followed it is the one being split.
        let follower = section.content_range.end_index.min(end.saturating_sub(1));
        let bulleted = has_bullet(paragraph_at(&snapshot, follower));
        split_paragraph(at, end - content.len(), bulleted)
    };

    tracing::info!(
        document_id,
        section = %section.title,
        removed = content.len(),
        "replacing section content"
    );
    commit(service, document_id, &snapshot, requests, opened, script)
}

/// Delete the section titled `title`, heading and subsections included.
///
/// # Errors
///
/// Returns an error if no section matches, or if fetching or applying fails.
pub fn delete_section<S: DocumentService>(
    service: &mut S,
    document_id: &str,
    title: &str,
) -> Result<Section> {
    let snapshot = service.fetch(document_id)?;
    let end = snapshot.end_index();
    let flat = sections(&snapshot);
    let section = find_section(&flat, title)?.clone();

    let range = clamp_to_body(section.section_range, end);
    let mut requests = Vec::new();
    if !range.is_empty() {
        requests.push(Edit::delete_range(range));
        if range.end_index < section.section_range.end_index {
            // The final newline stays behind and would keep the section's last paragraph style.
            let bulleted = has_bullet(last_paragraph(&snapshot));
            requests.extend(plain_style(range.start_index, bulleted));
        }
    }

    tracing::info!(document_id, section = %section.title, removed = range.len(), "deleting section");
    if !requests.is_empty() {
        service.apply(document_id, EditPlan::against(&snapshot, requests))?;
    }
    Ok(section)
}

/// The document's sections, nested unless `flat` is set.
///
/// # Errors
///
/// Returns an error if the document cannot be fetched.
pub fn list_sections<S: DocumentService>(
    service: &S,
    document_id: &str,
    flat: bool,
) -> Result<Vec<Section>> {
    let snapshot = service.fetch(document_id)?;
    let found = sections(&snapshot);
    Ok(if flat { found } else { outline(found) })
}

/// Occurrences of `query`, optionally limited to the section titled `within`.
///
/// # Errors
///
/// Returns an error if the document cannot be fetched or the section does not exist.
pub fn find_text<S: DocumentService>(
    service: &S,
    document_id: &str,
    query: &str,
    within: Option<&str>,
) -> Result<Vec<Match>> {
    let snapshot = service.fetch(document_id)?;
    let bound = scope(&snapshot, within)?;
    Ok(search(&snapshot, query, bound))
}

/// Replace every occurrence of `query` with `replacement` in one batch.
///
/// Returns how many occurrences were replaced.
///
/// # Errors
///
/// Returns an error if the section does not exist, or if fetching or applying fails.
pub fn replace_text<S: DocumentService>(
    service: &mut S,
    document_id: &str,
    query: &str,
    replacement: &str,
    within: Option<&str>,
) -> Result<usize> {
    let snapshot = service.fetch(document_id)?;
    let bound = scope(&snapshot, within)?;
    let matches = search(&snapshot, query, bound);
    if matches.is_empty() {
        tracing::info!(document_id, query, "nothing to replace");
        return Ok(0);
    }

    let edits = replacement_edits(&matches, replacement);
    service.apply(document_id, EditPlan::against(&snapshot, edits))?;
    tracing::info!(document_id, query, replaced = matches.len(), "replaced text");
    Ok(matches.len())
}

fn scope(snapshot: &Document, within: Option<&str>) -> Result<Option<IndexRange>> {
    within
        .map(|title| {
            let flat = sections(snapshot);
            find_section(&flat, title).map(|section| section.section_range)
        })
        .transpose()
}

fn last_paragraph(snapshot: &Document) -> Option<&Paragraph> {
    snapshot.paragraphs().last().map(|(_, paragraph)| paragraph)
}

fn paragraph_at(snapshot: &Document, index: u32) -> Option<&Paragraph> {
    snapshot
        .paragraphs()
        .find(|(element, _)| element.start_index <= index && index < element.end_index)
        .map(|(_, paragraph)| paragraph)
}

fn has_bullet(paragraph: Option<&Paragraph>) -> bool {
    paragraph.is_some_and(|p| p.bullet.is_some())
}

/// Unbulleted with no named style other than normal text.
fn is_plain(paragraph: &Paragraph) -> bool {
    paragraph.bullet.is_none()
        && matches!(
            paragraph.paragraph_style.named_style_type,
            None | Some(NamedStyleType::NormalText)
        )
}

/// Land on the empty `paragraph` left at `at`, resetting its style unless it is already plain.
fn settle_paragraph(at: u32, paragraph: Option<&Paragraph>) -> (Vec<Edit>, u32) {
    match paragraph {
        Some(p) if !is_plain(p) => (plain_style(at, p.bullet.is_some()), at),
        _ => (Vec::new(), at),
    }
}

/// Split a fresh empty paragraph off at `at`, or after the last paragraph when `at` is past the
/// body, and return the edits with the index the script lands at.
///
/// `document_end` is the end of the body once earlier deletions in the same batch have applied.
/// The fresh paragraph copies the split paragraph's style and bullet; `bulleted` says whether
/// there is a bullet to take off.
fn split_paragraph(at: u32, document_end: u32, bulleted: bool) -> (Vec<Edit>, u32) {
    let (split, landing) = if at >= document_end {
        (document_end.saturating_sub(1).max(1), document_end)
    } else {
        (at, at)
    };
    let mut edits = vec![Edit::insert_text(split, "\n")];
    edits.extend(plain_style(landing, bulleted));
    (edits, landing)
}

fn plain_style(at: u32, bulleted: bool) -> Vec<Edit> {
    let paragraph = IndexRange::new(at, at + 1);
    let mut edits = vec![Edit::set_paragraph_style(
        paragraph,
        NamedStyleType::NormalText,
    )];
    if bulleted {
        edits.push(Edit::delete_bullets(paragraph));
    }
    edits
}

fn commit<S: DocumentService>(
    service: &mut S,
    document_id: &str,
    snapshot: &Document,
    mut requests: Vec<Edit>,
    opened: (Vec<Edit>, u32),
    script: Script,
) -> Result<PublishReport> {
    let (prefix, insert_index) = opened;
    let mut report = PublishReport {
        document_id: document_id.to_string(),
        insert_index,
        ..PublishReport::default()
    };

    let script = script.rebased(insert_index)?;
    report.inserted = script.inserted_len();
    if !script.is_empty() {
        requests.extend(prefix);
    }
    let Script {
        requests: edits,
        tables,
        ..
    } = script;
    requests.extend(edits);

    report.requests = requests.len();
    if requests.is_empty() {
        return Ok(report);
    }
    let reply = service.apply(document_id, EditPlan::against(snapshot, requests))?;
    tracing::info!(
        document_id,
        requests = report.requests,
        inserted = report.inserted,
        revision = reply
            .write_control
            .as_ref()
            .and_then(|control| control.required_revision_id.as_deref()),
        "committed script"
    );

    if !tables.is_empty() {
        report.tables = materialize_tables(service, document_id, &tables, insert_index)?;
    }
    Ok(report)
}

#[cfg(test)]
#[path = "tests/publish.rs"]
mod tests;
