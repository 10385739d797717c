//! Section representation for retrieved remote documents.
//!
//! A section is a heading paragraph together with everything up to the next heading of the same
//! or a higher level: its body text and any deeper headings, which become its children. Sections
//! track the heading's own span, the body span after it, and the span of the whole subtree, all in
//! document positions of one snapshot. Recompute them after every applied batch.

use crate::document::Document;
use crate::edit_plan::IndexRange;
use crate::error::{Error, Result};
use serde::Serialize;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// A paragraph styled as a heading.
pub struct Heading {
    /// 1 for `HEADING_1` through 6.
    pub level: u8,
    /// Visible heading text without its trailing newline.
    pub text: String,
    /// Opaque identifier assigned by the remote document.
    pub heading_id: Option<String>,
    /// Span of the heading paragraph, newline included.
    pub range: IndexRange,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// Hierarchical division of a document with precise coordinates for scoped edits.
pub struct Section {
    /// Section heading text.
    pub title: String,
    /// Nesting depth in the document hierarchy (1 for top-level).
    pub level: u8,
    /// Opaque identifier of the heading paragraph, when the remote assigned one.
    pub heading_id: Option<String>,
    /// The heading paragraph itself.
    pub heading_range: IndexRange,
    /// From the end of the heading to the next same-or-higher heading or the document end.
    pub content_range: IndexRange,
    /// From the start of the heading to the same boundary.
    pub section_range: IndexRange,
    /// Directly nested subsections, only populated by [`outline`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Section>,
}

impl Section {
    #[must_use]
    /// Whether any body content sits between the heading and its boundary.
    pub fn has_content(&self) -> bool {
        !self.content_range.is_empty()
    }
}

/// Heading paragraphs in document order.
#[must_use]
pub fn headings(document: &Document) -> Vec<Heading> {
    document
        .paragraphs()
        .filter_map(|(element, paragraph)| {
            let level = paragraph.heading_level()?;
            Some(Heading {
                level,
                text: paragraph.text().trim().to_string(),
                heading_id: paragraph.paragraph_style.heading_id.clone(),
                range: element.range(),
            })
        })
        .collect()
}

/// Flat list of sections in document order, without children.
#[must_use]
pub fn sections(document: &Document) -> Vec<Section> {
    let headings = headings(document);
    let document_end = document.end_index();

    headings
        .iter()
        .enumerate()
        .map(|(i, heading)| {
            let boundary = headings[i + 1..]
                .iter()
                .find(|next| next.level <= heading.level)
                .map_or(document_end, |next| next.range.start_index);
            Section {
                title: heading.text.clone(),
                level: heading.level,
                heading_id: heading.heading_id.clone(),
                heading_range: heading.range,
                content_range: IndexRange::new(heading.range.end_index, boundary),
                section_range: IndexRange::new(heading.range.start_index, boundary),
                children: Vec::new(),
            }
        })
        .collect()
}

/// Nest a flat section list under its parents.
///
/// Each section pops every open section of the same or a deeper level before attaching itself
/// to whatever remains open, or to the top level when nothing does.
#[must_use]
pub fn outline(flat: Vec<Section>) -> Vec<Section> {
    let mut roots = Vec::new();
    let mut open: Vec<Section> = Vec::new();

    for section in flat {
        while open.last().is_some_and(|top| top.level >= section.level) {
            close_top(&mut open, &mut roots);
        }
        open.push(section);
    }
    while !open.is_empty() {
        close_top(&mut open, &mut roots);
    }
    roots
}

fn close_top(open: &mut Vec<Section>, roots: &mut Vec<Section>) {
    if let Some(done) = open.pop() {
        match open.last_mut() {
            Some(parent) => parent.children.push(done),
            None => roots.push(done),
        }
    }
}

/// First section whose title matches `title`, ignoring case and surrounding whitespace.
///
/// # Errors
///
/// Returns [`Error::SectionNotFound`] if no heading matches.
pub fn find_section<'a>(sections: &'a [Section], title: &str) -> Result<&'a Section> {
    let wanted = title.trim().to_lowercase();
    sections
        .iter()
        .find(|section| section.title.to_lowercase() == wanted)
        .ok_or_else(|| Error::SectionNotFound(title.to_string()))
}

/// Pull `range` back so it never covers the final newline of the document body.
#[must_use]
pub fn clamp_to_body(range: IndexRange, document_end: u32) -> IndexRange {
    let last_deletable = document_end.saturating_sub(1).max(1);
    IndexRange::new(
        range.start_index.min(last_deletable),
        range.end_index.min(last_deletable),
    )
}

#[cfg(test)]
#[path = "tests/section.rs"]
mod tests;
