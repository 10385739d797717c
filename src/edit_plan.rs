//! The edit plan carries positional modifications to the remote document.
//!
//! Every [`Edit`] serializes to one request of the remote batch-update call. Positions are
//! 1-based, ranges are half-open, and lengths count UTF-16 code units. A batch is only ever
//! built from the [`Document`] snapshot its indices were computed against, and it carries that
//! snapshot's revision so the remote refuses it once anything else has changed the document.

use crate::document::Document;
use crate::token::utf16_len;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// Half-open span `[start_index, end_index)` of document positions.
pub struct IndexRange {
    /// First position covered.
    pub start_index: u32,
    /// First position past the span.
    pub end_index: u32,
}

impl IndexRange {
    #[must_use]
    /// Span from `start_index` up to, not including, `end_index`.
    pub fn new(start_index: u32, end_index: u32) -> Self {
        Self {
            start_index,
            end_index,
        }
    }

    #[must_use]
    /// Number of positions covered, zero for an inverted span.
    pub fn len(&self) -> u32 {
        self.end_index.saturating_sub(self.start_index)
    }

    #[must_use]
    /// Whether the span covers nothing.
    pub fn is_empty(&self) -> bool {
        self.end_index <= self.start_index
    }

    #[must_use]
    /// Whether `index` falls inside the span.
    pub fn contains(&self, index: u32) -> bool {
        self.start_index <= index && index < self.end_index
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
/// Insertion point.
pub struct Location {
    /// Position the content goes in front of.
    pub index: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// Hyperlink target.
pub struct Link {
    /// Absolute URL.
    pub url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Font family with an optional weight.
pub struct WeightedFontFamily {
    /// Family name, such as `Courier New`.
    pub font_family: String,
    /// CSS-style weight, 400 when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// A length such as a font size, `unit` is `PT`.
pub struct Dimension {
    /// Size in `unit`s.
    pub magnitude: f64,
    /// Unit name.
    pub unit: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
/// Colour channels between 0 and 1; absent channels are 0.
pub struct RgbColor {
    #[serde(default)]
    /// Red channel.
    pub red: f64,
    #[serde(default)]
    /// Green channel.
    pub green: f64,
    #[serde(default)]
    /// Blue channel.
    pub blue: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
/// A solid colour.
pub struct Color {
    /// The colour's channels.
    pub rgb_color: RgbColor,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// Wrapper the remote uses for colours that may be transparent.
pub struct OptionalColor {
    /// The colour itself.
    pub color: Color,
}

impl OptionalColor {
    #[must_use]
    /// Neutral grey with every channel at `level`.
    pub fn grey(level: f64) -> Self {
        Self {
            color: Color {
                rgb_color: RgbColor {
                    red: level,
                    green: level,
                    blue: level,
                },
            },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Character formatting. Unset fields are left untouched by an update.
pub struct TextStyle {
    /// Bold weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    /// Italic slant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    /// Hyperlink.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
    /// Font family, used for code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighted_font_family: Option<WeightedFontFamily>,
    /// Font size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Dimension>,
    /// Highlight behind the text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<OptionalColor>,
}

impl TextStyle {
    /// Field mask naming every key this style sets, in wire order.
    #[must_use]
    pub fn fields(&self) -> String {
        let mut fields = Vec::new();
        if self.bold.is_some() {
            fields.push("bold");
        }
        if self.italic.is_some() {
            fields.push("italic");
        }
        if self.link.is_some() {
            fields.push("link");
        }
        if self.weighted_font_family.is_some() {
            fields.push("weightedFontFamily");
        }
        if self.font_size.is_some() {
            fields.push("fontSize");
        }
        if self.background_color.is_some() {
            fields.push("backgroundColor");
        }
        fields.join(",")
    }

    /// Overlay every field named in `fields` from `update` onto `self`.
    pub fn merge(&mut self, update: &TextStyle, fields: &str) {
        for field in fields.split(',').map(str::trim) {
            match field {
                "bold" => self.bold = update.bold,
                "italic" => self.italic = update.italic,
                "link" => self.link.clone_from(&update.link),
                "weightedFontFamily" => {
                    self.weighted_font_family.clone_from(&update.weighted_font_family);
                }
                "fontSize" => self.font_size.clone_from(&update.font_size),
                "backgroundColor" => self.background_color.clone_from(&update.background_color),
                _ => {}
            }
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
/// Named paragraph styles the compiler and section parser care about.
pub enum NamedStyleType {
    /// Body text.
    #[serde(rename = "NORMAL_TEXT")]
    NormalText,
    /// Document title.
    #[serde(rename = "TITLE")]
    Title,
    /// Document subtitle.
    #[serde(rename = "SUBTITLE")]
    Subtitle,
    /// Level 1 heading.
    #[serde(rename = "HEADING_1")]
    Heading1,
    /// Level 2 heading.
    #[serde(rename = "HEADING_2")]
    Heading2,
    /// Level 3 heading.
    #[serde(rename = "HEADING_3")]
    Heading3,
    /// Level 4 heading.
    #[serde(rename = "HEADING_4")]
    Heading4,
    /// Level 5 heading.
    #[serde(rename = "HEADING_5")]
    Heading5,
    /// Level 6 heading.
    #[serde(rename = "HEADING_6")]
    Heading6,
    /// Any style not listed here.
    #[serde(other)]
    Other,
}

impl NamedStyleType {
    /// Heading style for `level`, clamped to 1..=6.
    #[must_use]
    pub fn heading(level: u8) -> Self {
        match level {
            0 | 1 => Self::Heading1,
            2 => Self::Heading2,
            3 => Self::Heading3,
            4 => Self::Heading4,
            5 => Self::Heading5,
            _ => Self::Heading6,
        }
    }

    #[must_use]
    /// Level 1 to 6 for heading styles, `None` for everything else.
    pub fn heading_level(self) -> Option<u8> {
        match self {
            Self::Heading1 => Some(1),
            Self::Heading2 => Some(2),
            Self::Heading3 => Some(3),
            Self::Heading4 => Some(4),
            Self::Heading5 => Some(5),
            Self::Heading6 => Some(6),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Paragraph formatting.
pub struct ParagraphStyle {
    /// Named style, which decides whether the paragraph is a heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named_style_type: Option<NamedStyleType>,
    /// Stable id the remote assigns to headings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
/// Glyph preset for a bulleted paragraph range.
pub enum BulletPreset {
    /// Disc bullets.
    #[serde(rename = "BULLET_DISC_CIRCLE_SQUARE")]
    Unordered,
    /// Decimal numbering.
    #[serde(rename = "NUMBERED_DECIMAL_ALPHA_ROMAN")]
    Ordered,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// Insert `text` in front of `location`.
pub struct InsertText {
    /// Insertion point.
    pub location: Location,
    /// Text to insert; newlines split paragraphs.
    pub text: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Apply character formatting to a range.
pub struct SetTextStyle {
    /// Characters to style.
    pub range: IndexRange,
    /// Formatting to overlay.
    pub text_style: TextStyle,
    /// Comma-separated field mask of the keys to overwrite.
    pub fields: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Apply paragraph formatting to every paragraph overlapping a range.
pub struct SetParagraphStyle {
    /// Paragraphs to style.
    pub range: IndexRange,
    /// Formatting to overlay.
    pub paragraph_style: ParagraphStyle,
    /// Comma-separated field mask of the keys to overwrite.
    pub fields: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Turn every paragraph overlapping a range into items of one new list.
pub struct SetBullets {
    /// Paragraphs to bullet.
    pub range: IndexRange,
    /// Glyphs for the new list.
    pub bullet_preset: BulletPreset,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// Take every paragraph overlapping a range out of its list.
pub struct DeleteBullets {
    /// Paragraphs to unbullet.
    pub range: IndexRange,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// Remove a range of content.
pub struct DeleteRange {
    /// Content to remove.
    pub range: IndexRange,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// Insert an empty table.
pub struct InsertTable {
    /// Where the table starts.
    pub location: Location,
    /// Row count.
    pub rows: u32,
    /// Column count.
    pub columns: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// One positional modification, serialized as a single batch-update request.
pub enum Edit {
    /// `insertText`
    #[serde(rename = "insertText")]
    InsertText(InsertText),
    /// `updateTextStyle`
    #[serde(rename = "updateTextStyle")]
    SetTextStyle(SetTextStyle),
    /// `updateParagraphStyle`
    #[serde(rename = "updateParagraphStyle")]
    SetParagraphStyle(SetParagraphStyle),
    /// `createParagraphBullets`
    #[serde(rename = "createParagraphBullets")]
    SetBullets(SetBullets),
    /// `deleteParagraphBullets`
    #[serde(rename = "deleteParagraphBullets")]
    DeleteBullets(DeleteBullets),
    /// `deleteContentRange`
    #[serde(rename = "deleteContentRange")]
    DeleteRange(DeleteRange),
    /// `insertTable`
    #[serde(rename = "insertTable")]
    InsertTable(InsertTable),
}

impl Edit {
    #[must_use]
    /// Insert `text` at `index`.
    pub fn insert_text(index: u32, text: impl Into<String>) -> Self {
        Self::InsertText(InsertText {
            location: Location { index },
            text: text.into(),
        })
    }

    /// Style update whose field mask is derived from the fields `text_style` sets.
    #[must_use]
    pub fn set_text_style(range: IndexRange, text_style: TextStyle) -> Self {
        let fields = text_style.fields();
        Self::SetTextStyle(SetTextStyle {
            range,
            text_style,
            fields,
        })
    }

    #[must_use]
    /// Give every paragraph overlapping `range` the named style.
    pub fn set_paragraph_style(range: IndexRange, named_style_type: NamedStyleType) -> Self {
        Self::SetParagraphStyle(SetParagraphStyle {
            range,
            paragraph_style: ParagraphStyle {
                named_style_type: Some(named_style_type),
                heading_id: None,
            },
            fields: "namedStyleType".to_string(),
        })
    }

    #[must_use]
    /// Bullet every paragraph overlapping `range` with `bullet_preset`.
    pub fn set_bullets(range: IndexRange, bullet_preset: BulletPreset) -> Self {
        Self::SetBullets(SetBullets {
            range,
            bullet_preset,
        })
    }

    #[must_use]
    /// Remove the bullets of every paragraph overlapping `range`.
    pub fn delete_bullets(range: IndexRange) -> Self {
        Self::DeleteBullets(DeleteBullets { range })
    }

    #[must_use]
    /// Delete the content in `range`.
    pub fn delete_range(range: IndexRange) -> Self {
        Self::DeleteRange(DeleteRange { range })
    }

    #[must_use]
    /// Insert an empty `rows` by `columns` table at `index`.
    pub fn insert_table(index: u32, rows: u32, columns: u32) -> Self {
        Self::InsertTable(InsertTable {
            location: Location { index },
            rows,
            columns,
        })
    }

    /// Every position this edit addresses that moves when content is spliced in before it.
    ///
    /// `InsertTable` has none here: its location is only ever computed against a live snapshot,
    /// never compiled ahead of time.
    pub fn index_fields_mut(&mut self) -> Vec<&mut u32> {
        match self {
            Self::InsertText(edit) => vec![&mut edit.location.index],
            Self::SetTextStyle(SetTextStyle { range, .. })
            | Self::SetParagraphStyle(SetParagraphStyle { range, .. })
            | Self::SetBullets(SetBullets { range, .. })
            | Self::DeleteBullets(DeleteBullets { range })
            | Self::DeleteRange(DeleteRange { range }) => {
                vec![&mut range.start_index, &mut range.end_index]
            }
            Self::InsertTable(_) => Vec::new(),
        }
    }

    #[must_use]
    /// Read-only view of [`Edit::index_fields_mut`].
    pub fn index_fields(&self) -> Vec<u32> {
        match self {
            Self::InsertText(edit) => vec![edit.location.index],
            Self::SetTextStyle(SetTextStyle { range, .. })
            | Self::SetParagraphStyle(SetParagraphStyle { range, .. })
            | Self::SetBullets(SetBullets { range, .. })
            | Self::DeleteBullets(DeleteBullets { range })
            | Self::DeleteRange(DeleteRange { range }) => vec![range.start_index, range.end_index],
            Self::InsertTable(_) => Vec::new(),
        }
    }

    /// UTF-16 length this edit adds to the document, zero for everything but text insertion.
    #[must_use]
    pub fn inserted_len(&self) -> u32 {
        match self {
            Self::InsertText(edit) => utf16_len(&edit.text),
            _ => 0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// Revision guard sent with a batch and echoed back with the new revision.
pub struct WriteControl {
    /// Revision the batch must apply to; echoed back as the new revision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_revision_id: Option<String>,
    /// Revision to merge against instead of failing; never set by docsmith.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_revision_id: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
/// Ordered edits bound to the snapshot they were computed against, applied all-or-nothing.
///
/// There is no way to build a plan without a [`Document`], so indices cannot be carried over
/// from one snapshot to the next by accident.
pub struct EditPlan {
    requests: Vec<Edit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    write_control: Option<WriteControl>,
}

impl EditPlan {
    #[must_use]
    /// Bind `requests` to `snapshot`'s revision.
    pub fn against(snapshot: &Document, requests: Vec<Edit>) -> Self {
        let write_control = snapshot.revision_id.as_ref().map(|revision| WriteControl {
            required_revision_id: Some(revision.clone()),
            target_revision_id: None,
        });
        Self {
            requests,
            write_control,
        }
    }

    #[must_use]
    /// The edits, in application order.
    pub fn requests(&self) -> &[Edit] {
        &self.requests
    }

    #[must_use]
    /// Revision of the snapshot the plan was built against.
    pub fn required_revision(&self) -> Option<&str> {
        self.write_control
            .as_ref()
            .and_then(|control| control.required_revision_id.as_deref())
    }

    #[must_use]
    /// Whether the plan has no edits.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    #[must_use]
    /// Number of edits.
    pub fn len(&self) -> usize {
        self.requests.len()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
/// What the remote reports after applying a batch.
pub struct BatchReply {
    /// Document the batch was applied to.
    #[serde(default)]
    pub document_id: String,
    /// Carries the revision produced by the batch.
    #[serde(default)]
    pub write_control: Option<WriteControl>,
}

#[cfg(test)]
#[path = "tests/edit_plan.rs"]
mod tests;
