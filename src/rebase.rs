//! Shifts a compiled script so it can be spliced into the middle of an existing document.
//!
//! Scripts are compiled as though the document were empty, starting at position 1. To land at
//! `insert_index` every position-bearing field of every edit moves by `insert_index - 1`. Missing
//! a single field produces misplaced text or styling that nothing downstream can detect, so the
//! set of fields is owned by [`Edit::index_fields_mut`] and this module never picks them itself.

use crate::compiler::Script;
use crate::edit_plan::{Edit, IndexRange};
use crate::error::{Error, Result};

/// Add `offset` to every index field of every edit.
///
/// Either every field moves or none does.
///
/// # Errors
///
/// Returns [`Error::IndexUnderflow`] if any index would fall below 1.
pub fn rebase(requests: &mut [Edit], offset: i64) -> Result<()> {
    for edit in requests.iter() {
        for index in edit.index_fields() {
            shifted(index, offset)?;
        }
    }
    for edit in requests.iter_mut() {
        for index in edit.index_fields_mut() {
            *index = shifted(*index, offset)?;
        }
    }
    Ok(())
}

fn shifted(index: u32, offset: i64) -> Result<u32> {
    u32::try_from(i64::from(index) + offset)
        .ok()
        .filter(|moved| *moved >= 1)
        .ok_or(Error::IndexUnderflow { index, offset })
}

fn shifted_range(range: IndexRange, offset: i64) -> Result<IndexRange> {
    Ok(IndexRange::new(
        shifted(range.start_index, offset)?,
        shifted(range.end_index, offset)?,
    ))
}

impl Script {
    /// Move the whole script, its table placeholders and its cursor to start at `insert_index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexUnderflow`] only if the script already held indices below 1.
    pub fn rebased(mut self, insert_index: u32) -> Result<Self> {
        let offset = i64::from(insert_index.max(1)) - 1;
        if offset == 0 {
            return Ok(self);
        }
        rebase(&mut self.requests, offset)?;
        for table in &mut self.tables {
            table.placeholder_range = shifted_range(table.placeholder_range, offset)?;
        }
        self.cursor = shifted(self.cursor, offset)?;
        tracing::debug!(insert_index, offset, "rebased script");
        Ok(self)
    }
}

#[cfg(test)]
#[path = "tests/rebase.rs"]
mod tests;
