//! The remote document collaborator.
//!
//! Retrieval returns one immutable [`Document`] snapshot; applying a batch consumes an
//! [`EditPlan`] built from such a snapshot. `apply` takes `&mut self`, so a service handle can
//! never have two batches in flight for the same document.

use crate::document::Document;
use crate::edit_plan::{BatchReply, EditPlan};
use crate::error::Result;

pub mod google;
pub mod memory;

pub use google::GoogleDocs;
pub use memory::MemoryDocument;

/// Retrieves snapshots of a document and applies edit plans to it.
pub trait DocumentService {
    /// Retrieve the current state of `document_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be reached or refuses the request.
    fn fetch(&self, document_id: &str) -> Result<Document>;

    /// Apply every edit of `plan` in order, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if any edit is rejected, in which case nothing was applied.
    fn apply(&mut self, document_id: &str, plan: EditPlan) -> Result<BatchReply>;
}
