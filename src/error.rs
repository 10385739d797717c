//! Errors surfaced by compilation, section lookup and the remote document service.
//!
//! Skipped tables and guarded cells are not errors: they are logged with `tracing::warn!`
//! and the protocol moves on to the next item.

use thiserror::Error;

#[derive(Error, Debug)]
/// Everything that can abort a docsmith command.
pub enum Error {
    /// No heading matches the requested title.
    #[error("No section titled {0:?}")]
    SectionNotFound(String),

    /// The token tree is deeper than the configured limit.
    #[error("Token tree nests {depth} levels deep, limit is {limit}")]
    NestingTooDeep {
        /// Depth that was reached.
        depth: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// The document changed after the plan's snapshot was taken.
    #[error("Edit plan targets revision {expected} but the document is at {actual}")]
    StaleRevision {
        /// Revision the plan was built against.
        expected: String,
        /// Revision the document is at now.
        actual: String,
    },

    /// A rebase would move a position below 1.
    #[error("Shifting index {index} by {offset} leaves the document")]
    IndexUnderflow {
        /// Position that would underflow.
        index: u32,
        /// Requested shift.
        offset: i64,
    },

    /// The document refused an edit.
    #[error("Rejected edit: {0}")]
    InvalidEdit(String),

    /// The environment variable holding the access token is unset or empty.
    #[error("Access token variable {0} is not set")]
    MissingToken(String),

    /// The service answered with an error status.
    #[error("Document service returned {status}: {message}")]
    Service {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// The service could not be reached.
    #[error("Document service unreachable: {0}")]
    Transport(String),

    /// A payload failed to (de)serialize.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Reading a file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
