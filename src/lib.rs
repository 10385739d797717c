//! docsmith: compile markdown into positional edit scripts for remote rich-text documents.
//!
//! Markdown is lexed into a [`token::Token`] tree, compiled into an ordered script of
//! [`edit_plan::Edit`]s laid out from position 1, shifted to wherever it is spliced in, and
//! committed through a [`service::DocumentService`]. Tables follow in a second pass that swaps
//! each placeholder paragraph for a native table and fills its cells.
#![allow(clippy::multiple_crate_versions)]

pub mod compiler;
pub mod config;
pub mod document;
pub mod edit_plan;
pub mod error;
pub mod formats;
pub mod publish;
pub mod rebase;
pub mod search;
pub mod section;
pub mod service;
pub mod tables;
pub mod token;

pub use error::{Error, Result};
