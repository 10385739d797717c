//! Format trait and implementations for different source document types.
//!
//! This module defines the `Format` trait which abstracts over source formats by turning raw text
//! into the token tree the compiler consumes. Markdown is the only format shipped today.

use crate::token::Token;

pub mod markdown;

/// A source language that can be lexed into tokens.
pub trait Format {
    /// Lex `source` into top-level block tokens in document order.
    fn tokenize(&self, source: &str) -> Vec<Token>;
}
