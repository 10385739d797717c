//! Configuration to acknowledge developer preferences as well as set defaults.
//!
//! Specifically, we try to find a docsmith.toml, and if present we load settings from there.
//! This provides the remote endpoint, where to find the access token, and compiler preferences.

use crate::error::{Error, Result};
use facet::Facet;
use std::fs;
use std::path::Path;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "docsmith.toml";

#[derive(Facet, Clone, Debug)]
/// User preferences loaded from docsmith.toml or falling back to defaults.
pub struct Config {
    #[facet(default = "https://docs.googleapis.com/v1".to_string())]
    /// Base URL of the document service.
    pub api_base: String,
    #[facet(default = "DOCSMITH_ACCESS_TOKEN".to_string())]
    /// Environment variable holding an OAuth2 bearer token.
    pub token_env: String,
    #[facet(default = "Courier New".to_string())]
    /// Monospace font family for code blocks and inline code.
    pub code_font: String,
    #[facet(default = 32)]
    /// Deepest token nesting the compiler accepts.
    pub max_nesting: usize,
}

impl Config {
    /// Parse a TOML document, filling unset fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the text is not a valid configuration.
    pub fn parse(contents: &str) -> Result<Self> {
        facet_toml::from_str::<Self>(contents).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from `path`, or from docsmith.toml if present.
    ///
    /// An explicitly requested file must exist; the implicit one is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file cannot be read or any file fails to parse.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::parse(&fs::read_to_string(path)?),
            None => match fs::read_to_string(DEFAULT_CONFIG_FILE) {
                Ok(contents) => Self::parse(&contents),
                Err(_) => Self::parse(""),
            },
        }
    }

    /// Read the bearer token from the configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingToken`] if the variable is unset or empty.
    pub fn access_token(&self) -> Result<String> {
        match std::env::var(&self.token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(Error::MissingToken(self.token_env.clone())),
        }
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
