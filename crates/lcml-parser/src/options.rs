//! Parser configuration.
//!
//! Options are plain data so hosts can load them from JSON; hooks live on
//! [`Parser`](crate::Parser) instead.

use serde::{Deserialize, Serialize};

/// What an input holding nothing but whitespace and comments parses to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyInput {
    /// A zero-length `undefined`.
    #[default]
    AsUndefined,
    /// A zero-length `""`.
    AsEmptyString,
}

/// What to do with text left over after the root value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Remainder {
    #[default]
    AsError,
    Ignore,
}

/// Error policy for one parse call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnError {
    /// Stop at the first error and return it as `Err`.
    #[default]
    Throw,
    /// Stop at the first error, return the partial AST and the error.
    Return,
    /// Resynchronize after structural errors and collect all of them.
    Recover,
    /// On any error, read the whole input as a string instead.
    AsString,
}

impl OnError {
    /// Whether the first committed error stops all composite parsers.
    pub fn halts(self) -> bool {
        !matches!(self, OnError::Recover)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParseOptions {
    /// Read the input as a string when a bare literal root is followed by
    /// anything, or when nothing parses at all.
    pub loose: bool,
    pub treat_empty_input: EmptyInput,
    pub treat_unparsed_remainder: Remainder,
    pub on_error: OnError,
}

impl ParseOptions {
    pub fn with_on_error(mut self, on_error: OnError) -> Self {
        self.on_error = on_error;
        self
    }

    pub fn with_loose(mut self, loose: bool) -> Self {
        self.loose = loose;
        self
    }
}
