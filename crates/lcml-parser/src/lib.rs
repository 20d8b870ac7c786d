//! LCML Parser
//!
//! Parses LCML source text (JSON-like literals with `{{ expression }}`
//! interpolation, comments and sparse arrays) into a typed AST.
//!
//! The grammar is a set of small recursive-descent parsers that share one
//! [`Session`] per call. The session collects errors, records every
//! embedded expression and drives the error policy chosen in
//! [`ParseOptions`].
//!
//! ```
//! use lcml_parser::{parse, ParseOptions, Value};
//!
//! let result = parse(r#"{ "greeting": "hi {{ name }}" }"#, &ParseOptions::default()).unwrap();
//! assert!(matches!(result.ast, Some(Value::Object(_))));
//! assert_eq!(result.expressions[0].expression, " name ");
//! ```

use std::sync::Arc;

use serde::Serialize;

pub mod ast;
mod grammar;
pub mod options;
pub mod parser;
pub mod session;

pub use ast::{
    ArrayNode, BooleanNode, CommentNode, ExpressionNode, IdentifierNode, ItemLocation, NodeKind,
    NodeRef, NullishNode, NumberNode, ObjectNode, PropertyKey, PropertyNode, Span, StringNode,
    StringPart, StringSegmentNode, Value, ValueType,
};
pub use options::{EmptyInput, OnError, ParseOptions, Remainder};
pub use parser::{parse, ParseResult, Parser};
pub use session::Session;

/// Parse error with position information.
///
/// `message` holds the stable part (`"expect right square bracket"`,
/// `"unexpected remainder"`, ...); the display form adds the position.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize)]
#[error("Cannot parse: {message} (at :{position})")]
pub struct ParseError {
    pub message: String,
    /// Byte offset into the source.
    pub position: usize,
    /// The full source the error refers to.
    #[serde(skip)]
    pub source_text: Arc<str>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize, source_text: Arc<str>) -> Self {
        Self {
            message: message.into(),
            position,
            source_text,
        }
    }

    /// 1-based line and column (in characters) of the error position.
    pub fn line_column(&self) -> (usize, usize) {
        let before = self
            .source_text
            .get(..self.position)
            .unwrap_or(&self.source_text);
        let line = before.matches('\n').count() + 1;
        let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
        (line, column)
    }
}
