//! Top-level parse orchestration.
//!
//! Skips leading comments, parses one root value and then applies the
//! policies from [`ParseOptions`]: empty input placeholders, the remainder
//! check, loose mode and the error policy. Reinterpreting the whole input
//! as a string is the common fallback for all of them.

use std::sync::Arc;

use lcml_cursor::Cursor;
use serde::Serialize;

use crate::ast::{
    ExpressionNode, NodeRef, NullishNode, Span, StringNode, StringPart, StringSegmentNode, Value,
};
use crate::grammar::{parse_string_content, parse_value, skip_trivia};
use crate::options::{EmptyInput, OnError, ParseOptions, Remainder};
use crate::session::Session;
use crate::ParseError;

/// Output of a parse call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    /// Root value, or `None` when nothing could be parsed.
    pub ast: Option<Value>,
    /// Every expression of the AST, in document order.
    pub expressions: Vec<ExpressionNode>,
    /// Where the root value starts, after leading comments.
    pub actual_start: usize,
    pub end: usize,
    /// First entry of `errors`.
    pub error: Option<ParseError>,
    pub errors: Vec<ParseError>,
    /// The whole input was reinterpreted as a string.
    pub loose_mode_enabled: bool,
}

impl ParseResult {
    /// Whether the result holds any embedded expression.
    pub fn is_dynamic(&self) -> bool {
        !self.expressions.is_empty()
    }
}

type ExpressionHandler<'h> = Box<dyn FnMut(&mut ExpressionNode) + 'h>;
type NodeObserver<'h> = Box<dyn FnMut(NodeRef<'_>) + 'h>;

/// LCML parser with optional hooks.
///
/// ```
/// use lcml_parser::{Parser, ParseOptions, ValueType};
///
/// let mut parser = Parser::new(ParseOptions::default())
///     .on_expression(|node| node.value_type = ValueType::Number);
/// let result = parser.parse("[{{ a }}, {{ b }}]").unwrap();
/// assert!(result.expressions.iter().all(|e| e.value_type == ValueType::Number));
/// ```
#[derive(Default)]
pub struct Parser<'h> {
    options: ParseOptions,
    expression_handler: Option<ExpressionHandler<'h>>,
    node_observer: Option<NodeObserver<'h>>,
}

impl<'h> Parser<'h> {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            expression_handler: None,
            node_observer: None,
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Called once for every expression as soon as it is parsed. May
    /// rewrite `expression` and set `value_type`.
    pub fn on_expression(mut self, handler: impl FnMut(&mut ExpressionNode) + 'h) -> Self {
        self.expression_handler = Some(Box::new(handler));
        self
    }

    /// Called for every node once it is complete. Composite nodes are
    /// reported after their children.
    pub fn on_node(mut self, observer: impl FnMut(NodeRef<'_>) + 'h) -> Self {
        self.node_observer = Some(Box::new(observer));
        self
    }

    /// Parse `source` with this parser's options and hooks.
    ///
    /// Returns `Err` only under [`OnError::Throw`].
    #[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
    pub fn parse(&mut self, source: &str) -> Result<ParseResult, ParseError> {
        let options = &self.options;
        let mut session = Session::new(Arc::from(source), options.on_error.halts());
        if let Some(handler) = self.expression_handler.as_mut() {
            session.set_expression_handler(&mut **handler);
        }
        if let Some(observer) = self.node_observer.as_mut() {
            session.set_observer(&mut **observer);
        }

        let mut cursor = Cursor::new(source);
        skip_trivia(&mut cursor, &mut session);
        let actual_start = cursor.position();

        let mut ast = if cursor.at_end() {
            Some(placeholder(actual_start, options.treat_empty_input, &mut session))
        } else {
            parse_value(cursor, &mut session)
        };

        match &ast {
            Some(value) => {
                cursor.jump_to(value.span().end);
                cursor.skip_whitespace();
            }
            None => session.push_error("invalid input", actual_start),
        }

        let may_loose = options.loose
            && !matches!(
                ast,
                Some(Value::String(_) | Value::Array(_) | Value::Object(_))
            );

        let mut as_string = false;
        if !session.has_errors() && !cursor.at_end() {
            if matches!(ast, Some(Value::Expression(_))) {
                tracing::debug!("expression followed by text, reading input as a string");
                as_string = true;
            } else if may_loose || options.treat_unparsed_remainder == Remainder::AsError {
                session.push_error("unexpected remainder", cursor.position());
            }
        }

        if session.has_errors() && (may_loose || options.on_error == OnError::AsString) {
            tracing::debug!(
                errors = session.errors().len(),
                loose = may_loose,
                "discarding structure, reading input as a string"
            );
            as_string = true;
        }

        if as_string {
            session.clear_errors();
            session.restart_expressions();
            let rest = Cursor::new(source).clone_at(actual_start);
            ast = Some(Value::String(parse_string_content(rest, None, &mut session)));
        }

        let (expressions, errors) = session.finish();

        if options.on_error == OnError::Throw {
            if let Some(first) = errors.first() {
                return Err(first.clone());
            }
        }
        if !errors.is_empty() {
            tracing::debug!(
                errors = errors.len(),
                policy = ?options.on_error,
                "returning partial result"
            );
        }

        Ok(ParseResult {
            end: ast.as_ref().map_or(actual_start, |value| value.span().end),
            ast,
            expressions,
            actual_start,
            error: errors.first().cloned(),
            errors,
            loose_mode_enabled: as_string,
        })
    }
}

/// Parse `source` with `options` and no hooks.
pub fn parse(source: &str, options: &ParseOptions) -> Result<ParseResult, ParseError> {
    Parser::new(options.clone()).parse(source)
}

/// Zero-length root for input that holds only whitespace and comments.
fn placeholder(position: usize, empty: EmptyInput, session: &mut Session<'_>) -> Value {
    let span = Span::new(position, position);
    match empty {
        EmptyInput::AsUndefined => {
            let node = NullishNode {
                span,
                raw: "undefined".to_string(),
            };
            session.observe(NodeRef::Nullish(&node));
            Value::Nullish(node)
        }
        EmptyInput::AsEmptyString => {
            let node = StringNode {
                span,
                quote: Some('"'),
                segments: vec![StringPart::Segment(StringSegmentNode {
                    span,
                    raw: String::new(),
                })],
                is_dynamic: false,
            };
            session.observe(NodeRef::String(&node));
            Value::String(node)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NodeKind, ValueType};
    use pretty_assertions::assert_eq;

    fn parse_with(source: &str, options: ParseOptions) -> ParseResult {
        parse(source, &options).unwrap()
    }

    fn messages(result: &ParseResult) -> Vec<&str> {
        result.errors.iter().map(|e| e.message.as_str()).collect()
    }

    // =========================================================================
    // Empty input
    // =========================================================================

    #[test]
    fn test_empty_input_is_undefined() {
        let result = parse_with("  /* nothing */  ", ParseOptions::default());
        match result.ast {
            Some(Value::Nullish(n)) => {
                assert_eq!(n.raw, "undefined");
                assert_eq!(n.span, Span::new(17, 17));
            }
            other => panic!("Expected nullish, got {other:?}"),
        }
        assert_eq!(result.actual_start, 17);
        assert_eq!(result.end, 17);
    }

    #[test]
    fn test_empty_input_as_empty_string() {
        let options = ParseOptions {
            treat_empty_input: EmptyInput::AsEmptyString,
            ..ParseOptions::default()
        };
        let result = parse_with("", options);
        match result.ast {
            Some(Value::String(s)) => {
                assert_eq!(s.segments.len(), 1);
                assert!(s.span.is_empty());
            }
            other => panic!("Expected string, got {other:?}"),
        }
    }

    // =========================================================================
    // Remainder handling
    // =========================================================================

    #[test]
    fn test_remainder_is_error() {
        let err = parse("1 2", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.message, "unexpected remainder");
        assert_eq!(err.position, 2);
    }

    #[test]
    fn test_remainder_ignored() {
        let options = ParseOptions {
            treat_unparsed_remainder: Remainder::Ignore,
            ..ParseOptions::default()
        };
        let result = parse_with("[1] trailing", options);
        assert!(result.errors.is_empty());
        assert_eq!(result.end, 3);
    }

    #[test]
    fn test_trailing_whitespace_is_not_remainder() {
        let result = parse_with("  true \n\t", ParseOptions::default());
        assert_eq!(result.actual_start, 2);
        assert_eq!(result.end, 6);
    }

    #[test]
    fn test_expression_followed_by_text_is_string() {
        let result = parse_with(" {{ expr }}, welcome ! // not-comment", ParseOptions::default());
        match &result.ast {
            Some(Value::String(s)) => {
                assert_eq!(s.quote, None);
                assert_eq!(s.segments.len(), 3);
                assert!(s.is_dynamic);
            }
            other => panic!("Expected string, got {other:?}"),
        }
        assert_eq!(result.expressions.len(), 1);
        assert!(result.errors.is_empty());
        assert_eq!(result.actual_start, 1);
    }

    // =========================================================================
    // Error policies
    // =========================================================================

    #[test]
    fn test_invalid_input_throws() {
        let err = parse("@", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.message, "invalid input");
        assert_eq!(err.to_string(), "Cannot parse: invalid input (at :0)");
    }

    #[test]
    fn test_return_stops_at_first_error() {
        let options = ParseOptions::default().with_on_error(OnError::Return);
        let result = parse_with("[1 2, @]", options);
        assert_eq!(messages(&result), vec!["expect comma or right square bracket"]);
        assert_eq!(result.error.as_ref().map(|e| e.position), Some(3));
        assert!(matches!(result.ast, Some(Value::Array(_))));
    }

    #[test]
    fn test_recover_collects_all() {
        let options = ParseOptions::default().with_on_error(OnError::Recover);
        let result = parse_with("[1 2, @]", options);
        assert_eq!(
            messages(&result),
            vec![
                "expect comma or right square bracket",
                "expect value, comma or right square bracket",
            ]
        );
    }

    #[test]
    fn test_as_string_discards_structure() {
        let options = ParseOptions::default().with_on_error(OnError::AsString);
        let result = parse_with(" [1, {{ a }}, @", options);
        match &result.ast {
            Some(Value::String(s)) => {
                assert_eq!(s.span, Span::new(1, 15));
                assert_eq!(s.segments.len(), 3);
            }
            other => panic!("Expected string, got {other:?}"),
        }
        assert!(result.errors.is_empty());
        assert!(result.loose_mode_enabled);
        assert_eq!(result.expressions.len(), 1);
    }

    // =========================================================================
    // Loose mode
    // =========================================================================

    #[test]
    fn test_loose_rescues_literal_with_garbage() {
        let result = parse_with("12 apples", ParseOptions::default().with_loose(true));
        assert_eq!(result.ast.as_ref().map(Value::kind), Some(NodeKind::String));
        assert!(result.errors.is_empty());
        assert!(result.loose_mode_enabled);
    }

    #[test]
    fn test_loose_rescues_invalid_input() {
        let result = parse_with("hello world", ParseOptions::default().with_loose(true));
        assert_eq!(result.ast.as_ref().map(Value::kind), Some(NodeKind::String));
        assert_eq!(result.end, 11);
    }

    #[test]
    fn test_loose_keeps_structured_errors() {
        let err = parse("[1, @]", &ParseOptions::default().with_loose(true)).unwrap_err();
        assert_eq!(err.message, "expect value, comma or right square bracket");
    }

    #[test]
    fn test_loose_does_not_fire_on_clean_input() {
        let result = parse_with("42", ParseOptions::default().with_loose(true));
        assert!(!result.loose_mode_enabled);
        assert_eq!(result.ast.as_ref().map(Value::kind), Some(NodeKind::Number));
    }

    // =========================================================================
    // Hooks
    // =========================================================================

    #[test]
    fn test_expression_handler_rewrites() {
        let mut parser = Parser::new(ParseOptions::default())
            .on_expression(|node| node.expression = node.expression.trim().to_string());
        let result = parser.parse(r#"{ "k": "{{ a }}-{{ b }}" }"#).unwrap();
        let texts: Vec<&str> = result.expressions.iter().map(|e| e.expression.as_str()).collect();
        assert_eq!(texts, vec!["a", "b"]);
        assert_eq!(result.expressions[0].raw_expression, " a ");
        assert!(result.is_dynamic());
    }

    #[test]
    fn test_node_observer_order() {
        let mut kinds = Vec::new();
        {
            let mut parser =
                Parser::new(ParseOptions::default()).on_node(|node| kinds.push(node.kind()));
            parser.parse("[1, 'a']").unwrap();
        }
        assert_eq!(
            kinds,
            vec![
                NodeKind::Number,
                NodeKind::StringSegment,
                NodeKind::String,
                NodeKind::Array,
            ]
        );
    }

    #[test]
    fn test_hooks_run_once_when_input_is_read_as_string() {
        let mut calls = 0;
        let mut expression_nodes = 0;
        let result = {
            let mut parser = Parser::new(ParseOptions::default())
                .on_expression(|node| {
                    calls += 1;
                    node.expression = node.expression.trim().to_string();
                    node.value_type = ValueType::Number;
                })
                .on_node(|node| {
                    if node.kind() == NodeKind::Expression {
                        expression_nodes += 1;
                    }
                });
            parser.parse("{{ a }} tail").unwrap()
        };

        assert!(result.loose_mode_enabled);
        assert_eq!(calls, 1);
        assert_eq!(expression_nodes, 1);
        assert_eq!(result.expressions[0].expression, "a");
        assert_eq!(result.expressions[0].value_type, ValueType::Number);
        match &result.ast {
            Some(Value::String(s)) => match &s.segments[1] {
                StringPart::Expression(e) => assert_eq!(e.expression, "a"),
                other => panic!("Expected expression, got {other:?}"),
            },
            other => panic!("Expected string, got {other:?}"),
        }
    }

    #[test]
    fn test_as_string_handles_each_expression_once() {
        let mut calls = 0;
        {
            let options = ParseOptions::default().with_on_error(OnError::AsString);
            let mut parser = Parser::new(options).on_expression(|_| calls += 1);
            let result = parser.parse("[{{ a }}, {{ b }} x").unwrap();
            assert_eq!(result.expressions.len(), 2);
        }
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_parser_is_reusable() {
        let mut count = 0;
        {
            let mut parser = Parser::new(ParseOptions::default()).on_expression(|_| count += 1);
            parser.parse("{{ a }}").unwrap();
            parser.parse("[{{ b }}, {{ c }}]").unwrap();
        }
        assert_eq!(count, 3);
    }
}
