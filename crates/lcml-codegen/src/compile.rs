//! Parse and generate in one call.

use lcml_parser::{ExpressionNode, ParseError, ParseOptions, ParseResult, Parser};
use serde::{Deserialize, Serialize};

use crate::js::{to_js, to_js_with, ExpressionHook};
use crate::ToJsOptions;

/// Parse options and generator options side by side. Serialized flat, so
/// one JSON object configures both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    #[serde(flatten)]
    pub parse: ParseOptions,
    #[serde(flatten)]
    pub to_js: ToJsOptions,
}

/// A [`ParseResult`] plus the generated code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileResult {
    #[serde(flatten)]
    pub parsed: ParseResult,
    /// `undefined` when there is no AST.
    pub body: String,
}

impl CompileResult {
    pub fn is_dynamic(&self) -> bool {
        self.parsed.is_dynamic()
    }
}

/// Compiler with optional hooks.
///
/// ```
/// use lcml_codegen::{CompileOptions, Compiler};
///
/// let mut compiler = Compiler::new(CompileOptions::default())
///     .on_expression(|node| node.expression = node.expression.trim().to_string())
///     .process_expression(|node, _| format!("ctx.{}", node.expression));
/// let result = compiler.compile("{{ user }}").unwrap();
/// assert_eq!(result.body, "(ctx.user)");
/// ```
pub struct Compiler<'h> {
    parser: Parser<'h>,
    to_js: ToJsOptions,
    process_expression: Option<Box<ExpressionHook<'h>>>,
}

impl<'h> Compiler<'h> {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            parser: Parser::new(options.parse),
            to_js: options.to_js,
            process_expression: None,
        }
    }

    /// See [`Parser::on_expression`].
    pub fn on_expression(self, handler: impl FnMut(&mut ExpressionNode) + 'h) -> Self {
        Self {
            parser: self.parser.on_expression(handler),
            ..self
        }
    }

    /// Replaces the emitted text of every expression.
    pub fn process_expression(
        mut self,
        hook: impl FnMut(&ExpressionNode, &[lcml_parser::NodeRef<'_>]) -> String + 'h,
    ) -> Self {
        self.process_expression = Some(Box::new(hook));
        self
    }

    /// Parse `source`, then generate code from the AST.
    #[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
    pub fn compile(&mut self, source: &str) -> Result<CompileResult, ParseError> {
        let parsed = self.parser.parse(source)?;
        let body = match (&parsed.ast, self.process_expression.as_deref_mut()) {
            (Some(ast), Some(hook)) => to_js_with(ast, &self.to_js, hook),
            (Some(ast), None) => to_js(ast, &self.to_js),
            (None, _) => "undefined".to_string(),
        };
        tracing::debug!(
            body_len = body.len(),
            errors = parsed.errors.len(),
            "compiled"
        );
        Ok(CompileResult { parsed, body })
    }
}

/// Compile `source` with `options` and no hooks.
pub fn compile(source: &str, options: &CompileOptions) -> Result<CompileResult, ParseError> {
    Compiler::new(options.clone()).compile(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcml_parser::OnError;
    use pretty_assertions::assert_eq;

    // =========================================================================
    // Options
    // =========================================================================

    #[test]
    fn test_options_are_flat_in_json() {
        let options: CompileOptions = serde_json::from_str(
            r#"{ "onError": "recover", "loose": true, "compact": true, "globalToStringMethod": "s" }"#,
        )
        .unwrap();
        assert_eq!(options.parse.on_error, OnError::Recover);
        assert!(options.parse.loose);
        assert!(options.to_js.compact);
        assert_eq!(options.to_js.global_to_string_method, "s");
    }

    #[test]
    fn test_empty_json_is_default() {
        let options: CompileOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, CompileOptions::default());
    }

    // =========================================================================
    // Compile
    // =========================================================================

    #[test]
    fn test_compile_body() {
        let result = compile("[1, {{ a }}]", &CompileOptions::default()).unwrap();
        assert_eq!(result.body, "[\n  1,\n  ( a ),\n]");
        assert!(result.is_dynamic());
    }

    #[test]
    fn test_no_ast_compiles_to_undefined() {
        let options = CompileOptions {
            parse: ParseOptions::default().with_on_error(OnError::Recover),
            ..CompileOptions::default()
        };
        let result = compile("@", &options).unwrap();
        assert_eq!(result.parsed.ast, None);
        assert_eq!(result.body, "undefined");
        assert_eq!(result.parsed.errors[0].message, "invalid input");
    }

    #[test]
    fn test_throw_propagates() {
        let err = compile("[1", &CompileOptions::default()).unwrap_err();
        assert!(err.message.contains("right square bracket"));
    }

    #[test]
    fn test_handler_output_reaches_generator() {
        let mut compiler = Compiler::new(CompileOptions::default())
            .on_expression(|node| node.expression = "rewritten".to_string());
        let result = compiler.compile("{{ original }}").unwrap();
        assert_eq!(result.body, "(rewritten)");
        assert_eq!(result.parsed.expressions[0].raw_expression, " original ");
    }

    #[test]
    fn test_handler_runs_once_for_expression_then_prose() {
        let mut calls = 0;
        let result = {
            let mut compiler = Compiler::new(CompileOptions::default()).on_expression(|node| {
                calls += 1;
                node.expression = "n".to_string();
            });
            compiler.compile("{{ a }} tail").unwrap()
        };
        assert_eq!(calls, 1);
        assert_eq!(result.body, r#"toString((n)) + " tail""#);
    }

    #[test]
    fn test_result_serializes_flat() {
        let result = compile("'x'", &CompileOptions::default()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["body"], r#""x""#);
        assert_eq!(json["ast"]["type"], "string");
        assert_eq!(json["actualStart"], 0);
    }
}
