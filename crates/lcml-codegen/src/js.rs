//! JavaScript generator.
//!
//! A pure walk over a finished tree. Elided array slots render as
//! `/* empty */` and properties without a value as `undefined`, so partial
//! trees from a recovering parse always produce output.

use std::fmt::Write;

use lcml_cursor::unescape;
use lcml_parser::{
    ArrayNode, ExpressionNode, NodeRef, ObjectNode, PropertyKey, StringNode, StringPart, Value,
};

use crate::ToJsOptions;

/// Rewrites an expression before it is emitted. Receives the node and its
/// ancestor values, outermost first.
pub type ExpressionHook<'h> = dyn FnMut(&ExpressionNode, &[NodeRef<'_>]) -> String + 'h;

/// Render `ast` as a JavaScript expression.
pub fn to_js(ast: &Value, options: &ToJsOptions) -> String {
    Generator::new(options, None).value(ast, "", &mut Vec::new())
}

/// Like [`to_js`], passing every expression through `hook`.
pub fn to_js_with(ast: &Value, options: &ToJsOptions, hook: &mut ExpressionHook<'_>) -> String {
    Generator::new(options, Some(hook)).value(ast, "", &mut Vec::new())
}

struct Generator<'a, 'h> {
    to_string: &'a str,
    indent_unit: &'a str,
    line_break: &'a str,
    hook: Option<&'a mut ExpressionHook<'h>>,
}

impl<'a, 'h> Generator<'a, 'h> {
    fn new(options: &'a ToJsOptions, hook: Option<&'a mut ExpressionHook<'h>>) -> Self {
        Self {
            to_string: &options.global_to_string_method,
            indent_unit: options.indent_unit(),
            line_break: options.line_break(),
            hook,
        }
    }

    fn value<'n>(
        &mut self,
        value: &'n Value,
        indent: &str,
        parents: &mut Vec<NodeRef<'n>>,
    ) -> String {
        match value {
            Value::Number(node) => node.raw.clone(),
            Value::Boolean(node) => node.raw.clone(),
            Value::Nullish(node) => node.raw.clone(),
            Value::Expression(node) => self.expression(node, parents),
            Value::String(node) => self.string(node, parents),
            Value::Array(node) => self.array(node, indent, parents),
            Value::Object(node) => self.object(node, indent, parents),
        }
    }

    fn expression(&mut self, node: &ExpressionNode, parents: &[NodeRef<'_>]) -> String {
        let code = match self.hook.as_deref_mut() {
            Some(hook) => hook(node, parents),
            None => node.expression.clone(),
        };
        format!("({code})")
    }

    fn string<'n>(&mut self, node: &'n StringNode, parents: &mut Vec<NodeRef<'n>>) -> String {
        parents.push(NodeRef::String(node));
        let mut parts = Vec::with_capacity(node.segments.len());
        for part in &node.segments {
            match part {
                StringPart::Expression(expression) => {
                    let code = self.expression(expression, parents);
                    parts.push(format!("{}({code})", self.to_string));
                }
                StringPart::Segment(segment) if !segment.raw.is_empty() => {
                    parts.push(quote(&unescape(&segment.raw)));
                }
                StringPart::Segment(_) => {}
            }
        }
        parents.pop();

        if parts.is_empty() {
            return quote("");
        }
        parts.join(" + ")
    }

    fn array<'n>(
        &mut self,
        node: &'n ArrayNode,
        indent: &str,
        parents: &mut Vec<NodeRef<'n>>,
    ) -> String {
        if node.is_empty() {
            return "[]".to_string();
        }

        let inner = format!("{}{indent}", self.indent_unit);
        parents.push(NodeRef::Array(node));
        let mut lines = vec!["[".to_string()];
        for item in &node.items {
            let code = match item {
                Some(value) => self.value(value, &inner, parents),
                None => "/* empty */".to_string(),
            };
            lines.push(format!("{}{code},", self.indent_unit));
        }
        lines.push("]".to_string());
        parents.pop();

        lines.join(&format!("{}{indent}", self.line_break))
    }

    fn object<'n>(
        &mut self,
        node: &'n ObjectNode,
        indent: &str,
        parents: &mut Vec<NodeRef<'n>>,
    ) -> String {
        if node.properties.is_empty() {
            return "{}".to_string();
        }

        let inner = format!("{}{indent}", self.indent_unit);
        parents.push(NodeRef::Object(node));
        let mut lines = vec!["{".to_string()];
        for property in &node.properties {
            let key = match &property.key {
                PropertyKey::Identifier(identifier) => identifier.raw.clone(),
                PropertyKey::Expression(expression) => {
                    format!("[{}]", self.expression(expression, parents))
                }
                PropertyKey::String(string) if string.is_dynamic => {
                    format!("[{}]", self.string(string, parents))
                }
                PropertyKey::String(string) => self.string(string, parents),
            };
            let value = match &property.value {
                Some(value) => self.value(value, &inner, parents),
                None => "undefined".to_string(),
            };
            lines.push(format!("{}{key}: {value},", self.indent_unit));
        }
        lines.push("}".to_string());
        parents.pop();

        lines.join(&format!("{}{indent}", self.line_break))
    }
}

/// A double-quoted JavaScript string literal, escaped the way
/// `JSON.stringify` does.
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcml_parser::{parse, OnError, ParseOptions};
    use pretty_assertions::assert_eq;

    fn ast(source: &str) -> Value {
        parse(source, &ParseOptions::default().with_on_error(OnError::Recover))
            .unwrap()
            .ast
            .unwrap()
    }

    fn compact(source: &str) -> String {
        to_js(&ast(source), &ToJsOptions::compact())
    }

    // =========================================================================
    // Leaves
    // =========================================================================

    #[test]
    fn test_literals_pass_through_raw() {
        for source in ["0x7F2A", "-1.5e3", "true", "null", "undefined", "NaN", "-Infinity"] {
            assert_eq!(compact(source), source);
        }
    }

    #[test]
    fn test_expression_is_parenthesized() {
        assert_eq!(compact("{{ a + b }}"), "( a + b )");
    }

    #[test]
    fn test_empty_input_renders_undefined() {
        assert_eq!(compact("  // nothing"), "undefined");
    }

    // =========================================================================
    // Strings
    // =========================================================================

    #[test]
    fn test_static_string_is_unescaped_then_quoted() {
        assert_eq!(compact(r#"'it\'s \x41 "q"'"#), r#""it's A \"q\"""#);
        assert_eq!(compact(r#""line\nbreak\\""#), r#""line\nbreak\\""#);
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(compact(r#""""#), r#""""#);
        assert_eq!(compact("''"), r#""""#);
    }

    #[test]
    fn test_dynamic_string_concatenation() {
        assert_eq!(compact(r#""a {{ x }} b""#), r#""a " + toString(( x )) + " b""#);
        assert_eq!(compact(r#""{{ x }}""#), "toString(( x ))");
    }

    #[test]
    fn test_escaped_interpolation_stays_literal() {
        assert_eq!(compact(r#""\{{ x }}""#), r#""{{ x }}""#);
    }

    #[test]
    fn test_control_characters_escaped() {
        assert_eq!(quote("\u{1}\u{8}\u{c}\t"), r#""\u0001\b\f\t""#);
    }

    // =========================================================================
    // Arrays and objects
    // =========================================================================

    #[test]
    fn test_empty_containers() {
        assert_eq!(compact("[]"), "[]");
        assert_eq!(compact("{}"), "{}");
    }

    #[test]
    fn test_array_layout() {
        let js = to_js(&ast("[1, , [2]]"), &ToJsOptions::default());
        assert_eq!(js, "[\n  1,\n  /* empty */,\n  [\n    2,\n  ],\n]");
    }

    #[test]
    fn test_object_keys() {
        assert_eq!(
            compact(r#"{ plain: 1, "quoted key": 2, {{ k }}: 3, "a{{ b }}": 4 }"#),
            r#"{ plain: 1, "quoted key": 2, [( k )]: 3, ["a" + toString(( b ))]: 4, }"#
        );
    }

    #[test]
    fn test_missing_value_renders_undefined() {
        assert_eq!(compact(r#"{ "a": @@, "b": 2 }"#), r#"{ "a": undefined, "b": 2, }"#);
    }

    #[test]
    fn test_custom_indent() {
        let options = ToJsOptions {
            indent: Some("\t".to_string()),
            ..ToJsOptions::default()
        };
        assert_eq!(to_js(&ast("{ a: [1] }"), &options), "{\n\ta: [\n\t\t1,\n\t],\n}");
    }

    // =========================================================================
    // Hook
    // =========================================================================

    #[test]
    fn test_hook_sees_ancestors() {
        let mut seen = Vec::new();
        let js = to_js_with(
            &ast(r#"[{{ a }}, { {{ b }}: "{{ c }}" }]"#),
            &ToJsOptions::compact(),
            &mut |node, parents| {
                let kinds: Vec<&str> = parents.iter().map(|p| p.kind().as_str()).collect();
                seen.push(format!("{}@{}", node.expression.trim(), kinds.join("/")));
                node.expression.trim().to_uppercase()
            },
        );
        assert_eq!(js, "[ (A), { [(B)]: toString((C)), }, ]");
        assert_eq!(
            seen,
            vec!["a@array", "b@array/object", "c@array/object/string"]
        );
    }
}
