//! LCML Code Generator
//!
//! Renders a parsed LCML tree as a JavaScript expression: object and array
//! literals, string concatenation and parenthesized embedded expressions.
//!
//! ```text
//! source → lcml_parser::parse() → Value → to_js() → JavaScript text
//! ```
//!
//! [`compile`] runs both steps.
//!
//! ```
//! use lcml_codegen::{compile, CompileOptions};
//!
//! let mut options = CompileOptions::default();
//! options.to_js.compact = true;
//! let result = compile(r#"{ greeting: "hi {{ name }}" }"#, &options).unwrap();
//! assert_eq!(result.body, r#"{ greeting: "hi " + toString(( name )), }"#);
//! ```

pub mod compile;
pub mod js;

use serde::{Deserialize, Serialize};

pub use compile::{compile, CompileOptions, CompileResult, Compiler};
pub use js::{to_js, to_js_with, ExpressionHook};

/// Formatting options for [`to_js`].
///
/// `indent` and `line_break` default from `compact` when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToJsOptions {
    /// Function wrapped around every expression interpolated into a string.
    pub global_to_string_method: String,
    /// Shortcut for an empty indent unit and a single-space line break.
    pub compact: bool,
    pub indent: Option<String>,
    pub line_break: Option<String>,
}

impl Default for ToJsOptions {
    fn default() -> Self {
        Self {
            global_to_string_method: "toString".to_string(),
            compact: false,
            indent: None,
            line_break: None,
        }
    }
}

impl ToJsOptions {
    /// Default options with `compact` set.
    pub fn compact() -> Self {
        Self {
            compact: true,
            ..Self::default()
        }
    }

    /// One level of indentation.
    pub fn indent_unit(&self) -> &str {
        match &self.indent {
            Some(indent) => indent,
            None if self.compact => "",
            None => "  ",
        }
    }

    /// Separator between the lines of an array or object.
    pub fn line_break(&self) -> &str {
        match &self.line_break {
            Some(line_break) => line_break,
            None if self.compact => " ",
            None => "\n",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_layout() {
        let options = ToJsOptions::default();
        assert_eq!(options.indent_unit(), "  ");
        assert_eq!(options.line_break(), "\n");
        assert_eq!(options.global_to_string_method, "toString");
    }

    #[test]
    fn test_compact_layout() {
        let options = ToJsOptions::compact();
        assert_eq!(options.indent_unit(), "");
        assert_eq!(options.line_break(), " ");
    }

    #[test]
    fn test_explicit_layout_overrides_compact() {
        let options = ToJsOptions {
            indent: Some("\t".to_string()),
            line_break: Some("\r\n".to_string()),
            ..ToJsOptions::compact()
        };
        assert_eq!(options.indent_unit(), "\t");
        assert_eq!(options.line_break(), "\r\n");
    }

    #[test]
    fn test_options_from_json() {
        let options: ToJsOptions =
            serde_json::from_str(r#"{ "globalToStringMethod": "str", "compact": true }"#).unwrap();
        assert_eq!(options.global_to_string_method, "str");
        assert!(options.compact);
        assert_eq!(options.indent, None);
    }
}
