//! WASM bindings for the LCML compiler.
//!
//! Exposes `compile()` to JavaScript via wasm-bindgen.
//! Returns a JS object `{ body, isDynamic, expressions, errors }` or throws
//! under the `throw` error policy.

use lcml_codegen::{CompileOptions, CompileResult};
use wasm_bindgen::prelude::*;

/// Compile LCML source to a JavaScript expression.
///
/// `options` is a plain object with the camelCase fields of
/// `CompileOptions` (`onError`, `loose`, `compact`, `indent`, ...), or
/// `undefined`.
#[wasm_bindgen]
pub fn compile(source: &str, options: JsValue) -> Result<JsValue, JsError> {
    let options: CompileOptions = if options.is_undefined() || options.is_null() {
        CompileOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsError::new(&format!("Invalid options: {e}")))?
    };

    let result =
        lcml_codegen::compile(source, &options).map_err(|e| JsError::new(&e.to_string()))?;
    to_js_object(&CompileOutput::from(&result))
}

/// Get the compiler version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// The part of a [`CompileResult`] handed to JavaScript.
#[derive(Debug, Clone, PartialEq)]
struct CompileOutput {
    body: String,
    is_dynamic: bool,
    expressions: Vec<ExpressionOutput>,
    errors: Vec<ErrorOutput>,
}

#[derive(Debug, Clone, PartialEq)]
struct ExpressionOutput {
    start: usize,
    end: usize,
    expression: String,
}

#[derive(Debug, Clone, PartialEq)]
struct ErrorOutput {
    message: String,
    position: usize,
}

impl From<&CompileResult> for CompileOutput {
    fn from(result: &CompileResult) -> Self {
        Self {
            body: result.body.clone(),
            is_dynamic: result.is_dynamic(),
            expressions: result
                .parsed
                .expressions
                .iter()
                .map(|node| ExpressionOutput {
                    start: node.span.start,
                    end: node.span.end,
                    expression: node.expression.clone(),
                })
                .collect(),
            errors: result
                .parsed
                .errors
                .iter()
                .map(|error| ErrorOutput {
                    message: error.message.clone(),
                    position: error.position,
                })
                .collect(),
        }
    }
}

fn set(target: &js_sys::Object, key: &str, value: JsValue) -> Result<(), JsError> {
    js_sys::Reflect::set(target, &key.into(), &value)
        .map(|_| ())
        .map_err(|_| JsError::new(&format!("Failed to set {key} property")))
}

fn to_js_object(output: &CompileOutput) -> Result<JsValue, JsError> {
    let expressions = js_sys::Array::new();
    for node in &output.expressions {
        let item = js_sys::Object::new();
        set(&item, "start", (node.start as f64).into())?;
        set(&item, "end", (node.end as f64).into())?;
        set(&item, "expression", node.expression.as_str().into())?;
        expressions.push(&item);
    }

    let errors = js_sys::Array::new();
    for error in &output.errors {
        let item = js_sys::Object::new();
        set(&item, "message", error.message.as_str().into())?;
        set(&item, "position", (error.position as f64).into())?;
        errors.push(&item);
    }

    let js_obj = js_sys::Object::new();
    set(&js_obj, "body", output.body.as_str().into())?;
    set(&js_obj, "isDynamic", output.is_dynamic.into())?;
    set(&js_obj, "expressions", expressions.into())?;
    set(&js_obj, "errors", errors.into())?;
    Ok(js_obj.into())
}
