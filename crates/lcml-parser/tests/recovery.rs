//! Error policies on malformed input.

use lcml_parser::{parse, OnError, ParseOptions, ParseResult, Value};
use pretty_assertions::assert_eq;

fn parse_policy(source: &str, on_error: OnError) -> ParseResult {
    parse(source, &ParseOptions::default().with_on_error(on_error)).unwrap()
}

fn messages(result: &ParseResult) -> Vec<&str> {
    result.errors.iter().map(|e| e.message.as_str()).collect()
}

const BROKEN_OBJECT: &str = r#"{
  "a": @@,
  "b": [@, #, 3] x
}"#;

#[test]
fn test_recover_reports_every_error_in_order() {
    let result = parse_policy(BROKEN_OBJECT, OnError::Recover);

    assert_eq!(
        messages(&result),
        vec![
            "expect property value",
            "expect value, comma or right square bracket",
            "expect value, comma or right square bracket",
            "expect comma or right curly bracket",
        ]
    );
    let positions: Vec<usize> = result.errors.iter().map(|e| e.position).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(result.error.as_ref(), result.errors.first());

    let object = match result.ast {
        Some(Value::Object(o)) => o,
        other => panic!("Expected object, got {other:?}"),
    };
    assert_eq!(object.properties.len(), 2);
    assert_eq!(object.properties[0].value, None);
    match &object.properties[1].value {
        Some(Value::Array(array)) => assert_eq!(array.len(), 3),
        other => panic!("Expected array, got {other:?}"),
    }
}

#[test]
fn test_return_reports_only_first_error() {
    let result = parse_policy(BROKEN_OBJECT, OnError::Return);
    assert_eq!(messages(&result), vec!["expect property value"]);
    assert!(matches!(result.ast, Some(Value::Object(_))));
}

#[test]
fn test_throw_raises_first_error() {
    let err = parse(BROKEN_OBJECT, &ParseOptions::default()).unwrap_err();
    assert_eq!(err.message, "expect property value");
    assert_eq!(err.position, BROKEN_OBJECT.find('@').unwrap());
}

#[test]
fn test_as_string_reads_whole_input() {
    let result = parse_policy(BROKEN_OBJECT, OnError::AsString);
    match &result.ast {
        Some(Value::String(s)) => {
            assert_eq!(s.quote, None);
            assert_eq!(s.span.len(), BROKEN_OBJECT.len());
            assert!(!s.is_dynamic);
        }
        other => panic!("Expected string, got {other:?}"),
    }
    assert!(result.errors.is_empty());
    assert!(result.error.is_none());
    assert!(result.loose_mode_enabled);
}

#[test]
fn test_as_string_never_fails_on_unterminated_expression() {
    let result = parse_policy("[{{ open", OnError::AsString);
    assert!(matches!(result.ast, Some(Value::String(_))));
    assert!(result.expressions.is_empty());
}

#[test]
fn test_as_string_keeps_only_final_expressions() {
    let result = parse_policy("[{{ a }}, {{ b }} x", OnError::AsString);
    assert_eq!(result.expressions.len(), 2);
    assert!(result.expressions.iter().all(|e| e.span.start > 0));
}

#[test]
fn test_recover_unterminated_nested() {
    let result = parse_policy("{ a: [1, 2", OnError::Recover);
    assert_eq!(
        messages(&result),
        vec!["expect right square bracket", "expect comma or right curly bracket"]
    );
    assert_eq!(result.end, 10);
}

#[test]
fn test_recover_sparse_with_garbage() {
    let result = parse_policy("[1, , ?, 4]", OnError::Recover);
    let array = match result.ast {
        Some(Value::Array(a)) => a,
        other => panic!("Expected array, got {other:?}"),
    };
    let has_value: Vec<bool> = array.items_location.iter().map(|l| l.has_value).collect();
    assert_eq!(has_value, vec![true, false, false, true]);
    assert_eq!(result.errors.len(), 1);
}
