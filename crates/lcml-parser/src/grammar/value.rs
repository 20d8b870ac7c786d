use lcml_cursor::Cursor;

use super::array::parse_array;
use super::expression::parse_expression;
use super::literal::parse_literal;
use super::object::parse_object;
use super::string::parse_string;
use crate::ast::Value;
use crate::session::Session;

/// Any value. Expression is tried before object so that `{{` is never
/// read as an object holding an object.
pub(crate) fn parse_value(cursor: Cursor<'_>, session: &mut Session<'_>) -> Option<Value> {
    if let Some(node) = parse_string(cursor, session) {
        return Some(Value::String(node));
    }
    if let Some(node) = parse_expression(cursor, session) {
        return Some(Value::Expression(node));
    }
    if let Some(node) = parse_array(cursor, session) {
        return Some(Value::Array(node));
    }
    if let Some(node) = parse_object(cursor, session) {
        return Some(Value::Object(node));
    }
    parse_literal(cursor, session)
}
