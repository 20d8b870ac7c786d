use lcml_cursor::Cursor;

use crate::ast::{ExpressionNode, Span, ValueType};
use crate::session::Session;

/// `{{ expression }}`, or a longer bracket run such as `{{{ a }}}` whose
/// body may contain `}}`.
///
/// Returns `None` when the closing run is missing; callers decide whether
/// that is an error.
pub(crate) fn parse_expression(
    cursor: Cursor<'_>,
    session: &mut Session<'_>,
) -> Option<ExpressionNode> {
    if !cursor.starts_with("{{") {
        return None;
    }

    let text = cursor.remaining();
    let bracket_len = text.bytes().take_while(|&b| b == b'{').count();
    let right_bracket = "}".repeat(bracket_len);

    let (close, end) = cursor
        .find_any_from(bracket_len, &[right_bracket.as_str()], None)
        .map(|found| (found.offset, found.end_offset))?;

    let start = cursor.position();
    let body = &text[bracket_len..close];
    let mut node = ExpressionNode {
        span: Span::new(start, start + end),
        expression: body.to_string(),
        raw_expression: body.to_string(),
        expression_span: Span::new(start + bracket_len, start + close),
        left_bracket: text[..bracket_len].to_string(),
        right_bracket,
        value_type: ValueType::Unknown,
    };

    session.finish_expression(&mut node);
    Some(node)
}
