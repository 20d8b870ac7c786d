use lcml_cursor::chars::{is_identifier_continue, is_identifier_start};
use lcml_cursor::Cursor;

use crate::ast::{IdentifierNode, NodeRef, Span};
use crate::session::Session;

/// A bare identifier such as `foo`, `_bar` or `$baz2`.
pub(crate) fn parse_identifier(
    cursor: Cursor<'_>,
    session: &mut Session<'_>,
) -> Option<IdentifierNode> {
    if !cursor.peek_char().is_some_and(is_identifier_start) {
        return None;
    }

    let start = cursor.position();
    let mut scan = cursor;
    let raw = scan.match_while(is_identifier_continue);

    let node = IdentifierNode {
        span: Span::new(start, scan.position()),
        raw: raw.to_string(),
    };
    session.observe(NodeRef::Identifier(&node));
    Some(node)
}
