use lcml_cursor::Cursor;

use crate::ast::{CommentNode, NodeRef, Span};
use crate::session::Session;

/// `// ...` up to and including the line break, or `/* ... */`.
///
/// An unterminated comment runs to the end of input.
pub(crate) fn parse_comment(cursor: Cursor<'_>, session: &mut Session<'_>) -> Option<CommentNode> {
    let terminators: &[&str] = match cursor.peek(2) {
        "//" => &["\n", "\r"],
        "/*" => &["*/"],
        _ => return None,
    };

    let len = cursor
        .find_any_from(2, terminators, None)
        .map_or(cursor.remaining_len(), |found| found.end_offset);

    let start = cursor.position();
    let node = CommentNode {
        span: Span::new(start, start + len),
    };
    session.observe(NodeRef::Comment(&node));
    Some(node)
}

/// Skip whitespace and comments.
pub(crate) fn skip_trivia(cursor: &mut Cursor<'_>, session: &mut Session<'_>) {
    loop {
        cursor.skip_whitespace();
        match parse_comment(*cursor, session) {
            Some(comment) => cursor.jump_to(comment.span.end),
            None => break,
        }
    }
}
