use lcml_cursor::{Cursor, QuoteOptions};

use super::expression::parse_expression;
use crate::ast::{NodeRef, Span, StringNode, StringPart, StringSegmentNode};
use crate::session::Session;

/// A `"..."` or `'...'` string with `{{ }}` interpolation.
pub(crate) fn parse_string(cursor: Cursor<'_>, session: &mut Session<'_>) -> Option<StringNode> {
    let quote = match cursor.peek_char()? {
        q @ ('"' | '\'') => q,
        _ => return None,
    };

    // A terminated literal without `{` is one static segment. Anything else,
    // including an unterminated literal, takes the interpolating scan.
    let mut scan = cursor;
    if let Ok(Some(raw)) = scan.match_quoted_string(QuoteOptions { raw: true }) {
        if !raw.contains('{') {
            return Some(static_string(cursor.position(), scan.position(), quote, &raw, session));
        }
    }
    Some(parse_string_content(cursor, Some(quote), session))
}

fn static_string(
    start: usize,
    end: usize,
    quote: char,
    raw: &str,
    session: &mut Session<'_>,
) -> StringNode {
    let quote_len = quote.len_utf8();
    let segment = StringSegmentNode {
        span: Span::new(start + quote_len, end - quote_len),
        raw: raw.to_string(),
    };
    session.observe(NodeRef::StringSegment(&segment));

    let node = StringNode {
        span: Span::new(start, end),
        quote: Some(quote),
        segments: vec![StringPart::Segment(segment)],
        is_dynamic: false,
    };
    session.observe(NodeRef::String(&node));
    node
}

/// String content starting at `cursor`.
///
/// With a quote, the cursor sits on the opening quote and content runs to
/// the matching unescaped closing quote; a missing closing quote commits
/// "expect end of string". Without a quote, content runs to the end of
/// input and never fails. An unterminated `{{` is kept as static text.
pub(crate) fn parse_string_content(
    cursor: Cursor<'_>,
    quote: Option<char>,
    session: &mut Session<'_>,
) -> StringNode {
    let mut buf = [0u8; 4];
    let quote_str: Option<&str> = match quote {
        Some(q) => Some(&*q.encode_utf8(&mut buf)),
        None => None,
    };
    let quoted = [quote_str.unwrap_or("{"), "{"];
    let needles: &[&str] = if quote_str.is_some() { &quoted } else { &quoted[1..] };

    let mut scan = cursor.clone_at(quote_str.map_or(0, str::len));
    let mut segments = Vec::new();
    let mut since = 0;

    let closed = loop {
        let Some(found) = scan.find_any_from(since, needles, Some('\\')) else {
            let rest = scan.remaining_len();
            push_segment(&mut segments, &mut scan, rest, session);
            break quote.is_none();
        };

        if found.needle == "{" {
            match parse_expression(scan.clone_at(found.offset), session) {
                Some(expression) => {
                    push_segment(&mut segments, &mut scan, found.offset, session);
                    scan.jump_to(expression.span.end);
                    segments.push(StringPart::Expression(expression));
                    since = 0;
                }
                None => since = found.end_offset,
            }
            continue;
        }

        push_segment(&mut segments, &mut scan, found.offset, session);
        scan.advance(found.needle.len());
        break true;
    };

    if !closed {
        session.commit_error("expect end of string", cursor.source().len());
    }

    let node = StringNode {
        span: Span::new(cursor.position(), scan.position()),
        quote,
        is_dynamic: segments.len() > 1,
        segments,
    };
    session.observe(NodeRef::String(&node));
    node
}

fn push_segment(
    segments: &mut Vec<StringPart>,
    scan: &mut Cursor<'_>,
    len: usize,
    session: &mut Session<'_>,
) {
    let start = scan.position();
    let raw = scan.advance(len);
    let node = StringSegmentNode {
        span: Span::new(start, scan.position()),
        raw: raw.to_string(),
    };
    session.observe(NodeRef::StringSegment(&node));
    segments.push(StringPart::Segment(node));
}
