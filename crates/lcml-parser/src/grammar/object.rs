use lcml_cursor::Cursor;

use super::comment::parse_comment;
use super::expression::parse_expression;
use super::find_delimiter;
use super::identifier::parse_identifier;
use super::string::parse_string;
use super::value::parse_value;
use crate::ast::{NodeRef, ObjectNode, PropertyKey, PropertyNode, Span, Value};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    KeyOrEnd,
    Colon,
    Value,
    CommaOrEnd,
}

impl State {
    fn expectation(self) -> &'static str {
        match self {
            State::KeyOrEnd => "expect property identifier or right curly bracket",
            State::Colon => "expect colon",
            State::Value => "expect property value",
            State::CommaOrEnd => "expect comma or right curly bracket",
        }
    }
}

struct PropertyBuilder {
    key: PropertyKey,
    value: Option<Value>,
    end: usize,
    colon_start: Option<usize>,
    trailing_comma_start: Option<usize>,
}

impl PropertyBuilder {
    fn new(key: PropertyKey) -> Self {
        Self {
            end: key.span().end,
            key,
            value: None,
            colon_start: None,
            trailing_comma_start: None,
        }
    }

    fn finish(self) -> PropertyNode {
        PropertyNode {
            span: Span::new(self.key.span().start, self.end),
            key: self.key,
            value: self.value,
            has_colon: self.colon_start.is_some(),
            colon_start: self.colon_start,
            has_trailing_comma: self.trailing_comma_start.is_some(),
            trailing_comma_start: self.trailing_comma_start,
        }
    }
}

/// Finished properties plus the one being built.
///
/// `current` is `None` after a detach: updates are then discarded until
/// the next key begins a property.
struct ObjectBuilder {
    start: usize,
    properties: Vec<PropertyNode>,
    current: Option<PropertyBuilder>,
}

impl ObjectBuilder {
    fn new(start: usize) -> Self {
        Self {
            start,
            properties: Vec::new(),
            current: None,
        }
    }

    fn begin(&mut self, key: PropertyKey, session: &mut Session<'_>) {
        self.flush(session);
        self.current = Some(PropertyBuilder::new(key));
    }

    fn detach(&mut self, session: &mut Session<'_>) {
        self.flush(session);
    }

    fn current(&mut self) -> Option<&mut PropertyBuilder> {
        self.current.as_mut()
    }

    fn flush(&mut self, session: &mut Session<'_>) {
        if let Some(property) = self.current.take() {
            let node = property.finish();
            session.observe(NodeRef::Property(&node));
            self.properties.push(node);
        }
    }

    fn finish(mut self, end: usize, session: &mut Session<'_>) -> ObjectNode {
        self.flush(session);
        let node = ObjectNode {
            span: Span::new(self.start, end),
            properties: self.properties,
        };
        session.observe(NodeRef::Object(&node));
        node
    }
}

/// A property key: quoted string, expression or bare identifier.
fn parse_key(cursor: Cursor<'_>, session: &mut Session<'_>) -> Option<PropertyKey> {
    if let Some(node) = parse_string(cursor, session) {
        return Some(PropertyKey::String(node));
    }
    if let Some(node) = parse_expression(cursor, session) {
        return Some(PropertyKey::Expression(node));
    }
    parse_identifier(cursor, session).map(PropertyKey::Identifier)
}

/// `{ key: value, ... }`.
///
/// Runs a four-state machine per property. When recovering, a failed state
/// resynchronizes at the next `,`, `:` or `}` outside any bracket group; a
/// `:` starts a best-effort property whose key is whatever parses at the
/// error position.
pub(crate) fn parse_object(cursor: Cursor<'_>, session: &mut Session<'_>) -> Option<ObjectNode> {
    if cursor.peek_char()? != '{' || cursor.starts_with("{{") {
        return None;
    }

    let mut scan = cursor.clone_at(1);
    let mut object = ObjectBuilder::new(cursor.position());
    let mut state = State::KeyOrEnd;
    let mut finished = false;

    while !session.is_halting() {
        scan.skip_whitespace();
        let Some(top) = scan.peek_char() else {
            break;
        };

        if let Some(comment) = parse_comment(scan, session) {
            scan.jump_to(comment.span.end);
            continue;
        }

        match state {
            State::KeyOrEnd => {
                if top == '}' {
                    scan.advance(1);
                    finished = true;
                    break;
                }
                if let Some(key) = parse_key(scan, session) {
                    scan.jump_to(key.span().end);
                    object.begin(key, session);
                    state = State::Colon;
                    continue;
                }
            }
            State::Colon => {
                if top == ':' {
                    let position = scan.position();
                    if let Some(property) = object.current() {
                        property.colon_start = Some(position);
                        property.end = position + 1;
                    }
                    scan.advance(1);
                    state = State::Value;
                    continue;
                }
            }
            State::Value => {
                if let Some(value) = parse_value(scan, session) {
                    let end = value.span().end;
                    if let Some(property) = object.current() {
                        property.value = Some(value);
                        property.end = end;
                    }
                    scan.jump_to(end);
                    state = State::CommaOrEnd;
                    continue;
                }
            }
            State::CommaOrEnd => {
                if top == '}' {
                    scan.advance(1);
                    finished = true;
                    break;
                }
                if top == ',' {
                    let position = scan.position();
                    if let Some(property) = object.current() {
                        property.trailing_comma_start = Some(position);
                        property.end = position + 1;
                    }
                    scan.advance(1);
                    state = State::KeyOrEnd;
                    continue;
                }
            }
        }

        session.commit_error(state.expectation(), scan.position());
        if session.is_halting() {
            break;
        }

        let needles: &[&str] = if state == State::Colon {
            &[",", "}"]
        } else {
            &[",", ":", "}"]
        };
        let Some(found) = find_delimiter(scan, needles) else {
            scan.jump_to(scan.source().len());
            continue;
        };

        if found.needle == ":" {
            let colon = scan.position() + found.offset;
            let checkpoint = session.checkpoint();
            match parse_key(scan, session).filter(|key| key.span().end <= colon) {
                Some(key) => object.begin(key, session),
                None => {
                    session.rollback(checkpoint);
                    object.detach(session);
                }
            }
            state = State::Colon;
        } else {
            state = State::CommaOrEnd;
        }
        scan.advance(found.offset);
    }

    if !session.is_halting() && !finished {
        session.commit_error(state.expectation(), scan.position());
    }

    Some(object.finish(scan.position(), session))
}
