use lcml_cursor::Cursor;

use super::comment::parse_comment;
use super::find_delimiter;
use super::value::parse_value;
use crate::ast::{ArrayNode, ItemLocation, NodeRef, Span, Value};
use crate::session::Session;

/// Slots collected so far. Becomes an [`ArrayNode`] in `finish`.
struct ArrayBuilder {
    start: usize,
    items: Vec<Option<Value>>,
    locations: Vec<ItemLocation>,
}

impl ArrayBuilder {
    fn new(start: usize) -> Self {
        Self {
            start,
            items: Vec::new(),
            locations: Vec::new(),
        }
    }

    /// The open slot, created at `position` if none exists yet.
    fn slot(&mut self, position: usize) -> &mut ItemLocation {
        if self.locations.is_empty() {
            self.items.push(None);
            self.locations.push(ItemLocation::empty(position));
        }
        let last = self.locations.len() - 1;
        &mut self.locations[last]
    }

    /// Close the open slot with a comma at `position` and open the next one.
    fn comma(&mut self, position: usize) {
        let slot = self.slot(position);
        slot.has_trailing_comma = true;
        slot.trailing_comma_start = Some(position);
        self.items.push(None);
        self.locations.push(ItemLocation::empty(position + 1));
    }

    fn value(&mut self, value: Value) {
        let span = value.span();
        let slot = self.slot(span.start);
        slot.has_value = true;
        slot.value_start = span.start;
        slot.value_end = span.end;
        if let Some(item) = self.items.last_mut() {
            *item = Some(value);
        }
    }

    fn finish(mut self, end: usize, session: &mut Session<'_>) -> ArrayNode {
        // `[1,,]` has two slots; `[1,]` keeps its trailing empty one
        if self.locations.len() > 2 && self.locations.last().is_some_and(|l| !l.has_value) {
            self.locations.pop();
            self.items.pop();
        }

        let node = ArrayNode {
            span: Span::new(self.start, end),
            items: self.items,
            items_location: self.locations,
        };
        session.observe(NodeRef::Array(&node));
        node
    }
}

/// `[a, b, , c]`, with sparse slots, trailing commas and comments.
///
/// When recovering, a bad item is skipped up to the next `,` or `]`
/// outside any bracket group.
pub(crate) fn parse_array(cursor: Cursor<'_>, session: &mut Session<'_>) -> Option<ArrayNode> {
    if cursor.peek_char()? != '[' {
        return None;
    }

    let mut scan = cursor.clone_at(1);
    let mut array = ArrayBuilder::new(cursor.position());
    let mut slot_empty = true;
    let mut finished = false;

    while !session.is_halting() {
        scan.skip_whitespace();
        let Some(top) = scan.peek_char() else {
            break;
        };

        match top {
            ']' => {
                scan.advance(1);
                finished = true;
                break;
            }
            ',' => {
                array.comma(scan.position());
                scan.advance(1);
                slot_empty = true;
                continue;
            }
            _ => {}
        }

        if let Some(comment) = parse_comment(scan, session) {
            scan.jump_to(comment.span.end);
            continue;
        }

        if slot_empty {
            if let Some(value) = parse_value(scan, session) {
                scan.jump_to(value.span().end);
                array.value(value);
                slot_empty = false;
                continue;
            }
        }

        let message = if slot_empty {
            "expect value, comma or right square bracket"
        } else {
            "expect comma or right square bracket"
        };
        session.commit_error(message, scan.position());
        if session.is_halting() {
            break;
        }

        match find_delimiter(scan, &[",", "]"]) {
            Some(found) => {
                scan.advance(found.offset);
            }
            None => scan.jump_to(scan.source().len()),
        }
    }

    if !session.is_halting() && !finished {
        session.commit_error("expect right square bracket", scan.position());
    }

    Some(array.finish(scan.position(), session))
}
