//! Recursive-descent grammar.
//!
//! Every parser takes a cursor snapshot and the session, and returns the
//! node it recognised or `None`. Parsers never move the caller's cursor;
//! the caller jumps to `span.end` of the returned node.

mod array;
mod comment;
mod expression;
mod identifier;
mod literal;
mod object;
mod string;
mod value;

pub(crate) use comment::skip_trivia;
pub(crate) use string::parse_string_content;
pub(crate) use value::parse_value;

use lcml_cursor::{Cursor, Found};

/// Brackets stepped over as a whole while resynchronizing.
const GROUPS: &[(char, char)] = &[('(', ')'), ('[', ']'), ('{', '}')];

/// The next of up to three `delimiters` that lies outside any balanced
/// bracket group, relative to `cursor`.
///
/// An opener that never balances is skipped on its own.
pub(crate) fn find_delimiter<'n>(cursor: Cursor<'_>, delimiters: &[&'n str]) -> Option<Found<'n>> {
    let count = delimiters.len().min(3);
    let mut needles = [""; 6];
    needles[..count].copy_from_slice(&delimiters[..count]);
    needles[count..count + 3].copy_from_slice(&["(", "[", "{"]);
    let needles = &needles[..count + 3];

    let mut scan = cursor;
    loop {
        let found = scan.find_any(needles, None)?;
        if delimiters[..count].contains(&found.needle) {
            let offset = scan.position() - cursor.position() + found.offset;
            return Some(Found {
                needle: found.needle,
                offset,
                end_offset: offset + found.needle.len(),
            });
        }
        scan.advance(found.offset);
        if scan.match_balanced(GROUPS, &['\\']).is_none() {
            scan.advance(found.needle.len());
        }
    }
}
