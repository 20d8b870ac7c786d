//! Character classes used by the LCML grammar.

/// Whitespace between tokens: space, tab, CR, LF, vertical tab, form feed.
pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{000B}' | '\u{000C}')
}

pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

pub fn is_hex_digit(c: char) -> bool {
    c.is_ascii_hexdigit()
}

/// First character of a bare identifier (`foo`, `_bar`, `$baz`).
pub fn is_identifier_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

/// Any later character of a bare identifier. Also used as the word boundary
/// check for keywords, so `nullable` never matches `null`.
pub fn is_identifier_continue(c: char) -> bool {
    is_identifier_start(c) || c.is_alphanumeric()
}
