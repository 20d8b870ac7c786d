//! Backslash escape decoding for string segments.
//!
//! String segments keep their raw, still-escaped text in the AST. Decoding
//! happens only when a segment is consumed (code generation, CLI output).

use std::borrow::Cow;

use crate::chars::is_hex_digit;

/// Decode backslash escapes in `raw`.
///
/// - `\b \f \n \r \t \v` become the matching control characters
/// - `\uXXXX` and `\xXX` decode hex code points; a `\uD83D\uDE00`
///   surrogate pair decodes to one char, an unpaired surrogate to U+FFFD
/// - `\u` or `\x` without enough hex digits is kept verbatim
/// - any other escaped character stands for itself (`\"` is `"`)
/// - a lone trailing backslash is dropped
///
/// Returns the input unchanged (borrowed) when it holds no backslash.
pub fn unescape(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(idx) = rest.find('\\') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx + 1..];

        let Some(c) = rest.chars().next() else {
            break;
        };

        let hex_digits = match c {
            'u' => 4,
            'x' => 2,
            _ => 0,
        };

        if hex_digits > 0 {
            match hex_code(&rest[1..], hex_digits) {
                Some(code) => {
                    rest = &rest[1 + hex_digits..];
                    out.push(code_point(code, &mut rest));
                }
                None => out.push('\\'),
            }
            continue;
        }

        out.push(simple_escape(c));
        rest = &rest[c.len_utf8()..];
    }

    out.push_str(rest);
    Cow::Owned(out)
}

fn simple_escape(c: char) -> char {
    match c {
        'b' => '\u{0008}',
        'f' => '\u{000C}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\u{000B}',
        other => other,
    }
}

fn hex_code(s: &str, digits: usize) -> Option<u32> {
    let hex = s.get(..digits)?;
    if !hex.chars().all(is_hex_digit) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// The char for `code`. A high surrogate takes its low half from a
/// `\uDC00`..`\uDFFF` escape at the start of `rest`, consuming it.
fn code_point(code: u32, rest: &mut &str) -> char {
    if (0xD800..0xDC00).contains(&code) {
        let tail: &str = *rest;
        let low = tail
            .strip_prefix("\\u")
            .and_then(|hex| hex_code(hex, 4))
            .filter(|low| (0xDC00..0xE000).contains(low));
        if let Some(low) = low {
            *rest = &tail[6..];
            let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
            return char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER);
        }
    }
    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
}
