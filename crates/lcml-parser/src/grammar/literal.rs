use lcml_cursor::chars::{is_digit, is_identifier_continue};
use lcml_cursor::Cursor;

use crate::ast::{BooleanNode, NullishNode, NumberNode, Span, Value};
use crate::session::Session;

/// Keyword literals, tried in order.
const KEYWORDS: &[&str] = &[
    "true",
    "false",
    "null",
    "undefined",
    "Infinity",
    "NaN",
    "-Infinity",
    "+Infinity",
];

/// Boolean, nullish or numeric literal.
pub(crate) fn parse_literal(cursor: Cursor<'_>, session: &mut Session<'_>) -> Option<Value> {
    let start = cursor.position();

    let value = if let Some(raw) = keyword_at(cursor) {
        let span = Span::new(start, start + raw.len());
        match raw {
            "true" | "false" => Value::Boolean(BooleanNode {
                span,
                raw: raw.to_string(),
                value: raw == "true",
            }),
            "null" | "undefined" => Value::Nullish(NullishNode {
                span,
                raw: raw.to_string(),
            }),
            _ => Value::Number(NumberNode {
                span,
                raw: raw.to_string(),
                value: match raw {
                    "NaN" => f64::NAN,
                    "-Infinity" => f64::NEG_INFINITY,
                    _ => f64::INFINITY,
                },
            }),
        }
    } else {
        let (len, value) = scan_number(cursor.remaining())?;
        let raw = cursor.peek(len);
        Value::Number(NumberNode {
            span: Span::new(start, start + len),
            raw: raw.to_string(),
            value,
        })
    };

    session.observe(value.as_node());
    Some(value)
}

/// The keyword at the cursor, unless it is only the prefix of a longer word.
fn keyword_at(cursor: Cursor<'_>) -> Option<&'static str> {
    KEYWORDS.iter().copied().find(|keyword| {
        cursor.starts_with(keyword)
            && !cursor.remaining()[keyword.len()..]
                .chars()
                .next()
                .is_some_and(is_identifier_continue)
    })
}

/// Length and value of the number at the start of `text`.
///
/// Accepts an optional sign followed by either `0b`/`0o`/`0x` and digits
/// of that radix, or a decimal with optional fraction and exponent. The
/// number must not run straight into a word character or `.`.
fn scan_number(text: &str) -> Option<(usize, f64)> {
    let bytes = text.as_bytes();
    let (sign_len, sign) = match bytes.first()? {
        b'-' => (1, -1.0),
        b'+' => (1, 1.0),
        b'0'..=b'9' | b'.' => (0, 1.0),
        _ => return None,
    };

    if let Some((end, magnitude)) = scan_radix(bytes, sign_len) {
        return Some((end, sign * magnitude));
    }

    let end = scan_decimal(bytes, sign_len)?;
    let value = text[..end].parse::<f64>().unwrap_or(f64::NAN);
    Some((end, value))
}

fn scan_radix(bytes: &[u8], start: usize) -> Option<(usize, f64)> {
    if bytes.get(start) != Some(&b'0') {
        return None;
    }
    let radix = match bytes.get(start + 1)? {
        b'b' => 2,
        b'o' => 8,
        b'x' => 16,
        _ => return None,
    };

    let digits_start = start + 2;
    let mut end = digits_start;
    let mut value = 0.0;
    while let Some(digit) = bytes.get(end).and_then(|&b| char::from(b).to_digit(radix)) {
        value = value * f64::from(radix) + f64::from(digit);
        end += 1;
    }

    (end > digits_start && at_boundary(bytes, end)).then_some((end, value))
}

fn scan_decimal(bytes: &[u8], start: usize) -> Option<usize> {
    let int_end = skip_digits(bytes, start);
    let mut end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = skip_digits(bytes, end + 1);
        if int_end == start && frac_end == end + 1 {
            return None;
        }
        end = frac_end;
    } else if int_end == start {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = skip_digits(bytes, exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    at_boundary(bytes, end).then_some(end)
}

fn skip_digits(bytes: &[u8], from: usize) -> usize {
    from + bytes[from.min(bytes.len())..]
        .iter()
        .take_while(|&&b| is_digit(char::from(b)))
        .count()
}

/// A number may not be followed by `[A-Za-z0-9_.]`.
fn at_boundary(bytes: &[u8], end: usize) -> bool {
    !matches!(bytes.get(end), Some(b) if b.is_ascii_alphanumeric() || *b == b'_' || *b == b'.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn literal(source: &str) -> Option<Value> {
        let mut session = Session::new(Arc::from(source), true);
        parse_literal(Cursor::new(source), &mut session)
    }

    fn number(source: &str) -> Option<(String, f64)> {
        match literal(source)? {
            Value::Number(n) => Some((n.raw, n.value)),
            other => panic!("Expected number, got {other:?}"),
        }
    }

    // =========================================================================
    // Keywords
    // =========================================================================

    #[test]
    fn test_booleans() {
        match literal("true,") {
            Some(Value::Boolean(b)) => {
                assert!(b.value);
                assert_eq!(b.span, Span::new(0, 4));
            }
            other => panic!("Expected boolean, got {other:?}"),
        }
        assert!(matches!(literal("false"), Some(Value::Boolean(b)) if !b.value));
    }

    #[test]
    fn test_nullish() {
        assert!(matches!(literal("null"), Some(Value::Nullish(n)) if n.raw == "null"));
        assert!(matches!(literal("undefined]"), Some(Value::Nullish(n)) if n.raw == "undefined"));
    }

    #[test]
    fn test_keyword_needs_word_boundary() {
        assert_eq!(literal("nullable"), None);
        assert_eq!(literal("trueish"), None);
        assert_eq!(literal("NaN2"), None);
    }

    #[test]
    fn test_special_numbers() {
        let (_, nan) = number("NaN").unwrap();
        assert!(nan.is_nan());
        assert_eq!(number("Infinity").unwrap().1, f64::INFINITY);
        assert_eq!(number("-Infinity").unwrap().1, f64::NEG_INFINITY);
        assert_eq!(number("+Infinity").unwrap().1, f64::INFINITY);
    }

    // =========================================================================
    // Numbers
    // =========================================================================

    #[test]
    fn test_decimal_forms() {
        for (source, value) in [
            ("-1.3", -1.3),
            ("1.4e+4", 14000.0),
            (".9e-2", 0.009),
            ("+155.", 155.0),
            ("42", 42.0),
            ("1E3", 1000.0),
        ] {
            let (raw, parsed) = number(source).unwrap();
            assert_eq!(raw, source);
            assert_eq!(parsed, value, "{source}");
        }
    }

    #[test]
    fn test_radix_forms() {
        assert_eq!(number("0x7F2A").unwrap(), ("0x7F2A".to_string(), 32554.0));
        assert_eq!(number("0b101").unwrap().1, 5.0);
        assert_eq!(number("-0o17").unwrap().1, -15.0);
    }

    #[test]
    fn test_number_stops_at_delimiter() {
        assert_eq!(number("12, 3").unwrap().0, "12");
        assert_eq!(number("7]").unwrap().0, "7");
    }

    #[test]
    fn test_rejected_numbers() {
        for source in ["-1.3.", "1.4e", "0xfg", "3.e10.3", ".", "-", "1_000", "0b2"] {
            assert_eq!(literal(source), None, "{source}");
        }
    }
}
