use std::borrow::Cow;

use crate::chars::is_whitespace;
use crate::escape::unescape;
use crate::CursorError;

/// A needle located by [`Cursor::find_any`].
///
/// Offsets are relative to the cursor position the search started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Found<'n> {
    pub needle: &'n str,
    pub offset: usize,
    pub end_offset: usize,
}

/// Options for [`Cursor::match_quoted_string`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuoteOptions {
    /// Return the raw (still escaped) content instead of decoding it.
    pub raw: bool,
}

/// Copyable cursor over LCML source text.
///
/// The source is immutable; only the position moves. Copying a cursor is
/// the snapshot mechanism: parsers take a copy, try something, and either
/// keep the copy's position or throw it away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at the start of `source`.
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    /// The whole source text, independent of the position.
    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// The unconsumed suffix.
    pub fn remaining(&self) -> &'a str {
        &self.source[self.pos..]
    }

    pub fn remaining_len(&self) -> usize {
        self.source.len() - self.pos
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// The next character, without consuming it.
    pub fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Up to `n` bytes of lookahead, widened to the next char boundary.
    pub fn peek(&self, n: usize) -> &'a str {
        let end = self.boundary_at(self.pos + n);
        &self.source[self.pos..end]
    }

    pub fn starts_with(&self, text: &str) -> bool {
        self.remaining().starts_with(text)
    }

    /// Consume up to `n` bytes and return them.
    ///
    /// Clamped to the remaining length; a count that would split a
    /// multi-byte character is widened to include all of it.
    pub fn advance(&mut self, n: usize) -> &'a str {
        let start = self.pos;
        self.pos = self.boundary_at(self.pos + n);
        &self.source[start..self.pos]
    }

    /// Move to an absolute position, clamped to the source length.
    pub fn jump_to(&mut self, position: usize) {
        self.pos = self.boundary_at(position);
    }

    /// A copy of this cursor advanced by `offset` bytes.
    pub fn clone_at(&self, offset: usize) -> Self {
        let mut copy = *self;
        copy.advance(offset);
        copy
    }

    /// Skip whitespace and return how many bytes were skipped.
    pub fn skip_whitespace(&mut self) -> usize {
        let skipped = self
            .remaining()
            .find(|c: char| !is_whitespace(c))
            .unwrap_or_else(|| self.remaining_len());
        self.pos += skipped;
        skipped
    }

    /// Find the leftmost occurrence of any needle, starting at the position.
    ///
    /// When `escape` is given, an occurrence of the escape character and the
    /// character after it are skipped, so needles preceded by an unescaped
    /// escape character are never reported. Among needles that match at the
    /// same offset, the first one in `needles` wins. Empty needles are ignored.
    pub fn find_any<'n>(&self, needles: &[&'n str], escape: Option<char>) -> Option<Found<'n>> {
        self.find_any_from(0, needles, escape)
    }

    /// Like [`find_any`](Self::find_any), but the search begins `since`
    /// bytes after the position. Reported offsets are still relative to
    /// the position.
    pub fn find_any_from<'n>(
        &self,
        since: usize,
        needles: &[&'n str],
        escape: Option<char>,
    ) -> Option<Found<'n>> {
        let mut lead_bytes = LeadBytes::default();
        for needle in needles {
            if let Some(&first) = needle.as_bytes().first() {
                lead_bytes.insert(first);
            }
        }
        if let Some(e) = escape {
            let mut buf = [0u8; 4];
            lead_bytes.insert(e.encode_utf8(&mut buf).as_bytes()[0]);
        }
        if lead_bytes.is_empty() {
            return None;
        }

        let bytes = self.source.as_bytes();
        let mut i = self.boundary_at(self.pos + since);

        while i < bytes.len() {
            i += lead_bytes.next_in(&bytes[i..])?;
            let rest = &self.source[i..];

            if let Some(e) = escape {
                if rest.starts_with(e) {
                    let escaped = rest[e.len_utf8()..].chars().next().map_or(0, char::len_utf8);
                    i += e.len_utf8() + escaped;
                    continue;
                }
            }

            if let Some(needle) = needles
                .iter()
                .copied()
                .find(|needle| !needle.is_empty() && rest.starts_with(*needle))
            {
                let offset = i - self.pos;
                return Some(Found {
                    needle,
                    offset,
                    end_offset: offset + needle.len(),
                });
            }

            i += rest.chars().next().map_or(1, char::len_utf8);
        }

        None
    }

    /// Consume `text` if the remainder starts with it.
    pub fn match_literal(&mut self, text: &str) -> bool {
        if self.starts_with(text) {
            self.pos += text.len();
            true
        } else {
            false
        }
    }

    /// Consume the longest run of characters satisfying `pred`.
    pub fn match_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let len = self
            .remaining()
            .find(|c: char| !pred(c))
            .unwrap_or_else(|| self.remaining_len());
        self.advance(len)
    }

    /// Consume a balanced bracket run such as `(a[b]{c})`.
    ///
    /// The run must start with an opener from `pairs`. Closers are matched
    /// against an explicit stack of expected closers; a character in
    /// `escapes` skips the character after it. Returns `None` and consumes
    /// nothing if the run is unbalanced when input ends, or a closer does
    /// not match the innermost opener.
    pub fn match_balanced(&mut self, pairs: &[(char, char)], escapes: &[char]) -> Option<&'a str> {
        let closer_of = |c: char| pairs.iter().find(|(open, _)| *open == c).map(|(_, close)| *close);
        let is_closer = |c: char| pairs.iter().any(|(_, close)| *close == c);

        let mut chars = self.remaining().char_indices();
        let (_, first) = chars.next()?;
        let mut expected = vec![closer_of(first)?];

        while let Some((idx, c)) = chars.next() {
            if escapes.contains(&c) {
                chars.next();
                continue;
            }
            if let Some(close) = closer_of(c) {
                expected.push(close);
                continue;
            }
            if is_closer(c) {
                if expected.pop() != Some(c) {
                    return None;
                }
                if expected.is_empty() {
                    return Some(self.advance(idx + c.len_utf8()));
                }
            }
        }

        None
    }

    /// Consume a complete `"..."` or `'...'` literal.
    ///
    /// Returns `Ok(None)` when the cursor is not at a quote. The content is
    /// decoded unless `options.raw` is set. An unterminated literal is an
    /// error and consumes nothing.
    pub fn match_quoted_string(
        &mut self,
        options: QuoteOptions,
    ) -> Result<Option<Cow<'a, str>>, CursorError> {
        let quote = match self.peek_char() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Ok(None),
        };

        let mut buf = [0u8; 4];
        let needle: &str = quote.encode_utf8(&mut buf);
        let found = self
            .find_any_from(1, &[needle], Some('\\'))
            .ok_or_else(|| CursorError {
                message: format!("unterminated string literal, expected {quote}"),
                position: self.source.len(),
            })?;

        let content = &self.remaining()[1..found.offset];
        self.advance(found.end_offset);

        Ok(Some(if options.raw {
            Cow::Borrowed(content)
        } else {
            unescape(content)
        }))
    }

    /// Clamp `target` to the source and widen it to a char boundary.
    fn boundary_at(&self, target: usize) -> usize {
        let mut end = target.min(self.source.len());
        while !self.source.is_char_boundary(end) {
            end += 1;
        }
        end
    }
}

/// Distinct first bytes of the needles and the escape char.
///
/// Kept on the stack; up to three bytes take the memchr fast path.
struct LeadBytes {
    table: [bool; 256],
    first: [u8; 3],
    count: usize,
}

impl Default for LeadBytes {
    fn default() -> Self {
        Self {
            table: [false; 256],
            first: [0; 3],
            count: 0,
        }
    }
}

impl LeadBytes {
    fn insert(&mut self, byte: u8) {
        let seen = &mut self.table[usize::from(byte)];
        if *seen {
            return;
        }
        *seen = true;
        if let Some(slot) = self.first.get_mut(self.count) {
            *slot = byte;
        }
        self.count += 1;
    }

    fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Offset of the next byte in `hay` that may start a needle or escape.
    fn next_in(&self, hay: &[u8]) -> Option<usize> {
        let [a, b, c] = self.first;
        match self.count {
            1 => memchr::memchr(a, hay),
            2 => memchr::memchr2(a, b, hay),
            3 => memchr::memchr3(a, b, c, hay),
            _ => hay.iter().position(|&byte| self.table[usize::from(byte)]),
        }
    }
}
