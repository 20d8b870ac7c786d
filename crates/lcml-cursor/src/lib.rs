//! LCML Cursor
//!
//! A copyable view over LCML source text. The parser clones cursors freely
//! for speculative sub-parses, so every operation here is allocation-free
//! apart from the slices it hands back.
//!
//! Positions are byte offsets into the UTF-8 source. The cursor only ever
//! stops on `char` boundaries.
//!
//! # Example
//!
//! ```
//! use lcml_cursor::Cursor;
//!
//! let mut cursor = Cursor::new("  [1, 2]");
//! assert_eq!(cursor.skip_whitespace(), 2);
//! assert_eq!(cursor.peek_char(), Some('['));
//! ```

pub mod chars;
pub mod cursor;
pub mod escape;

pub use cursor::{Cursor, Found, QuoteOptions};
pub use escape::unescape;

/// Cursor error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Cursor error at {position}: {message}")]
pub struct CursorError {
    pub message: String,
    pub position: usize,
}
