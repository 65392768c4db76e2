//! Cursor over the input text
//!
//! All structural characters are ASCII, so the scanner works on bytes and
//! only ever stops on ASCII positions; slices it hands out are always on
//! UTF-8 character boundaries. Terminator searches use memchr.

use memchr::{memchr, memchr3, memmem};

/// Scanner over an in-memory document
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given input
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Scanner { input, pos: 0 }
    }

    /// Get the current position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Set the current position
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }

    /// Length of the whole input in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.input.len()
    }

    /// Check if any input remains
    #[inline]
    pub fn has_next(&self) -> bool {
        self.pos < self.input.len()
    }

    /// Peek at current byte without advancing
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    /// Peek at byte at offset from current position
    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    /// Character at the cursor (for error reporting)
    pub fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos..).and_then(|rest| rest.chars().next())
    }

    /// Advance by n bytes
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.set_position(self.pos + n);
    }

    /// Check if input starts with a byte sequence at current position
    #[inline]
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.input.as_bytes()[self.pos..].starts_with(needle)
    }

    /// Get a slice between two positions
    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.input[start..end]
    }

    /// Skip a run of blanks, returning how many bytes were skipped
    #[inline]
    pub fn skip_spaces(&mut self) -> usize {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !is_blank(b) {
                break;
            }
            self.pos += 1;
        }
        self.pos - start
    }

    /// Skip a leading `<?xml ... ?>` declaration, if present
    pub fn skip_declaration_header(&mut self) {
        if self.starts_with(b"<?xml") {
            self.pos = self.find(b"?>").map_or(self.input.len(), |end| end + 2);
        }
    }

    /// Position of the next occurrence of `needle` at or after the cursor
    #[inline]
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        memmem::find(&self.input.as_bytes()[self.pos..], needle).map(|i| self.pos + i)
    }

    /// Position of the next occurrence of `byte` at or after the cursor
    #[inline]
    pub fn find_byte(&self, byte: u8) -> Option<usize> {
        memchr(byte, &self.input.as_bytes()[self.pos..]).map(|i| self.pos + i)
    }

    /// Read a content run: everything up to the next `<`, `=` or `>`
    pub fn read_content(&mut self) -> &'a str {
        let start = self.pos;
        self.pos = memchr3(b'<', b'=', b'>', &self.input.as_bytes()[start..])
            .map_or(self.input.len(), |i| start + i);
        &self.input[start..self.pos]
    }

    /// Read a run of bytes accepted by `accept`
    pub fn read_while(&mut self, accept: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !accept(b) {
                break;
            }
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }
}

/// Space, tab, carriage return or line feed
#[inline]
pub fn is_blank(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Attribute value delimiter (`'` or `"`)
#[inline]
pub fn is_quote(b: u8) -> bool {
    b == b'"' || b == b'\''
}

/// Character allowed anywhere in a tag name
#[inline]
pub fn is_tag_name_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b':' | b'.' | b'-')
}

/// Character allowed in an attribute name
#[inline]
pub fn is_attribute_name_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b':' | b'-')
}
