//! Tokenizer - State machine for token extraction
//!
//! Implements a pull-style tokenizer over the [`Scanner`]:
//! - Structural punctuation (`<`, `>`, `=`, `/>`)
//! - Element names, attribute names and values
//! - Content runs and CDATA sections
//! - Comments, processing instructions and declarations (skipped)
//!
//! Every opening tag pushes a scope frame. Close tokens carry the handle of
//! the frame they popped, which is what the AST builder pairs on. Elements
//! and attributes rejected by the caller's filters are consumed here and never
//! produce tokens. Errors latch: once a call fails, every later call returns
//! the same error.

use std::borrow::Cow;

use super::scanner::{is_attribute_name_char, is_blank, is_quote, is_tag_name_char, Scanner};
use super::scope::{ScopeId, ScopeStack};
use crate::error::ParseError;
use crate::options::ParseOptions;

/// Current tokenizer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Between tags
    InsideContent,
    /// `<` was emitted, the buffered element name comes next
    BeforeName,
    /// Inside a start tag, before an attribute or the end of the tag
    InsideTag,
    /// Right after an attribute name
    AfterAttributeName,
    /// After `=`, expecting an attribute value
    BeforeValue,
    /// End of input reached
    Done,
}

/// Type of token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `<` of an opening tag
    OpenBracket,
    /// Name of the element just opened
    ElementName,
    AttributeName,
    AttributeValue,
    /// `=` between an attribute name and its value
    Assign,
    /// Text between tags, CDATA, or an isolated `=`
    Content,
    /// `</name>` or `/>`
    CloseElement,
    /// `>` ending a start tag
    CloseBracket,
    /// End of input
    End,
}

/// Byte range in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }
}

/// A token pulled from the tokenizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Raw span in input
    pub span: Span,
    /// Name, value or text carried by the token
    pub value: Option<Cow<'a, str>>,
    /// Scope frame of element-name and close-element tokens
    pub scope: Option<ScopeId>,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Token {
            kind,
            span: Span::new(start, end),
            value: None,
            scope: None,
        }
    }

    fn with_value(mut self, value: impl Into<Cow<'a, str>>) -> Self {
        self.value = Some(value.into());
        self
    }

    fn with_scope(mut self, scope: ScopeId) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Payload as a string slice
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// Opening tag read ahead of its element-name token
#[derive(Debug, Clone, Copy)]
struct PendingTag<'a> {
    name: &'a str,
    span: Span,
    scope: ScopeId,
}

/// Tokenizer implementing a pull-parser pattern
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    options: &'a ParseOptions,
    state: ParseState,
    scopes: ScopeStack<'a>,
    pending: Option<PendingTag<'a>>,
    /// Frame of the unknown element whose subtree is being discarded
    skipping: Option<ScopeId>,
    root_seen: bool,
    prev: Option<TokenKind>,
    error: Option<ParseError>,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer; leading blanks and an `<?xml ...?>` declaration are skipped
    pub fn new(input: &'a str, options: &'a ParseOptions) -> Self {
        let mut scanner = Scanner::new(input);
        scanner.skip_spaces();
        scanner.skip_declaration_header();
        Tokenizer {
            scanner,
            options,
            state: ParseState::InsideContent,
            scopes: ScopeStack::new(),
            pending: None,
            skipping: None,
            root_seen: false,
            prev: None,
            error: None,
        }
    }

    /// Get the current parse state
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Get the current position in the input
    pub fn position(&self) -> usize {
        self.scanner.position()
    }

    /// Length of the input in bytes
    pub fn input_len(&self) -> usize {
        self.scanner.len()
    }

    /// Number of open scope frames
    pub fn depth(&self) -> usize {
        self.scopes.depth()
    }

    /// Innermost open scope frame
    pub fn current_scope(&self) -> Option<ScopeId> {
        self.scopes.current().map(|frame| frame.id)
    }

    /// Error latched by a previous call, if any
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Pull the next token
    ///
    /// Returns an `End` token on every call once input is exhausted, and the
    /// same error on every call once one has occurred.
    pub fn next_token(&mut self) -> Result<Token<'a>, ParseError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        loop {
            let token = match self.produce() {
                Ok(token) => token,
                Err(err) => {
                    log::warn!(target: "simple_xml.tokenizer", "tokenizer failed: {err}");
                    self.error = Some(err.clone());
                    return Err(err);
                }
            };
            self.prev = Some(token.kind);

            if let Some(skipped) = self.skipping {
                match token.kind {
                    TokenKind::End => {}
                    TokenKind::CloseElement if token.scope == Some(skipped) => {
                        log::debug!(
                            target: "simple_xml.tokenizer",
                            "resuming after unknown element at {}",
                            token.span.end
                        );
                        self.skipping = None;
                        continue;
                    }
                    _ => continue,
                }
            }

            log::trace!(target: "simple_xml.tokenizer", "emit token: {token:?}");
            return Ok(token);
        }
    }

    /// Produce the next raw token, before subtree skipping is applied
    fn produce(&mut self) -> Result<Token<'a>, ParseError> {
        loop {
            let token = match self.state {
                ParseState::Done => Some(self.end_token()),
                ParseState::BeforeName => Some(self.element_name()),
                ParseState::InsideContent => self.content_or_markup()?,
                ParseState::InsideTag | ParseState::AfterAttributeName => self.inside_tag()?,
                ParseState::BeforeValue => Some(self.attribute_value()),
            };
            // None: something was consumed silently (comment, dropped attribute)
            if let Some(token) = token {
                return Ok(token);
            }
        }
    }

    fn end_token(&mut self) -> Token<'a> {
        self.state = ParseState::Done;
        let len = self.scanner.len();
        Token::new(TokenKind::End, len, len)
    }

    fn element_name(&mut self) -> Token<'a> {
        self.state = ParseState::InsideTag;
        match self.pending.take() {
            Some(tag) => Token::new(TokenKind::ElementName, tag.span.start, tag.span.end)
                .with_value(tag.name)
                .with_scope(tag.scope),
            None => self.end_token(),
        }
    }

    fn content_or_markup(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        let skipped = self.scanner.skip_spaces();
        let start = self.scanner.position();

        let Some(b) = self.scanner.peek() else {
            return Ok(Some(self.end_token()));
        };

        match b {
            b'<' => self.markup(start),
            b'>' => {
                self.scanner.advance(1);
                Ok(Some(Token::new(TokenKind::CloseBracket, start, start + 1)))
            }
            b'=' => {
                self.scanner.advance(1);
                Ok(Some(self.content_token(start, skipped, "=")))
            }
            _ => {
                let text = self.scanner.read_content();
                Ok(Some(self.content_token(start, skipped, text)))
            }
        }
    }

    /// Content token; blanks skipped after a close tag or more content become leading spaces
    fn content_token(&self, start: usize, skipped: usize, text: &'a str) -> Token<'a> {
        let end = self.scanner.position();
        let keeps_spacing = matches!(self.prev, Some(TokenKind::CloseElement | TokenKind::Content));

        if keeps_spacing && skipped > 0 {
            let mut spaced = " ".repeat(skipped);
            spaced.push_str(text);
            Token::new(TokenKind::Content, start - skipped, end).with_value(spaced)
        } else {
            Token::new(TokenKind::Content, start, end).with_value(text)
        }
    }

    /// Dispatch on the construct starting with `<`
    fn markup(&mut self, start: usize) -> Result<Option<Token<'a>>, ParseError> {
        if self.scanner.starts_with(b"</") {
            return self.close_tag(start).map(Some);
        }
        if self.scanner.starts_with(b"<!--") {
            // `<!-->` and `<!--->` are complete comments
            self.skip_past(2, b"-->");
            return Ok(None);
        }
        if self.scanner.starts_with(b"<![CDATA[") {
            return Ok(Some(self.cdata(start)));
        }
        if self.scanner.starts_with(b"<?") {
            self.skip_past(2, b"?>");
            return Ok(None);
        }
        if self.scanner.starts_with(b"<!") {
            self.skip_declaration();
            return Ok(None);
        }
        self.open_tag(start).map(Some)
    }

    /// Skip `prefix` bytes, then everything through `terminator` (or to end of input)
    fn skip_past(&mut self, prefix: usize, terminator: &[u8]) {
        self.scanner.advance(prefix);
        let end = self
            .scanner
            .find(terminator)
            .map_or(self.scanner.len(), |pos| pos + terminator.len());
        self.scanner.set_position(end);
    }

    /// Skip `<!DOCTYPE ...>` and similar, including a bracketed internal subset
    fn skip_declaration(&mut self) {
        self.scanner.advance(2);
        let mut depth = 0usize;
        while let Some(b) = self.scanner.peek() {
            self.scanner.advance(1);
            match b {
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => return,
                _ => {}
            }
        }
    }

    fn cdata(&mut self, start: usize) -> Token<'a> {
        self.scanner.advance(9); // Skip '<![CDATA['
        let text_start = self.scanner.position();
        let (text_end, end) = match self.scanner.find(b"]]>") {
            Some(pos) => (pos, pos + 3),
            None => (self.scanner.len(), self.scanner.len()),
        };
        let text = self.scanner.slice(text_start, text_end);
        self.scanner.set_position(end);
        Token::new(TokenKind::Content, start, end).with_value(text)
    }

    /// `</name>`: pops the innermost frame whatever the name says
    fn close_tag(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(2); // Skip '</'
        let name_start = self.scanner.position();
        let name_end = self.scanner.find_byte(b'>').unwrap_or(self.scanner.len());
        let name = self.scanner.slice(name_start, name_end).trim();
        self.scanner.set_position(name_end + 1);
        self.state = ParseState::InsideContent;

        let frame = self.scopes.pop();
        if self.options.strict_close_tags() {
            match frame {
                Some(frame) if frame.tag_name != name => {
                    return Err(ParseError::MismatchedCloseTag {
                        expected: frame.tag_name.to_string(),
                        found: name.to_string(),
                        position: start,
                    });
                }
                None => {
                    return Err(ParseError::UnexpectedCloseTag {
                        found: name.to_string(),
                        position: start,
                    });
                }
                Some(_) => {}
            }
        }

        let token = Token::new(TokenKind::CloseElement, start, self.scanner.position()).with_value(name);
        Ok(match frame {
            Some(frame) => token.with_scope(frame.id),
            None => token,
        })
    }

    /// Opening tag: read the name ahead, open its frame, decide whether to skip it
    fn open_tag(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '<'
        self.scanner.skip_spaces();
        let name_start = self.scanner.position();
        let name = self.scanner.read_while(is_tag_name_char);

        if !name.as_bytes().first().is_some_and(|b| b.is_ascii_alphabetic()) {
            let name = if name.is_empty() {
                self.scanner.peek_char().map_or_else(|| "<".to_string(), String::from)
            } else {
                name.to_string()
            };
            return Err(ParseError::InvalidTagName {
                name,
                position: name_start,
            });
        }

        let scope = self.scopes.push(name);
        if !self.root_seen {
            self.root_seen = true;
        } else if self.skipping.is_none() && !self.options.is_known_element(name) {
            log::debug!(target: "simple_xml.tokenizer", "skipping unknown element <{name}> at {start}");
            self.skipping = Some(scope);
        }

        self.pending = Some(PendingTag {
            name,
            span: Span::new(name_start, self.scanner.position()),
            scope,
        });
        self.state = ParseState::BeforeName;
        Ok(Token::new(TokenKind::OpenBracket, start, start + 1))
    }

    fn inside_tag(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        self.scanner.skip_spaces();
        let start = self.scanner.position();

        let Some(b) = self.scanner.peek() else {
            return Ok(Some(self.end_token()));
        };

        match b {
            b'>' => {
                self.scanner.advance(1);
                self.state = ParseState::InsideContent;
                Ok(Some(Token::new(TokenKind::CloseBracket, start, start + 1)))
            }
            b'/' => self.self_close(start).map(Some),
            b'=' => {
                self.scanner.advance(1);
                if self.state == ParseState::AfterAttributeName {
                    self.state = ParseState::BeforeValue;
                    Ok(Some(Token::new(TokenKind::Assign, start, start + 1)))
                } else {
                    Ok(Some(Token::new(TokenKind::Content, start, start + 1).with_value("=")))
                }
            }
            b if is_attribute_name_char(b) => {
                let name = self.scanner.read_while(is_attribute_name_char);
                if self.options.is_known_attribute(name) {
                    self.state = ParseState::AfterAttributeName;
                    Ok(Some(
                        Token::new(TokenKind::AttributeName, start, self.scanner.position()).with_value(name),
                    ))
                } else {
                    log::debug!(target: "simple_xml.tokenizer", "dropping unknown attribute {name} at {start}");
                    self.drop_attribute_value();
                    self.state = ParseState::InsideTag;
                    Ok(None)
                }
            }
            _ => Err(ParseError::UnknownSyntax {
                found: self.scanner.peek_char().unwrap_or(char::REPLACEMENT_CHARACTER),
                position: start,
            }),
        }
    }

    /// `/>` (or `/` followed by blanks and `>`): closes the element just opened
    fn self_close(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '/'
        self.scanner.skip_spaces();
        match self.scanner.peek() {
            None => return Ok(self.end_token()),
            Some(b'>') => self.scanner.advance(1),
            Some(_) => {
                return Err(ParseError::UnknownSyntax {
                    found: '/',
                    position: start,
                })
            }
        }
        self.state = ParseState::InsideContent;

        let token = Token::new(TokenKind::CloseElement, start, self.scanner.position());
        Ok(match self.scopes.pop() {
            Some(frame) => token.with_value(frame.tag_name).with_scope(frame.id),
            None => token,
        })
    }

    fn attribute_value(&mut self) -> Token<'a> {
        self.scanner.skip_spaces();
        if !self.scanner.has_next() {
            return self.end_token();
        }
        let start = self.scanner.position();
        self.state = ParseState::InsideTag;
        let value = self.read_value();
        Token::new(TokenKind::AttributeValue, start, self.scanner.position()).with_value(value)
    }

    /// Read a quoted value (quotes stripped) or an unquoted run
    fn read_value(&mut self) -> &'a str {
        match self.scanner.peek() {
            Some(quote) if is_quote(quote) => {
                self.scanner.advance(1);
                let value_start = self.scanner.position();
                let value_end = self.scanner.find_byte(quote).unwrap_or(self.scanner.len());
                self.scanner.set_position(value_end + 1);
                self.scanner.slice(value_start, value_end)
            }
            _ => {
                let value_start = self.scanner.position();
                while let Some(b) = self.scanner.peek() {
                    let ends_tag = b == b'/' && self.scanner.peek_at(1) == Some(b'>');
                    if is_blank(b) || b == b'>' || b == b'<' || ends_tag {
                        break;
                    }
                    self.scanner.advance(1);
                }
                self.scanner.slice(value_start, self.scanner.position())
            }
        }
    }

    /// Consume `= value` after a rejected attribute name, if present
    fn drop_attribute_value(&mut self) {
        let resume = self.scanner.position();
        self.scanner.skip_spaces();
        if self.scanner.peek() == Some(b'=') {
            self.scanner.advance(1);
            self.scanner.skip_spaces();
            if self.scanner.has_next() {
                self.read_value();
            }
        } else {
            self.scanner.set_position(resume);
        }
    }
}

/// Iterator adapter for tokenizer
///
/// Stops at end of input; a latched error is yielded once.
impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.error.is_some() || self.state == ParseState::Done {
            return None;
        }
        match self.next_token() {
            Ok(token) if token.kind == TokenKind::End => None,
            other => Some(other),
        }
    }
}
