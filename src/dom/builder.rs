//! AST Builder
//!
//! Pulls tokens from the [`Tokenizer`] and assembles the tree. Open elements
//! sit on a stack that mirrors the tokenizer's scope frames; a close token
//! only pops the top element when it carries that element's scope handle.
//! Adjacent content is merged as it is appended.

use std::borrow::Cow;

use super::node::{append_child, Attribute, Element, Node, Root};
use crate::core::{ScopeId, Span, Token, TokenKind, Tokenizer};
use crate::error::ParseError;
use crate::options::ParseOptions;

/// Scope name reported for tokens found outside any element
const ROOT_SCOPE: &str = "#root";

/// An element whose start tag ended with `>` and is waiting for its close
struct OpenElement {
    element: Element,
    scope: Option<ScopeId>,
}

/// Builds a [`Root`] from a token stream
pub struct AstBuilder<'a> {
    input: &'a str,
    tokenizer: Tokenizer<'a>,
    root: Root,
    stack: Vec<OpenElement>,
    max_depth: Option<usize>,
}

impl<'a> AstBuilder<'a> {
    pub fn new(input: &'a str, options: &'a ParseOptions) -> Self {
        AstBuilder {
            input,
            tokenizer: Tokenizer::new(input, options),
            root: Root {
                children: Vec::new(),
                loc: Span::new(0, input.len()),
            },
            stack: Vec::with_capacity(32),
            max_depth: options.max_depth(),
        }
    }

    /// Consume the whole token stream and return the finished tree
    pub fn build(mut self) -> Result<Root, ParseError> {
        while self.step()? {}
        Ok(self.finish())
    }

    /// Handle one token outside a start tag; `false` once the input is exhausted
    fn step(&mut self) -> Result<bool, ParseError> {
        let token = self.tokenizer.next_token()?;
        match token.kind {
            TokenKind::OpenBracket => self.open_element(token.span.start)?,
            TokenKind::CloseElement => self.close_element(&token),
            TokenKind::Content => {
                let text = token.value.map(Cow::into_owned).unwrap_or_default();
                self.append(Node::Content(text));
            }
            TokenKind::End => return Ok(false),
            _ => {
                let scope = self.current_tag_name().to_string();
                return Err(self.unexpected(&token, &scope));
            }
        }
        Ok(true)
    }

    /// Read the rest of a start tag opened at `start`
    fn open_element(&mut self, start: usize) -> Result<(), ParseError> {
        let name = self.tokenizer.next_token()?;
        if name.kind != TokenKind::ElementName {
            let scope = self.current_tag_name().to_string();
            return Err(self.unexpected(&name, &scope));
        }
        if let Some(limit) = self.max_depth.filter(|&limit| self.stack.len() >= limit) {
            return Err(ParseError::NestingTooDeep { limit, position: start });
        }
        let mut element = Element::new(name.value().unwrap_or_default(), start);

        let mut next = self.tokenizer.next_token()?;
        loop {
            match next.kind {
                TokenKind::AttributeName => {
                    let attr_name = next.value().unwrap_or_default().to_string();
                    let after = self.tokenizer.next_token()?;
                    match after.kind {
                        TokenKind::Assign => {}
                        TokenKind::End => {
                            log::debug!(target: "simple_xml.builder", "dropping incomplete attribute {attr_name}");
                            next = after;
                            continue;
                        }
                        // Attribute without `=value`
                        _ => {
                            element.attributes.push(Attribute {
                                name: attr_name,
                                value: String::new(),
                            });
                            next = after;
                            continue;
                        }
                    }

                    let value = self.tokenizer.next_token()?;
                    match value.kind {
                        TokenKind::AttributeValue => element.attributes.push(Attribute {
                            name: attr_name,
                            value: value.value.map(Cow::into_owned).unwrap_or_default(),
                        }),
                        TokenKind::End => {
                            log::debug!(target: "simple_xml.builder", "dropping incomplete attribute {attr_name}");
                            next = value;
                            continue;
                        }
                        _ => return Err(self.unexpected(&value, &element.tag_name)),
                    }
                    next = self.tokenizer.next_token()?;
                }
                TokenKind::CloseBracket => {
                    self.stack.push(OpenElement {
                        element,
                        scope: name.scope,
                    });
                    return Ok(());
                }
                TokenKind::CloseElement | TokenKind::End => {
                    element.loc.end = next.span.end;
                    self.append(Node::Element(element));
                    return Ok(());
                }
                _ => return Err(self.unexpected(&next, &element.tag_name)),
            }
        }
    }

    fn close_element(&mut self, token: &Token<'_>) {
        let closes_top =
            token.scope.is_some() && self.stack.last().map(|open| open.scope) == Some(token.scope);
        if !closes_top {
            log::debug!(
                target: "simple_xml.builder",
                "ignoring close tag </{}> at {}",
                token.value().unwrap_or_default(),
                token.span.start
            );
            return;
        }

        if let Some(OpenElement { mut element, .. }) = self.stack.pop() {
            element.loc.end = token.span.end;
            self.append(Node::Element(element));
        }
    }

    /// Append to the innermost open element, or to the root
    fn append(&mut self, node: Node) {
        let children = match self.stack.last_mut() {
            Some(open) => &mut open.element.children,
            None => &mut self.root.children,
        };
        append_child(children, node);
    }

    /// Attach unterminated elements to their parents and return the root
    fn finish(mut self) -> Root {
        while let Some(open) = self.stack.pop() {
            self.append(Node::Element(open.element));
        }
        self.root
    }

    fn current_tag_name(&self) -> &str {
        self.stack
            .last()
            .map_or(ROOT_SCOPE, |open| open.element.tag_name.as_str())
    }

    fn unexpected(&self, token: &Token<'_>, scope: &str) -> ParseError {
        let value = token
            .value()
            .or_else(|| self.input.get(token.span.start..token.span.end))
            .unwrap_or_default();
        ParseError::UnexpectedToken {
            token: token.kind,
            value: value.to_string(),
            scope: scope.to_string(),
            position: token.span.start,
        }
    }
}
