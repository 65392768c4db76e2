//! Core parsing primitives
//!
//! This module contains the building blocks the AST builder sits on:
//! - Scanner: byte cursor with memchr-accelerated terminator search
//! - Scope: open-element frames with unique handles
//! - Tokenizer: State machine for token extraction and filtering
//! - Encoding: UTF-16 detection and conversion to UTF-8

pub mod encoding;
pub mod scanner;
pub mod scope;
pub mod tokenizer;

pub use scope::ScopeId;
pub use tokenizer::{Span, Token, TokenKind, Tokenizer};
