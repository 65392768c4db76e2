//! Parse errors
//!
//! Every failure the tokenizer or the AST builder can report. Tokenizer
//! errors are latched: once one is returned, the same value is returned again
//! on every later pull, so the type is `Clone + PartialEq`.

use crate::core::tokenizer::TokenKind;

/// Error produced while scanning, tokenizing or building the AST
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Tag name does not start with an ASCII letter
    #[error("Invalid tag name: \"{name}\"")]
    InvalidTagName { name: String, position: usize },

    /// Character where no token production applies
    #[error("Unknown syntax: \"{found}\"")]
    UnknownSyntax { found: char, position: usize },

    /// Strict close-tag mode: `</found>` closed an element opened as `<expected>`
    #[error("Mismatched close tag: expected </{expected}>, found </{found}>")]
    MismatchedCloseTag {
        expected: String,
        found: String,
        position: usize,
    },

    /// Strict close-tag mode: close tag with no element open
    #[error("Unexpected close tag: </{found}> without matching open tag")]
    UnexpectedCloseTag { found: String, position: usize },

    /// Builder received a token that has no meaning in its current state
    #[error("Unknown token type: {token:?} \"{value}\", scoping element: {scope}")]
    UnexpectedToken {
        token: TokenKind,
        value: String,
        scope: String,
        position: usize,
    },

    /// Builder: an element opened below the configured nesting limit
    #[error("Nesting too deep: more than {limit} open elements")]
    NestingTooDeep { limit: usize, position: usize },

    /// Native input could not be decoded to UTF-8
    #[error("Invalid input encoding: {message}")]
    Encoding { message: String },
}

impl ParseError {
    /// Byte offset the error refers to, when there is one
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::InvalidTagName { position, .. }
            | ParseError::UnknownSyntax { position, .. }
            | ParseError::MismatchedCloseTag { position, .. }
            | ParseError::UnexpectedCloseTag { position, .. }
            | ParseError::UnexpectedToken { position, .. }
            | ParseError::NestingTooDeep { position, .. } => Some(*position),
            ParseError::Encoding { .. } => None,
        }
    }
}
