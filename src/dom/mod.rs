//! DOM Module - Owned AST
//!
//! - `node`: Root / Element / Attribute / Content tree types
//! - `builder`: token-driven assembly with scope-matched closes and
//!   incremental content merging

pub mod builder;
pub mod node;

pub use builder::AstBuilder;
pub use node::{Attribute, Element, Node, Root};
