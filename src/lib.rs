//! SimpleXml - Lenient XML-like parsing to an AST and nested objects
//!
//! Pipeline: text → Scanner → Tokenizer → AstBuilder → converter.
//!
//! - `create_ast`: owned tree with byte spans, filtered during the scan
//! - `convert_xml`: nested `serde_json::Value` built from that tree
//! - `strategy::parallel`: batch conversion with Rayon
//!
//! The same operations are exported as NIFs for `SimpleXml.Native`.

use rustler::{Binary, Env, NifResult, Term};
use serde_json::Value;

pub mod convert;
pub mod core;
pub mod dom;
pub mod error;
pub mod options;
pub mod strategy;
mod term;

pub use crate::convert::ast_to_value;
pub use crate::core::{Span, Token, TokenKind, Tokenizer};
pub use crate::dom::{AstBuilder, Attribute, Element, Node, Root};
pub use crate::error::ParseError;
pub use crate::options::ParseOptions;

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Rust API
// ============================================================================

/// Parse `input` into an AST
pub fn create_ast(input: &str, options: &ParseOptions) -> Result<Root, ParseError> {
    AstBuilder::new(input, options).build()
}

/// Parse `input` and convert the tree to a nested object
pub fn convert_xml(input: &str, options: &ParseOptions) -> Result<Value, ParseError> {
    create_ast(input, options).map(|tree| ast_to_value(&tree))
}

// ============================================================================
// NIFs
// ============================================================================

/// Parse a binary into `{:ok, {:root, children, loc}}` or `{:error, message}`
#[rustler::nif(name = "create_ast")]
fn create_ast_nif<'a>(
    env: Env<'a>,
    input: Binary<'a>,
    known_elements: Option<Vec<String>>,
    known_attributes: Option<Vec<String>>,
) -> NifResult<Term<'a>> {
    let options = ParseOptions::from_name_lists(known_elements, known_attributes);
    let result = core::encoding::decode_input(input.as_slice()).and_then(|text| create_ast(&text, &options));
    term::result_to_term(env, result, term::root_to_term)
}

/// Parse and convert a binary into `{:ok, map}` or `{:error, message}`
#[rustler::nif(name = "convert_xml")]
fn convert_xml_nif<'a>(
    env: Env<'a>,
    input: Binary<'a>,
    known_elements: Option<Vec<String>>,
    known_attributes: Option<Vec<String>>,
) -> NifResult<Term<'a>> {
    let options = ParseOptions::from_name_lists(known_elements, known_attributes);
    let result = core::encoding::decode_input(input.as_slice()).and_then(|text| convert_xml(&text, &options));
    term::result_to_term(env, result, term::value_to_term)
}

/// Convert many binaries in parallel; one `{:ok, map} | {:error, message}` per input
#[rustler::nif(schedule = "DirtyCpu")]
fn convert_xml_many<'a>(
    env: Env<'a>,
    inputs: Vec<Binary<'a>>,
    known_elements: Option<Vec<String>>,
    known_attributes: Option<Vec<String>>,
) -> NifResult<Term<'a>> {
    let options = ParseOptions::from_name_lists(known_elements, known_attributes);
    let slices: Vec<&[u8]> = inputs.iter().map(|input| input.as_slice()).collect();
    let results = strategy::parallel::convert_bytes_parallel(&slices, &options);

    let mut list = Term::list_new_empty(env);
    for result in results.into_iter().rev() {
        list = list.list_prepend(term::result_to_term(env, result, term::value_to_term)?);
    }
    Ok(list)
}

// ============================================================================
// NIF Initialization
// ============================================================================

rustler::init!("Elixir.SimpleXml.Native");
