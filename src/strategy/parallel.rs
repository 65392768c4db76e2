//! Parallel Batch Conversion
//!
//! Uses Rayon to convert independent documents concurrently. One
//! `ParseOptions` value is shared by every worker; results keep input order.

use rayon::prelude::*;
use serde_json::Value;

use crate::core::encoding::decode_input;
use crate::dom::Root;
use crate::error::ParseError;
use crate::options::ParseOptions;
use crate::{convert_xml, create_ast};

/// Build the AST of every input in parallel
pub fn create_ast_parallel<S>(inputs: &[S], options: &ParseOptions) -> Vec<Result<Root, ParseError>>
where
    S: AsRef<str> + Sync,
{
    inputs
        .par_iter()
        .map(|input| create_ast(input.as_ref(), options))
        .collect()
}

/// Convert every input to a nested object in parallel
pub fn convert_parallel<S>(inputs: &[S], options: &ParseOptions) -> Vec<Result<Value, ParseError>>
where
    S: AsRef<str> + Sync,
{
    inputs
        .par_iter()
        .map(|input| convert_xml(input.as_ref(), options))
        .collect()
}

/// Decode and convert raw documents in parallel
pub fn convert_bytes_parallel(inputs: &[&[u8]], options: &ParseOptions) -> Vec<Result<Value, ParseError>> {
    inputs
        .par_iter()
        .map(|bytes| decode_input(bytes).and_then(|text| convert_xml(&text, options)))
        .collect()
}
