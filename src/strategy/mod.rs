//! Conversion Strategy Module
//!
//! - Single document: `create_ast` / `convert_xml` at the crate root
//! - Batch: documents converted concurrently (`parallel`)

pub mod parallel;

pub use parallel::{convert_bytes_parallel, convert_parallel, create_ast_parallel};
