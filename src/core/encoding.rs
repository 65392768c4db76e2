//! Input Encoding Detection and Conversion
//!
//! Documents arrive from the host as raw bytes. UTF-8 (with or without BOM)
//! is borrowed as-is; UTF-16 detected by BOM or by the `<\0` / `\0<` pattern
//! is converted to an owned UTF-8 string before tokenizing.

use std::borrow::Cow;

use crate::error::ParseError;

/// Detected encoding of the input bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl InputEncoding {
    /// Detect encoding from byte order mark or initial bytes
    pub fn detect(input: &[u8]) -> Self {
        match input {
            [0xFF, 0xFE, ..] | [b'<', 0x00, ..] => InputEncoding::Utf16Le,
            [0xFE, 0xFF, ..] | [0x00, b'<', ..] => InputEncoding::Utf16Be,
            _ => InputEncoding::Utf8,
        }
    }
}

/// Decode raw input into text the tokenizer can read
pub fn decode_input(input: &[u8]) -> Result<Cow<'_, str>, ParseError> {
    match InputEncoding::detect(input) {
        InputEncoding::Utf8 => {
            let bytes = input.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(input);
            std::str::from_utf8(bytes)
                .map(Cow::Borrowed)
                .map_err(|e| ParseError::Encoding {
                    message: format!("Invalid UTF-8: {e}"),
                })
        }
        InputEncoding::Utf16Le => {
            let bytes = input.strip_prefix(&[0xFF, 0xFE]).unwrap_or(input);
            decode_utf16(bytes, "LE", u16::from_le_bytes).map(Cow::Owned)
        }
        InputEncoding::Utf16Be => {
            let bytes = input.strip_prefix(&[0xFE, 0xFF]).unwrap_or(input);
            decode_utf16(bytes, "BE", u16::from_be_bytes).map(Cow::Owned)
        }
    }
}

fn decode_utf16(bytes: &[u8], order: &str, unit: fn([u8; 2]) -> u16) -> Result<String, ParseError> {
    if bytes.len() % 2 != 0 {
        return Err(ParseError::Encoding {
            message: format!("Invalid UTF-16 {order}: odd number of bytes"),
        });
    }

    let code_units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| unit([chunk[0], chunk[1]]))
        .collect();

    String::from_utf16(&code_units).map_err(|e| ParseError::Encoding {
        message: format!("Invalid UTF-16 {order}: {e}"),
    })
}
