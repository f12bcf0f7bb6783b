//! # Hex Encoding/Decoding Utilities
//!
//! Hex helpers used for frame logging, the CLI and test fixtures.
//!
//! ```rust
//! use tuya_dp_rs::util::hex::{decode_hex, encode_hex, format_hex_compact};
//!
//! let data = [0x09, 0x01, 0x02, 0x00];
//! assert_eq!(encode_hex(&data), "09010200");
//! assert_eq!(decode_hex("09 01 02 00").unwrap(), data);
//! assert_eq!(format_hex_compact(&data), "09 01 02 00");
//! ```

use crate::error::TuyaError;
use thiserror::Error;

/// Errors that can occur during hex operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HexError {
    #[error("Odd number of hex characters: {0}")]
    OddLength(usize),

    #[error("Empty hex string")]
    EmptyString,

    #[error("Hex decoding error: {0}")]
    DecodeError(String),
}

impl From<HexError> for TuyaError {
    fn from(_: HexError) -> Self {
        TuyaError::InvalidHexString
    }
}

/// Encode bytes to lowercase hex string
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decode hex string to bytes. Whitespace is stripped.
pub fn decode_hex(hex_str: &str) -> Result<Vec<u8>, HexError> {
    let cleaned: String = hex_str.chars().filter(|c| !c.is_whitespace()).collect();
    decode_cleaned(&cleaned)
}

/// Like `decode_hex`, but drops every non-hex character (`09-01:02`).
pub fn parse_hex_lenient(input: &str) -> Result<Vec<u8>, HexError> {
    let cleaned: String = input.chars().filter(|c| c.is_ascii_hexdigit()).collect();
    decode_cleaned(&cleaned)
}

fn decode_cleaned(cleaned: &str) -> Result<Vec<u8>, HexError> {
    if cleaned.is_empty() {
        return Err(HexError::EmptyString);
    }
    if cleaned.len() % 2 != 0 {
        return Err(HexError::OddLength(cleaned.len()));
    }
    hex::decode(cleaned).map_err(|e| HexError::DecodeError(e.to_string()))
}

/// Formats data as "09 01 02" for logs.
pub fn format_hex_compact(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_with_separators() {
        assert_eq!(parse_hex_lenient("09-01:02 00").unwrap(), vec![0x09, 0x01, 0x02, 0x00]);
        assert_eq!(decode_hex("0D 02 11").unwrap(), vec![0x0D, 0x02, 0x11]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(decode_hex(""), Err(HexError::EmptyString));
        assert_eq!(decode_hex("1"), Err(HexError::OddLength(1)));
        assert!(matches!(decode_hex("GG"), Err(HexError::DecodeError(_))));
    }
}
