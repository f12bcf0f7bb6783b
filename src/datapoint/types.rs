//! # Datapoint Type Registry
//!
//! Converts the raw payload of a datapoint entry into one typed scalar, driven by
//! the entry's type tag. Tags that carry no scalar meaning (raw, string, bitmap,
//! unknown) fall back to a length-based integer heuristic.

use crate::constants::{
    DP_TYPE_BITMAP, DP_TYPE_BOOL, DP_TYPE_ENUM, DP_TYPE_RAW, DP_TYPE_STRING, DP_TYPE_VALUE,
};
use crate::error::TuyaError;
use crate::zcl::Datapoint;
use serde::Serialize;
use std::fmt;

/// Declared type of a datapoint payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DpType {
    Raw,
    Bool,
    Value,
    String,
    Enum,
    Bitmap,
    Unknown(u8),
}

impl DpType {
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            DP_TYPE_RAW => DpType::Raw,
            DP_TYPE_BOOL => DpType::Bool,
            DP_TYPE_VALUE => DpType::Value,
            DP_TYPE_STRING => DpType::String,
            DP_TYPE_ENUM => DpType::Enum,
            DP_TYPE_BITMAP => DpType::Bitmap,
            other => DpType::Unknown(other),
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            DpType::Raw => DP_TYPE_RAW,
            DpType::Bool => DP_TYPE_BOOL,
            DpType::Value => DP_TYPE_VALUE,
            DpType::String => DP_TYPE_STRING,
            DpType::Enum => DP_TYPE_ENUM,
            DpType::Bitmap => DP_TYPE_BITMAP,
            DpType::Unknown(tag) => tag,
        }
    }
}

/// A typed scalar decoded from a datapoint payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DpValue {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Enum(u8),
}

impl DpValue {
    /// Numeric view used by the value pipeline. Booleans map to 0/1.
    pub fn as_f64(&self) -> f64 {
        match *self {
            DpValue::Bool(b) => f64::from(u8::from(b)),
            DpValue::Int(v) => f64::from(v),
            DpValue::UInt(v) => f64::from(v),
            DpValue::Enum(v) => f64::from(v),
        }
    }

    /// Truthiness: non-zero numbers are `true`.
    pub fn as_bool(&self) -> bool {
        match *self {
            DpValue::Bool(b) => b,
            DpValue::Int(v) => v != 0,
            DpValue::UInt(v) => v != 0,
            DpValue::Enum(v) => v != 0,
        }
    }
}

impl fmt::Display for DpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DpValue::Bool(b) => write!(f, "{b}"),
            DpValue::Int(v) => write!(f, "{v}"),
            DpValue::UInt(v) => write!(f, "{v}"),
            DpValue::Enum(v) => write!(f, "enum({v})"),
        }
    }
}

/// Decodes the payload of `dp` according to its type tag.
pub fn decode_dp_value(dp: &Datapoint) -> Result<DpValue, TuyaError> {
    decode_payload(dp.id, DpType::from_tag(dp.type_tag), &dp.payload)
}

/// Decodes a payload given its declared type.
///
/// An empty payload is an error for every type.
pub fn decode_payload(dp: u8, dp_type: DpType, payload: &[u8]) -> Result<DpValue, TuyaError> {
    let first = *payload.first().ok_or(TuyaError::EmptyPayload { dp })?;

    let value = match dp_type {
        DpType::Bool => DpValue::Bool(first != 0),
        DpType::Enum => DpValue::Enum(first),
        DpType::Value => DpValue::Int(read_signed_be(payload)),
        DpType::Raw | DpType::String | DpType::Bitmap | DpType::Unknown(_) => {
            decode_by_length(payload)
        }
    };
    Ok(value)
}

/// Signed big-endian integer from the longest of 4, 2 or 1 leading bytes.
fn read_signed_be(payload: &[u8]) -> i32 {
    match payload.len() {
        n if n >= 4 => i32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]),
        n if n >= 2 => i32::from(i16::from_be_bytes([payload[0], payload[1]])),
        _ => i32::from(payload[0] as i8),
    }
}

/// Fallback for tags without scalar meaning: 4 bytes signed, 2 or 1 bytes unsigned.
fn decode_by_length(payload: &[u8]) -> DpValue {
    match payload.len() {
        n if n >= 4 => DpValue::Int(i32::from_be_bytes([
            payload[0], payload[1], payload[2], payload[3],
        ])),
        n if n >= 2 => DpValue::UInt(u32::from(u16::from_be_bytes([payload[0], payload[1]]))),
        _ => DpValue::UInt(u32::from(payload[0])),
    }
}
