//! # Tuya Datapoint Error Handling
//!
//! This module defines the TuyaError enum, which represents the different error
//! types that can occur in the tuya-dp-rs crate.

use thiserror::Error;

/// Represents the different error types that can occur in the datapoint bridge.
#[derive(Debug, Error)]
pub enum TuyaError {
    /// A datapoint entry carried no payload bytes, so no scalar can be produced.
    #[error("Empty payload for datapoint {dp}")]
    EmptyPayload { dp: u8 },

    /// A datapoint identifier has no entry in the dispatch table.
    #[error("Unknown datapoint: {0}")]
    UnknownDatapoint(u8),

    /// Indicates an error when parsing a transport frame.
    #[error("Error parsing Tuya frame: {0}")]
    FrameParseError(String),

    /// A transport write or read failed (device unreachable, link error).
    #[error("Transport error: {0}")]
    TransportError(String),

    /// A transport operation did not complete in time.
    #[error("Transport timeout")]
    Timeout,

    /// No device is attached under the given id.
    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    /// A device with the given id is already attached.
    #[error("Device already attached: {0}")]
    DeviceAlreadyAttached(String),

    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Indicates an invalid hexadecimal string was provided.
    #[error("Invalid hexadecimal string")]
    InvalidHexString,
}

impl From<serde_json::Error> for TuyaError {
    fn from(err: serde_json::Error) -> Self {
        TuyaError::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for TuyaError {
    fn from(err: std::io::Error) -> Self {
        TuyaError::ConfigError(err.to_string())
    }
}
