//! The zcl module contains the transport framing for the Tuya manufacturer cluster:
//! header decoding, datapoint entry extraction and frame packing.

pub mod frame;

pub use frame::*;

/// A decoded transport frame.
pub use frame::DecodedFrame;

/// A single datapoint entry carried in a frame.
pub use frame::Datapoint;
