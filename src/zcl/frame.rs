//! # Tuya Cluster Frame Decoder
//!
//! This module decodes and encodes the frames carried by the Tuya manufacturer cluster
//! (0xEF00). It leverages the `nom` crate for parsing the binary header and the
//! variable number of datapoint entries that follow it.
//!
//! ## Wire Layout
//!
//! ```text
//! [control:1] ([manufacturer code:2])? [sequence:1] [command:1]
//! [status:1] [transaction id:1]
//! ([dp id:1] [type tag:1] [length:2 BE] [payload:length])*
//! ```
//!
//! The manufacturer code is only present when bit 2 of the control byte is set,
//! giving a 5-byte header instead of 3.
//!
//! ## Partial Frames
//!
//! Decoding never fails. A frame too short for its header yields no entries; a
//! truncated entry stops the scan and everything parsed before it is returned.
//!
//! ```ignore
//! let frame = decode_frame(&bytes);
//! for dp in &frame.entries {
//!     // dispatch each entry
//! }
//! ```

use crate::constants::{
    DP_ENTRY_HEADER_LEN, TUYA_CMD_DATA_QUERY, TUYA_CMD_DATA_REPORT, TUYA_CMD_DATA_REQUEST,
    TUYA_CMD_DATA_RESPONSE, TUYA_PREAMBLE_LEN, ZCL_FRAME_CONTROL_CLUSTER_SPECIFIC,
    ZCL_FRAME_CONTROL_DISABLE_DEFAULT_RESPONSE, ZCL_FRAME_CONTROL_MANUFACTURER_SPECIFIC,
    ZCL_FRAME_CONTROL_SERVER_TO_CLIENT, ZCL_HEADER_LEN_MANUFACTURER, ZCL_HEADER_LEN_SHORT,
};
use bitflags::bitflags;
use bytes::{BufMut, BytesMut};
use log::{debug, warn};
use nom::{
    bytes::complete::take,
    number::complete::{be_u16, be_u8, le_u16},
    IResult,
};

bitflags! {
    /// Frame control byte of the cluster-library header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FrameControl: u8 {
        const CLUSTER_SPECIFIC = ZCL_FRAME_CONTROL_CLUSTER_SPECIFIC;
        const MANUFACTURER_SPECIFIC = ZCL_FRAME_CONTROL_MANUFACTURER_SPECIFIC;
        const SERVER_TO_CLIENT = ZCL_FRAME_CONTROL_SERVER_TO_CLIENT;
        const DISABLE_DEFAULT_RESPONSE = ZCL_FRAME_CONTROL_DISABLE_DEFAULT_RESPONSE;
    }
}

/// Tuya cluster command carried in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuyaCommand {
    DataRequest,
    DataResponse,
    DataReport,
    DataQuery,
    Other(u8),
}

impl TuyaCommand {
    pub fn from_id(id: u8) -> Self {
        match id {
            TUYA_CMD_DATA_REQUEST => TuyaCommand::DataRequest,
            TUYA_CMD_DATA_RESPONSE => TuyaCommand::DataResponse,
            TUYA_CMD_DATA_REPORT => TuyaCommand::DataReport,
            TUYA_CMD_DATA_QUERY => TuyaCommand::DataQuery,
            other => TuyaCommand::Other(other),
        }
    }

    /// Responses and unsolicited reports both carry device values.
    pub fn carries_values(self) -> bool {
        matches!(self, TuyaCommand::DataResponse | TuyaCommand::DataReport)
    }
}

/// Header of a Tuya cluster frame, including the status and transaction id bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub frame_control: FrameControl,
    pub manufacturer_code: Option<u16>,
    pub sequence: u8,
    pub command_id: u8,
    pub status: u8,
    pub transaction_id: u8,
}

impl FrameHeader {
    /// Header for an outbound datapoint write.
    pub fn data_request(sequence: u8) -> Self {
        FrameHeader {
            frame_control: FrameControl::CLUSTER_SPECIFIC | FrameControl::DISABLE_DEFAULT_RESPONSE,
            manufacturer_code: None,
            sequence,
            command_id: TUYA_CMD_DATA_REQUEST,
            status: 0x00,
            transaction_id: sequence,
        }
    }

    pub fn command(&self) -> TuyaCommand {
        TuyaCommand::from_id(self.command_id)
    }

    /// Length of the cluster-library header, 3 or 5 bytes.
    pub fn header_length(&self) -> usize {
        header_length_for(self.frame_control.bits())
    }
}

/// One datapoint entry. Payload interpretation is left to the type registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datapoint {
    pub id: u8,
    pub type_tag: u8,
    pub payload: Vec<u8>,
}

impl Datapoint {
    pub fn new(id: u8, type_tag: u8, payload: Vec<u8>) -> Self {
        Datapoint {
            id,
            type_tag,
            payload,
        }
    }
}

/// Result of decoding one frame. `header` is `None` when the input was too short.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedFrame {
    pub header: Option<FrameHeader>,
    pub entries: Vec<Datapoint>,
}

impl DecodedFrame {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Header length selected by the manufacturer-specific bit of the control byte.
pub fn header_length_for(control: u8) -> usize {
    if control & ZCL_FRAME_CONTROL_MANUFACTURER_SPECIFIC != 0 {
        ZCL_HEADER_LEN_MANUFACTURER
    } else {
        ZCL_HEADER_LEN_SHORT
    }
}

/// Parses the cluster header plus status and transaction id.
pub fn parse_header(input: &[u8]) -> IResult<&[u8], FrameHeader> {
    let (input, control) = be_u8(input)?;
    let frame_control = FrameControl::from_bits_retain(control);
    let (input, manufacturer_code) = if frame_control.contains(FrameControl::MANUFACTURER_SPECIFIC)
    {
        let (input, code) = le_u16(input)?;
        (input, Some(code))
    } else {
        (input, None)
    };
    let (input, sequence) = be_u8(input)?;
    let (input, command_id) = be_u8(input)?;
    let (input, status) = be_u8(input)?;
    let (input, transaction_id) = be_u8(input)?;

    Ok((
        input,
        FrameHeader {
            frame_control,
            manufacturer_code,
            sequence,
            command_id,
            status,
            transaction_id,
        },
    ))
}

/// Parses a single `[id][type][len:2 BE][payload]` entry.
pub fn parse_datapoint(input: &[u8]) -> IResult<&[u8], Datapoint> {
    let (input, id) = be_u8(input)?;
    let (input, type_tag) = be_u8(input)?;
    let (input, length) = be_u16(input)?;
    let (input, payload) = take(length as usize)(input)?;
    Ok((input, Datapoint::new(id, type_tag, payload.to_vec())))
}

/// Decodes a raw frame into its header and ordered datapoint entries.
///
/// Never fails: malformed input produces whatever could be parsed.
pub fn decode_frame(input: &[u8]) -> DecodedFrame {
    let (mut rest, header) = match parse_header(input) {
        Ok(parsed) => parsed,
        Err(_) => {
            debug!("Frame of {} bytes too short for header, ignoring", input.len());
            return DecodedFrame::default();
        }
    };

    let mut entries = Vec::new();
    while rest.len() >= DP_ENTRY_HEADER_LEN {
        match parse_datapoint(rest) {
            Ok((remaining, dp)) => {
                entries.push(dp);
                rest = remaining;
            }
            Err(_) => {
                warn!(
                    "Truncated datapoint entry (dp {}), keeping {} parsed entries",
                    rest[0],
                    entries.len()
                );
                break;
            }
        }
    }

    if !rest.is_empty() && rest.len() < DP_ENTRY_HEADER_LEN {
        debug!("Ignoring {} trailing bytes after last entry", rest.len());
    }

    DecodedFrame {
        header: Some(header),
        entries,
    }
}

/// Appends one datapoint entry in wire format.
pub fn encode_datapoint(buf: &mut BytesMut, dp: &Datapoint) {
    let len = u16::try_from(dp.payload.len()).unwrap_or(u16::MAX);
    buf.put_u8(dp.id);
    buf.put_u8(dp.type_tag);
    buf.put_u16(len);
    buf.put_slice(&dp.payload[..len as usize]);
}

/// Packs a header and entries into a transport frame.
pub fn encode_frame(header: &FrameHeader, entries: &[Datapoint]) -> Vec<u8> {
    let body: usize = entries
        .iter()
        .map(|dp| DP_ENTRY_HEADER_LEN + dp.payload.len())
        .sum();
    let mut buf = BytesMut::with_capacity(header.header_length() + TUYA_PREAMBLE_LEN + body);

    // Manufacturer code presence follows the field, not a stale control bit
    let mut control = header.frame_control;
    control.set(
        FrameControl::MANUFACTURER_SPECIFIC,
        header.manufacturer_code.is_some(),
    );
    buf.put_u8(control.bits());
    if let Some(code) = header.manufacturer_code {
        buf.put_u16_le(code);
    }
    buf.put_u8(header.sequence);
    buf.put_u8(header.command_id);
    buf.put_u8(header.status);
    buf.put_u8(header.transaction_id);

    for dp in entries {
        encode_datapoint(&mut buf, dp);
    }

    buf.to_vec()
}
