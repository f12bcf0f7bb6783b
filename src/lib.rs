//! # tuya-dp-rs - Tuya Datapoint Bridge for Sleepy Zigbee Soil Sensors
//!
//! The tuya-dp-rs crate decodes the Tuya manufacturer-cluster datapoint protocol used by
//! battery-powered soil moisture / temperature / humidity sensors and maps it onto a
//! normalized sensor model, while coordinating writes to a device that is asleep most
//! of the time.
//!
//! ## Features
//!
//! - Decode Tuya cluster frames (3- or 5-byte header) into ordered datapoint entries,
//!   tolerating truncated frames
//! - Type datapoint payloads (boolean, value, enum, with a length-based fallback)
//! - Resolve both firmware numbering schemes to the same semantic channels
//! - Calibrate, smooth (time-weighted EMA) and clamp channel values
//! - Derive the water-shortage alarm from soil moisture and a threshold
//! - Encode setting writes, clamped to the ranges the hardware accepts
//! - Queue configuration writes for sleepy devices until their next wake window
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Instant;
//! use tuya_dp_rs::{
//!     AttachInfo, BridgeConfig, DeviceManager, DeviceSettings, HostCalibration, MockTransport,
//! };
//!
//! # async fn run(frame: &[u8]) -> Result<(), tuya_dp_rs::TuyaError> {
//! let mut manager = DeviceManager::new(BridgeConfig::default());
//! manager
//!     .attach_device(
//!         "soil-1",
//!         MockTransport::new(),
//!         AttachInfo { always_listening: false, first_attach: true },
//!         DeviceSettings::default(),
//!         HostCalibration::default(),
//!         Instant::now(),
//!     )
//!     .await?;
//! for update in manager.on_frame("soil-1", frame, Instant::now()).await? {
//!     println!("{update:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod datapoint;
pub mod device;
pub mod device_manager;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod util;
pub mod zcl;

pub use crate::error::TuyaError;
pub use crate::logging::{init_logger, log_info};

// Framing
pub use zcl::{encode_frame, Datapoint, DecodedFrame, FrameControl, FrameHeader, TuyaCommand};

// Datapoints
pub use datapoint::{
    build_write_frame, ChannelReading, DpType, DpValue, SchemeFamily, SemanticChannel,
    SettingParameter, TemperatureUnit,
};

// Value pipeline
pub use pipeline::{clamp_percent, compute_water_alarm, ema_update, HostCalibration, ValuePipeline};

// Devices
pub use device::{
    AttachInfo, BridgeConfig, DeviceLifecycleState, DeviceSettings, DeviceTransport,
    MockTransport, PowerMode, PublishedState, SoilSensorDevice, StateUpdate,
};
pub use device_manager::DeviceManager;

/// Decode a raw Tuya cluster frame.
///
/// # Arguments
/// * `bytes` - Frame as received from the transport
///
/// # Returns
/// The header (if present) and every datapoint entry that could be parsed.
pub fn decode_frame(bytes: &[u8]) -> DecodedFrame {
    zcl::decode_frame(bytes)
}

/// Decode a frame and resolve each entry to its channel.
///
/// Entries with unknown identifiers or empty payloads are logged and skipped.
///
/// # Arguments
/// * `bytes` - Frame as received from the transport
///
/// # Returns
/// One reading per resolvable entry, in frame order.
pub fn decode_readings(bytes: &[u8]) -> Vec<ChannelReading> {
    zcl::decode_frame(bytes)
        .entries
        .iter()
        .filter_map(|dp| match datapoint::resolve(dp) {
            Ok(reading) => Some(reading),
            Err(e) => {
                log::warn!("Skipping dp {}: {e}", dp.id);
                None
            }
        })
        .collect()
}

/// Build the frame that writes every setting to a device.
///
/// # Arguments
/// * `sequence` - Frame sequence / transaction number
/// * `settings` - Settings to write; each value is clamped to its hardware range
///
/// # Returns
/// The encoded frame, ready for the transport.
pub fn build_settings_frame(sequence: u8, settings: &DeviceSettings) -> Vec<u8> {
    datapoint::build_write_frame(sequence, &datapoint::encode_settings_payload(settings))
}
