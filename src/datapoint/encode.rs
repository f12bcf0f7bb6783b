//! # Datapoint Command Encoder
//!
//! Builds outbound datapoint-write entries for the settable parameters of the
//! sensor. Every value is clamped to the range the hardware accepts right before
//! it is encoded, regardless of any validation done by the caller.
//!
//! | Parameter                | DP  | Type  | Wire range |
//! |--------------------------|-----|-------|------------|
//! | Soil calibration         | 102 | value | -30..30    |
//! | Temperature calibration  | 104 | value | -20..20 (tenths of °C) |
//! | Humidity calibration     | 105 | value | -30..30    |
//! | Temperature unit         | 106 | enum  | 0=C, 1=F   |
//! | Soil warning threshold   | 110 | value | 0..100     |
//! | Temperature sampling     | 111 | value | 5..3600 s  |
//! | Soil sampling            | 112 | value | 5..3600 s  |

use crate::constants::*;
use crate::datapoint::types::DpType;
use crate::device::settings::DeviceSettings;
use crate::zcl::{encode_frame, Datapoint, FrameHeader};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parameters the host can write to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingParameter {
    TemperatureCalibration,
    HumidityCalibration,
    SoilCalibration,
    SoilWarningThreshold,
    TemperatureSamplingInterval,
    SoilSamplingInterval,
    TemperatureUnit,
}

impl SettingParameter {
    /// Order in which the full settings payload is written.
    pub const ALL: [SettingParameter; 7] = [
        SettingParameter::TemperatureCalibration,
        SettingParameter::HumidityCalibration,
        SettingParameter::SoilCalibration,
        SettingParameter::SoilWarningThreshold,
        SettingParameter::TemperatureSamplingInterval,
        SettingParameter::SoilSamplingInterval,
        SettingParameter::TemperatureUnit,
    ];

    pub fn dp_id(self) -> u8 {
        match self {
            SettingParameter::TemperatureCalibration => DP_TEMPERATURE_CALIBRATION,
            SettingParameter::HumidityCalibration => DP_HUMIDITY_CALIBRATION,
            SettingParameter::SoilCalibration => DP_SOIL_CALIBRATION,
            SettingParameter::SoilWarningThreshold => DP_SOIL_WARNING_THRESHOLD,
            SettingParameter::TemperatureSamplingInterval => DP_TEMPERATURE_SAMPLING,
            SettingParameter::SoilSamplingInterval => DP_SOIL_SAMPLING,
            SettingParameter::TemperatureUnit => DP_TEMPERATURE_UNIT,
        }
    }

    pub fn dp_type(self) -> DpType {
        match self {
            SettingParameter::TemperatureUnit => DpType::Enum,
            _ => DpType::Value,
        }
    }

    /// Inclusive range accepted by the hardware, in wire units.
    pub fn wire_range(self) -> (i32, i32) {
        match self {
            SettingParameter::TemperatureCalibration => (
                CALIBRATION_TEMPERATURE_TENTHS_MIN,
                CALIBRATION_TEMPERATURE_TENTHS_MAX,
            ),
            SettingParameter::HumidityCalibration | SettingParameter::SoilCalibration => {
                (CALIBRATION_PERCENT_MIN, CALIBRATION_PERCENT_MAX)
            }
            SettingParameter::SoilWarningThreshold => (PERCENT_MIN, PERCENT_MAX),
            SettingParameter::TemperatureSamplingInterval
            | SettingParameter::SoilSamplingInterval => {
                (SAMPLING_INTERVAL_MIN_SECS, SAMPLING_INTERVAL_MAX_SECS)
            }
            SettingParameter::TemperatureUnit => (
                i32::from(TEMPERATURE_UNIT_CELSIUS),
                i32::from(TEMPERATURE_UNIT_FAHRENHEIT),
            ),
        }
    }

    /// Converts a user-facing value to its clamped wire integer.
    pub fn to_wire(self, value: f64) -> i32 {
        match self {
            SettingParameter::TemperatureCalibration => {
                to_tuya_temperature_calibration_tenths(value)
            }
            _ => {
                let (min, max) = self.wire_range();
                clamp_wire(value, min, max)
            }
        }
    }
}

impl fmt::Display for SettingParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SettingParameter::TemperatureCalibration => "temperature_calibration",
            SettingParameter::HumidityCalibration => "humidity_calibration",
            SettingParameter::SoilCalibration => "soil_calibration",
            SettingParameter::SoilWarningThreshold => "soil_warning_threshold",
            SettingParameter::TemperatureSamplingInterval => "temperature_sampling_interval",
            SettingParameter::SoilSamplingInterval => "soil_sampling_interval",
            SettingParameter::TemperatureUnit => "temperature_unit",
        };
        f.write_str(name)
    }
}

/// Temperature display unit on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn wire_value(self) -> u8 {
        match self {
            TemperatureUnit::Celsius => TEMPERATURE_UNIT_CELSIUS,
            TemperatureUnit::Fahrenheit => TEMPERATURE_UNIT_FAHRENHEIT,
        }
    }
}

/// Rounds and clamps to `[min, max]`. NaN maps to 0 before clamping.
fn clamp_wire(value: f64, min: i32, max: i32) -> i32 {
    let rounded = if value.is_nan() { 0.0 } else { value.round() };
    rounded.clamp(f64::from(min), f64::from(max)) as i32
}

/// Degrees Celsius to tenths, clamped to ±2.0 °C.
pub fn to_tuya_temperature_calibration_tenths(celsius: f64) -> i32 {
    clamp_wire(
        celsius * f64::from(TEMPERATURE_DIVISOR),
        CALIBRATION_TEMPERATURE_TENTHS_MIN,
        CALIBRATION_TEMPERATURE_TENTHS_MAX,
    )
}

/// Builds the write entry for one parameter.
pub fn encode_setting(parameter: SettingParameter, value: f64) -> Datapoint {
    let wire = parameter.to_wire(value);
    let payload = match parameter.dp_type() {
        DpType::Enum | DpType::Bool => vec![wire as u8],
        _ => wire.to_be_bytes().to_vec(),
    };
    Datapoint::new(parameter.dp_id(), parameter.dp_type().tag(), payload)
}

/// Entries for every settable parameter, in `SettingParameter::ALL` order.
pub fn encode_settings_payload(settings: &DeviceSettings) -> Vec<Datapoint> {
    SettingParameter::ALL
        .iter()
        .map(|&p| encode_setting(p, settings.value_of(p)))
        .collect()
}

/// Packs entries into a data-request frame.
pub fn build_write_frame(sequence: u8, entries: &[Datapoint]) -> Vec<u8> {
    encode_frame(&FrameHeader::data_request(sequence), entries)
}
