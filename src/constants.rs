//! Tuya Datapoint Protocol Constants
//!
//! This module defines constants for the Zigbee cluster-library header carried by
//! the Tuya manufacturer cluster (0xEF00) and for the datapoint entries multiplexed inside it.

/// Frame control bit: cluster-specific command
pub const ZCL_FRAME_CONTROL_CLUSTER_SPECIFIC: u8 = 0x01;

/// Frame control bit: manufacturer code present in header
pub const ZCL_FRAME_CONTROL_MANUFACTURER_SPECIFIC: u8 = 0x04;

/// Frame control bit: direction server to client
pub const ZCL_FRAME_CONTROL_SERVER_TO_CLIENT: u8 = 0x08;

/// Frame control bit: disable default response
pub const ZCL_FRAME_CONTROL_DISABLE_DEFAULT_RESPONSE: u8 = 0x10;

/// Header length without manufacturer code (control, sequence, command)
pub const ZCL_HEADER_LEN_SHORT: usize = 3;

/// Header length with manufacturer code (control, code lo/hi, sequence, command)
pub const ZCL_HEADER_LEN_MANUFACTURER: usize = 5;

/// Status and transaction id bytes following the header
pub const TUYA_PREAMBLE_LEN: usize = 2;

/// Datapoint entry header: id, type tag, two length bytes
pub const DP_ENTRY_HEADER_LEN: usize = 4;

// Tuya cluster commands
pub const TUYA_CMD_DATA_REQUEST: u8 = 0x00;
pub const TUYA_CMD_DATA_RESPONSE: u8 = 0x01;
pub const TUYA_CMD_DATA_REPORT: u8 = 0x02;
pub const TUYA_CMD_DATA_QUERY: u8 = 0x03;

// Datapoint type tags
pub const DP_TYPE_RAW: u8 = 0x00;
pub const DP_TYPE_BOOL: u8 = 0x01;
pub const DP_TYPE_VALUE: u8 = 0x02;
pub const DP_TYPE_STRING: u8 = 0x03;
pub const DP_TYPE_ENUM: u8 = 0x04;
pub const DP_TYPE_BITMAP: u8 = 0x05;

// Sensor datapoints, standard alias family
pub const DP_WATER_WARNING: u8 = 1;
pub const DP_SOIL_MOISTURE: u8 = 3;
pub const DP_TEMPERATURE: u8 = 5;
pub const DP_BATTERY: u8 = 15;

// Sensor datapoints, extended alias family
pub const DP_WATER_WARNING_ALT: u8 = 14;
pub const DP_TEMPERATURE_ALT: u8 = 101;
pub const DP_SOIL_MOISTURE_ALT: u8 = 107;
pub const DP_BATTERY_ALT: u8 = 108;

/// Air humidity, same id under both firmware schemes
pub const DP_HUMIDITY: u8 = 109;

// Settable datapoints
pub const DP_SOIL_CALIBRATION: u8 = 102;
pub const DP_TEMPERATURE_CALIBRATION: u8 = 104;
pub const DP_HUMIDITY_CALIBRATION: u8 = 105;
pub const DP_TEMPERATURE_UNIT: u8 = 106;
pub const DP_SOIL_WARNING_THRESHOLD: u8 = 110;
pub const DP_TEMPERATURE_SAMPLING: u8 = 111;
pub const DP_SOIL_SAMPLING: u8 = 112;

/// Temperature is reported in tenths of a degree
pub const TEMPERATURE_DIVISOR: u32 = 10;

// Hardware-accepted setting ranges (wire units)
pub const CALIBRATION_PERCENT_MIN: i32 = -30;
pub const CALIBRATION_PERCENT_MAX: i32 = 30;
pub const CALIBRATION_TEMPERATURE_TENTHS_MIN: i32 = -20;
pub const CALIBRATION_TEMPERATURE_TENTHS_MAX: i32 = 20;
pub const PERCENT_MIN: i32 = 0;
pub const PERCENT_MAX: i32 = 100;
pub const SAMPLING_INTERVAL_MIN_SECS: i32 = 5;
pub const SAMPLING_INTERVAL_MAX_SECS: i32 = 3600;
pub const TEMPERATURE_UNIT_CELSIUS: u8 = 0;
pub const TEMPERATURE_UNIT_FAHRENHEIT: u8 = 1;

/// Host-side temperature calibration limit in degrees
pub const CALIBRATION_TEMPERATURE_MAX_CELSIUS: f64 = 2.0;

/// Default wake debounce window
pub const DEFAULT_WAKE_DEBOUNCE_SECS: u64 = 5;

/// Default smoothing time constant
pub const DEFAULT_SMOOTHING_TAU_SECS: f64 = 300.0;

/// Default age after which a silent device counts as unreachable
pub const DEFAULT_STALE_AFTER_SECS: u64 = 7200;
