//! Datapoint handling: payload typing, identifier dispatch and command encoding.

pub mod dispatch;
pub mod encode;
pub mod types;

pub use dispatch::{
    lookup, resolve, ChannelReading, DispatchEntry, SchemeFamily, SchemeTracker, SemanticChannel,
};
pub use encode::{
    build_write_frame, encode_setting, encode_settings_payload,
    to_tuya_temperature_calibration_tenths, SettingParameter, TemperatureUnit,
};
pub use types::{decode_dp_value, decode_payload, DpType, DpValue};
