//! Values exposed to the host platform.

use crate::datapoint::{SemanticChannel, SettingParameter};
use serde::Serialize;

/// One change to publish.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StateUpdate {
    /// Pipeline output for a numeric channel.
    Channel { channel: SemanticChannel, value: f64 },
    /// Water warning reported by the device itself.
    WaterWarning(bool),
    /// Alarm derived from soil moisture and the warning threshold.
    WaterAlarm(bool),
    Reachable(bool),
    /// A setting reported back by the device. Diagnostic only.
    SettingEcho { parameter: SettingParameter, value: f64 },
}

/// Latest published values of one device.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PublishedState {
    pub soil_moisture: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub battery: Option<f64>,
    pub water_warning: Option<bool>,
    pub water_alarm: Option<bool>,
    pub reachable: bool,
}

impl PublishedState {
    pub fn apply(&mut self, update: &StateUpdate) {
        match *update {
            StateUpdate::Channel { channel, value } => match channel {
                SemanticChannel::SoilMoisture => self.soil_moisture = Some(value),
                SemanticChannel::Temperature => self.temperature = Some(value),
                SemanticChannel::Humidity => self.humidity = Some(value),
                SemanticChannel::Battery => self.battery = Some(value),
                SemanticChannel::WaterWarning | SemanticChannel::EchoedSetting(_) => {}
            },
            StateUpdate::WaterWarning(on) => self.water_warning = Some(on),
            StateUpdate::WaterAlarm(on) => self.water_alarm = Some(on),
            StateUpdate::Reachable(on) => self.reachable = on,
            StateUpdate::SettingEcho { .. } => {}
        }
    }

    pub fn channel_value(&self, channel: SemanticChannel) -> Option<f64> {
        match channel {
            SemanticChannel::SoilMoisture => self.soil_moisture,
            SemanticChannel::Temperature => self.temperature,
            SemanticChannel::Humidity => self.humidity,
            SemanticChannel::Battery => self.battery,
            SemanticChannel::WaterWarning | SemanticChannel::EchoedSetting(_) => None,
        }
    }
}
