//! # Device Settings and Bridge Configuration
//!
//! `DeviceSettings` are the per-device values persisted by the host and written to
//! the sensor firmware. `BridgeConfig` holds the tunables of the bridge itself.
//! Both are loaded from JSON with `serde_json`; missing fields take defaults.

use crate::constants::{
    DEFAULT_SMOOTHING_TAU_SECS, DEFAULT_STALE_AFTER_SECS, DEFAULT_WAKE_DEBOUNCE_SECS,
};
use crate::datapoint::{SettingParameter, TemperatureUnit};
use crate::error::TuyaError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Settings written to the sensor, in user-facing units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Degrees Celsius, ±2.0
    pub temperature_calibration: f64,
    /// Percent, ±30
    pub humidity_calibration: f64,
    /// Percent, ±30
    pub soil_calibration: f64,
    /// Percent, 0..100
    pub soil_warning_threshold: f64,
    /// Seconds, 5..3600
    pub temperature_sampling_secs: f64,
    /// Seconds, 5..3600
    pub soil_sampling_secs: f64,
    pub temperature_unit: TemperatureUnit,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        DeviceSettings {
            temperature_calibration: 0.0,
            humidity_calibration: 0.0,
            soil_calibration: 0.0,
            soil_warning_threshold: 30.0,
            temperature_sampling_secs: 1800.0,
            soil_sampling_secs: 1800.0,
            temperature_unit: TemperatureUnit::Celsius,
        }
    }
}

impl DeviceSettings {
    pub fn from_json_str(json: &str) -> Result<Self, TuyaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TuyaError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// User-facing value of one parameter.
    pub fn value_of(&self, parameter: SettingParameter) -> f64 {
        match parameter {
            SettingParameter::TemperatureCalibration => self.temperature_calibration,
            SettingParameter::HumidityCalibration => self.humidity_calibration,
            SettingParameter::SoilCalibration => self.soil_calibration,
            SettingParameter::SoilWarningThreshold => self.soil_warning_threshold,
            SettingParameter::TemperatureSamplingInterval => self.temperature_sampling_secs,
            SettingParameter::SoilSamplingInterval => self.soil_sampling_secs,
            SettingParameter::TemperatureUnit => f64::from(self.temperature_unit.wire_value()),
        }
    }

    /// Parameters whose wire value differs between `self` and `other`.
    pub fn changed_parameters(&self, other: &DeviceSettings) -> Vec<SettingParameter> {
        SettingParameter::ALL
            .iter()
            .copied()
            .filter(|&p| p.to_wire(self.value_of(p)) != p.to_wire(other.value_of(p)))
            .collect()
    }
}

/// Bridge tunables shared by all devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// EMA time constant; 0 disables smoothing.
    pub smoothing_tau_secs: f64,
    pub wake_debounce_secs: u64,
    pub stale_after_secs: u64,
    pub write_timeout_secs: u64,
    /// Read the power level on each handled wake.
    pub probe_power_on_wake: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            smoothing_tau_secs: DEFAULT_SMOOTHING_TAU_SECS,
            wake_debounce_secs: DEFAULT_WAKE_DEBOUNCE_SECS,
            stale_after_secs: DEFAULT_STALE_AFTER_SECS,
            write_timeout_secs: 10,
            probe_power_on_wake: true,
        }
    }
}

impl BridgeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, TuyaError> {
        let config: BridgeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TuyaError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), TuyaError> {
        if !self.smoothing_tau_secs.is_finite() || self.smoothing_tau_secs < 0.0 {
            return Err(TuyaError::ConfigError(format!(
                "smoothing_tau_secs must be a non-negative number, got {}",
                self.smoothing_tau_secs
            )));
        }
        if self.write_timeout_secs == 0 {
            return Err(TuyaError::ConfigError(
                "write_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn wake_debounce(&self) -> Duration {
        Duration::from_secs(self.wake_debounce_secs)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    /// Bound on one transport write or probe, never below one second.
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs.max(1))
    }
}

/// Facts the host supplies when a device is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttachInfo {
    /// Transport reports the receiver as always on.
    pub always_listening: bool,
    /// First attach after pairing, as opposed to a restart.
    pub first_attach: bool,
}
