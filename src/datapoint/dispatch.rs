//! # Datapoint Dispatch Table
//!
//! Maps datapoint identifiers to semantic channels. Two firmware variants report
//! the same sensors under different identifiers; both alias families resolve to the
//! same channel and scale so that correctness never depends on which one a device
//! uses. The family first seen on a device is tracked for diagnostics only.

use crate::constants::*;
use crate::datapoint::encode::SettingParameter;
use crate::datapoint::types::{decode_dp_value, DpValue};
use crate::error::TuyaError;
use crate::zcl::Datapoint;
use log::{debug, info};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Semantic channel a datapoint feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SemanticChannel {
    SoilMoisture,
    Temperature,
    Humidity,
    Battery,
    WaterWarning,
    /// A settable parameter reported back by the device.
    EchoedSetting(SettingParameter),
}

impl SemanticChannel {
    /// Whether the channel carries a percentage (0..=100).
    pub fn is_percent(&self) -> bool {
        matches!(
            self,
            SemanticChannel::SoilMoisture | SemanticChannel::Humidity | SemanticChannel::Battery
        )
    }
}

impl fmt::Display for SemanticChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticChannel::SoilMoisture => write!(f, "soil_moisture"),
            SemanticChannel::Temperature => write!(f, "temperature"),
            SemanticChannel::Humidity => write!(f, "humidity"),
            SemanticChannel::Battery => write!(f, "battery"),
            SemanticChannel::WaterWarning => write!(f, "water_warning"),
            SemanticChannel::EchoedSetting(p) => write!(f, "setting:{p}"),
        }
    }
}

/// Firmware numbering scheme an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SchemeFamily {
    /// Low identifiers (1, 3, 5, 15).
    Standard,
    /// High identifiers (14, 101, 107, 108).
    Extended,
    /// Identifiers common to both schemes.
    Shared,
}

/// Dispatch table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchEntry {
    pub channel: SemanticChannel,
    pub divisor: Option<u32>,
    pub family: SchemeFamily,
}

const fn entry(
    channel: SemanticChannel,
    divisor: Option<u32>,
    family: SchemeFamily,
) -> DispatchEntry {
    DispatchEntry {
        channel,
        divisor,
        family,
    }
}

const fn standard(channel: SemanticChannel, divisor: Option<u32>) -> DispatchEntry {
    entry(channel, divisor, SchemeFamily::Standard)
}

const fn extended(channel: SemanticChannel, divisor: Option<u32>) -> DispatchEntry {
    entry(channel, divisor, SchemeFamily::Extended)
}

const fn shared(channel: SemanticChannel, divisor: Option<u32>) -> DispatchEntry {
    entry(channel, divisor, SchemeFamily::Shared)
}

/// Settings reported back by the device; identifiers are the same in both schemes.
const fn echo(parameter: SettingParameter, divisor: Option<u32>) -> DispatchEntry {
    shared(SemanticChannel::EchoedSetting(parameter), divisor)
}

const DISPATCH_ENTRIES: &[(u8, DispatchEntry)] = &[
    (DP_WATER_WARNING, standard(SemanticChannel::WaterWarning, None)),
    (DP_WATER_WARNING_ALT, extended(SemanticChannel::WaterWarning, None)),
    (DP_SOIL_MOISTURE, standard(SemanticChannel::SoilMoisture, None)),
    (DP_SOIL_MOISTURE_ALT, extended(SemanticChannel::SoilMoisture, None)),
    (DP_TEMPERATURE, standard(SemanticChannel::Temperature, Some(TEMPERATURE_DIVISOR))),
    (DP_TEMPERATURE_ALT, extended(SemanticChannel::Temperature, Some(TEMPERATURE_DIVISOR))),
    (DP_BATTERY, standard(SemanticChannel::Battery, None)),
    (DP_BATTERY_ALT, extended(SemanticChannel::Battery, None)),
    (DP_HUMIDITY, shared(SemanticChannel::Humidity, None)),
    (DP_SOIL_CALIBRATION, echo(SettingParameter::SoilCalibration, None)),
    (
        DP_TEMPERATURE_CALIBRATION,
        echo(SettingParameter::TemperatureCalibration, Some(TEMPERATURE_DIVISOR)),
    ),
    (DP_HUMIDITY_CALIBRATION, echo(SettingParameter::HumidityCalibration, None)),
    (DP_TEMPERATURE_UNIT, echo(SettingParameter::TemperatureUnit, None)),
    (DP_SOIL_WARNING_THRESHOLD, echo(SettingParameter::SoilWarningThreshold, None)),
    (DP_TEMPERATURE_SAMPLING, echo(SettingParameter::TemperatureSamplingInterval, None)),
    (DP_SOIL_SAMPLING, echo(SettingParameter::SoilSamplingInterval, None)),
];

static DISPATCH_TABLE: Lazy<HashMap<u8, DispatchEntry>> =
    Lazy::new(|| DISPATCH_ENTRIES.iter().copied().collect());

/// Looks up the dispatch entry for a datapoint id.
pub fn lookup(dp: u8) -> Option<DispatchEntry> {
    DISPATCH_TABLE.get(&dp).copied()
}

/// All identifiers that resolve to `channel`, in ascending order.
pub fn aliases(channel: SemanticChannel) -> Vec<u8> {
    let mut ids: Vec<u8> = DISPATCH_ENTRIES
        .iter()
        .filter(|(_, e)| e.channel == channel)
        .map(|(id, _)| *id)
        .collect();
    ids.sort_unstable();
    ids
}

/// A datapoint resolved to its channel, with the scaled numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelReading {
    pub dp: u8,
    pub channel: SemanticChannel,
    pub raw: DpValue,
    pub value: f64,
}

/// Decodes and dispatches one entry.
///
/// Unknown identifiers and undecodable payloads are returned as errors so the
/// caller can log and skip the single entry.
pub fn resolve(dp: &Datapoint) -> Result<ChannelReading, TuyaError> {
    let entry = lookup(dp.id).ok_or(TuyaError::UnknownDatapoint(dp.id))?;
    let raw = decode_dp_value(dp)?;
    let value = match entry.divisor {
        Some(divisor) => raw.as_f64() / f64::from(divisor),
        None => raw.as_f64(),
    };
    debug!("dp {} -> {} = {} (raw {})", dp.id, entry.channel, value, raw);
    Ok(ChannelReading {
        dp: dp.id,
        channel: entry.channel,
        raw,
        value,
    })
}

/// Records which alias family a device reports with. Diagnostic only.
#[derive(Debug, Clone, Default)]
pub struct SchemeTracker {
    active: Option<SchemeFamily>,
    first_dp: Option<u8>,
}

impl SchemeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notes an identifier. Returns `true` when this call fixed the active family.
    pub fn observe(&mut self, device_id: &str, dp: u8) -> bool {
        let Some(entry) = lookup(dp) else {
            return false;
        };
        if entry.family == SchemeFamily::Shared {
            return false;
        }
        match self.active {
            None => {
                info!(
                    "Device {device_id}: {:?} datapoint scheme (first seen dp {dp})",
                    entry.family
                );
                self.active = Some(entry.family);
                self.first_dp = Some(dp);
                true
            }
            Some(active) if active != entry.family => {
                debug!(
                    "Device {device_id}: dp {dp} from {:?} scheme while {:?} is active",
                    entry.family, active
                );
                false
            }
            Some(_) => false,
        }
    }

    pub fn active(&self) -> Option<SchemeFamily> {
        self.active
    }

    pub fn first_dp(&self) -> Option<u8> {
        self.first_dp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_families_resolve_alike() {
        for (a, b) in [(1, 14), (3, 107), (5, 101), (15, 108)] {
            let ea = lookup(a).unwrap();
            let eb = lookup(b).unwrap();
            assert_eq!(ea.channel, eb.channel);
            assert_eq!(ea.divisor, eb.divisor);
            assert_ne!(ea.family, eb.family);
        }
    }

    #[test]
    fn test_unknown_dp_is_error() {
        let dp = Datapoint::new(200, 0x02, vec![0, 0, 0, 1]);
        assert!(matches!(resolve(&dp), Err(TuyaError::UnknownDatapoint(200))));
    }

    #[test]
    fn test_aliases_for_temperature() {
        assert_eq!(aliases(SemanticChannel::Temperature), vec![5, 101]);
    }

    #[test]
    fn test_scheme_tracker_keeps_first_family() {
        let mut tracker = SchemeTracker::new();
        assert!(!tracker.observe("dev", DP_HUMIDITY));
        assert!(tracker.observe("dev", DP_SOIL_MOISTURE_ALT));
        assert!(!tracker.observe("dev", DP_SOIL_MOISTURE));
        assert_eq!(tracker.active(), Some(SchemeFamily::Extended));
        assert_eq!(tracker.first_dp(), Some(DP_SOIL_MOISTURE_ALT));
    }
}
