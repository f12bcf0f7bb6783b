//! Host-side calibration offsets applied before smoothing.

use crate::constants::{CALIBRATION_PERCENT_MAX, CALIBRATION_TEMPERATURE_MAX_CELSIUS};
use crate::datapoint::SemanticChannel;
use serde::{Deserialize, Serialize};

/// Signed offsets per sensor channel, in published units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostCalibration {
    pub soil_offset: f64,
    pub humidity_offset: f64,
    pub temperature_offset: f64,
}

impl HostCalibration {
    /// Copy with every offset limited to its valid range (±30 %, ±2.0 °C).
    pub fn clamped(self) -> Self {
        let percent = f64::from(CALIBRATION_PERCENT_MAX);
        HostCalibration {
            soil_offset: clamp_offset(self.soil_offset, percent),
            humidity_offset: clamp_offset(self.humidity_offset, percent),
            temperature_offset: clamp_offset(
                self.temperature_offset,
                CALIBRATION_TEMPERATURE_MAX_CELSIUS,
            ),
        }
    }

    pub fn offset_for(&self, channel: SemanticChannel) -> f64 {
        match channel {
            SemanticChannel::SoilMoisture => self.soil_offset,
            SemanticChannel::Humidity => self.humidity_offset,
            SemanticChannel::Temperature => self.temperature_offset,
            _ => 0.0,
        }
    }
}

fn clamp_offset(offset: f64, limit: f64) -> f64 {
    if offset.is_nan() {
        0.0
    } else {
        offset.clamp(-limit, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_are_range_checked() {
        let cal = HostCalibration {
            soil_offset: 45.0,
            humidity_offset: -31.0,
            temperature_offset: 3.5,
        }
        .clamped();
        assert_eq!(cal.soil_offset, 30.0);
        assert_eq!(cal.humidity_offset, -30.0);
        assert_eq!(cal.temperature_offset, 2.0);
        assert_eq!(cal.offset_for(SemanticChannel::Battery), 0.0);
    }
}
