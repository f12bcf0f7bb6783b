//! # Value Pipeline
//!
//! Turns a scaled channel reading into the value published to the host:
//!
//! 1. calibration: `calibrated = raw + offset`
//! 2. smoothing: time-weighted EMA against the channel's previous output
//! 3. clamping to the channel's valid range
//!
//! The clamped output is both the published value and the new smoothing state.
//! Nothing in this stage fails; out-of-range input is clamped.

pub mod alarm;
pub mod calibration;
pub mod smoothing;

pub use alarm::compute_water_alarm;
pub use calibration::HostCalibration;
pub use smoothing::{ema_update, SmoothingState};

use crate::constants::{PERCENT_MAX, PERCENT_MIN};
use crate::datapoint::SemanticChannel;
use log::debug;
use std::collections::HashMap;
use std::time::Instant;

/// Clamps to `[0, 100]`. NaN maps to 0.
pub fn clamp_percent(x: f64) -> f64 {
    clamp_range(x, f64::from(PERCENT_MIN), f64::from(PERCENT_MAX))
}

fn clamp_range(x: f64, min: f64, max: f64) -> f64 {
    if x.is_nan() {
        min
    } else {
        x.clamp(min, max)
    }
}

/// Valid published range for a channel, `None` when the device range is trusted.
pub fn valid_range(channel: SemanticChannel) -> Option<(f64, f64)> {
    if channel.is_percent() {
        Some((f64::from(PERCENT_MIN), f64::from(PERCENT_MAX)))
    } else {
        None
    }
}

/// Channels whose readings are EMA-smoothed. Battery is only clamped.
pub fn is_smoothed(channel: SemanticChannel) -> bool {
    matches!(
        channel,
        SemanticChannel::SoilMoisture | SemanticChannel::Temperature | SemanticChannel::Humidity
    )
}

/// Per-device pipeline state. Owns the smoothing memory of every channel.
#[derive(Debug, Clone)]
pub struct ValuePipeline {
    tau_secs: f64,
    calibration: HostCalibration,
    smoothing: HashMap<SemanticChannel, SmoothingState>,
}

impl ValuePipeline {
    pub fn new(tau_secs: f64, calibration: HostCalibration) -> Self {
        ValuePipeline {
            tau_secs: tau_secs.max(0.0),
            calibration: calibration.clamped(),
            smoothing: HashMap::new(),
        }
    }

    pub fn tau_secs(&self) -> f64 {
        self.tau_secs
    }

    pub fn calibration(&self) -> HostCalibration {
        self.calibration
    }

    pub fn set_calibration(&mut self, calibration: HostCalibration) {
        self.calibration = calibration.clamped();
    }

    /// Runs one reading through calibration, smoothing and clamping.
    pub fn process(&mut self, channel: SemanticChannel, raw: f64, now: Instant) -> f64 {
        let calibrated = raw + self.calibration.offset_for(channel);

        let state = self.smoothing.entry(channel).or_default();
        let smoothed = if is_smoothed(channel) {
            state.smooth(calibrated, now, self.tau_secs)
        } else {
            calibrated
        };

        let output = match valid_range(channel) {
            Some((min, max)) => clamp_range(smoothed, min, max),
            None => smoothed,
        };
        state.record(output, now);

        debug!("{channel}: raw={raw} calibrated={calibrated} smoothed={smoothed} out={output}");
        output
    }

    /// Last published value of a channel.
    pub fn last_value(&self, channel: SemanticChannel) -> Option<f64> {
        self.smoothing.get(&channel).and_then(|s| s.last_smoothed)
    }

    pub fn state(&self, channel: SemanticChannel) -> Option<SmoothingState> {
        self.smoothing.get(&channel).copied()
    }

    /// Drops all smoothing memory.
    pub fn reset(&mut self) {
        self.smoothing.clear();
    }
}
