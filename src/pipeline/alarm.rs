//! Water-shortage alarm derived from smoothed soil moisture.

/// `true` when soil moisture is strictly below the threshold.
///
/// There is no hysteresis; a value equal to the threshold does not alarm.
pub fn compute_water_alarm(smoothed_soil_percent: f64, threshold_percent: f64) -> bool {
    smoothed_soil_percent < threshold_percent
}
