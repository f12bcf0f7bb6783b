//! Time-weighted exponential moving average.

use std::time::Instant;

/// One EMA step with decay constant `tau_secs` over `dt_secs` of elapsed time.
///
/// `alpha = 1 - exp(-dt/tau)`. When `tau_secs` or `dt_secs` is not positive the
/// result is exactly `next`.
pub fn ema_update(previous: f64, next: f64, dt_secs: f64, tau_secs: f64) -> f64 {
    if tau_secs <= 0.0 || dt_secs <= 0.0 || !previous.is_finite() {
        return next;
    }
    let alpha = 1.0 - (-dt_secs / tau_secs).exp();
    previous + alpha * (next - previous)
}

/// Per-channel smoothing memory, updated once per inbound reading.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SmoothingState {
    pub last_smoothed: Option<f64>,
    pub last_update: Option<Instant>,
}

impl SmoothingState {
    /// Smooths `next` against the stored value. Does not store the result.
    pub fn smooth(&self, next: f64, now: Instant, tau_secs: f64) -> f64 {
        match (self.last_smoothed, self.last_update) {
            (Some(previous), Some(at)) => {
                let dt = now.saturating_duration_since(at).as_secs_f64();
                ema_update(previous, next, dt, tau_secs)
            }
            _ => next,
        }
    }

    pub fn record(&mut self, value: f64, now: Instant) {
        self.last_smoothed = Some(value);
        self.last_update = Some(now);
    }
}
