//! # Logging Utilities
//!
//! Rate-limited logging and hex frame dumps on top of the `log` facade.
//!
//! ```rust
//! use tuya_dp_rs::util::logging::{log_frame_hex, LogThrottle};
//!
//! let mut throttle = LogThrottle::new(60_000, 5); // 5 messages per minute
//! if throttle.allow() {
//!     log::warn!("unknown datapoint");
//! }
//! log_frame_hex("rx", &[0x09, 0x01, 0x02, 0x00, 0x01]);
//! ```

use std::time::Instant;

/// Longest prefix of a frame that is dumped to the log.
const MAX_LOG_BYTES: usize = 64;

/// Caps the number of messages per time window.
#[derive(Debug)]
pub struct LogThrottle {
    window_ms: u64,
    cap: u32,
    count: u32,
    t0: Instant,
}

impl LogThrottle {
    pub fn new(window_ms: u64, cap: u32) -> Self {
        Self {
            window_ms,
            cap,
            count: 0,
            t0: Instant::now(),
        }
    }

    /// `true` if the message should be logged. The count resets once the window expires.
    pub fn allow(&mut self) -> bool {
        let now = Instant::now();
        let elapsed_ms = u64::try_from(now.duration_since(self.t0).as_millis()).unwrap_or(u64::MAX);

        if elapsed_ms > self.window_ms {
            self.t0 = now;
            self.count = 0;
        }

        self.count = self.count.saturating_add(1);
        self.count <= self.cap
    }

    pub fn reset(&mut self) {
        self.t0 = Instant::now();
        self.count = 0;
    }
}

/// Logs frame bytes in hex at debug level, truncated to 64 bytes.
pub fn log_frame_hex(prefix: &str, data: &[u8]) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    let shown = &data[..data.len().min(MAX_LOG_BYTES)];
    let hex_str = crate::util::hex::format_hex_compact(shown);
    if data.len() > MAX_LOG_BYTES {
        log::debug!("{prefix}: {hex_str} ... ({} bytes total)", data.len());
    } else {
        log::debug!("{prefix}: {hex_str}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_caps_within_window() {
        let mut throttle = LogThrottle::new(60_000, 2);
        assert!(throttle.allow());
        assert!(throttle.allow());
        assert!(!throttle.allow());
        throttle.reset();
        assert!(throttle.allow());
    }
}
