//! In-memory transport for tests and the CLI.
//!
//! Clones share the same buffers, so a test can keep a handle while the device
//! owns another.

use crate::device::transport::DeviceTransport;
use crate::error::TuyaError;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MockInner {
    sent_frames: Vec<Vec<u8>>,
    fail_sends: bool,
    hang_sends: bool,
    hang_battery: bool,
    battery: Option<u8>,
    battery_reads: usize,
}

/// Transport that records every frame written to it.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockInner>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Frames written so far, oldest first.
    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.lock().sent_frames.clone()
    }

    pub fn clear(&self) {
        self.lock().sent_frames.clear();
    }

    /// Makes subsequent sends fail as if the device were asleep.
    pub fn set_fail_sends(&self, fail: bool) {
        self.lock().fail_sends = fail;
    }

    /// Makes subsequent sends never complete, like a write nobody acknowledges.
    pub fn set_hang_sends(&self, hang: bool) {
        self.lock().hang_sends = hang;
    }

    /// Makes subsequent battery reads never complete.
    pub fn set_hang_battery(&self, hang: bool) {
        self.lock().hang_battery = hang;
    }

    /// Battery level answered by probes; `None` makes probes fail.
    pub fn set_battery(&self, percent: Option<u8>) {
        self.lock().battery = percent;
    }

    pub fn battery_reads(&self) -> usize {
        self.lock().battery_reads
    }
}

#[async_trait]
impl DeviceTransport for MockTransport {
    async fn send_frame(&mut self, frame: &[u8]) -> Result<(), TuyaError> {
        let hang = self.lock().hang_sends;
        if hang {
            std::future::pending::<()>().await;
        }
        let mut inner = self.lock();
        if inner.fail_sends {
            return Err(TuyaError::TransportError("device not responding".to_string()));
        }
        inner.sent_frames.push(frame.to_vec());
        Ok(())
    }

    async fn read_battery_percentage(&mut self) -> Result<u8, TuyaError> {
        let hang = {
            let mut inner = self.lock();
            inner.battery_reads += 1;
            inner.hang_battery
        };
        if hang {
            std::future::pending::<()>().await;
        }
        self.lock()
            .battery
            .ok_or_else(|| TuyaError::TransportError("power read timed out".to_string()))
    }
}
