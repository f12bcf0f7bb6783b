//! # Device Lifecycle Coordinator
//!
//! Tracks whether a device is always listening or sleepy, queues configuration
//! writes for sleepy devices until their next wake window, debounces wake signals
//! and runs the one-shot first-pairing initialization.
//!
//! ```text
//!            attach(always_listening)
//!  Unknown ─────────────┬───────────────► AlwaysOn   writes sent immediately
//!                       └───────────────► Sleepy     writes queued until wake
//! ```
//!
//! The mode is decided once per attach and never re-evaluated. Wake debounce is a
//! timestamp comparison made when an event arrives; there is no timer.

use crate::device::settings::AttachInfo;
use log::{debug, info, warn};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Reachability class of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PowerMode {
    Unknown,
    AlwaysOn,
    Sleepy,
}

/// Lifecycle state owned by one device instance.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceLifecycleState {
    pub mode: PowerMode,
    pub pending_config_write: bool,
    pub last_wake_handled_at: Option<Instant>,
    pub has_completed_first_init: bool,
    pub reachable: bool,
}

impl Default for DeviceLifecycleState {
    fn default() -> Self {
        DeviceLifecycleState {
            mode: PowerMode::Unknown,
            pending_config_write: false,
            last_wake_handled_at: None,
            has_completed_first_init: false,
            reachable: false,
        }
    }
}

/// What the attach path must do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachAction {
    /// Send the one-shot initialization set now.
    SendInitialization,
    Nothing,
}

/// Outcome of a configuration write request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteDecision {
    SendNow,
    Queued,
}

/// Outcome of a wake event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeAction {
    /// Inside the debounce window; nothing happened.
    Debounced,
    Handled {
        flush_settings: bool,
        probe_power: bool,
    },
}

#[derive(Debug, Clone)]
pub struct LifecycleCoordinator {
    state: DeviceLifecycleState,
    debounce: Duration,
    probe_power: bool,
}

impl LifecycleCoordinator {
    pub fn new(debounce: Duration, probe_power: bool) -> Self {
        LifecycleCoordinator {
            state: DeviceLifecycleState::default(),
            debounce,
            probe_power,
        }
    }

    pub fn state(&self) -> &DeviceLifecycleState {
        &self.state
    }

    pub fn mode(&self) -> PowerMode {
        self.state.mode
    }

    /// Decides the power mode. Only the first call has any effect.
    pub fn attach(&mut self, info: AttachInfo) -> AttachAction {
        if self.state.mode != PowerMode::Unknown {
            warn!("Attach ignored, mode already {:?}", self.state.mode);
            return AttachAction::Nothing;
        }

        // A restart means initialization already ran when the device was paired
        self.state.has_completed_first_init = !info.first_attach;

        if info.always_listening {
            self.state.mode = PowerMode::AlwaysOn;
            self.state.reachable = true;
            info!("Device attached as always-on (first attach: {})", info.first_attach);
            if self.state.has_completed_first_init {
                AttachAction::Nothing
            } else {
                AttachAction::SendInitialization
            }
        } else {
            self.state.mode = PowerMode::Sleepy;
            info!("Device attached as sleepy (first attach: {})", info.first_attach);
            if !self.state.has_completed_first_init {
                self.state.pending_config_write = true;
            }
            AttachAction::Nothing
        }
    }

    /// Records that the initialization set was sent (or attempted).
    pub fn initialization_sent(&mut self) {
        self.complete_first_init();
    }

    /// Asks whether a configuration write may go out now.
    pub fn request_config_write(&mut self) -> WriteDecision {
        match self.state.mode {
            PowerMode::AlwaysOn => WriteDecision::SendNow,
            PowerMode::Sleepy | PowerMode::Unknown => {
                self.state.pending_config_write = true;
                WriteDecision::Queued
            }
        }
    }

    /// Handles an inbound frame or announcement.
    pub fn on_wake(&mut self, now: Instant) -> WakeAction {
        if let Some(last) = self.state.last_wake_handled_at {
            if now.saturating_duration_since(last) < self.debounce {
                return WakeAction::Debounced;
            }
        }

        self.state.last_wake_handled_at = Some(now);
        if !self.state.reachable {
            debug!("Device reachable again");
        }
        self.state.reachable = true;

        WakeAction::Handled {
            flush_settings: self.state.pending_config_write,
            probe_power: self.probe_power,
        }
    }

    /// Clears the queued write after the settings payload was sent (or attempted).
    pub fn settings_flushed(&mut self) {
        self.state.pending_config_write = false;
        self.complete_first_init();
    }

    pub fn mark_unreachable(&mut self) {
        self.state.reachable = false;
    }

    fn complete_first_init(&mut self) {
        if !self.state.has_completed_first_init {
            self.state.has_completed_first_init = true;
            info!("First initialization completed");
        }
    }
}
