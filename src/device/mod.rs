//! # Soil Sensor Device
//!
//! `SoilSensorDevice` is the adapter the host calls into for one paired sensor. It
//! owns all per-device state (smoothing memory, lifecycle, published values) from
//! attach until it is dropped on removal.
//!
//! Inbound: `on_frame(bytes)` decodes the frame, resolves each datapoint, runs it
//! through the value pipeline and returns the state updates to publish. Every
//! inbound frame is also a wake event.
//!
//! Outbound: `send_command(entries)` packs entries into a write frame. Writes are
//! fire-and-forget: failures are logged and dropped, never retried.

pub mod lifecycle;
pub mod mock;
pub mod settings;
pub mod state;
pub mod transport;

pub use lifecycle::{
    AttachAction, DeviceLifecycleState, LifecycleCoordinator, PowerMode, WakeAction,
    WriteDecision,
};
pub use mock::MockTransport;
pub use settings::{AttachInfo, BridgeConfig, DeviceSettings};
pub use state::{PublishedState, StateUpdate};
pub use transport::DeviceTransport;

use crate::datapoint::{
    build_write_frame, encode_setting, encode_settings_payload, resolve, ChannelReading,
    SchemeTracker, SemanticChannel,
};
use crate::error::TuyaError;
use crate::pipeline::{compute_water_alarm, HostCalibration, ValuePipeline};
use crate::util::logging::{log_frame_hex, LogThrottle};
use crate::zcl::{decode_frame, Datapoint};
use log::{debug, info, warn};
use std::time::Instant;
use tokio::time::timeout;

/// One attached sensor and everything it owns.
pub struct SoilSensorDevice<T: DeviceTransport> {
    id: String,
    transport: T,
    config: BridgeConfig,
    settings: DeviceSettings,
    lifecycle: LifecycleCoordinator,
    pipeline: ValuePipeline,
    scheme: SchemeTracker,
    state: PublishedState,
    sequence: u8,
    last_seen: Option<Instant>,
    unknown_dp_throttle: LogThrottle,
}

impl<T: DeviceTransport> SoilSensorDevice<T> {
    pub fn new(
        id: impl Into<String>,
        transport: T,
        config: BridgeConfig,
        settings: DeviceSettings,
        calibration: HostCalibration,
    ) -> Self {
        let lifecycle =
            LifecycleCoordinator::new(config.wake_debounce(), config.probe_power_on_wake);
        let pipeline = ValuePipeline::new(config.smoothing_tau_secs, calibration);
        SoilSensorDevice {
            id: id.into(),
            transport,
            config,
            settings,
            lifecycle,
            pipeline,
            scheme: SchemeTracker::new(),
            state: PublishedState::default(),
            sequence: rand::random(),
            last_seen: None,
            unknown_dp_throttle: LogThrottle::new(60_000, 5),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &PublishedState {
        &self.state
    }

    pub fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    pub fn lifecycle(&self) -> &DeviceLifecycleState {
        self.lifecycle.state()
    }

    pub fn scheme(&self) -> &SchemeTracker {
        &self.scheme
    }

    pub fn pipeline(&self) -> &ValuePipeline {
        &self.pipeline
    }

    pub fn last_seen(&self) -> Option<Instant> {
        self.last_seen
    }

    /// Decides the power mode and, for a freshly paired always-on device, sends
    /// the initialization set. Nothing is ever sent to a sleepy device here.
    ///
    /// An always-on device counts as seen at `now`, so the staleness window starts
    /// at attach.
    pub async fn attach(&mut self, info: AttachInfo, now: Instant) -> Vec<StateUpdate> {
        let mut updates = Vec::new();
        if self.lifecycle.mode() == PowerMode::Unknown && info.always_listening {
            self.last_seen = Some(now);
            updates.push(StateUpdate::Reachable(true));
        }

        if self.lifecycle.attach(info) == AttachAction::SendInitialization {
            info!("Device {}: sending initialization settings", self.id);
            self.send_settings_best_effort().await;
            self.lifecycle.initialization_sent();
        }

        self.publish(&updates);
        updates
    }

    /// Processes one inbound frame.
    pub async fn on_frame(&mut self, bytes: &[u8], now: Instant) -> Vec<StateUpdate> {
        log_frame_hex(&format!("Device {} rx", self.id), bytes);
        let frame = decode_frame(bytes);
        self.last_seen = Some(now);
        if let Some(header) = &frame.header {
            if !header.command().carries_values() {
                debug!(
                    "Device {}: {:?} frame with {} datapoints",
                    self.id,
                    header.command(),
                    frame.entries.len()
                );
            }
        }

        let mut updates = self.handle_wake(now).await;

        for dp in &frame.entries {
            self.scheme.observe(&self.id, dp.id);
            match resolve(dp) {
                Ok(reading) => self.apply_reading(reading, now, &mut updates),
                Err(TuyaError::UnknownDatapoint(id)) => {
                    if self.unknown_dp_throttle.allow() {
                        warn!("Device {}: ignoring unknown dp {id}", self.id);
                    }
                }
                Err(e) => warn!("Device {}: skipping dp {}: {e}", self.id, dp.id),
            }
        }

        self.publish(&updates);
        updates
    }

    /// Handles an explicit "device announced" signal.
    pub async fn on_announce(&mut self, now: Instant) -> Vec<StateUpdate> {
        self.last_seen = Some(now);
        let updates = self.handle_wake(now).await;
        self.publish(&updates);
        updates
    }

    /// Applies new host settings: recomputes the alarm at once when the threshold
    /// changed, then sends or queues the write.
    pub async fn update_settings(&mut self, settings: DeviceSettings) -> Vec<StateUpdate> {
        let changed = self.settings.changed_parameters(&settings);
        let threshold_changed =
            self.settings.soil_warning_threshold != settings.soil_warning_threshold;
        self.settings = settings;

        let mut updates = Vec::new();
        if threshold_changed {
            if let Some(soil) = self.pipeline.last_value(SemanticChannel::SoilMoisture) {
                updates.push(StateUpdate::WaterAlarm(compute_water_alarm(
                    soil,
                    self.settings.soil_warning_threshold,
                )));
            }
        }

        if !changed.is_empty() {
            match self.lifecycle.request_config_write() {
                WriteDecision::SendNow => {
                    let entries: Vec<Datapoint> = changed
                        .iter()
                        .map(|&p| encode_setting(p, self.settings.value_of(p)))
                        .collect();
                    self.send_best_effort(&entries).await;
                }
                WriteDecision::Queued => {
                    info!("Device {}: settings queued until next wake", self.id);
                }
            }
        }

        self.publish(&updates);
        updates
    }

    pub fn set_host_calibration(&mut self, calibration: HostCalibration) {
        self.pipeline.set_calibration(calibration);
    }

    /// Packs `entries` into a write frame and sends it.
    pub async fn send_command(&mut self, entries: &[Datapoint]) -> Result<(), TuyaError> {
        self.sequence = self.sequence.wrapping_add(1);
        let frame = build_write_frame(self.sequence, entries);
        log_frame_hex(&format!("Device {} tx", self.id), &frame);
        timeout(self.config.write_timeout(), self.transport.send_frame(&frame))
            .await
            .map_err(|_| TuyaError::Timeout)?
    }

    /// No frame or announcement within the stale window.
    pub fn is_stale(&self, now: Instant) -> bool {
        self.last_seen
            .map_or(true, |seen| now.saturating_duration_since(seen) >= self.config.stale_after())
    }

    /// Publishes `Reachable(false)` once when the device has gone quiet.
    pub fn check_reachability(&mut self, now: Instant) -> Option<StateUpdate> {
        if self.state.reachable && self.is_stale(now) {
            self.lifecycle.mark_unreachable();
            let update = StateUpdate::Reachable(false);
            self.state.apply(&update);
            info!("Device {}: not seen recently, marked unreachable", self.id);
            Some(update)
        } else {
            None
        }
    }

    async fn handle_wake(&mut self, now: Instant) -> Vec<StateUpdate> {
        match self.lifecycle.on_wake(now) {
            WakeAction::Debounced => {
                debug!("Device {}: wake debounced", self.id);
                Vec::new()
            }
            WakeAction::Handled {
                flush_settings,
                probe_power,
            } => {
                let mut updates = vec![StateUpdate::Reachable(true)];
                if flush_settings {
                    info!("Device {}: awake, flushing queued settings", self.id);
                    self.send_settings_best_effort().await;
                    self.lifecycle.settings_flushed();
                }
                if probe_power {
                    if let Some(update) = self.probe_power(now).await {
                        updates.push(update);
                    }
                }
                updates
            }
        }
    }

    async fn probe_power(&mut self, now: Instant) -> Option<StateUpdate> {
        let read = timeout(
            self.config.write_timeout(),
            self.transport.read_battery_percentage(),
        )
        .await;
        match read {
            Ok(Ok(percent)) => {
                let value =
                    self.pipeline
                        .process(SemanticChannel::Battery, f64::from(percent), now);
                Some(StateUpdate::Channel {
                    channel: SemanticChannel::Battery,
                    value,
                })
            }
            Ok(Err(e)) => {
                debug!("Device {}: power probe failed: {e}", self.id);
                None
            }
            Err(_) => {
                debug!("Device {}: power probe timed out", self.id);
                None
            }
        }
    }

    fn apply_reading(
        &mut self,
        reading: ChannelReading,
        now: Instant,
        updates: &mut Vec<StateUpdate>,
    ) {
        match reading.channel {
            SemanticChannel::WaterWarning => {
                updates.push(StateUpdate::WaterWarning(reading.raw.as_bool()));
            }
            SemanticChannel::EchoedSetting(parameter) => {
                debug!("Device {}: device reports {parameter} = {}", self.id, reading.value);
                updates.push(StateUpdate::SettingEcho {
                    parameter,
                    value: reading.value,
                });
            }
            channel => {
                let value = self.pipeline.process(channel, reading.value, now);
                updates.push(StateUpdate::Channel { channel, value });
                if channel == SemanticChannel::SoilMoisture {
                    updates.push(StateUpdate::WaterAlarm(compute_water_alarm(
                        value,
                        self.settings.soil_warning_threshold,
                    )));
                }
            }
        }
    }

    async fn send_settings_best_effort(&mut self) {
        let entries = encode_settings_payload(&self.settings);
        self.send_best_effort(&entries).await;
    }

    async fn send_best_effort(&mut self, entries: &[Datapoint]) {
        if let Err(e) = self.send_command(entries).await {
            warn!(
                "Device {}: write of {} datapoints dropped: {e}",
                self.id,
                entries.len()
            );
        }
    }

    fn publish(&mut self, updates: &[StateUpdate]) {
        for update in updates {
            self.state.apply(update);
        }
    }
}
