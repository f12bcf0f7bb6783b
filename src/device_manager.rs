//! # Device Manager
//!
//! This module provides the DeviceManager struct, which serves as the main entry point
//! for a host platform bridging several sensors at once.
//!
//! Each device is an independent `SoilSensorDevice` keyed by its id. Attaching
//! creates its state, removing a device destroys it (smoothing memory and lifecycle
//! included). Frames for one device are processed strictly in the order they are
//! handed in.

use crate::device::{
    AttachInfo, BridgeConfig, DeviceSettings, DeviceTransport, SoilSensorDevice, StateUpdate,
};
use crate::error::TuyaError;
use crate::pipeline::HostCalibration;
use log::info;
use std::collections::HashMap;
use std::time::Instant;

/// Represents a manager for all attached soil sensors.
pub struct DeviceManager<T: DeviceTransport> {
    config: BridgeConfig,
    devices: HashMap<String, SoilSensorDevice<T>>,
}

impl<T: DeviceTransport> DeviceManager<T> {
    /// Creates a new DeviceManager instance.
    pub fn new(config: BridgeConfig) -> Self {
        DeviceManager {
            config,
            devices: HashMap::new(),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Creates the device state and runs the attach path.
    pub async fn attach_device(
        &mut self,
        device_id: &str,
        transport: T,
        info: AttachInfo,
        settings: DeviceSettings,
        calibration: HostCalibration,
        now: Instant,
    ) -> Result<Vec<StateUpdate>, TuyaError> {
        if self.devices.contains_key(device_id) {
            return Err(TuyaError::DeviceAlreadyAttached(device_id.to_string()));
        }

        let mut device = SoilSensorDevice::new(
            device_id,
            transport,
            self.config.clone(),
            settings,
            calibration,
        );
        let updates = device.attach(info, now).await;
        self.devices.insert(device_id.to_string(), device);
        info!("Attached device {device_id}");
        Ok(updates)
    }

    /// Drops the device and all of its state.
    pub fn remove_device(&mut self, device_id: &str) -> Result<(), TuyaError> {
        self.devices
            .remove(device_id)
            .map(|_| info!("Removed device {device_id}"))
            .ok_or_else(|| TuyaError::UnknownDevice(device_id.to_string()))
    }

    /// Routes an inbound frame to its device.
    pub async fn on_frame(
        &mut self,
        device_id: &str,
        bytes: &[u8],
        now: Instant,
    ) -> Result<Vec<StateUpdate>, TuyaError> {
        Ok(self.device_mut(device_id)?.on_frame(bytes, now).await)
    }

    /// Routes a "device announced" signal.
    pub async fn on_announce(
        &mut self,
        device_id: &str,
        now: Instant,
    ) -> Result<Vec<StateUpdate>, TuyaError> {
        Ok(self.device_mut(device_id)?.on_announce(now).await)
    }

    /// Routes a settings change from the host.
    pub async fn update_settings(
        &mut self,
        device_id: &str,
        settings: DeviceSettings,
    ) -> Result<Vec<StateUpdate>, TuyaError> {
        Ok(self.device_mut(device_id)?.update_settings(settings).await)
    }

    /// Marks every device that went quiet as unreachable.
    pub fn check_reachability(&mut self, now: Instant) -> Vec<(String, StateUpdate)> {
        self.devices
            .iter_mut()
            .filter_map(|(id, device)| device.check_reachability(now).map(|u| (id.clone(), u)))
            .collect()
    }

    pub fn device(&self, device_id: &str) -> Option<&SoilSensorDevice<T>> {
        self.devices.get(device_id)
    }

    pub fn device_mut(&mut self, device_id: &str) -> Result<&mut SoilSensorDevice<T>, TuyaError> {
        self.devices
            .get_mut(device_id)
            .ok_or_else(|| TuyaError::UnknownDevice(device_id.to_string()))
    }

    pub fn device_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.devices.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
