//! Transport seam between the bridge core and the host's radio stack.

use crate::error::TuyaError;
use async_trait::async_trait;

/// Outbound side of one device's connection.
///
/// Implemented by the host adapter. Inbound frames are pushed into the device
/// with `SoilSensorDevice::on_frame`; this trait only covers what the core sends.
#[async_trait]
pub trait DeviceTransport: Send {
    /// Writes one Tuya cluster frame. Resolves once the transport acknowledged it.
    async fn send_frame(&mut self, frame: &[u8]) -> Result<(), TuyaError>;

    /// Reads the remaining battery percentage from the power configuration cluster.
    ///
    /// The response must be returned here, not routed back through `on_frame`,
    /// so a probe issued while handling a wake never triggers another wake.
    async fn read_battery_percentage(&mut self) -> Result<u8, TuyaError>;
}
