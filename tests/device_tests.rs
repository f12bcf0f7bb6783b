//! End-to-end tests for `SoilSensorDevice`: inbound frames, wake handling and
//! configuration writes over the mock transport.

use std::time::{Duration, Instant};
use tuya_dp_rs::datapoint::encode_setting;
use tuya_dp_rs::{
    decode_frame, AttachInfo, BridgeConfig, DeviceSettings, HostCalibration, MockTransport,
    PowerMode, SemanticChannel, SettingParameter, SoilSensorDevice, StateUpdate, TuyaError,
};

const SLEEPY_FIRST: AttachInfo = AttachInfo {
    always_listening: false,
    first_attach: true,
};
const SLEEPY_RESTART: AttachInfo = AttachInfo {
    always_listening: false,
    first_attach: false,
};
const ALWAYS_ON_FIRST: AttachInfo = AttachInfo {
    always_listening: true,
    first_attach: true,
};
const ALWAYS_ON_RESTART: AttachInfo = AttachInfo {
    always_listening: true,
    first_attach: false,
};

/// Builds a report frame with a short header from `(dp, value)` pairs.
fn report(values: &[(u8, i32)]) -> Vec<u8> {
    let mut bytes = vec![0x09, 0x01, 0x02, 0x00, 0x01];
    for &(dp, v) in values {
        bytes.extend_from_slice(&[dp, 0x02, 0x00, 0x04]);
        bytes.extend_from_slice(&v.to_be_bytes());
    }
    bytes
}

fn unsmoothed() -> BridgeConfig {
    BridgeConfig {
        smoothing_tau_secs: 0.0,
        probe_power_on_wake: false,
        ..Default::default()
    }
}

fn device(config: BridgeConfig) -> (SoilSensorDevice<MockTransport>, MockTransport) {
    let transport = MockTransport::new();
    let device = SoilSensorDevice::new(
        "soil-1",
        transport.clone(),
        config,
        DeviceSettings::default(),
        HostCalibration::default(),
    );
    (device, transport)
}

fn channel_value(updates: &[StateUpdate], channel: SemanticChannel) -> Option<f64> {
    updates.iter().find_map(|u| match u {
        StateUpdate::Channel { channel: c, value } if *c == channel => Some(*value),
        _ => None,
    })
}

/// Tests that soil 54 and temperature 253 publish 54 % and 25.3 °C with smoothing disabled.
#[tokio::test]
async fn test_report_frame_publishes_channels() {
    let (mut dev, _transport) = device(unsmoothed());
    dev.attach(SLEEPY_RESTART, Instant::now()).await;

    let updates = dev.on_frame(&report(&[(3, 54), (5, 253)]), Instant::now()).await;

    assert_eq!(channel_value(&updates, SemanticChannel::SoilMoisture), Some(54.0));
    let temp = channel_value(&updates, SemanticChannel::Temperature).unwrap();
    assert!((temp - 25.3).abs() < 1e-9);
    assert!(updates.contains(&StateUpdate::WaterAlarm(false)));
    assert!(updates.contains(&StateUpdate::Reachable(true)));
    assert_eq!(dev.state().soil_moisture, Some(54.0));
    assert_eq!(dev.state().water_alarm, Some(false));
}

/// Tests that the extended identifiers publish the same values as the standard ones.
#[tokio::test]
async fn test_extended_identifiers_publish_alike() {
    let (mut dev, _transport) = device(unsmoothed());
    dev.attach(SLEEPY_RESTART, Instant::now()).await;
    let updates = dev.on_frame(&report(&[(107, 54), (101, 253)]), Instant::now()).await;
    assert_eq!(channel_value(&updates, SemanticChannel::SoilMoisture), Some(54.0));
    assert!(channel_value(&updates, SemanticChannel::Temperature).is_some());
}

/// Tests that unknown identifiers and empty payloads skip only their own entry.
#[tokio::test]
async fn test_bad_entries_do_not_abort_frame() {
    let (mut dev, _transport) = device(unsmoothed());
    dev.attach(SLEEPY_RESTART, Instant::now()).await;

    let mut bytes = vec![0x09, 0x01, 0x02, 0x00, 0x01];
    bytes.extend_from_slice(&[200, 0x02, 0x00, 0x01, 0x07]); // unknown dp
    bytes.extend_from_slice(&[5, 0x02, 0x00, 0x00]); // empty temperature
    bytes.extend_from_slice(&[109, 0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0x3C]);

    let updates = dev.on_frame(&bytes, Instant::now()).await;
    assert_eq!(channel_value(&updates, SemanticChannel::Humidity), Some(60.0));
    assert_eq!(channel_value(&updates, SemanticChannel::Temperature), None);
}

/// Tests that the device-reported water warning is published as is.
#[tokio::test]
async fn test_water_warning_published() {
    let (mut dev, _transport) = device(unsmoothed());
    dev.attach(SLEEPY_RESTART, Instant::now()).await;
    let bytes = [0x09, 0x01, 0x02, 0x00, 0x01, 14, 0x01, 0x00, 0x01, 0x01];
    let updates = dev.on_frame(&bytes, Instant::now()).await;
    assert!(updates.contains(&StateUpdate::WaterWarning(true)));
    assert_eq!(dev.state().water_warning, Some(true));
}

/// Tests that echoed settings are surfaced without touching the settings.
#[tokio::test]
async fn test_setting_echo() {
    let (mut dev, _transport) = device(unsmoothed());
    dev.attach(SLEEPY_RESTART, Instant::now()).await;
    let updates = dev.on_frame(&report(&[(110, 45)]), Instant::now()).await;
    assert!(updates.contains(&StateUpdate::SettingEcho {
        parameter: SettingParameter::SoilWarningThreshold,
        value: 45.0,
    }));
    assert_eq!(dev.settings().soil_warning_threshold, 30.0);
}

/// Tests that a sleepy device is never written to at attach and gets the
/// initialization set on its first wake.
#[tokio::test]
async fn test_sleepy_first_attach_flushes_on_wake() {
    let (mut dev, transport) = device(unsmoothed());
    dev.attach(SLEEPY_FIRST, Instant::now()).await;
    assert_eq!(dev.lifecycle().mode, PowerMode::Sleepy);
    assert!(dev.lifecycle().pending_config_write);
    assert!(transport.sent_frames().is_empty());

    dev.on_frame(&report(&[(3, 40)]), Instant::now()).await;

    let sent = transport.sent_frames();
    assert_eq!(sent.len(), 1);
    assert_eq!(decode_frame(&sent[0]).entries.len(), 7);
    assert!(!dev.lifecycle().pending_config_write);
    assert!(dev.lifecycle().has_completed_first_init);
}

/// Tests that a settings change on a sleepy device waits for the next wake.
#[tokio::test]
async fn test_sleepy_settings_queued_until_wake() {
    let (mut dev, transport) = device(unsmoothed());
    dev.attach(SLEEPY_RESTART, Instant::now()).await;
    let t0 = Instant::now();
    dev.on_announce(t0).await;

    let settings = DeviceSettings {
        soil_sampling_secs: 600.0,
        ..Default::default()
    };
    dev.update_settings(settings).await;
    assert!(transport.sent_frames().is_empty());
    assert!(dev.lifecycle().pending_config_write);

    dev.on_announce(t0 + Duration::from_secs(60)).await;
    let sent = transport.sent_frames();
    assert_eq!(sent.len(), 1);
    let entries = decode_frame(&sent[0]).entries;
    assert_eq!(entries.len(), 7);
    assert_eq!(entries[5].payload, 600i32.to_be_bytes().to_vec());
}

/// Tests that a failed flush is dropped and not retried on the next wake.
#[tokio::test]
async fn test_failed_flush_not_retried() {
    let (mut dev, transport) = device(unsmoothed());
    dev.attach(SLEEPY_FIRST, Instant::now()).await;
    transport.set_fail_sends(true);
    let t0 = Instant::now();
    dev.on_announce(t0).await;
    assert!(!dev.lifecycle().pending_config_write);

    transport.set_fail_sends(false);
    dev.on_announce(t0 + Duration::from_secs(30)).await;
    assert!(transport.sent_frames().is_empty());
}

/// Tests that two wakes two seconds apart produce a single wake transition.
#[tokio::test]
async fn test_wake_debounce() {
    let (mut dev, transport) = device(BridgeConfig {
        smoothing_tau_secs: 0.0,
        ..Default::default()
    });
    transport.set_battery(Some(80));
    dev.attach(SLEEPY_RESTART, Instant::now()).await;

    let t0 = Instant::now();
    let first = dev.on_frame(&report(&[(3, 50)]), t0).await;
    let second = dev.on_frame(&report(&[(3, 51)]), t0 + Duration::from_secs(2)).await;

    assert_eq!(transport.battery_reads(), 1);
    assert_eq!(channel_value(&first, SemanticChannel::Battery), Some(80.0));
    assert!(!second.contains(&StateUpdate::Reachable(true)));
    // Readings inside the window are still processed
    assert_eq!(channel_value(&second, SemanticChannel::SoilMoisture), Some(51.0));
    assert_eq!(dev.lifecycle().last_wake_handled_at, Some(t0));
}

/// Tests that a failed power probe publishes nothing.
#[tokio::test]
async fn test_power_probe_failure_is_silent() {
    let (mut dev, transport) = device(BridgeConfig::default());
    dev.attach(SLEEPY_RESTART, Instant::now()).await;
    let updates = dev.on_announce(Instant::now()).await;
    assert_eq!(transport.battery_reads(), 1);
    assert_eq!(updates, vec![StateUpdate::Reachable(true)]);
    assert_eq!(dev.state().battery, None);
}

/// Tests that an always-on device is initialized exactly once on first attach.
#[tokio::test]
async fn test_always_on_first_attach_sends_init_once() {
    let (mut dev, transport) = device(unsmoothed());
    dev.attach(ALWAYS_ON_FIRST, Instant::now()).await;
    assert_eq!(dev.lifecycle().mode, PowerMode::AlwaysOn);
    assert_eq!(transport.sent_frames().len(), 1);
    assert!(dev.lifecycle().has_completed_first_init);

    dev.attach(ALWAYS_ON_FIRST, Instant::now()).await;
    dev.on_announce(Instant::now()).await;
    assert_eq!(transport.sent_frames().len(), 1);
}

/// Tests that restarting an always-on device sends nothing.
#[tokio::test]
async fn test_always_on_restart_sends_nothing() {
    let (mut dev, transport) = device(unsmoothed());
    dev.attach(ALWAYS_ON_RESTART, Instant::now()).await;
    assert!(transport.sent_frames().is_empty());
    assert!(dev.state().reachable);
}

/// Tests that an always-on device gets only the changed parameters right away.
#[tokio::test]
async fn test_always_on_update_sends_changes_now() {
    let (mut dev, transport) = device(unsmoothed());
    dev.attach(ALWAYS_ON_RESTART, Instant::now()).await;
    dev.update_settings(DeviceSettings {
        soil_warning_threshold: 45.0,
        ..Default::default()
    })
    .await;

    let sent = transport.sent_frames();
    assert_eq!(sent.len(), 1);
    let entries = decode_frame(&sent[0]).entries;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, 110);
    assert_eq!(entries[0].payload, 45i32.to_be_bytes().to_vec());

    // Same settings again: nothing to write
    let unchanged = dev.settings().clone();
    dev.update_settings(unchanged).await;
    assert_eq!(transport.sent_frames().len(), 1);
}

/// Tests that a threshold change recomputes the alarm without waiting for a report.
#[tokio::test]
async fn test_threshold_change_recomputes_alarm() {
    let (mut dev, transport) = device(unsmoothed());
    dev.attach(SLEEPY_RESTART, Instant::now()).await;
    dev.on_frame(&report(&[(3, 54)]), Instant::now()).await;
    assert_eq!(dev.state().water_alarm, Some(false));

    let updates = dev
        .update_settings(DeviceSettings {
            soil_warning_threshold: 70.0,
            ..Default::default()
        })
        .await;
    assert_eq!(updates, vec![StateUpdate::WaterAlarm(true)]);
    assert_eq!(dev.state().water_alarm, Some(true));
    assert!(transport.sent_frames().is_empty());
}

/// Tests that a threshold change before any soil reading publishes no alarm.
#[tokio::test]
async fn test_threshold_change_without_reading() {
    let (mut dev, _transport) = device(unsmoothed());
    dev.attach(SLEEPY_RESTART, Instant::now()).await;
    let updates = dev
        .update_settings(DeviceSettings {
            soil_warning_threshold: 70.0,
            ..Default::default()
        })
        .await;
    assert!(updates.is_empty());
    assert_eq!(dev.state().water_alarm, None);
}

/// Tests that host calibration shifts published values.
#[tokio::test]
async fn test_host_calibration_applied() {
    let (mut dev, _transport) = device(unsmoothed());
    dev.attach(SLEEPY_RESTART, Instant::now()).await;
    dev.set_host_calibration(HostCalibration {
        soil_offset: 5.0,
        ..Default::default()
    });
    let updates = dev.on_frame(&report(&[(3, 54)]), Instant::now()).await;
    assert_eq!(channel_value(&updates, SemanticChannel::SoilMoisture), Some(59.0));
}

/// Tests staleness and the one-shot unreachable transition.
#[tokio::test]
async fn test_stale_device_marked_unreachable() {
    let (mut dev, _transport) = device(unsmoothed());
    dev.attach(SLEEPY_RESTART, Instant::now()).await;
    let t0 = Instant::now();
    assert!(dev.is_stale(t0));

    dev.on_announce(t0).await;
    assert!(!dev.is_stale(t0 + Duration::from_secs(3600)));
    assert_eq!(dev.check_reachability(t0 + Duration::from_secs(3600)), None);

    let later = t0 + Duration::from_secs(7200);
    assert_eq!(dev.check_reachability(later), Some(StateUpdate::Reachable(false)));
    assert_eq!(dev.check_reachability(later), None);
    assert!(!dev.lifecycle().reachable);

    dev.on_announce(later + Duration::from_secs(1)).await;
    assert!(dev.state().reachable);
}

/// Tests that the first-seen numbering scheme is tracked.
#[tokio::test]
async fn test_scheme_tracking() {
    let (mut dev, _transport) = device(unsmoothed());
    dev.attach(SLEEPY_RESTART, Instant::now()).await;
    dev.on_frame(&report(&[(109, 50), (107, 40), (3, 41)]), Instant::now()).await;
    assert_eq!(dev.scheme().first_dp(), Some(107));
}

/// Tests that an always-on device is not reported stale right after attach.
#[tokio::test]
async fn test_always_on_attach_counts_as_seen() {
    let (mut dev, _transport) = device(unsmoothed());
    let t0 = Instant::now();
    dev.attach(ALWAYS_ON_RESTART, t0).await;
    assert_eq!(dev.last_seen(), Some(t0));
    assert_eq!(dev.check_reachability(t0), None);
    assert!(dev.state().reachable);
    assert!(dev.lifecycle().reachable);

    // The window still runs from attach
    let later = t0 + Duration::from_secs(7200);
    assert_eq!(dev.check_reachability(later), Some(StateUpdate::Reachable(false)));
}

/// Tests that a flush the device never acknowledges times out, is dropped and
/// is not sent again on the next wake.
#[tokio::test(start_paused = true)]
async fn test_hung_flush_times_out_and_is_dropped() {
    let (mut dev, transport) = device(unsmoothed());
    dev.attach(SLEEPY_FIRST, Instant::now()).await;
    transport.set_hang_sends(true);

    let started = tokio::time::Instant::now();
    let t0 = Instant::now();
    let updates = dev.on_announce(t0).await;
    assert!(started.elapsed() >= Duration::from_secs(10));
    assert_eq!(updates, vec![StateUpdate::Reachable(true)]);
    assert!(!dev.lifecycle().pending_config_write);
    assert!(dev.lifecycle().has_completed_first_init);

    transport.set_hang_sends(false);
    let updates = dev.on_announce(t0 + Duration::from_secs(30)).await;
    assert_eq!(updates, vec![StateUpdate::Reachable(true)]);
    assert!(transport.sent_frames().is_empty());
}

/// Tests that a direct write to a hung transport reports a timeout.
#[tokio::test(start_paused = true)]
async fn test_send_command_times_out() {
    let (mut dev, transport) = device(unsmoothed());
    dev.attach(ALWAYS_ON_RESTART, Instant::now()).await;
    transport.set_hang_sends(true);

    let entries = [encode_setting(SettingParameter::SoilWarningThreshold, 40.0)];
    let result = dev.send_command(&entries).await;
    assert!(matches!(result, Err(TuyaError::Timeout)));
    assert!(transport.sent_frames().is_empty());
}

/// Tests that a hung power probe publishes nothing and does not block the frame.
#[tokio::test(start_paused = true)]
async fn test_hung_battery_read_is_silent() {
    let (mut dev, transport) = device(BridgeConfig {
        smoothing_tau_secs: 0.0,
        ..Default::default()
    });
    transport.set_battery(Some(80));
    transport.set_hang_battery(true);
    dev.attach(SLEEPY_RESTART, Instant::now()).await;

    let updates = dev.on_frame(&report(&[(3, 54)]), Instant::now()).await;
    assert_eq!(transport.battery_reads(), 1);
    assert_eq!(channel_value(&updates, SemanticChannel::Battery), None);
    assert_eq!(channel_value(&updates, SemanticChannel::SoilMoisture), Some(54.0));
    assert_eq!(dev.state().battery, None);
}

/// Tests that a zero write timeout built in code still waits at least a second.
#[tokio::test(start_paused = true)]
async fn test_zero_write_timeout_waits_one_second() {
    let (mut dev, transport) = device(BridgeConfig {
        write_timeout_secs: 0,
        ..unsmoothed()
    });
    dev.attach(ALWAYS_ON_RESTART, Instant::now()).await;
    transport.set_hang_sends(true);

    let started = tokio::time::Instant::now();
    let result = dev.send_command(&[]).await;
    assert!(matches!(result, Err(TuyaError::Timeout)));
    assert!(started.elapsed() >= Duration::from_secs(1));
}
