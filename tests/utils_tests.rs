//! Tests for the hex and logging helpers.

use tuya_dp_rs::util::hex::{
    decode_hex, encode_hex, format_hex_compact, parse_hex_lenient, HexError,
};
use tuya_dp_rs::util::logging::{log_frame_hex, LogThrottle};

/// Tests hex encoding and whitespace-tolerant decoding.
#[test]
fn test_hex_helpers() {
    let data = [0x09, 0x01, 0xAB];
    assert_eq!(encode_hex(&data), "0901ab");
    assert_eq!(decode_hex("09 01 AB").unwrap(), data);
    assert_eq!(format_hex_compact(&data), "09 01 ab");
    assert_eq!(parse_hex_lenient("09:01-ab").unwrap(), vec![0x09, 0x01, 0xAB]);
}

/// Tests the hex error cases.
#[test]
fn test_hex_errors() {
    assert_eq!(decode_hex(""), Err(HexError::EmptyString));
    assert_eq!(decode_hex("abc"), Err(HexError::OddLength(3)));
    assert!(matches!(decode_hex("zz"), Err(HexError::DecodeError(_))));
}

/// Tests that the throttle caps messages within a window.
#[test]
fn test_log_throttle_caps() {
    let mut throttle = LogThrottle::new(60_000, 2);
    assert!(throttle.allow());
    assert!(throttle.allow());
    assert!(!throttle.allow());
    throttle.reset();
    assert!(throttle.allow());
}

/// Tests that frame dumps work with and without a logger installed.
#[test]
fn test_log_frame_hex_long_frame() {
    tuya_dp_rs::init_logger();
    log_frame_hex("rx", &[0u8; 100]);
    log_frame_hex("rx", &[]);
}
