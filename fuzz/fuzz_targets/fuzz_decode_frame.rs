#![no_main]

use libfuzzer_sys::fuzz_target;
use tuya_dp_rs::zcl::{decode_frame, encode_frame};
use tuya_dp_rs::decode_readings;

fuzz_target!(|data: &[u8]| {
    // Decoding must accept any input without panicking
    let frame = decode_frame(data);
    let _ = decode_readings(data);

    // Whatever was decoded packs back to entries that decode identically
    if let Some(header) = frame.header {
        let packed = encode_frame(&header, &frame.entries);
        assert_eq!(decode_frame(&packed).entries, frame.entries);
    }
});
