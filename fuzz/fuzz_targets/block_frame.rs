#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: BlockFrame::read_from with arbitrary bytes.
fuzz_target!(|data: &[u8]| {
    let mut reader = data;
    match silk_wire::BlockFrame::read_from(&mut reader) {
        Ok(Some(frame)) => assert_eq!(frame.to_bytes()[..], data[..8]),
        Ok(None) => assert!(data.is_empty()),
        Err(_) => assert!(data.len() < 8),
    }
});
