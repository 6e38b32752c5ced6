#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: parse_header with arbitrary bytes.
//
// Catches bugs in:
// - Entry chain walking and fixed-length overrides
// - Entry lengths smaller than their frame
// - Padding arithmetic near the 88-record bound
fuzz_target!(|data: &[u8]| {
    let mut reader = data;
    if let Ok(header) = silk_wire::parse_header(&mut reader) {
        assert_eq!(header.data_offset() % usize::from(header.record_size), 0);
        assert_eq!(data.len() - reader.len(), header.data_offset());
    }
});
