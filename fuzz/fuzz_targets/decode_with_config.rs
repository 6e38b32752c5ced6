#![no_main]

use std::io::Cursor;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use silk_decoder::{DecoderConfig, FlowCounter, SilkDecoder};

#[derive(Debug, Arbitrary)]
struct Input {
    read_size: u16,
    max_short_reads: u8,
    data: Vec<u8>,
}

// Fuzz target: decode with arbitrary read sizes and short-read limits.
//
// Any successful decode must account for every record it handed out.
fuzz_target!(|input: Input| {
    let config = DecoderConfig {
        read_size: usize::from(input.read_size),
        max_short_reads: u32::from(input.max_short_reads),
        max_block_size: 1 << 20,
        ..DecoderConfig::default()
    };
    let mut counter = FlowCounter::default();
    if let Ok(summary) =
        SilkDecoder::decode_into(Cursor::new(&input.data), &mut counter, &config)
    {
        assert_eq!(summary.records, counter.count);
    }
});
