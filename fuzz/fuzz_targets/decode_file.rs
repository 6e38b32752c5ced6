#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use silk_decoder::{DecoderConfig, SilkDecoder};

// Fuzz target: decode a whole file from arbitrary bytes.
//
// Block sizes are capped so a hostile frame cannot ask for 4 GiB.
fuzz_target!(|data: &[u8]| {
    let config = DecoderConfig {
        max_block_size: 1 << 20,
        ..DecoderConfig::default()
    };
    let _ = SilkDecoder::decode_with_config(Cursor::new(data), &config);
});
