/// Implementation of `silk inspect`.
///
/// # Output format
///
/// ```text
/// Header: magic=0xDEADBEEF silk=3010001 format=0x0C version=16
///         record size=88 version=2 compression=zlib byte order=Little
///         header length=57 padding=31 data offset=88
///         file date=1434553200000 sensor=3
/// Entries: 3
/// Records: 245340 in 3834 blocks
/// ```
use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use silk_decoder::{DecoderConfig, FlowCounter, SilkDecoder};
use silk_wire::{Compression, VarLenHeader};

use crate::InspectArgs;

/// Run the `silk inspect` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or fails to decode.
pub fn run(args: &InspectArgs) -> Result<()> {
    let file =
        File::open(&args.file).with_context(|| format!("cannot open {}", args.file.display()))?;

    let mut counter = FlowCounter::default();
    let summary =
        SilkDecoder::decode_into(BufReader::new(file), &mut counter, &DecoderConfig::default())
            .with_context(|| format!("failed to decode {}", args.file.display()))?;

    let h = &summary.header;
    let compression = Compression::from_code(h.compression).map_or("unknown", Compression::name);
    println!(
        "Header: magic={:#010X} silk={} format={:#04X} version={}",
        h.magic_u32(),
        h.silk_version,
        h.record_format,
        h.file_version
    );
    println!(
        "        record size={} version={} compression={compression} byte order={:?}",
        h.record_size,
        h.record_version,
        h.byte_order()
    );
    println!(
        "        header length={} padding={} data offset={}",
        h.header_length,
        h.padding_length,
        h.data_offset()
    );
    println!(
        "        file date={} sensor={}",
        h.file_date_ms, h.file_sensor
    );

    println!("Entries: {}", h.var_headers.len());
    if args.entries {
        for (idx, entry) in h.var_headers.iter().enumerate() {
            println!("  {idx}: {}", describe_entry(entry));
        }
    }

    println!("Records: {} in {} blocks", counter.count, summary.blocks);
    Ok(())
}

fn describe_entry(entry: &VarLenHeader) -> String {
    let name = entry.kind().map_or("unknown", |k| k.name());
    let content = if let Some(text) = entry.text() {
        format!("{text:?}")
    } else if entry.content.is_empty() {
        String::new()
    } else {
        let shown = &entry.content[..entry.content.len().min(32)];
        let ellipsis = if entry.content.len() > 32 { "…" } else { "" };
        format!("{}{ellipsis}", hex::encode(shown))
    };
    format!("{name} (id={}, length={}) {content}", entry.id, entry.length)
}
