/// Implementation of `silk validate`.
///
/// Decodes the whole file and prints a report.
///
/// # Success output
///
/// ```text
/// ✓ Header: valid (record size 88, zlib, Little-endian)
/// ✓ Records: 245340 records in 3834 blocks
/// ✓ End: stream ends on a block boundary
/// ```
///
/// # Failure output
///
/// ```text
/// ✗ Error: unsupported compression code: 9
/// ```
use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result, anyhow};
use silk_decoder::{DecodeError, DecoderConfig, FlowCounter, SilkDecoder};
use silk_wire::Compression;

use crate::ValidateArgs;

/// Run the `silk validate` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or fails any check.
pub fn run(args: &ValidateArgs) -> Result<()> {
    let file =
        File::open(&args.file).with_context(|| format!("cannot open {}", args.file.display()))?;
    let config = DecoderConfig::default().with_validate_magic(args.strict);

    let mut counter = FlowCounter::default();
    match SilkDecoder::decode_into(BufReader::new(file), &mut counter, &config) {
        Ok(summary) => {
            let h = &summary.header;
            let compression =
                Compression::from_code(h.compression).map_or("unknown", Compression::name);
            println!(
                "✓ Header: valid (record size {}, {compression}, {:?}-endian)",
                h.record_size,
                h.byte_order()
            );
            println!(
                "✓ Records: {} record{} in {} blocks",
                counter.count,
                if counter.count == 1 { "" } else { "s" },
                summary.blocks
            );
            println!("✓ End: stream ends on a block boundary");
            Ok(())
        }
        Err(e) => {
            println!("✗ Error: {}", diagnostic(&e));
            Err(anyhow!("validation failed"))
        }
    }
}

fn diagnostic(e: &DecodeError) -> String {
    match e {
        DecodeError::InvalidHeader(inner) => format!("invalid header: {inner}"),
        DecodeError::StalledRead { .. } => format!("{e} (the reader kept returning partial data)"),
        other => other.to_string(),
    }
}
