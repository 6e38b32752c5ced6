use std::io::{self, Write};

use flate2::write::ZlibEncoder;
use silk_wire::Compression;

/// Compress one block of record bytes with the codec a header names.
///
/// `Compression::None` returns the input unchanged.
///
/// # Errors
///
/// Codec failures are reported as [`io::Error`].
pub fn compress_block(compression: Compression, data: &[u8]) -> io::Result<Vec<u8>> {
    match compression {
        Compression::None => Ok(data.to_vec()),
        Compression::Zlib => {
            let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data)?;
            encoder.finish()
        }
        Compression::Lzo => lzokay::compress::compress(data)
            .map_err(|e| io::Error::other(format!("lzo compression failed: {e:?}"))),
        Compression::Snappy => snap::raw::Encoder::new()
            .compress_vec(data)
            .map_err(io::Error::other),
    }
}
