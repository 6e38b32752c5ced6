//! Block codecs: zlib through `flate2`, LZO1X through `lzokay`, and
//! Snappy raw blocks through `snap`.

use std::io::Read;

use flate2::read::ZlibDecoder;
use silk_wire::Compression;

use crate::error::DecodeError;

/// Decompress `payload` into `output[..expected]`.
///
/// `output` is grown to at least `expected` bytes and never shrunk, so a
/// decode loop can reuse it across blocks. The codec must produce exactly
/// `expected` bytes.
///
/// # Errors
///
/// [`DecodeError::DecompressionFailure`] if the codec rejects the payload
/// or produces a different number of bytes than the block frame declared.
pub(crate) fn decompress_into(
    compression: Compression,
    payload: &[u8],
    output: &mut Vec<u8>,
    expected: usize,
) -> Result<(), DecodeError> {
    if output.len() < expected {
        output.resize(expected, 0);
    }
    let out = &mut output[..expected];
    let codec = compression.name();

    let written = match compression {
        Compression::None => {
            if payload.len() != expected {
                return Err(size_mismatch(codec, expected, payload.len()));
            }
            out.copy_from_slice(payload);
            expected
        }
        Compression::Zlib => {
            let mut decoder = ZlibDecoder::new(payload);
            decoder.read_exact(out).map_err(|e| failure(codec, e))?;
            let mut extra = [0u8; 1];
            if decoder.read(&mut extra).map_err(|e| failure(codec, e))? != 0 {
                return Err(failure(
                    codec,
                    format!("more than {expected} decompressed bytes"),
                ));
            }
            expected
        }
        Compression::Lzo => lzokay::decompress::decompress(payload, out)
            .map_err(|e| failure(codec, format!("{e:?}")))?,
        Compression::Snappy => {
            let len = snap::raw::decompress_len(payload).map_err(|e| failure(codec, e))?;
            if len != expected {
                return Err(size_mismatch(codec, expected, len));
            }
            snap::raw::Decoder::new()
                .decompress(payload, out)
                .map_err(|e| failure(codec, e))?
        }
    };

    if written != expected {
        return Err(size_mismatch(codec, expected, written));
    }
    Ok(())
}

fn failure(codec: &'static str, reason: impl ToString) -> DecodeError {
    DecodeError::DecompressionFailure {
        codec,
        reason: reason.to_string(),
    }
}

fn size_mismatch(codec: &'static str, expected: usize, found: usize) -> DecodeError {
    failure(
        codec,
        format!("expected {expected} decompressed bytes, got {found}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        (0..56 * 40).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn every_codec_restores_the_block() {
        let data = sample();
        for codec in [
            Compression::None,
            Compression::Zlib,
            Compression::Lzo,
            Compression::Snappy,
        ] {
            let payload = silk_fixtures::compress_block(codec, &data).unwrap();
            let mut out = Vec::new();
            decompress_into(codec, &payload, &mut out, data.len()).unwrap();
            assert_eq!(out, data, "{}", codec.name());
        }
    }

    #[test]
    fn output_buffer_is_reused_without_shrinking() {
        let data = sample();
        let payload = silk_fixtures::compress_block(Compression::Zlib, &data[..560]).unwrap();
        let mut out = vec![0xFF; 4096];
        decompress_into(Compression::Zlib, &payload, &mut out, 560).unwrap();
        assert_eq!(out.len(), 4096);
        assert_eq!(&out[..560], &data[..560]);
    }

    #[test]
    fn declared_size_larger_than_payload_fails() {
        let data = sample();
        for codec in [Compression::Zlib, Compression::Lzo, Compression::Snappy] {
            let payload = silk_fixtures::compress_block(codec, &data).unwrap();
            let mut out = Vec::new();
            let err = decompress_into(codec, &payload, &mut out, data.len() + 56).unwrap_err();
            assert!(
                matches!(err, DecodeError::DecompressionFailure { codec: c, .. } if c == codec.name()),
                "{err}"
            );
        }
    }

    #[test]
    fn declared_size_smaller_than_payload_fails() {
        let data = sample();
        for codec in [Compression::Zlib, Compression::Lzo, Compression::Snappy] {
            let payload = silk_fixtures::compress_block(codec, &data).unwrap();
            let mut out = Vec::new();
            let err = decompress_into(codec, &payload, &mut out, data.len() - 56).unwrap_err();
            assert!(
                matches!(err, DecodeError::DecompressionFailure { codec: c, .. } if c == codec.name()),
                "{err}"
            );
        }
    }

    #[test]
    fn garbage_is_rejected() {
        let garbage = [0xFFu8; 64];
        let mut out = Vec::new();
        for codec in [Compression::Zlib, Compression::Snappy] {
            assert!(matches!(
                decompress_into(codec, &garbage, &mut out, 560),
                Err(DecodeError::DecompressionFailure { .. })
            ));
        }
    }
}
