//! Edge case integration tests for the SiLK decoder.
//!
//! - **Unsupported shapes**: record sizes other than 56/68/88 and
//!   compression codes above 3 fail while resolving the header, before
//!   any record reaches the sink.
//!
//! - **Truncation**: a file cut inside a record, a block frame or a
//!   compressed payload is an error, never a silently shorter result.
//!
//! - **Stalled input**: a source that keeps returning short reads is
//!   abandoned after the configured number of consecutive short reads.
//!
//! - **Header oddities**: magic checking is opt-in, unknown entry ids
//!   are rejected.

use std::io::{self, Cursor, Read, Seek, SeekFrom};

use silk_decoder::{DecodeError, DecoderConfig, FlowCollector, SilkDecoder};
use silk_fixtures::{FileBuilder, scenario_capture, scenario_flows};
use silk_tests::{decode_bytes, decode_bytes_with};
use silk_types::{RecordKind, TypeError};
use silk_wire::{BlockFrame, Compression, WireError, parse_header};

/// Hands out at most `step` bytes per `read`.
struct Trickle<R> {
    inner: R,
    step: usize,
}

impl<R: Read> Read for Trickle<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.step.min(buf.len());
        self.inner.read(&mut buf[..n])
    }
}

impl<R: Seek> Seek for Trickle<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

// ── Unsupported shapes ────────────────────────────────────────────────────────

#[test]
fn record_size_40_fails_before_any_record() {
    let bytes = FileBuilder::with_record_size(40).build_raw(&[0xAB; 400]).unwrap();
    let mut collector = FlowCollector::new();
    let err = SilkDecoder::decode_into(Cursor::new(bytes), &mut collector, &DecoderConfig::default())
        .unwrap_err();

    assert!(
        matches!(err, DecodeError::Type(TypeError::UnsupportedRecordSize { size: 40 })),
        "got {err:?}"
    );
    assert!(collector.flows().is_empty());
}

#[test]
fn compression_code_9_fails_before_any_record() {
    let bytes = FileBuilder::new(RecordKind::Standard)
        .compression_code(9)
        .build(&scenario_flows(RecordKind::Standard))
        .unwrap();
    let mut collector = FlowCollector::new();
    let err = SilkDecoder::decode_into(Cursor::new(bytes), &mut collector, &DecoderConfig::default())
        .unwrap_err();

    assert!(matches!(err, DecodeError::UnsupportedCompression { code: 9 }));
    assert!(collector.flows().is_empty());
}

// ── Truncation ────────────────────────────────────────────────────────────────

#[test]
fn trailing_partial_record_is_a_short_read() {
    let mut bytes = FileBuilder::new(RecordKind::Standard)
        .build(&scenario_capture(RecordKind::Standard, 8))
        .unwrap();
    bytes.extend_from_slice(&[0; 10]);

    let err = decode_bytes(&bytes).unwrap_err();
    assert!(
        matches!(
            err,
            DecodeError::ShortRead {
                context: "record",
                expected: 68,
                found: 10
            }
        ),
        "got {err:?}"
    );
}

#[test]
fn truncated_compressed_payload_is_a_short_read() {
    for compression in [Compression::Zlib, Compression::Lzo, Compression::Snappy] {
        let mut bytes = FileBuilder::new(RecordKind::Routed)
            .compression(compression)
            .build(&scenario_capture(RecordKind::Routed, 100))
            .unwrap();
        bytes.truncate(bytes.len() - 5);

        let err = decode_bytes(&bytes).unwrap_err();
        assert!(
            matches!(err, DecodeError::ShortRead { .. }),
            "{compression:?}: got {err:?}"
        );
    }
}

#[test]
fn partial_block_frame_is_a_short_read() {
    let mut bytes = FileBuilder::new(RecordKind::Packed)
        .compression(Compression::Snappy)
        .build(&scenario_flows(RecordKind::Packed))
        .unwrap();
    bytes.extend_from_slice(&[0, 0, 0]);

    let err = decode_bytes(&bytes).unwrap_err();
    assert!(
        matches!(
            err,
            DecodeError::ShortRead {
                expected: 8,
                found: 3,
                ..
            }
        ),
        "got {err:?}"
    );
}

#[test]
fn truncated_header_is_invalid() {
    let bytes = FileBuilder::new(RecordKind::Packed).header_bytes();
    let err = decode_bytes(&bytes[..10]).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::InvalidHeader(WireError::ShortRead {
            expected: 16,
            found: 10,
            ..
        })
    ));
}

// ── Block payloads ────────────────────────────────────────────────────────────

#[test]
fn corrupt_zlib_payload_fails_decompression() {
    let mut bytes = FileBuilder::new(RecordKind::Standard)
        .compression(Compression::Zlib)
        .build(&scenario_capture(RecordKind::Standard, 20))
        .unwrap();

    let offset = parse_header(&mut Cursor::new(&bytes)).unwrap().data_offset();
    let raw: [u8; BlockFrame::SIZE] = bytes[offset..offset + BlockFrame::SIZE].try_into().unwrap();
    let frame = BlockFrame::from_bytes(raw);
    let start = offset + BlockFrame::SIZE;
    let end = start + frame.compressed_size as usize;
    bytes[start..end].fill(0xFF);

    let err = decode_bytes(&bytes).unwrap_err();
    assert!(
        matches!(err, DecodeError::DecompressionFailure { codec: "zlib", .. }),
        "got {err:?}"
    );
}

#[test]
fn oversized_block_is_rejected() {
    let bytes = FileBuilder::new(RecordKind::Standard)
        .compression(Compression::Lzo)
        .build(&scenario_capture(RecordKind::Standard, 100))
        .unwrap();
    let config = DecoderConfig {
        max_block_size: 100,
        ..DecoderConfig::default()
    };

    let err = decode_bytes_with(&bytes, &config).unwrap_err();
    assert!(matches!(err, DecodeError::BlockTooLarge { limit: 100, .. }));
}

// ── Stalled input ─────────────────────────────────────────────────────────────

#[test]
fn persistent_short_reads_stall() {
    let bytes = FileBuilder::new(RecordKind::Standard)
        .build(&scenario_capture(RecordKind::Standard, 100))
        .unwrap();
    // two records per read against a 4080-byte chunk
    let reader = Trickle {
        inner: Cursor::new(bytes),
        step: 136,
    };
    let mut collector = FlowCollector::new();
    let err = SilkDecoder::decode_into(reader, &mut collector, &DecoderConfig::default())
        .unwrap_err();

    assert!(
        matches!(
            err,
            DecodeError::StalledRead {
                short_reads: 6,
                limit: 5
            }
        ),
        "got {err:?}"
    );
    assert_eq!(collector.flows().len(), 10);
}

#[test]
fn short_reads_within_limit_are_tolerated() {
    let flows = scenario_capture(RecordKind::Standard, 8);
    let bytes = FileBuilder::new(RecordKind::Standard).build(&flows).unwrap();
    let reader = Trickle {
        inner: Cursor::new(bytes),
        step: 136,
    };
    let mut collector = FlowCollector::new();
    SilkDecoder::decode_into(reader, &mut collector, &DecoderConfig::default()).unwrap();

    assert_eq!(collector.into_flows(), flows);
}

// ── Header oddities ───────────────────────────────────────────────────────────

#[test]
fn magic_is_only_checked_when_asked() {
    let flows = scenario_flows(RecordKind::Packed);
    let bytes = FileBuilder::new(RecordKind::Packed)
        .magic(*b"NOPE")
        .build(&flows)
        .unwrap();

    assert_eq!(decode_bytes(&bytes).unwrap().flows, flows);

    let strict = DecoderConfig::default().with_validate_magic(true);
    let err = decode_bytes_with(&bytes, &strict).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::InvalidHeader(WireError::InvalidMagic { found: 0x4E4F_5045 })
    ));
}

#[test]
fn unknown_entry_id_is_rejected() {
    let mut bytes = FileBuilder::new(RecordKind::Routed).header_bytes();
    bytes.truncate(16);
    bytes.extend_from_slice(&9u32.to_be_bytes());
    bytes.extend_from_slice(&16u32.to_be_bytes());
    bytes.extend_from_slice(&[0; 8]);

    let err = decode_bytes(&bytes).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::InvalidHeader(WireError::UnsupportedVarHeaderId { id: 9 })
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = SilkDecoder::open("does/not/exist.rw").unwrap_err();
    assert!(matches!(err, DecodeError::Io(ref e) if e.kind() == io::ErrorKind::NotFound));
}
