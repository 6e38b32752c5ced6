//! Shared helpers for the SiLK integration tests and benches.
//!
//! Every test here builds its input in memory with `silk-fixtures`, so the
//! suite needs no binary fixtures on disk. The one exception is the
//! ignored corpus test, which reads real capture files from
//! `tests/testdata/` when they are present.

use std::io::Cursor;
use std::path::PathBuf;

use silk_decoder::{DecodeError, DecodedFile, DecoderConfig, SilkDecoder};
use silk_fixtures::FileBuilder;
use silk_types::{Flow, RecordKind};
use silk_wire::{ByteOrder, Compression};

pub const KINDS: [RecordKind; 3] = [RecordKind::Packed, RecordKind::Standard, RecordKind::Routed];

pub const ORDERS: [ByteOrder; 2] = [ByteOrder::Little, ByteOrder::Big];

pub const CODECS: [Compression; 4] = [
    Compression::None,
    Compression::Zlib,
    Compression::Lzo,
    Compression::Snappy,
];

/// One point of the layout × byte order × codec grid.
#[derive(Clone, Copy, Debug)]
pub struct Variant {
    pub kind: RecordKind,
    pub order: ByteOrder,
    pub compression: Compression,
}

impl Variant {
    /// A builder configured for this variant.
    #[must_use]
    pub fn builder(self) -> FileBuilder {
        let mut builder = FileBuilder::new(self.kind);
        builder
            .byte_order(self.order)
            .compression(self.compression);
        builder
    }

    /// Encode `flows` as a complete file of this variant.
    ///
    /// # Panics
    ///
    /// Panics if the fixture builder fails.
    #[must_use]
    pub fn build(self, flows: &[Flow]) -> Vec<u8> {
        self.builder()
            .build(flows)
            .unwrap_or_else(|e| panic!("failed to build {self:?}: {e}"))
    }
}

/// Every combination of record shape, byte order and codec.
pub fn variants() -> impl Iterator<Item = Variant> {
    KINDS.into_iter().flat_map(|kind| {
        ORDERS.into_iter().flat_map(move |order| {
            CODECS.into_iter().map(move |compression| Variant {
                kind,
                order,
                compression,
            })
        })
    })
}

/// Decode an in-memory file with the default configuration.
///
/// # Errors
///
/// Any [`DecodeError`] from the decoder.
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedFile, DecodeError> {
    SilkDecoder::decode(Cursor::new(bytes))
}

/// Decode an in-memory file with `config`.
///
/// # Errors
///
/// Any [`DecodeError`] from the decoder.
pub fn decode_bytes_with(bytes: &[u8], config: &DecoderConfig) -> Result<DecodedFile, DecodeError> {
    SilkDecoder::decode_with_config(Cursor::new(bytes), config)
}

/// `tests/testdata/` inside this crate.
#[must_use]
pub fn testdata_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/testdata")
}
