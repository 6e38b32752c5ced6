use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use silk_types::{Flow, RecordLayout, resolve_layout};
use silk_wire::{Compression, Header, parse_header};
use tracing::debug;

use crate::block_reader::BlockReader;
use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::record::RecordDecoder;
use crate::sink::{FlowCollector, FlowSink};

/// A fully decoded file.
///
/// ```text
/// ┌──────────────────────────────────────────────────┐
/// │ DecodedFile                                      │
/// │   header: Header    ← prefix, entries, padding   │
/// │   flows:  Vec<Flow> ← every record, file order   │
/// └──────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug)]
pub struct DecodedFile {
    pub header: Header,
    pub flows: Vec<Flow>,
}

/// How a decode that did not fail came to an end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// End of stream at a block boundary.
    Finished,
    /// The sink stopped taking flows before the end of the stream.
    ConsumerClosed,
}

/// Outcome of [`SilkDecoder::decode_into`].
#[derive(Clone, Debug)]
pub struct DecodeSummary {
    pub header: Header,
    /// Flows handed to the sink and accepted.
    pub records: u64,
    /// Compressed blocks, or uncompressed chunks, read.
    pub blocks: u64,
    pub completion: Completion,
}

/// Everything resolved from the header before the first record.
#[derive(Clone, Debug)]
pub struct ResolvedHeader {
    pub header: Header,
    pub compression: Compression,
    pub layout: &'static RecordLayout,
}

/// Synchronous SiLK flow file decoder.
///
/// Decoding runs in one sequential loop:
///
///   1. **Header**: parse the fixed prefix, the entry chain and the
///      padding; optionally check the magic number.
///   2. **Resolve**: map the compression code to a codec and the record
///      size to a layout. Unknown values fail here, before any record.
///   3. **Blocks**: read one block (or uncompressed chunk) at a time.
///   4. **Records**: decode each record of the block and hand it to the
///      sink, until end of stream or the sink closes.
///
/// # Example
///
/// ```rust
/// use std::io::Cursor;
///
/// use silk_decoder::SilkDecoder;
/// use silk_fixtures::{FileBuilder, scenario_flows};
/// use silk_types::RecordKind;
///
/// let flows = scenario_flows(RecordKind::Standard);
/// let bytes = FileBuilder::new(RecordKind::Standard).build(&flows).unwrap();
///
/// let decoded = SilkDecoder::decode(Cursor::new(bytes)).unwrap();
/// assert_eq!(decoded.flows, flows);
/// ```
pub struct SilkDecoder;

impl SilkDecoder {
    /// Decode a whole stream into memory with the default configuration.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`]; see [`decode_into`](Self::decode_into).
    pub fn decode<R: Read + Seek>(reader: R) -> Result<DecodedFile, DecodeError> {
        Self::decode_with_config(reader, &DecoderConfig::default())
    }

    /// Decode a whole stream into memory.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`]; see [`decode_into`](Self::decode_into).
    pub fn decode_with_config<R: Read + Seek>(
        reader: R,
        config: &DecoderConfig,
    ) -> Result<DecodedFile, DecodeError> {
        let mut collector = FlowCollector::new();
        let summary = Self::decode_into(reader, &mut collector, config)?;
        Ok(DecodedFile {
            header: summary.header,
            flows: collector.into_flows(),
        })
    }

    /// Open and decode a file with the default configuration.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Io`] if the file cannot be opened, otherwise as
    /// [`decode`](Self::decode).
    pub fn open(path: impl AsRef<Path>) -> Result<DecodedFile, DecodeError> {
        Self::open_with_config(path, &DecoderConfig::default())
    }

    /// Open and decode a file.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Io`] if the file cannot be opened, otherwise as
    /// [`decode_with_config`](Self::decode_with_config).
    pub fn open_with_config(
        path: impl AsRef<Path>,
        config: &DecoderConfig,
    ) -> Result<DecodedFile, DecodeError> {
        let file = File::open(path)?;
        Self::decode_with_config(BufReader::new(file), config)
    }

    /// Parse and resolve the header, leaving `reader` at the first
    /// record.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::InvalidHeader`] if the header is malformed, or the
    ///   magic check is enabled and fails.
    /// - [`DecodeError::UnsupportedCompression`] for codes above 3.
    /// - [`DecodeError::Type`] for record sizes other than 56, 68, 88.
    /// - [`DecodeError::Io`] for reader failures.
    pub fn read_header<R: Read + ?Sized>(
        reader: &mut R,
        config: &DecoderConfig,
    ) -> Result<ResolvedHeader, DecodeError> {
        let header = parse_header(reader).map_err(DecodeError::from_header)?;
        if config.validate_magic {
            header.validate_magic().map_err(DecodeError::InvalidHeader)?;
        }
        let compression =
            Compression::from_code(header.compression).ok_or(DecodeError::UnsupportedCompression {
                code: header.compression,
            })?;
        let layout = resolve_layout(header.record_size)?;

        debug!(
            record_size = header.record_size,
            compression = compression.name(),
            byte_order = ?header.byte_order(),
            header_length = header.header_length,
            padding = header.padding_length,
            entries = header.var_headers.len(),
            "resolved header"
        );

        Ok(ResolvedHeader {
            header,
            compression,
            layout,
        })
    }

    /// Decode `reader` into `sink`. Both the eager and the streaming entry
    /// points run on this loop.
    ///
    /// Stops at end of stream ([`Completion::Finished`]) or when the sink
    /// returns [`SinkClosed`](crate::SinkClosed)
    /// ([`Completion::ConsumerClosed`]). The sink's `finish` runs in both
    /// cases but not after an error.
    ///
    /// # Errors
    ///
    /// Everything [`read_header`](Self::read_header) reports, plus:
    /// - [`DecodeError::ShortRead`] if the stream ends inside a record or
    ///   block.
    /// - [`DecodeError::StalledRead`] after too many short reads.
    /// - [`DecodeError::BlockTooLarge`] if a block frame exceeds the limit.
    /// - [`DecodeError::DecompressionFailure`] if a codec fails.
    pub fn decode_into<R, S>(
        mut reader: R,
        mut sink: S,
        config: &DecoderConfig,
    ) -> Result<DecodeSummary, DecodeError>
    where
        R: Read + Seek,
        S: FlowSink,
    {
        let resolved = Self::read_header(&mut reader, config)?;
        let header = resolved.header;
        let records = RecordDecoder::new(
            resolved.layout,
            header.byte_order(),
            header.file_date_ms,
            header.file_sensor,
        );
        let record_size = resolved.layout.record_size();

        let mut summary = DecodeSummary {
            header,
            records: 0,
            blocks: 0,
            completion: Completion::Finished,
        };

        if sink.begin(&summary.header).is_err() {
            summary.completion = Completion::ConsumerClosed;
        } else {
            let mut blocks = BlockReader::new(
                reader,
                resolved.compression,
                summary.header.record_size,
                config,
            );
            'blocks: while let Some(block) = blocks.next_block()? {
                for raw in block.data.chunks_exact(record_size) {
                    if sink.accept(records.decode(raw)).is_err() {
                        summary.completion = Completion::ConsumerClosed;
                        break 'blocks;
                    }
                    summary.records += 1;
                }
            }
            summary.blocks = blocks.blocks_read();
        }

        match summary.completion {
            Completion::Finished => debug!(
                records = summary.records,
                blocks = summary.blocks,
                "decode finished"
            ),
            Completion::ConsumerClosed => debug!(
                records = summary.records,
                blocks = summary.blocks,
                "consumer closed, decode stopped"
            ),
        }
        sink.finish();
        Ok(summary)
    }
}
