use std::io::{ErrorKind, Read, Seek, SeekFrom};

use silk_wire::io::read_exact_or_short;
use silk_wire::{BlockFrame, Compression};
use tracing::{debug, trace};

use crate::config::DecoderConfig;
use crate::decompression::decompress_into;
use crate::error::DecodeError;

/// A run of whole records ready for the record decoder.
///
/// `data.len() == records * record_size` always holds.
#[derive(Debug)]
pub struct RecordBlock<'a> {
    pub data: &'a [u8],
    pub records: usize,
}

/// Reads the record area of a SiLK file one block at a time.
///
/// Uncompressed files are read in chunks of the largest whole number of
/// records that fits the configured read size. A read that ends partway
/// through a record seeks back so the partial record is read again with
/// the next chunk.
///
/// Compressed files are read one framed block at a time:
///
/// ```text
///   [compressed_size u32 BE][decompressed_size u32 BE][payload]
///   [compressed_size u32 BE][decompressed_size u32 BE][payload]
///   ... (end of stream at a frame boundary)
/// ```
///
/// Both buffers are owned by the reader, grown as needed and never
/// shrunk.
pub struct BlockReader<R> {
    reader: R,
    compression: Compression,
    record_size: usize,
    chunk_size: usize,
    max_short_reads: u32,
    max_block_size: usize,
    short_reads: u32,
    blocks: u64,
    compressed: Vec<u8>,
    buf: Vec<u8>,
}

impl<R: Read + Seek> BlockReader<R> {
    /// Create a reader over a stream positioned at the first record.
    ///
    /// `record_size` must be non-zero; the header parser guarantees it.
    pub fn new(
        reader: R,
        compression: Compression,
        record_size: u16,
        config: &DecoderConfig,
    ) -> Self {
        let record_size = usize::from(record_size).max(1);
        let chunk_size = (config.read_size / record_size).max(1) * record_size;
        Self {
            reader,
            compression,
            record_size,
            chunk_size,
            max_short_reads: config.max_short_reads,
            max_block_size: config.max_block_size,
            short_reads: 0,
            blocks: 0,
            compressed: Vec::new(),
            buf: Vec::new(),
        }
    }

    /// Size of each uncompressed read, a whole number of records.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Blocks (or uncompressed chunks) produced so far.
    #[must_use]
    pub fn blocks_read(&self) -> u64 {
        self.blocks
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Advance to the next block.
    ///
    /// Returns `Ok(None)` at a clean end of stream.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::ShortRead`] if the stream ends inside a record, a
    ///   block frame, or a compressed payload.
    /// - [`DecodeError::StalledRead`] after too many consecutive short
    ///   reads on an uncompressed file.
    /// - [`DecodeError::BlockTooLarge`] if a frame exceeds the limit.
    /// - [`DecodeError::DecompressionFailure`] if a codec fails.
    /// - [`DecodeError::Io`] for reader failures.
    pub fn next_block(&mut self) -> Result<Option<RecordBlock<'_>>, DecodeError> {
        if self.compression.is_framed() {
            self.next_framed()
        } else {
            self.next_chunk()
        }
    }

    fn next_chunk(&mut self) -> Result<Option<RecordBlock<'_>>, DecodeError> {
        let rs = self.record_size;
        let cap = self.chunk_size;
        if self.buf.len() < cap {
            self.buf.resize(cap, 0);
        }

        let mut filled = 0;
        while filled < rs {
            match self.reader.read(&mut self.buf[filled..cap]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }

        if filled == 0 {
            return Ok(None);
        }
        if filled < rs {
            return Err(DecodeError::ShortRead {
                context: "record",
                expected: rs,
                found: filled,
            });
        }

        if filled < cap {
            self.short_reads += 1;
            debug!(
                filled,
                expected = cap,
                consecutive = self.short_reads,
                "short read"
            );
            if self.short_reads > self.max_short_reads {
                return Err(DecodeError::StalledRead {
                    short_reads: self.short_reads,
                    limit: self.max_short_reads,
                });
            }
        } else {
            self.short_reads = 0;
        }

        let remainder = filled % rs;
        if remainder != 0 {
            #[allow(clippy::cast_possible_wrap)]
            let back = -(remainder as i64);
            self.reader.seek(SeekFrom::Current(back))?;
        }

        let aligned = filled - remainder;
        self.blocks += 1;
        trace!(block = self.blocks, bytes = aligned, "read uncompressed chunk");
        Ok(Some(RecordBlock {
            data: &self.buf[..aligned],
            records: aligned / rs,
        }))
    }

    fn next_framed(&mut self) -> Result<Option<RecordBlock<'_>>, DecodeError> {
        let Some(frame) = BlockFrame::read_from(&mut self.reader)? else {
            return Ok(None);
        };

        let compressed_size = frame.compressed_size as usize;
        let decompressed_size = frame.decompressed_size as usize;
        for size in [compressed_size, decompressed_size] {
            if size > self.max_block_size {
                return Err(DecodeError::BlockTooLarge {
                    size,
                    limit: self.max_block_size,
                });
            }
        }

        if self.compressed.len() < compressed_size {
            self.compressed.resize(compressed_size, 0);
        }
        read_exact_or_short(
            &mut self.reader,
            &mut self.compressed[..compressed_size],
            "compressed block",
        )?;

        decompress_into(
            self.compression,
            &self.compressed[..compressed_size],
            &mut self.buf,
            decompressed_size,
        )?;

        let records = decompressed_size / self.record_size;
        self.blocks += 1;
        trace!(
            block = self.blocks,
            codec = self.compression.name(),
            compressed_size,
            decompressed_size,
            records,
            "decompressed block"
        );
        Ok(Some(RecordBlock {
            data: &self.buf[..records * self.record_size],
            records,
        }))
    }
}
