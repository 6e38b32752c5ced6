use std::io::Read;

use crate::entry::{ENTRY_FRAME_SIZE, EntryId, PackedFileInfo, VarLenHeader};
use crate::error::WireError;
use crate::io::read_exact_or_short;

/// Magic number at the start of every SiLK file.
pub const SILK_MAGIC: [u8; 4] = [0xDE, 0xAD, 0xBE, 0xEF];

/// Size of the fixed header prefix.
pub const FIXED_HEADER_SIZE: usize = 16;

/// Upper bound, in records, on where the end of the header may fall.
pub const MAX_HEADER_RECORDS: usize = 88;

/// Byte order of the record payload, taken from the header's file flags.
///
/// The header itself is always big-endian; only record fields follow
/// this flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

impl ByteOrder {
    /// `0` selects little-endian, anything else big-endian.
    #[must_use]
    pub fn from_file_flags(flags: u8) -> Self {
        if flags == 0 { Self::Little } else { Self::Big }
    }

    #[must_use]
    pub fn file_flags(self) -> u8 {
        match self {
            Self::Little => 0,
            Self::Big => 1,
        }
    }
}

/// Block compression codes.
///
/// ```text
/// ┌──────┬──────────┬─────────────────────────────────┐
/// │ Code │ Variant  │ Block payload                   │
/// ├──────┼──────────┼─────────────────────────────────┤
/// │ 0    │ None     │ raw records, no block frames    │
/// │ 1    │ Zlib     │ zlib container                  │
/// │ 2    │ Lzo      │ LZO1X block                     │
/// │ 3    │ Snappy   │ Snappy raw block                │
/// └──────┴──────────┴─────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Compression {
    None,
    Zlib,
    Lzo,
    Snappy,
}

impl Compression {
    /// Map a header compression code to a codec, `None` for unknown codes.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Zlib),
            2 => Some(Self::Lzo),
            3 => Some(Self::Snappy),
            _ => None,
        }
    }

    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Zlib => 1,
            Self::Lzo => 2,
            Self::Snappy => 3,
        }
    }

    /// Whether the record data is split into framed blocks.
    #[must_use]
    pub fn is_framed(self) -> bool {
        self != Self::None
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Zlib => "zlib",
            Self::Lzo => "lzo",
            Self::Snappy => "snappy",
        }
    }
}

/// SiLK file header.
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────────┐
/// │ Offset │ Size    │ Description                      │
/// ├────────┼─────────┼──────────────────────────────────┤
/// │ 0x00   │ 4 bytes │ Magic 0xDEADBEEF                 │
/// │ 0x04   │ 1 byte  │ File flags (byte order)          │
/// │ 0x05   │ 1 byte  │ Record format                    │
/// │ 0x06   │ 1 byte  │ File version                     │
/// │ 0x07   │ 1 byte  │ Compression                      │
/// │ 0x08   │ 4 bytes │ SiLK version, BE                 │
/// │ 0x0C   │ 2 bytes │ Record size, BE                  │
/// │ 0x0E   │ 2 bytes │ Record version, BE               │
/// │ 0x10   │ ...     │ Variable-length entries          │
/// │        │ ...     │ Padding to a record-size multiple│
/// └────────┴─────────┴──────────────────────────────────┘
/// ```
///
/// `header_length` counts the prefix and every entry but **not** the
/// padding that follows them. After [`parse_header`] returns, the reader
/// sits at `header_length + padding_length`, the first record byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub magic: [u8; 4],
    pub file_flags: u8,
    pub record_format: u8,
    pub file_version: u8,
    pub compression: u8,
    pub silk_version: u32,
    pub record_size: u16,
    pub record_version: u16,
    pub var_headers: Vec<VarLenHeader>,
    pub header_length: usize,
    pub padding_length: usize,
    /// Base date of the file in epoch milliseconds, from entry id 1.
    pub file_date_ms: u64,
    /// Sensor id for the whole file, from entry id 1.
    pub file_sensor: u32,
}

impl Header {
    #[must_use]
    pub fn byte_order(&self) -> ByteOrder {
        ByteOrder::from_file_flags(self.file_flags)
    }

    #[must_use]
    pub fn magic_u32(&self) -> u32 {
        u32::from_be_bytes(self.magic)
    }

    #[must_use]
    pub fn has_silk_magic(&self) -> bool {
        self.magic == SILK_MAGIC
    }

    /// Stream offset of the first record byte.
    #[must_use]
    pub fn data_offset(&self) -> usize {
        self.header_length + self.padding_length
    }

    /// Check the magic number.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidMagic`] if it is not `0xDEADBEEF`.
    pub fn validate_magic(&self) -> Result<(), WireError> {
        if self.has_silk_magic() {
            Ok(())
        } else {
            Err(WireError::InvalidMagic {
                found: self.magic_u32(),
            })
        }
    }
}

/// Parse the file header from the start of `reader`.
///
/// Reads the 16-byte prefix, then the entry chain up to and including the
/// id-0 terminator, then any padding needed to reach a record-size
/// boundary. On success the reader is positioned at the first record.
///
/// # Errors
///
/// - [`WireError::ShortRead`] if the stream ends inside the prefix, an
///   entry, or the padding.
/// - [`WireError::UnsupportedVarHeaderId`] for entry ids above 7.
/// - [`WireError::InvalidEntryLength`] for entry lengths in `1..8`.
/// - [`WireError::ZeroRecordSize`] if the record size is 0.
/// - [`WireError::HeaderBoundaryNotFound`] if the header runs past
///   88 records.
/// - [`WireError::Io`] for reader failures.
pub fn parse_header<R: Read + ?Sized>(reader: &mut R) -> Result<Header, WireError> {
    let mut prefix = [0u8; FIXED_HEADER_SIZE];
    read_exact_or_short(reader, &mut prefix, "fixed header")?;

    let mut header = Header {
        magic: [prefix[0], prefix[1], prefix[2], prefix[3]],
        file_flags: prefix[4],
        record_format: prefix[5],
        file_version: prefix[6],
        compression: prefix[7],
        silk_version: u32::from_be_bytes([prefix[8], prefix[9], prefix[10], prefix[11]]),
        record_size: u16::from_be_bytes([prefix[12], prefix[13]]),
        record_version: u16::from_be_bytes([prefix[14], prefix[15]]),
        var_headers: Vec::new(),
        header_length: 0,
        padding_length: 0,
        file_date_ms: 0,
        file_sensor: 0,
    };

    if header.record_size == 0 {
        return Err(WireError::ZeroRecordSize);
    }

    let mut consumed = FIXED_HEADER_SIZE;
    loop {
        let entry = read_entry(reader)?;
        consumed += entry.wire_size();

        if entry.id == EntryId::PackedFile.wire_id() {
            if let Some(info) = PackedFileInfo::from_content(&entry.content) {
                header.file_date_ms = info.file_date_ms;
                header.file_sensor = info.file_sensor;
            }
        }

        let is_end = entry.id == EntryId::End.wire_id();
        header.var_headers.push(entry);
        if is_end {
            break;
        }
    }

    header.header_length = consumed;
    header.padding_length = padding_for(consumed, header.record_size)?;

    if header.padding_length > 0 {
        let mut padding = vec![0u8; header.padding_length];
        read_exact_or_short(reader, &mut padding, "header padding")?;
    }

    Ok(header)
}

/// Read one id/length frame and its content.
fn read_entry<R: Read + ?Sized>(reader: &mut R) -> Result<VarLenHeader, WireError> {
    let mut frame = [0u8; ENTRY_FRAME_SIZE];
    read_exact_or_short(reader, &mut frame, "variable length header frame")?;

    let id = u32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]);
    let wire_length = u32::from_be_bytes([frame[4], frame[5], frame[6], frame[7]]);
    let length = EntryId::from_wire(id)?.effective_length(wire_length);

    let content_len = match length {
        0 => 0,
        n if (n as usize) < ENTRY_FRAME_SIZE => {
            return Err(WireError::InvalidEntryLength { id, length: n });
        }
        n => n as usize - ENTRY_FRAME_SIZE,
    };

    // The length is untrusted; only buffer what the stream delivers.
    let mut content = Vec::new();
    (&mut *reader)
        .take(content_len as u64)
        .read_to_end(&mut content)?;
    if content.len() < content_len {
        return Err(WireError::ShortRead {
            context: "variable length header content",
            expected: content_len,
            found: content.len(),
        });
    }

    Ok(VarLenHeader {
        id,
        length,
        content,
    })
}

/// Bytes of padding between `consumed` and the next record-size multiple.
///
/// The boundary must fall within [`MAX_HEADER_RECORDS`] records.
fn padding_for(consumed: usize, record_size: u16) -> Result<usize, WireError> {
    let size = usize::from(record_size);
    if consumed % size == 0 {
        return Ok(0);
    }
    (1..=MAX_HEADER_RECORDS)
        .map(|records| records * size)
        .find(|&boundary| boundary >= consumed)
        .map(|boundary| boundary - consumed)
        .ok_or(WireError::HeaderBoundaryNotFound {
            consumed,
            record_size,
        })
}
