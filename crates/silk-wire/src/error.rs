/// Errors raised while reading the wire-level structures of a SiLK file:
/// the fixed header prefix, the chained variable-length entries, the
/// header padding, and the 8-byte frame in front of compressed blocks.
///
/// ```text
///   WireError
///   ├── ShortRead               ← stream ended inside a fixed-size structure
///   ├── UnsupportedVarHeaderId  ← entry id outside 0..=7
///   ├── InvalidEntryLength      ← entry length smaller than its own frame
///   ├── ZeroRecordSize          ← header declares 0-byte records
///   ├── HeaderBoundaryNotFound  ← no record-size multiple within 88 records
///   ├── InvalidMagic            ← magic check requested and failed
///   └── Io(std::io::Error)      ← from the underlying reader
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The stream returned fewer bytes than the structure requires.
    #[error("short read in {context}: expected {expected} bytes, got {found}")]
    ShortRead {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    /// A variable-length header entry carried an id this decoder does
    /// not know how to size.
    #[error("unsupported variable length header id: {id}")]
    UnsupportedVarHeaderId { id: u32 },

    /// An entry length was non-zero but too small to cover the 8-byte
    /// id/length frame it is measured from.
    #[error("variable length header id {id} has invalid length {length}")]
    InvalidEntryLength { id: u32, length: u32 },

    /// The header declared a record size of zero, so no record boundary
    /// can be computed.
    #[error("header declares a record size of 0")]
    ZeroRecordSize,

    /// No multiple of the record size within the search bound covers the
    /// header bytes consumed so far.
    #[error("failed to find end of header: {consumed} bytes consumed, record size {record_size}")]
    HeaderBoundaryNotFound { consumed: usize, record_size: u16 },

    /// The magic number did not match `0xDEADBEEF`.
    #[error("invalid magic number: expected 0xDEADBEEF, got {found:#010X}")]
    InvalidMagic { found: u32 },

    /// I/O error from the byte source.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
