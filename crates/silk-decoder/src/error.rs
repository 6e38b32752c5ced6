use silk_types::TypeError;
use silk_wire::WireError;

/// Errors that can occur while decoding a SiLK file.
///
/// Every error is terminal for the stream being decoded. A consumer that
/// goes away mid-decode is not an error; see
/// [`Completion::ConsumerClosed`](crate::Completion::ConsumerClosed).
///
/// Error hierarchy:
///
/// ```text
///   DecodeError
///   ├── InvalidHeader(WireError)   ← prefix, entry chain, padding or magic
///   ├── ShortRead                  ← stream ended inside a record or block
///   ├── StalledRead                ← too many consecutive short reads
///   ├── UnsupportedCompression     ← compression code outside 0..=3
///   ├── DecompressionFailure       ← codec rejected a block
///   ├── BlockTooLarge              ← block frame exceeds the size limit
///   ├── Type(TypeError)            ← unsupported record size
///   ├── Wire(WireError)            ← from silk-wire outside the header
///   ├── Io(std::io::Error)         ← from the underlying reader
///   └── TaskFailed(JoinError)      ← streaming worker panicked
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The file header could not be parsed.
    ///
    /// I/O failures while reading the header are reported as
    /// [`DecodeError::Io`] instead.
    #[error("invalid header: {0}")]
    InvalidHeader(WireError),

    /// The stream ended partway through a record or a compressed block.
    #[error("short read in {context}: expected {expected} bytes, got {found}")]
    ShortRead {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    /// The reader kept returning less than a full buffer.
    #[error("read stalled after {short_reads} consecutive short reads (limit {limit})")]
    StalledRead { short_reads: u32, limit: u32 },

    /// The header named a compression code with no known codec.
    #[error("unsupported compression code: {code}")]
    UnsupportedCompression { code: u8 },

    /// A codec failed on a block, or produced fewer bytes than the block
    /// frame declared.
    #[error("{codec} decompression failed: {reason}")]
    DecompressionFailure { codec: &'static str, reason: String },

    /// A block frame declared a size above the configured limit.
    #[error("block too large: {size} bytes (limit {limit})")]
    BlockTooLarge { size: usize, limit: usize },

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Wire(WireError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The blocking task running a streaming decode did not complete.
    #[error("decode task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

impl DecodeError {
    /// Lift a header parsing failure, keeping reader I/O errors as
    /// [`DecodeError::Io`].
    pub(crate) fn from_header(err: WireError) -> Self {
        match err {
            WireError::Io(io) => Self::Io(io),
            other => Self::InvalidHeader(other),
        }
    }
}

impl From<WireError> for DecodeError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::ShortRead {
                context,
                expected,
                found,
            } => Self::ShortRead {
                context,
                expected,
                found,
            },
            WireError::Io(io) => Self::Io(io),
            other => Self::Wire(other),
        }
    }
}
