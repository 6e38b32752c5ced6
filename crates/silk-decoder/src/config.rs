/// Decoder settings.
///
/// ```text
/// ┌─────────────────┬────────────────┬─────────────────────────────────────┐
/// │ Field           │ Default        │ Purpose                             │
/// ├─────────────────┼────────────────┼─────────────────────────────────────┤
/// │ read_size       │ 4096           │ chunk target for uncompressed files │
/// │ max_short_reads │ 5              │ consecutive short reads tolerated   │
/// │ max_block_size  │ 64 MiB         │ cap on compressed block frames      │
/// │ validate_magic  │ false          │ reject files not starting 0xDEADBEEF│
/// │ queue           │ Bounded(1024)  │ streaming queue capacity            │
/// └─────────────────┴────────────────┴─────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Target size of each read on an uncompressed file. Rounded down to
    /// a whole number of records, and never below one record.
    pub read_size: usize,

    /// How many reads in a row may come back short (less than the read
    /// buffer but at least one record) before decoding gives up.
    pub max_short_reads: u32,

    /// Largest compressed or decompressed block size accepted from a
    /// block frame.
    pub max_block_size: usize,

    /// Check the magic number. SiLK files written by other tools do not
    /// always carry it, so this is off by default.
    pub validate_magic: bool,

    /// Capacity of the queue between the decode task and a
    /// [`FlowStream`](crate::FlowStream) consumer.
    pub queue: QueueCapacity,
}

pub const DEFAULT_READ_SIZE: usize = 4096;
pub const DEFAULT_MAX_SHORT_READS: u32 = 5;
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 64 * 1024 * 1024;
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            read_size: DEFAULT_READ_SIZE,
            max_short_reads: DEFAULT_MAX_SHORT_READS,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            validate_magic: false,
            queue: QueueCapacity::default(),
        }
    }
}

impl DecoderConfig {
    #[must_use]
    pub fn with_queue(mut self, queue: QueueCapacity) -> Self {
        self.queue = queue;
        self
    }

    #[must_use]
    pub fn with_validate_magic(mut self, validate: bool) -> Self {
        self.validate_magic = validate;
        self
    }

    #[must_use]
    pub fn with_read_size(mut self, read_size: usize) -> Self {
        self.read_size = read_size;
        self
    }
}

/// Capacity of the streaming queue.
///
/// A bounded queue blocks the decode task while the consumer lags
/// behind; an unbounded one never blocks and grows instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueCapacity {
    Bounded(usize),
    Unbounded,
}

impl Default for QueueCapacity {
    fn default() -> Self {
        Self::Bounded(DEFAULT_QUEUE_CAPACITY)
    }
}
