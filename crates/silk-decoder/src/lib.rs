#![warn(clippy::pedantic)]

pub mod block_reader;
pub mod config;
pub mod decoder;
pub mod error;
pub mod record;
pub mod sink;
pub mod streaming;

mod decompression;

pub use config::{DecoderConfig, QueueCapacity};
pub use decoder::{Completion, DecodeSummary, DecodedFile, ResolvedHeader, SilkDecoder};
pub use error::DecodeError;
pub use record::{RecordDecoder, decode_record};
pub use sink::{FlowCollector, FlowCounter, FlowSink, SinkClosed, Take};
pub use streaming::{DecoderEvent, FlowStream};
