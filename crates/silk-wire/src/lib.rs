#![warn(clippy::pedantic)]

pub mod block_frame;
pub mod entry;
pub mod error;
pub mod header;
pub mod io;

pub use block_frame::BlockFrame;
pub use entry::{EntryId, PackedFileInfo, VarLenHeader};
pub use error::WireError;
pub use header::{ByteOrder, Compression, Header, parse_header};
