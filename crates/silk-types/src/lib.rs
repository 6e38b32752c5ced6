#![warn(clippy::pedantic)]

pub mod endian;
pub mod error;
pub mod flow;
pub mod layout;

pub use endian::Endian;
pub use error::TypeError;
pub use flow::{Flow, addr_from_bytes, addr_to_bytes};
pub use layout::{RecordKind, RecordLayout, Span, resolve_layout};
