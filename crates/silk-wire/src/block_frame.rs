use std::io::Read;

use crate::error::WireError;
use crate::io::{read_exact_or_short, read_full};

/// Block frame: the 8-byte envelope in front of every compressed block.
///
/// ```text
/// ┌──────────────────────────────────────────────────┐
/// │ compressed_size    (u32 BE)                      │
/// │ decompressed_size  (u32 BE)                      │
/// │ payload            [compressed_size bytes]       │
/// └──────────────────────────────────────────────────┘
/// ```
///
/// Only files with a non-zero compression code are framed. The
/// decompressed payload is a whole number of records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockFrame {
    pub compressed_size: u32,
    pub decompressed_size: u32,
}

impl BlockFrame {
    pub const SIZE: usize = 8;

    /// Decode a frame from its 8 raw bytes.
    #[must_use]
    pub fn from_bytes(raw: [u8; Self::SIZE]) -> Self {
        Self {
            compressed_size: u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]),
            decompressed_size: u32::from_be_bytes([raw[4], raw[5], raw[6], raw[7]]),
        }
    }

    #[must_use]
    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        let mut raw = [0u8; Self::SIZE];
        raw[..4].copy_from_slice(&self.compressed_size.to_be_bytes());
        raw[4..].copy_from_slice(&self.decompressed_size.to_be_bytes());
        raw
    }

    /// Write the frame to `w`. Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Propagates writer failures as [`WireError::Io`].
    pub fn write_to(self, w: &mut impl std::io::Write) -> Result<usize, WireError> {
        w.write_all(&self.to_bytes())?;
        Ok(Self::SIZE)
    }

    /// Read the next frame from `reader`.
    ///
    /// # Returns
    ///
    /// `None` if the stream ends before the first frame byte, which is the
    /// clean end of a framed file.
    ///
    /// # Errors
    ///
    /// - [`WireError::ShortRead`] if the stream ends partway through the
    ///   frame.
    /// - [`WireError::Io`] for reader failures.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Option<Self>, WireError> {
        let mut raw = [0u8; Self::SIZE];
        let n = read_full(reader, &mut raw[..1])?;
        if n == 0 {
            return Ok(None);
        }
        read_exact_or_short(reader, &mut raw[1..], "block frame").map_err(|e| match e {
            WireError::ShortRead {
                context, found, ..
            } => WireError::ShortRead {
                context,
                expected: Self::SIZE,
                found: found + 1,
            },
            other => other,
        })?;
        Ok(Some(Self::from_bytes(raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_big_endian() {
        let frame = BlockFrame::from_bytes([0, 0, 0x01, 0x00, 0, 0, 0x10, 0x00]);
        assert_eq!(frame.compressed_size, 256);
        assert_eq!(frame.decompressed_size, 4096);
    }

    #[test]
    fn write_then_read() {
        let frame = BlockFrame {
            compressed_size: 1234,
            decompressed_size: 56 * 70,
        };
        let mut buf = Vec::new();
        assert_eq!(frame.write_to(&mut buf).unwrap(), 8);
        let mut slice = buf.as_slice();
        assert_eq!(BlockFrame::read_from(&mut slice).unwrap(), Some(frame));
    }

    #[test]
    fn empty_stream_is_clean_end() {
        let mut slice: &[u8] = &[];
        assert_eq!(BlockFrame::read_from(&mut slice).unwrap(), None);
    }

    #[test]
    fn partial_frame_is_short_read() {
        let mut slice: &[u8] = &[0, 0, 1];
        let err = BlockFrame::read_from(&mut slice).unwrap_err();
        assert!(matches!(
            err,
            WireError::ShortRead {
                context: "block frame",
                expected: 8,
                found: 3
            }
        ));
    }
}
