use std::io::{ErrorKind, Read};

use crate::error::WireError;

/// Fill `buf` from `reader`, looping over partial reads until the buffer
/// is full or the reader reports end of stream.
///
/// Returns the number of bytes placed in `buf`. Anything less than
/// `buf.len()` means the stream ended first; callers decide whether that
/// is a clean boundary or a truncated structure.
///
/// # Errors
///
/// Propagates any I/O error other than `Interrupted`.
pub fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Like [`read_full`], but treats anything short of a full buffer as
/// [`WireError::ShortRead`].
///
/// # Errors
///
/// - [`WireError::ShortRead`] if the stream ended before `buf` was full.
/// - [`WireError::Io`] for reader failures.
pub fn read_exact_or_short<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
    context: &'static str,
) -> Result<(), WireError> {
    let found = read_full(reader, buf)?;
    if found < buf.len() {
        return Err(WireError::ShortRead {
            context,
            expected: buf.len(),
            found,
        });
    }
    Ok(())
}
