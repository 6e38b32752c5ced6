use silk_wire::ByteOrder;

/// Integer readers for one byte order.
///
/// The record decoder holds a single `&Endian` and reads every multi-byte
/// field through it, so one code path serves both little- and big-endian
/// files.
#[derive(Clone, Copy, Debug)]
pub struct Endian {
    pub order: ByteOrder,
    u16: fn([u8; 2]) -> u16,
    u32: fn([u8; 4]) -> u32,
    u64: fn([u8; 8]) -> u64,
}

pub const LITTLE: Endian = Endian {
    order: ByteOrder::Little,
    u16: u16::from_le_bytes,
    u32: u32::from_le_bytes,
    u64: u64::from_le_bytes,
};

pub const BIG: Endian = Endian {
    order: ByteOrder::Big,
    u16: u16::from_be_bytes,
    u32: u32::from_be_bytes,
    u64: u64::from_be_bytes,
};

impl Endian {
    #[must_use]
    pub fn for_order(order: ByteOrder) -> &'static Self {
        match order {
            ByteOrder::Little => &LITTLE,
            ByteOrder::Big => &BIG,
        }
    }

    /// # Panics
    ///
    /// Panics if `bytes` is not exactly 2 bytes long.
    #[must_use]
    pub fn read_u16(&self, bytes: &[u8]) -> u16 {
        let mut raw = [0u8; 2];
        raw.copy_from_slice(bytes);
        (self.u16)(raw)
    }

    /// # Panics
    ///
    /// Panics if `bytes` is not exactly 4 bytes long.
    #[must_use]
    pub fn read_u32(&self, bytes: &[u8]) -> u32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        (self.u32)(raw)
    }

    /// # Panics
    ///
    /// Panics if `bytes` is not exactly 8 bytes long.
    #[must_use]
    pub fn read_u64(&self, bytes: &[u8]) -> u64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        (self.u64)(raw)
    }
}
