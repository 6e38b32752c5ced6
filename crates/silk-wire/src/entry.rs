use crate::error::WireError;

/// Size of the id + length frame in front of every variable-length entry.
pub const ENTRY_FRAME_SIZE: usize = 8;

/// Known variable-length header entry ids.
///
/// Ids 1, 6 and 7 have a fixed on-disk length that overrides whatever the
/// length field says; the others use the length as read.
///
/// ```text
/// ┌────┬──────────────┬──────────────┐
/// │ Id │ Entry        │ Length       │
/// ├────┼──────────────┼──────────────┤
/// │ 0  │ End          │ as read      │
/// │ 1  │ PackedFile   │ 24 (fixed)   │
/// │ 2  │ Invocation   │ as read      │
/// │ 3  │ Annotation   │ as read      │
/// │ 4  │ ProbeName    │ as read      │
/// │ 5  │ PrefixMap    │ as read      │
/// │ 6  │ Bag          │ 16 (fixed)   │
/// │ 7  │ IpSet        │ 32 (fixed)   │
/// └────┴──────────────┴──────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryId {
    End,
    PackedFile,
    Invocation,
    Annotation,
    ProbeName,
    PrefixMap,
    Bag,
    IpSet,
}

impl EntryId {
    /// Map a wire id to a known entry kind.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnsupportedVarHeaderId`] for ids above 7.
    pub fn from_wire(id: u32) -> Result<Self, WireError> {
        Ok(match id {
            0 => Self::End,
            1 => Self::PackedFile,
            2 => Self::Invocation,
            3 => Self::Annotation,
            4 => Self::ProbeName,
            5 => Self::PrefixMap,
            6 => Self::Bag,
            7 => Self::IpSet,
            _ => return Err(WireError::UnsupportedVarHeaderId { id }),
        })
    }

    #[must_use]
    pub fn wire_id(self) -> u32 {
        match self {
            Self::End => 0,
            Self::PackedFile => 1,
            Self::Invocation => 2,
            Self::Annotation => 3,
            Self::ProbeName => 4,
            Self::PrefixMap => 5,
            Self::Bag => 6,
            Self::IpSet => 7,
        }
    }

    /// The length forced by the format for this id, if any.
    #[must_use]
    pub fn fixed_length(self) -> Option<u32> {
        match self {
            Self::PackedFile => Some(24),
            Self::Bag => Some(16),
            Self::IpSet => Some(32),
            _ => None,
        }
    }

    /// Resolve the effective entry length from the length field on the wire.
    #[must_use]
    pub fn effective_length(self, wire_length: u32) -> u32 {
        self.fixed_length().unwrap_or(wire_length)
    }

    /// Short lowercase name, used by inspection tooling.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::End => "end",
            Self::PackedFile => "packed-file",
            Self::Invocation => "invocation",
            Self::Annotation => "annotation",
            Self::ProbeName => "probe-name",
            Self::PrefixMap => "prefix-map",
            Self::Bag => "bag",
            Self::IpSet => "ipset",
        }
    }

    /// Whether the entry content is NUL-terminated text.
    #[must_use]
    pub fn is_text(self) -> bool {
        matches!(self, Self::Invocation | Self::Annotation | Self::ProbeName)
    }
}

/// One chained section of the file header.
///
/// `length` is the effective length (after the fixed-length override),
/// measured from the start of the 8-byte frame, so
/// `content.len() == length - 8` whenever `length > 0`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarLenHeader {
    pub id: u32,
    pub length: u32,
    pub content: Vec<u8>,
}

impl VarLenHeader {
    /// The known kind for this entry. Always `Some` for entries produced by
    /// the header parser, which rejects unknown ids.
    #[must_use]
    pub fn kind(&self) -> Option<EntryId> {
        EntryId::from_wire(self.id).ok()
    }

    /// Bytes this entry occupied on the wire, frame included.
    #[must_use]
    pub fn wire_size(&self) -> usize {
        ENTRY_FRAME_SIZE + self.content.len()
    }

    /// Content decoded as text, up to the first NUL. Only meaningful for
    /// the text-carrying entries (invocation, annotation, probe name).
    #[must_use]
    pub fn text(&self) -> Option<String> {
        if !self.kind().is_some_and(EntryId::is_text) {
            return None;
        }
        let end = self
            .content
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.content.len());
        Some(String::from_utf8_lossy(&self.content[..end]).into_owned())
    }
}

/// Values carried by the packed-file entry (id 1).
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────┐
/// │ Offset │ Size    │ Description                  │
/// ├────────┼─────────┼──────────────────────────────┤
/// │ 0      │ 8 bytes │ file base date, epoch ms, BE │
/// │ 8      │ 4 bytes │ unused                       │
/// │ 12     │ 4 bytes │ file sensor id, BE           │
/// └────────┴─────────┴──────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PackedFileInfo {
    pub file_date_ms: u64,
    pub file_sensor: u32,
}

impl PackedFileInfo {
    /// Minimum content length needed to extract both values.
    pub const CONTENT_SIZE: usize = 16;

    /// Extract date and sensor from the content of an id-1 entry.
    ///
    /// Returns `None` when the content is shorter than 16 bytes, which
    /// cannot happen for parsed entries because id 1 is fixed at 24 bytes.
    #[must_use]
    pub fn from_content(content: &[u8]) -> Option<Self> {
        if content.len() < Self::CONTENT_SIZE {
            return None;
        }
        let mut date = [0u8; 8];
        date.copy_from_slice(&content[0..8]);
        let mut sensor = [0u8; 4];
        sensor.copy_from_slice(&content[12..16]);
        Some(Self {
            file_date_ms: u64::from_be_bytes(date),
            file_sensor: u32::from_be_bytes(sensor),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_lengths_override_wire_value() {
        assert_eq!(EntryId::PackedFile.effective_length(99), 24);
        assert_eq!(EntryId::Bag.effective_length(0), 16);
        assert_eq!(EntryId::IpSet.effective_length(8), 32);
        assert_eq!(EntryId::Invocation.effective_length(40), 40);
        assert_eq!(EntryId::End.effective_length(0), 0);
    }

    #[test]
    fn unknown_id_is_rejected() {
        assert!(matches!(
            EntryId::from_wire(8),
            Err(WireError::UnsupportedVarHeaderId { id: 8 })
        ));
    }

    #[test]
    fn wire_ids_roundtrip() {
        for id in 0..=7 {
            assert_eq!(EntryId::from_wire(id).unwrap().wire_id(), id);
        }
    }

    #[test]
    fn packed_file_reads_date_and_sensor_at_12() {
        let mut content = [0u8; 16];
        content[0..8].copy_from_slice(&1_434_553_200_000u64.to_be_bytes());
        content[8..12].copy_from_slice(&7u32.to_be_bytes());
        content[12..16].copy_from_slice(&3u32.to_be_bytes());
        let info = PackedFileInfo::from_content(&content).unwrap();
        assert_eq!(info.file_date_ms, 1_434_553_200_000);
        assert_eq!(info.file_sensor, 3);
    }

    #[test]
    fn text_stops_at_nul() {
        let entry = VarLenHeader {
            id: 2,
            length: 20,
            content: b"rwcut -a\0\0\0\0".to_vec(),
        };
        assert_eq!(entry.text().as_deref(), Some("rwcut -a"));

        let bag = VarLenHeader {
            id: 6,
            length: 16,
            content: vec![0; 8],
        };
        assert!(bag.text().is_none());
    }
}
