use std::ops::Range;

use crate::error::TypeError;

/// Byte range of one field inside a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    #[must_use]
    pub fn range(self) -> Range<usize> {
        self.offset..self.offset + self.len
    }

    #[must_use]
    pub fn end(self) -> usize {
        self.offset + self.len
    }
}

/// The three record shapes, keyed by record size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// 56 bytes. Start time, protocol and flags are bit-packed into the
    /// first 6 bytes; the sensor comes from the file header.
    Packed,
    /// 68 bytes. Absolute start time plus sensor, class and flag details.
    Standard,
    /// 88 bytes. [`RecordKind::Standard`] plus SNMP interfaces and next hop.
    Routed,
}

impl RecordKind {
    #[must_use]
    pub fn record_size(self) -> u16 {
        match self {
            Self::Packed => 56,
            Self::Standard => 68,
            Self::Routed => 88,
        }
    }
}

/// Field offsets for one record shape.
///
/// Fields present in every shape are plain [`Span`]s; fields a shape
/// lacks are `None` and leave the matching [`crate::Flow`] field at its
/// default.
///
/// For [`RecordKind::Packed`], `start_time` covers the packed 32-bit word
/// and `protocol`/`tcp_flags` both point at byte 4; the record decoder
/// applies the packing rules on top.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordLayout {
    pub kind: RecordKind,
    pub start_time: Span,
    pub duration: Span,
    pub src_port: Span,
    pub dst_port: Span,
    pub protocol: Span,
    pub tcp_flags: Span,
    pub packets: Span,
    pub bytes: Span,
    pub src_addr: Span,
    pub dst_addr: Span,
    pub class_type: Option<Span>,
    pub sensor: Option<Span>,
    pub initial_flags: Option<Span>,
    pub session_flags: Option<Span>,
    pub attributes: Option<Span>,
    pub application: Option<Span>,
    pub snmp_in: Option<Span>,
    pub snmp_out: Option<Span>,
    pub next_hop: Option<Span>,
}

impl RecordLayout {
    #[must_use]
    pub fn record_size(&self) -> usize {
        usize::from(self.kind.record_size())
    }
}

pub const PACKED_56: RecordLayout = RecordLayout {
    kind: RecordKind::Packed,
    start_time: Span::new(0, 4),
    duration: Span::new(12, 4),
    src_port: Span::new(8, 2),
    dst_port: Span::new(10, 2),
    protocol: Span::new(4, 1),
    tcp_flags: Span::new(4, 1),
    packets: Span::new(16, 4),
    bytes: Span::new(20, 4),
    src_addr: Span::new(24, 16),
    dst_addr: Span::new(40, 16),
    class_type: None,
    sensor: None,
    initial_flags: None,
    session_flags: None,
    attributes: None,
    application: None,
    snmp_in: None,
    snmp_out: None,
    next_hop: None,
};

pub const STANDARD_68: RecordLayout = RecordLayout {
    kind: RecordKind::Standard,
    start_time: Span::new(0, 8),
    duration: Span::new(8, 4),
    src_port: Span::new(12, 2),
    dst_port: Span::new(14, 2),
    protocol: Span::new(16, 1),
    tcp_flags: Span::new(20, 1),
    packets: Span::new(28, 4),
    bytes: Span::new(32, 4),
    src_addr: Span::new(36, 16),
    dst_addr: Span::new(52, 16),
    class_type: Some(Span::new(17, 1)),
    sensor: Some(Span::new(18, 2)),
    initial_flags: Some(Span::new(21, 1)),
    session_flags: Some(Span::new(22, 1)),
    attributes: Some(Span::new(23, 1)),
    application: Some(Span::new(24, 2)),
    snmp_in: None,
    snmp_out: None,
    next_hop: None,
};

pub const ROUTED_88: RecordLayout = RecordLayout {
    kind: RecordKind::Routed,
    packets: Span::new(32, 4),
    bytes: Span::new(36, 4),
    src_addr: Span::new(40, 16),
    dst_addr: Span::new(56, 16),
    snmp_in: Some(Span::new(28, 2)),
    snmp_out: Some(Span::new(30, 2)),
    next_hop: Some(Span::new(72, 16)),
    ..STANDARD_68
};

/// Look up the layout for a header's record size.
///
/// # Errors
///
/// Returns [`TypeError::UnsupportedRecordSize`] for anything other than
/// 56, 68 or 88.
pub fn resolve_layout(record_size: u16) -> Result<&'static RecordLayout, TypeError> {
    match record_size {
        56 => Ok(&PACKED_56),
        68 => Ok(&STANDARD_68),
        88 => Ok(&ROUTED_88),
        size => Err(TypeError::UnsupportedRecordSize { size }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(layout: &RecordLayout) -> Vec<Span> {
        let required = [
            layout.start_time,
            layout.duration,
            layout.src_port,
            layout.dst_port,
            layout.protocol,
            layout.tcp_flags,
            layout.packets,
            layout.bytes,
            layout.src_addr,
            layout.dst_addr,
        ];
        let optional = [
            layout.class_type,
            layout.sensor,
            layout.initial_flags,
            layout.session_flags,
            layout.attributes,
            layout.application,
            layout.snmp_in,
            layout.snmp_out,
            layout.next_hop,
        ];
        required
            .into_iter()
            .chain(optional.into_iter().flatten())
            .collect()
    }

    #[test]
    fn known_sizes_resolve() {
        for size in [56, 68, 88] {
            let layout = resolve_layout(size).unwrap();
            assert_eq!(layout.kind.record_size(), size);
        }
    }

    #[test]
    fn unknown_sizes_are_rejected() {
        for size in [0, 40, 57, 72, 100] {
            assert!(matches!(
                resolve_layout(size),
                Err(TypeError::UnsupportedRecordSize { size: s }) if s == size
            ));
        }
    }

    #[test]
    fn every_span_fits_inside_the_record() {
        for layout in [&PACKED_56, &STANDARD_68, &ROUTED_88] {
            for span in spans(layout) {
                assert!(span.end() <= layout.record_size(), "{span:?} in {:?}", layout.kind);
            }
        }
    }

    #[test]
    fn addresses_end_the_record() {
        assert_eq!(PACKED_56.dst_addr.end(), 56);
        assert_eq!(STANDARD_68.dst_addr.end(), 68);
        assert_eq!(ROUTED_88.next_hop.unwrap().end(), 88);
    }

    #[test]
    fn only_routed_records_carry_snmp_and_next_hop() {
        assert!(PACKED_56.snmp_in.is_none() && STANDARD_68.snmp_in.is_none());
        assert!(PACKED_56.next_hop.is_none() && STANDARD_68.next_hop.is_none());
        assert_eq!(ROUTED_88.snmp_in, Some(Span::new(28, 2)));
        assert_eq!(ROUTED_88.snmp_out, Some(Span::new(30, 2)));
    }

    #[test]
    fn packed_records_have_no_sensor_span() {
        assert!(PACKED_56.sensor.is_none());
        assert!(PACKED_56.class_type.is_none());
        assert!(PACKED_56.application.is_none());
    }
}
