use silk_types::{Endian, Flow, RecordKind, RecordLayout, Span, addr_from_bytes};
use silk_wire::ByteOrder;

/// Low 22 bits of the packed start-time word: milliseconds since the
/// file's base date.
pub const PACKED_TIME_MASK: u32 = 0x003F_FFFF;

/// Bit of the packed start-time word marking a TCP flow.
pub const PACKED_TCP_BIT: u32 = 0x0080_0000;

/// Bit of byte 5 of a packed record marking expanded TCP state, where
/// the flags are split across bytes 3 and 4.
pub const TCP_STATE_EXPANDED: u8 = 0x01;

const PROTO_TCP: u8 = 6;

/// Decodes raw records of one file into [`Flow`]s.
///
/// Holds the per-file context every record needs: the layout, the byte
/// order, and the base date and sensor from the header.
#[derive(Clone, Copy, Debug)]
pub struct RecordDecoder {
    layout: &'static RecordLayout,
    endian: &'static Endian,
    file_date_ms: u64,
    file_sensor: u32,
}

impl RecordDecoder {
    #[must_use]
    pub fn new(
        layout: &'static RecordLayout,
        order: ByteOrder,
        file_date_ms: u64,
        file_sensor: u32,
    ) -> Self {
        Self {
            layout,
            endian: Endian::for_order(order),
            file_date_ms,
            file_sensor,
        }
    }

    #[must_use]
    pub fn layout(&self) -> &'static RecordLayout {
        self.layout
    }

    /// Decode one record.
    ///
    /// # Panics
    ///
    /// Panics if `raw` is shorter than the layout's record size. The
    /// block reader only hands out whole records.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn decode(&self, raw: &[u8]) -> Flow {
        let layout = self.layout;
        let e = self.endian;
        let at = move |span: Span| &raw[span.range()];

        let mut flow = Flow {
            duration_ms: e.read_u32(at(layout.duration)),
            src_port: e.read_u16(at(layout.src_port)),
            dst_port: e.read_u16(at(layout.dst_port)),
            packets: e.read_u32(at(layout.packets)),
            bytes: e.read_u32(at(layout.bytes)),
            src_addr: addr(at(layout.src_addr)),
            dst_addr: addr(at(layout.dst_addr)),
            ..Flow::default()
        };

        if layout.kind == RecordKind::Packed {
            let word = e.read_u32(at(layout.start_time));
            flow.start_time_ms = self
                .file_date_ms
                .wrapping_add(u64::from(word & PACKED_TIME_MASK));
            if word & PACKED_TCP_BIT == 0 {
                flow.protocol = raw[4];
                flow.tcp_flags = 0;
            } else {
                flow.protocol = PROTO_TCP;
                flow.tcp_flags = if raw[5] & TCP_STATE_EXPANDED == 0 {
                    raw[4]
                } else {
                    raw[3] | raw[4]
                };
            }
            flow.sensor = self.file_sensor as u16;
        } else {
            flow.start_time_ms = e.read_u64(at(layout.start_time));
            flow.protocol = raw[layout.protocol.offset];
            flow.tcp_flags = raw[layout.tcp_flags.offset];
        }

        if let Some(span) = layout.class_type {
            flow.class_type = raw[span.offset];
        }
        if let Some(span) = layout.sensor {
            flow.sensor = e.read_u16(at(span));
        }
        if let Some(span) = layout.initial_flags {
            flow.initial_flags = raw[span.offset];
        }
        if let Some(span) = layout.session_flags {
            flow.session_flags = raw[span.offset];
        }
        if let Some(span) = layout.attributes {
            flow.attributes = raw[span.offset];
        }
        if let Some(span) = layout.application {
            flow.application = e.read_u16(at(span));
        }
        if let Some(span) = layout.snmp_in {
            flow.snmp_in = e.read_u16(at(span));
        }
        if let Some(span) = layout.snmp_out {
            flow.snmp_out = e.read_u16(at(span));
        }
        if let Some(span) = layout.next_hop {
            flow.next_hop = addr_from_bytes(at(span));
        }
        flow
    }
}

/// Addresses in every layout are 16 bytes, so this always succeeds.
fn addr(raw: &[u8]) -> std::net::IpAddr {
    addr_from_bytes(raw).unwrap_or(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED))
}

/// Decode a single record without building a [`RecordDecoder`].
#[must_use]
pub fn decode_record(
    layout: &'static RecordLayout,
    order: ByteOrder,
    file_date_ms: u64,
    file_sensor: u32,
    raw: &[u8],
) -> Flow {
    RecordDecoder::new(layout, order, file_date_ms, file_sensor).decode(raw)
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use silk_types::layout::{PACKED_56, ROUTED_88, STANDARD_68};

    use super::*;

    const DATE: u64 = 1_434_553_200_000;

    fn packed(order: ByteOrder, word: u32, byte4: u8, byte5: u8) -> Vec<u8> {
        let mut raw = vec![0u8; 56];
        let bytes = match order {
            ByteOrder::Little => word.to_le_bytes(),
            ByteOrder::Big => word.to_be_bytes(),
        };
        raw[..4].copy_from_slice(&bytes);
        raw[4] = byte4;
        raw[5] = byte5;
        raw
    }

    #[test]
    fn packed_offset_wraps_past_max_date() {
        let raw = packed(ByteOrder::Little, 5, 17, 0);
        let flow = decode_record(&PACKED_56, ByteOrder::Little, u64::MAX - 2, 3, &raw);
        assert_eq!(flow.start_time_ms, 2);
        assert_eq!(flow.protocol, 17);
    }

    #[test]
    fn packed_tcp_bit_sets_protocol_and_offset() {
        for order in [ByteOrder::Little, ByteOrder::Big] {
            let raw = packed(order, 0x0080_0005, 0x1E, 0);
            let flow = decode_record(&PACKED_56, order, DATE, 3, &raw);
            assert_eq!(flow.start_time_ms, 1_434_553_200_005);
            assert_eq!(flow.protocol, 6);
            assert_eq!(flow.tcp_flags, 0x1E);
            assert_eq!(flow.sensor, 3);
        }
    }

    #[test]
    fn packed_expanded_state_merges_bytes_3_and_4() {
        // Little-endian 0x02800005: byte 3 is 0x02.
        let raw = packed(ByteOrder::Little, 0x0280_0005, 0x10, TCP_STATE_EXPANDED);
        assert_eq!(&raw[..4], &[0x05, 0x00, 0x80, 0x02]);
        let flow = decode_record(&PACKED_56, ByteOrder::Little, DATE, 3, &raw);
        assert_eq!(flow.tcp_flags, 0x12);
        assert_eq!(flow.protocol, 6);
        assert_eq!(flow.start_time_ms, DATE + 5);
    }

    #[test]
    fn packed_non_tcp_reads_protocol_from_byte_4() {
        let raw = packed(ByteOrder::Big, 0x0000_0019, 17, 0xFF);
        let flow = decode_record(&PACKED_56, ByteOrder::Big, DATE, 9, &raw);
        assert_eq!(flow.protocol, 17);
        assert_eq!(flow.tcp_flags, 0);
        assert_eq!(flow.start_time_ms, DATE + 25);
    }

    #[test]
    fn packed_offset_ignores_bits_above_22() {
        let raw = packed(ByteOrder::Little, 0x0040_0000 | 7, 1, 0);
        let flow = decode_record(&PACKED_56, ByteOrder::Little, DATE, 0, &raw);
        assert_eq!(flow.start_time_ms, DATE + 7);
        assert_eq!(flow.protocol, 1);
    }

    #[test]
    fn packed_sensor_truncates_file_sensor() {
        let raw = packed(ByteOrder::Little, 0, 17, 0);
        let flow = decode_record(&PACKED_56, ByteOrder::Little, DATE, 0x0001_0004, &raw);
        assert_eq!(flow.sensor, 4);
    }

    #[test]
    fn standard_record_reads_every_field() {
        let mut raw = vec![0u8; 68];
        raw[0..8].copy_from_slice(&1_434_553_200_013u64.to_le_bytes());
        raw[8..12].copy_from_slice(&6u32.to_le_bytes());
        raw[12..14].copy_from_slice(&88u16.to_le_bytes());
        raw[14..16].copy_from_slice(&60339u16.to_le_bytes());
        raw[16] = 6;
        raw[17] = 1;
        raw[18..20].copy_from_slice(&3u16.to_le_bytes());
        raw[20] = 30;
        raw[21] = 2;
        raw[22] = 28;
        raw[23] = 0x40;
        raw[24..26].copy_from_slice(&80u16.to_le_bytes());
        raw[28..32].copy_from_slice(&4u32.to_le_bytes());
        raw[32..36].copy_from_slice(&373u32.to_le_bytes());
        raw[36..52].copy_from_slice(&Ipv4Addr::new(192, 168, 40, 20).to_ipv6_mapped().octets());
        raw[52..68].copy_from_slice(&Ipv4Addr::new(10, 0, 40, 54).to_ipv6_mapped().octets());

        let flow = decode_record(&STANDARD_68, ByteOrder::Little, 0, 77, &raw);
        assert_eq!(flow.start_time_ms, 1_434_553_200_013);
        assert_eq!(flow.duration_ms, 6);
        assert_eq!(flow.src_port, 88);
        assert_eq!(flow.dst_port, 60339);
        assert_eq!(flow.protocol, 6);
        assert_eq!(flow.class_type, 1);
        assert_eq!(flow.sensor, 3);
        assert_eq!(flow.tcp_flags, 30);
        assert_eq!(flow.initial_flags, 2);
        assert_eq!(flow.session_flags, 28);
        assert_eq!(flow.attributes, 0x40);
        assert_eq!(flow.application, 80);
        assert_eq!(flow.packets, 4);
        assert_eq!(flow.bytes, 373);
        assert_eq!(flow.src_addr, IpAddr::V4(Ipv4Addr::new(192, 168, 40, 20)));
        assert_eq!(flow.dst_addr, IpAddr::V4(Ipv4Addr::new(10, 0, 40, 54)));
        assert!(flow.next_hop.is_none());
    }

    #[test]
    fn routed_record_is_big_endian_aware() {
        let mut raw = vec![0u8; 88];
        raw[0..8].copy_from_slice(&1_434_553_200_025u64.to_be_bytes());
        raw[12..14].copy_from_slice(&29070u16.to_be_bytes());
        raw[14..16].copy_from_slice(&53u16.to_be_bytes());
        raw[16] = 17;
        raw[28..30].copy_from_slice(&12u16.to_be_bytes());
        raw[30..32].copy_from_slice(&13u16.to_be_bytes());
        raw[32..36].copy_from_slice(&1u32.to_be_bytes());
        raw[36..40].copy_from_slice(&74u32.to_be_bytes());
        raw[72..88].copy_from_slice(&Ipv4Addr::UNSPECIFIED.to_ipv6_mapped().octets());

        let flow = decode_record(&ROUTED_88, ByteOrder::Big, 0, 0, &raw);
        assert_eq!(flow.start_time_ms, 1_434_553_200_025);
        assert_eq!(flow.src_port, 29070);
        assert_eq!(flow.dst_port, 53);
        assert_eq!(flow.protocol, 17);
        assert_eq!(flow.snmp_in, 12);
        assert_eq!(flow.snmp_out, 13);
        assert_eq!(flow.packets, 1);
        assert_eq!(flow.bytes, 74);
        assert_eq!(flow.next_hop, Some(IpAddr::V4(Ipv4Addr::UNSPECIFIED)));
        // all-zero source is plain IPv6, not mapped
        assert_eq!(flow.src_addr, "::".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn nothing_carries_over_between_records() {
        let decoder = RecordDecoder::new(&STANDARD_68, ByteOrder::Little, 0, 0);
        let mut busy = vec![0xFFu8; 68];
        busy[36..52].copy_from_slice(&[0; 16]);
        busy[52..68].copy_from_slice(&[0; 16]);
        let _ = decoder.decode(&busy);
        let quiet = decoder.decode(&[0u8; 68]);
        assert_eq!(quiet.packets, 0);
        assert_eq!(quiet.application, 0);
        assert_eq!(quiet.tcp_flags, 0);
    }
}
