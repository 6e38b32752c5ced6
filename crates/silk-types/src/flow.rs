use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// One decoded flow record.
///
/// Every field is rebuilt from the raw record bytes; fields the record
/// shape does not carry stay at their default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Flow {
    /// Absolute start time, epoch milliseconds.
    pub start_time_ms: u64,
    pub duration_ms: u32,
    pub src_addr: IpAddr,
    pub dst_addr: IpAddr,
    pub src_port: u16,
    pub dst_port: u16,
    pub protocol: u8,
    pub tcp_flags: u8,
    pub packets: u32,
    pub bytes: u32,
    pub class_type: u8,
    pub sensor: u16,
    pub initial_flags: u8,
    pub session_flags: u8,
    pub attributes: u8,
    pub application: u16,
    pub snmp_in: u16,
    pub snmp_out: u16,
    /// Only 88-byte records carry a next hop.
    pub next_hop: Option<IpAddr>,
}

impl Default for Flow {
    fn default() -> Self {
        Self {
            start_time_ms: 0,
            duration_ms: 0,
            src_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            dst_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            src_port: 0,
            dst_port: 0,
            protocol: 0,
            tcp_flags: 0,
            packets: 0,
            bytes: 0,
            class_type: 0,
            sensor: 0,
            initial_flags: 0,
            session_flags: 0,
            attributes: 0,
            application: 0,
            snmp_in: 0,
            snmp_out: 0,
            next_hop: None,
        }
    }
}

impl Flow {
    /// Start time plus duration, epoch milliseconds. Saturates at `u64::MAX`.
    #[must_use]
    pub fn end_time_ms(&self) -> u64 {
        self.start_time_ms.saturating_add(u64::from(self.duration_ms))
    }
}

/// Build an address from raw record bytes.
///
/// 4 bytes give IPv4 and 16 give IPv6. An IPv4-mapped IPv6 address
/// (`::ffff:a.b.c.d`) comes back as the IPv4 address it wraps, which is
/// how SiLK stores IPv4 flows in IPv6-capable records. Any other length
/// yields `None`.
#[must_use]
pub fn addr_from_bytes(raw: &[u8]) -> Option<IpAddr> {
    match raw.len() {
        4 => Some(IpAddr::V4(Ipv4Addr::new(raw[0], raw[1], raw[2], raw[3]))),
        16 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(raw);
            let v6 = Ipv6Addr::from(octets);
            Some(match v6.to_ipv4_mapped() {
                Some(v4) => IpAddr::V4(v4),
                None => IpAddr::V6(v6),
            })
        }
        _ => None,
    }
}

/// Encode an address the way a 16-byte record field stores it.
///
/// The inverse of [`addr_from_bytes`] for 16-byte input.
#[must_use]
pub fn addr_to_bytes(addr: IpAddr) -> [u8; 16] {
    match addr {
        IpAddr::V4(v4) => v4.to_ipv6_mapped().octets(),
        IpAddr::V6(v6) => v6.octets(),
    }
}
