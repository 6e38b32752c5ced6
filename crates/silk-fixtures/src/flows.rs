use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use silk_types::{Flow, RecordKind};

/// Base date of the sample capture, epoch milliseconds.
pub const SCENARIO_FILE_DATE_MS: u64 = 1_434_553_200_000;

/// Sensor id of the sample capture.
pub const SCENARIO_SENSOR: u32 = 3;

/// The first two flows of the sample capture, as each record shape
/// reports them.
///
/// Only the 88-byte shape carries a next hop, and the packed 56-byte
/// shape has no class type.
#[must_use]
pub fn scenario_flows(kind: RecordKind) -> Vec<Flow> {
    let (class_type, next_hop) = match kind {
        RecordKind::Packed => (0, None),
        RecordKind::Standard => (1, None),
        RecordKind::Routed => (1, Some(IpAddr::V4(Ipv4Addr::UNSPECIFIED))),
    };
    vec![
        Flow {
            start_time_ms: 1_434_553_200_013,
            duration_ms: 6,
            src_addr: IpAddr::V4(Ipv4Addr::new(192, 168, 40, 20)),
            dst_addr: IpAddr::V4(Ipv4Addr::new(10, 0, 40, 54)),
            src_port: 88,
            dst_port: 60339,
            protocol: 6,
            tcp_flags: 30,
            packets: 4,
            bytes: 373,
            class_type,
            sensor: 3,
            next_hop,
            ..Flow::default()
        },
        Flow {
            start_time_ms: 1_434_553_200_025,
            duration_ms: 0,
            src_addr: IpAddr::V4(Ipv4Addr::new(192, 168, 20, 58)),
            dst_addr: IpAddr::V4(Ipv4Addr::new(128, 63, 2, 53)),
            src_port: 29070,
            dst_port: 53,
            protocol: 17,
            tcp_flags: 0,
            packets: 1,
            bytes: 74,
            class_type,
            sensor: 3,
            next_hop,
            ..Flow::default()
        },
    ]
}

/// The scenario flows followed by `extra` generated flows.
#[must_use]
pub fn scenario_capture(kind: RecordKind, extra: usize) -> Vec<Flow> {
    let mut flows = scenario_flows(kind);
    flows.extend(generated_flows(
        kind,
        extra,
        SCENARIO_FILE_DATE_MS,
        SCENARIO_SENSOR,
    ));
    flows
}

/// Deterministic flows that survive an encode/decode trip through the
/// given record shape.
///
/// Values stay inside what each shape can hold: packed records get
/// start times within the 22-bit offset window, the file sensor, and no
/// TCP flags on non-TCP flows; fields a shape lacks stay at default.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn generated_flows(
    kind: RecordKind,
    count: usize,
    file_date_ms: u64,
    file_sensor: u32,
) -> Vec<Flow> {
    (0..count)
        .map(|i| {
            let n = i as u32;
            let protocol = match i % 3 {
                0 => 6,
                1 => 17,
                _ => 1,
            };
            let mut flow = Flow {
                start_time_ms: file_date_ms + 100 + u64::from(n * 37 % 3_000_000),
                duration_ms: n * 11 % 60_000,
                src_addr: IpAddr::V4(Ipv4Addr::new(10, (n >> 8) as u8, n as u8, 1)),
                dst_addr: if i % 4 == 3 {
                    IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, (n as u16).wrapping_add(1)))
                } else {
                    IpAddr::V4(Ipv4Addr::new(172, 16, (n >> 8) as u8, n as u8))
                },
                src_port: (1024 + n % 60_000) as u16,
                dst_port: [53, 80, 443, 8080][i % 4],
                protocol,
                tcp_flags: if protocol == 6 { (n % 63 + 1) as u8 } else { 0 },
                packets: 1 + n % 500,
                bytes: 40 + n * 13 % 1_000_000,
                ..Flow::default()
            };
            match kind {
                RecordKind::Packed => {
                    flow.sensor = file_sensor as u16;
                }
                RecordKind::Standard | RecordKind::Routed => {
                    flow.start_time_ms = file_date_ms + u64::from(n) * 1_000;
                    flow.tcp_flags = (n % 64) as u8;
                    flow.class_type = (n % 4) as u8;
                    flow.sensor = (n % 16) as u16;
                    flow.initial_flags = (n % 32) as u8;
                    flow.session_flags = (n % 16) as u8;
                    flow.attributes = (n % 8) as u8;
                    flow.application = [0, 80, 443, 53][i % 4];
                }
            }
            if kind == RecordKind::Routed {
                flow.snmp_in = (n % 48) as u16;
                flow.snmp_out = (n % 24) as u16;
                flow.next_hop = Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, (n % 254) as u8 + 1)));
            }
            flow
        })
        .collect()
}
