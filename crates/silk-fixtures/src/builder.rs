use std::io;

use silk_types::layout::{PACKED_56, ROUTED_88, STANDARD_68};
use silk_types::{Flow, RecordKind, RecordLayout, Span, addr_to_bytes};
use silk_wire::entry::ENTRY_FRAME_SIZE;
use silk_wire::header::{FIXED_HEADER_SIZE, SILK_MAGIC};
use silk_wire::{BlockFrame, ByteOrder, Compression, EntryId};

use crate::compress::compress_block;

const PACKED_TIME_MASK: u64 = 0x003F_FFFF;
const PACKED_TCP_BIT: u32 = 0x0080_0000;

/// Where the bytes that align the header to a record boundary go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HeaderPadding {
    /// Zero bytes after a bare 8-byte end entry.
    #[default]
    Trailing,
    /// Inside the end entry, whose length grows to cover them.
    InEndEntry,
}

/// Builds SiLK files in memory.
///
/// # Example
///
/// ```rust
/// use silk_fixtures::FileBuilder;
/// use silk_types::RecordKind;
/// use silk_wire::{ByteOrder, Compression};
///
/// let flows = silk_fixtures::scenario_flows(RecordKind::Routed);
/// let bytes = FileBuilder::new(RecordKind::Routed)
///     .byte_order(ByteOrder::Big)
///     .compression(Compression::Zlib)
///     .build(&flows)
///     .unwrap();
/// assert_eq!(&bytes[..4], &[0xDE, 0xAD, 0xBE, 0xEF]);
/// ```
#[derive(Clone, Debug)]
pub struct FileBuilder {
    layout: Option<&'static RecordLayout>,
    record_size: u16,
    byte_order: ByteOrder,
    compression_code: u8,
    magic: [u8; 4],
    file_date_ms: u64,
    file_sensor: u32,
    text_entries: Vec<(EntryId, String)>,
    padding: HeaderPadding,
    records_per_block: usize,
}

impl FileBuilder {
    /// A little-endian, uncompressed file of the given record shape,
    /// dated like the sample capture.
    #[must_use]
    pub fn new(kind: RecordKind) -> Self {
        let layout = match kind {
            RecordKind::Packed => &PACKED_56,
            RecordKind::Standard => &STANDARD_68,
            RecordKind::Routed => &ROUTED_88,
        };
        Self {
            layout: Some(layout),
            record_size: kind.record_size(),
            byte_order: ByteOrder::Little,
            compression_code: 0,
            magic: SILK_MAGIC,
            file_date_ms: crate::SCENARIO_FILE_DATE_MS,
            file_sensor: crate::SCENARIO_SENSOR,
            text_entries: Vec::new(),
            padding: HeaderPadding::Trailing,
            records_per_block: 64,
        }
    }

    /// A builder whose header declares `record_size` even though no
    /// layout exists for it. Only [`FileBuilder::build_raw`] can be used.
    #[must_use]
    pub fn with_record_size(record_size: u16) -> Self {
        Self {
            layout: None,
            record_size,
            ..Self::new(RecordKind::Packed)
        }
    }

    pub fn byte_order(&mut self, order: ByteOrder) -> &mut Self {
        self.byte_order = order;
        self
    }

    pub fn compression(&mut self, compression: Compression) -> &mut Self {
        self.compression_code = compression.code();
        self
    }

    /// Write an arbitrary compression code into the header. Unknown codes
    /// produce an uncompressed payload.
    pub fn compression_code(&mut self, code: u8) -> &mut Self {
        self.compression_code = code;
        self
    }

    pub fn magic(&mut self, magic: [u8; 4]) -> &mut Self {
        self.magic = magic;
        self
    }

    pub fn file_date_ms(&mut self, date: u64) -> &mut Self {
        self.file_date_ms = date;
        self
    }

    pub fn file_sensor(&mut self, sensor: u32) -> &mut Self {
        self.file_sensor = sensor;
        self
    }

    pub fn invocation(&mut self, text: &str) -> &mut Self {
        self.text_entries.push((EntryId::Invocation, text.to_owned()));
        self
    }

    pub fn annotation(&mut self, text: &str) -> &mut Self {
        self.text_entries.push((EntryId::Annotation, text.to_owned()));
        self
    }

    pub fn padding(&mut self, padding: HeaderPadding) -> &mut Self {
        self.padding = padding;
        self
    }

    /// Records per compressed block. Ignored for uncompressed files.
    pub fn records_per_block(&mut self, n: usize) -> &mut Self {
        self.records_per_block = n.max(1);
        self
    }

    #[must_use]
    pub fn record_size(&self) -> usize {
        usize::from(self.record_size)
    }

    /// Header bytes, padding included.
    #[must_use]
    pub fn header_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(256);
        out.extend_from_slice(&self.magic);
        out.push(self.byte_order.file_flags());
        out.push(0x0C); // record format
        out.push(16); // file version
        out.push(self.compression_code);
        out.extend_from_slice(&3_010_001u32.to_be_bytes());
        out.extend_from_slice(&self.record_size.to_be_bytes());
        out.extend_from_slice(&2u16.to_be_bytes());
        debug_assert_eq!(out.len(), FIXED_HEADER_SIZE);

        let mut packed = Vec::with_capacity(16);
        packed.extend_from_slice(&self.file_date_ms.to_be_bytes());
        packed.extend_from_slice(&[0; 4]);
        packed.extend_from_slice(&self.file_sensor.to_be_bytes());
        push_entry(&mut out, EntryId::PackedFile.wire_id(), &packed);

        for (id, text) in &self.text_entries {
            let mut content = text.as_bytes().to_vec();
            content.push(0);
            push_entry(&mut out, id.wire_id(), &content);
        }

        let size = self.record_size();
        let unaligned = out.len() + ENTRY_FRAME_SIZE;
        let pad = if size == 0 {
            0
        } else {
            (size - unaligned % size) % size
        };
        match self.padding {
            HeaderPadding::Trailing => {
                push_entry(&mut out, EntryId::End.wire_id(), &[]);
                out.resize(out.len() + pad, 0);
            }
            HeaderPadding::InEndEntry => {
                push_entry(&mut out, EntryId::End.wire_id(), &vec![0; pad]);
            }
        }
        out
    }

    /// Encode one flow in this file's record shape and byte order.
    ///
    /// # Errors
    ///
    /// Fails on a builder made with [`FileBuilder::with_record_size`],
    /// which has no layout to encode with.
    pub fn encode_record(&self, flow: &Flow) -> io::Result<Vec<u8>> {
        let layout = self.layout.ok_or_else(|| {
            io::Error::other(format!("no record layout for size {}", self.record_size))
        })?;
        Ok(encode_record(layout, self.byte_order, self.file_date_ms, flow))
    }

    /// A complete file holding `flows`.
    ///
    /// # Errors
    ///
    /// Fails if the builder has no record layout or a codec cannot
    /// compress a block.
    pub fn build(&self, flows: &[Flow]) -> io::Result<Vec<u8>> {
        let mut records = Vec::with_capacity(flows.len() * self.record_size());
        for flow in flows {
            records.extend_from_slice(&self.encode_record(flow)?);
        }
        self.build_raw(&records)
    }

    /// A complete file whose payload is the given record bytes, split
    /// into framed blocks if the header names a known codec.
    ///
    /// # Errors
    ///
    /// Fails if a codec cannot compress a block.
    pub fn build_raw(&self, records: &[u8]) -> io::Result<Vec<u8>> {
        let mut out = self.header_bytes();
        match Compression::from_code(self.compression_code) {
            Some(codec) if codec.is_framed() => {
                let block_len = self.records_per_block * self.record_size().max(1);
                for block in records.chunks(block_len) {
                    let payload = compress_block(codec, block)?;
                    let frame = BlockFrame {
                        compressed_size: to_u32(payload.len())?,
                        decompressed_size: to_u32(block.len())?,
                    };
                    frame.write_to(&mut out).map_err(io::Error::other)?;
                    out.extend_from_slice(&payload);
                }
            }
            _ => out.extend_from_slice(records),
        }
        Ok(out)
    }
}

fn to_u32(len: usize) -> io::Result<u32> {
    u32::try_from(len).map_err(io::Error::other)
}

fn push_entry(out: &mut Vec<u8>, id: u32, content: &[u8]) {
    let length = u32::try_from(content.len() + ENTRY_FRAME_SIZE).unwrap_or(u32::MAX);
    out.extend_from_slice(&id.to_be_bytes());
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(content);
}

/// Encode `flow` into one record of `layout`.
///
/// Packed records store the start time as an offset from
/// `file_date_ms`, keep TCP flags in byte 4, and leave the expanded
/// TCP state bit clear.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn encode_record(
    layout: &RecordLayout,
    order: ByteOrder,
    file_date_ms: u64,
    flow: &Flow,
) -> Vec<u8> {
    let mut raw = vec![0u8; layout.record_size()];
    let mut w = Writer {
        raw: &mut raw,
        order,
    };

    if layout.kind == RecordKind::Packed {
        let offset = (flow.start_time_ms.saturating_sub(file_date_ms) & PACKED_TIME_MASK) as u32;
        let is_tcp = flow.protocol == 6;
        let word = if is_tcp { offset | PACKED_TCP_BIT } else { offset };
        w.u32(layout.start_time, word);
        w.raw[4] = if is_tcp { flow.tcp_flags } else { flow.protocol };
    } else {
        w.u64(layout.start_time, flow.start_time_ms);
        w.u8(layout.protocol, flow.protocol);
        w.u8(layout.tcp_flags, flow.tcp_flags);
    }

    w.u32(layout.duration, flow.duration_ms);
    w.u16(layout.src_port, flow.src_port);
    w.u16(layout.dst_port, flow.dst_port);
    w.u32(layout.packets, flow.packets);
    w.u32(layout.bytes, flow.bytes);
    w.addr(layout.src_addr, flow.src_addr);
    w.addr(layout.dst_addr, flow.dst_addr);

    if let Some(span) = layout.class_type {
        w.u8(span, flow.class_type);
    }
    if let Some(span) = layout.sensor {
        w.u16(span, flow.sensor);
    }
    if let Some(span) = layout.initial_flags {
        w.u8(span, flow.initial_flags);
    }
    if let Some(span) = layout.session_flags {
        w.u8(span, flow.session_flags);
    }
    if let Some(span) = layout.attributes {
        w.u8(span, flow.attributes);
    }
    if let Some(span) = layout.application {
        w.u16(span, flow.application);
    }
    if let Some(span) = layout.snmp_in {
        w.u16(span, flow.snmp_in);
    }
    if let Some(span) = layout.snmp_out {
        w.u16(span, flow.snmp_out);
    }
    if let (Some(span), Some(addr)) = (layout.next_hop, flow.next_hop) {
        w.addr(span, addr);
    }
    raw
}

struct Writer<'a> {
    raw: &'a mut [u8],
    order: ByteOrder,
}

impl Writer<'_> {
    fn u8(&mut self, span: Span, value: u8) {
        self.raw[span.offset] = value;
    }

    fn u16(&mut self, span: Span, value: u16) {
        let bytes = match self.order {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        };
        self.raw[span.range()].copy_from_slice(&bytes);
    }

    fn u32(&mut self, span: Span, value: u32) {
        let bytes = match self.order {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        };
        self.raw[span.range()].copy_from_slice(&bytes);
    }

    fn u64(&mut self, span: Span, value: u64) {
        let bytes = match self.order {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        };
        self.raw[span.range()].copy_from_slice(&bytes);
    }

    fn addr(&mut self, span: Span, addr: std::net::IpAddr) {
        self.raw[span.range()].copy_from_slice(&addr_to_bytes(addr));
    }
}
