/// Implementation of `silk dump`.
///
/// Streams flows straight from the decode loop to the output, one row
/// per flow, without holding the file in memory.
///
/// ```text
/// start_time_ms,end_time_ms,duration_ms,src_addr,dst_addr,src_port,...
/// 1434553200013,1434553200019,6,192.168.40.20,10.0.40.54,88,...
/// ```
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::net::IpAddr;

use anyhow::{Context, Result};
use serde::Serialize;
use silk_decoder::{DecoderConfig, FlowSink, SilkDecoder, SinkClosed, Take};
use silk_types::Flow;
use tracing::debug;

use crate::{DumpArgs, DumpFormat};

const CSV_HEADER: &str = "start_time_ms,end_time_ms,duration_ms,src_addr,dst_addr,src_port,\
dst_port,protocol,tcp_flags,packets,bytes,class_type,sensor,initial_flags,session_flags,\
attributes,application,snmp_in,snmp_out,next_hop";

/// Run the `silk dump` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded, or the
/// output cannot be written.
pub fn run(args: &DumpArgs) -> Result<()> {
    let file =
        File::open(&args.file).with_context(|| format!("cannot open {}", args.file.display()))?;

    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut sink = RowWriter {
        out: BufWriter::new(out),
        format: args.format,
        error: None,
    };

    let config = DecoderConfig::default();
    let reader = BufReader::new(file);
    let decoded = match args.limit {
        Some(limit) => SilkDecoder::decode_into(reader, Take::new(&mut sink, limit), &config),
        None => SilkDecoder::decode_into(reader, &mut sink, &config),
    };

    if let Some(e) = sink.error.take() {
        return Err(e).context("failed to write output");
    }
    let summary =
        decoded.with_context(|| format!("failed to decode {}", args.file.display()))?;
    sink.out.flush().context("failed to write output")?;
    debug!(records = summary.records, completion = ?summary.completion, "dump complete");
    Ok(())
}

/// One output row. Field order matches [`CSV_HEADER`].
#[derive(Serialize)]
struct FlowRow {
    start_time_ms: u64,
    end_time_ms: u64,
    duration_ms: u32,
    src_addr: IpAddr,
    dst_addr: IpAddr,
    src_port: u16,
    dst_port: u16,
    protocol: u8,
    tcp_flags: u8,
    packets: u32,
    bytes: u32,
    class_type: u8,
    sensor: u16,
    initial_flags: u8,
    session_flags: u8,
    attributes: u8,
    application: u16,
    snmp_in: u16,
    snmp_out: u16,
    next_hop: Option<IpAddr>,
}

impl From<&Flow> for FlowRow {
    fn from(f: &Flow) -> Self {
        Self {
            start_time_ms: f.start_time_ms,
            end_time_ms: f.end_time_ms(),
            duration_ms: f.duration_ms,
            src_addr: f.src_addr,
            dst_addr: f.dst_addr,
            src_port: f.src_port,
            dst_port: f.dst_port,
            protocol: f.protocol,
            tcp_flags: f.tcp_flags,
            packets: f.packets,
            bytes: f.bytes,
            class_type: f.class_type,
            sensor: f.sensor,
            initial_flags: f.initial_flags,
            session_flags: f.session_flags,
            attributes: f.attributes,
            application: f.application,
            snmp_in: f.snmp_in,
            snmp_out: f.snmp_out,
            next_hop: f.next_hop,
        }
    }
}

impl FlowRow {
    fn write_csv(&self, out: &mut impl Write) -> io::Result<()> {
        let next_hop = self.next_hop.map(|a| a.to_string()).unwrap_or_default();
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{next_hop}",
            self.start_time_ms,
            self.end_time_ms,
            self.duration_ms,
            self.src_addr,
            self.dst_addr,
            self.src_port,
            self.dst_port,
            self.protocol,
            self.tcp_flags,
            self.packets,
            self.bytes,
            self.class_type,
            self.sensor,
            self.initial_flags,
            self.session_flags,
            self.attributes,
            self.application,
            self.snmp_in,
            self.snmp_out,
        )
    }
}

/// Sink that formats each flow as it arrives. A write failure closes the
/// sink and is kept for the caller.
struct RowWriter<W: Write> {
    out: W,
    format: DumpFormat,
    error: Option<io::Error>,
}

impl<W: Write> RowWriter<W> {
    fn write_row(&mut self, flow: &Flow) -> io::Result<()> {
        let row = FlowRow::from(flow);
        match self.format {
            DumpFormat::Csv => row.write_csv(&mut self.out),
            DumpFormat::Json => {
                serde_json::to_writer(&mut self.out, &row)?;
                self.out.write_all(b"\n")
            }
        }
    }
}

impl<W: Write> FlowSink for RowWriter<W> {
    fn begin(&mut self, _header: &silk_wire::Header) -> Result<(), SinkClosed> {
        if self.format == DumpFormat::Csv {
            if let Err(e) = writeln!(self.out, "{CSV_HEADER}") {
                self.error = Some(e);
                return Err(SinkClosed);
            }
        }
        Ok(())
    }

    fn accept(&mut self, flow: Flow) -> Result<(), SinkClosed> {
        self.write_row(&flow).map_err(|e| {
            self.error = Some(e);
            SinkClosed
        })
    }
}
