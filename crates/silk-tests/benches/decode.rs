use std::io::Cursor;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use silk_decoder::{DecoderConfig, FlowCounter, SilkDecoder};
use silk_fixtures::scenario_capture;
use silk_tests::{CODECS, KINDS, Variant};
use silk_wire::ByteOrder;

const FLOWS: usize = 10_000;

fn count(bytes: &[u8]) -> u64 {
    let mut counter = FlowCounter::default();
    SilkDecoder::decode_into(Cursor::new(bytes), &mut counter, &DecoderConfig::default()).unwrap();
    counter.count
}

fn bench_decode_codecs(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_codec");

    for compression in CODECS {
        let variant = Variant {
            kind: silk_types::RecordKind::Routed,
            order: ByteOrder::Little,
            compression,
        };
        let bytes = variant.build(&scenario_capture(variant.kind, FLOWS));

        group.throughput(Throughput::Elements(FLOWS as u64 + 2));
        group.bench_with_input(
            BenchmarkId::new("routed", compression.name()),
            &bytes,
            |b, bytes| b.iter(|| count(bytes)),
        );
    }

    group.finish();
}

fn bench_decode_layouts(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_layout");

    for kind in KINDS {
        for order in [ByteOrder::Little, ByteOrder::Big] {
            let variant = Variant {
                kind,
                order,
                compression: silk_wire::Compression::None,
            };
            let bytes = variant.build(&scenario_capture(kind, FLOWS));

            group.throughput(Throughput::Bytes(bytes.len() as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("{}", kind.record_size()), format!("{order:?}")),
                &bytes,
                |b, bytes| b.iter(|| count(bytes)),
            );
        }
    }

    group.finish();
}

fn bench_decode_eager(c: &mut Criterion) {
    let variant = Variant {
        kind: silk_types::RecordKind::Standard,
        order: ByteOrder::Big,
        compression: silk_wire::Compression::Zlib,
    };
    let bytes = variant.build(&scenario_capture(variant.kind, FLOWS));

    c.bench_function("decode_eager_collect", |b| {
        b.iter(|| SilkDecoder::decode(Cursor::new(&bytes)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_decode_codecs,
    bench_decode_layouts,
    bench_decode_eager
);
criterion_main!(benches);
