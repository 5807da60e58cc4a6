//! Performance benchmarks for [`vdp_protocol::StreamParser`]'s extraction
//! loop, including the resynchronization path.
//!
//! Run with:
//! ```sh
//! cargo bench --bench parser_bench
//! ```

use criterion::{Throughput, criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use vdp_core::types::{CommandCode, EcuId};
use vdp_protocol::{Frame, StreamParser};

fn wire_frame() -> Vec<u8> {
    Frame::new(EcuId::new(0x01).as_response(), CommandCode::ReadData, vec![0xAB; 64])
        .serialize()
        .unwrap()
        .to_vec()
}

fn bench_extract_single_frame(c: &mut Criterion) {
    let wire = wire_frame();
    let mut group = c.benchmark_group("extract_single_frame");
    group.throughput(Throughput::Bytes(wire.len() as u64));

    group.bench_function("feed_then_extract", |b| {
        b.iter(|| {
            let mut parser = StreamParser::new();
            parser.feed(black_box(&wire)).unwrap();
            black_box(parser.extract());
        });
    });

    group.finish();
}

fn bench_extract_many_frames_one_feed(c: &mut Criterion) {
    let wire = wire_frame();
    let mut stream = Vec::new();
    for _ in 0..100 {
        stream.extend_from_slice(&wire);
    }

    let mut group = c.benchmark_group("extract_many_frames");
    group.throughput(Throughput::Elements(100));

    group.bench_function("feed_100_then_extract", |b| {
        b.iter(|| {
            let mut parser = StreamParser::new();
            parser.feed(black_box(&stream)).unwrap();
            black_box(parser.extract());
        });
    });

    group.finish();
}

fn bench_resync_through_garbage(c: &mut Criterion) {
    let wire = wire_frame();
    let mut stream = vec![0xAAu8; 256];
    stream.extend_from_slice(&wire);

    let mut group = c.benchmark_group("resync_through_garbage");
    group.throughput(Throughput::Bytes(stream.len() as u64));

    group.bench_function("resync_256_garbage_bytes", |b| {
        b.iter(|| {
            let mut parser = StreamParser::new();
            parser.feed(black_box(&stream)).unwrap();
            black_box(parser.extract());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_extract_single_frame,
    bench_extract_many_frames_one_feed,
    bench_resync_through_garbage
);
criterion_main!(benches);
