//! Performance benchmarks for the frame codec.
//!
//! The reader thread parses every frame the coprocessor emits; a capture
//! burst streams tens of packets per second, so the scan + parse path
//! must stay comfortably ahead of the serial line rate.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench codec_bench
//! ```

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use facegate_core::VisionFunction;
use facegate_protocol::{Command, FrameScanner, MessageParser};
use std::hint::black_box;

/// Benchmark building a command frame.
fn bench_encode_command(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_command");
    group.throughput(Throughput::Elements(1));

    let cmd = Command::start(VisionFunction::FaceRecognition);

    group.bench_function("encode_start_command", |b| {
        b.iter(|| black_box(black_box(&cmd).encode()));
    });

    group.finish();
}

/// Benchmark classifying a recognition event frame.
fn bench_parse_recognition(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_recognition");
    group.throughput(Throughput::Elements(1));

    let frame = "$30,08,120,80,64,64,alice,91#";

    group.bench_function("parse_recognition_frame", |b| {
        b.iter(|| MessageParser::parse(black_box(frame)).unwrap());
    });

    group.finish();
}

/// Benchmark classifying a response frame.
fn bench_parse_response(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_response");
    group.throughput(Throughput::Elements(1));

    let frame = "$RSP,15,OK,1,8#";

    group.bench_function("parse_response_frame", |b| {
        b.iter(|| MessageParser::parse(black_box(frame)).unwrap());
    });

    group.finish();
}

/// Benchmark scanning a burst of frames out of a chunked stream.
fn bench_scan_burst(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_burst");

    let burst: String = (0..16)
        .map(|i| format!("$0,08,120,80,64,64,alice,{}#", 70 + i))
        .collect();
    group.throughput(Throughput::Bytes(burst.len() as u64));

    group.bench_function("scan_16_frame_burst", |b| {
        b.iter(|| {
            let mut scanner = FrameScanner::new();
            for chunk in burst.as_bytes().chunks(64) {
                scanner.feed_bytes(black_box(chunk));
            }
            let mut frames = 0usize;
            while scanner.next_frame().is_some() {
                frames += 1;
            }
            black_box(frames)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_encode_command,
    bench_parse_recognition,
    bench_parse_response,
    bench_scan_burst
);
criterion_main!(benches);
