//! Protocol encoding/decoding benchmarks.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use telink_protocol::{decode_hex, AdvertisingData, Message, ProtocolType, ScanResponse};

const SCAN_RESPONSE: &str = "1EFF11021102787321436000014B00000102030405060708090A0B0C0D0E0F";

fn bench_frame_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_encode");

    for size in [16, 256, 4096] {
        let message = Message::new(ProtocolType(0x55AA), Bytes::from(vec![0xFFu8; size])).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &message, |b, message| {
            b.iter(|| black_box(message.encode().unwrap()));
        });
    }

    group.finish();
}

fn bench_frame_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_decode");

    for size in [16, 256, 4096] {
        let message = Message::new(ProtocolType(0x55AA), Bytes::from(vec![0xFFu8; size])).unwrap();
        let encoded = message.encode().unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &encoded, |b, encoded| {
            b.iter(|| black_box(Message::from_bytes(encoded.clone()).unwrap()));
        });
    }

    group.finish();
}

fn bench_scan_response(c: &mut Criterion) {
    let data = decode_hex(SCAN_RESPONSE).unwrap();

    c.bench_function("scan_response_parse", |b| {
        b.iter(|| {
            let advertising = AdvertisingData::parse(data.clone()).unwrap();
            black_box(ScanResponse::from_advertising_data(&advertising).unwrap())
        });
    });
}

criterion_group!(
    benches,
    bench_frame_encode,
    bench_frame_decode,
    bench_scan_response
);
criterion_main!(benches);
