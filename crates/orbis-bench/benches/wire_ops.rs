//! Criterion micro-benchmarks for the body wire layout.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use orbis_bench::reference_system;
use orbis_comm::wire::{decode_bodies, encode_bodies};

/// Benchmark: encode the 500-body reference system for a broadcast.
fn bench_encode_bodies_500(c: &mut Criterion) {
    let bodies = reference_system(42, 300, 191);

    c.bench_function("encode_bodies_500", |b| {
        b.iter(|| black_box(encode_bodies(&bodies)));
    });
}

/// Benchmark: decode the same buffer.
fn bench_decode_bodies_500(c: &mut Criterion) {
    let encoded = encode_bodies(&reference_system(42, 300, 191));

    c.bench_function("decode_bodies_500", |b| {
        b.iter(|| black_box(decode_bodies(&encoded).unwrap()));
    });
}

criterion_group!(benches, bench_encode_bodies_500, bench_decode_bodies_500);
criterion_main!(benches);
