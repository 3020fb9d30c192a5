//! Criterion benchmarks for complete lockstep runs.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use orbis_bench::{bench_config, reference_system};
use orbis_comm::LocalGroup;
use orbis_engine::Simulation;

fn run_group(size: usize, timesteps: u64) {
    let config = bench_config(timesteps, 1024);
    let bodies = reference_system(42, 300, 191);
    let results = LocalGroup::run(size, |comm| {
        let mut sim = Simulation::new(comm, config.clone(), bodies.clone(), None).unwrap();
        sim.run().unwrap()
    });
    black_box(results);
}

fn bench_10_steps_single_rank(c: &mut Criterion) {
    c.bench_function("run_10_steps_500_bodies_1_rank", |b| {
        b.iter(|| run_group(1, 10));
    });
}

fn bench_10_steps_four_ranks(c: &mut Criterion) {
    c.bench_function("run_10_steps_500_bodies_4_ranks", |b| {
        b.iter(|| run_group(4, 10));
    });
}

criterion_group!(benches, bench_10_steps_single_rank, bench_10_steps_four_ranks);
criterion_main!(benches);
