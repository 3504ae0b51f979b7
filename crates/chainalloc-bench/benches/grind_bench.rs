//! Arena workload benchmarks.
//!
//! The same six workloads the `grind` CLI runs, measured per iteration by
//! criterion instead of wall-clock averaging.

use chainalloc_core::Arena;
use chainalloc_core::global::MEM_SIZE;
use chainalloc_harness::grind;
use criterion::{Criterion, criterion_group, criterion_main};

fn bench_single_byte_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_byte");
    let mut arena: Arena<MEM_SIZE> = Arena::new();

    group.bench_function("burst_pairs", |b| {
        b.iter(|| grind::burst_pairs(&mut arena));
    });
    group.bench_function("batch_then_drain", |b| {
        b.iter(|| grind::batch_then_drain(&mut arena));
    });

    let mut rng = 0x1EAF_1E55_0000_0001u64;
    group.bench_function("random_walk", |b| {
        b.iter(|| grind::random_walk(&mut arena, &mut rng));
    });
    group.finish();
}

fn bench_sized_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("sized");
    let mut arena: Arena<MEM_SIZE> = Arena::new();
    let mut rng = 0x1EAF_1E55_0000_0002u64;

    group.bench_function("sized_pairs", |b| {
        b.iter(|| grind::sized_pairs(&mut arena, &mut rng));
    });
    group.bench_function("sized_batch", |b| {
        b.iter(|| grind::sized_batch(&mut arena, &mut rng));
    });
    group.bench_function("fragmentation_churn", |b| {
        b.iter(|| grind::fragmentation_churn(&mut arena, &mut rng));
    });
    group.finish();
}

criterion_group!(benches, bench_single_byte_patterns, bench_sized_patterns);
criterion_main!(benches);
