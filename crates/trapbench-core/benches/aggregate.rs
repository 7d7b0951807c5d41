//! Aggregation-path benchmark
//!
//! The report is computed outside the timed region, but runs can reach
//! millions of iterations; keep the single pass over the measurement set
//! cheap.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use trapbench_core::{Measurement, Report, SamplePolicy};

fn synthetic_set(n: usize) -> Vec<Measurement> {
    let policy = SamplePolicy::default();
    (0..n as u64)
        .map(|i| {
            let base = 1_000 + i * 10_000;
            policy.derive(base, base + 500, base + 500, base + 800)
        })
        .collect()
}

fn bench_compute(c: &mut Criterion) {
    let set = synthetic_set(100_000);
    c.bench_function("report_compute_100k", |b| {
        b.iter(|| Report::compute(black_box(&set)).unwrap())
    });
}

fn bench_derive(c: &mut Criterion) {
    let policy = SamplePolicy::default();
    c.bench_function("sample_derive", |b| {
        b.iter(|| {
            policy.derive(
                black_box(1_000),
                black_box(1_500),
                black_box(1_700),
                black_box(2_000),
            )
        })
    });
}

criterion_group!(benches, bench_compute, bench_derive);
criterion_main!(benches);
