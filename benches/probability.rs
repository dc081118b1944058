//! Manifestation probability benchmarks.
//!
//! Compares the f64 path with the decimal path across regimes and
//! precisions.
//!
//! Run with: `cargo bench --bench probability`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use u_manifest::manifestation::{critical_tau, probability_from_tau};
use u_manifest::precise::{self, Decimal, Precision};

fn bench_f64(c: &mut Criterion) {
    let mut group = c.benchmark_group("f64");
    for &tau in &[1e-10, 4.6, 100.0] {
        group.bench_with_input(BenchmarkId::new("probability", tau), &tau, |b, &tau| {
            b.iter(|| probability_from_tau(black_box(tau)))
        });
    }
    group.bench_function("critical_tau", |b| b.iter(|| critical_tau(black_box(0.99))));
    group.finish();
}

fn bench_decimal(c: &mut Criterion) {
    let mut group = c.benchmark_group("decimal");
    let tau: Decimal = "4.605170185988092".parse().expect("valid decimal");
    for &digits in &[15u32, 30, 100] {
        let precision = Precision::new(digits).expect("valid precision");
        group.bench_with_input(
            BenchmarkId::new("probability", digits),
            &precision,
            |b, &precision| b.iter(|| precise::probability_from_tau(black_box(&tau), precision)),
        );
    }

    let target: Decimal = "0.99".parse().expect("valid decimal");
    group.bench_function("critical_tau/30", |b| {
        b.iter(|| precise::critical_tau(black_box(&target), Precision::default()))
    });
    group.finish();
}

criterion_group!(benches, bench_f64, bench_decimal);
criterion_main!(benches);
