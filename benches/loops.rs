//! Hand-written loop versus iterator chain for the even-square sum.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_basics::lessons::functions::even_square_sum;
use rust_basics::lessons::loops::{manual_even_square_sum, Fibonacci};

fn bench_even_square_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("even_square_sum");

    for size in [10, 1_000, 100_000] {
        let numbers: Vec<i64> = (1..=size).collect();
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("manual", size), &numbers, |b, numbers| {
            b.iter(|| manual_even_square_sum(black_box(numbers)));
        });
        group.bench_with_input(BenchmarkId::new("iterator", size), &numbers, |b, numbers| {
            b.iter(|| even_square_sum(black_box(numbers)));
        });
    }

    group.finish();
}

fn bench_fibonacci(c: &mut Criterion) {
    c.bench_function("fibonacci_take_50", |b| {
        b.iter(|| Fibonacci::new().take(black_box(50)).sum::<u64>());
    });
}

criterion_group!(benches, bench_even_square_sum, bench_fibonacci);
criterion_main!(benches);
