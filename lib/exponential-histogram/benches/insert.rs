use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use exponential_histogram::{ExponentialHistogram, Window};

fn bench_insert_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("ExponentialHistogram/insert-single");
    for accuracy in [0.5, 0.1, 0.01] {
        group.throughput(Throughput::Elements(100_000));
        group.bench_with_input(BenchmarkId::from_parameter(accuracy), &accuracy, |b, &accuracy| {
            b.iter(|| {
                let mut histogram = ExponentialHistogram::new(accuracy, Window::Bounded(7_100)).unwrap();
                for t in 0..100_000 {
                    histogram.insert(t);
                    histogram.expire(t);
                }
                histogram
            });
        });
    }
    group.finish();
}

fn bench_insert_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("ExponentialHistogram/insert-many");
    for count in [1u64, 10, 1_000, 1_000_000, 1 << 48] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut histogram = ExponentialHistogram::unbounded(0.1).unwrap();
                for t in 0..100 {
                    histogram.insert_many(t, count);
                }
                histogram
            });
        });
    }
    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut left = ExponentialHistogram::unbounded(0.05).unwrap();
    let mut right = ExponentialHistogram::unbounded(0.05).unwrap();
    for t in 0..10_000 {
        left.insert(t);
        right.insert_many(t, 3);
    }

    c.bench_function("ExponentialHistogram/merge", |b| {
        b.iter(|| {
            let mut merged = left.clone();
            merged.merge(&right);
            merged
        });
    });
}

criterion_group!(benches, bench_insert_single, bench_insert_many, bench_merge);
criterion_main!(benches);
