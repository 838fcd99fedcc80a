use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qdigest::QDigest;
use rand::SeedableRng;
use rand_distr::{Distribution, Pareto};

const SIGMA: u64 = 4096;
const K: u64 = 64;

fn make_values(size: usize) -> Vec<u64> {
    // Request latencies in milliseconds: a big hump near the bottom of the domain with a long tail, cut off at the top
    // of the domain.
    let distribution = Pareto::new(1.0, 1.0).expect("pareto distribution should be valid");
    let mut rng = rand::rngs::SmallRng::seed_from_u64(0xC0FFEE);

    distribution
        .sample_iter(&mut rng)
        .map(|n| (n * 20.0) as u64)
        .filter(|n| *n < SIGMA)
        .take(size)
        .collect()
}

fn bench_digest(c: &mut Criterion) {
    let sizes = [100, 1_000, 10_000, 100_000];

    let mut group = c.benchmark_group("QDigest/build");
    for size in sizes.iter() {
        let values = make_values(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &values, |b, values| {
            b.iter(|| QDigest::new(black_box(values), K, SIGMA).expect("values should be in domain"));
        });
    }
    group.finish();

    let mut group = c.benchmark_group("QDigest/quantile");
    for size in sizes.iter() {
        let digest = QDigest::new(&make_values(*size), K, SIGMA).expect("values should be in domain");
        group.bench_with_input(BenchmarkId::from_parameter(size), &digest, |b, digest| {
            b.iter(|| {
                for q in [0.5, 0.9, 0.99] {
                    black_box(digest.quantile(black_box(q)).expect("digest should not be empty"));
                }
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("QDigest/serialize");
    for size in sizes.iter() {
        let digest = QDigest::new(&make_values(*size), K, SIGMA).expect("values should be in domain");
        group.bench_with_input(BenchmarkId::from_parameter(size), &digest, |b, digest| {
            b.iter(|| black_box(digest.serialize()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_digest);
criterion_main!(benches);
