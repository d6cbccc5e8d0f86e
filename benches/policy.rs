//! Benchmarks for the policy's per-request path.
//!
//! - Hits on a warm working set (lookup + frequency bump + planner check)
//! - Skewed mixed workload (admission, promotion, ghost traffic)
//! - Churn with every request a miss (eviction dominates)
//!
//! Run with: cargo bench --bench policy

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use weighted_s3fifo::{Request, WeightedS3Fifo};

const PARAMS: &str = "size-threshold=4096";

/// Size for an id: mostly small, every 16th id large.
fn size_for(id: u64) -> u64 {
    if id % 16 == 0 {
        16 * 1024
    } else {
        64 + (id % 64) * 32
    }
}

fn bench_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("policy/hit");

    for num_items in [1_000u64, 100_000] {
        let capacity = num_items * 4096;
        let mut policy = WeightedS3Fifo::from_params(capacity, PARAMS).unwrap();

        let requests: Vec<Request> = (1..=num_items)
            .map(|id| Request::new(id * 16 + 1, 128))
            .collect();
        for request in &requests {
            policy.get(request).unwrap();
        }

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{num_items}items")),
            &num_items,
            |b, _| {
                let mut idx = 0usize;
                b.iter(|| {
                    let hit = policy.get(black_box(&requests[idx])).unwrap();
                    idx = (idx + 1) % requests.len();
                    black_box(hit)
                });
            },
        );
    }

    group.finish();
}

fn bench_skewed(c: &mut Criterion) {
    let mut group = c.benchmark_group("policy/skewed");

    for (keys, capacity) in [(10_000u64, 4 * 1024 * 1024u64), (1_000_000, 64 * 1024 * 1024)] {
        let mut policy = WeightedS3Fifo::from_params(capacity, PARAMS).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{keys}keys")),
            &keys,
            |b, &keys| {
                b.iter(|| {
                    let sample: f64 = rng.random();
                    let id = (sample * sample * keys as f64) as u64;
                    let request = Request::new(id, size_for(id));
                    black_box(policy.get(&request).unwrap())
                });
            },
        );
    }

    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("policy/churn");
    let mut policy = WeightedS3Fifo::from_params(1024 * 1024, PARAMS).unwrap();
    let mut id = 0u64;

    group.throughput(Throughput::Elements(1));
    group.bench_function("miss", |b| {
        b.iter(|| {
            id += 1;
            let request = Request::new(id, 256).with_reload_cost((id % 4) as f64);
            black_box(policy.get(&request).unwrap())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_hit, bench_skewed, bench_churn);
criterion_main!(benches);
