//! Paged sparse set benchmarks
//!
//! Run with: cargo bench --bench sparse_set_bench

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use tessera_ecs::PagedSparseSet;

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_insert");

    for page_size in [16usize, 64, 256].iter() {
        group.bench_with_input(
            BenchmarkId::new("paged_insert_10k", page_size),
            page_size,
            |b, &page_size| {
                b.iter(|| {
                    let mut set: PagedSparseSet<u32, u64> =
                        PagedSparseSet::with_page_size(page_size);
                    for key in 0..10_000u32 {
                        set.insert(key, key as u64);
                    }
                    set
                });
            },
        );
    }

    group.bench_function("hashmap_insert_10k", |b| {
        b.iter(|| {
            let mut map: HashMap<u32, u64> = HashMap::new();
            for key in 0..10_000u32 {
                map.insert(key, key as u64);
            }
            map
        });
    });

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_lookup");

    let mut set: PagedSparseSet<u32, u64> = PagedSparseSet::new();
    for key in (0..40_000u32).step_by(4) {
        set.insert(key, key as u64);
    }

    group.bench_function("paged_get_strided_10k", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for key in 0..40_000u32 {
                if let Some(value) = set.get(key) {
                    sum += value;
                }
            }
            black_box(sum)
        });
    });

    group.bench_function("paged_dense_scan_10k", |b| {
        b.iter(|| black_box(set.values().iter().sum::<u64>()));
    });

    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_remove");

    group.bench_function("paged_remove_half_10k", |b| {
        b.iter_batched(
            || {
                let mut set: PagedSparseSet<u32, u64> = PagedSparseSet::new();
                for key in 0..10_000u32 {
                    set.insert(key, key as u64);
                }
                set
            },
            |mut set| {
                for key in (0..10_000u32).step_by(2) {
                    black_box(set.remove(key));
                }
                set
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_lookup, bench_remove);
criterion_main!(benches);
