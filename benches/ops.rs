use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use shardlru::builder::CacheBuilder;
use shardlru::cache::Cache;
use std::hint::black_box;

fn warm_cache(shards: u16, cap: u16, keys: u64) -> Cache<u64, u64> {
    let cache = CacheBuilder::new(shards, cap).build().unwrap();
    for k in 0..keys {
        cache.put(k, k);
    }
    cache
}

fn bench_put_get_hit(c: &mut Criterion) {
    c.bench_function("put_get_hit", |b| {
        b.iter_batched(
            || warm_cache(16, 1024, 1024),
            |cache| {
                for k in 0..1024u64 {
                    cache.put(black_box(k + 100_000), k);
                    let _ = black_box(cache.get(&black_box(k)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("get_miss", |b| {
        b.iter_batched(
            || warm_cache(16, 1024, 1024),
            |cache| {
                for k in 0..1024u64 {
                    let _ = black_box(cache.get(&black_box(k + 1_000_000)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_eviction_churn(c: &mut Criterion) {
    c.bench_function("eviction_churn", |b| {
        b.iter_batched(
            || warm_cache(4, 256, 1024),
            |cache| {
                // Every insert lands in a full shard and reuses a slot.
                for k in 0..1024u64 {
                    cache.put(black_box(k + 10_000), k);
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_lru2_promotion(c: &mut Criterion) {
    c.bench_function("lru2_promotion_churn", |b| {
        b.iter_batched(
            || {
                let cache = CacheBuilder::new(16, 512).lru2(512).build::<u64, u64>().unwrap();
                for k in 0..512u64 {
                    cache.put(k, k);
                }
                cache
            },
            |cache| {
                // First get promotes, second refreshes inside the hot level.
                for k in 0..512u64 {
                    let _ = black_box(cache.get(&black_box(k)));
                    let _ = black_box(cache.get(&black_box(k)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_put_i64(c: &mut Criterion) {
    c.bench_function("put_get_i64", |b| {
        b.iter_batched(
            || CacheBuilder::new(16, 1024).build::<u64, u64>().unwrap(),
            |cache| {
                for k in 0..1024u64 {
                    cache.put_i64(black_box(k), k as i64);
                    let _ = black_box(cache.get_i64(&black_box(k)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_put_get_hit,
    bench_get_miss,
    bench_eviction_churn,
    bench_lru2_promotion,
    bench_put_i64
);
criterion_main!(benches);
