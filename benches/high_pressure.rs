use bounded_lru::{LruCache, ShardedLruCache};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use moka::sync::Cache as MokaCache;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::thread;

const THREAD_COUNT: usize = 4;
const OPERATIONS_PER_THREAD: usize = 10_000;
const CACHE_CAPACITY: usize = 10_000;
const KEY_SPACE_SIZE: usize = 20_000;

// Precomputed so that key generation stays out of the measured loop.
fn workload(seed: u64) -> Vec<(String, bool)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..OPERATIONS_PER_THREAD)
        .map(|_| {
            let key = format!("key_{}", rng.gen_range(0..KEY_SPACE_SIZE));
            // 80% reads, 20% writes
            (key, rng.gen_ratio(1, 5))
        })
        .collect()
}

fn run_threads<F>(workloads: &[Arc<Vec<(String, bool)>>], op: F)
where
    F: Fn(&str, bool) + Send + Sync + Clone + 'static,
{
    let handles: Vec<_> = workloads
        .iter()
        .map(|ops| {
            let ops = Arc::clone(ops);
            let op = op.clone();
            thread::spawn(move || {
                for (key, write) in ops.iter() {
                    op(key, *write);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

fn bench_mixed(c: &mut Criterion) {
    let workloads: Vec<_> = (0..THREAD_COUNT as u64)
        .map(|seed| Arc::new(workload(seed)))
        .collect();
    let mut group = c.benchmark_group("mixed_80r_20w");

    group.bench_function(BenchmarkId::new("lru", THREAD_COUNT), |b| {
        let cache = Arc::new(LruCache::new(CACHE_CAPACITY).unwrap());
        b.iter(|| {
            let cache = Arc::clone(&cache);
            run_threads(&workloads, move |key, write| {
                if write {
                    cache.set(key.to_string(), key.len());
                } else {
                    let _ = cache.get(&key.to_string());
                }
            })
        })
    });

    group.bench_function(BenchmarkId::new("sharded_lru", THREAD_COUNT), |b| {
        let cache = Arc::new(ShardedLruCache::new(CACHE_CAPACITY).unwrap());
        b.iter(|| {
            let cache = Arc::clone(&cache);
            run_threads(&workloads, move |key, write| {
                if write {
                    cache.set(key.to_string(), key.len());
                } else {
                    let _ = cache.get(&key.to_string());
                }
            })
        })
    });

    group.bench_function(BenchmarkId::new("moka", THREAD_COUNT), |b| {
        let cache: MokaCache<String, usize> = MokaCache::new(CACHE_CAPACITY as u64);
        b.iter(|| {
            let cache = cache.clone();
            run_threads(&workloads, move |key, write| {
                if write {
                    cache.insert(key.to_string(), key.len());
                } else {
                    let _ = cache.get(key);
                }
            })
        })
    });

    group.finish();
}

fn bench_single_thread(c: &mut Criterion) {
    let ops = workload(42);
    let cache = LruCache::new(CACHE_CAPACITY).unwrap();

    c.bench_function("lru_single_thread", |b| {
        b.iter(|| {
            for (key, write) in &ops {
                if *write {
                    cache.set(key.clone(), key.len());
                } else if !cache.update(key.clone(), key.len()) {
                    let _ = cache.exists(key);
                }
            }
        })
    });
}

criterion_group!(benches, bench_mixed, bench_single_thread);
criterion_main!(benches);
