//! Throughput Benchmark for HearthKV
//!
//! This benchmark measures the performance of the key-value store
//! under various workloads.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use hearthkv::storage::KvStore;
use std::sync::Arc;

/// Benchmark SET operations
fn bench_set(c: &mut Criterion) {
    let store = Arc::new(KvStore::new());

    let mut group = c.benchmark_group("set");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_small", |b| {
        let mut i = 0u64;
        b.iter(|| {
            store.set(format!("key:{}", i), Bytes::from("small_value"), 0);
            i += 1;
        });
    });

    group.bench_function("set_medium", |b| {
        let mut i = 0u64;
        let value = Bytes::from("x".repeat(1024)); // 1KB value
        b.iter(|| {
            store.set(format!("key:{}", i), value.clone(), 0);
            i += 1;
        });
    });

    group.bench_function("set_with_ttl", |b| {
        let mut i = 0u64;
        b.iter(|| {
            store.set(format!("ttl:{}", i), Bytes::from("value"), 3600);
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark GET operations
fn bench_get(c: &mut Criterion) {
    let store = Arc::new(KvStore::new());

    // Pre-populate with data
    for i in 0..100_000 {
        store.set(format!("key:{}", i), Bytes::from(format!("value:{}", i)), 0);
    }

    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_hit", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key:{}", i % 100_000);
            black_box(store.get(&key));
            i += 1;
        });
    });

    group.bench_function("get_miss", |b| {
        b.iter(|| {
            black_box(store.get("missing:key"));
        });
    });

    group.finish();
}

/// Benchmark the bulk expiry sweep
fn bench_cleanup(c: &mut Criterion) {
    let mut group = c.benchmark_group("cleanup");

    group.bench_function("cleanup_no_expired", |b| {
        let store = Arc::new(KvStore::new());
        for i in 0..10_000 {
            store.set(format!("key:{}", i), Bytes::from("value"), 0);
        }

        b.iter(|| {
            black_box(store.cleanup_expired());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_set, bench_get, bench_cleanup);
criterion_main!(benches);
