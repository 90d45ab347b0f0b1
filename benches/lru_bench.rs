use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use shardcache::{ByteView, LruStore};

fn fill(store: &mut LruStore, n: usize) {
    for i in 0..n {
        let key = format!("key-{i}");
        store.add(&key, ByteView::from_bytes(key.as_bytes()));
    }
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("lru_add");
    for &n in &[1_000usize, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut store = LruStore::new(n * 64, None);
                fill(&mut store, n);
            });
        });
    }
    group.finish();
}

fn bench_get_hot_set(c: &mut Criterion) {
    let mut store = LruStore::new(1 << 20, None);
    fill(&mut store, 10_000);

    c.bench_function("lru_get_hit", |b| {
        b.iter(|| {
            for i in 0..1000 {
                let key = format!("key-{}", i % 10_000);
                store.get(&key);
            }
        });
    });
}

fn bench_eviction_pressure(c: &mut Criterion) {
    c.bench_function("lru_eviction_pressure", |b| {
        b.iter(|| {
            // Budget far smaller than the working set: every add evicts.
            let mut store = LruStore::new(4096, None);
            fill(&mut store, 5_000);
        });
    });
}

criterion_group!(benches, bench_add, bench_get_hot_set, bench_eviction_pressure);
criterion_main!(benches);
