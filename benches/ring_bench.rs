use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use shardcache::HashRing;

fn build_ring(peers: usize, replicas: usize) -> HashRing {
    let mut ring = HashRing::new(replicas, None);
    ring.add((0..peers).map(|i| format!("peer-{i}")));
    ring
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_add");
    for &replicas in &[10usize, 50, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(replicas), &replicas, |b, &replicas| {
            b.iter(|| build_ring(20, replicas));
        });
    }
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let ring = build_ring(50, 50);
    c.bench_function("ring_get", |b| {
        b.iter(|| {
            for i in 0..1000 {
                ring.get(&format!("key-{i}"));
            }
        });
    });
}

criterion_group!(benches, bench_add, bench_get);
criterion_main!(benches);
