//! Throughput benchmarks for queue operations.
//!
//! Run with: cargo bench --bench queue_ops
//!
//! Storage is pre-allocated once per group and reused via `clear`.

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use nexus_ilist::{BoxedStorage, Element, Queue, QueuePool};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

const LEN: usize = 4_096;

fn payloads() -> Vec<String> {
    let mut items: Vec<String> = (0..LEN).map(|i| format!("{i:08}")).collect();
    items.shuffle(&mut StdRng::seed_from_u64(42));
    items
}

// ============================================================================
// Insert / Remove
// ============================================================================

fn bench_insert_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_remove");
    group.throughput(Throughput::Elements(LEN as u64));

    let items = payloads();
    let mut storage: BoxedStorage<Element> = BoxedStorage::with_capacity(LEN);
    let mut queue: Queue = Queue::new();

    group.bench_function("tail/head", |b| {
        b.iter(|| {
            for item in &items {
                black_box(queue.insert_tail(&mut storage, item.as_bytes()).unwrap());
            }
            while let Some(e) = queue.remove_head(&mut storage, None) {
                black_box(e);
            }
        });
    });

    let mut pool: QueuePool = QueuePool::with_capacity(LEN, 1);
    let id = pool.new_queue().unwrap();

    group.bench_function("pool tail/head", |b| {
        b.iter(|| {
            for item in &items {
                black_box(pool.insert_tail(id, item.as_bytes()).unwrap());
            }
            while let Some(e) = pool.remove_head(id, None) {
                black_box(e);
            }
        });
    });

    group.finish();
}

// ============================================================================
// Structural transforms
// ============================================================================

fn bench_transforms(c: &mut Criterion) {
    let mut group = c.benchmark_group("transforms");
    group.throughput(Throughput::Elements(LEN as u64));

    let items = payloads();
    let mut storage: BoxedStorage<Element> = BoxedStorage::with_capacity(LEN);
    let mut queue: Queue = Queue::new();
    for item in &items {
        queue.insert_tail(&mut storage, item.as_bytes()).unwrap();
    }

    group.bench_function("reverse", |b| {
        b.iter(|| queue.reverse(&mut storage));
    });

    group.bench_function("reverse_k/8", |b| {
        b.iter(|| queue.reverse_k(&mut storage, 8));
    });

    group.bench_function("swap", |b| {
        b.iter(|| queue.swap(&mut storage));
    });

    group.bench_function("size", |b| {
        b.iter(|| black_box(queue.size(&storage)));
    });

    group.finish();
}

// ============================================================================
// Sort
// ============================================================================

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort");
    group.throughput(Throughput::Elements(LEN as u64));

    let items = payloads();
    let mut storage: BoxedStorage<Element> = BoxedStorage::with_capacity(LEN);

    for descending in [false, true] {
        let name = if descending { "descending" } else { "ascending" };
        group.bench_function(name, |b| {
            b.iter_batched_ref(
                Queue::new,
                |queue: &mut Queue| {
                    for item in &items {
                        queue.insert_tail(&mut storage, item.as_bytes()).unwrap();
                    }
                    queue.sort(&mut storage, descending);
                    queue.clear(&mut storage);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert_remove, bench_transforms, bench_sort);
criterion_main!(benches);
