/*!
 * Synchronization Primitives Benchmarks
 *
 * Compare lock/unlock cost across the mutex flavors and barrier rounds
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use spinsync::{CyclicSpinBarrier, SpinMutex, SpinRecursiveMutex, SpinRwMutex, SpinYieldMutex};
use std::sync::Arc;
use std::thread;

fn bench_uncontended_lock(c: &mut Criterion) {
    let mut group = c.benchmark_group("uncontended_lock");

    let spin = SpinMutex::new();
    group.bench_function("spin", |b| {
        b.iter(|| {
            let guard = spin.lock();
            black_box(&guard);
        })
    });

    let yielding = SpinYieldMutex::new();
    group.bench_function("yielding", |b| {
        b.iter(|| {
            let guard = yielding.lock();
            black_box(&guard);
        })
    });

    let recursive = SpinRecursiveMutex::new();
    group.bench_function("recursive", |b| {
        b.iter(|| {
            let guard = recursive.lock();
            black_box(&guard);
        })
    });

    group.finish();
}

fn bench_reentrant_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("reentrant_depth");

    for depth in [2usize, 8, 32] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let mutex = SpinRecursiveMutex::new();
            b.iter(|| {
                let mut guards = Vec::with_capacity(depth);
                for _ in 0..depth {
                    guards.push(mutex.lock());
                }
                black_box(&guards);
            })
        });
    }

    group.finish();
}

fn bench_read_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("rwlock");

    let rw = SpinRwMutex::new();
    group.bench_function("read", |b| {
        b.iter(|| {
            let guard = rw.read();
            black_box(&guard);
        })
    });
    group.bench_function("write", |b| {
        b.iter(|| {
            let guard = rw.write();
            black_box(&guard);
        })
    });

    group.finish();
}

fn bench_barrier_rounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("cyclic_barrier");
    group.sample_size(20);

    for threads in [2usize, 4] {
        group.bench_with_input(
            BenchmarkId::from_parameter(threads),
            &threads,
            |b, &threads| {
                b.iter(|| {
                    let barrier = Arc::new(CyclicSpinBarrier::new(threads));
                    let handles: Vec<_> = (0..threads - 1)
                        .map(|_| {
                            let barrier = Arc::clone(&barrier);
                            thread::spawn(move || {
                                for _ in 0..10 {
                                    barrier.wait();
                                }
                            })
                        })
                        .collect();
                    for _ in 0..10 {
                        barrier.wait();
                    }
                    for handle in handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_uncontended_lock,
    bench_reentrant_depth,
    bench_read_throughput,
    bench_barrier_rounds
);
criterion_main!(benches);
