use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use task_pool::prelude::*;

fn benchmark_pool_creation(c: &mut Criterion) {
    c.bench_function("pool_creation", |b| {
        b.iter(|| {
            let pool = ThreadPool::with_threads(4).expect("Failed to create pool");
            pool.shutdown().expect("Failed to shutdown pool");
        });
    });
}

fn benchmark_task_submission(c: &mut Criterion) {
    let mut group = c.benchmark_group("task_submission");

    // Lightweight tasks, handles discarded
    group.bench_function("detached_tasks_100", |b| {
        b.iter_batched(
            || ThreadPool::with_threads(4).expect("Failed to create pool"),
            |pool| {
                for _ in 0..100 {
                    pool.execute(|| {
                        black_box(1 + 1);
                        Ok(())
                    })
                    .expect("Failed to submit task");
                }
                pool.shutdown().expect("Failed to shutdown pool");
            },
            BatchSize::SmallInput,
        );
    });

    // Submit-and-wait round trips
    group.bench_function("awaited_tasks_100", |b| {
        b.iter_batched(
            || ThreadPool::with_threads(4).expect("Failed to create pool"),
            |pool| {
                let handles: Vec<TaskHandle<u64>> = (0..100u64)
                    .map(|i| {
                        pool.submit(move || {
                            let mut sum = 0u64;
                            for j in 0..1000 {
                                sum = sum.wrapping_add(i ^ j);
                            }
                            Ok(sum)
                        })
                        .expect("Failed to submit task")
                    })
                    .collect();
                for handle in handles {
                    black_box(handle.wait().expect("task should resolve"));
                }
                pool.shutdown().expect("Failed to shutdown pool");
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, benchmark_pool_creation, benchmark_task_submission);
criterion_main!(benches);
