//! Benchmarks for the workflow store
//!
//! Measures:
//! - Workflow creation with the template generator
//! - A full create/approve cycle with the dry-run publisher
//! - Pending-list reads as the store grows

use content_approval::publisher::DryRunPublisher;
use content_approval::workflow::{WorkflowEngine, WorkflowStore};
use content_approval::TemplateGenerator;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

fn create_store() -> Arc<WorkflowStore> {
    Arc::new(WorkflowStore::in_memory(WorkflowEngine::new(
        Arc::new(TemplateGenerator::default()),
        Arc::new(DryRunPublisher::default()),
        None,
    )))
}

fn bench_create(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = create_store();

    c.bench_function("store_create", |b| {
        b.iter(|| {
            rt.block_on(async {
                black_box(store.create("electric vehicles").await.unwrap());
            })
        })
    });
}

fn bench_decide_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_cycle");
    group.measurement_time(Duration::from_secs(10));

    let rt = Runtime::new().unwrap();

    for concurrency in [1usize, 8, 64].iter() {
        group.bench_with_input(
            BenchmarkId::new("create_approve", concurrency),
            concurrency,
            |b, &concurrency| {
                let store = create_store();
                b.iter(|| {
                    rt.block_on(async {
                        let handles: Vec<_> = (0..concurrency)
                            .map(|i| {
                                let store = store.clone();
                                tokio::spawn(async move {
                                    let (id, _) = store.create("rust").await.unwrap();
                                    store.decide(&id, i % 2 == 0).await.unwrap()
                                })
                            })
                            .collect();
                        for handle in handles {
                            black_box(handle.await.unwrap());
                        }
                    })
                })
            },
        );
    }

    group.finish();
}

fn bench_list_pending(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_list_pending");
    let rt = Runtime::new().unwrap();

    for size in [10usize, 100, 1000].iter() {
        let store = create_store();
        rt.block_on(async {
            for i in 0..*size {
                store.create(&format!("topic {}", i)).await.unwrap();
            }
        });

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| rt.block_on(async { black_box(store.list_pending().await.unwrap()) }))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_create, bench_decide_cycle, bench_list_pending);
criterion_main!(benches);
