//! CRUD benchmarks for Taskboard controllers
//!
//! Run with: `cargo bench -p taskboard-core`
//!
//! These benchmarks measure the controller hot paths on both backends:
//! - Item creation (coercion + insert)
//! - Partial-record reads by parent task
//! - Sparse updates with timestamp refresh

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use taskboard_core::models::record_from;
use taskboard_core::services::{ItemController, ResourceHandler};
use taskboard_core::{DataContext, DatabaseConfig};
use tempfile::TempDir;
use tokio::runtime::Runtime;

/// Setup an item controller on the requested backend
async fn setup_items(config: &DatabaseConfig) -> ItemController {
    let context = DataContext::create_context(config).await.unwrap();
    ItemController::new(&context)
}

fn backends() -> (Vec<(&'static str, DatabaseConfig)>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let configs = vec![
        ("memory", DatabaseConfig::memory()),
        ("libsql", DatabaseConfig::libsql(temp_dir.path().join("bench.db"))),
    ];
    (configs, temp_dir)
}

fn bench_create(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (configs, _temp) = backends();

    let mut group = c.benchmark_group("item_create");
    for (name, config) in &configs {
        group.bench_function(*name, |b| {
            b.iter_custom(|iters| {
                rt.block_on(async {
                    let items = setup_items(config).await;

                    let start = std::time::Instant::now();
                    for i in 0..iters {
                        items
                            .create(record_from([
                                ("parentTaskId", json!(1)),
                                ("description", json!(format!("item {}", i))),
                            ]))
                            .await
                            .unwrap();
                    }
                    start.elapsed()
                })
            });
        });
    }
    group.finish();
}

fn bench_read_by_task(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (configs, _temp) = backends();

    let mut group = c.benchmark_group("item_read_by_task");
    for (name, config) in &configs {
        let items = rt.block_on(async {
            let items = setup_items(config).await;
            items.delete_all().await.unwrap();
            for task_id in 0..10 {
                for _ in 0..50 {
                    items
                        .create(record_from([("parentTaskId", json!(task_id))]))
                        .await
                        .unwrap();
                }
            }
            items
        });

        group.bench_function(*name, |b| {
            b.iter(|| rt.block_on(async { black_box(items.read_by_task_id(3).await.unwrap()) }));
        });
    }
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (configs, _temp) = backends();

    let mut group = c.benchmark_group("item_update");
    for (name, config) in &configs {
        let (items, id) = rt.block_on(async {
            let items = setup_items(config).await;
            let created = items
                .create(record_from([("parentTaskId", json!(1))]))
                .await
                .unwrap();
            let id = created["id"].as_i64().unwrap();
            (items, id)
        });

        group.bench_function(*name, |b| {
            b.iter(|| {
                rt.block_on(async {
                    black_box(
                        items
                            .update(id, record_from([("done", json!(true))]))
                            .await
                            .unwrap(),
                    )
                })
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_create, bench_read_by_task, bench_update);
criterion_main!(benches);
