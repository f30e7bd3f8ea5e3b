//! Performance benchmarks for the PIA engine.
//!
//! This benchmark suite covers:
//! - One retirement computation, direct and through the HTTP API
//! - A survivor case with a family and a reindexed widow(er)
//! - Parallel batches of 100 and 1000 workers
//! - Scaling with the length of the earnings record
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use pia_engine::api::{AppState, CalculationRequest, create_router};
use pia_engine::calculation::{calculate, calculate_batch};
use pia_engine::config::ConfigLoader;
use pia_engine::models::WorkerRecord;

use axum::{body::Body, http::Request};
use tower::ServiceExt;

fn load_config() -> ConfigLoader {
    ConfigLoader::load("./config/law").expect("Failed to load config")
}

/// A retiree born in April 1958 with `years` years of earnings ending 2023.
fn retiree(id: &str, years: i32) -> WorkerRecord {
    let earnings: serde_json::Map<String, serde_json::Value> = (2024 - years..=2023)
        .map(|year| (year.to_string(), serde_json::json!("42000")))
        .collect();
    serde_json::from_value(serde_json::json!({
        "id": id,
        "birth_date": "1958-04-10",
        "benefit_type": "old_age",
        "entitlement_date": "2024-04",
        "earnings": earnings
    }))
    .expect("Failed to create worker")
}

/// A worker who died at 40, leaving a widow and a child.
fn survivor_family() -> WorkerRecord {
    let earnings: serde_json::Map<String, serde_json::Value> = (1982..=2000)
        .map(|year| (year.to_string(), serde_json::json!("30000")))
        .collect();
    serde_json::from_value(serde_json::json!({
        "id": "survivor",
        "birth_date": "1960-05-10",
        "benefit_type": "survivor",
        "entitlement_date": "2022-09",
        "death_date": "2000-07-15",
        "earnings": earnings,
        "family": [
            { "id": "widow", "beneficiary": "widow", "birth_date": "1962-08-20", "entitlement_date": "2022-09" },
            { "id": "child", "beneficiary": "child", "birth_date": "2005-02-01", "entitlement_date": "2022-09" }
        ]
    }))
    .expect("Failed to create worker")
}

/// Benchmark: One retirement computation.
fn bench_single_worker(c: &mut Criterion) {
    let config = load_config();
    let worker = retiree("bench", 40);

    c.bench_function("single_worker", |b| {
        b.iter(|| black_box(calculate(black_box(&worker), config.law(), config.engine())))
    });
}

/// Benchmark: A survivor case with family benefits.
fn bench_survivor_family(c: &mut Criterion) {
    let config = load_config();
    let worker = survivor_family();

    c.bench_function("survivor_family", |b| {
        b.iter(|| black_box(calculate(black_box(&worker), config.law(), config.engine())))
    });
}

/// Benchmark: One retirement computation through the HTTP API.
fn bench_http_single(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = create_router(AppState::new(load_config()));
    let request = CalculationRequest {
        worker: retiree("bench", 40),
        validation: None,
    };
    let body = serde_json::to_string(&request).unwrap();

    c.bench_function("http_single_worker", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/calculate")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

/// Benchmark: Parallel batches.
fn bench_batches(c: &mut Criterion) {
    let config = load_config();
    let mut group = c.benchmark_group("batch_processing");

    for size in [100usize, 1000] {
        let workers: Vec<WorkerRecord> = (0..size)
            .map(|i| retiree(&format!("w_{:04}", i), 20 + (i % 25) as i32))
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        if size >= 1000 {
            // Reduce sample size for large batches to keep benchmark time reasonable
            group.sample_size(10);
        }
        group.bench_with_input(BenchmarkId::new("workers", size), &workers, |b, workers| {
            b.iter(|| black_box(calculate_batch(workers, config.law(), config.engine())))
        });
    }

    group.finish();
}

/// Benchmark: Earnings record length, to understand scaling behavior.
fn bench_scaling(c: &mut Criterion) {
    let config = load_config();
    let mut group = c.benchmark_group("scaling");

    for years in [5, 15, 25, 35, 44] {
        let worker = retiree("bench", years);
        group.bench_with_input(BenchmarkId::new("earnings_years", years), &worker, |b, worker| {
            b.iter(|| black_box(calculate(worker, config.law(), config.engine())))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_worker,
    bench_survivor_family,
    bench_http_single,
    bench_batches,
    bench_scaling,
);
criterion_main!(benches);
