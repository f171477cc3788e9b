//! Benchmarks for loading, summarizing and outlier detection.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use datalens::analyzers::{DatasetProfiler, OutlierDetector};
use datalens::dataset::Dataset;
use datalens::insights::InsightEngine;
use datalens::sources::{DataLoader, SourceInput};
use std::time::Duration;

fn sales_csv(rows: usize) -> Vec<u8> {
    let regions = ["north", "south", "east", "west"];
    let mut csv = String::from("order_id,amount,quantity,region,placed,comment\n");
    for i in 0..rows {
        let amount = if i % 97 == 0 {
            String::new()
        } else {
            format!("{:.2}", 10.0 + (i % 113) as f64 * 1.7)
        };
        csv.push_str(&format!(
            "{i},{amount},{},{},2024-{:02}-{:02},note {i}\n",
            i % 9,
            regions[i % regions.len()],
            (i % 12) + 1,
            (i % 28) + 1
        ));
    }
    csv.into_bytes()
}

fn load(rows: usize) -> Dataset {
    DataLoader::default()
        .load(SourceInput::bytes("sales.csv", sales_csv(rows)))
        .unwrap()
}

fn bench_load_csv(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_csv");
    group.measurement_time(Duration::from_secs(8));

    for rows in [1_000, 10_000, 100_000] {
        let bytes = sales_csv(rows);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &bytes, |b, bytes| {
            let loader = DataLoader::default();
            b.iter(|| {
                loader
                    .load(SourceInput::bytes("sales.csv", std::hint::black_box(bytes.clone())))
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");

    for rows in [1_000, 10_000, 100_000] {
        let dataset = load(rows);
        let profiler = DatasetProfiler::default();
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &dataset, |b, dataset| {
            b.iter(|| profiler.summarize(std::hint::black_box(dataset)).unwrap());
        });
    }

    group.finish();
}

fn bench_outliers_and_insights(c: &mut Criterion) {
    let mut group = c.benchmark_group("outliers_and_insights");
    let dataset = load(50_000);
    let summary = DatasetProfiler::default().summarize(&dataset).unwrap();

    for threshold in [2.0, 3.0] {
        let detector = OutlierDetector::new(threshold).unwrap();
        group.bench_with_input(
            BenchmarkId::new("z_score", threshold),
            &dataset,
            |b, dataset| {
                b.iter(|| detector.detect(std::hint::black_box(dataset)).unwrap());
            },
        );
    }

    let engine = InsightEngine::default();
    group.bench_function("insight_rules", |b| {
        b.iter(|| {
            engine
                .generate_all(std::hint::black_box(&dataset), &summary)
                .unwrap()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_load_csv,
    bench_summarize,
    bench_outliers_and_insights
);
criterion_main!(benches);
