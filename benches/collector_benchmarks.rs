// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Performance Benchmarks for the Enumeration Collector
 * Measures deduplication and filter throughput on synthetic result streams
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lonkero_recon::discovery::{EnumerationCollector, HostFilter};
use lonkero_recon::sources::ResultStream;
use lonkero_recon::types::{normalize_host, SourceResult};
use tokio::sync::mpsc;

const SOURCES: [&str; 4] = ["alienvault", "crtsh", "hackertarget", "webarchive"];

/// `hosts` distinct names reported by every source, half of them upper-cased
fn synthetic_results(hosts: usize) -> Vec<SourceResult> {
    let mut results = Vec::with_capacity(hosts * SOURCES.len());
    for source in SOURCES {
        for i in 0..hosts {
            let host = if i % 2 == 0 {
                format!("host-{}.example.com", i)
            } else {
                format!("*.HOST-{}.EXAMPLE.COM", i)
            };
            results.push(SourceResult::value(source, host));
        }
    }
    results
}

fn stream_of(results: Vec<SourceResult>) -> ResultStream {
    let (tx, rx) = mpsc::channel(results.len().max(1));
    for result in results {
        let _ = tx.try_send(result);
    }
    rx
}

fn bench_normalize_host(c: &mut Criterion) {
    c.bench_function("normalize_host", |b| {
        b.iter(|| black_box(normalize_host(black_box("*.API.Staging.Example.COM"))));
    });
}

fn bench_collect(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("collector_dedup");

    for hosts in [100usize, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(hosts), &hosts, |b, &hosts| {
            b.to_async(&runtime).iter(|| async move {
                let collector = EnumerationCollector::default();
                let outcome = collector.collect(stream_of(synthetic_results(hosts)), None).await;
                black_box(outcome.len())
            });
        });
    }
    group.finish();
}

fn bench_collect_with_filters(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let filter = HostFilter::new(
        &[r"^cdn\..*".to_string(), r"-[0-9]*7\.".to_string()],
        &[r"example\.com$".to_string()],
    )
    .unwrap();

    c.bench_function("collector_filtered_1000", |b| {
        b.to_async(&runtime).iter(|| {
            let filter = filter.clone();
            async move {
                let collector = EnumerationCollector::new(filter);
                let outcome = collector.collect(stream_of(synthetic_results(1_000)), None).await;
                black_box(outcome.len())
            }
        });
    });
}

criterion_group!(benches, bench_normalize_host, bench_collect, bench_collect_with_filters);
criterion_main!(benches);
