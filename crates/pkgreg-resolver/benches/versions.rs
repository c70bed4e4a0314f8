//! Version resolution performance benchmarks
//!
//! Benchmarks range matching over remote version listings and the
//! latest-version computation behind package overviews.

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pkgreg_core::{Package, PackageId};
use pkgreg_resolver::{best_match, VersionAggregate};
use std::collections::HashMap;

fn version_list(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match i % 4 {
            3 => format!("{}.{}.{}-ballot{}", i / 100, (i / 10) % 10, i % 10, i),
            _ => format!("{}.{}.{}", i / 100, (i / 10) % 10, i % 10),
        })
        .collect()
}

fn bench_best_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("best_match");
    group.measurement_time(std::time::Duration::from_secs(5));

    for count in [10, 100, 1000] {
        let versions = version_list(count);
        group.throughput(Throughput::Elements(count as u64));

        for range in ["0.1.x", "^1.0.0", "0.0.1"] {
            group.bench_with_input(BenchmarkId::new(range, count), &versions, |b, versions| {
                b.iter(|| black_box(best_match(range, versions.iter().map(String::as_str))))
            });
        }
    }

    group.finish();
}

fn bench_latest_version(c: &mut Criterion) {
    let mut group = c.benchmark_group("latest_version");
    let now = Utc::now();

    for count in [10, 100, 1000] {
        group.throughput(Throughput::Elements(count as u64));

        // Prerelease-only sets take the download-time tie-break path
        for stable in [true, false] {
            let packages: Vec<Package> = version_list(count)
                .into_iter()
                .enumerate()
                .map(|(i, version)| {
                    let version = if stable || version.contains('-') {
                        version
                    } else {
                        format!("{}-snapshot", version)
                    };
                    Package::new(
                        PackageId::new("bench.package", version),
                        now + Duration::seconds(i as i64),
                        Vec::<u8>::new(),
                        None,
                    )
                })
                .filter_map(Result::ok)
                .collect();
            let aggregate = match VersionAggregate::new("bench.package", packages, HashMap::new()) {
                Ok(aggregate) => aggregate,
                Err(_) => continue,
            };

            let label = if stable { "mixed" } else { "prerelease" };
            group.bench_with_input(BenchmarkId::new(label, count), &aggregate, |b, aggregate| {
                b.iter(|| black_box(aggregate.latest_version().len()))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_best_match, bench_latest_version);
criterion_main!(benches);
