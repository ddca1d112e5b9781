//! Matching throughput benchmarks.
//!
//! Run with: `cargo bench -p pylon-router`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use http::Method;
use pylon_router::PathMatcher;

/// Builds a table with `n` resource pairs (collection + item routes).
fn build_matcher(n: usize) -> PathMatcher {
    let mut matcher = PathMatcher::new();
    for i in 0..n {
        matcher
            .add_route(Method::GET, &format!("/resource{i}"), format!("listResource{i}"))
            .unwrap();
        matcher
            .add_route(
                Method::GET,
                &format!("/resource{i}/{{id}}"),
                format!("showResource{i}"),
            )
            .unwrap();
    }
    matcher
}

fn bench_static_match(c: &mut Criterion) {
    let matcher = build_matcher(50);
    c.bench_function("match_static_path", |b| {
        b.iter(|| black_box(matcher.match_request(&Method::GET, black_box("/resource25"))));
    });
}

fn bench_parameterized_match(c: &mut Criterion) {
    let matcher = build_matcher(50);
    c.bench_function("match_parameterized_path", |b| {
        b.iter(|| black_box(matcher.match_request(&Method::GET, black_box("/resource25/12345"))));
    });
}

fn bench_miss(c: &mut Criterion) {
    let matcher = build_matcher(50);
    c.bench_function("match_miss", |b| {
        b.iter(|| black_box(matcher.match_request(&Method::GET, black_box("/absent/path"))));
    });
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_scaling");
    for size in [10, 100, 500] {
        let matcher = build_matcher(size);
        let path = format!("/resource{}/77", size - 1);
        group.bench_with_input(BenchmarkId::new("last_route", size), &size, |b, _| {
            b.iter(|| black_box(matcher.match_request(&Method::GET, black_box(path.as_str()))));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_static_match,
    bench_parameterized_match,
    bench_miss,
    bench_scaling
);
criterion_main!(benches);
