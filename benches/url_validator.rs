//! URL 参数验证基准测试

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use relaylink::api::cookie::encode_cookie_value;
use relaylink::utils::validate_url_param;

// ============== validate_url_param 基准测试 ==============

fn bench_validate_url_param(c: &mut Criterion) {
    let mut group = c.benchmark_group("utils/validate_url_param");

    group.bench_function("valid_bare_host", |b| {
        b.iter(|| {
            assert!(validate_url_param("target", black_box("http://example.com")).is_ok());
        });
    });

    group.bench_function("valid_with_query", |b| {
        b.iter(|| {
            assert!(
                validate_url_param(
                    "target",
                    black_box("https://example.com/a/b/c?utm_source=x&utm_medium=y#top")
                )
                .is_ok()
            );
        });
    });

    group.bench_function("relative_path", |b| {
        b.iter(|| {
            assert!(validate_url_param("target", black_box("/foo/bar")).is_err());
        });
    });

    group.bench_function("malformed_host", |b| {
        b.iter(|| {
            assert!(validate_url_param("target", black_box("http://exa mple.com")).is_err());
        });
    });

    for len in [16usize, 256, 2048] {
        let url = format!("https://example.com/{}", "a".repeat(len));
        group.bench_with_input(BenchmarkId::new("path_length", len), &url, |b, url| {
            b.iter(|| validate_url_param("target", black_box(url)));
        });
    }

    group.finish();
}

// ============== encode_cookie_value 基准测试 ==============

fn bench_encode_cookie_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("api/encode_cookie_value");

    group.bench_function("passthrough", |b| {
        b.iter(|| encode_cookie_value(black_box("https://origin.example/page?x=1")));
    });

    group.bench_function("needs_encoding", |b| {
        b.iter(|| encode_cookie_value(black_box("https://origin.example/a%20b?x=1;y=2,z")));
    });

    group.finish();
}

criterion_group!(benches, bench_validate_url_param, bench_encode_cookie_value);
criterion_main!(benches);
