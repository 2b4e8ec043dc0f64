//! Cost of hashing and comparing a code at several bcrypt work factors.
//!
//! Useful when picking `hashing.cost`: each step doubles the time per call,
//! for the issuer and for anyone brute-forcing a leaked hash alike.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use vericode_core::{compare_code, generate_code, hash_code, Code, HashConfig};

fn bench_generate(c: &mut Criterion) {
    c.bench_function("generate_code/6", |b| {
        b.iter(|| generate_code(black_box(6)).unwrap())
    });
}

fn bench_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_code");
    group.sample_size(10);
    let code = Code::parse("482913").unwrap();

    for cost in [4u32, 8, 10] {
        let config = HashConfig::new(cost);
        group.bench_with_input(BenchmarkId::from_parameter(cost), &config, |b, config| {
            b.iter(|| hash_code(black_box(&code), config).unwrap())
        });
    }
    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_code");
    group.sample_size(10);
    let code = Code::parse("482913").unwrap();
    let hash = hash_code(&code, &HashConfig::default()).unwrap();

    group.bench_function("match", |b| {
        b.iter(|| compare_code(black_box("482913"), &hash).unwrap())
    });
    group.bench_function("mismatch", |b| {
        b.iter(|| compare_code(black_box("000000"), &hash).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_generate, bench_hash, bench_compare);
criterion_main!(benches);
