//! Benchmarks for requirements parsing.
//!
//! Performance targets (based on LSP latency requirements):
//! - Parsing small files: < 1ms
//! - Parsing large files (500 entries): < 10ms

use criterion::{Criterion, criterion_group, criterion_main};
use reqs_syntax::parse;
use std::hint::black_box;

/// Small requirements file with a mix of entry shapes.
const SMALL_REQUIREMENTS: &str = r"# runtime
-r base.txt
flask>=2.0,<3.0
requests[security]==2.31.0
uvicorn[standard]==0.30.0; python_version >= '3.9'
-e ./src/mypkg
--index-url https://pypi.org/simple
";

fn generate_large_requirements(entries: usize) -> String {
    let mut content = String::from("# generated\n");
    for i in 0..entries {
        content.push_str(&format!("package-{i:04}>=1.{}.0\n", i % 40));
    }
    content
}

fn bench_parse_small(c: &mut Criterion) {
    c.bench_function("parse_small_requirements", |b| {
        b.iter(|| parse(black_box(SMALL_REQUIREMENTS)));
    });
}

fn bench_parse_large(c: &mut Criterion) {
    let content = generate_large_requirements(500);
    c.bench_function("parse_large_requirements_500", |b| {
        b.iter(|| parse(black_box(&content)));
    });
}

criterion_group!(benches, bench_parse_small, bench_parse_large);
criterion_main!(benches);
