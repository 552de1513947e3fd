// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Benchmarks for git output parsing.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cradle::git::parse::{parse_commit_hash, parse_log, parse_status};

fn status_fixture(files: usize) -> String {
    let mut output = String::from("## main...origin/main [ahead 2, behind 1]\n");
    for i in 0..files {
        match i % 4 {
            0 => output.push_str(&format!("?? untracked_{i}.txt\n")),
            1 => output.push_str(&format!(" M modified_{i}.rs\n")),
            2 => output.push_str(&format!("A  staged_{i}.rs\n")),
            _ => output.push_str(&format!("R  old_{i}.rs -> new_{i}.rs\n")),
        }
    }
    output
}

fn log_fixture(entries: usize) -> String {
    (0..entries)
        .map(|i| {
            format!(
                "{:040x}\u{1f}Author {i}\u{1f}author{i}@example.com\u{1f}2026-01-01T00:00:00+00:00\u{1f}Commit message {i}\n",
                i
            )
        })
        .collect()
}

fn bench_parse_status(c: &mut Criterion) {
    let small = status_fixture(10);
    let large = status_fixture(500);

    c.bench_function("parse_status_10", |b| {
        b.iter(|| parse_status(black_box(&small)))
    });
    c.bench_function("parse_status_500", |b| {
        b.iter(|| parse_status(black_box(&large)))
    });
}

fn bench_parse_log(c: &mut Criterion) {
    let output = log_fixture(100);
    c.bench_function("parse_log_100", |b| {
        b.iter(|| parse_log(black_box(&output)).unwrap())
    });
}

fn bench_parse_commit_hash(c: &mut Criterion) {
    let output = "[main (root-commit) abc1234] Initial commit\n 1 file changed";
    c.bench_function("parse_commit_hash", |b| {
        b.iter(|| parse_commit_hash(black_box(output)))
    });
}

criterion_group!(
    benches,
    bench_parse_status,
    bench_parse_log,
    bench_parse_commit_hash
);
criterion_main!(benches);
