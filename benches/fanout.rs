//! Benchmarks for message fan-out.
//!
//! These benchmarks measure the cost of writing messages to several
//! in-memory destinations, with and without nested indentation scopes.

use brewed_log::destination::{DestinationConfig, Level, SharedBuffer, Target};
use brewed_log::logger::Logger;
use brewed_log::message::{HeadingLevel, LogMessage};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
struct Record {
    name: String,
    size: u64,
    tags: Vec<String>,
}

/// Build a logger with `outputs` output destinations and one debug destination.
fn logger_with(outputs: usize) -> (Logger, Vec<SharedBuffer>) {
    let mut logger = Logger::new();
    let mut buffers = Vec::with_capacity(outputs + 1);
    for i in 0..outputs {
        let buffer = SharedBuffer::new();
        logger
            .open_destination(
                DestinationConfig::new(Target::Buffer(buffer.clone())).id(format!("out{}", i)),
            )
            .unwrap();
        buffers.push(buffer);
    }
    let debug = SharedBuffer::new();
    logger
        .open_destination(
            DestinationConfig::new(Target::Buffer(debug.clone()))
                .id("debug")
                .level(Level::Debug),
        )
        .unwrap();
    buffers.push(debug);
    (logger, buffers)
}

fn clear(buffers: &[SharedBuffer]) {
    for buffer in buffers {
        buffer.clear();
    }
}

fn bench_output(c: &mut Criterion) {
    let mut group = c.benchmark_group("output");

    for outputs in [1usize, 4, 16] {
        let (mut logger, buffers) = logger_with(outputs);
        let messages: Vec<LogMessage> = (0..20)
            .map(|i| LogMessage::text(format!("line {}", i)))
            .collect();

        group.bench_with_input(
            BenchmarkId::new("text_lines", outputs),
            &messages,
            |b, messages| {
                b.iter(|| {
                    logger.output(black_box(messages)).unwrap();
                    clear(&buffers);
                })
            },
        );
    }

    group.finish();
}

fn bench_headings(c: &mut Criterion) {
    let (mut logger, buffers) = logger_with(4);
    let messages = vec![
        LogMessage::heading(HeadingLevel::H1, "Stage"),
        LogMessage::heading(HeadingLevel::H4, "Step"),
        LogMessage::Separator,
        LogMessage::Boolean(true),
    ];

    c.bench_function("headings", |b| {
        b.iter(|| {
            logger.output(black_box(&messages)).unwrap();
            clear(&buffers);
        })
    });
}

fn bench_nested_scopes(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_scopes");

    for depth in [1usize, 4, 8] {
        let (mut logger, buffers) = logger_with(4);

        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, &depth| {
            b.iter(|| {
                nest(&mut logger, depth);
                clear(&buffers);
            })
        });
    }

    group.finish();
}

fn nest(logger: &mut Logger, remaining: usize) {
    if remaining == 0 {
        logger.output(&["leaf".into()]).unwrap();
        return;
    }
    logger
        .out_scoped(&["level".into()], |logger| nest(logger, remaining - 1))
        .unwrap();
}

fn bench_dump(c: &mut Criterion) {
    let record = Record {
        name: "archive.tar.gz".to_string(),
        size: 1_048_576,
        tags: vec!["nightly".to_string(), "offsite".to_string()],
    };
    let mut table = BTreeMap::new();
    for i in 0..10 {
        table.insert(format!("key{}", i), "v".repeat(i * 10));
    }

    let mut group = c.benchmark_group("structured");

    group.bench_function("yaml_dump", |b| {
        b.iter(|| LogMessage::dump(black_box(&record)).unwrap())
    });

    group.bench_function("pretty_table", |b| {
        b.iter(|| LogMessage::table(black_box(&table), 60))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_output,
    bench_headings,
    bench_nested_scopes,
    bench_dump
);
criterion_main!(benches);
