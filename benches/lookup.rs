extern crate ucdprops;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::{fs, hint::black_box, path::PathBuf};
use ucdprops::{IndexBuilder, PropertyIndex, UcdFile};

fn sample_texts() -> Vec<(UcdFile, String)> {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/samples/ucd");
    <UcdFile as strum::IntoEnumIterator>::iter()
        .map(|file| {
            let text = fs::read_to_string(dir.join(file.name())).expect("Failed to read sample");
            (file, text)
        })
        .collect()
}

fn build(texts: &[(UcdFile, String)]) -> PropertyIndex {
    texts
        .iter()
        .fold(IndexBuilder::new(), |builder, (file, text)| {
            builder.source(*file, text)
        })
        .build()
        .unwrap()
}

/// Benchmark the load phase over the sample UCD excerpts
fn bench_build(c: &mut Criterion) {
    let texts = sample_texts();
    let total: usize = texts.iter().map(|(_, text)| text.len()).sum();

    let mut group = c.benchmark_group("index_build");
    group.throughput(Throughput::Bytes(total as u64));
    group.bench_function("build", |b| b.iter(|| black_box(build(black_box(&texts)))));
    group.finish();
}

/// Benchmark point lookups, full records vs single properties
fn bench_lookup(c: &mut Criterion) {
    let index = build(&sample_texts());
    let codepoints = [0x0041, 0x01E8, 0x078A, 0x0915, 0x6C34, 0xAC00, 0x1F600, 0x10_FFFD];

    let mut group = c.benchmark_group("lookup");
    group.throughput(Throughput::Elements(codepoints.len() as u64));
    group.bench_function("record", |b| {
        b.iter(|| {
            for codepoint in codepoints {
                black_box(index.lookup(black_box(codepoint)));
            }
        });
    });
    group.bench_function("single_property", |b| {
        b.iter(|| {
            for codepoint in codepoints {
                black_box(index.get(black_box(codepoint), "General_Category"));
            }
        });
    });
    group.finish();
}

/// Benchmark decoding the persisted index
fn bench_decode(c: &mut Criterion) {
    let bytes = build(&sample_texts()).to_bytes().unwrap();

    let mut group = c.benchmark_group("persisted_index");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("from_bytes", |b| {
        b.iter(|| black_box(PropertyIndex::from_bytes(black_box(&bytes)).unwrap()));
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_lookup, bench_decode);
criterion_main!(benches);
