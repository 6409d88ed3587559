#![allow(missing_docs)]
//! Benchmarks for the ISO 2709 codec.
//!
//! Fixtures are generated in memory so the suite needs no data files.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use iso2709::parallel::parse_batch_parallel;
use iso2709::{ControlNumberField, DataField, FixedField, Record, RecordStreamReader, Subfield};

fn sample_record(n: usize) -> Record {
    let mut record = Record::new(2, 2).unwrap();
    let widths = record.widths();

    let mut control = ControlNumberField::new(0);
    control.set_value(format!("REC{n:09}").as_bytes());
    record.add_entry(control.into()).unwrap();

    let mut fixed = FixedField::new(b"005", 0).unwrap();
    fixed.set_value(b"20200520170000.0");
    record.add_entry(fixed.into()).unwrap();

    for (tag, text) in [
        (b"200", "Benchmark title"),
        (b"210", "Beijing : Publisher, 2020"),
        (b"606", "Subject heading"),
        (b"701", "Author, Example"),
    ] {
        let mut field = DataField::new(tag, widths).unwrap();
        field.set_indicator(b"1 ").unwrap();
        field
            .add_subfield(Subfield::with_content(b"a", text.as_bytes()))
            .unwrap();
        field
            .add_subfield(Subfield::with_content(b"b", format!("{n}").as_bytes()))
            .unwrap();
        record.add_entry(field.into()).unwrap();
    }
    record
}

fn stream_of(count: usize) -> Vec<u8> {
    let mut data = Vec::new();
    for n in 0..count {
        data.extend_from_slice(&sample_record(n).serialize().unwrap());
        data.extend_from_slice(b"\r\n");
    }
    data
}

fn benchmark_parse(c: &mut Criterion) {
    let bytes = sample_record(1).serialize().unwrap();
    c.bench_function("parse_record", |b| {
        b.iter(|| Record::parse(black_box(&bytes)).unwrap());
    });
}

fn benchmark_serialize(c: &mut Criterion) {
    let record = sample_record(1);
    c.bench_function("serialize_record", |b| {
        b.iter(|| black_box(&record).serialize().unwrap());
    });
}

fn benchmark_read_stream_1k(c: &mut Criterion) {
    let data = stream_of(1_000);
    c.bench_function("read_stream_1k", |b| {
        b.iter(|| {
            RecordStreamReader::new(black_box(&data[..]))
                .filter_map(Result::ok)
                .count()
        });
    });
}

fn benchmark_parallel_parse_1k(c: &mut Criterion) {
    let data = stream_of(1_000);
    c.bench_function("parallel_parse_1k", |b| {
        b.iter_batched(
            || {
                let mut reader = RecordStreamReader::new(&data[..]);
                let mut blocks = Vec::new();
                while let Ok(Some(block)) = reader.next_raw_record() {
                    blocks.push(block);
                }
                blocks
            },
            |blocks| parse_batch_parallel(&blocks).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    benchmark_parse,
    benchmark_serialize,
    benchmark_read_stream_1k,
    benchmark_parallel_parse_1k
);
criterion_main!(benches);
