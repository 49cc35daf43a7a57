//! Engine throughput: table construction and single runs at the draw bounds.
//!
//! Run with: `cargo bench --bench simulator`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use mcforecast::data::dataset::Dataset;
use mcforecast::simulation::{
    EngineConfig, FrequencyTable, HistoricalRecord, IntervalTable, SimulationEngine, DEFAULT_SCALE,
};

/// Yearly series long enough that the binary-search lookup matters.
fn long_series(len: usize) -> Vec<HistoricalRecord> {
    (0..len)
        .map(|i| HistoricalRecord::new(1900 + i as i32, 1000 + (i as u64 * 37) % 500))
        .collect()
}

fn bench_tables(c: &mut Criterion) {
    let sample = Dataset::sample().records;
    let long = long_series(200);

    let mut group = c.benchmark_group("tables");
    group.bench_function("sample_10_records", |b| {
        b.iter(|| {
            let frequencies = FrequencyTable::build(black_box(&sample)).expect("valid dataset");
            black_box(IntervalTable::assign(&frequencies, DEFAULT_SCALE))
        });
    });
    group.bench_function("series_200_records", |b| {
        b.iter(|| {
            let frequencies = FrequencyTable::build(black_box(&long)).expect("valid dataset");
            black_box(IntervalTable::assign(&frequencies, DEFAULT_SCALE))
        });
    });
    group.finish();
}

fn bench_runs(c: &mut Criterion) {
    let engine = SimulationEngine::new(&Dataset::sample().records, EngineConfig::default())
        .expect("sample engine");

    let mut group = c.benchmark_group("simulator");
    group.sample_size(100);

    for draws in [1u32, 5, 20] {
        group.throughput(Throughput::Elements(u64::from(draws)));
        group.bench_function(format!("run_{draws}_draws"), |b| {
            b.iter(|| black_box(engine.run(black_box(draws))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tables, bench_runs);
criterion_main!(benches);
