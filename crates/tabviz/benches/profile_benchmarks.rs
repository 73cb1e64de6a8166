//! Profiling, cleaning and rendering benchmarks on in-memory datasets.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tabviz::chart::{ChartKind, ChartSpecBuilder};
use tabviz::dataset::{Column, Dataset};
use tabviz::render::{RenderConfig, render};
use tabviz::{CleaningPolicy, MissingPolicy, OutlierPolicy, Profiler, Tabviz};

/// Deterministic numeric columns with a sprinkling of missing values.
fn generate_dataset(rows: usize, numeric_cols: usize) -> Dataset {
    let mut columns: Vec<Column> = (0..numeric_cols)
        .map(|c| {
            Column::numeric(
                format!("n{}", c),
                (0..rows).map(|r| {
                    if (r + c) % 23 == 0 {
                        None
                    } else {
                        Some(((r * (c + 3)) % 997) as f64 * 0.5 + c as f64)
                    }
                }),
            )
        })
        .collect();
    columns.push(Column::categorical(
        "group",
        (0..rows).map(|r| Some(format!("g{}", r % 6))),
    ));
    Dataset::new(columns).unwrap()
}

fn bench_profile(c: &mut Criterion) {
    let mut group = c.benchmark_group("profile");
    let profiler = Profiler::new();

    for rows in [1_000, 10_000, 50_000].iter() {
        let data = generate_dataset(*rows, 6);
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            b.iter(|| black_box(profiler.profile(data)))
        });
    }

    group.finish();
}

fn bench_clean(c: &mut Criterion) {
    let mut group = c.benchmark_group("clean");
    let tabviz = Tabviz::new();
    let data = generate_dataset(10_000, 6);

    let policies = [
        ("drop", CleaningPolicy::new(MissingPolicy::DropRows, OutlierPolicy::None)),
        ("fill_median", CleaningPolicy::new(MissingPolicy::FillMedian, OutlierPolicy::None)),
        (
            "iqr_then_mean",
            CleaningPolicy::new(MissingPolicy::FillMean, OutlierPolicy::Iqr { multiplier: 1.5 }),
        ),
    ];
    for (name, policy) in policies.iter() {
        group.bench_function(*name, |b| b.iter(|| black_box(tabviz.clean(&data, policy).unwrap())));
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let data = generate_dataset(5_000, 4);
    let config = RenderConfig::default();

    let requests = [
        ("scatter", ChartSpecBuilder::new(ChartKind::Scatter).x("n0").y("n1")),
        ("distribution", ChartSpecBuilder::new(ChartKind::Distribution).x("n2").group("group")),
        ("violin", ChartSpecBuilder::new(ChartKind::Violin).x("group").y("n3")),
        ("heatmap", ChartSpecBuilder::new(ChartKind::Heatmap)),
    ];
    for (name, builder) in requests {
        let request = builder.build(&data).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| black_box(render(&request, &data, &config).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_profile, bench_clean, bench_render);
criterion_main!(benches);
