// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use paperfold::geometry::Sheet;
use paperfold::paper::{EdgeType, PaperModel, RelaxParams};

fn creased_grid(size: usize) -> PaperModel {
    let mut model = Sheet::grid(size, size, 1.0).to_model().unwrap();
    let i = size / 2;
    for j in 1..size {
        model
            .set_edge_type_between((j - 1) * size + i, j * size + i, EdgeType::Ridge)
            .unwrap();
    }
    model
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for size in [10, 30, 60] {
        group.bench_with_input(BenchmarkId::new("grid", size), &size, |b, &size| {
            b.iter(|| Sheet::grid(black_box(size), black_box(size), 1.0).to_model().unwrap());
        });
    }

    group.finish();
}

fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");

    for size in [10, 30] {
        let model = creased_grid(size);
        group.bench_with_input(BenchmarkId::new("components", size), &model, |b, model| {
            b.iter(|| {
                let mut model = model.clone();
                model.compute_components().unwrap();
                model
            });
        });
        group.bench_with_input(BenchmarkId::new("constraints", size), &model, |b, model| {
            b.iter(|| {
                let mut model = model.clone();
                model.compute_constraints().unwrap();
                model
            });
        });
    }

    group.finish();
}

fn bench_folding(c: &mut Criterion) {
    let mut group = c.benchmark_group("folding");

    let mut model = creased_grid(30);
    model.compute_constraints().unwrap();
    group.bench_function("fold_hinges", |b| {
        b.iter(|| model.fold_hinges(black_box(0.05)).unwrap());
    });
    group.bench_function("relax_one_step", |b| {
        b.iter(|| model.relax_one_step(black_box(RelaxParams::default())).unwrap());
    });

    group.finish();
}

fn bench_remeshing(c: &mut Criterion) {
    let mut group = c.benchmark_group("remeshing");

    let model = Sheet::grid(30, 30, 1.0).to_model().unwrap();
    group.bench_function("subdivide_long_edges", |b| {
        b.iter(|| {
            let mut model = model.clone();
            model.subdivide_long_edges(black_box(0.75)).unwrap()
        });
    });
    group.bench_function("flip_edges", |b| {
        b.iter(|| {
            let mut model = model.clone();
            model.flip_edges().unwrap()
        });
    });
    group.bench_function("laplacian_smooth", |b| {
        b.iter(|| {
            let mut model = model.clone();
            model.laplacian_smooth().unwrap()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_analysis,
    bench_folding,
    bench_remeshing
);
criterion_main!(benches);
