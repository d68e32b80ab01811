// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use hashbrown::HashSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use understory_bsp::{Aabb2D, BspTree};

const WORLD: f64 = 2000.0;

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Aabb2D::<f64>::from_xywh(x0, y0, cell, cell));
        }
    }
    out
}

fn gen_random_rects(count: usize, rect_w: f64, rect_h: f64) -> Vec<Aabb2D<f64>> {
    let mut rng = StdRng::seed_from_u64(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| {
            let x0 = rng.gen_range(0.0..WORLD - rect_w);
            let y0 = rng.gen_range(0.0..WORLD - rect_h);
            Aabb2D::<f64>::from_xywh(x0, y0, rect_w, rect_h)
        })
        .collect()
}

fn gen_clustered_rects(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<Aabb2D<f64>> {
    let mut rng = StdRng::seed_from_u64(0xC1A5_7E55_9999_ABCD);
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    for _ in 0..n_clusters {
        let (cx, cy) = (rng.gen_range(0.0..WORLD), rng.gen_range(0.0..WORLD));
        for _ in 0..per_cluster {
            let dx = rng.gen_range(-0.5..0.5) * spread;
            let dy = rng.gen_range(-0.5..0.5) * spread;
            out.push(Aabb2D::<f64>::from_xywh(cx + dx, cy + dy, 12.0, 12.0));
        }
    }
    out
}

fn build(rects: &[Aabb2D<f64>], depth: u32) -> BspTree<f64, u32> {
    let mut bsp = BspTree::new();
    bsp.initialize(Aabb2D::new(0.0, 0.0, WORLD, WORLD), depth);
    for (i, r) in rects.iter().copied().enumerate() {
        bsp.insert_item(i as u32, r);
    }
    bsp
}

fn linear_scan(rects: &[Aabb2D<f64>], q: Aabb2D<f64>) -> usize {
    rects.iter().filter(|r| r.intersects(&q)).count()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("bsp_build");
    for &n in &[32_usize, 64, 128] {
        let rects = gen_grid_rects(n, WORLD / n as f64);
        group.throughput(Throughput::Elements((n * n) as u64));
        for &depth in &[5_u32, 8, 11] {
            group.bench_function(format!("grid_n{n}_depth{depth}"), |b| {
                b.iter(|| black_box(build(&rects, depth).len()));
            });
        }
    }
    group.finish();
}

fn bench_query_vs_linear(c: &mut Criterion) {
    let mut group = c.benchmark_group("bsp_query");
    let workloads = [
        ("random", gen_random_rects(10_000, 16.0, 16.0)),
        ("clustered", gen_clustered_rects(40, 250, 200.0)),
    ];
    let queries: Vec<_> = {
        let mut rng = StdRng::seed_from_u64(42);
        (0..64)
            .map(|_| {
                let x = rng.gen_range(0.0..WORLD - 200.0);
                let y = rng.gen_range(0.0..WORLD - 200.0);
                Aabb2D::<f64>::from_xywh(x, y, 200.0, 200.0)
            })
            .collect()
    };
    for (name, rects) in &workloads {
        group.throughput(Throughput::Elements(queries.len() as u64));
        for &depth in &[8_u32, 10, 12] {
            let bsp = build(rects, depth);
            group.bench_function(format!("{name}_depth{depth}"), |b| {
                b.iter(|| {
                    let hits: usize = queries.iter().map(|&q| bsp.items(q).len()).sum();
                    black_box(hits);
                });
            });
        }
        group.bench_function(format!("{name}_linear"), |b| {
            b.iter(|| {
                let hits: usize = queries.iter().map(|&q| linear_scan(rects, q)).sum();
                black_box(hits);
            });
        });
    }
    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("bsp_remove");
    let rects = gen_random_rects(10_000, 16.0, 16.0);
    group.bench_function("remove_one_by_one", |b| {
        b.iter_batched(
            || build(&rects, 10),
            |mut bsp| {
                for (i, r) in rects.iter().copied().enumerate().step_by(10) {
                    bsp.remove_item(i as u32, r);
                }
                black_box(bsp.len());
            },
            BatchSize::LargeInput,
        );
    });
    group.bench_function("remove_as_set", |b| {
        b.iter_batched(
            || {
                let set: HashSet<u32> = (0..rects.len() as u32).step_by(10).collect();
                (build(&rects, 10), set)
            },
            |(mut bsp, set)| {
                bsp.remove_items(&set);
                black_box(bsp.len());
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_query_vs_linear, bench_remove);
criterion_main!(benches);
