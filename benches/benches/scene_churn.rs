// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Affine, Rect, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use understory_scene::{IndexConfig, ItemId, LocalItem, Scene, SortOrder};

const WORLD: f64 = 4000.0;

fn populated(count: usize, children_per_item: usize) -> (Scene, Vec<ItemId>) {
    let mut rng = StdRng::seed_from_u64(0x5CE4E);
    let mut scene = Scene::with_config(IndexConfig {
        scene_rect: Rect::new(0.0, 0.0, WORLD, WORLD),
        bsp_tree_depth: 0,
    });
    let mut ids = Vec::with_capacity(count * (children_per_item + 1));
    for _ in 0..count {
        let local = LocalItem {
            local_bounds: Rect::new(0.0, 0.0, 40.0, 30.0),
            local_transform: Affine::translate(Vec2::new(
                rng.gen_range(0.0..WORLD),
                rng.gen_range(0.0..WORLD),
            )),
            z_value: rng.gen_range(-2.0..2.0_f64).round(),
            ..Default::default()
        };
        let Ok(root) = scene.insert(None, local) else {
            continue;
        };
        ids.push(root);
        for c in 0..children_per_item {
            let x = c as f64 * 8.0;
            let child = LocalItem {
                local_bounds: Rect::new(x, 0.0, x + 6.0, 6.0),
                ..Default::default()
            };
            if let Ok(id) = scene.insert(Some(root), child) {
                ids.push(id);
            }
        }
    }
    scene.flush();
    (scene, ids)
}

fn bench_populate(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_populate");
    for &n in &[1_000_usize, 5_000] {
        group.throughput(Throughput::Elements(n as u64 * 4));
        group.bench_function(format!("insert_flush_n{n}"), |b| {
            b.iter(|| black_box(populated(n, 3).1.len()));
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_query");
    let (mut scene, _) = populated(5_000, 3);
    let viewports: Vec<Rect> = {
        let mut rng = StdRng::seed_from_u64(7);
        (0..32)
            .map(|_| {
                let x = rng.gen_range(0.0..WORLD - 400.0);
                let y = rng.gen_range(0.0..WORLD - 300.0);
                Rect::new(x, y, x + 400.0, y + 300.0)
            })
            .collect()
    };
    for order in [SortOrder::Unsorted, SortOrder::Descending] {
        group.bench_function(format!("viewport_{order:?}"), |b| {
            b.iter(|| {
                let hits: usize = viewports
                    .iter()
                    .map(|&r| scene.items_in_rect(r, order).len())
                    .sum();
                black_box(hits);
            });
        });
    }
    group.bench_function("top_level_viewport", |b| {
        b.iter(|| {
            let hits: usize = viewports
                .iter()
                .map(|&r| {
                    scene
                        .top_level_items_in_rect(r, SortOrder::Descending)
                        .len()
                })
                .sum();
            black_box(hits);
        });
    });
    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_churn");
    group.bench_function("move_100_then_query", |b| {
        b.iter_batched(
            || populated(2_000, 3),
            |(mut scene, ids)| {
                let mut rng = StdRng::seed_from_u64(11);
                for &id in ids.iter().step_by(ids.len() / 100) {
                    let t = Affine::translate(Vec2::new(
                        rng.gen_range(0.0..WORLD),
                        rng.gen_range(0.0..WORLD),
                    ));
                    scene.set_local_transform(id, t);
                }
                black_box(
                    scene
                        .items_in_rect(Rect::new(0.0, 0.0, 500.0, 500.0), SortOrder::Descending)
                        .len(),
                );
            },
            BatchSize::LargeInput,
        );
    });
    group.bench_function("remove_half_then_query", |b| {
        b.iter_batched(
            || populated(2_000, 3),
            |(mut scene, ids)| {
                for &id in ids.iter().step_by(2) {
                    scene.remove(id);
                }
                black_box(
                    scene
                        .items_in_rect(Rect::new(0.0, 0.0, 500.0, 500.0), SortOrder::Descending)
                        .len(),
                );
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_populate, bench_queries, bench_churn);
criterion_main!(benches);
