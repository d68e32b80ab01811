// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene basics.
//!
//! Build a small scene, drive the deferred index with ticks, move an item, and hit-test.
//!
//! Run:
//! - `RUST_LOG=trace cargo run -p understory_demos --example scene_basics`

use kurbo::{Affine, Point, Rect, Vec2};
use understory_scene::{IndexConfig, ItemFlags, LocalItem, Scene, SortOrder};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let mut scene = Scene::with_config(IndexConfig {
        scene_rect: Rect::new(0.0, 0.0, 800.0, 600.0),
        bsp_tree_depth: 0,
    });
    let panel = scene
        .insert(
            None,
            LocalItem {
                local_bounds: Rect::new(0.0, 0.0, 200.0, 200.0),
                ..Default::default()
            },
        )
        .unwrap();
    let a = scene
        .insert(
            Some(panel),
            LocalItem {
                local_bounds: Rect::new(10.0, 10.0, 60.0, 60.0),
                ..Default::default()
            },
        )
        .unwrap();
    let b = scene
        .insert(
            Some(panel),
            LocalItem {
                local_bounds: Rect::new(40.0, 40.0, 120.0, 120.0),
                z_value: 10.0,
                ..Default::default()
            },
        )
        .unwrap();
    let shadow = scene
        .insert(
            Some(panel),
            LocalItem {
                local_bounds: Rect::new(-5.0, -5.0, 205.0, 205.0),
                flags: ItemFlags::STACKS_BEHIND_PARENT,
                ..Default::default()
            },
        )
        .unwrap();

    // The host's event loop ticks the index until the burst settles.
    let mut ticks = 0;
    while scene.is_index_pending() {
        scene.tick();
        ticks += 1;
    }
    let stats = scene.index_stats();
    println!("index settled after {ticks} ticks: {stats:?}");

    // Move item A to the right.
    scene.set_local_transform(a, Affine::translate(Vec2::new(20.0, 0.0)));

    // Hit-test prefers the higher z-value (item B).
    let hit = scene.hit_test_point(Point::new(50.0, 50.0)).unwrap();
    println!("hit item: {:?} via {:?}", hit.item, hit.path);
    assert_eq!(hit.item, b, "hit-test should prefer higher z-value item B");

    // Everything under the cursor, top-most first; the shadow sits below the panel.
    let stack = scene.items_in_rect(Rect::new(50.0, 50.0, 50.0, 50.0), SortOrder::Descending);
    println!("stack: {stack:?}");
    assert_eq!(stack, [b, a, panel, shadow]);
}
