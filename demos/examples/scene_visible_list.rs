// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visible list.
//!
//! Compute the rows visible through a scrolling viewport, a building block for virtualization.
//!
//! Run:
//! - `cargo run -p understory_demos --example scene_visible_list`

use kurbo::{Affine, Rect, Vec2};
use understory_scene::{IndexConfig, LocalItem, Scene, SortOrder};

fn main() {
    let mut scene = Scene::with_config(IndexConfig {
        scene_rect: Rect::new(0.0, 0.0, 400.0, 20_000.0),
        bsp_tree_depth: 0,
    });
    let list = scene
        .insert(
            None,
            LocalItem {
                local_bounds: Rect::new(0.0, 0.0, 400.0, 20_000.0),
                ..Default::default()
            },
        )
        .unwrap();
    for i in 0..1000_u32 {
        let y = f64::from(i) * 20.0;
        scene
            .insert(
                Some(list),
                LocalItem {
                    local_bounds: Rect::new(0.0, 0.0, 400.0, 18.0),
                    local_transform: Affine::translate(Vec2::new(0.0, y)),
                    ..Default::default()
                },
            )
            .unwrap();
    }

    for scroll in [0.0, 5_000.0, 19_500.0] {
        let viewport = Rect::new(0.0, scroll, 400.0, scroll + 300.0);
        let rows: Vec<_> = scene
            .items_in_rect(viewport, SortOrder::Ascending)
            .into_iter()
            .filter(|&id| id != list)
            .collect();
        println!("viewport at {scroll}: {} rows visible", rows.len());
    }
    println!("{:?}", scene.index_stats());
}
