// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_scene_index --heading-base-level=0

//! Understory Scene Index: a deferred BSP index over a hierarchy of 2D items.
//!
//! The index answers "which items intersect this rectangle, in stacking order?" for a scene
//! graph it does not own. The scene describes itself through the [`ItemGraph`] trait and
//! notifies the index of every structural and geometric change.
//!
//! - Insertions are queued and applied in batches by a coalescing timer, so a burst of
//!   additions costs one update. Queries always flush pending work first.
//! - Removed items leave holes in a slot table that later insertions reuse.
//! - Items being torn down are purged by identifier only, without touching their geometry.
//! - Items that ignore transformations live in a flat list returned by every query;
//!   descendants of clipping items are tracked but never placed in the partition.
//! - The partition depth follows the item count unless a fixed depth is configured.
//! - Results are sorted by a hierarchy-aware stacking order (see [`stacking`]).
//!
//! ## Driving the index
//!
//! The host calls [`SceneIndex::timer_event`] once per turn of its event loop while
//! [`SceneIndex::is_index_pending`] is true, or [`SceneIndex::flush`] to apply everything
//! immediately. Geometry changes must be announced with
//! [`SceneIndex::prepare_bounding_rect_change`] *before* they become visible through the
//! graph; an unannounced move leaves the old box in the partition until the next rebuild.
//!
//! # Example
//!
//! ```rust
//! use kurbo::Rect;
//! use understory_scene_index::{IndexConfig, ItemFlags, ItemGraph, SceneIndex, SortOrder};
//!
//! // A flat scene: no parents, one rectangle per item.
//! struct Flat(Vec<Rect>);
//!
//! impl ItemGraph for Flat {
//!     type Id = usize;
//!     fn parent(&self, _: usize) -> Option<usize> { None }
//!     fn children(&self, _: usize) -> &[usize] { &[] }
//!     fn flags(&self, _: usize) -> ItemFlags { ItemFlags::empty() }
//!     fn z_value(&self, _: usize) -> f64 { 0.0 }
//!     fn sibling_index(&self, item: usize) -> usize { item }
//!     fn scene_bounding_rect(&self, item: usize) -> Rect { self.0[item] }
//! }
//!
//! let scene = Flat(vec![
//!     Rect::new(0.0, 0.0, 10.0, 10.0),
//!     Rect::new(20.0, 20.0, 30.0, 30.0),
//!     Rect::new(5.0, 5.0, 15.0, 15.0),
//! ]);
//!
//! let mut index = SceneIndex::with_config(IndexConfig {
//!     scene_rect: Rect::new(0.0, 0.0, 100.0, 100.0),
//!     bsp_tree_depth: 0,
//! });
//! for item in 0..3 {
//!     index.add_item(&scene, item, false).unwrap();
//! }
//!
//! // Later items stack on top of earlier ones.
//! let hits = index.estimate_items(&scene, Rect::new(0.0, 0.0, 15.0, 15.0), SortOrder::Descending);
//! assert_eq!(hits, [2, 0]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod error;
pub mod graph;
pub mod index;
pub mod stacking;
pub mod types;

#[cfg(test)]
mod testing;

pub use error::{IndexError, IndexResult};
pub use graph::ItemGraph;
pub use index::{AUTO_DEPTH_SLACK, MIN_AUTO_DEPTH, SceneIndex};
pub use stacking::{
    closest_item_first, closest_item_last, closest_leaf, not_closest_leaf, sort_items,
};
pub use types::{IndexConfig, IndexStats, ItemChange, ItemFlags, SortOrder};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestGraph;
    use alloc::vec::Vec;
    use kurbo::Rect;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .try_init();
    }

    fn random_rect(rng: &mut StdRng) -> Rect {
        let x = rng.gen_range(-50.0..550.0);
        let y = rng.gen_range(-50.0..550.0);
        let w = rng.gen_range(0.0..60.0);
        let h = rng.gen_range(0.0..60.0);
        Rect::new(x, y, x + w, y + h)
    }

    fn touches(a: Rect, b: Rect) -> bool {
        a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
    }

    /// Random adds, moves, and removals must keep queries identical to a linear scan.
    #[test]
    fn randomized_queries_match_linear_scan() {
        init_tracing();
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut g = TestGraph::new();
        let mut index = SceneIndex::with_config(IndexConfig {
            scene_rect: Rect::new(0.0, 0.0, 500.0, 500.0),
            bsp_tree_depth: 0,
        });
        let mut live: Vec<usize> = Vec::new();

        for round in 0..400 {
            match rng.gen_range(0..10) {
                0..=4 => {
                    let id = g.add(None, random_rect(&mut rng));
                    index.add_item(&g, id, false).unwrap();
                    live.push(id);
                }
                5..=6 if !live.is_empty() => {
                    let id = live[rng.gen_range(0..live.len())];
                    index.prepare_bounding_rect_change(&g, id);
                    g.set_rect(id, random_rect(&mut rng));
                }
                7 if !live.is_empty() => {
                    let id = live.swap_remove(rng.gen_range(0..live.len()));
                    if rng.gen_bool(0.5) {
                        g.set_destroying(id);
                    }
                    index.remove_item(&g, id, false, false);
                }
                _ => {
                    let _ = index.timer_event(&g);
                }
            }

            if round % 20 == 0 {
                let query = random_rect(&mut rng);
                let mut got = index.estimate_items(&g, query, SortOrder::Unsorted);
                got.sort_unstable();
                let mut expected: Vec<usize> = live
                    .iter()
                    .copied()
                    .filter(|&id| touches(g.scene_bounding_rect(id), query))
                    .collect();
                expected.sort_unstable();
                assert_eq!(got, expected, "round {round}");
            }
        }

        let stats = index.stats();
        assert_eq!(stats.indexed + stats.unindexed, live.len());
        let mut all = index.items(&g, SortOrder::Unsorted);
        all.sort_unstable();
        live.sort_unstable();
        assert_eq!(all, live);
    }

    #[test]
    fn slot_table_does_not_grow_under_churn() {
        init_tracing();
        let mut g = TestGraph::new();
        let mut index = SceneIndex::with_config(IndexConfig {
            scene_rect: Rect::new(0.0, 0.0, 1000.0, 1000.0),
            bsp_tree_depth: 0,
        });
        let ids: Vec<usize> = (0..200)
            .map(|i| {
                let x = f64::from(i % 20) * 50.0;
                let y = f64::from(i / 20) * 50.0;
                g.add(None, Rect::new(x, y, x + 10.0, y + 10.0))
            })
            .collect();
        for &id in &ids {
            index.add_item(&g, id, false).unwrap();
        }
        index.flush(&g);
        for &id in &ids[..150] {
            index.remove_item(&g, id, false, false);
        }
        index.flush(&g);
        assert_eq!(index.stats().free_slots, 150);
        for i in 0..50 {
            let x = f64::from(i);
            let id = g.add(None, Rect::new(x, 900.0, x + 1.0, 901.0));
            index.add_item(&g, id, false).unwrap();
        }
        index.flush(&g);
        let stats = index.stats();
        assert_eq!(stats.slot_table_len, 200);
        assert_eq!(stats.free_slots, 100);
        assert_eq!(stats.indexed, 100);
    }
}
