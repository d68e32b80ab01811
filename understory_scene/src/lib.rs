// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_scene --heading-base-level=0

//! Understory Scene: a Kurbo-native 2D scene graph backed by a deferred BSP index.
//!
//! - Represents a hierarchy of items with local bounds, transforms, z-values, and flags.
//! - Caches each item's scene transform and scene-space bounding box.
//! - Notifies an [`understory_scene_index::SceneIndex`] before every change, so rectangle
//!   queries and hit tests come back in stacking order without a manual commit.
//!
//! ## Stacking
//!
//! Siblings stack by z-value, then by insertion order; a child is drawn above its parent
//! unless it carries [`ItemFlags::STACKS_BEHIND_PARENT`]. A subtree never interleaves with
//! its parent's siblings: raising a grandchild's z-value only reorders it among its own
//! siblings.
//!
//! ## Placement flags
//!
//! - [`ItemFlags::IGNORES_TRANSFORMATIONS`]: the item keeps its own scale and rotation and
//!   only its origin follows the ancestors. Such items are returned by every rectangle query.
//! - [`ItemFlags::CLIPS_CHILDREN_TO_SHAPE`]: descendants are not placed in the index, so
//!   rectangle queries only find the clipping item itself.
//!
//! ## Deferred indexing
//!
//! New and moved items are queued and placed in batches. Call [`Scene::tick`] once per turn
//! of your event loop, or [`Scene::flush`] to apply everything at once; queries flush on
//! their own.
//!
//! ## Minimal usage
//!
//! ```
//! use kurbo::{Affine, Point, Rect, Vec2};
//! use understory_scene::{IndexConfig, LocalItem, Scene, SortOrder};
//!
//! let mut scene = Scene::with_config(IndexConfig {
//!     scene_rect: Rect::new(0.0, 0.0, 1000.0, 1000.0),
//!     bsp_tree_depth: 0,
//! });
//!
//! let root = scene
//!     .insert(None, LocalItem { local_bounds: Rect::new(0.0, 0.0, 200.0, 200.0), ..Default::default() })
//!     .unwrap();
//! let child = scene
//!     .insert(Some(root), LocalItem { local_bounds: Rect::new(10.0, 10.0, 60.0, 60.0), ..Default::default() })
//!     .unwrap();
//!
//! // Move the child and hit-test the new position.
//! scene.set_local_transform(child, Affine::translate(Vec2::new(100.0, 0.0)));
//! let hit = scene.hit_test_point(Point::new(120.0, 20.0)).unwrap();
//! assert_eq!(hit.path, [root, child]);
//!
//! // Children stack above their parent.
//! let hits = scene.items_in_rect(Rect::new(110.0, 10.0, 120.0, 20.0), SortOrder::Descending);
//! assert_eq!(hits, [child, root]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod tree;
mod types;

pub use error::{SceneError, SceneResult};
pub use tree::{Hit, Scene};
pub use types::{ItemId, LocalItem};

pub use understory_scene_index::{IndexConfig, IndexStats, ItemFlags, SortOrder};
