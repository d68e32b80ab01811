// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_bsp --heading-base-level=0

//! Understory BSP: a binary space partitioning tree for 2D AABBs.
//!
//! Understory BSP is the spatial half of a scene index.
//!
//! - Partition a fixed rectangle into `2^depth` cells by alternately halving it along x and y.
//! - Store item payloads in every cell their box overlaps; straddling items are duplicated.
//! - Query by intersecting rectangle with exact box filtering and identity deduplication.
//! - Purge a whole set of items in one sweep when their boxes are no longer trustworthy.
//!
//! It is generic over the scalar type `T` and does not depend on any geometry crate.
//! Higher layers (like a scene index) compute scene-space boxes and feed them here.
//!
//! # Example
//!
//! ```rust
//! use understory_bsp::{Aabb2D, BspTree};
//!
//! let mut bsp: BspTree<f64, u32> = BspTree::new();
//! bsp.initialize(Aabb2D::new(0.0, 0.0, 100.0, 100.0), 5);
//!
//! bsp.insert_item(1, Aabb2D::<f64>::from_xywh(0.0, 0.0, 10.0, 10.0));
//! bsp.insert_item(2, Aabb2D::<f64>::from_xywh(20.0, 20.0, 10.0, 10.0));
//! bsp.insert_item(3, Aabb2D::<f64>::from_xywh(5.0, 5.0, 10.0, 10.0));
//!
//! let mut hits = bsp.items(Aabb2D::<f64>::from_xywh(0.0, 0.0, 15.0, 15.0));
//! hits.sort_unstable();
//! assert_eq!(hits, [1, 3]);
//!
//! bsp.remove_item(3, Aabb2D::<f64>::from_xywh(5.0, 5.0, 10.0, 10.0));
//! assert_eq!(bsp.items(Aabb2D::<f64>::from_xywh(0.0, 0.0, 15.0, 15.0)), [1]);
//! ```
//!
//! ## Choosing a depth
//!
//! Memory grows exponentially with depth while the cost of a query shrinks with it.
//! A partition works best when each leaf holds a handful of items; a depth around
//! `log2(item_count)` with a floor of 5 is a reasonable default for mixed scenes.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates. A NaN edge never compares
//! below a split line, so such boxes fall into the upper cells.

#![no_std]

extern crate alloc;

pub mod tree;
pub mod types;

pub use tree::{BspTree, MAX_DEPTH};
pub use types::{Aabb2D, Scalar};
