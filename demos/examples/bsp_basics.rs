// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! BSP basics.
//!
//! Build a small partition, insert a few boxes, and run a couple of queries.
//!
//! Run:
//! - `cargo run -p understory_demos --example bsp_basics`

use understory_bsp::{Aabb2D, BspTree};

fn main() {
    let mut bsp: BspTree<f64, &'static str> = BspTree::new();
    bsp.initialize(Aabb2D::new(0.0, 0.0, 400.0, 300.0), 5);

    bsp.insert_item("header", Aabb2D::new(0.0, 0.0, 400.0, 40.0));
    bsp.insert_item("button", Aabb2D::new(300.0, 250.0, 380.0, 280.0));
    bsp.insert_item("badge", Aabb2D::new(190.0, 140.0, 210.0, 160.0));

    println!("{bsp:?}");
    let top_strip = bsp.items(Aabb2D::new(0.0, 0.0, 400.0, 10.0));
    println!("top strip: {top_strip:?}");
    let centre = bsp.items(Aabb2D::new(200.0, 150.0, 200.0, 150.0));
    println!("centre: {centre:?}");
}
