// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A minimal in-memory item graph for unit tests.

use alloc::vec::Vec;
use kurbo::Rect;

use crate::graph::ItemGraph;
use crate::types::ItemFlags;

#[derive(Clone, Debug)]
struct TestItem {
    parent: Option<usize>,
    children: Vec<usize>,
    flags: ItemFlags,
    z: f64,
    sibling_index: usize,
    rect: Rect,
    destroying: bool,
}

/// Items are never freed; ids are plain indices.
#[derive(Clone, Debug, Default)]
pub(crate) struct TestGraph {
    items: Vec<TestItem>,
    top_level: usize,
}

impl TestGraph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, parent: Option<usize>, rect: Rect) -> usize {
        let id = self.items.len();
        let sibling_index = match parent {
            Some(p) => {
                self.items[p].children.push(id);
                self.items[p].children.len() - 1
            }
            None => {
                self.top_level += 1;
                self.top_level - 1
            }
        };
        self.items.push(TestItem {
            parent,
            children: Vec::new(),
            flags: ItemFlags::empty(),
            z: 0.0,
            sibling_index,
            rect,
            destroying: false,
        });
        id
    }

    pub(crate) fn set_rect(&mut self, id: usize, rect: Rect) {
        self.items[id].rect = rect;
    }

    pub(crate) fn set_flags(&mut self, id: usize, flags: ItemFlags) {
        self.items[id].flags = flags;
    }

    pub(crate) fn set_z(&mut self, id: usize, z: f64) {
        self.items[id].z = z;
    }

    pub(crate) fn set_destroying(&mut self, id: usize) {
        self.items[id].destroying = true;
    }

    pub(crate) fn set_parent(&mut self, id: usize, parent: Option<usize>) {
        if let Some(old) = self.items[id].parent {
            self.items[old].children.retain(|&c| c != id);
        }
        if let Some(p) = parent {
            self.items[p].children.push(id);
        }
        self.items[id].parent = parent;
    }
}

impl ItemGraph for TestGraph {
    type Id = usize;

    fn parent(&self, item: usize) -> Option<usize> {
        self.items[item].parent
    }

    fn children(&self, item: usize) -> &[usize] {
        &self.items[item].children
    }

    fn flags(&self, item: usize) -> ItemFlags {
        self.items[item].flags
    }

    fn z_value(&self, item: usize) -> f64 {
        self.items[item].z
    }

    fn sibling_index(&self, item: usize) -> usize {
        self.items[item].sibling_index
    }

    fn scene_bounding_rect(&self, item: usize) -> Rect {
        self.items[item].rect
    }

    fn is_being_destroyed(&self, item: usize) -> bool {
        self.items[item].destroying
    }
}
