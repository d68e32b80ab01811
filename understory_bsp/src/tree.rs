// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The partition tree: flat node storage, leaf buckets, and rectangle descent.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashSet;

use crate::types::{Aabb2D, Scalar, lt};

/// Deepest partition [`BspTree::initialize`] will build.
///
/// Node storage grows as `2^(depth + 1)`, so requests beyond this are clamped.
pub const MAX_DEPTH: u32 = 16;

/// Axis a split line is perpendicular to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    const fn flip(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }

    /// The `(min, max)` extent of `rect` along this axis.
    fn extent<T: Copy>(self, rect: &Aabb2D<T>) -> (T, T) {
        match self {
            Self::X => (rect.min_x, rect.max_x),
            Self::Y => (rect.min_y, rect.max_y),
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum Node<T> {
    Split { axis: Axis, offset: T },
    Leaf(usize),
}

#[inline]
const fn first_child(index: usize) -> usize {
    index * 2 + 1
}

/// Binary space partitioning tree over a fixed rectangle.
///
/// The rectangle is halved `depth` times, alternating between vertical and horizontal
/// split lines, and items are stored in every leaf their box overlaps. An item that
/// straddles a split line is therefore stored more than once; queries deduplicate.
///
/// Descent only compares against split offsets, so boxes outside the partitioned
/// rectangle end up in the outermost leaves and are still found by queries.
pub struct BspTree<T: Scalar, P: Copy + Eq + Hash + Debug> {
    rect: Aabb2D<T>,
    depth: u32,
    nodes: Vec<Node<T>>,
    leaves: Vec<Vec<(P, Aabb2D<T>)>>,
}

impl<T: Scalar, P: Copy + Eq + Hash + Debug> Default for BspTree<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar, P: Copy + Eq + Hash + Debug> Debug for BspTree<T, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BspTree")
            .field("rect", &self.rect)
            .field("depth", &self.depth)
            .field("leaves", &self.leaves.len())
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

impl<T: Scalar, P: Copy + Eq + Hash + Debug> BspTree<T, P> {
    /// Create an uninitialized tree. It has no leaves until [`BspTree::initialize`] is called.
    pub fn new() -> Self {
        Self {
            rect: Aabb2D::new(T::zero(), T::zero(), T::zero(), T::zero()),
            depth: 0,
            nodes: Vec::new(),
            leaves: Vec::new(),
        }
    }

    /// Discard the current partition and build an empty one over `rect`.
    ///
    /// A `depth` of `n` produces `2^n` leaves. Depths above [`MAX_DEPTH`] are clamped.
    pub fn initialize(&mut self, rect: Aabb2D<T>, depth: u32) {
        let depth = depth.min(MAX_DEPTH);
        self.rect = rect;
        self.depth = depth;
        self.nodes.clear();
        self.nodes.resize((1_usize << (depth + 1)) - 1, Node::Leaf(usize::MAX));
        self.leaves.clear();
        self.leaves.reserve(1_usize << depth);
        self.build(0, rect, depth, Axis::X);
    }

    fn build(&mut self, index: usize, rect: Aabb2D<T>, depth: u32, axis: Axis) {
        if depth == 0 {
            self.nodes[index] = Node::Leaf(self.leaves.len());
            self.leaves.push(Vec::new());
            return;
        }
        let (first, second, offset) = match axis {
            Axis::X => {
                let mid = T::mid(rect.min_x, rect.max_x);
                (
                    Aabb2D::new(rect.min_x, rect.min_y, mid, rect.max_y),
                    Aabb2D::new(mid, rect.min_y, rect.max_x, rect.max_y),
                    mid,
                )
            }
            Axis::Y => {
                let mid = T::mid(rect.min_y, rect.max_y);
                (
                    Aabb2D::new(rect.min_x, rect.min_y, rect.max_x, mid),
                    Aabb2D::new(rect.min_x, mid, rect.max_x, rect.max_y),
                    mid,
                )
            }
        };
        self.nodes[index] = Node::Split { axis, offset };
        let child = first_child(index);
        self.build(child, first, depth - 1, axis.flip());
        self.build(child + 1, second, depth - 1, axis.flip());
    }

    /// Drop all leaves and nodes. The tree reports no leaves until re-initialized.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.leaves.clear();
    }

    /// Store `item` in every leaf that `aabb` overlaps.
    ///
    /// Does nothing on an uninitialized tree.
    pub fn insert_item(&mut self, item: P, aabb: Aabb2D<T>) {
        if self.nodes.is_empty() {
            return;
        }
        let leaves = &mut self.leaves;
        let mut store = |leaf: usize| leaves[leaf].push((item, aabb));
        climb(&self.nodes, &aabb, 0, &mut store);
    }

    /// Remove `item` from every leaf that `aabb` overlaps.
    ///
    /// `aabb` must be the box the item was inserted with; entries stored under a
    /// different box are left untouched. Missing items are ignored.
    pub fn remove_item(&mut self, item: P, aabb: Aabb2D<T>) {
        if self.nodes.is_empty() {
            return;
        }
        let leaves = &mut self.leaves;
        climb(&self.nodes, &aabb, 0, &mut |leaf| {
            leaves[leaf].retain(|(p, _)| *p != item);
        });
    }

    /// Remove every entry whose item is in `items`, wherever it is stored.
    pub fn remove_items(&mut self, items: &HashSet<P>) {
        if items.is_empty() {
            return;
        }
        for leaf in &mut self.leaves {
            leaf.retain(|(p, _)| !items.contains(p));
        }
    }

    /// Items whose stored box intersects `rect`, each reported once, in discovery order.
    pub fn items(&self, rect: Aabb2D<T>) -> Vec<P> {
        self.collect(rect, |item| item)
    }

    /// Like [`BspTree::items`], but every hit is replaced by `top_level(hit)` before
    /// deduplication, so a subtree with several hits is reported once through its root.
    pub fn top_level_items(&self, rect: Aabb2D<T>, top_level: impl FnMut(P) -> P) -> Vec<P> {
        self.collect(rect, top_level)
    }

    fn collect(&self, rect: Aabb2D<T>, mut map: impl FnMut(P) -> P) -> Vec<P> {
        let mut out = Vec::new();
        if self.nodes.is_empty() {
            return out;
        }
        let mut seen = HashSet::new();
        let leaves = &self.leaves;
        climb(&self.nodes, &rect, 0, &mut |leaf| {
            for &(item, aabb) in &leaves[leaf] {
                if !aabb.intersects(&rect) {
                    continue;
                }
                let item = map(item);
                if seen.insert(item) {
                    out.push(item);
                }
            }
        });
        out
    }

    /// Number of leaves; zero when the tree has not been initialized.
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Number of stored entries, counting straddling items once per leaf.
    pub fn len(&self) -> usize {
        self.leaves.iter().map(Vec::len).sum()
    }

    /// True if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.leaves.iter().all(Vec::is_empty)
    }

    /// The rectangle passed to the last [`BspTree::initialize`].
    pub fn rect(&self) -> Aabb2D<T> {
        self.rect
    }

    /// The depth of the current partition.
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

/// Visit every leaf whose cell may overlap `rect`.
fn climb<T: Scalar>(
    nodes: &[Node<T>],
    rect: &Aabb2D<T>,
    index: usize,
    visit: &mut impl FnMut(usize),
) {
    match nodes[index] {
        Node::Leaf(leaf) => visit(leaf),
        Node::Split { axis, offset } => {
            let (lo, hi) = axis.extent(rect);
            let child = first_child(index);
            if lt(lo, offset) {
                climb(nodes, rect, child, visit);
                if !lt(hi, offset) {
                    climb(nodes, rect, child + 1, visit);
                }
            } else {
                climb(nodes, rect, child + 1, visit);
            }
        }
    }
}
