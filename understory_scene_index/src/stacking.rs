// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stacking order between items anywhere in the hierarchy.
//!
//! All orderings derive from one predicate, [`closest_item_first`], so ascending and
//! descending listings are always exact mirrors of each other.

use core::cmp::Ordering;

use crate::graph::ItemGraph;
use crate::types::{ItemFlags, SortOrder};

/// Returns true if sibling `a` is on top of sibling `b`.
///
/// An item stacked behind its parent is below one that is not; otherwise the higher
/// z-value wins, and on equal z-values the later sibling wins. A NaN z-value is above
/// every number.
pub fn closest_leaf<G: ItemGraph + ?Sized>(graph: &G, a: G::Id, b: G::Id) -> bool {
    let behind_a = graph.flags(a).contains(ItemFlags::STACKS_BEHIND_PARENT);
    let behind_b = graph.flags(b).contains(ItemFlags::STACKS_BEHIND_PARENT);
    if behind_a != behind_b {
        return behind_b;
    }
    match compare_z(graph.z_value(a), graph.z_value(b)) {
        Ordering::Equal => graph.sibling_index(a) > graph.sibling_index(b),
        ord => ord == Ordering::Greater,
    }
}

/// Total order on z-values: NaNs tie with each other above all numbers, and `-0.0`
/// ties with `0.0`.
fn compare_z(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b)
        .unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

/// Returns true if sibling `b` is on top of sibling `a`.
pub fn not_closest_leaf<G: ItemGraph + ?Sized>(graph: &G, a: G::Id, b: G::Id) -> bool {
    closest_leaf(graph, b, a)
}

/// Returns true if `a` is on top of `b`. The items don't need to be siblings.
///
/// The deeper item is walked up to the depth of the other. If that walk meets the other
/// item, the descendant is on top unless the ancestor's child on the path stacks behind
/// its parent. Otherwise both chains are walked in lockstep to their common ancestor and
/// the two children of that ancestor (or the two top-level items) are compared with
/// [`closest_leaf`].
pub fn closest_item_first<G: ItemGraph + ?Sized>(graph: &G, a: G::Id, b: G::Id) -> bool {
    if graph.parent(a) == graph.parent(b) {
        return closest_leaf(graph, a, b);
    }

    let mut depth_a = graph.depth(a);
    let mut depth_b = graph.depth(b);

    let mut t1 = a;
    while depth_a > depth_b {
        let Some(p) = graph.parent(t1) else {
            break;
        };
        if p == b {
            // b is an ancestor of a.
            return !graph.flags(t1).contains(ItemFlags::STACKS_BEHIND_PARENT);
        }
        t1 = p;
        depth_a -= 1;
    }

    let mut t2 = b;
    while depth_b > depth_a {
        let Some(p) = graph.parent(t2) else {
            break;
        };
        if p == a {
            // a is an ancestor of b.
            return graph.flags(t2).contains(ItemFlags::STACKS_BEHIND_PARENT);
        }
        t2 = p;
        depth_b -= 1;
    }

    // t1 and t2 are now at the same depth but distinct.
    let (mut p1, mut p2) = (t1, t2);
    let (mut c1, mut c2) = (Some(t1), Some(t2));
    while let (Some(x1), Some(x2)) = (c1, c2) {
        if x1 == x2 {
            break;
        }
        p1 = x1;
        p2 = x2;
        c1 = graph.parent(x1);
        c2 = graph.parent(x2);
    }

    closest_leaf(graph, p1, p2)
}

/// Returns true if `b` is on top of `a`. The items don't need to be siblings.
pub fn closest_item_last<G: ItemGraph + ?Sized>(graph: &G, a: G::Id, b: G::Id) -> bool {
    closest_item_first(graph, b, a)
}

/// Sort `items` in stacking `order`.
///
/// Top-level listings only contain top-level items, so they are compared with the
/// sibling rule directly.
pub fn sort_items<G: ItemGraph + ?Sized>(
    graph: &G,
    items: &mut [G::Id],
    order: SortOrder,
    only_top_level: bool,
) {
    let before: fn(&G, G::Id, G::Id) -> bool = match (order, only_top_level) {
        (SortOrder::Unsorted, _) => return,
        (SortOrder::Descending, true) => closest_leaf::<G>,
        (SortOrder::Ascending, true) => not_closest_leaf::<G>,
        (SortOrder::Descending, false) => closest_item_first::<G>,
        (SortOrder::Ascending, false) => closest_item_last::<G>,
    };
    items.sort_by(|&a, &b| {
        precedence(before(graph, a, b), before(graph, b, a))
    });
}

fn precedence(a_first: bool, b_first: bool) -> Ordering {
    match (a_first, b_first) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
