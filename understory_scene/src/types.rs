// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene: item identifiers and local geometry.

use kurbo::{Affine, Rect};
use understory_scene_index::ItemFlags;

/// Identifier for an item in a [`Scene`](crate::Scene).
///
/// A small, copyable handle made of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any `ItemId` that pointed to it is now stale.
/// - On reuse of a freed slot its generation is incremented, producing a new, distinct `ItemId`.
///
/// Stale identifiers never alias a live item, which is what lets the scene index purge
/// removed items by identifier long after their slots were recycled.
/// Use [`Scene::is_alive`](crate::Scene::is_alive) to check liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ItemId(pub(crate) u32, pub(crate) u32);

impl ItemId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Local state of an item.
#[derive(Clone, Debug)]
pub struct LocalItem {
    /// Local (untransformed) bounds. For non-axis-aligned content, use a conservative AABB.
    pub local_bounds: Rect,
    /// Transform relative to the parent's coordinate space.
    pub local_transform: Affine,
    /// Stacking priority among siblings. Higher is drawn on top.
    pub z_value: f64,
    /// Placement and stacking flags.
    pub flags: ItemFlags,
}

impl Default for LocalItem {
    fn default() -> Self {
        Self {
            local_bounds: Rect::ZERO,
            local_transform: Affine::IDENTITY,
            z_value: 0.0,
            flags: ItemFlags::empty(),
        }
    }
}
