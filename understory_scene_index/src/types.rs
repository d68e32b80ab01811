// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene index: item flags, sort orders, change notifications, and configuration.

use kurbo::Rect;

bitflags::bitflags! {
    /// Item flags that decide where the index keeps an item and how it stacks.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ItemFlags: u8 {
        /// The item ignores inherited transformations (for example a screen-space label).
        ///
        /// Such items, and all their descendants, are kept in a flat list that every
        /// rectangle query returns.
        const IGNORES_TRANSFORMATIONS = 0b0000_0001;
        /// The item clips its descendants to its own shape.
        ///
        /// Descendants of a clipping item are never placed in the partition.
        const CLIPS_CHILDREN_TO_SHAPE = 0b0000_0010;
        /// The item is stacked behind its parent instead of in front of it.
        const STACKS_BEHIND_PARENT = 0b0000_0100;
    }
}

impl ItemFlags {
    /// Flags whose change can move an item (and its subtree) in or out of the partition.
    pub const PLACEMENT: Self = Self::IGNORES_TRANSFORMATIONS.union(Self::CLIPS_CHILDREN_TO_SHAPE);
}

/// Order of query results.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Bottom-most item first.
    Ascending,
    /// Top-most item first.
    #[default]
    Descending,
    /// Discovery order; no stacking comparison is performed.
    Unsorted,
}

/// A change that is about to be applied to an item.
///
/// Passed to [`SceneIndex::item_change`](crate::SceneIndex::item_change) before the scene
/// commits it, so the index can still see the old state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ItemChange<Id> {
    /// The item's flags are about to be replaced by these.
    Flags(ItemFlags),
    /// The item is about to be moved under this parent (`None` for top level).
    Parent(Option<Id>),
    /// The item's z-value is about to change. Stacking is evaluated at query time,
    /// so this never touches the partition.
    ZValue(f64),
}

/// Runtime configuration of a [`SceneIndex`](crate::SceneIndex).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IndexConfig {
    /// Rectangle the partition subdivides. Items outside it are still indexed, in the edge cells.
    pub scene_rect: Rect,
    /// Partition depth. `0` picks a depth from the item count.
    pub bsp_tree_depth: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            scene_rect: Rect::ZERO,
            bsp_tree_depth: 0,
        }
    }
}

/// Snapshot of the index bookkeeping, for diagnostics and tests.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Items holding a slot.
    pub indexed: usize,
    /// Items queued for their first (or next) insertion.
    pub unindexed: usize,
    /// Items kept in the flat untransformable list.
    pub untransformable: usize,
    /// Empty slots waiting to be reused.
    pub free_slots: usize,
    /// Items whose partition entries await the next purge.
    pub pending_removals: usize,
    /// Length of the slot table, holes included.
    pub slot_table_len: usize,
    /// Leaves in the partition; zero before the first update.
    pub leaf_count: usize,
    /// Depth used for the current partition.
    pub depth: u32,
    /// How many times the partition has been rebuilt.
    pub regenerations: u64,
}
