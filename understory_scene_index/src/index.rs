// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The index manager: slot bookkeeping, deferred insertion, purging, and queries.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};
use kurbo::Rect;
use understory_bsp::{Aabb2D, BspTree};

use crate::error::{IndexError, IndexResult};
use crate::graph::ItemGraph;
use crate::stacking::sort_items;
use crate::types::{IndexConfig, IndexStats, ItemChange, ItemFlags, SortOrder};

/// Smallest depth the automatic heuristic picks.
pub const MIN_AUTO_DEPTH: u32 = 5;

/// How far the item count must drift from the last rebuild before an automatic
/// depth change triggers another rebuild.
pub const AUTO_DEPTH_SLACK: usize = 100;

/// `max(ceil(log2(n)), MIN_AUTO_DEPTH)`, or 0 for an empty scene.
pub(crate) fn int_max_log(n: usize) -> u32 {
    if n == 0 {
        return 0;
    }
    let ceil_log2 = usize::BITS - (n - 1).leading_zeros();
    ceil_log2.max(MIN_AUTO_DEPTH)
}

fn rect_to_aabb(r: Rect) -> Aabb2D<f64> {
    Aabb2D::new(r.x0, r.y0, r.x1, r.y1)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Slot {
    /// Queued for insertion; no slot yet.
    Pending,
    /// Holds this slot in the item table.
    Indexed(usize),
}

/// State of the deferred index update.
///
/// Scheduling while an update is already pending only sets `restart`; the next
/// [`SceneIndex::timer_event`] then consumes the flag instead of updating, so a burst
/// of mutations is absorbed by a single later update.
#[derive(Copy, Clone, Debug, Default)]
struct IndexTimer {
    active: bool,
    restart: bool,
}

/// Spatial index over the items of an [`ItemGraph`].
///
/// Items enter through [`SceneIndex::add_item`] but are only placed in the partition by
/// the next deferred update, driven by [`SceneIndex::timer_event`]. Queries flush any
/// pending work first, so they never observe a stale state.
///
/// Items that ignore transformations live in a flat list returned by every rectangle
/// query; descendants of clipping items hold a slot but are kept out of the partition.
pub struct SceneIndex<Id: Copy + Eq + Hash + Debug> {
    bsp: BspTree<f64, Id>,
    scene_rect: Rect,
    /// Requested depth; `0` is automatic.
    bsp_tree_depth: u32,
    /// Depth used for the next rebuild.
    depth: u32,
    timer: IndexTimer,
    regenerate: bool,
    last_item_count: usize,
    regenerations: u64,
    /// Slot table; `None` marks a hole listed in `free_slots`.
    indexed: Vec<Option<Id>>,
    unindexed: Vec<Id>,
    untransformable: Vec<Id>,
    free_slots: Vec<usize>,
    slots: HashMap<Id, Slot>,
    purge_pending: bool,
    removed: HashSet<Id>,
}

impl<Id: Copy + Eq + Hash + Debug> Debug for SceneIndex<Id> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SceneIndex")
            .field("scene_rect", &self.scene_rect)
            .field("bsp_tree_depth", &self.bsp_tree_depth)
            .field("stats", &self.stats())
            .field("bsp", &self.bsp)
            .finish_non_exhaustive()
    }
}

impl<Id: Copy + Eq + Hash + Debug> Default for SceneIndex<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: Copy + Eq + Hash + Debug> SceneIndex<Id> {
    /// Create an empty index with an automatic depth over an empty scene rectangle.
    pub fn new() -> Self {
        Self::with_config(IndexConfig::default())
    }

    /// Create an empty index from `config`.
    pub fn with_config(config: IndexConfig) -> Self {
        Self {
            bsp: BspTree::new(),
            scene_rect: config.scene_rect,
            bsp_tree_depth: config.bsp_tree_depth,
            depth: config.bsp_tree_depth,
            timer: IndexTimer::default(),
            regenerate: true,
            last_item_count: 0,
            regenerations: 0,
            indexed: Vec::new(),
            unindexed: Vec::new(),
            untransformable: Vec::new(),
            free_slots: Vec::new(),
            slots: HashMap::new(),
            purge_pending: false,
            removed: HashSet::new(),
        }
    }

    /// The rectangle the partition subdivides.
    pub fn scene_rect(&self) -> Rect {
        self.scene_rect
    }

    /// Replace the scene rectangle and schedule a full rebuild.
    ///
    /// Every item goes back to the queue; repeated calls before the next update cost a
    /// single rebuild.
    pub fn update_scene_rect(&mut self, rect: Rect) -> IndexResult<(), Id> {
        if !rect.is_finite() {
            return Err(IndexError::InvalidSceneRect);
        }
        self.scene_rect = rect;
        self.reset_index();
        Ok(())
    }

    /// The requested partition depth; `0` means automatic.
    pub fn bsp_tree_depth(&self) -> u32 {
        self.bsp_tree_depth
    }

    /// Request a partition depth (`0` for automatic) and schedule a full rebuild if it changed.
    pub fn set_bsp_tree_depth(&mut self, depth: u32) {
        if self.bsp_tree_depth == depth {
            return;
        }
        self.bsp_tree_depth = depth;
        self.depth = depth;
        self.reset_index();
    }

    /// Whether a deferred update is scheduled.
    pub fn is_index_pending(&self) -> bool {
        self.timer.active
    }

    /// Whether `item` holds a slot or is queued for one.
    pub fn contains(&self, item: Id) -> bool {
        self.slots.contains_key(&item)
    }

    /// Whether `item` holds a slot.
    pub fn is_indexed(&self, item: Id) -> bool {
        matches!(self.slots.get(&item), Some(Slot::Indexed(_)))
    }

    /// A snapshot of the bookkeeping sizes.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            indexed: self.indexed.len() - self.free_slots.len().min(self.indexed.len()),
            unindexed: self.unindexed.len(),
            untransformable: self.untransformable.len(),
            free_slots: self.free_slots.len(),
            pending_removals: self.removed.len(),
            slot_table_len: self.indexed.len(),
            leaf_count: self.bsp.leaf_count(),
            depth: self.bsp.depth(),
            regenerations: self.regenerations,
        }
    }

    /// Queue `item` (and with `recursive`, its descendants) for insertion.
    ///
    /// Insertion is deferred because the item's geometry may not be final yet. Adding an
    /// item that is already tracked is reported as [`IndexError::AlreadyIndexed`] and
    /// otherwise skipped; descendants are still processed.
    pub fn add_item<G: ItemGraph<Id = Id> + ?Sized>(
        &mut self,
        graph: &G,
        item: Id,
        recursive: bool,
    ) -> IndexResult<(), Id> {
        // A queued purge must not outlive an identifier that is being reused.
        self.purge_removed_items();

        let mut result = Ok(());
        if self.slots.contains_key(&item) {
            tracing::warn!(?item, "item has already been added to the index");
            result = Err(IndexError::AlreadyIndexed(item));
        } else {
            self.enqueue(item);
        }

        if recursive {
            for &child in graph.children(item) {
                let child_result = self.add_item(graph, child, true);
                if result.is_ok() {
                    result = child_result;
                }
            }
        }
        result
    }

    fn enqueue(&mut self, item: Id) {
        self.slots.insert(item, Slot::Pending);
        self.unindexed.push(item);
        self.start_index_timer();
    }

    /// Stop tracking `item` (and with `recursive`, its descendants).
    ///
    /// With `move_to_unindexed` the items are queued again right away, which is how
    /// placement-affecting changes re-bucket a subtree. Untracked items are ignored.
    pub fn remove_item<G: ItemGraph<Id = Id> + ?Sized>(
        &mut self,
        graph: &G,
        item: Id,
        recursive: bool,
        move_to_unindexed: bool,
    ) {
        match self.slots.remove(&item) {
            Some(Slot::Indexed(slot)) => {
                debug_assert_eq!(self.indexed[slot], Some(item), "slot table out of sync");
                self.indexed[slot] = None;
                self.free_slots.push(slot);

                if graph.is_untransformable(item) {
                    if let Some(pos) = self.untransformable.iter().position(|&u| u == item) {
                        self.untransformable.remove(pos);
                    }
                } else if graph.is_being_destroyed(item) {
                    // Geometry is no longer readable; the purge only needs the id.
                    self.purge_pending = true;
                    self.removed.insert(item);
                } else if !graph.ancestor_clips_children(item) {
                    self.bsp.remove_item(item, rect_to_aabb(graph.scene_bounding_rect(item)));
                }
            }
            Some(Slot::Pending) => {
                self.unindexed.retain(|&u| u != item);
            }
            None => {}
        }

        if move_to_unindexed {
            self.enqueue(item);
        }

        if recursive {
            for &child in graph.children(item) {
                self.remove_item(graph, child, true, move_to_unindexed);
            }
        }
    }

    /// Take `item` and its descendants out of the partition ahead of a geometry change.
    ///
    /// Must be called before the new geometry is visible through the graph: removal
    /// uses the current bounding rectangle. The items are queued again and placed at
    /// their new boxes by the next update. Items outside the partition are unaffected.
    pub fn prepare_bounding_rect_change<G: ItemGraph<Id = Id> + ?Sized>(
        &mut self,
        graph: &G,
        item: Id,
    ) {
        if graph.is_untransformable(item) || graph.ancestor_clips_children(item) {
            // Neither the item nor any descendant is in the partition.
            return;
        }
        if self.is_indexed(item) {
            self.remove_item(graph, item, false, true);
        }
        for &child in graph.children(item) {
            self.prepare_bounding_rect_change(graph, child);
        }
    }

    /// React to a change that is about to be applied to `item`.
    ///
    /// When the change moves the item between the partition, the untransformable list,
    /// or the clipped set, the whole subtree is pulled out and queued again.
    pub fn item_change<G: ItemGraph<Id = Id> + ?Sized>(
        &mut self,
        graph: &G,
        item: Id,
        change: ItemChange<Id>,
    ) {
        let rebucket = match change {
            ItemChange::Flags(new_flags) => {
                (graph.flags(item) ^ new_flags).intersects(ItemFlags::PLACEMENT)
            }
            ItemChange::Parent(new_parent) => {
                let ignored = graph.is_untransformable(item);
                let will_ignore = graph
                    .flags(item)
                    .contains(ItemFlags::IGNORES_TRANSFORMATIONS)
                    || new_parent.is_some_and(|p| graph.is_untransformable(p));
                let clipped = graph.ancestor_clips_children(item);
                let will_clip = new_parent.is_some_and(|p| {
                    graph.flags(p).contains(ItemFlags::CLIPS_CHILDREN_TO_SHAPE)
                        || graph.ancestor_clips_children(p)
                });
                ignored != will_ignore || clipped != will_clip
            }
            ItemChange::ZValue(_) => false,
        };
        if rebucket {
            self.remove_item(graph, item, true, true);
        }
    }

    /// Drive the deferred update. Returns true if the index was updated.
    ///
    /// Call this once per turn of the host's event loop while
    /// [`SceneIndex::is_index_pending`] is true. A tick that finds the restart flag
    /// set only clears it, so bursts keep being batched until they settle.
    pub fn timer_event<G: ItemGraph<Id = Id> + ?Sized>(&mut self, graph: &G) -> bool {
        if !self.timer.active {
            return false;
        }
        if self.timer.restart {
            self.timer.restart = false;
            return false;
        }
        self.update_index(graph);
        true
    }

    /// Apply all pending removals and insertions now.
    pub fn flush<G: ItemGraph<Id = Id> + ?Sized>(&mut self, graph: &G) {
        self.purge_removed_items();
        self.update_index(graph);
    }

    /// Items whose bounding rectangle intersects `rect`, plus every untransformable item.
    pub fn estimate_items<G: ItemGraph<Id = Id> + ?Sized>(
        &mut self,
        graph: &G,
        rect: Rect,
        order: SortOrder,
    ) -> Vec<Id> {
        self.estimate(graph, rect, order, false)
    }

    /// Top-level ancestors of the items [`SceneIndex::estimate_items`] would return.
    pub fn estimate_top_level_items<G: ItemGraph<Id = Id> + ?Sized>(
        &mut self,
        graph: &G,
        rect: Rect,
        order: SortOrder,
    ) -> Vec<Id> {
        self.estimate(graph, rect, order, true)
    }

    fn estimate<G: ItemGraph<Id = Id> + ?Sized>(
        &mut self,
        graph: &G,
        rect: Rect,
        order: SortOrder,
        only_top_level: bool,
    ) -> Vec<Id> {
        self.flush(graph);
        debug_assert!(self.unindexed.is_empty(), "flush leaves nothing queued");

        let query = rect_to_aabb(rect);
        let mut items = if only_top_level {
            self.bsp.top_level_items(query, |item| graph.top_level_item(item))
        } else {
            self.bsp.items(query)
        };

        if only_top_level {
            for &item in &self.untransformable {
                let top = graph.top_level_item(item);
                if !items.contains(&top) {
                    items.push(top);
                }
            }
        } else {
            items.extend_from_slice(&self.untransformable);
        }

        sort_items(graph, &mut items, order, only_top_level);
        items
    }

    /// Every tracked item, indexed or still queued, in `order`.
    pub fn items<G: ItemGraph<Id = Id> + ?Sized>(
        &mut self,
        graph: &G,
        order: SortOrder,
    ) -> Vec<Id> {
        self.purge_removed_items();
        let mut items = Vec::with_capacity(self.slots.len());
        // Holes left by removals are skipped rather than reported.
        items.extend(self.indexed.iter().flatten().copied());
        items.extend_from_slice(&self.unindexed);
        sort_items(graph, &mut items, order, false);
        items
    }

    /// Forget every item and the partition. The next update rebuilds from scratch.
    pub fn clear(&mut self) {
        self.bsp.clear();
        self.last_item_count = 0;
        self.free_slots.clear();
        self.slots.clear();
        self.indexed.clear();
        self.unindexed.clear();
        self.untransformable.clear();
        self.removed.clear();
        self.purge_pending = false;
        self.regenerate = true;
    }

    fn start_index_timer(&mut self) {
        if self.timer.active {
            self.timer.restart = true;
        } else {
            self.timer.active = true;
        }
    }

    /// Return every indexed item to the queue and schedule a rebuild.
    fn reset_index(&mut self) {
        self.purge_removed_items();
        for item in self.indexed.drain(..).flatten() {
            self.slots.insert(item, Slot::Pending);
            self.unindexed.push(item);
        }
        self.free_slots.clear();
        self.untransformable.clear();
        self.regenerate = true;
        tracing::debug!(
            queued = self.unindexed.len(),
            "scene index reset; rebuild scheduled"
        );
        self.start_index_timer();
    }

    fn purge_removed_items(&mut self) {
        if !self.purge_pending && self.removed.is_empty() {
            return;
        }
        self.bsp.remove_items(&self.removed);
        self.removed.clear();
        self.free_slots.clear();
        // Reversed so that the lowest holes are reused first.
        self.free_slots.extend(
            self.indexed
                .iter()
                .enumerate()
                .rev()
                .filter(|(_, slot)| slot.is_none())
                .map(|(i, _)| i),
        );
        self.purge_pending = false;
    }

    fn update_index<G: ItemGraph<Id = Id> + ?Sized>(&mut self, graph: &G) {
        if !self.timer.active {
            return;
        }
        self.timer = IndexTimer::default();

        self.purge_removed_items();

        let mut to_insert = core::mem::take(&mut self.unindexed);
        for &item in &to_insert {
            let slot = match self.free_slots.pop() {
                Some(slot) => {
                    self.indexed[slot] = Some(item);
                    slot
                }
                None => {
                    self.indexed.push(Some(item));
                    self.indexed.len() - 1
                }
            };
            self.slots.insert(item, Slot::Indexed(slot));
        }

        let item_count = self.indexed.len();
        if self.bsp_tree_depth == 0 {
            let old_depth = int_max_log(self.last_item_count);
            self.depth = int_max_log(item_count);
            if self.bsp.leaf_count() == 0
                || (old_depth != self.depth
                    && self.last_item_count.abs_diff(item_count) > AUTO_DEPTH_SLACK)
            {
                self.regenerate = true;
            }
        }

        if self.regenerate {
            self.regenerate = false;
            self.bsp.initialize(rect_to_aabb(self.scene_rect), self.depth);
            to_insert = self.indexed.iter().flatten().copied().collect();
            self.untransformable.clear();
            self.last_item_count = item_count;
            self.regenerations += 1;
            tracing::debug!(
                depth = self.bsp.depth(),
                items = item_count,
                "rebuilt scene partition"
            );
        }

        for item in to_insert {
            if graph.is_untransformable(item) {
                self.untransformable.push(item);
                continue;
            }
            if graph.ancestor_clips_children(item) {
                continue;
            }
            self.bsp.insert_item(item, rect_to_aabb(graph.scene_bounding_rect(item)));
        }

        tracing::trace!(
            indexed = self.indexed.len() - self.free_slots.len(),
            untransformable = self.untransformable.len(),
            free_slots = self.free_slots.len(),
            "scene index updated"
        );
    }
}
