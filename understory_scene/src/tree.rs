// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core scene implementation: structure, updates, queries.

use alloc::vec;
use alloc::vec::Vec;
use kurbo::{Affine, Point, Rect};
use understory_scene_index::{
    IndexConfig, IndexStats, ItemChange, ItemFlags, ItemGraph, SceneIndex, SortOrder,
};

use crate::error::{SceneError, SceneResult};
use crate::types::{ItemId, LocalItem};

/// Result of a hit test.
#[derive(Clone, Debug)]
pub struct Hit {
    /// The matched item.
    pub item: ItemId,
    /// Path from the top-level item to the matched item (inclusive).
    pub path: Vec<ItemId>,
}

#[derive(Clone, Debug)]
struct Item {
    generation: u32,
    parent: Option<ItemId>,
    children: Vec<ItemId>,
    local: LocalItem,
    sibling_index: usize,
    next_child_index: usize,
    scene_transform: Affine,
    scene_bounds: Rect,
    destroying: bool,
}

impl Item {
    fn new(generation: u32, local: LocalItem) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            local,
            sibling_index: 0,
            next_child_index: 0,
            scene_transform: Affine::IDENTITY,
            scene_bounds: Rect::ZERO,
            destroying: false,
        }
    }
}

/// Item storage, kept apart from the index so both can be borrowed at once.
#[derive(Clone, Debug, Default)]
struct Items {
    slots: Vec<Option<Item>>,
    generations: Vec<u32>, // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    next_top_level_index: usize,
}

impl Items {
    fn is_alive(&self, id: ItemId) -> bool {
        self.slots
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .is_some_and(|n| n.generation == id.1)
    }

    fn get(&self, id: ItemId) -> Option<&Item> {
        let n = self.slots.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        let n = self.slots.get_mut(id.idx())?.as_mut()?;
        (n.generation == id.1).then_some(n)
    }

    /// Access an item the index asked about; panics if `id` is stale.
    fn item(&self, id: ItemId) -> &Item {
        self.get(id).expect("dangling ItemId")
    }

    fn item_mut(&mut self, id: ItemId) -> &mut Item {
        self.get_mut(id).expect("dangling ItemId")
    }

    fn allocate(&mut self, local: LocalItem) -> ItemId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(Item::new(generation, local));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(Item::new(generation, local)));
            self.generations.push(generation);
            (self.slots.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "ItemId uses 32-bit indices."
        )]
        let idx = idx as u32;
        ItemId::new(idx, generation)
    }

    fn next_sibling_index(&mut self, parent: Option<ItemId>) -> usize {
        let counter = match parent {
            Some(p) => &mut self.item_mut(p).next_child_index,
            None => &mut self.next_top_level_index,
        };
        let index = *counter;
        *counter += 1;
        index
    }

    fn is_ancestor_or_self(&self, ancestor: ItemId, mut id: ItemId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.item(id).parent {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    fn subtree(&self, root: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend_from_slice(&self.item(id).children);
        }
        out
    }

    /// Recompute cached scene transforms and bounds for `root` and its descendants.
    fn refresh(&mut self, root: ItemId) {
        let parent_tf = self
            .item(root)
            .parent
            .map_or(Affine::IDENTITY, |p| self.item(p).scene_transform);
        let mut stack = vec![(root, parent_tf)];
        while let Some((id, parent_tf)) = stack.pop() {
            let item = self.item_mut(id);
            let placed = parent_tf * item.local.local_transform;
            let flags = item.local.flags;
            // Untransformable items keep their own scale and rotation: only the
            // position of their origin follows the ancestors.
            item.scene_transform = if flags.contains(ItemFlags::IGNORES_TRANSFORMATIONS) {
                Affine::translate(placed.translation())
            } else {
                placed
            };
            item.scene_bounds = transform_rect_bbox(item.scene_transform, item.local.local_bounds);
            let tf = item.scene_transform;
            stack.extend(item.children.iter().map(|&c| (c, tf)));
        }
    }

    fn link_parent(&mut self, id: ItemId, parent: Option<ItemId>) {
        let sibling_index = self.next_sibling_index(parent);
        if let Some(p) = parent {
            self.item_mut(p).children.push(id);
        }
        let item = self.item_mut(id);
        item.parent = parent;
        item.sibling_index = sibling_index;
    }

    fn unlink_parent(&mut self, id: ItemId) {
        if let Some(p) = self.item(id).parent {
            self.item_mut(p).children.retain(|c| *c != id);
        }
        self.item_mut(id).parent = None;
    }

    fn path_to_root(&self, mut id: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        loop {
            out.push(id);
            match self.item(id).parent {
                Some(p) => id = p,
                None => break,
            }
        }
        out.reverse();
        out
    }
}

impl ItemGraph for Items {
    type Id = ItemId;

    fn parent(&self, item: ItemId) -> Option<ItemId> {
        self.item(item).parent
    }

    fn children(&self, item: ItemId) -> &[ItemId] {
        &self.item(item).children
    }

    fn flags(&self, item: ItemId) -> ItemFlags {
        self.item(item).local.flags
    }

    fn z_value(&self, item: ItemId) -> f64 {
        self.item(item).local.z_value
    }

    fn sibling_index(&self, item: ItemId) -> usize {
        self.item(item).sibling_index
    }

    fn scene_bounding_rect(&self, item: ItemId) -> Rect {
        self.item(item).scene_bounds
    }

    fn is_being_destroyed(&self, item: ItemId) -> bool {
        self.item(item).destroying
    }
}

/// A hierarchy of items kept in sync with a [`SceneIndex`].
///
/// Every mutation notifies the index before it is applied, so queries always reflect
/// the current geometry and stacking.
pub struct Scene {
    items: Items,
    index: SceneIndex<ItemId>,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.items.slots.len();
        let alive = self.items.slots.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Scene")
            .field("items_total", &total)
            .field("items_alive", &alive)
            .field("free_list", &self.items.free_list.len())
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene with an automatic index depth and an empty scene rectangle.
    pub fn new() -> Self {
        Self::with_config(IndexConfig::default())
    }

    /// Create an empty scene whose index starts from `config`.
    pub fn with_config(config: IndexConfig) -> Self {
        Self {
            items: Items::default(),
            index: SceneIndex::with_config(config),
        }
    }

    /// Insert a new item as the top-most child of `parent` (or as a top-level item if `None`).
    pub fn insert(&mut self, parent: Option<ItemId>, local: LocalItem) -> SceneResult<ItemId> {
        if let Some(p) = parent {
            if !self.items.is_alive(p) {
                return Err(SceneError::StaleItem(p));
            }
        }
        let id = self.items.allocate(local);
        self.items.link_parent(id, parent);
        self.items.refresh(id);
        self.index.add_item(&self.items, id, false)?;
        Ok(id)
    }

    /// Remove an item and its subtree. Stale identifiers are ignored.
    ///
    /// The subtree is marked as being destroyed first, so the index drops it by identifier
    /// at its next purge instead of reading geometry.
    pub fn remove(&mut self, id: ItemId) {
        if !self.items.is_alive(id) {
            return;
        }
        let doomed = self.items.subtree(id);
        for &d in &doomed {
            self.items.item_mut(d).destroying = true;
        }
        self.index.remove_item(&self.items, id, true, false);
        self.items.unlink_parent(id);
        for d in doomed {
            self.items.slots[d.idx()] = None;
            self.items.free_list.push(d.idx());
        }
    }

    /// Move `id` under `new_parent`, on top of its new siblings.
    pub fn reparent(&mut self, id: ItemId, new_parent: Option<ItemId>) -> SceneResult<()> {
        if !self.items.is_alive(id) {
            return Err(SceneError::StaleItem(id));
        }
        if let Some(p) = new_parent {
            if !self.items.is_alive(p) {
                return Err(SceneError::StaleItem(p));
            }
            if self.items.is_ancestor_or_self(id, p) {
                return Err(SceneError::Cycle {
                    item: id,
                    parent: p,
                });
            }
        }
        if self.items.item(id).parent == new_parent {
            return Ok(());
        }
        self.index.prepare_bounding_rect_change(&self.items, id);
        self.index.item_change(&self.items, id, ItemChange::Parent(new_parent));
        self.items.unlink_parent(id);
        self.items.link_parent(id, new_parent);
        self.items.refresh(id);
        Ok(())
    }

    /// Update the local transform. Stale identifiers are ignored.
    pub fn set_local_transform(&mut self, id: ItemId, transform: Affine) {
        if !self.items.is_alive(id) {
            return;
        }
        self.index.prepare_bounding_rect_change(&self.items, id);
        self.items.item_mut(id).local.local_transform = transform;
        self.items.refresh(id);
    }

    /// Update the local bounds. Stale identifiers are ignored.
    pub fn set_local_bounds(&mut self, id: ItemId, bounds: Rect) {
        if !self.items.is_alive(id) {
            return;
        }
        self.index.prepare_bounding_rect_change(&self.items, id);
        self.items.item_mut(id).local.local_bounds = bounds;
        self.items.refresh(id);
    }

    /// Update the z-value. Stale identifiers are ignored.
    pub fn set_z_value(&mut self, id: ItemId, z: f64) {
        if !self.items.is_alive(id) {
            return;
        }
        self.index.item_change(&self.items, id, ItemChange::ZValue(z));
        self.items.item_mut(id).local.z_value = z;
    }

    /// Replace the item flags. Stale identifiers are ignored.
    pub fn set_flags(&mut self, id: ItemId, flags: ItemFlags) {
        let Some(item) = self.items.get(id) else {
            return;
        };
        let old = item.local.flags;
        if old == flags {
            return;
        }
        let moves = (old ^ flags).contains(ItemFlags::IGNORES_TRANSFORMATIONS);
        if moves {
            self.index.prepare_bounding_rect_change(&self.items, id);
        }
        self.index.item_change(&self.items, id, ItemChange::Flags(flags));
        self.items.item_mut(id).local.flags = flags;
        if moves {
            self.items.refresh(id);
        }
    }

    /// The rectangle the index partitions.
    pub fn scene_rect(&self) -> Rect {
        self.index.scene_rect()
    }

    /// Replace the rectangle the index partitions. Triggers a rebuild at the next update.
    pub fn set_scene_rect(&mut self, rect: Rect) -> SceneResult<()> {
        self.index.update_scene_rect(rect)?;
        Ok(())
    }

    /// Request an index depth; `0` picks one from the item count.
    pub fn set_bsp_tree_depth(&mut self, depth: u32) {
        self.index.set_bsp_tree_depth(depth);
    }

    /// The requested index depth; `0` means automatic.
    pub fn bsp_tree_depth(&self) -> u32 {
        self.index.bsp_tree_depth()
    }

    /// Drive the index's deferred update. Call once per event-loop turn.
    ///
    /// Returns true if the index was updated on this tick.
    pub fn tick(&mut self) -> bool {
        self.index.timer_event(&self.items)
    }

    /// Whether the index has deferred work.
    pub fn is_index_pending(&self) -> bool {
        self.index.is_index_pending()
    }

    /// Apply all deferred index work now.
    pub fn flush(&mut self) {
        self.index.flush(&self.items);
    }

    /// Items whose scene bounding box intersects `rect`, plus every untransformable item.
    pub fn items_in_rect(&mut self, rect: Rect, order: SortOrder) -> Vec<ItemId> {
        self.index.estimate_items(&self.items, rect, order)
    }

    /// Top-level ancestors of the items [`Scene::items_in_rect`] returns.
    pub fn top_level_items_in_rect(&mut self, rect: Rect, order: SortOrder) -> Vec<ItemId> {
        self.index.estimate_top_level_items(&self.items, rect, order)
    }

    /// Every live item, in `order`.
    pub fn items(&mut self, order: SortOrder) -> Vec<ItemId> {
        self.index.items(&self.items, order)
    }

    /// Hit test a scene-space point. Returns the top-most item whose bounding box contains it.
    pub fn hit_test_point(&mut self, pt: Point) -> Option<Hit> {
        let probe = Rect::from_points(pt, pt);
        let hits = self.index.estimate_items(&self.items, probe, SortOrder::Descending);
        let item = hits.into_iter().find(|&id| {
            let b = self.items.item(id).scene_bounds;
            b.x0 <= pt.x && pt.x <= b.x1 && b.y0 <= pt.y && pt.y <= b.y1
        })?;
        Some(Hit {
            item,
            path: self.items.path_to_root(item),
        })
    }

    /// Returns true if `id` refers to a live item.
    pub fn is_alive(&self, id: ItemId) -> bool {
        self.items.is_alive(id)
    }

    /// The parent of a live item; `None` for top-level or stale items.
    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.items.get(id)?.parent
    }

    /// The children of a live item, bottom-most insertion first. Empty for stale items.
    pub fn children(&self, id: ItemId) -> &[ItemId] {
        self.items.get(id).map_or(&[], |n| &n.children)
    }

    /// The local state of a live item.
    pub fn local(&self, id: ItemId) -> Option<&LocalItem> {
        self.items.get(id).map(|n| &n.local)
    }

    /// The cached scene-space bounding box of a live item.
    pub fn scene_bounding_rect(&self, id: ItemId) -> Option<Rect> {
        self.items.get(id).map(|n| n.scene_bounds)
    }

    /// The composed transform from item space to scene space.
    pub fn scene_transform(&self, id: ItemId) -> Option<Affine> {
        self.items.get(id).map(|n| n.scene_transform)
    }

    /// Snapshot of the index bookkeeping.
    pub fn index_stats(&self) -> IndexStats {
        self.index.stats()
    }
}

/// Transform an axis-aligned `Rect` by an `Affine` and return a conservative
/// axis-aligned bounding box in scene space.
fn transform_rect_bbox(affine: Affine, rect: Rect) -> Rect {
    let p0 = affine * Point::new(rect.x0, rect.y0);
    let p1 = affine * Point::new(rect.x1, rect.y0);
    let p2 = affine * Point::new(rect.x0, rect.y1);
    let p3 = affine * Point::new(rect.x1, rect.y1);
    let min_x = p0.x.min(p1.x).min(p2.x).min(p3.x);
    let min_y = p0.y.min(p1.y).min(p2.y).min(p3.y);
    let max_x = p0.x.max(p1.x).max(p2.x).max(p3.x);
    let max_y = p0.y.max(p1.y).max(p2.y).max(p3.y);
    Rect::new(min_x, min_y, max_x, max_y)
}
