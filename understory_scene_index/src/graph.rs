// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The view of the scene graph that the index reads from.

use core::fmt::Debug;
use core::hash::Hash;

use kurbo::Rect;

use crate::types::ItemFlags;

/// Read-only access to the items of a scene graph.
///
/// The graph owns the items; the index only stores their identifiers. Every method is
/// queried with an identifier the graph currently knows. The provided methods derive
/// ancestor state by walking [`ItemGraph::parent`] and can be overridden with cached values.
pub trait ItemGraph {
    /// Item identifier. Must stay unique for as long as the item is tracked by an index.
    type Id: Copy + Eq + Hash + Debug;

    /// The item's parent, or `None` for a top-level item.
    fn parent(&self, item: Self::Id) -> Option<Self::Id>;

    /// The item's direct children.
    fn children(&self, item: Self::Id) -> &[Self::Id];

    /// The item's own flags.
    fn flags(&self, item: Self::Id) -> ItemFlags;

    /// Stacking priority among siblings. Higher is on top.
    fn z_value(&self, item: Self::Id) -> f64;

    /// Insertion order among siblings, used when z-values tie. Higher is on top.
    fn sibling_index(&self, item: Self::Id) -> usize;

    /// Bounding rectangle in scene coordinates, composed through all ancestor transforms.
    fn scene_bounding_rect(&self, item: Self::Id) -> Rect;

    /// Whether the item is being torn down.
    ///
    /// While this is true the index must not read the item's geometry, so removal is
    /// deferred to a purge that only needs the identifier.
    fn is_being_destroyed(&self, _item: Self::Id) -> bool {
        false
    }

    /// Number of ancestors.
    fn depth(&self, item: Self::Id) -> usize {
        let mut depth = 0;
        let mut cur = self.parent(item);
        while let Some(p) = cur {
            depth += 1;
            cur = self.parent(p);
        }
        depth
    }

    /// The root-most ancestor, or the item itself when it is top level.
    fn top_level_item(&self, item: Self::Id) -> Self::Id {
        let mut top = item;
        while let Some(p) = self.parent(top) {
            top = p;
        }
        top
    }

    /// Whether the item or any ancestor ignores transformations.
    fn is_untransformable(&self, item: Self::Id) -> bool {
        let mut cur = Some(item);
        while let Some(i) = cur {
            if self.flags(i).contains(ItemFlags::IGNORES_TRANSFORMATIONS) {
                return true;
            }
            cur = self.parent(i);
        }
        false
    }

    /// Whether some ancestor (not the item itself) clips its children.
    fn ancestor_clips_children(&self, item: Self::Id) -> bool {
        let mut cur = self.parent(item);
        while let Some(p) = cur {
            if self.flags(p).contains(ItemFlags::CLIPS_CHILDREN_TO_SHAPE) {
                return true;
            }
            cur = self.parent(p);
        }
        false
    }
}
