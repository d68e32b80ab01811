// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene error types.

use thiserror::Error;
use understory_scene_index::IndexError;

use crate::types::ItemId;

/// Errors reported by [`Scene`](crate::Scene) operations that take a structural decision.
///
/// Setters on stale identifiers are silent no-ops instead.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    /// The identifier does not refer to a live item.
    #[error("item {0:?} is not alive")]
    StaleItem(ItemId),

    /// The requested parent is the item itself or one of its descendants.
    #[error("cannot move {item:?} under its own descendant {parent:?}")]
    Cycle {
        /// The item being moved.
        item: ItemId,
        /// The rejected parent.
        parent: ItemId,
    },

    /// The index rejected the request.
    #[error(transparent)]
    Index(#[from] IndexError<ItemId>),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
