// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Index error types.

use core::fmt::Debug;

use thiserror::Error;

/// Usage errors reported by [`SceneIndex`](crate::SceneIndex).
///
/// None of these leave the index inconsistent; the offending request is skipped.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum IndexError<Id: Debug> {
    /// The item already holds a slot or is already queued.
    #[error("item {0:?} has already been added to the index")]
    AlreadyIndexed(Id),

    /// A scene rectangle with a NaN or infinite edge.
    #[error("scene rectangle must be finite")]
    InvalidSceneRect,
}

/// Result type for index operations.
pub type IndexResult<T, Id> = Result<T, IndexError<Id>>;
