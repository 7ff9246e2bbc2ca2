// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Positioned, time-boxed overlay items.

use core::fmt;

use kurbo::{Point, Size};

use crate::time::{Duration, PlayTime};

/// Identifies one item for its whole life in the engine.
///
/// Ids are handed out by [`ItemIds`] when an item is created. Commands such
/// as [`Command::Pause`](crate::host::Command::Pause) address items by id, so
/// two items carrying equal payloads can still be told apart.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub u64);

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

/// Allocates increasing [`ItemId`]s.
#[derive(Clone, Debug, Default)]
pub struct ItemIds {
    next: u64,
}

impl ItemIds {
    /// Creates an allocator starting at id 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Returns a fresh id.
    pub fn next_id(&mut self) -> ItemId {
        let id = ItemId(self.next);
        self.next += 1;
        id
    }
}

/// A measured overlay item and its placement state.
///
/// The payload (text, styling, avatar) is opaque to the engine. Size is set
/// by the external measurer; `origin` and `show_time` are written on
/// admission; `show_duration` grows every advancing frame while the item is
/// not paused.
#[derive(Clone, Debug)]
pub struct Item<T> {
    id: ItemId,
    /// Opaque content.
    pub payload: T,
    /// Measured width and height.
    pub size: Size,
    /// Top-left corner, assigned by the track on admission.
    pub origin: Point,
    /// Playback time at which the item is meant to appear.
    pub show_at: PlayTime,
    /// Playback time at which the item was actually admitted.
    pub show_time: Option<PlayTime>,
    /// Accumulated visible duration.
    pub show_duration: Duration,
    /// Whether the item is excluded from duration accumulation.
    pub paused: bool,
}

impl<T> Item<T> {
    /// Creates a pending item scheduled at `show_at`.
    #[must_use]
    pub fn new(id: ItemId, payload: T, size: Size, show_at: PlayTime) -> Self {
        Self {
            id,
            payload,
            size,
            origin: Point::ZERO,
            show_at,
            show_time: None,
            show_duration: Duration::ZERO,
            paused: false,
        }
    }

    /// Returns the item's id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// Width of the item.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.size.width
    }

    /// Left edge of the item.
    #[inline]
    #[must_use]
    pub fn x(&self) -> f64 {
        self.origin.x
    }

    /// Right edge of the item (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.origin.x + self.size.width
    }

    /// Whether the item's horizontal extent intersects `other`'s.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x() < other.right() && other.x() < self.right()
    }
}
