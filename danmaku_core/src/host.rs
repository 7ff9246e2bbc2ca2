// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract with the host application.
//!
//! The engine never draws, allocates item storage, or measures text itself.
//! The host supplies those pieces through small traits:
//!
//! - [`ItemPool`] receives every item that leaves the engine, exactly once.
//! - [`EventSink`] hears about items becoming visible, being dismissed, or
//!   being missed (discarded before they were ever shown).
//! - [`Measurer`] derives an item's size from its payload and the current
//!   [`Config`].
//!
//! [`Sinks`] bundles them for the duration of one frame call, together with
//! a diagnostics [`Tracer`].

use kurbo::Size;

use crate::config::Config;
use crate::item::{Item, ItemId};
use crate::trace::Tracer;

/// Receives items that leave the engine.
///
/// Called exactly once per item: on eviction, when trimmed from the
/// admission buffer, when its track is removed, or on clear. Never called for
/// an item that is still resident.
pub trait ItemPool<T> {
    /// Takes back an item the engine no longer holds.
    fn release(&mut self, item: Item<T>);
}

/// An [`ItemPool`] that simply drops released items.
#[derive(Clone, Copy, Debug, Default)]
pub struct DropPool;

impl<T> ItemPool<T> for DropPool {
    fn release(&mut self, item: Item<T>) {
        drop(item);
    }
}

/// Receives item lifecycle notifications.
///
/// Each transition is reported exactly once, in the order it happened within
/// the frame. All methods default to no-ops.
pub trait EventSink<T> {
    /// The item was admitted and is now visible.
    fn on_shown(&mut self, item: &Item<T>) {
        _ = item;
    }

    /// The item finished its visible lifetime (or its track went away).
    fn on_dismissed(&mut self, item: &Item<T>) {
        _ = item;
    }

    /// The item was discarded without ever being shown.
    fn on_missed(&mut self, item: &Item<T>) {
        _ = item;
    }
}

/// An [`EventSink`] that ignores all notifications.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopEvents;

impl<T> EventSink<T> for NoopEvents {}

/// Computes an item's size from its payload.
pub trait Measurer<T> {
    /// Returns the size `payload` occupies under `config`.
    fn measure(&mut self, payload: &T, config: &Config) -> Size;
}

impl<T, F> Measurer<T> for F
where
    F: FnMut(&T, &Config) -> Size,
{
    fn measure(&mut self, payload: &T, config: &Config) -> Size {
        self(payload, config)
    }
}

/// An inbound command addressed to one resident item.
///
/// Commands naming an item that is not resident (already evicted, still
/// buffered, or never seen) are no-ops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Stop accumulating visible duration.
    Pause(ItemId),
    /// Resume accumulating visible duration.
    Resume(ItemId),
    /// Re-derive the item's size from the current configuration, keeping its
    /// position and duration.
    Remeasure(ItemId),
}

impl Command {
    /// Returns the item the command is addressed to.
    #[must_use]
    pub const fn target(self) -> ItemId {
        match self {
            Self::Pause(id) | Self::Resume(id) | Self::Remeasure(id) => id,
        }
    }
}

/// Host collaborators borrowed for one frame call.
pub struct Sinks<'a, T> {
    /// Where items go when they leave the engine.
    pub pool: &'a mut dyn ItemPool<T>,
    /// Lifecycle notifications.
    pub events: &'a mut dyn EventSink<T>,
    /// Size computation for re-measure.
    pub measurer: &'a mut dyn Measurer<T>,
    /// Diagnostics.
    pub tracer: Tracer<'a>,
}

impl<T> core::fmt::Debug for Sinks<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Sinks")
            .field("tracer", &self.tracer)
            .finish_non_exhaustive()
    }
}

impl<'a, T> Sinks<'a, T> {
    /// Bundles the given collaborators with a tracer that discards events.
    #[must_use]
    pub fn new(
        pool: &'a mut dyn ItemPool<T>,
        events: &'a mut dyn EventSink<T>,
        measurer: &'a mut dyn Measurer<T>,
    ) -> Self {
        Self {
            pool,
            events,
            measurer,
            tracer: Tracer::none(),
        }
    }

    /// Replaces the tracer.
    #[must_use]
    pub fn with_tracer(mut self, tracer: Tracer<'a>) -> Self {
        self.tracer = tracer;
        self
    }

    /// Reports `item` as shown.
    pub(crate) fn shown(&mut self, item: &Item<T>) {
        self.events.on_shown(item);
    }

    /// Reports `item` as dismissed and hands it to the pool.
    pub(crate) fn dismiss(&mut self, item: Item<T>) {
        self.events.on_dismissed(&item);
        self.pool.release(item);
    }

    /// Reports `item` as missed and hands it to the pool.
    pub(crate) fn miss(&mut self, item: Item<T>) {
        self.events.on_missed(&item);
        self.pool.release(item);
    }
}
