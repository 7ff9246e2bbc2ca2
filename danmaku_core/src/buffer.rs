// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Staging queue for items waiting to be admitted.

use alloc::collections::VecDeque;

use crate::config::Config;
use crate::host::{Measurer, Sinks};
use crate::item::Item;
use crate::time::{Duration, PlayTime};
use crate::trace::TrimEvent;

/// Bounded FIFO of items not yet placed into any track.
///
/// Two policies keep it small:
///
/// - **Capacity.** Once full, enqueueing discards the oldest item.
/// - **Staleness.** [`trim`](Self::trim) discards every item scheduled
///   before `play_time - max_age`.
///
/// Discarded items were never shown, so they are reported missed and
/// released.
#[derive(Debug)]
pub struct AdmissionBuffer<T> {
    items: VecDeque<Item<T>>,
    capacity: usize,
    max_age: Duration,
    overflowed: u32,
    dropped_count: u64,
}

impl<T> AdmissionBuffer<T> {
    /// Creates an empty buffer. A zero capacity is promoted to one.
    #[must_use]
    pub fn new(capacity: usize, max_age: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            max_age,
            overflowed: 0,
            dropped_count: 0,
        }
    }

    /// Maximum number of buffered items.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Staleness window used by [`trim`](Self::trim).
    #[must_use]
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Number of buffered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total items discarded by either policy since creation.
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count
    }

    /// Iterates buffered items in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Item<T>> {
        self.items.iter()
    }

    /// Appends `items` in order, discarding the oldest buffered items when
    /// the capacity is exceeded.
    ///
    /// Returns the number of items discarded.
    pub fn enqueue<I>(&mut self, items: I, sinks: &mut Sinks<'_, T>) -> usize
    where
        I: IntoIterator<Item = Item<T>>,
    {
        let mut dropped = 0;
        for item in items {
            if self.items.len() == self.capacity
                && let Some(oldest) = self.items.pop_front()
            {
                sinks.miss(oldest);
                dropped += 1;
            }
            self.items.push_back(item);
        }
        self.record_overflow(dropped);
        dropped
    }

    /// Discards every item scheduled before `play_time - max_age`.
    ///
    /// Returns the number of stale items discarded. Emits a [`TrimEvent`]
    /// covering this trim and any overflow since the previous one.
    pub fn trim(&mut self, play_time: PlayTime, sinks: &mut Sinks<'_, T>) -> usize {
        let cutoff = play_time.saturating_sub(self.max_age);
        let mut kept = VecDeque::with_capacity(self.items.len());
        let mut stale = 0_usize;
        for item in self.items.drain(..) {
            if item.show_at < cutoff {
                sinks.miss(item);
                stale += 1;
            } else {
                kept.push_back(item);
            }
        }
        self.items = kept;
        self.dropped_count += stale as u64;

        #[expect(
            clippy::cast_possible_truncation,
            reason = "counts are bounded by buffer capacity"
        )]
        let (stale_count, remaining) = (stale as u32, self.items.len() as u32);
        sinks.tracer.trim(&TrimEvent {
            play_time,
            stale: stale_count,
            overflow: core::mem::take(&mut self.overflowed),
            remaining,
        });
        stale
    }

    /// Offers every buffered item to `admit` in arrival order.
    ///
    /// Items `admit` hands back stay buffered, keeping their relative order.
    /// Returns the number of items admitted.
    pub fn offer<F>(&mut self, mut admit: F) -> usize
    where
        F: FnMut(Item<T>) -> Result<(), Item<T>>,
    {
        let mut kept = VecDeque::with_capacity(self.items.len());
        let mut admitted = 0;
        for item in self.items.drain(..) {
            match admit(item) {
                Ok(()) => admitted += 1,
                Err(item) => kept.push_back(item),
            }
        }
        self.items = kept;
        admitted
    }

    /// Removes and returns every buffered item in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = Item<T>> + '_ {
        self.items.drain(..)
    }

    /// Re-derives the size of every buffered item.
    pub fn measure_items(&mut self, measurer: &mut dyn Measurer<T>, config: &Config) {
        for item in &mut self.items {
            item.size = measurer.measure(&item.payload, config);
        }
    }

    /// Applies new limits, discarding the oldest items if the buffer is now
    /// over capacity.
    ///
    /// Returns the number of items discarded.
    pub fn set_limits(
        &mut self,
        capacity: usize,
        max_age: Duration,
        sinks: &mut Sinks<'_, T>,
    ) -> usize {
        self.capacity = capacity.max(1);
        self.max_age = max_age;
        let mut dropped = 0;
        while self.items.len() > self.capacity {
            let Some(oldest) = self.items.pop_front() else {
                break;
            };
            sinks.miss(oldest);
            dropped += 1;
        }
        self.record_overflow(dropped);
        dropped
    }

    /// Discards every buffered item.
    pub fn clear(&mut self, sinks: &mut Sinks<'_, T>) {
        for item in self.items.drain(..) {
            sinks.miss(item);
        }
    }

    fn record_overflow(&mut self, dropped: usize) {
        self.dropped_count += dropped as u64;
        #[expect(
            clippy::cast_possible_truncation,
            reason = "overflow between trims is bounded by the enqueued batch"
        )]
        let dropped = dropped as u32;
        self.overflowed = self.overflowed.saturating_add(dropped);
    }
}
