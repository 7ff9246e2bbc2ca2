// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One horizontal lane of non-overlapping items.
//!
//! A [`Track`] owns its resident items, the [`IntervalSet`] of free space
//! between them, and a [`FrameStepper`]. Per item it drives the lifecycle
//!
//! ```text
//!   Pending ──try_admit──► Admitted ──advance──► (Active ⇄ Paused) ──► Evicted
//! ```
//!
//! Horizontal positions are stored in surface coordinates; the free
//! intervals are kept relative to the track's left edge.

use alloc::vec::Vec;

use kurbo::Rect;

use crate::config::{Config, TrackConfig};
use crate::host::{Command, Sinks};
use crate::interval::{IntervalSet, Placement};
use crate::item::{Item, ItemId};
use crate::layer::Frame;
use crate::stepper::FrameStepper;
use crate::time::PlayTime;
use crate::trace::{EvictEvent, FrameStepEvent, RecomputeEvent, Tracer};

/// A horizontal lane holding items whose extents never overlap.
#[derive(Debug)]
pub struct Track<T> {
    index: u32,
    bounds: Rect,
    items: Vec<Item<T>>,
    free: IntervalSet,
    stepper: FrameStepper,
}

impl<T> Track<T> {
    /// Creates a track with zero-sized bounds.
    ///
    /// `index` identifies the track in trace events. A zero-sized track admits
    /// nothing until [`set_bounds`](Self::set_bounds) gives it some width.
    #[must_use]
    pub fn new(index: u32) -> Self {
        Self {
            index,
            bounds: Rect::ZERO,
            items: Vec::new(),
            free: IntervalSet::new(),
            stepper: FrameStepper::new(),
        }
    }

    /// Returns the track's index within its layer.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns the track's bounds on the surface.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Returns the resident items in admission order.
    #[must_use]
    pub fn items(&self) -> &[Item<T>] {
        &self.items
    }

    /// Returns the free space, relative to the track's left edge.
    #[must_use]
    pub fn free(&self) -> &IntervalSet {
        &self.free
    }

    /// Number of resident items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no item is resident.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Moves the track to `bounds`, carrying resident items along and
    /// rebuilding the free space for the new width.
    pub fn set_bounds(&mut self, bounds: Rect, config: &TrackConfig, tracer: &mut Tracer<'_>) {
        let dx = bounds.x0 - self.bounds.x0;
        self.bounds = bounds;
        for item in &mut self.items {
            item.origin.x += dx;
            item.origin.y = bounds.y0;
        }
        self.recompute(config, tracer);
    }

    /// Tries to place `item` into the widest free interval.
    ///
    /// On success the item's position and show time are assigned and a
    /// reference to the resident item is returned. On failure the item is
    /// handed back unchanged.
    pub fn try_admit(
        &mut self,
        mut item: Item<T>,
        play_time: PlayTime,
        placement: &mut Placement,
    ) -> Result<&Item<T>, Item<T>> {
        let width = item.width();
        if width.is_nan() || width < 0.0 {
            return Err(item);
        }
        let side = placement.choose();
        let Some(x) = self.free.admit(width, side) else {
            return Err(item);
        };

        item.origin.x = self.bounds.x0 + x;
        item.origin.y = self.bounds.y0;
        item.show_time = Some(play_time);
        self.items.push(item);
        Ok(&self.items[self.items.len() - 1])
    }

    /// Runs one frame of typesetting and returns the number of resident
    /// items afterwards.
    ///
    /// The frame step is always computed, so the stepper stays in sync while
    /// playback is paused. When `frame.playing`, unpaused items accumulate the
    /// step and every item whose visible duration reached the configured
    /// lifetime is evicted, with free space rebuilt after each eviction. When
    /// `frame.config_changed`, items are re-measured and re-laid out against
    /// the track bounds, keeping their position and duration, and free space
    /// is rebuilt.
    pub fn advance(&mut self, frame: &Frame, config: &Config, sinks: &mut Sinks<'_, T>) -> usize {
        let step = self.stepper.step(frame.now, &config.stepper);
        sinks.tracer.frame_step(&FrameStepEvent {
            track: self.index,
            now: frame.now,
            measured: step.measured,
            step: step.applied,
            clamped: step.clamped,
        });

        if frame.playing {
            for item in self.items.iter_mut().filter(|item| !item.paused) {
                item.show_duration += step.applied;
            }
            self.evict_expired(&config.track, sinks);
        }

        if frame.config_changed {
            self.relayout(config, sinks);
        }
        self.items.len()
    }

    /// Applies a command to the addressed item.
    ///
    /// Returns `false` (and does nothing) if no resident item has that id.
    pub fn apply(&mut self, command: Command, config: &Config, sinks: &mut Sinks<'_, T>) -> bool {
        let Some(item) = self.find_mut(command.target()) else {
            return false;
        };
        match command {
            Command::Pause(_) => item.paused = true,
            Command::Resume(_) => item.paused = false,
            Command::Remeasure(_) => {
                item.size = sinks.measurer.measure(&item.payload, config);
                self.recompute(&config.track, &mut sinks.tracer);
            }
        }
        true
    }

    /// Dismisses every resident item and frees the whole track.
    ///
    /// The stepper forgets the previous frame, so the next
    /// [`advance`](Self::advance) applies no time step.
    pub fn clear(&mut self, config: &TrackConfig, sinks: &mut Sinks<'_, T>) {
        for item in self.items.drain(..) {
            sinks.dismiss(item);
        }
        self.stepper.reset();
        self.recompute(config, &mut sinks.tracer);
    }

    fn find_mut(&mut self, id: ItemId) -> Option<&mut Item<T>> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    fn evict_expired(&mut self, config: &TrackConfig, sinks: &mut Sinks<'_, T>) {
        let mut idx = 0;
        while idx < self.items.len() {
            if self.items[idx].show_duration < config.lifetime {
                idx += 1;
                continue;
            }
            let item = self.items.remove(idx);
            sinks.tracer.evict(&EvictEvent {
                track: self.index,
                item: item.id(),
                show_duration: item.show_duration,
            });
            sinks.dismiss(item);
            // Rebuild immediately so the freed range merges with its
            // neighbours before the next admission.
            self.recompute(config, &mut sinks.tracer);
        }
    }

    fn relayout(&mut self, config: &Config, sinks: &mut Sinks<'_, T>) {
        for item in &mut self.items {
            item.size = sinks.measurer.measure(&item.payload, config);
            item.origin.y = self.bounds.y0;
        }
        self.recompute(&config.track, &mut sinks.tracer);
    }

    fn recompute(&mut self, config: &TrackConfig, tracer: &mut Tracer<'_>) {
        let x0 = self.bounds.x0;
        self.free.recompute(
            self.items.iter().map(|item| (item.x() - x0, item.width())),
            self.bounds.width(),
            config.min_gap,
        );
        #[expect(
            clippy::cast_possible_truncation,
            reason = "interval count is bounded by resident items, far below u32::MAX"
        )]
        let intervals = self.free.len() as u32;
        tracer.recompute(&RecomputeEvent {
            track: self.index,
            intervals,
            free: self.free.total_len(),
        });
    }
}
