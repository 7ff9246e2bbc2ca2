// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bottom-anchored multi-track allocator.

use alloc::vec::Vec;

use kurbo::{Rect, Size};

use crate::buffer::AdmissionBuffer;
use crate::config::Config;
use crate::host::{Command, Sinks};
use crate::interval::Placement;
use crate::item::Item;
use crate::layer::{Frame, Layer};
use crate::time::PlayTime;
use crate::trace::{AdmitEvent, AdmitPass, FrameSummary, Tracer};
use crate::track::Track;

/// A stack of tracks anchored to the bottom edge of the surface.
///
/// Tracks are indexed from the bottom: track 0 sits `margin_bottom` above
/// the bottom edge and each following track sits one `line_height +
/// line_margin` higher. Changing the track count adds or removes tracks at
/// the top, so the bottom tracks keep their place and their items.
///
/// Admission runs two passes over the tracks, bottom first:
///
/// 1. **Spread**: the first completely empty track.
/// 2. **Fallback**: the first track whose widest free interval fits.
///
/// Items that fit nowhere stay buffered for the next frame.
#[derive(Debug)]
pub struct StackLayer<T> {
    tracks: Vec<Track<T>>,
    buffer: AdmissionBuffer<T>,
    surface: Size,
    config: Config,
    placement: Placement,
    // Discarded by `add_items` since the last typeset, for the frame summary.
    dropped: usize,
}

impl<T> StackLayer<T> {
    /// Creates a layer with the track count and buffer limits of `config`
    /// and an empty surface.
    #[must_use]
    pub fn new(config: &Config, placement: Placement) -> Self {
        let mut layer = Self {
            tracks: Vec::new(),
            buffer: AdmissionBuffer::new(config.stack.buffer_size, config.stack.buffer_max_age),
            surface: Size::ZERO,
            config: *config,
            placement,
            dropped: 0,
        };
        layer.grow_tracks();
        layer
    }

    /// Returns the tracks, bottom first.
    #[must_use]
    pub fn tracks(&self) -> &[Track<T>] {
        &self.tracks
    }

    /// Returns the admission buffer.
    #[must_use]
    pub fn buffer(&self) -> &AdmissionBuffer<T> {
        &self.buffer
    }

    /// Returns the configuration the layer last saw.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of resident items across all tracks.
    #[must_use]
    pub fn resident(&self) -> usize {
        self.tracks.iter().map(Track::len).sum()
    }

    fn grow_tracks(&mut self) {
        while self.tracks.len() < self.config.stack.line_count {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "track counts are tiny"
            )]
            let index = self.tracks.len() as u32;
            self.tracks.push(Track::new(index));
        }
    }

    /// Adjusts the track count to the current config. Removed tracks dismiss
    /// their residents, since those are no longer on screen.
    fn repartition(&mut self, sinks: &mut Sinks<'_, T>) {
        self.grow_tracks();
        while self.tracks.len() > self.config.stack.line_count {
            let Some(mut track) = self.tracks.pop() else {
                break;
            };
            track.clear(&self.config.track, sinks);
        }
    }

    fn layout(&mut self, tracer: &mut Tracer<'_>) {
        let stack = &self.config.stack;
        let pitch = stack.line_height + stack.line_margin;
        let mut bottom = self.surface.height - stack.margin_bottom;
        for track in &mut self.tracks {
            let bounds = Rect::new(0.0, bottom - stack.line_height, self.surface.width, bottom);
            track.set_bounds(bounds, &self.config.track, tracer);
            bottom -= pitch;
        }
    }
}

/// Places `item` into the first empty track, or failing that the first track
/// with room, scanning bottom first.
fn admit_into<T>(
    tracks: &mut [Track<T>],
    placement: &mut Placement,
    mut item: Item<T>,
    play_time: PlayTime,
    sinks: &mut Sinks<'_, T>,
) -> Result<(), Item<T>> {
    for pass in [AdmitPass::Spread, AdmitPass::Fallback] {
        for track in tracks.iter_mut() {
            if pass == AdmitPass::Spread && !track.is_empty() {
                continue;
            }
            let index = track.index();
            match track.try_admit(item, play_time, placement) {
                Ok(admitted) => {
                    sinks.tracer.admit(&AdmitEvent {
                        track: index,
                        item: admitted.id(),
                        x: admitted.x(),
                        width: admitted.width(),
                        pass,
                    });
                    sinks.shown(admitted);
                    return Ok(());
                }
                Err(rejected) => item = rejected,
            }
        }
    }
    Err(item)
}

impl<T> Layer<T> for StackLayer<T> {
    fn set_surface(&mut self, size: Size) {
        self.surface = size;
        self.layout(&mut Tracer::none());
    }

    fn add_items<I>(&mut self, play_time: PlayTime, items: I, sinks: &mut Sinks<'_, T>)
    where
        I: IntoIterator<Item = Item<T>>,
    {
        self.dropped += self.buffer.enqueue(items, sinks);
        self.dropped += self.buffer.trim(play_time, sinks);
    }

    fn typeset(&mut self, frame: &Frame, config: &Config, sinks: &mut Sinks<'_, T>) -> usize {
        let mut dropped = core::mem::take(&mut self.dropped);
        if frame.config_changed {
            self.config = *config;
            dropped += self.buffer.set_limits(
                config.stack.buffer_size,
                config.stack.buffer_max_age,
                sinks,
            );
            self.repartition(sinks);
            self.layout(&mut sinks.tracer);
            self.buffer.measure_items(sinks.measurer, config);
        }
        if !self.buffer.is_empty() {
            dropped += self.buffer.trim(frame.play_time, sinks);
        }

        let tracks = &mut self.tracks;
        let placement = &mut self.placement;
        let admitted = self.buffer.offer(|item| {
            admit_into(tracks, placement, item, frame.play_time, sinks)
        });

        let mut resident = 0;
        let mut evicted = 0;
        for track in &mut self.tracks {
            let before = track.len();
            let after = track.advance(frame, config, sinks);
            evicted += before - after;
            resident += after;
        }

        #[expect(
            clippy::cast_possible_truncation,
            reason = "per-frame counts are bounded by track and buffer capacity"
        )]
        let summary = FrameSummary {
            play_time: frame.play_time,
            resident: resident as u32,
            buffered: self.buffer.len() as u32,
            admitted: admitted as u32,
            evicted: evicted as u32,
            dropped: dropped as u32,
        };
        sinks.tracer.frame_summary(&summary);
        resident
    }

    fn apply(&mut self, command: Command, config: &Config, sinks: &mut Sinks<'_, T>) -> bool {
        self.tracks
            .iter_mut()
            .any(|track| track.apply(command, config, sinks))
    }

    fn items<'a>(&'a self) -> impl Iterator<Item = &'a Item<T>>
    where
        T: 'a,
    {
        self.tracks.iter().flat_map(Track::items)
    }

    fn clear(&mut self, sinks: &mut Sinks<'_, T>) {
        for track in &mut self.tracks {
            track.clear(&self.config.track, sinks);
        }
        self.buffer.clear(sinks);
    }
}
