// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single free-roaming track covering the whole surface.

use kurbo::{Rect, Size};

use crate::config::Config;
use crate::host::{Command, Sinks};
use crate::interval::Placement;
use crate::item::Item;
use crate::layer::{Frame, Layer};
use crate::time::PlayTime;
use crate::trace::{AdmitEvent, AdmitPass, FrameSummary, Tracer};
use crate::track::Track;

/// A layer whose only track spans the full surface.
///
/// Items are admitted the moment they arrive. There is no buffer: an item
/// that does not fit is reported missed and released straight away.
#[derive(Debug)]
pub struct FloatLayer<T> {
    track: Track<T>,
    config: Config,
    placement: Placement,
    // Arrivals since the last typeset, for the frame summary.
    admitted: usize,
    dropped: usize,
}

impl<T> FloatLayer<T> {
    /// Creates a layer with an empty surface.
    #[must_use]
    pub fn new(config: &Config, placement: Placement) -> Self {
        Self {
            track: Track::new(0),
            config: *config,
            placement,
            admitted: 0,
            dropped: 0,
        }
    }

    /// Returns the layer's track.
    #[must_use]
    pub fn track(&self) -> &Track<T> {
        &self.track
    }
}

impl<T> Layer<T> for FloatLayer<T> {
    fn set_surface(&mut self, size: Size) {
        self.track.set_bounds(
            Rect::from_origin_size((0.0, 0.0), size),
            &self.config.track,
            &mut Tracer::none(),
        );
    }

    fn add_items<I>(&mut self, play_time: PlayTime, items: I, sinks: &mut Sinks<'_, T>)
    where
        I: IntoIterator<Item = Item<T>>,
    {
        for item in items {
            match self
                .track
                .try_admit(item, play_time, &mut self.placement)
            {
                Ok(admitted) => {
                    sinks.tracer.admit(&AdmitEvent {
                        track: 0,
                        item: admitted.id(),
                        x: admitted.x(),
                        width: admitted.width(),
                        pass: AdmitPass::Direct,
                    });
                    sinks.shown(admitted);
                    self.admitted += 1;
                }
                Err(rejected) => {
                    self.dropped += 1;
                    sinks.miss(rejected);
                }
            }
        }
    }

    fn typeset(&mut self, frame: &Frame, config: &Config, sinks: &mut Sinks<'_, T>) -> usize {
        if frame.config_changed {
            self.config = *config;
        }
        let before = self.track.len();
        let resident = self.track.advance(frame, config, sinks);

        #[expect(
            clippy::cast_possible_truncation,
            reason = "per-frame counts are bounded by what fits on one track"
        )]
        let summary = FrameSummary {
            play_time: frame.play_time,
            resident: resident as u32,
            buffered: 0,
            admitted: core::mem::take(&mut self.admitted) as u32,
            evicted: (before - resident) as u32,
            dropped: core::mem::take(&mut self.dropped) as u32,
        };
        sinks.tracer.frame_summary(&summary);
        resident
    }

    fn apply(&mut self, command: Command, config: &Config, sinks: &mut Sinks<'_, T>) -> bool {
        self.track.apply(command, config, sinks)
    }

    fn items<'a>(&'a self) -> impl Iterator<Item = &'a Item<T>>
    where
        T: 'a,
    {
        self.track.items().iter()
    }

    fn clear(&mut self, sinks: &mut Sinks<'_, T>) {
        self.track.clear(&self.config.track, sinks);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::host::testing::{EventLog, PoolLog, width_measurer};
    use crate::interval::Side;
    use crate::item::ItemId;
    use crate::time::{Duration, HostTime};

    fn make_item(id: u64, width: f64) -> Item<f64> {
        Item::new(ItemId(id), width, Size::new(width, 20.0), PlayTime(0))
    }

    fn make_frame(now: u64) -> Frame {
        Frame {
            now: HostTime(now),
            play_time: PlayTime(now),
            playing: true,
            config_changed: false,
        }
    }

    #[test]
    fn admits_on_arrival_and_drops_misfits() {
        let config = Config::new();
        let mut layer = FloatLayer::new(&config, Placement::Fixed(Side::Right));
        layer.set_surface(Size::new(200.0, 600.0));
        let (mut pool, mut log, mut measurer) =
            (PoolLog::default(), EventLog::default(), width_measurer);
        let mut sinks = Sinks::new(&mut pool, &mut log, &mut measurer);

        layer.add_items(
            PlayTime(40),
            [make_item(1, 120.0), make_item(2, 120.0), make_item(3, 60.0)],
            &mut sinks,
        );

        let placed: Vec<(ItemId, f64)> = layer.items().map(|item| (item.id(), item.x())).collect();
        assert_eq!(placed, &[(ItemId(1), 80.0), (ItemId(3), 20.0)]);
        assert!(
            layer.items().all(|item| item.show_time == Some(PlayTime(40))),
            "show time is the play position at admission"
        );
        assert_eq!(log.shown, &[ItemId(1), ItemId(3)]);
        assert_eq!(log.missed, &[ItemId(2)]);
        assert_eq!(pool.released, &[ItemId(2)]);
    }

    #[test]
    fn typeset_expires_items() {
        let mut config = Config::new();
        config.track.lifetime = Duration(32);
        let mut layer = FloatLayer::new(&config, Placement::seeded(2));
        layer.set_surface(Size::new(200.0, 600.0));
        let (mut pool, mut log, mut measurer) =
            (PoolLog::default(), EventLog::default(), width_measurer);
        let mut sinks = Sinks::new(&mut pool, &mut log, &mut measurer);

        layer.add_items(PlayTime(0), [make_item(1, 50.0)], &mut sinks);
        assert_eq!(layer.typeset(&make_frame(0), &config, &mut sinks), 1);
        assert_eq!(layer.typeset(&make_frame(16), &config, &mut sinks), 1);
        assert_eq!(layer.typeset(&make_frame(32), &config, &mut sinks), 0);
        assert_eq!(log.dismissed, &[ItemId(1)]);
        assert_eq!(
            layer.track().free().total_len(),
            200.0,
            "whole width free again"
        );
    }

    #[test]
    fn commands_and_clear() {
        let config = Config::new();
        let mut layer = FloatLayer::new(&config, Placement::seeded(9));
        layer.set_surface(Size::new(200.0, 600.0));
        let (mut pool, mut log, mut measurer) =
            (PoolLog::default(), EventLog::default(), width_measurer);
        let mut sinks = Sinks::new(&mut pool, &mut log, &mut measurer);

        layer.add_items(PlayTime(0), [make_item(1, 50.0)], &mut sinks);
        assert!(layer.apply(Command::Pause(ItemId(1)), &config, &mut sinks));
        assert!(!layer.apply(Command::Pause(ItemId(2)), &config, &mut sinks));
        layer.clear(&mut sinks);
        assert_eq!(layer.items().count(), 0);
        assert_eq!(log.dismissed, &[ItemId(1)]);
    }
}
