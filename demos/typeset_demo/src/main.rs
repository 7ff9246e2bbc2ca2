// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated frame loop that exercises typesetting and the diagnostics
//! pipeline.
//!
//! Runs 600 synthetic 60 Hz frames through a bottom-anchored
//! [`StackLayer`] and a [`FloatLayer`]. Midway the host clock jumps by 3 s as
//! if the app had been suspended, and later the stack grows to three tracks.
//! Events go to both a
//! [`PrettyPrintSink`](danmaku_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](danmaku_debug::recorder::RecorderSink), and the recording
//! is exported as a Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;

use danmaku_core::config::Config;
use danmaku_core::host::{Command, DropPool, EventSink, Sinks};
use danmaku_core::interval::Placement;
use danmaku_core::item::{Item, ItemId, ItemIds};
use danmaku_core::layer::{FloatLayer, Frame, Layer, StackLayer};
use danmaku_core::time::{HostTime, PlayTime};
use danmaku_core::trace::{
    AdmitEvent, EvictEvent, FrameStepEvent, FrameSummary, RecomputeEvent, TraceSink, Tracer,
    TrimEvent,
};

use danmaku_debug::pretty::PrettyPrintSink;
use danmaku_debug::recorder::RecorderSink;

use kurbo::Size;

const FRAME_COUNT: usize = 600;
const FRAME_MS: u64 = 16;
/// Frame at which the host clock jumps forward.
const SUSPEND_FRAME: usize = 300;
const SUSPEND_MS: u64 = 3_000;
/// Frame at which the stack grows from two tracks to three.
const REGROW_FRAME: usize = 450;

const COMMENTS: &[&str] = &[
    "first!",
    "this part again",
    "the soundtrack here is unreal",
    "lol",
    "who else is watching in 2026",
    "wait what just happened",
    "subtitles please",
    "goosebumps",
];

/// Forwards every trace event to two sinks.
struct Tee<'a> {
    first: &'a mut dyn TraceSink,
    second: &'a mut dyn TraceSink,
}

impl TraceSink for Tee<'_> {
    fn on_frame_step(&mut self, e: &FrameStepEvent) {
        self.first.on_frame_step(e);
        self.second.on_frame_step(e);
    }

    fn on_admit(&mut self, e: &AdmitEvent) {
        self.first.on_admit(e);
        self.second.on_admit(e);
    }

    fn on_evict(&mut self, e: &EvictEvent) {
        self.first.on_evict(e);
        self.second.on_evict(e);
    }

    fn on_recompute(&mut self, e: &RecomputeEvent) {
        self.first.on_recompute(e);
        self.second.on_recompute(e);
    }

    fn on_trim(&mut self, e: &TrimEvent) {
        self.first.on_trim(e);
        self.second.on_trim(e);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.first.on_frame_summary(s);
        self.second.on_frame_summary(s);
    }
}

/// Counts lifecycle notifications.
#[derive(Debug, Default)]
struct Tally {
    shown: usize,
    dismissed: usize,
    missed: usize,
}

impl<T> EventSink<T> for Tally {
    fn on_shown(&mut self, _: &Item<T>) {
        self.shown += 1;
    }

    fn on_dismissed(&mut self, _: &Item<T>) {
        self.dismissed += 1;
    }

    fn on_missed(&mut self, _: &Item<T>) {
        self.missed += 1;
    }
}

fn main() {
    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let mut recorder = RecorderSink::new();
    let mut pool = DropPool;
    let mut tally = Tally::default();
    let mut measure = |text: &String, _: &Config| Size::new(text.len() as f64 * 14.0, 24.0);

    // -- layers ------------------------------------------------------------
    let surface = Size::new(1280.0, 720.0);
    let mut config = Config::new();
    let mut stack = StackLayer::new(&config, Placement::seeded(1));
    let mut float = FloatLayer::new(&config, Placement::seeded(2));
    stack.set_surface(surface);
    float.set_surface(surface);

    // -- simulated loop ----------------------------------------------------
    let mut ids = ItemIds::new();
    let mut now_ms: u64 = 1_000;
    let mut play_ms: u64 = 0;
    let mut paused: Option<ItemId> = None;

    for frame_index in 0..FRAME_COUNT {
        if frame_index == SUSPEND_FRAME {
            // Wall clock moves on, playback does not.
            now_ms += SUSPEND_MS;
        }
        let config_changed = frame_index == REGROW_FRAME;
        if config_changed {
            config.stack.line_count = 3;
        }
        let play_time = PlayTime(play_ms);

        // 1. New comments, a burst of three every 10 frames.
        let mut stacked = Vec::new();
        let mut floating = Vec::new();
        if frame_index % 10 == 0 {
            for k in 0..3 {
                let text = COMMENTS[(frame_index + k) % COMMENTS.len()].to_owned();
                let size = measure(&text, &config);
                let item = Item::new(ids.next_id(), text, size, play_time);
                if k == 2 {
                    floating.push(item);
                } else {
                    stacked.push(item);
                }
            }
        }

        let mut tee = Tee {
            first: &mut pretty,
            second: &mut recorder,
        };
        let mut sinks =
            Sinks::new(&mut pool, &mut tally, &mut measure).with_tracer(Tracer::new(&mut tee));

        stack.add_items(play_time, stacked, &mut sinks);
        float.add_items(play_time, floating, &mut sinks);

        // 2. Hold one resident item in place for a while.
        if frame_index == 100 {
            paused = stack.items().next().map(Item::id);
            if let Some(id) = paused {
                stack.apply(Command::Pause(id), &config, &mut sinks);
            }
        }
        if frame_index == 250
            && let Some(id) = paused.take()
        {
            stack.apply(Command::Resume(id), &config, &mut sinks);
        }

        // 3. Typeset.
        let frame = Frame {
            now: HostTime(now_ms),
            play_time,
            playing: true,
            config_changed,
        };
        stack.typeset(&frame, &config, &mut sinks);
        float.typeset(&frame, &config, &mut sinks);

        // Advance time.
        now_ms += FRAME_MS;
        play_ms += FRAME_MS;
    }

    {
        let mut sinks = Sinks::new(&mut pool, &mut tally, &mut measure);
        stack.clear(&mut sinks);
        float.clear(&mut sinks);
    }

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    danmaku_debug::chrome::export(recorder.as_bytes(), &mut writer)
        .expect("failed to write Chrome trace");

    println!(
        "Wrote {path} ({FRAME_COUNT} frames, {} items: {} shown, {} dismissed, {} missed)",
        ids.next_id().0,
        tally.shown,
        tally.dismissed,
        tally.missed,
    );
}
