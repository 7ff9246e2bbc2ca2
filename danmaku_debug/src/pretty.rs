// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Times are
//! printed in milliseconds.

use std::io::Write;

use danmaku_core::trace::{
    AdmitEvent, AdmitPass, EvictEvent, FrameStepEvent, FrameSummary, RecomputeEvent, TraceSink,
    TrimEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    show_steps: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("show_steps", &self.show_steps)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    ///
    /// Per-track frame steps are skipped unless
    /// [`show_steps`](Self::show_steps) is enabled; with several tracks they
    /// dominate the output.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            show_steps: false,
        }
    }

    /// Enables or disables per-track frame step lines.
    #[must_use]
    pub fn show_steps(mut self, show: bool) -> Self {
        self.show_steps = show;
        self
    }

    /// Consumes the sink and returns the destination.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn pass_name(pass: AdmitPass) -> &'static str {
    match pass {
        AdmitPass::Direct => "direct",
        AdmitPass::Spread => "spread",
        AdmitPass::Fallback => "fallback",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_step(&mut self, e: &FrameStepEvent) {
        if !self.show_steps {
            return;
        }
        let measured = match e.measured {
            Some(d) => format!("{}ms", d.millis()),
            None => "-".to_owned(),
        };
        let clamped = if e.clamped { " CLAMPED" } else { "" };
        let _ = writeln!(
            self.writer,
            "[step] track={} now={}ms measured={measured} step={}ms{clamped}",
            e.track,
            e.now.millis(),
            e.step.millis(),
        );
    }

    fn on_admit(&mut self, e: &AdmitEvent) {
        let _ = writeln!(
            self.writer,
            "[admit] track={} item={} x={:.1} w={:.1} pass={}",
            e.track,
            e.item.0,
            e.x,
            e.width,
            pass_name(e.pass),
        );
    }

    fn on_evict(&mut self, e: &EvictEvent) {
        let _ = writeln!(
            self.writer,
            "[evict] track={} item={} shown={}ms",
            e.track,
            e.item.0,
            e.show_duration.millis(),
        );
    }

    fn on_recompute(&mut self, e: &RecomputeEvent) {
        let _ = writeln!(
            self.writer,
            "[recompute] track={} intervals={} free={:.1}",
            e.track, e.intervals, e.free,
        );
    }

    fn on_trim(&mut self, e: &TrimEvent) {
        if e.stale == 0 && e.overflow == 0 {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[trim] play={}ms stale={} overflow={} remaining={}",
            e.play_time.millis(),
            e.stale,
            e.overflow,
            e.remaining,
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] play={}ms resident={} buffered={} +{} -{} dropped={}",
            s.play_time.millis(),
            s.resident,
            s.buffered,
            s.admitted,
            s.evicted,
            s.dropped,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use danmaku_core::item::ItemId;
    use danmaku_core::time::{Duration, HostTime, PlayTime};

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_writer()).unwrap()
    }

    #[test]
    fn pretty_print_admit() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_admit(&AdmitEvent {
            track: 1,
            item: ItemId(9),
            x: 120.0,
            width: 64.5,
            pass: AdmitPass::Spread,
        });
        let output = output(sink);
        assert!(output.starts_with("[admit]"), "got: {output}");
        assert!(output.contains("item=9"), "got: {output}");
        assert!(output.contains("w=64.5"), "got: {output}");
        assert!(output.contains("pass=spread"), "got: {output}");
    }

    #[test]
    fn steps_are_opt_in() {
        let step = FrameStepEvent {
            track: 0,
            now: HostTime(5_000),
            measured: Some(Duration(4_000)),
            step: Duration(16),
            clamped: true,
        };

        let mut quiet = PrettyPrintSink::with_writer(Vec::<u8>::new());
        quiet.on_frame_step(&step);
        assert!(output(quiet).is_empty());

        let mut verbose = PrettyPrintSink::with_writer(Vec::<u8>::new()).show_steps(true);
        verbose.on_frame_step(&step);
        let output = output(verbose);
        assert!(output.contains("measured=4000ms"), "got: {output}");
        assert!(output.contains("CLAMPED"), "got: {output}");
    }

    #[test]
    fn empty_trims_are_skipped() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_trim(&TrimEvent {
            play_time: PlayTime(100),
            stale: 0,
            overflow: 0,
            remaining: 3,
        });
        sink.on_frame_summary(&FrameSummary {
            play_time: PlayTime(100),
            resident: 4,
            ..FrameSummary::default()
        });
        let output = output(sink);
        assert_eq!(output.lines().count(), 1, "got: {output}");
        assert!(output.contains("resident=4"), "got: {output}");
    }
}
