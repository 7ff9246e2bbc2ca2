// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Only frame steps carry a wall-clock time. Every other event is stamped
//! with the time of the most recent frame step before it (zero if none).
//! Each item's visible lifetime becomes an async span from admission to
//! eviction, using the track index as the thread id.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut now_ms = 0_u64;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::FrameStep(e) => {
                now_ms = e.now.millis();
                let name = if e.clamped { "ClampedStep" } else { "FrameStep" };
                events.push(json!({
                    "ph": "i",
                    "name": name,
                    "cat": "Stepper",
                    "ts": ms_to_us(now_ms),
                    "pid": 0,
                    "tid": e.track,
                    "s": "t",
                    "args": {
                        "measured_ms": e.measured.map(|d| d.millis()),
                        "step_ms": e.step.millis(),
                    }
                }));
            }
            RecordedEvent::Admit(e) => {
                events.push(json!({
                    "ph": "b",
                    "name": format!("item {}", e.item.0),
                    "cat": "Item",
                    "id": e.item.0,
                    "ts": ms_to_us(now_ms),
                    "pid": 0,
                    "tid": e.track,
                    "args": {
                        "x": e.x,
                        "width": e.width,
                        "pass": format!("{:?}", e.pass),
                    }
                }));
            }
            RecordedEvent::Evict(e) => {
                events.push(json!({
                    "ph": "e",
                    "name": format!("item {}", e.item.0),
                    "cat": "Item",
                    "id": e.item.0,
                    "ts": ms_to_us(now_ms),
                    "pid": 0,
                    "tid": e.track,
                    "args": {
                        "show_duration_ms": e.show_duration.millis(),
                    }
                }));
            }
            RecordedEvent::Recompute(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": format!("track {} free", e.track),
                    "cat": "Track",
                    "ts": ms_to_us(now_ms),
                    "pid": 0,
                    "args": {
                        "free": e.free,
                        "intervals": e.intervals,
                    }
                }));
            }
            RecordedEvent::Trim(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Trim",
                    "cat": "Buffer",
                    "ts": ms_to_us(now_ms),
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "play_ms": e.play_time.millis(),
                        "stale": e.stale,
                        "overflow": e.overflow,
                        "remaining": e.remaining,
                    }
                }));
            }
            RecordedEvent::FrameSummary(s) => {
                events.push(json!({
                    "ph": "C",
                    "name": "Items",
                    "cat": "Summary",
                    "ts": ms_to_us(now_ms),
                    "pid": 0,
                    "args": {
                        "resident": s.resident,
                        "buffered": s.buffered,
                    }
                }));
                if s.dropped > 0 {
                    events.push(json!({
                        "ph": "i",
                        "name": "Dropped",
                        "cat": "Summary",
                        "ts": ms_to_us(now_ms),
                        "pid": 0,
                        "tid": 0,
                        "s": "g",
                        "args": {
                            "play_ms": s.play_time.millis(),
                            "count": s.dropped,
                        }
                    }));
                }
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ms_to_us(ms: u64) -> u64 {
    ms.saturating_mul(1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use danmaku_core::item::ItemId;
    use danmaku_core::time::{Duration, HostTime, PlayTime};
    use danmaku_core::trace::{
        AdmitEvent, AdmitPass, EvictEvent, FrameStepEvent, FrameSummary, TraceSink,
    };

    fn step(now: u64) -> FrameStepEvent {
        FrameStepEvent {
            track: 0,
            now: HostTime(now),
            measured: Some(Duration(16)),
            step: Duration(16),
            clamped: false,
        }
    }

    #[test]
    fn item_lifetime_becomes_async_span() {
        let mut rec = RecorderSink::new();
        rec.on_frame_step(&step(1_000));
        rec.on_admit(&AdmitEvent {
            track: 1,
            item: ItemId(3),
            x: 0.0,
            width: 100.0,
            pass: AdmitPass::Spread,
        });
        rec.on_frame_step(&step(5_000));
        rec.on_evict(&EvictEvent {
            track: 1,
            item: ItemId(3),
            show_duration: Duration(4_000),
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 4);

        assert_eq!(parsed[1]["ph"], "b");
        assert_eq!(parsed[1]["id"], 3);
        assert_eq!(parsed[1]["ts"], 1_000_000, "stamped with the last step");
        assert_eq!(parsed[1]["args"]["pass"], "Spread");

        assert_eq!(parsed[3]["ph"], "e");
        assert_eq!(parsed[3]["id"], 3);
        assert_eq!(parsed[3]["ts"], 5_000_000);
    }

    #[test]
    fn summary_emits_counters_and_drops() {
        let mut rec = RecorderSink::new();
        rec.on_frame_summary(&FrameSummary {
            play_time: PlayTime(200),
            resident: 5,
            buffered: 1,
            admitted: 0,
            evicted: 0,
            dropped: 2,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["ph"], "C");
        assert_eq!(parsed[0]["args"]["resident"], 5);
        assert_eq!(parsed[1]["name"], "Dropped");
        assert_eq!(parsed[1]["args"]["count"], 2);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
