// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`]. A truncated trailing record, an
//! unknown tag, or an unknown admission pass ends iteration.

use danmaku_core::item::ItemId;
use danmaku_core::time::{Duration, HostTime, PlayTime};
use danmaku_core::trace::{
    AdmitEvent, AdmitPass, EvictEvent, FrameStepEvent, FrameSummary, RecomputeEvent, TraceSink,
    TrimEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_STEP: u8 = 1;
const TAG_ADMIT: u8 = 2;
const TAG_EVICT: u8 = 3;
const TAG_RECOMPUTE: u8 = 4;
const TAG_TRIM: u8 = 5;
const TAG_FRAME_SUMMARY: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_option_u64(&mut self, v: Option<u64>) {
        self.write_u8(u8::from(v.is_some()));
        self.write_u64(v.unwrap_or(0));
    }

    fn write_pass(&mut self, p: AdmitPass) {
        self.write_u8(match p {
            AdmitPass::Direct => 0,
            AdmitPass::Spread => 1,
            AdmitPass::Fallback => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_step(&mut self, e: &FrameStepEvent) {
        self.write_u8(TAG_FRAME_STEP);
        self.write_u32(e.track);
        self.write_u64(e.now.millis());
        self.write_option_u64(e.measured.map(Duration::millis));
        self.write_u64(e.step.millis());
        self.write_u8(u8::from(e.clamped));
    }

    fn on_admit(&mut self, e: &AdmitEvent) {
        self.write_u8(TAG_ADMIT);
        self.write_u32(e.track);
        self.write_u64(e.item.0);
        self.write_f64(e.x);
        self.write_f64(e.width);
        self.write_pass(e.pass);
    }

    fn on_evict(&mut self, e: &EvictEvent) {
        self.write_u8(TAG_EVICT);
        self.write_u32(e.track);
        self.write_u64(e.item.0);
        self.write_u64(e.show_duration.millis());
    }

    fn on_recompute(&mut self, e: &RecomputeEvent) {
        self.write_u8(TAG_RECOMPUTE);
        self.write_u32(e.track);
        self.write_u32(e.intervals);
        self.write_f64(e.free);
    }

    fn on_trim(&mut self, e: &TrimEvent) {
        self.write_u8(TAG_TRIM);
        self.write_u64(e.play_time.millis());
        self.write_u32(e.stale);
        self.write_u32(e.overflow);
        self.write_u32(e.remaining);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.write_u8(TAG_FRAME_SUMMARY);
        self.write_u64(s.play_time.millis());
        self.write_u32(s.resident);
        self.write_u32(s.buffered);
        self.write_u32(s.admitted);
        self.write_u32(s.evicted);
        self.write_u32(s.dropped);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`FrameStepEvent`].
    FrameStep(FrameStepEvent),
    /// An [`AdmitEvent`].
    Admit(AdmitEvent),
    /// An [`EvictEvent`].
    Evict(EvictEvent),
    /// A [`RecomputeEvent`].
    Recompute(RecomputeEvent),
    /// A [`TrimEvent`].
    Trim(TrimEvent),
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.take().map(f64::from_le_bytes)
    }

    fn read_option_u64(&mut self) -> Option<Option<u64>> {
        let present = self.read_u8()?;
        let val = self.read_u64()?;
        Some((present != 0).then_some(val))
    }

    fn read_pass(&mut self) -> Option<AdmitPass> {
        match self.read_u8()? {
            0 => Some(AdmitPass::Direct),
            1 => Some(AdmitPass::Spread),
            2 => Some(AdmitPass::Fallback),
            _ => None,
        }
    }

    fn decode_frame_step(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameStep(FrameStepEvent {
            track: self.read_u32()?,
            now: HostTime(self.read_u64()?),
            measured: self.read_option_u64()?.map(Duration),
            step: Duration(self.read_u64()?),
            clamped: self.read_u8()? != 0,
        }))
    }

    fn decode_admit(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Admit(AdmitEvent {
            track: self.read_u32()?,
            item: ItemId(self.read_u64()?),
            x: self.read_f64()?,
            width: self.read_f64()?,
            pass: self.read_pass()?,
        }))
    }

    fn decode_evict(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Evict(EvictEvent {
            track: self.read_u32()?,
            item: ItemId(self.read_u64()?),
            show_duration: Duration(self.read_u64()?),
        }))
    }

    fn decode_recompute(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Recompute(RecomputeEvent {
            track: self.read_u32()?,
            intervals: self.read_u32()?,
            free: self.read_f64()?,
        }))
    }

    fn decode_trim(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Trim(TrimEvent {
            play_time: PlayTime(self.read_u64()?),
            stale: self.read_u32()?,
            overflow: self.read_u32()?,
            remaining: self.read_u32()?,
        }))
    }

    fn decode_frame_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSummary(FrameSummary {
            play_time: PlayTime(self.read_u64()?),
            resident: self.read_u32()?,
            buffered: self.read_u32()?,
            admitted: self.read_u32()?,
            evicted: self.read_u32()?,
            dropped: self.read_u32()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_FRAME_STEP => self.decode_frame_step(),
            TAG_ADMIT => self.decode_admit(),
            TAG_EVICT => self.decode_evict(),
            TAG_RECOMPUTE => self.decode_recompute(),
            TAG_TRIM => self.decode_trim(),
            TAG_FRAME_SUMMARY => self.decode_frame_summary(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_step() -> FrameStepEvent {
        FrameStepEvent {
            track: 1,
            now: HostTime(5_016),
            measured: Some(Duration(250)),
            step: Duration(16),
            clamped: true,
        }
    }

    fn sample_admit() -> AdmitEvent {
        AdmitEvent {
            track: 0,
            item: ItemId(42),
            x: 12.5,
            width: 180.25,
            pass: AdmitPass::Fallback,
        }
    }

    fn sample_summary() -> FrameSummary {
        FrameSummary {
            play_time: PlayTime(5_000),
            resident: 6,
            buffered: 2,
            admitted: 1,
            evicted: 3,
            dropped: 1,
        }
    }

    #[test]
    fn frame_step_keeps_clamping_details() {
        let mut rec = RecorderSink::new();
        rec.on_frame_step(&sample_step());
        rec.on_frame_step(&FrameStepEvent {
            measured: None,
            step: Duration::ZERO,
            clamped: false,
            ..sample_step()
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 2);
        match &events[0] {
            RecordedEvent::FrameStep(e) => {
                assert_eq!(e.track, 1);
                assert_eq!(e.now, HostTime(5_016));
                assert_eq!(e.measured, Some(Duration(250)));
                assert_eq!(e.step, Duration(16));
                assert!(e.clamped);
            }
            other => panic!("expected FrameStep, got {other:?}"),
        }
        match &events[1] {
            RecordedEvent::FrameStep(e) => assert_eq!(e.measured, None),
            other => panic!("expected FrameStep, got {other:?}"),
        }
    }

    #[test]
    fn admit_preserves_geometry_and_pass() {
        let mut rec = RecorderSink::new();
        rec.on_admit(&sample_admit());

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[..] {
            [RecordedEvent::Admit(e)] => {
                assert_eq!(e.item, ItemId(42));
                assert_eq!(e.x, 12.5);
                assert_eq!(e.width, 180.25);
                assert_eq!(e.pass, AdmitPass::Fallback);
            }
            other => panic!("expected one Admit, got {other:?}"),
        }
    }

    #[test]
    fn mixed_sequence_decodes_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_trim(&TrimEvent {
            play_time: PlayTime(5_000),
            stale: 1,
            overflow: 0,
            remaining: 2,
        });
        rec.on_admit(&sample_admit());
        rec.on_frame_step(&sample_step());
        rec.on_evict(&EvictEvent {
            track: 0,
            item: ItemId(7),
            show_duration: Duration(4_000),
        });
        rec.on_recompute(&RecomputeEvent {
            track: 0,
            intervals: 2,
            free: 640.0,
        });
        rec.on_frame_summary(&sample_summary());

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 6);
        assert!(matches!(events[0], RecordedEvent::Trim(e) if e.stale == 1));
        assert!(matches!(events[1], RecordedEvent::Admit(_)));
        assert!(matches!(events[2], RecordedEvent::FrameStep(_)));
        assert!(matches!(events[3], RecordedEvent::Evict(e) if e.item == ItemId(7)));
        assert!(matches!(events[4], RecordedEvent::Recompute(e) if e.free == 640.0));
        match &events[5] {
            RecordedEvent::FrameSummary(s) => assert_eq!(*s, sample_summary()),
            other => panic!("expected FrameSummary, got {other:?}"),
        }
    }

    #[test]
    fn truncated_record_ends_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_admit(&sample_admit());
        rec.on_frame_summary(&sample_summary());
        let bytes = rec.into_bytes();

        let events: Vec<_> = decode(&bytes[..bytes.len() - 3]).collect();
        assert_eq!(events.len(), 1, "partial summary is dropped");
    }

    #[test]
    fn unknown_pass_ends_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_admit(&sample_admit());
        let mut bytes = rec.into_bytes();
        // The pass is the last byte of an admit record.
        *bytes.last_mut().unwrap() = 9;

        let mut tail = RecorderSink::new();
        tail.on_frame_summary(&sample_summary());
        bytes.extend_from_slice(tail.as_bytes());

        let events: Vec<_> = decode(&bytes).collect();
        assert!(events.is_empty(), "got {events:?}");
    }

    #[test]
    fn unknown_tag_ends_iteration() {
        let events: Vec<_> = decode(&[0xff, 1, 2, 3]).collect();
        assert!(events.is_empty());
    }
}
