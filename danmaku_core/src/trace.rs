// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the typesetting loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! engine calls as it steps, admits, evicts, and trims. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Lifecycle notifications that the host relies on (shown, dismissed,
//! missed) do not go through here; they are delivered unconditionally via
//! [`EventSink`](crate::host::EventSink).
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use crate::item::ItemId;
use crate::time::{Duration, HostTime, PlayTime};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How an item found its track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdmitPass {
    /// Placed straight into a single free-roaming track.
    Direct,
    /// Placed into a completely empty track of a stack.
    Spread,
    /// Packed into a partly occupied track of a stack.
    Fallback,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a track computes its step for the frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameStepEvent {
    /// Track index within its layer.
    pub track: u32,
    /// Wall-clock time of the frame.
    pub now: HostTime,
    /// Raw delta since the previous frame, if there was one.
    pub measured: Option<Duration>,
    /// Step actually applied.
    pub step: Duration,
    /// Whether the raw delta was replaced by the nominal step.
    pub clamped: bool,
}

/// Emitted when an item is admitted into a track.
#[derive(Clone, Copy, Debug)]
pub struct AdmitEvent {
    /// Track index within its layer.
    pub track: u32,
    /// The admitted item.
    pub item: ItemId,
    /// Assigned left edge.
    pub x: f64,
    /// Item width.
    pub width: f64,
    /// Which admission pass placed it.
    pub pass: AdmitPass,
}

/// Emitted when an item's lifetime runs out.
#[derive(Clone, Copy, Debug)]
pub struct EvictEvent {
    /// Track index within its layer.
    pub track: u32,
    /// The evicted item.
    pub item: ItemId,
    /// Visible duration accumulated at eviction.
    pub show_duration: Duration,
}

/// Emitted after a track rebuilds its free intervals.
#[derive(Clone, Copy, Debug)]
pub struct RecomputeEvent {
    /// Track index within its layer.
    pub track: u32,
    /// Number of free intervals kept.
    pub intervals: u32,
    /// Total free length across kept intervals.
    pub free: f64,
}

/// Emitted after the admission buffer is trimmed.
#[derive(Clone, Copy, Debug)]
pub struct TrimEvent {
    /// Play position the trim ran against.
    pub play_time: PlayTime,
    /// Items discarded for being too old.
    pub stale: u32,
    /// Items discarded because the buffer was full.
    pub overflow: u32,
    /// Items left in the buffer.
    pub remaining: u32,
}

/// Per-frame counts for one layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    /// Play position of the frame.
    pub play_time: PlayTime,
    /// Items resident after the frame.
    pub resident: u32,
    /// Items still waiting for admission.
    pub buffered: u32,
    /// Items admitted this frame.
    pub admitted: u32,
    /// Items evicted this frame.
    pub evicted: u32,
    /// Items discarded unshown this frame.
    pub dropped: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the typesetting loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a track computes its frame step.
    fn on_frame_step(&mut self, e: &FrameStepEvent) {
        _ = e;
    }

    /// Called when an item is admitted.
    fn on_admit(&mut self, e: &AdmitEvent) {
        _ = e;
    }

    /// Called when an item is evicted.
    fn on_evict(&mut self, e: &EvictEvent) {
        _ = e;
    }

    /// Called when a track rebuilds its free intervals.
    fn on_recompute(&mut self, e: &RecomputeEvent) {
        _ = e;
    }

    /// Called after the admission buffer is trimmed.
    fn on_trim(&mut self, e: &TrimEvent) {
        _ = e;
    }

    /// Called with a per-frame summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameStepEvent`].
    #[inline]
    pub fn frame_step(&mut self, e: &FrameStepEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_step(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`AdmitEvent`].
    #[inline]
    pub fn admit(&mut self, e: &AdmitEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_admit(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`EvictEvent`].
    #[inline]
    pub fn evict(&mut self, e: &EvictEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_evict(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RecomputeEvent`].
    #[inline]
    pub fn recompute(&mut self, e: &RecomputeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_recompute(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TrimEvent`].
    #[inline]
    pub fn trim(&mut self, e: &TrimEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_trim(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
