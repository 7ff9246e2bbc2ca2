// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Track allocation and typesetting for danmaku overlays.
//!
//! `danmaku_core` decides where each comment of a danmaku overlay appears and
//! when it disappears. It does not draw anything. It is `no_std` compatible
//! (with `alloc`) and generic over the host's item payload.
//!
//! # Architecture
//!
//! A host feeds items in and drives one [`typeset`](layer::Layer::typeset)
//! per display frame:
//!
//! ```text
//!   Host items ──► Layer::add_items()
//!                        │
//!        ┌───────────────┴────────────────┐
//!        ▼                                ▼
//!   AdmissionBuffer (StackLayer)      Track (FloatLayer)
//!        │  trim / FIFO retry             │
//!        ▼                                │
//!   Track × N ◄───────────────────────────┘
//!        │
//!        ▼  per frame
//!   FrameStepper ──► age ──► evict ──► IntervalSet::recompute()
//!        │
//!        ▼
//!   ItemPool::release() / EventSink
//! ```
//!
//! **[`interval`]**: free space of one track and the random bidirectional
//! fit that admits an item into the widest free interval.
//!
//! **[`track`]**: a lane of non-overlapping items with lifetime-based
//! eviction and per-item pause, resume, and re-measure.
//!
//! **[`stepper`]**: turns wall-clock readings into frame steps, replacing
//! app-suspension gaps with a nominal step.
//!
//! **[`buffer`]**: bounded staging queue with staleness trimming.
//!
//! **[`layer`]**: the [`Layer`](layer::Layer) trait with the bottom-anchored
//! [`StackLayer`](layer::StackLayer) and the single-track
//! [`FloatLayer`](layer::FloatLayer).
//!
//! **[`host`]**: collaborator traits the host implements.
//!
//! **[`config`]**, **[`item`]**, **[`time`]**: the data model.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! typesetting instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod buffer;
pub mod config;
pub mod host;
pub mod interval;
pub mod item;
pub mod layer;
pub mod stepper;
pub mod time;
pub mod trace;
pub mod track;
