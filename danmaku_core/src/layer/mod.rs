// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layers: the units a host drives once per frame.
//!
//! A layer owns one or more [`Track`](crate::track::Track)s and decides how
//! new items reach them:
//!
//! - [`StackLayer`] keeps a fixed number of tracks stacked upwards from the
//!   bottom edge of the surface. New items wait in an
//!   [`AdmissionBuffer`](crate::buffer::AdmissionBuffer) and are admitted at
//!   the next [`typeset`](Layer::typeset), spreading over empty tracks before
//!   packing into occupied ones.
//! - [`FloatLayer`] is a single track covering the whole surface. New items
//!   are admitted on arrival or not at all.
//!
//! # Frame protocol
//!
//! ```text
//!   add_items(play_time, items) ──► typeset(frame) ──► items() ──► draw
//!                                        │
//!                       admit ─► step ─► age ─► evict ─► recompute
//! ```
//!
//! Each call borrows the host's collaborators through [`Sinks`] so that every
//! item leaving the layer is reported and released exactly once.

mod float;
mod stack;

pub use float::FloatLayer;
pub use stack::StackLayer;

use kurbo::Size;

use crate::config::Config;
use crate::host::{Command, Sinks};
use crate::item::Item;
use crate::time::{HostTime, PlayTime};

/// Inputs for one typesetting pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Wall-clock time of the frame, used to derive the time step.
    pub now: HostTime,
    /// Playback position, stamped on items admitted this frame.
    pub play_time: PlayTime,
    /// Whether playback is running. When not, items neither age nor expire.
    pub playing: bool,
    /// Whether the [`Config`] differs from the previous frame's.
    pub config_changed: bool,
}

/// A surface region that places, advances, and expires items.
pub trait Layer<T> {
    /// Resizes the surface the layer lays its tracks out on.
    fn set_surface(&mut self, size: Size);

    /// Hands new items to the layer.
    fn add_items<I>(&mut self, play_time: PlayTime, items: I, sinks: &mut Sinks<'_, T>)
    where
        I: IntoIterator<Item = Item<T>>;

    /// Runs one frame and returns the number of resident items.
    fn typeset(&mut self, frame: &Frame, config: &Config, sinks: &mut Sinks<'_, T>) -> usize;

    /// Routes a command to the resident item it addresses.
    ///
    /// Returns whether a resident item matched.
    fn apply(&mut self, command: Command, config: &Config, sinks: &mut Sinks<'_, T>) -> bool;

    /// Iterates resident items for drawing.
    fn items<'a>(&'a self) -> impl Iterator<Item = &'a Item<T>>
    where
        T: 'a;

    /// Releases every item the layer holds.
    fn clear(&mut self, sinks: &mut Sinks<'_, T>);
}
