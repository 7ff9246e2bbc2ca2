// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Free-space bookkeeping for a single track.
//!
//! An [`IntervalSet`] holds the horizontal ranges of a track that no resident
//! item covers. It changes in two ways:
//!
//! 1. **Admission** consumes the widest interval and splits off the part the
//!    new item does not use ([`IntervalSet::admit`]).
//! 2. **Recompute** throws every interval away and rebuilds the set from the
//!    gaps between resident items ([`IntervalSet::recompute`]). This is how
//!    space freed by an eviction merges with its neighbours.
//!
//! Gaps not longer than the minimum-gap threshold are dropped on recompute;
//! slivers are never worth tracking and would only cause churn.

use alloc::vec::Vec;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A half-open free range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    /// Inclusive left edge.
    pub start: f64,
    /// Exclusive right edge.
    pub end: f64,
}

impl Interval {
    /// Creates an interval.
    #[inline]
    #[must_use]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length of the interval; negative lengths read as zero.
    #[inline]
    #[must_use]
    pub fn len(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Whether the interval covers no space.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Which edge of the chosen interval an item is pushed against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Flush with the interval's left edge.
    Left,
    /// Flush with the interval's right edge.
    Right,
}

/// Chooses the [`Side`] for each admission.
///
/// Randomised placement keeps gaps from clustering on one side of the track.
/// The fixed variants make layouts reproducible.
#[derive(Clone, Debug)]
pub enum Placement {
    /// Unbiased coin flip from a seedable generator.
    Random(SmallRng),
    /// Always the given side.
    Fixed(Side),
}

impl Placement {
    /// Random placement seeded with `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::Random(SmallRng::seed_from_u64(seed))
    }

    /// Picks the side for the next admission.
    pub fn choose(&mut self) -> Side {
        match self {
            Self::Random(rng) => {
                if rng.random_bool(0.5) {
                    Side::Left
                } else {
                    Side::Right
                }
            }
            Self::Fixed(side) => *side,
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::seeded(0)
    }
}

/// The free ranges of one track, sorted by start and pairwise disjoint.
#[derive(Clone, Debug, Default)]
pub struct IntervalSet {
    intervals: Vec<Interval>,
}

impl IntervalSet {
    /// Creates an empty set (no free space).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            intervals: Vec::new(),
        }
    }

    /// Returns the free intervals in ascending order.
    #[must_use]
    pub fn as_slice(&self) -> &[Interval] {
        &self.intervals
    }

    /// Number of free intervals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Whether there is no free interval at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Total free length.
    #[must_use]
    pub fn total_len(&self) -> f64 {
        self.intervals.iter().map(Interval::len).sum()
    }

    /// Index of the widest interval; the first one wins ties.
    #[must_use]
    pub fn widest(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, interval) in self.intervals.iter().enumerate() {
            let len = interval.len();
            if best.is_none_or(|(_, best_len)| len > best_len) {
                best = Some((idx, len));
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Reserves `width` inside the widest interval and returns the left edge
    /// of the reserved range.
    ///
    /// Returns `None`, leaving the set untouched, if `width` does not fit the
    /// widest interval. Otherwise the interval is replaced by whatever is left
    /// of it on the side away from `side`, provided that remainder has
    /// positive length.
    pub fn admit(&mut self, width: f64, side: Side) -> Option<f64> {
        let idx = self.widest()?;
        let chosen = self.intervals[idx];
        if width.is_nan() || chosen.len() < width {
            return None;
        }

        let (x, rest) = match side {
            Side::Left => {
                let x = chosen.start;
                (x, Interval::new(x + width, chosen.end))
            }
            Side::Right => {
                let x = chosen.end - width;
                (x, Interval::new(chosen.start, x))
            }
        };

        if rest.is_empty() {
            self.intervals.remove(idx);
        } else {
            self.intervals[idx] = rest;
        }
        Some(x)
    }

    /// Rebuilds the set from the extents `[x, x + width)` of the resident
    /// items within a track `track_width` wide.
    ///
    /// `extents` need not be sorted. Only gaps strictly longer than `min_gap`
    /// are kept. With no extents, the whole width is one interval.
    pub fn recompute<I>(&mut self, extents: I, track_width: f64, min_gap: f64)
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        self.intervals.clear();
        let track_width = track_width.max(0.0);

        let mut sorted: Vec<(f64, f64)> = extents.into_iter().collect();
        if sorted.is_empty() {
            if track_width > 0.0 {
                self.intervals.push(Interval::new(0.0, track_width));
            }
            return;
        }
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut cursor = 0.0_f64;
        for (x, width) in sorted {
            self.push_gap(cursor, x, min_gap);
            cursor = cursor.max(x + width);
        }
        self.push_gap(cursor, track_width, min_gap);
    }

    fn push_gap(&mut self, start: f64, end: f64, min_gap: f64) {
        let gap = Interval::new(start, end);
        if gap.len() > min_gap && !gap.is_empty() {
            self.intervals.push(gap);
        }
    }
}
