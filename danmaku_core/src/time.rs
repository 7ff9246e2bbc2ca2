// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wall-clock time, playback time, and durations.
//!
//! The engine runs on two clocks:
//!
//! - [`HostTime`] is the monotonic wall clock read by the driver once per
//!   frame. Only the [`FrameStepper`](crate::stepper::FrameStepper) looks at
//!   it, to derive how much time passed since the previous frame.
//! - [`PlayTime`] is the position of the host media (e.g. a video player).
//!   Items are scheduled against it and the admission buffer trims against
//!   it.
//!
//! [`Duration`] is shared by both clocks. All three are millisecond counts;
//! arithmetic never wraps.

use core::fmt;
use core::ops::{Add, AddAssign, Sub};

/// A point on the monotonic wall clock, in milliseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    /// Returns the raw millisecond value.
    #[inline]
    #[must_use]
    pub const fn millis(self) -> u64 {
        self.0
    }

    /// Returns the duration between `self` and an earlier time, or zero if
    /// `earlier` is after `self`.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for HostTime {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Duration) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostTime({}ms)", self.0)
    }
}

/// A position on the playback timeline, in milliseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PlayTime(pub u64);

impl PlayTime {
    /// Returns the raw millisecond value.
    #[inline]
    #[must_use]
    pub const fn millis(self) -> u64 {
        self.0
    }

    /// Moves this position back by `duration`, stopping at zero.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, duration: Duration) -> Self {
        Self(self.0.saturating_sub(duration.0))
    }
}

impl Add<Duration> for PlayTime {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Duration) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Debug for PlayTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayTime({}ms)", self.0)
    }
}

/// A span of time in milliseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(pub u64);

impl Duration {
    /// A zero-length duration.
    pub const ZERO: Self = Self(0);

    /// Creates a duration from a millisecond count.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the raw millisecond value.
    #[inline]
    #[must_use]
    pub const fn millis(self) -> u64 {
        self.0
    }

    /// Saturating addition.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Add for Duration {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
}

impl AddAssign for Duration {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = self.saturating_add(rhs);
    }
}

impl Sub for Duration {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.saturating_sub(rhs)
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duration({}ms)", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_arithmetic_saturates() {
        let a = Duration(100);
        let b = Duration(30);
        assert_eq!((a + b).millis(), 130);
        assert_eq!((a - b).millis(), 70);
        assert_eq!(b - a, Duration::ZERO, "subtraction must not wrap");
        assert_eq!(Duration(u64::MAX) + a, Duration(u64::MAX));
    }

    #[test]
    fn add_assign_accumulates() {
        let mut total = Duration::ZERO;
        for _ in 0..3 {
            total += Duration::from_millis(1500);
        }
        assert_eq!(total, Duration(4500));
    }

    #[test]
    fn host_time_since() {
        let t = HostTime(1000);
        assert_eq!(t.saturating_duration_since(HostTime(1500)), Duration::ZERO);
        assert_eq!(t.saturating_duration_since(HostTime(400)), Duration(600));
        assert_eq!((t + Duration(16)).millis(), 1016);
    }

    #[test]
    fn play_time_window_stops_at_zero() {
        assert_eq!(PlayTime(300).saturating_sub(Duration(500)), PlayTime(0));
        assert_eq!(PlayTime(2000).saturating_sub(Duration(500)), PlayTime(1500));
        assert_eq!(PlayTime(2000) + Duration(5), PlayTime(2005));
    }
}
