// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame elapsed-time computation.
//!
//! The [`FrameStepper`] turns successive wall-clock readings into the time
//! step applied to resident items. Real frame intervals (including variable
//! refresh rates) pass through unchanged. Deltas at or above the configured
//! high-refresh ceiling come from the process being suspended rather than
//! from rendering, so they are replaced by the nominal step; otherwise items
//! would jump or expire instantly when the app resumes.

use crate::config::StepperConfig;
use crate::time::{Duration, HostTime};

/// The outcome of one [`FrameStepper::step`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// Raw wall-clock delta since the previous call, `None` on the first call.
    pub measured: Option<Duration>,
    /// Step to apply this frame. Zero on the first call.
    pub applied: Duration,
    /// Whether `measured` was replaced by the nominal step.
    pub clamped: bool,
}

/// Computes clamped frame-to-frame time steps.
#[derive(Clone, Debug, Default)]
pub struct FrameStepper {
    last: Option<HostTime>,
}

impl FrameStepper {
    /// Creates a stepper that has not seen a frame yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Returns the step for a frame at `now`, or `None` if this is the first
    /// frame and no step can be computed yet.
    ///
    /// Callers treat `None` as "no time elapsed".
    pub fn next_step(&mut self, now: HostTime, config: &StepperConfig) -> Option<Duration> {
        let step = self.step(now, config);
        step.measured.map(|_| step.applied)
    }

    /// Like [`next_step`](Self::next_step), but also reports the raw delta
    /// and whether it was clamped.
    pub fn step(&mut self, now: HostTime, config: &StepperConfig) -> Step {
        let Some(last) = self.last.replace(now) else {
            return Step {
                measured: None,
                applied: Duration::ZERO,
                clamped: false,
            };
        };

        let measured = now.saturating_duration_since(last);
        let clamped = measured >= config.high_refresh_ceiling;
        Step {
            measured: Some(measured),
            applied: if clamped {
                config.nominal_step
            } else {
                measured
            },
            clamped,
        }
    }

    /// Forgets the previous frame, so the next call is treated as the first.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StepperConfig {
        StepperConfig {
            nominal_step: Duration(16),
            high_refresh_ceiling: Duration(200),
        }
    }

    #[test]
    fn first_call_has_no_step() {
        let mut stepper = FrameStepper::new();
        assert_eq!(stepper.next_step(HostTime(1000), &config()), None);
    }

    #[test]
    fn long_gap_falls_back_to_nominal() {
        let config = config();
        let mut stepper = FrameStepper::new();
        let mut now = HostTime(1000);

        assert_eq!(stepper.next_step(now, &config), None);
        now = now + Duration(16);
        assert_eq!(stepper.next_step(now, &config), Some(Duration(16)));
        now = now + Duration(5000);
        assert_eq!(
            stepper.next_step(now, &config),
            Some(Duration(16)),
            "a 5 s gap must not be applied as a step"
        );
    }

    #[test]
    fn variable_refresh_passes_through() {
        let config = config();
        let mut stepper = FrameStepper::new();
        let _ = stepper.next_step(HostTime(0), &config);
        assert_eq!(stepper.next_step(HostTime(8), &config), Some(Duration(8)));
        assert_eq!(stepper.next_step(HostTime(41), &config), Some(Duration(33)));
    }

    #[test]
    fn step_reports_clamping() {
        let config = config();
        let mut stepper = FrameStepper::new();
        let _ = stepper.step(HostTime(0), &config);
        let step = stepper.step(HostTime(200), &config);
        assert!(step.clamped, "delta at the ceiling is clamped");
        assert_eq!(step.measured, Some(Duration(200)));
        assert_eq!(step.applied, Duration(16));
    }

    #[test]
    fn backwards_clock_is_zero_step() {
        let config = config();
        let mut stepper = FrameStepper::new();
        let _ = stepper.next_step(HostTime(100), &config);
        assert_eq!(stepper.next_step(HostTime(50), &config), Some(Duration::ZERO));
    }

    #[test]
    fn reset_forgets_previous_frame() {
        let config = config();
        let mut stepper = FrameStepper::new();
        let _ = stepper.next_step(HostTime(0), &config);
        stepper.reset();
        assert_eq!(stepper.next_step(HostTime(16), &config), None);
    }
}
