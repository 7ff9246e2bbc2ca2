// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable configuration snapshot.
//!
//! The owner of the configuration builds a new [`Config`] whenever a setting
//! changes and passes it, together with
//! [`Frame::config_changed`](crate::layer::Frame::config_changed), into the
//! next frame call. Layout changes therefore take effect at a frame boundary,
//! never in the middle of a frame.

use crate::time::Duration;

/// Frame stepper settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepperConfig {
    /// Step applied when the measured frame delta is not usable.
    pub nominal_step: Duration,
    /// Largest wall-clock delta accepted as a real frame interval. Anything
    /// at or above this (app pause, debugger, backgrounding) is replaced by
    /// [`nominal_step`](Self::nominal_step).
    pub high_refresh_ceiling: Duration,
}

impl StepperConfig {
    /// Defaults: 16 ms nominal step, 100 ms ceiling.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nominal_step: Duration(16),
            high_refresh_ceiling: Duration(100),
        }
    }
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-track packing and lifetime settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackConfig {
    /// Visible duration after which a resident item is evicted.
    pub lifetime: Duration,
    /// Free gaps not longer than this are not tracked as usable space.
    pub min_gap: f64,
}

impl TrackConfig {
    /// Defaults: 4 s lifetime, 30 px minimum gap.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lifetime: Duration(4000),
            min_gap: 30.0,
        }
    }
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Geometry and buffering for a bottom-anchored
/// [`StackLayer`](crate::layer::StackLayer).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StackConfig {
    /// Number of tracks.
    pub line_count: usize,
    /// Height of each track.
    pub line_height: f64,
    /// Vertical gap between adjacent tracks.
    pub line_margin: f64,
    /// Gap between the bottom-most track and the bottom edge of the surface.
    pub margin_bottom: f64,
    /// Maximum number of items waiting for admission.
    pub buffer_size: usize,
    /// How far behind the play position a buffered item may fall before it
    /// is discarded.
    pub buffer_max_age: Duration,
}

impl StackConfig {
    /// Bottom-centered captions: two lines, 54 px high, 18 px apart.
    #[must_use]
    pub const fn bottom() -> Self {
        Self {
            line_count: 2,
            line_height: 54.0,
            line_margin: 18.0,
            margin_bottom: 18.0,
            buffer_size: 20,
            buffer_max_age: Duration(500),
        }
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        Self::bottom()
    }
}

/// Full engine configuration, read at the start of every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Frame stepper settings.
    pub stepper: StepperConfig,
    /// Track packing and lifetime settings.
    pub track: TrackConfig,
    /// Stack layer geometry and buffering.
    pub stack: StackConfig,
}

impl Config {
    /// Default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stepper: StepperConfig::new(),
            track: TrackConfig::new(),
            stack: StackConfig::bottom(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_consistent() {
        let config = Config::default();
        assert_eq!(config, Config::new());
        assert!(
            config.stepper.nominal_step < config.stepper.high_refresh_ceiling,
            "nominal step must be a plausible frame interval"
        );
        assert_eq!(config.stack.line_count, 2);
        assert_eq!(config.track.lifetime, Duration(4000));
    }

    #[test]
    fn snapshot_is_copy() {
        let mut a = Config::new();
        let b = a;
        a.stack.line_count = 5;
        assert_eq!(b.stack.line_count, 2, "snapshots are independent");
    }
}
