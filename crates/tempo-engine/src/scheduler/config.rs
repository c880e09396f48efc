use std::time::Duration;

use crate::error::{Result, SchedulerError};

/// Default number of frames per second.
pub const DEFAULT_FPS: f64 = 30.0;

/// Default frame-rate ceiling, also the rate limit for event-driven deadlines.
pub const DEFAULT_MAX_FPS: f64 = 120.0;

/// Default window after start during which lag warnings stay quiet.
pub const DEFAULT_LAG_WARNING_GRACE: Duration = Duration::from_secs(2);

/// Scheduler configuration.
///
/// `fps == 0` selects event-driven mode. `max_fps == 0` disables the ceiling.
/// `lag_warning_grace` is measured in animation time: a clock reset on a
/// frame earlier than this is still performed but not reported, which keeps
/// start-up (a window still mapping, shaders compiling) from being noisy.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub fps: f64,
    pub max_fps: f64,
    pub silent: bool,
    pub lag_warning_grace: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            max_fps: DEFAULT_MAX_FPS,
            silent: false,
            lag_warning_grace: DEFAULT_LAG_WARNING_GRACE,
        }
    }
}

impl SchedulerConfig {
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    /// Shorthand for `with_fps(0.0)`.
    pub fn event_driven(self) -> Self {
        self.with_fps(0.0)
    }

    pub fn with_max_fps(mut self, max_fps: f64) -> Self {
        self.max_fps = max_fps;
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn with_lag_warning_grace(mut self, grace: Duration) -> Self {
        self.lag_warning_grace = grace;
        self
    }
}

/// Rejects negative, NaN and infinite rates.
pub(crate) fn check_rate(what: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SchedulerError::InvalidArgument { what, value })
    }
}

/// Returns the clamped rate when `fps` exceeds an enabled ceiling.
pub(crate) fn clamp_fps(fps: f64, max_fps: f64) -> Option<f64> {
    (max_fps > 0.0 && fps > max_fps).then_some(max_fps)
}

/// Minimum spacing between event-driven frames, in milliseconds.
pub(crate) fn min_frame_interval_ms(max_fps: f64) -> f64 {
    if max_fps > 0.0 { 1000.0 / max_fps } else { 0.0 }
}
