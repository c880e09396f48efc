use std::time::{Duration, Instant};

/// Number of frames the scheduler will silently drop before it gives up and
/// resets the animation clock.
pub const MAX_DROPPED_FRAMES: f64 = 4.0;

/// Converts a frame rate into a frame duration in milliseconds.
///
/// `fps` must be positive; event-driven mode (`fps == 0`) has no frame duration.
#[inline]
pub fn frame_duration_ms(fps: f64) -> f64 {
    debug_assert!(fps > 0.0);
    1000.0 / fps
}

/// Converts a non-negative millisecond count into a `Duration`.
///
/// Negative and non-finite inputs saturate to zero and `Duration::MAX`.
pub fn ms_to_duration(ms: f64) -> Duration {
    if ms.is_nan() || ms <= 0.0 {
        Duration::ZERO
    } else if ms.is_infinite() {
        Duration::MAX
    } else {
        Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)
    }
}

/// Decision for one pass of the constant-rate wait loop.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Pace {
    /// On time, or late by less than one frame: present now.
    Ready,

    /// Ahead of schedule: block for this long, then re-evaluate.
    Wait(Duration),

    /// Behind by more than a frame but inside the tolerance: skip this frame.
    Drop,

    /// Too far behind: re-anchor the clock and present now.
    ///
    /// `late_ms` is how far past its slot the frame is, rounded up.
    Reset { late_ms: f64 },
}

/// Classifies `lag_ms` (nominal time minus wall time; negative is late).
///
/// An excused frame resets after a single frame of lag instead of four.
pub fn pace(lag_ms: f64, frame_ms: f64, excused: bool) -> Pace {
    if lag_ms < -MAX_DROPPED_FRAMES * frame_ms || (excused && lag_ms < -frame_ms) {
        Pace::Reset {
            late_ms: (-frame_ms - lag_ms).ceil(),
        }
    } else if lag_ms < -frame_ms {
        Pace::Drop
    } else if lag_ms <= 0.0 {
        Pace::Ready
    } else {
        Pace::Wait(ms_to_duration(lag_ms))
    }
}

/// Anchor of the animation timeline against the monotonic wall clock.
///
/// All values are milliseconds relative to `origin`, which keeps the
/// arithmetic signed: the anchor may legitimately sit before the process
/// started counting (after a rebase far into a long animation, for example).
#[derive(Debug, Clone)]
pub struct AnimationClock {
    origin: Instant,
    epoch_ms: f64,
}

impl AnimationClock {
    /// Creates a clock anchored at the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            epoch_ms: 0.0,
        }
    }

    /// Milliseconds since this clock was created.
    pub fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    /// The anchor of frame 0, in clock milliseconds.
    pub fn epoch_ms(&self) -> f64 {
        self.epoch_ms
    }

    /// Wall time elapsed since the anchor at `now_ms`.
    pub fn elapsed_at(&self, now_ms: f64) -> f64 {
        now_ms - self.epoch_ms
    }

    /// Nominal time of a frame `elapsed_ms` into the animation, minus `now_ms`.
    pub fn lag_at(&self, elapsed_ms: f64, now_ms: f64) -> f64 {
        self.epoch_ms + elapsed_ms - now_ms
    }

    /// Anchors frame 0 at `now_ms`.
    pub fn anchor_at(&mut self, now_ms: f64) {
        self.epoch_ms = now_ms;
    }

    /// Anchors frame 0 at the current instant.
    pub fn anchor_now(&mut self) {
        self.anchor_at(self.now_ms());
    }

    /// Moves the anchor so that `elapsed_ms` is exactly on time at `now_ms`.
    pub fn rebase_at(&mut self, elapsed_ms: f64, now_ms: f64) {
        self.epoch_ms = now_ms - elapsed_ms;
    }

    /// Like [`rebase_at`](Self::rebase_at), but never moves the anchor back.
    ///
    /// Returns `true` if the anchor moved.
    pub fn advance_at(&mut self, elapsed_ms: f64, now_ms: f64) -> bool {
        let candidate = now_ms - elapsed_ms;
        if candidate > self.epoch_ms {
            self.epoch_ms = candidate;
            true
        } else {
            false
        }
    }
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new()
    }
}
