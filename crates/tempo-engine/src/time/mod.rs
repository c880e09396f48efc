//! Time subsystem.
//!
//! Pure animation-clock arithmetic, free of locking so it can be tested
//! without sleeping:
//! - `AnimationClock` anchors frame 0 against the monotonic clock
//! - `pace()` turns a measured lag into a wait/drop/reset decision

mod clock;

pub use clock::{frame_duration_ms, ms_to_duration, pace, AnimationClock, Pace, MAX_DROPPED_FRAMES};
