//! Frame scheduler.
//!
//! One mutex and one condition variable guard all clock state. The animation
//! thread blocks in frame advance or pause; any other thread may enqueue
//! callbacks, confirm the surface opened, request deadlines, stop, or cancel.

mod cancel;
mod config;
mod frame_scheduler;
mod state;

pub use cancel::CancelToken;
pub use config::{SchedulerConfig, DEFAULT_FPS, DEFAULT_LAG_WARNING_GRACE, DEFAULT_MAX_FPS};
pub use frame_scheduler::{FrameScheduler, FrameStatus};
pub use state::SchedulerStats;
