//! Tempo engine crate.
//!
//! Frame pacing for interactive animation loops: a scheduler that decides when
//! the next frame is due, drains deferred input callbacks on the animation
//! thread, and copes with the program falling behind.

pub mod error;
pub mod host;
pub mod input;
pub mod logging;
pub mod scheduler;
pub mod time;

pub use error::{Result, SchedulerError};
pub use host::{AnimationHost, Surface, SurfaceLink};
pub use input::{InputEvent, InputRouter, InputSource, NoInput, PointerClick};
pub use scheduler::{CancelToken, FrameScheduler, FrameStatus, SchedulerConfig, SchedulerStats};
