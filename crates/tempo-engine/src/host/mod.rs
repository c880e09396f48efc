//! Animation host.
//!
//! Glue between the scheduler and an external display surface. The surface
//! decides what a frame looks like; the host decides when one is due.

mod animation_host;
mod surface;

pub use animation_host::AnimationHost;
pub use surface::{Surface, SurfaceLink};
