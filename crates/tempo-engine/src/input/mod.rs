//! Input subsystem.
//!
//! Public API is platform-agnostic. Surfaces translate raw platform input into
//! `InputEvent`s and hand them to an `InputRouter`, which marshals them onto
//! the animation thread through the scheduler's event queue.

mod router;
mod source;
mod types;

pub use router::InputRouter;
pub use source::{InputSource, NoInput};
pub use types::{InputEvent, InputKind, PointerClick};
