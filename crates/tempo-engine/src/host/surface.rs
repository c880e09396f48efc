use std::sync::Arc;

use crate::input::{InputEvent, InputRouter, InputSource};
use crate::scheduler::FrameScheduler;

/// A display surface driven by an [`AnimationHost`](super::AnimationHost).
///
/// The surface owns whatever window, terminal or canvas frames end up on; the
/// host only tells it when to start and close, and polls it for input on the
/// animation thread (hence the `InputSource` supertrait). Surfaces that
/// receive input on their own thread report it through the [`SurfaceLink`]
/// instead and can return `false` from the poll.
pub trait Surface: InputSource {
    /// Opens the surface. Call `link.signal_opened()` once it can show frames,
    /// from any thread, now or later.
    fn start(&mut self, link: SurfaceLink) -> anyhow::Result<()>;

    /// Closes the surface and frees its resources. May be called once after
    /// a successful `start`.
    fn close(&mut self);
}

/// The handle a surface uses to talk back to its host.
#[derive(Clone, Debug)]
pub struct SurfaceLink {
    pub(crate) scheduler: Arc<FrameScheduler>,
    pub(crate) router: InputRouter,
}

impl SurfaceLink {
    /// Confirms the surface is ready; releases the first frame.
    pub fn signal_opened(&self) {
        self.scheduler.signal_opened();
    }

    /// Routes input to the registered handler; see [`InputRouter::dispatch`].
    pub fn dispatch(&self, event: InputEvent) -> bool {
        self.router.dispatch(event)
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// The router's view of whether pointer input is wanted at all.
    pub fn wants_pointer(&self) -> bool {
        self.router.wants_pointer()
    }
}
