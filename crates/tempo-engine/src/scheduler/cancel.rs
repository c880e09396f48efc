use std::sync::Arc;

use super::state::Shared;

/// Cooperative cancellation for a scheduler's blocking waits.
///
/// Cancelling is sticky. The next blocking wait in frame advance or pause
/// (or the one already in progress) observes it, stops the scheduler as
/// `stop()` would, and returns `FrameStatus::Stopped`.
#[derive(Clone)]
pub struct CancelToken {
    pub(crate) shared: Arc<Shared>,
}

impl CancelToken {
    /// Requests cancellation and wakes every blocked wait.
    pub fn cancel(&self) {
        let mut st = self.shared.state.lock();
        st.cancel_requested = true;
        self.shared.wakeup.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.state.lock().cancel_requested
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
