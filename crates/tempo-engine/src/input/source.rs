/// Something the scheduler polls for unsolicited input on every pass of its
/// wait loop.
///
/// Implementations must not block. They may translate raw input into queued
/// callbacks (through `FrameScheduler::enqueue`) before returning. Returning
/// `true` means time was just spent handling input, which excuses a frame
/// slip that would otherwise be reported as lag.
pub trait InputSource {
    fn poll_for_pending_input(&mut self, want_pointer_events: bool) -> bool;
}

/// An input source that never has anything to report.
#[derive(Debug, Copy, Clone, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll_for_pending_input(&mut self, _want_pointer_events: bool) -> bool {
        false
    }
}

impl<F> InputSource for F
where
    F: FnMut(bool) -> bool,
{
    fn poll_for_pending_input(&mut self, want_pointer_events: bool) -> bool {
        self(want_pointer_events)
    }
}
