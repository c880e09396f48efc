use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

use crate::error::{Result, SchedulerError};
use crate::time::{frame_duration_ms, AnimationClock};

use super::config::{DEFAULT_FPS, DEFAULT_LAG_WARNING_GRACE, DEFAULT_MAX_FPS};

/// A deferred callback, run on the animation thread during frame advance.
pub(crate) type Event = Box<dyn FnOnce() + Send + 'static>;

/// Counters describing how the scheduler has coped with its workload.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct SchedulerStats {
    /// Frames skipped without being produced (within the drop tolerance).
    pub frames_dropped: u64,

    /// Times the animation clock was re-anchored because of excessive lag.
    pub clock_resets: u64,

    /// Clock resets that were reported through the log.
    pub lag_warnings: u64,

    /// Queued callbacks executed.
    pub events_run: u64,

    /// Wait-loop passes excused by the input source.
    pub excused_polls: u64,
}

/// Everything guarded by the scheduler mutex.
pub(crate) struct SchedulerState {
    pub started: bool,
    pub running: bool,
    pub opened: bool,

    pub fps: f64,
    pub max_fps: f64,
    pub silent: bool,
    pub lag_warning_grace_ms: f64,

    pub clock: AnimationClock,
    pub current_frame: i64,

    /// `None` once stopped; late enqueues are dropped.
    pub events: Option<VecDeque<Event>>,

    pub in_frame_advance: bool,
    pub cancel_requested: bool,

    // Event-driven mode.
    pub next_deadline: f64,
    pub min_next_deadline: f64,
    pub frame_time_ms: f64,

    pub stats: SchedulerStats,
}

impl SchedulerState {
    pub fn new() -> Self {
        Self {
            started: false,
            running: false,
            opened: false,
            fps: DEFAULT_FPS,
            max_fps: DEFAULT_MAX_FPS,
            silent: false,
            lag_warning_grace_ms: DEFAULT_LAG_WARNING_GRACE.as_secs_f64() * 1000.0,
            clock: AnimationClock::new(),
            current_frame: -1,
            events: Some(VecDeque::new()),
            in_frame_advance: false,
            cancel_requested: false,
            next_deadline: f64::INFINITY,
            min_next_deadline: f64::NEG_INFINITY,
            frame_time_ms: 0.0,
            stats: SchedulerStats::default(),
        }
    }

    pub fn is_event_driven(&self) -> bool {
        self.fps == 0.0
    }

    pub fn check_not_started(&self) -> Result<()> {
        if self.started {
            Err(SchedulerError::AlreadyStarted)
        } else {
            Ok(())
        }
    }

    pub fn check_not_reentrant(&self) -> Result<()> {
        if self.in_frame_advance {
            Err(SchedulerError::Reentrant)
        } else {
            Ok(())
        }
    }

    pub fn has_pending_events(&self) -> bool {
        self.events.as_ref().is_some_and(|q| !q.is_empty())
    }

    pub fn pop_event(&mut self) -> Option<Event> {
        self.events.as_mut().and_then(VecDeque::pop_front)
    }

    /// Animation time of the current frame, in milliseconds.
    ///
    /// Constant-rate time is derived from the frame counter, so it freezes
    /// across clock resets and pauses. Event-driven time is the elapsed time
    /// recorded when the current frame became ready.
    pub fn frame_elapsed_ms(&self) -> f64 {
        if self.is_event_driven() {
            self.frame_time_ms
        } else {
            self.current_frame.max(0) as f64 * frame_duration_ms(self.fps)
        }
    }

    /// Marks the scheduler stopped and discards the queue.
    ///
    /// Returns `false` if it was already stopped.
    pub fn shut_down(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        self.events = None;
        was_running
    }
}

/// State shared between the scheduler and its cancel tokens.
pub(crate) struct Shared {
    pub state: Mutex<SchedulerState>,
    pub wakeup: Condvar,
}

impl Shared {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SchedulerState::new()),
            wakeup: Condvar::new(),
        }
    }
}
