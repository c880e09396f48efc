use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::MutexGuard;

use crate::error::{Result, SchedulerError};
use crate::input::{InputSource, NoInput};
use crate::time::{frame_duration_ms, ms_to_duration, pace, Pace};

use super::cancel::CancelToken;
use super::config::{check_rate, clamp_fps, min_frame_interval_ms, SchedulerConfig};
use super::state::{SchedulerState, SchedulerStats, Shared};

/// Outcome of a blocking scheduler call.
#[must_use]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    /// Time to produce the next frame.
    Ready,
    /// The scheduler was stopped or the wait was cancelled.
    Stopped,
}

impl FrameStatus {
    pub fn is_ready(self) -> bool {
        self == FrameStatus::Ready
    }
}

/// Frame-pacing scheduler for one animation loop.
///
/// One logical animation thread calls [`wait_for_next_frame`] repeatedly and
/// draws after each `Ready`. Any thread may [`enqueue`] callbacks (they run on
/// the animation thread, in order, inside frame advance), confirm the surface
/// is [`signal_opened`], request event-driven deadlines, or [`stop`].
///
/// Share it between threads with an `Arc`.
///
/// ```rust,ignore
/// let scheduler = Arc::new(FrameScheduler::with_config("demo", config)?);
/// scheduler.signal_opened();
/// scheduler.start()?;
/// while scheduler.wait_for_next_frame()?.is_ready() {
///     draw(scheduler.time_since_start());
/// }
/// ```
///
/// [`wait_for_next_frame`]: Self::wait_for_next_frame
/// [`enqueue`]: Self::enqueue
/// [`signal_opened`]: Self::signal_opened
/// [`stop`]: Self::stop
pub struct FrameScheduler {
    name: String,
    shared: Arc<Shared>,
}

impl FrameScheduler {
    /// Creates an unstarted scheduler with the default configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shared: Arc::new(Shared::new()),
        }
    }

    /// Creates an unstarted scheduler and applies `config` through the setters.
    pub fn with_config(name: impl Into<String>, config: SchedulerConfig) -> Result<Self> {
        let scheduler = Self::new(name);
        scheduler.set_silent(config.silent);
        scheduler.set_max_fps(config.max_fps)?;
        scheduler.set_fps(config.fps)?;
        scheduler.set_lag_warning_grace(config.lag_warning_grace)?;
        Ok(scheduler)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.shared.state.lock()
    }

    // ── configuration ─────────────────────────────────────────────────────

    /// Sets the frame rate; `0` selects event-driven mode.
    pub fn set_fps(&self, fps: f64) -> Result<()> {
        let fps = check_rate("fps", fps)?;
        let mut st = self.lock();
        st.check_not_started()?;
        st.fps = fps;
        self.apply_fps_ceiling(&mut st);
        Ok(())
    }

    /// Sets the frame-rate ceiling; `0` removes it.
    pub fn set_max_fps(&self, max_fps: f64) -> Result<()> {
        let max_fps = check_rate("max fps", max_fps)?;
        let mut st = self.lock();
        st.check_not_started()?;
        st.max_fps = max_fps;
        self.apply_fps_ceiling(&mut st);
        Ok(())
    }

    /// Sets how long after start lag resets go unreported.
    pub fn set_lag_warning_grace(&self, grace: Duration) -> Result<()> {
        let mut st = self.lock();
        st.check_not_started()?;
        st.lag_warning_grace_ms = grace.as_secs_f64() * 1000.0;
        Ok(())
    }

    /// Silences lag and clamp diagnostics. Allowed at any time.
    pub fn set_silent(&self, silent: bool) {
        self.lock().silent = silent;
    }

    fn apply_fps_ceiling(&self, st: &mut SchedulerState) {
        if let Some(clamped) = clamp_fps(st.fps, st.max_fps) {
            if !st.silent {
                log::info!(
                    "{}: {} fps exceeds the {} fps ceiling; running at {} fps",
                    self.name,
                    st.fps,
                    st.max_fps,
                    clamped
                );
            }
            st.fps = clamped;
        }
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn fps(&self) -> f64 {
        self.lock().fps
    }

    pub fn max_fps(&self) -> f64 {
        self.lock().max_fps
    }

    pub fn silent(&self) -> bool {
        self.lock().silent
    }

    pub fn is_event_driven(&self) -> bool {
        self.lock().is_event_driven()
    }

    pub fn is_started(&self) -> bool {
        self.lock().started
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    pub fn is_opened(&self) -> bool {
        self.lock().opened
    }

    /// Number of the frame most recently requested (`-1` before the first).
    pub fn current_frame(&self) -> i64 {
        self.lock().current_frame
    }

    /// Animation time of the current frame, in milliseconds.
    ///
    /// Base time-dependent animation on this rather than the wall clock: it
    /// does not jump forward when the clock is reset after a stall or a pause.
    pub fn time_since_start(&self) -> f64 {
        self.lock().frame_elapsed_ms()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.lock().stats
    }

    /// Returns a token that cancels this scheduler's blocking waits.
    pub fn cancel_token(&self) -> CancelToken {
        CancelToken {
            shared: Arc::clone(&self.shared),
        }
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    /// Starts the animation clock. May be called only once.
    pub fn start(&self) -> Result<()> {
        let mut st = self.lock();
        st.check_not_started()?;
        st.started = true;
        st.running = true;
        st.clock.anchor_now();
        st.current_frame = -1;
        log::debug!(
            "{}: started ({})",
            self.name,
            if st.is_event_driven() {
                "event-driven".to_string()
            } else {
                format!("{} fps", st.fps)
            }
        );
        Ok(())
    }

    /// Stops the scheduler, discards queued callbacks and wakes every waiter.
    ///
    /// Fails before `start()` and on a scheduler that is already stopped.
    pub fn stop(&self) -> Result<()> {
        let mut st = self.lock();
        if !st.started {
            return Err(SchedulerError::NotStarted);
        }
        if !st.shut_down() {
            return Err(SchedulerError::AlreadyStopped);
        }
        log::debug!("{}: stopped at frame {}", self.name, st.current_frame);
        self.shared.wakeup.notify_all();
        Ok(())
    }

    /// Confirms the display surface can receive frames. Idempotent.
    pub fn signal_opened(&self) {
        let mut st = self.lock();
        if !st.opened {
            st.opened = true;
            log::debug!("{}: surface opened", self.name);
        }
        self.shared.wakeup.notify_all();
    }

    // ── producers ─────────────────────────────────────────────────────────

    /// Queues `event` to run on the animation thread during frame advance.
    ///
    /// Returns `false` (and drops the callback) once the scheduler is stopped.
    pub fn enqueue<F>(&self, event: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let mut st = self.lock();
        let queued = match st.events.as_mut() {
            Some(queue) => {
                queue.push_back(Box::new(event));
                true
            }
            None => false,
        };
        self.shared.wakeup.notify_all();
        queued
    }

    /// Asks for a frame no later than `deadline_ms` of animation time.
    ///
    /// Event-driven mode only. Outstanding requests coalesce to the earliest
    /// one; requests are floored so frames never come faster than `max_fps`.
    pub fn request_deadline(&self, deadline_ms: f64) -> Result<()> {
        let mut st = self.lock();
        if !st.is_event_driven() {
            return Err(SchedulerError::NotEventDriven { fps: st.fps });
        }
        let deadline = deadline_ms.max(st.min_next_deadline);
        if deadline < st.next_deadline {
            st.next_deadline = deadline;
            self.shared.wakeup.notify_all();
        }
        Ok(())
    }

    // ── frame advance ─────────────────────────────────────────────────────

    /// Runs queued callbacks and blocks until the next frame is due.
    pub fn wait_for_next_frame(&self) -> Result<FrameStatus> {
        self.wait_for_next_frame_with(&mut NoInput, false)
    }

    /// Like [`wait_for_next_frame`](Self::wait_for_next_frame), polling
    /// `input` on every pass of the wait loop.
    ///
    /// Calling this while another frame advance is in flight (including from
    /// a queued callback) fails with [`SchedulerError::Reentrant`].
    pub fn wait_for_next_frame_with<S>(&self, input: &mut S, want_pointer: bool) -> Result<FrameStatus>
    where
        S: InputSource + ?Sized,
    {
        {
            let mut st = self.lock();
            st.check_not_reentrant()?;
            st.in_frame_advance = true;
            st.current_frame += 1;
        }
        let _guard = FrameAdvanceGuard(&self.shared);
        Ok(self.advance(input, want_pointer))
    }

    fn advance<S>(&self, input: &mut S, want_pointer: bool) -> FrameStatus
    where
        S: InputSource + ?Sized,
    {
        let mut st = self.lock();
        let mut excused = false;

        loop {
            if !st.running {
                return FrameStatus::Stopped;
            }

            if let Some(event) = st.pop_event() {
                st.stats.events_run += 1;
                MutexGuard::unlocked(&mut st, event);
                continue;
            }

            // Polled unlocked: sources may enqueue as a side effect.
            if MutexGuard::unlocked(&mut st, || input.poll_for_pending_input(want_pointer)) {
                st.stats.excused_polls += 1;
                excused = true;
                continue;
            }
            if !st.running || st.has_pending_events() {
                continue;
            }

            if !st.opened {
                if !self.block(&mut st, None) {
                    return FrameStatus::Stopped;
                }
                st.clock.anchor_now();
                continue;
            }

            if st.is_event_driven() {
                let elapsed = st.clock.elapsed_at(st.clock.now_ms());
                if st.next_deadline == f64::INFINITY {
                    if !self.block(&mut st, None) {
                        return FrameStatus::Stopped;
                    }
                } else if st.next_deadline <= elapsed {
                    st.next_deadline = f64::INFINITY;
                    st.min_next_deadline = elapsed + min_frame_interval_ms(st.max_fps);
                    st.frame_time_ms = elapsed;
                    return FrameStatus::Ready;
                } else {
                    let timeout = ms_to_duration(st.next_deadline - elapsed);
                    if !self.block(&mut st, Some(timeout)) {
                        return FrameStatus::Stopped;
                    }
                }
                continue;
            }

            let frame_ms = frame_duration_ms(st.fps);
            let elapsed = st.current_frame as f64 * frame_ms;
            let now = st.clock.now_ms();
            match pace(st.clock.lag_at(elapsed, now), frame_ms, excused) {
                Pace::Reset { late_ms } => {
                    if !excused && !st.silent && elapsed >= st.lag_warning_grace_ms {
                        log::warn!(
                            "{}: animation fell behind by {} ms on frame {}; animation clock reset",
                            self.name,
                            late_ms,
                            st.current_frame
                        );
                        st.stats.lag_warnings += 1;
                    }
                    st.clock.rebase_at(elapsed, now);
                    st.stats.clock_resets += 1;
                    return FrameStatus::Ready;
                }
                Pace::Drop => {
                    log::trace!("{}: dropped frame {}", self.name, st.current_frame);
                    st.current_frame += 1;
                    st.stats.frames_dropped += 1;
                }
                Pace::Ready => return FrameStatus::Ready,
                Pace::Wait(timeout) => {
                    if !self.block(&mut st, Some(timeout)) {
                        return FrameStatus::Stopped;
                    }
                }
            }
        }
    }

    /// Waits on the condition variable, or not at all if cancellation is
    /// already pending.
    ///
    /// Returns `false` if the wait was cancelled; the scheduler is stopped by
    /// then.
    fn block(&self, st: &mut MutexGuard<'_, SchedulerState>, timeout: Option<Duration>) -> bool {
        if !st.cancel_requested {
            match timeout {
                Some(timeout) => {
                    let _ = self.shared.wakeup.wait_for(st, timeout);
                }
                None => self.shared.wakeup.wait(st),
            }
        }
        if st.cancel_requested {
            if st.shut_down() {
                log::debug!("{}: wait cancelled at frame {}; stopping", self.name, st.current_frame);
                self.shared.wakeup.notify_all();
            }
            return false;
        }
        true
    }

    // ── pause ─────────────────────────────────────────────────────────────

    /// Blocks for `millis` and then resets the animation clock so the pause
    /// does not count as lag.
    ///
    /// `0` resets the clock without waiting, which is useful after any long
    /// synchronous delay (waiting for user input, say). Negative values do
    /// nothing. Returns `Stopped` early if the scheduler stops meanwhile.
    pub fn pause(&self, millis: i64) -> Result<FrameStatus> {
        let mut st = self.lock();
        st.check_not_reentrant()?;
        if millis < 0 {
            return Ok(if st.running {
                FrameStatus::Ready
            } else {
                FrameStatus::Stopped
            });
        }

        let wanted = st.clock.now_ms() + millis as f64;
        loop {
            if !st.running {
                return Ok(FrameStatus::Stopped);
            }
            let remaining = wanted - st.clock.now_ms();
            if remaining <= 0.0 {
                break;
            }
            if !self.block(&mut st, Some(ms_to_duration(remaining))) {
                return Ok(FrameStatus::Stopped);
            }
        }

        let elapsed = st.frame_elapsed_ms();
        let now = st.clock.now_ms();
        st.clock.advance_at(elapsed, now);
        Ok(FrameStatus::Ready)
    }
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.lock();
        f.debug_struct("FrameScheduler")
            .field("name", &self.name)
            .field("running", &st.running)
            .field("fps", &st.fps)
            .field("current_frame", &st.current_frame)
            .finish()
    }
}

/// Clears the reentrancy flag when frame advance returns or unwinds.
struct FrameAdvanceGuard<'a>(&'a Shared);

impl Drop for FrameAdvanceGuard<'_> {
    fn drop(&mut self) {
        self.0.state.lock().in_frame_advance = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Instant;

    use parking_lot::Mutex;

    fn started(config: SchedulerConfig) -> Arc<FrameScheduler> {
        let s = Arc::new(FrameScheduler::with_config("test", config).unwrap());
        s.signal_opened();
        s.start().unwrap();
        s
    }

    fn quiet(fps: f64) -> SchedulerConfig {
        SchedulerConfig::default()
            .with_fps(fps)
            .with_lag_warning_grace(Duration::ZERO)
    }

    // ── configuration ─────────────────────────────────────────────────────

    #[test]
    fn negative_rates_are_rejected() {
        let s = FrameScheduler::new("cfg");
        assert!(matches!(s.set_fps(-1.0), Err(SchedulerError::InvalidArgument { .. })));
        assert!(matches!(s.set_max_fps(-0.5), Err(SchedulerError::InvalidArgument { .. })));
        assert_eq!(s.fps(), 30.0);
    }

    #[test]
    fn fps_is_clamped_to_max() {
        let s = FrameScheduler::new("cfg");
        s.set_max_fps(60.0).unwrap();
        s.set_fps(240.0).unwrap();
        assert_eq!(s.fps(), 60.0);

        s.set_max_fps(25.0).unwrap();
        assert_eq!(s.fps(), 25.0);
    }

    #[test]
    fn uncapped_max_does_not_clamp() {
        let s = FrameScheduler::new("cfg");
        s.set_max_fps(0.0).unwrap();
        s.set_fps(500.0).unwrap();
        assert_eq!(s.fps(), 500.0);
    }

    #[test]
    fn configuration_is_frozen_after_start() {
        let s = FrameScheduler::new("cfg");
        s.start().unwrap();
        assert_eq!(s.set_fps(10.0), Err(SchedulerError::AlreadyStarted));
        assert_eq!(s.set_max_fps(10.0), Err(SchedulerError::AlreadyStarted));
        assert_eq!(
            s.set_lag_warning_grace(Duration::ZERO),
            Err(SchedulerError::AlreadyStarted)
        );
        s.set_silent(true);
        assert!(s.silent());
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn lifecycle_transitions() {
        let s = FrameScheduler::new("life");
        assert!(!s.is_running());
        assert_eq!(s.stop(), Err(SchedulerError::NotStarted));

        s.start().unwrap();
        assert!(s.is_started() && s.is_running());
        assert_eq!(s.start(), Err(SchedulerError::AlreadyStarted));

        s.stop().unwrap();
        assert!(s.is_started() && !s.is_running());
        assert_eq!(s.stop(), Err(SchedulerError::AlreadyStopped));
        assert_eq!(s.wait_for_next_frame(), Ok(FrameStatus::Stopped));
    }

    #[test]
    fn advance_before_start_reports_stopped() {
        let s = FrameScheduler::new("idle");
        assert_eq!(s.wait_for_next_frame(), Ok(FrameStatus::Stopped));
    }

    #[test]
    fn enqueue_after_stop_is_dropped() {
        let s = started(quiet(50.0));
        s.stop().unwrap();
        assert!(!s.enqueue(|| panic!("must not run")));
    }

    // ── constant-rate pacing ──────────────────────────────────────────────

    #[test]
    fn frames_arrive_at_the_requested_rate() {
        let s = started(quiet(50.0));
        let t0 = Instant::now();
        for _ in 0..10 {
            assert_eq!(s.wait_for_next_frame(), Ok(FrameStatus::Ready));
        }
        let elapsed = t0.elapsed();
        // Frames 0..=9 at 20 ms each: frame 9 is due 180 ms after start.
        assert!(elapsed >= Duration::from_millis(160), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(400), "{elapsed:?}");
        assert_eq!(s.current_frame(), 9);
        assert_eq!(s.time_since_start(), 180.0);
        assert_eq!(s.stats().frames_dropped, 0);
    }

    #[test]
    fn a_short_stall_drops_one_frame() {
        let s = started(quiet(20.0));
        assert!(s.wait_for_next_frame().unwrap().is_ready());
        assert_eq!(s.current_frame(), 0);

        thread::sleep(Duration::from_millis(125));
        let t0 = Instant::now();
        assert!(s.wait_for_next_frame().unwrap().is_ready());
        assert!(t0.elapsed() < Duration::from_millis(20));

        assert_eq!(s.current_frame(), 2);
        let stats = s.stats();
        assert_eq!(stats.frames_dropped, 1);
        assert_eq!(stats.clock_resets, 0);
        assert_eq!(stats.lag_warnings, 0);
    }

    #[test]
    fn a_long_stall_resets_the_clock() {
        let s = started(quiet(20.0));
        assert!(s.wait_for_next_frame().unwrap().is_ready());

        thread::sleep(Duration::from_millis(300));
        let t0 = Instant::now();
        assert!(s.wait_for_next_frame().unwrap().is_ready());
        assert!(t0.elapsed() < Duration::from_millis(20));

        let stats = s.stats();
        assert_eq!(stats.clock_resets, 1);
        assert_eq!(stats.lag_warnings, 1);
        assert_eq!(stats.frames_dropped, 0);
        assert_eq!(s.current_frame(), 1);
        assert_eq!(s.time_since_start(), 50.0);

        // The next frame is paced from the reset point, not from the stall.
        let t1 = Instant::now();
        assert!(s.wait_for_next_frame().unwrap().is_ready());
        assert!(t1.elapsed() >= Duration::from_millis(30), "{:?}", t1.elapsed());
        assert_eq!(s.time_since_start(), 100.0);
    }

    #[test]
    fn silent_resets_are_not_reported() {
        let s = started(quiet(20.0).with_silent(true));
        assert!(s.wait_for_next_frame().unwrap().is_ready());
        thread::sleep(Duration::from_millis(300));
        assert!(s.wait_for_next_frame().unwrap().is_ready());
        assert_eq!(s.stats().clock_resets, 1);
        assert_eq!(s.stats().lag_warnings, 0);
    }

    #[test]
    fn resets_inside_the_grace_window_are_not_reported() {
        let s = started(SchedulerConfig::default().with_fps(20.0));
        assert!(s.wait_for_next_frame().unwrap().is_ready());
        thread::sleep(Duration::from_millis(300));
        assert!(s.wait_for_next_frame().unwrap().is_ready());
        assert_eq!(s.stats().clock_resets, 1);
        assert_eq!(s.stats().lag_warnings, 0);
    }

    #[test]
    fn excused_input_resets_without_a_warning() {
        let s = started(quiet(20.0));
        assert!(s.wait_for_next_frame().unwrap().is_ready());
        thread::sleep(Duration::from_millis(125));

        let mut polls = 0;
        let mut source = |_: bool| {
            polls += 1;
            polls == 1
        };
        assert!(s.wait_for_next_frame_with(&mut source, false).unwrap().is_ready());

        let stats = s.stats();
        assert_eq!(stats.excused_polls, 1);
        assert_eq!(stats.clock_resets, 1);
        assert_eq!(stats.lag_warnings, 0);
        assert_eq!(stats.frames_dropped, 0);
        assert_eq!(s.current_frame(), 1);
    }

    #[test]
    fn first_frame_waits_for_the_surface() {
        let s = Arc::new(FrameScheduler::with_config("open", quiet(50.0)).unwrap());
        s.start().unwrap();

        let opener = {
            let s = Arc::clone(&s);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(100));
                s.signal_opened();
            })
        };
        let t0 = Instant::now();
        assert!(s.wait_for_next_frame().unwrap().is_ready());
        assert!(t0.elapsed() >= Duration::from_millis(90));
        assert!(s.is_opened());
        // The clock was anchored when the surface opened, so no lag.
        assert_eq!(s.stats().clock_resets, 0);
        opener.join().unwrap();
    }

    // ── events ────────────────────────────────────────────────────────────

    #[test]
    fn events_run_in_order_before_the_frame() {
        let s = started(quiet(50.0));
        let log = Arc::new(Mutex::new(Vec::new()));

        let producer = {
            let s = Arc::clone(&s);
            let log = Arc::clone(&log);
            thread::spawn(move || {
                for name in ["A", "B", "C"] {
                    let log = Arc::clone(&log);
                    assert!(s.enqueue(move || {
                        log.lock().push(format!("{name} start"));
                        thread::sleep(Duration::from_millis(5));
                        log.lock().push(format!("{name} end"));
                    }));
                }
            })
        };
        producer.join().unwrap();

        assert!(s.wait_for_next_frame().unwrap().is_ready());
        assert_eq!(
            *log.lock(),
            ["A start", "A end", "B start", "B end", "C start", "C end"]
        );
        assert_eq!(s.stats().events_run, 3);
    }

    #[test]
    fn enqueue_wakes_a_blocked_advance() {
        let s = started(quiet(1.0));
        assert!(s.wait_for_next_frame().unwrap().is_ready());

        let (tx, rx) = mpsc::channel();
        let consumer = {
            let s = Arc::clone(&s);
            thread::spawn(move || s.wait_for_next_frame())
        };
        thread::sleep(Duration::from_millis(50));
        s.enqueue(move || tx.send(()).unwrap());
        assert!(rx.recv_timeout(Duration::from_millis(500)).is_ok());

        s.stop().unwrap();
        assert_eq!(consumer.join().unwrap(), Ok(FrameStatus::Stopped));
    }

    #[test]
    fn frame_advance_from_a_callback_is_rejected() {
        let s = started(quiet(50.0));
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&s);
        s.enqueue(move || {
            tx.send((inner.wait_for_next_frame(), inner.pause(0))).unwrap();
        });

        assert!(s.wait_for_next_frame().unwrap().is_ready());
        let (advance, pause) = rx.recv().unwrap();
        assert_eq!(advance, Err(SchedulerError::Reentrant));
        assert_eq!(pause, Err(SchedulerError::Reentrant));

        // The guard is released once the outer call returns.
        assert!(s.wait_for_next_frame().unwrap().is_ready());
    }

    #[test]
    fn input_source_may_enqueue() {
        let s = started(quiet(50.0));
        let ran = Arc::new(AtomicUsize::new(0));
        let mut fed = false;
        let mut source = {
            let s = Arc::clone(&s);
            let ran = Arc::clone(&ran);
            move |want_pointer: bool| {
                assert!(want_pointer);
                if !fed {
                    fed = true;
                    let ran = Arc::clone(&ran);
                    s.enqueue(move || {
                        ran.fetch_add(1, Ordering::SeqCst);
                    });
                }
                false
            }
        };
        assert!(s.wait_for_next_frame_with(&mut source, true).unwrap().is_ready());
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert_eq!(s.stats().excused_polls, 0);
    }

    // ── stop and cancel ───────────────────────────────────────────────────

    #[test]
    fn stop_wakes_all_waiters() {
        let s = started(quiet(0.5));
        assert!(s.wait_for_next_frame().unwrap().is_ready());

        let pauser = {
            let s = Arc::clone(&s);
            thread::spawn(move || s.pause(60_000))
        };
        thread::sleep(Duration::from_millis(30));
        let advancer = {
            let s = Arc::clone(&s);
            thread::spawn(move || s.wait_for_next_frame())
        };
        thread::sleep(Duration::from_millis(50));

        let t0 = Instant::now();
        s.stop().unwrap();
        assert_eq!(advancer.join().unwrap(), Ok(FrameStatus::Stopped));
        assert_eq!(pauser.join().unwrap(), Ok(FrameStatus::Stopped));
        assert!(t0.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn cancelling_a_wait_stops_the_scheduler() {
        let s = started(quiet(0.5));
        assert!(s.wait_for_next_frame().unwrap().is_ready());

        let token = s.cancel_token();
        let advancer = {
            let s = Arc::clone(&s);
            thread::spawn(move || s.wait_for_next_frame())
        };
        thread::sleep(Duration::from_millis(50));
        token.cancel();

        assert_eq!(advancer.join().unwrap(), Ok(FrameStatus::Stopped));
        assert!(token.is_cancelled());
        assert!(!s.is_running());
        assert!(!s.enqueue(|| {}));
    }

    #[test]
    fn cancel_before_waiting_is_observed() {
        let s = started(quiet(0.5));
        s.cancel_token().cancel();
        assert_eq!(s.pause(10_000), Ok(FrameStatus::Stopped));
        assert!(!s.is_running());
    }

    // ── pause ─────────────────────────────────────────────────────────────

    #[test]
    fn pause_is_not_counted_as_lag() {
        let s = started(quiet(20.0));
        assert!(s.wait_for_next_frame().unwrap().is_ready());

        let t0 = Instant::now();
        assert_eq!(s.pause(300), Ok(FrameStatus::Ready));
        assert!(t0.elapsed() >= Duration::from_millis(300));

        assert!(s.wait_for_next_frame().unwrap().is_ready());
        let stats = s.stats();
        assert_eq!(stats.clock_resets, 0);
        assert_eq!(stats.frames_dropped, 0);
        assert_eq!(s.current_frame(), 1);
    }

    #[test]
    fn repeated_zero_pauses_never_rewind_the_clock() {
        let s = started(quiet(20.0));
        assert!(s.wait_for_next_frame().unwrap().is_ready());

        let mut last = s.shared.state.lock().clock.epoch_ms();
        for _ in 0..5 {
            assert_eq!(s.pause(0), Ok(FrameStatus::Ready));
            let epoch = s.shared.state.lock().clock.epoch_ms();
            assert!(epoch >= last);
            last = epoch;
        }
        assert!(s.wait_for_next_frame().unwrap().is_ready());
        assert_eq!(s.stats().clock_resets, 0);
        assert_eq!(s.stats().frames_dropped, 0);
    }

    #[test]
    fn negative_pause_is_a_no_op() {
        let s = started(quiet(20.0));
        let epoch = s.shared.state.lock().clock.epoch_ms();
        assert_eq!(s.pause(-5), Ok(FrameStatus::Ready));
        assert_eq!(s.shared.state.lock().clock.epoch_ms(), epoch);
    }

    // ── event-driven mode ─────────────────────────────────────────────────

    #[test]
    fn deadlines_need_event_driven_mode() {
        let s = FrameScheduler::new("rate");
        assert_eq!(
            s.request_deadline(10.0),
            Err(SchedulerError::NotEventDriven { fps: 30.0 })
        );
    }

    #[test]
    fn concurrent_deadlines_coalesce_to_the_earliest() {
        let s = started(quiet(0.0).with_max_fps(10.0));
        assert!(s.is_event_driven());

        let a = {
            let s = Arc::clone(&s);
            thread::spawn(move || s.request_deadline(200.0))
        };
        let b = {
            let s = Arc::clone(&s);
            thread::spawn(move || s.request_deadline(50.0))
        };
        a.join().unwrap().unwrap();
        b.join().unwrap().unwrap();

        assert!(s.wait_for_next_frame().unwrap().is_ready());
        let first = s.time_since_start();
        assert!((50.0..150.0).contains(&first), "{first}");

        // An immediate request is floored to one max-fps interval later.
        s.request_deadline(0.0).unwrap();
        assert!(s.wait_for_next_frame().unwrap().is_ready());
        let second = s.time_since_start();
        assert!(second - first >= 100.0, "{first} -> {second}");
    }

    #[test]
    fn event_driven_advance_blocks_until_requested() {
        let s = started(quiet(0.0));
        let advancer = {
            let s = Arc::clone(&s);
            thread::spawn(move || {
                let status = s.wait_for_next_frame();
                (status, s.time_since_start())
            })
        };
        thread::sleep(Duration::from_millis(100));
        assert!(!advancer.is_finished());

        s.request_deadline(0.0).unwrap();
        let (status, at) = advancer.join().unwrap();
        assert_eq!(status, Ok(FrameStatus::Ready));
        assert!(at >= 90.0, "{at}");
    }

    #[test]
    fn event_driven_pause_keeps_animation_time() {
        let s = started(quiet(0.0));
        s.request_deadline(0.0).unwrap();
        assert!(s.wait_for_next_frame().unwrap().is_ready());
        let before = s.time_since_start();

        assert_eq!(s.pause(200), Ok(FrameStatus::Ready));
        s.request_deadline(before + 10.0).unwrap();
        assert!(s.wait_for_next_frame().unwrap().is_ready());
        let after = s.time_since_start();
        assert!(after - before < 150.0, "{before} -> {after}");
    }
}
