use std::sync::Arc;

use anyhow::Context;

use crate::error::{Result, SchedulerError};
use crate::input::{InputRouter, PointerClick};
use crate::scheduler::{FrameScheduler, FrameStatus, SchedulerConfig};

use super::surface::{Surface, SurfaceLink};

/// Binds one scheduler, one surface and one input router.
///
/// The host is owned by the animation thread. Other threads reach the
/// scheduler through [`scheduler`](Self::scheduler) or the surface's
/// [`SurfaceLink`].
pub struct AnimationHost<S: Surface> {
    scheduler: Arc<FrameScheduler>,
    router: InputRouter,
    surface: S,
    surface_open: bool,
}

impl<S: Surface> AnimationHost<S> {
    pub fn new(name: impl Into<String>, surface: S) -> Self {
        Self::from_scheduler(FrameScheduler::new(name), surface)
    }

    pub fn with_config(name: impl Into<String>, config: SchedulerConfig, surface: S) -> Result<Self> {
        Ok(Self::from_scheduler(FrameScheduler::with_config(name, config)?, surface))
    }

    fn from_scheduler(scheduler: FrameScheduler, surface: S) -> Self {
        let scheduler = Arc::new(scheduler);
        let router = InputRouter::new(Arc::clone(&scheduler));
        Self {
            scheduler,
            router,
            surface,
            surface_open: false,
        }
    }

    // ── configuration ─────────────────────────────────────────────────────

    pub fn set_fps(&self, fps: f64) -> Result<()> {
        self.scheduler.set_fps(fps)
    }

    pub fn set_max_fps(&self, max_fps: f64) -> Result<()> {
        self.scheduler.set_max_fps(max_fps)
    }

    pub fn set_silent(&self, silent: bool) {
        self.scheduler.set_silent(silent);
    }

    /// Registers the handler for typed keys. Before `start()`, once.
    pub fn set_key_handler<F>(&self, handler: F) -> Result<()>
    where
        F: FnMut(char) + Send + 'static,
    {
        self.router.set_key_handler(handler)
    }

    /// Registers the handler for pointer clicks. Before `start()`, once.
    pub fn set_pointer_handler<F>(&self, handler: F) -> Result<()>
    where
        F: FnMut(PointerClick) + Send + 'static,
    {
        self.router.set_pointer_handler(handler)
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn scheduler(&self) -> &Arc<FrameScheduler> {
        &self.scheduler
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn link(&self) -> SurfaceLink {
        SurfaceLink {
            scheduler: Arc::clone(&self.scheduler),
            router: self.router.clone(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn time_since_start(&self) -> f64 {
        self.scheduler.time_since_start()
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    /// Starts the scheduler, then the surface.
    ///
    /// If the surface fails to start the scheduler is stopped again.
    pub fn start(&mut self) -> anyhow::Result<()> {
        self.scheduler
            .start()
            .with_context(|| format!("failed to start '{}'", self.scheduler.name()))?;

        if let Err(err) = self.surface.start(self.link()) {
            if let Err(stop_err) = self.scheduler.stop() {
                log::debug!("{}: stop after failed surface start: {stop_err}", self.scheduler.name());
            }
            return Err(err.context(format!(
                "failed to start surface for '{}'",
                self.scheduler.name()
            )));
        }
        self.surface_open = true;
        Ok(())
    }

    /// Stops the scheduler and closes the surface.
    ///
    /// A scheduler that already stopped (through a cancel token, say) is not
    /// an error here; the surface is still closed.
    pub fn stop(&mut self) -> Result<()> {
        match self.scheduler.stop() {
            Ok(()) | Err(SchedulerError::AlreadyStopped) => {}
            Err(err) => return Err(err),
        }
        if self.surface_open {
            self.surface_open = false;
            self.surface.close();
        }
        Ok(())
    }

    // ── frames ────────────────────────────────────────────────────────────

    /// Runs queued input handlers and waits for the next frame, polling the
    /// surface for input while waiting.
    pub fn wait_for_next_frame(&mut self) -> Result<FrameStatus> {
        let want_pointer = self.router.wants_pointer();
        self.scheduler
            .wait_for_next_frame_with(&mut self.surface, want_pointer)
    }

    /// Event-driven mode: asks for a frame by `deadline_ms` of animation time.
    pub fn show_next_frame_by(&self, deadline_ms: f64) -> Result<()> {
        self.scheduler.request_deadline(deadline_ms)
    }

    /// See [`FrameScheduler::pause`].
    pub fn pause(&self, millis: i64) -> Result<FrameStatus> {
        self.scheduler.pause(millis)
    }
}
