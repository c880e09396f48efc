use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::error::{Result, SchedulerError};
use crate::scheduler::FrameScheduler;

use super::types::{InputEvent, InputKind, PointerClick};

type KeyHandler = Box<dyn FnMut(char) + Send>;
type PointerHandler = Box<dyn FnMut(PointerClick) + Send>;

#[derive(Default)]
struct Handlers {
    key: OnceLock<Mutex<KeyHandler>>,
    pointer: OnceLock<Mutex<PointerHandler>>,
}

/// Routes surface input to user handlers on the animation thread.
///
/// Handlers are registered before the scheduler starts, at most one of each
/// kind. `dispatch` may be called from any thread (typically the surface's
/// event thread); the handler runs later, inside frame advance, so it never
/// races the caller's drawing code. Handlers must not call frame advance.
#[derive(Clone)]
pub struct InputRouter {
    scheduler: Arc<FrameScheduler>,
    handlers: Arc<Handlers>,
}

impl InputRouter {
    pub fn new(scheduler: Arc<FrameScheduler>) -> Self {
        Self {
            scheduler,
            handlers: Arc::new(Handlers::default()),
        }
    }

    pub fn set_key_handler<F>(&self, handler: F) -> Result<()>
    where
        F: FnMut(char) + Send + 'static,
    {
        self.check_registrable()?;
        self.handlers
            .key
            .set(Mutex::new(Box::new(handler)))
            .map_err(|_| SchedulerError::HandlerAlreadySet {
                kind: InputKind::Key.as_str(),
            })
    }

    pub fn set_pointer_handler<F>(&self, handler: F) -> Result<()>
    where
        F: FnMut(PointerClick) + Send + 'static,
    {
        self.check_registrable()?;
        self.handlers
            .pointer
            .set(Mutex::new(Box::new(handler)))
            .map_err(|_| SchedulerError::HandlerAlreadySet {
                kind: InputKind::Pointer.as_str(),
            })
    }

    fn check_registrable(&self) -> Result<()> {
        if self.scheduler.is_started() {
            Err(SchedulerError::AlreadyStarted)
        } else {
            Ok(())
        }
    }

    /// True if a pointer handler is registered.
    pub fn wants_pointer(&self) -> bool {
        self.handlers.pointer.get().is_some()
    }

    pub fn has_handler(&self, kind: InputKind) -> bool {
        match kind {
            InputKind::Key => self.handlers.key.get().is_some(),
            InputKind::Pointer => self.wants_pointer(),
        }
    }

    /// Queues `event` for its handler.
    ///
    /// Returns `false` when the event is dropped: the scheduler is not
    /// running, or nothing handles this kind of input.
    pub fn dispatch(&self, event: InputEvent) -> bool {
        if !self.scheduler.is_running() || !self.has_handler(event.kind()) {
            return false;
        }

        let handlers = Arc::clone(&self.handlers);
        self.scheduler.enqueue(move || match event {
            InputEvent::KeyTyped(ch) => {
                if let Some(handler) = handlers.key.get() {
                    let mut handler = handler.lock();
                    (*handler)(ch);
                }
            }
            InputEvent::PointerClicked(click) => {
                if let Some(handler) = handlers.pointer.get() {
                    let mut handler = handler.lock();
                    (*handler)(click);
                }
            }
        })
    }
}

impl fmt::Debug for InputRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputRouter")
            .field("scheduler", &self.scheduler.name())
            .field("key", &self.has_handler(InputKind::Key))
            .field("pointer", &self.wants_pointer())
            .finish()
    }
}
